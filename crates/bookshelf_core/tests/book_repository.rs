use bookshelf_core::db::migrations::latest_version;
use bookshelf_core::db::open_db_in_memory;
use bookshelf_core::{
    open_repository, Book, BookRepository, InMemoryBookRepository, RepoError,
    SqliteBookRepository, StorageTarget,
};
use rusqlite::Connection;

fn backends() -> Vec<(&'static str, Box<dyn BookRepository>)> {
    vec![
        ("memory", Box::new(InMemoryBookRepository::new())),
        (
            "sqlite",
            Box::new(SqliteBookRepository::try_new(open_db_in_memory().unwrap()).unwrap()),
        ),
    ]
}

fn book(title: &str, author: &str, year: i32) -> Book {
    Book::new(title, author, year, None).unwrap()
}

#[test]
fn add_assigns_increasing_ids_and_get_returns_stored_book() {
    for (name, repo) in backends() {
        let first = repo.add(&book("1984", "George Orwell", 1949)).unwrap();
        let second = repo
            .add(&Book::new("Dune", "Frank Herbert", 1965, Some(5)).unwrap())
            .unwrap();

        let first_id = first.id().unwrap();
        let second_id = second.id().unwrap();
        assert!(second_id > first_id, "{name}");

        let loaded = repo.get_by_id(second_id).unwrap().unwrap();
        assert_eq!(loaded, second, "{name}");
        assert_eq!(loaded.rating(), Some(5), "{name}");
        assert_eq!(repo.get_by_id(second_id + 100).unwrap(), None, "{name}");
    }
}

#[test]
fn get_all_returns_books_in_insertion_order() {
    for (name, repo) in backends() {
        assert!(repo.get_all().unwrap().is_empty(), "{name}");

        repo.add(&book("Emma", "Jane Austen", 1815)).unwrap();
        repo.add(&book("Dune", "Frank Herbert", 1965)).unwrap();
        repo.add(&book("Ulysses", "James Joyce", 1922)).unwrap();

        let titles: Vec<String> = repo
            .get_all()
            .unwrap()
            .iter()
            .map(|book| book.title().to_string())
            .collect();
        assert_eq!(titles, ["Emma", "Dune", "Ulysses"], "{name}");
        assert_eq!(repo.count().unwrap(), 3, "{name}");
    }
}

#[test]
fn find_by_title_is_case_insensitive_substring_match() {
    for (name, repo) in backends() {
        repo.add(&book("The Hobbit", "J.R.R. Tolkien", 1937)).unwrap();
        repo.add(&book("The Silmarillion", "J.R.R. Tolkien", 1977))
            .unwrap();
        repo.add(&book("Dune", "Frank Herbert", 1965)).unwrap();

        assert_eq!(repo.find_by_title("THE").unwrap().len(), 2, "{name}");
        assert_eq!(repo.find_by_title("hob").unwrap().len(), 1, "{name}");
        assert!(repo.find_by_title("Zola").unwrap().is_empty(), "{name}");
        assert!(repo.find_by_title("").unwrap().is_empty(), "{name}");
    }
}

#[test]
fn find_by_title_folds_non_ascii_and_treats_wildcards_literally() {
    for (name, repo) in backends() {
        repo.add(&book("Élan vital", "Henri Bergson", 1907)).unwrap();
        repo.add(&book("100% Pure", "Anon", 2001)).unwrap();
        repo.add(&book("1000 Pages", "Anon", 2002)).unwrap();

        let elan = repo.find_by_title("ÉLAN").unwrap();
        assert_eq!(elan.len(), 1, "{name}");
        assert_eq!(elan[0].title(), "Élan vital", "{name}");

        let percent = repo.find_by_title("0%").unwrap();
        assert_eq!(percent.len(), 1, "{name}");
        assert_eq!(percent[0].title(), "100% Pure", "{name}");

        assert!(repo.find_by_title("_").unwrap().is_empty(), "{name}");
    }
}

#[test]
fn exists_matches_title_and_author_ignoring_case() {
    for (name, repo) in backends() {
        repo.add(&book("1984", "George Orwell", 1949)).unwrap();

        assert!(repo.exists("1984", "george orwell").unwrap(), "{name}");
        assert!(repo.exists("1984", "GEORGE ORWELL").unwrap(), "{name}");
        assert!(!repo.exists("1984", "Orwell").unwrap(), "{name}");
        assert!(!repo.exists("198%", "George Orwell").unwrap(), "{name}");
        assert!(!repo.exists("Animal Farm", "George Orwell").unwrap(), "{name}");
    }
}

#[test]
fn remove_by_id_reports_whether_a_book_was_removed() {
    for (name, repo) in backends() {
        let stored = repo.add(&book("1984", "George Orwell", 1949)).unwrap();
        let id = stored.id().unwrap();

        assert!(repo.remove_by_id(id).unwrap(), "{name}");
        assert!(!repo.remove_by_id(id).unwrap(), "{name}");
        assert_eq!(repo.get_by_id(id).unwrap(), None, "{name}");
        assert_eq!(repo.count().unwrap(), 0, "{name}");
    }
}

#[test]
fn update_replaces_existing_book_and_reports_unknown_ids() {
    for (name, repo) in backends() {
        let stored = repo.add(&book("1984", "George Orwell", 1949)).unwrap();
        let id = stored.id().unwrap();

        let replacement =
            Book::restore(Some(id), "Nineteen Eighty-Four", "George Orwell", 1949, Some(5))
                .unwrap();
        let updated = repo.update(&replacement).unwrap().unwrap();
        assert_eq!(updated, replacement, "{name}");
        assert_eq!(repo.get_by_id(id).unwrap().unwrap(), replacement, "{name}");

        let unknown = Book::restore(Some(id + 50), "Ghost", "Nobody", 2000, None).unwrap();
        assert_eq!(repo.update(&unknown).unwrap(), None, "{name}");

        let unsaved = book("Unsaved", "Nobody", 2000);
        assert_eq!(repo.update(&unsaved).unwrap(), None, "{name}");
        assert_eq!(repo.count().unwrap(), 1, "{name}");
    }
}

#[test]
fn open_repository_builds_each_backend() {
    let dir = tempfile::tempdir().unwrap();
    let targets = [
        StorageTarget::InMemory,
        StorageTarget::SqliteMemory,
        StorageTarget::SqliteFile(dir.path().join("books.db")),
    ];

    for target in targets {
        let repo = open_repository(&target).unwrap();
        repo.add(&book("Dune", "Frank Herbert", 1965)).unwrap();
        assert_eq!(repo.count().unwrap(), 1, "{target:?}");
    }
}

#[test]
fn sqlite_file_backend_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let target = StorageTarget::SqliteFile(dir.path().join("books.db"));

    let id = {
        let repo = open_repository(&target).unwrap();
        repo.add(&book("Dune", "Frank Herbert", 1965))
            .unwrap()
            .id()
            .unwrap()
    };

    let repo = open_repository(&target).unwrap();
    let loaded = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.title(), "Dune");
}

#[test]
fn sqlite_ids_are_not_reused_after_removal() {
    let repo = SqliteBookRepository::try_new(open_db_in_memory().unwrap()).unwrap();
    let first = repo.add(&book("Dune", "Frank Herbert", 1965)).unwrap();
    repo.remove_by_id(first.id().unwrap()).unwrap();

    let second = repo.add(&book("Emma", "Jane Austen", 1815)).unwrap();
    assert!(second.id().unwrap() > first.id().unwrap());
}

#[test]
fn sqlite_reports_invalid_persisted_rows() {
    let repo = SqliteBookRepository::try_new(open_db_in_memory().unwrap()).unwrap();
    repo.connection()
        .execute(
            "INSERT INTO books (title, author, year) VALUES ('   ', 'Anon', 2000);",
            [],
        )
        .unwrap();

    let err = repo.get_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)), "unexpected error: {err}");
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteBookRepository::try_new(conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_books_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteBookRepository::try_new(conn);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("books"))));
}

#[test]
fn repository_rejects_connection_missing_rating_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            year INTEGER NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteBookRepository::try_new(conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "books",
            column: "rating"
        })
    ));
}
