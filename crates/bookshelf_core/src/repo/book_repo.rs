//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the storage contract every catalog backend implements.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths return the stored row as read back after the statement.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Case-insensitive matching uses the same folding as `Book::matches_title`.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::book::{fold_case, Book, BookId};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const BOOKS_TABLE: &str = "books";
const REQUIRED_COLUMNS: &[&str] = &["id", "title", "author", "year", "rating"];
const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author,
    year,
    rating
FROM books";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for book persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted book data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for catalog books.
///
/// Implementations must behave identically from the caller's perspective.
pub trait BookRepository {
    /// Persists `book` under a new identifier and returns the stored book.
    fn add(&self, book: &Book) -> RepoResult<Book>;
    /// Returns every stored book.
    fn get_all(&self) -> RepoResult<Vec<Book>>;
    fn get_by_id(&self, id: BookId) -> RepoResult<Option<Book>>;
    /// Case-insensitive substring match on title. An empty term matches nothing.
    fn find_by_title(&self, term: &str) -> RepoResult<Vec<Book>>;
    /// Case-insensitive exact match on both title and author.
    fn exists(&self, title: &str, author: &str) -> RepoResult<bool>;
    /// Returns `false` when no book had this identifier.
    fn remove_by_id(&self, id: BookId) -> RepoResult<bool>;
    /// Replaces the book sharing `book.id()`; `None` when there is none.
    fn update(&self, book: &Book) -> RepoResult<Option<Book>>;
    fn count(&self) -> RepoResult<usize>;
}

impl<R: BookRepository + ?Sized> BookRepository for &R {
    fn add(&self, book: &Book) -> RepoResult<Book> {
        (**self).add(book)
    }

    fn get_all(&self) -> RepoResult<Vec<Book>> {
        (**self).get_all()
    }

    fn get_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        (**self).get_by_id(id)
    }

    fn find_by_title(&self, term: &str) -> RepoResult<Vec<Book>> {
        (**self).find_by_title(term)
    }

    fn exists(&self, title: &str, author: &str) -> RepoResult<bool> {
        (**self).exists(title, author)
    }

    fn remove_by_id(&self, id: BookId) -> RepoResult<bool> {
        (**self).remove_by_id(id)
    }

    fn update(&self, book: &Book) -> RepoResult<Option<Book>> {
        (**self).update(book)
    }

    fn count(&self) -> RepoResult<usize> {
        (**self).count()
    }
}

impl<R: BookRepository + ?Sized> BookRepository for Box<R> {
    fn add(&self, book: &Book) -> RepoResult<Book> {
        (**self).add(book)
    }

    fn get_all(&self) -> RepoResult<Vec<Book>> {
        (**self).get_all()
    }

    fn get_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        (**self).get_by_id(id)
    }

    fn find_by_title(&self, term: &str) -> RepoResult<Vec<Book>> {
        (**self).find_by_title(term)
    }

    fn exists(&self, title: &str, author: &str) -> RepoResult<bool> {
        (**self).exists(title, author)
    }

    fn remove_by_id(&self, id: BookId) -> RepoResult<bool> {
        (**self).remove_by_id(id)
    }

    fn update(&self, book: &Book) -> RepoResult<Option<Book>> {
        (**self).update(book)
    }

    fn count(&self) -> RepoResult<usize> {
        (**self).count()
    }
}

/// SQLite-backed book repository.
///
/// Owns its connection; the connection must come from [`crate::db::open_db`]
/// or [`crate::db::open_db_in_memory`] so the schema is in place.
pub struct SqliteBookRepository {
    conn: Connection,
}

impl SqliteBookRepository {
    /// Wraps a migrated connection after verifying the `books` schema.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not the latest.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_schema(&conn)?;
        conn.create_scalar_function(
            "book_fold",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let value: String = ctx.get(0)?;
                Ok(fold_case(&value))
            },
        )?;
        Ok(Self { conn })
    }

    /// Underlying connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn load(&self, id: BookId) -> RepoResult<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_book_row(row)?)),
            None => Ok(None),
        }
    }

    fn query_books(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Book>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }
        Ok(books)
    }
}

impl BookRepository for SqliteBookRepository {
    fn add(&self, book: &Book) -> RepoResult<Book> {
        self.conn.execute(
            "INSERT INTO books (title, author, year, rating) VALUES (?1, ?2, ?3, ?4);",
            params![book.title(), book.author(), book.year(), book.rating()],
        )?;

        let id = self.conn.last_insert_rowid();
        self.load(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted book {id} not found in read-back"))
        })
    }

    fn get_all(&self) -> RepoResult<Vec<Book>> {
        self.query_books(&format!("{BOOK_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn get_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        self.load(id)
    }

    fn find_by_title(&self, term: &str) -> RepoResult<Vec<Book>> {
        if term.is_empty() {
            return Ok(Vec::new());
        }

        self.query_books(
            &format!(
                "{BOOK_SELECT_SQL}
                 WHERE instr(book_fold(title), book_fold(?1)) > 0
                 ORDER BY id ASC;"
            ),
            [term],
        )
    }

    fn exists(&self, title: &str, author: &str) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1
                 FROM books
                 WHERE book_fold(title) = book_fold(?1)
                   AND book_fold(author) = book_fold(?2)
                 LIMIT 1;",
                [title, author],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn remove_by_id(&self, id: BookId) -> RepoResult<bool> {
        let changed = self.conn.execute("DELETE FROM books WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn update(&self, book: &Book) -> RepoResult<Option<Book>> {
        let Some(id) = book.id() else {
            return Ok(None);
        };

        let changed = self.conn.execute(
            "UPDATE books
             SET
                title = ?1,
                author = ?2,
                year = ?3,
                rating = ?4
             WHERE id = ?5;",
            params![book.title(), book.author(), book.year(), book.rating(), id],
        )?;

        if changed == 0 {
            return Ok(None);
        }

        self.load(id)
    }

    fn count(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("invalid book count `{count}`")))
    }
}

fn ensure_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([BOOKS_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<HashSet<_>, _>>()?;

    if columns.is_empty() {
        return Err(RepoError::MissingRequiredTable(BOOKS_TABLE));
    }

    for &column in REQUIRED_COLUMNS {
        if !columns.contains(column) {
            return Err(RepoError::MissingRequiredColumn {
                table: BOOKS_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    let id: BookId = row.get("id")?;
    let title: String = row.get("title")?;
    let author: String = row.get("author")?;
    let year: i32 = row.get("year")?;
    let rating: Option<i32> = row.get("rating")?;

    Book::restore(Some(id), title, author, year, rating)
        .map_err(|err| RepoError::InvalidData(format!("book {id}: {err}")))
}
