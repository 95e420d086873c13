//! In-memory book repository.
//!
//! # Responsibility
//! - Provide a storage-free backend for tests and local development.
//!
//! # Invariants
//! - Books are kept in insertion order.
//! - Identifiers start at 1, increase monotonically and are never reused.
//! - Not `Sync`; callers serialize access themselves.

use crate::model::book::{Book, BookId};
use crate::repo::book_repo::{BookRepository, RepoResult};
use std::cell::{Cell, RefCell};

/// Vector-backed book repository.
#[derive(Debug)]
pub struct InMemoryBookRepository {
    books: RefCell<Vec<Book>>,
    next_id: Cell<BookId>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self {
            books: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }
}

impl Default for InMemoryBookRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl BookRepository for InMemoryBookRepository {
    fn add(&self, book: &Book) -> RepoResult<Book> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let stored = book.clone().with_id(id);
        self.books.borrow_mut().push(stored.clone());
        Ok(stored)
    }

    fn get_all(&self) -> RepoResult<Vec<Book>> {
        Ok(self.books.borrow().clone())
    }

    fn get_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        Ok(self
            .books
            .borrow()
            .iter()
            .find(|book| book.id() == Some(id))
            .cloned())
    }

    fn find_by_title(&self, term: &str) -> RepoResult<Vec<Book>> {
        if term.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .books
            .borrow()
            .iter()
            .filter(|book| book.matches_title(term))
            .cloned()
            .collect())
    }

    fn exists(&self, title: &str, author: &str) -> RepoResult<bool> {
        Ok(self
            .books
            .borrow()
            .iter()
            .any(|book| book.is_duplicate_of(title, author)))
    }

    fn remove_by_id(&self, id: BookId) -> RepoResult<bool> {
        let mut books = self.books.borrow_mut();
        match books.iter().position(|book| book.id() == Some(id)) {
            Some(index) => {
                books.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn update(&self, book: &Book) -> RepoResult<Option<Book>> {
        let Some(id) = book.id() else {
            return Ok(None);
        };

        let mut books = self.books.borrow_mut();
        match books.iter_mut().find(|existing| existing.id() == Some(id)) {
            Some(slot) => {
                *slot = book.clone();
                Ok(Some(book.clone()))
            }
            None => Ok(None),
        }
    }

    fn count(&self) -> RepoResult<usize> {
        Ok(self.books.borrow().len())
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryBookRepository;
    use crate::model::book::Book;
    use crate::repo::book_repo::BookRepository;

    #[test]
    fn identifiers_are_not_reused_after_removal() {
        let repo = InMemoryBookRepository::new();
        let first = repo
            .add(&Book::new("Dune", "Frank Herbert", 1965, None).unwrap())
            .unwrap();
        assert!(repo.remove_by_id(first.id().unwrap()).unwrap());

        let second = repo
            .add(&Book::new("Emma", "Jane Austen", 1815, None).unwrap())
            .unwrap();
        assert_eq!(first.id(), Some(1));
        assert_eq!(second.id(), Some(2));
    }

    #[test]
    fn update_without_identifier_is_absent() {
        let repo = InMemoryBookRepository::new();
        let book = Book::new("Dune", "Frank Herbert", 1965, None).unwrap();
        repo.add(&book).unwrap();

        assert_eq!(repo.update(&book).unwrap(), None);
    }
}
