//! Catalog use-case service.
//!
//! # Responsibility
//! - Provide create/get/list/search/update/delete/statistics entry points.
//! - Enforce (title, author) uniqueness and not-found semantics on top of
//!   any [`BookRepository`].
//!
//! # Invariants
//! - Every write goes through `Book` validation before reaching storage.
//! - Service layer remains storage-agnostic and holds no state of its own.
//! - Errors propagate unchanged to the caller; nothing is retried.

use crate::model::book::{Book, BookId, BookValidationError};
use crate::repo::book_repo::{BookRepository, RepoError};
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for catalog use-cases.
#[derive(Debug)]
pub enum CatalogError {
    /// Input violates a `Book` invariant.
    Validation(BookValidationError),
    /// A book with the same title and author already exists.
    DuplicateBook { title: String, author: String },
    /// Target book does not exist.
    BookNotFound(BookId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

/// Transport-agnostic classification of [`CatalogError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorKind {
    InvalidInput,
    Conflict,
    NotFound,
    Storage,
}

impl CatalogErrorKind {
    /// HTTP status a transport layer should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput => 400,
            Self::Conflict => 409,
            Self::NotFound => 404,
            Self::Storage => 500,
        }
    }
}

impl CatalogError {
    pub fn kind(&self) -> CatalogErrorKind {
        match self {
            Self::Validation(_) => CatalogErrorKind::InvalidInput,
            Self::DuplicateBook { .. } => CatalogErrorKind::Conflict,
            Self::BookNotFound(_) => CatalogErrorKind::NotFound,
            Self::Repo(_) => CatalogErrorKind::Storage,
        }
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateBook { title, author } => write!(
                f,
                "book '{title}' by {author} already exists in the catalog"
            ),
            Self::BookNotFound(id) => write!(f, "book not found: id {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::DuplicateBook { .. } | Self::BookNotFound(_) => None,
        }
    }
}

impl From<BookValidationError> for CatalogError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Partial update request; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<i32>,
}

/// Aggregate catalog statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub total: usize,
    /// Earliest publication year; `None` for an empty catalog.
    pub oldest: Option<i32>,
    /// Latest publication year; `None` for an empty catalog.
    pub newest: Option<i32>,
}

/// Catalog facade over repository implementations.
pub struct CatalogService<R: BookRepository> {
    repo: R,
}

impl<R: BookRepository> CatalogService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Read access to the injected repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates and stores a new book.
    ///
    /// # Contract
    /// - Duplicate check runs on trimmed title/author before validation.
    /// - Returns the stored book with its assigned id.
    pub fn create_book(
        &self,
        title: &str,
        author: &str,
        year: i32,
        rating: Option<i32>,
    ) -> CatalogResult<Book> {
        let (title, author) = (title.trim(), author.trim());
        if self.repo.exists(title, author)? {
            warn!("event=book_create module=service status=rejected reason=duplicate");
            return Err(CatalogError::DuplicateBook {
                title: title.to_string(),
                author: author.to_string(),
            });
        }

        let book = Book::new(title, author, year, rating)?;
        let stored = self.repo.add(&book)?;
        info!(
            "event=book_create module=service status=ok id={}",
            display_id(stored.id())
        );
        Ok(stored)
    }

    pub fn get_book_by_id(&self, id: BookId) -> CatalogResult<Book> {
        self.repo
            .get_by_id(id)?
            .ok_or(CatalogError::BookNotFound(id))
    }

    pub fn list_all_books(&self) -> CatalogResult<Vec<Book>> {
        Ok(self.repo.get_all()?)
    }

    /// Case-insensitive title search. An empty term returns no books.
    pub fn search_books(&self, term: &str) -> CatalogResult<Vec<Book>> {
        Ok(self.repo.find_by_title(term)?)
    }

    /// Deletes a book by id. Repeating the call reports not-found.
    pub fn delete_book(&self, id: BookId) -> CatalogResult<bool> {
        if !self.repo.remove_by_id(id)? {
            return Err(CatalogError::BookNotFound(id));
        }

        info!("event=book_delete module=service status=ok id={id}");
        Ok(true)
    }

    /// Replaces a book, keeping stored values for every unset field.
    ///
    /// # Contract
    /// - Not-found is reported both before the write and when the repository
    ///   no longer knows the id at write time.
    /// - The merged book is fully re-validated.
    /// - Uniqueness of (title, author) is not re-checked on update.
    pub fn update_book(&self, id: BookId, changes: BookUpdate) -> CatalogResult<Book> {
        let existing = self.get_book_by_id(id)?;

        let BookUpdate {
            title,
            author,
            year,
            rating,
        } = changes;
        let merged = Book::restore(
            Some(id),
            title.as_deref().unwrap_or(existing.title()),
            author.as_deref().unwrap_or(existing.author()),
            year.unwrap_or(existing.year()),
            rating.or(existing.rating()),
        )?;

        let updated = self
            .repo
            .update(&merged)?
            .ok_or(CatalogError::BookNotFound(id))?;
        info!("event=book_update module=service status=ok id={id}");
        Ok(updated)
    }

    /// Computes totals and the publication year range in one scan.
    pub fn get_statistics(&self) -> CatalogResult<CatalogStats> {
        let books = self.repo.get_all()?;
        let years = books.iter().map(Book::year);

        Ok(CatalogStats {
            total: books.len(),
            oldest: years.clone().min(),
            newest: years.max(),
        })
    }
}

fn display_id(id: Option<BookId>) -> String {
    id.map_or_else(|| "none".to_string(), |id| id.to_string())
}
