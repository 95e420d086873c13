//! Core domain logic for the Bookshelf catalog.
//! This crate is the single source of truth for book invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{CatalogConfig, ConfigError, StorageTarget};
pub use logging::{default_log_level, init_logging, logging_status, LogDestination};
pub use model::book::{Book, BookId, BookValidationError};
pub use repo::book_repo::{BookRepository, RepoError, RepoResult, SqliteBookRepository};
pub use repo::memory_repo::InMemoryBookRepository;
pub use repo::open_repository;
pub use service::catalog_service::{
    BookUpdate, CatalogError, CatalogErrorKind, CatalogResult, CatalogService, CatalogStats,
};

/// Opens a catalog service over the backend selected by `target`.
pub fn open_catalog(
    target: &StorageTarget,
) -> RepoResult<CatalogService<Box<dyn BookRepository>>> {
    Ok(CatalogService::new(open_repository(target)?))
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
