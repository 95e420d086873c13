//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract consumed by the catalog service.
//! - Isolate SQLite query details from service orchestration.
//! - Build the backend selected by [`StorageTarget`].
//!
//! # Invariants
//! - Duplicate (title, author) detection is enforced by the service, not here.

pub mod book_repo;
pub mod memory_repo;

use crate::config::StorageTarget;
use crate::db::{open_db, open_db_in_memory};
use book_repo::{BookRepository, RepoResult, SqliteBookRepository};
use log::info;
use memory_repo::InMemoryBookRepository;

/// Opens the repository backend described by `target`.
///
/// SQLite targets are migrated before the repository is returned.
pub fn open_repository(target: &StorageTarget) -> RepoResult<Box<dyn BookRepository>> {
    let repo: Box<dyn BookRepository> = match target {
        StorageTarget::InMemory => Box::new(InMemoryBookRepository::new()),
        StorageTarget::SqliteMemory => {
            Box::new(SqliteBookRepository::try_new(open_db_in_memory()?)?)
        }
        StorageTarget::SqliteFile(path) => Box::new(SqliteBookRepository::try_new(open_db(path)?)?),
    };

    info!(
        "event=repo_open module=repo status=ok backend={}",
        target.backend_name()
    );
    Ok(repo)
}
