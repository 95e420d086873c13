//! Catalog domain model.
//!
//! # Responsibility
//! - Define the validated book record used by repositories and services.
//!
//! # Invariants
//! - Every domain value is validated on construction, including
//!   deserialization and reloads from storage.

pub mod book;
