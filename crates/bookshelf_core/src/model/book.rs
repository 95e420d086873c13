//! Book domain model.
//!
//! # Responsibility
//! - Define the canonical catalog record shared by every storage backend.
//! - Validate title/author/year/rating at construction time.
//!
//! # Invariants
//! - A `Book` value is never observable in an invalid state.
//! - `title` and `author` are stored trimmed and are never empty.
//! - `year` is within [`MIN_YEAR`, `MAX_YEAR`].
//! - `rating`, when set, is within [`MIN_RATING`, `MAX_RATING`].
//! - `id` is assigned by storage and never set by callers on create.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned identifier for a book.
pub type BookId = i64;

pub const MIN_YEAR: i32 = 1000;
pub const MAX_YEAR: i32 = 2025;
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Validation failure for book construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    /// Title is empty or whitespace-only.
    InvalidTitle,
    /// Author is empty or whitespace-only.
    InvalidAuthor,
    /// Year is outside the accepted publication range.
    InvalidYear(i32),
    /// Rating is present but outside the accepted range.
    InvalidRating(i32),
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "invalid title: title cannot be empty"),
            Self::InvalidAuthor => write!(f, "invalid author: author cannot be empty"),
            Self::InvalidYear(year) => write!(
                f,
                "invalid year: {year}; year must be between {MIN_YEAR} and {MAX_YEAR}"
            ),
            Self::InvalidRating(rating) => write!(
                f,
                "invalid rating: {rating}; rating must be between {MIN_RATING} and {MAX_RATING}"
            ),
        }
    }
}

impl Error for BookValidationError {}

/// Validated catalog entry.
///
/// Updates are expressed by constructing a new `Book`; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BookPayload")]
pub struct Book {
    id: Option<BookId>,
    title: String,
    author: String,
    year: i32,
    rating: Option<i32>,
}

/// Unvalidated wire shape used only as the deserialization source.
#[derive(Deserialize)]
struct BookPayload {
    #[serde(default)]
    id: Option<BookId>,
    title: String,
    author: String,
    year: i32,
    #[serde(default)]
    rating: Option<i32>,
}

impl TryFrom<BookPayload> for Book {
    type Error = BookValidationError;

    fn try_from(value: BookPayload) -> Result<Self, Self::Error> {
        Self::restore(value.id, value.title, value.author, value.year, value.rating)
    }
}

impl Book {
    /// Creates a new, not yet stored book.
    ///
    /// # Errors
    /// Checks run in order title, author, year, rating; the first failure
    /// is returned.
    pub fn new(
        title: impl AsRef<str>,
        author: impl AsRef<str>,
        year: i32,
        rating: Option<i32>,
    ) -> Result<Self, BookValidationError> {
        let title = title.as_ref().trim();
        if title.is_empty() {
            return Err(BookValidationError::InvalidTitle);
        }

        let author = author.as_ref().trim();
        if author.is_empty() {
            return Err(BookValidationError::InvalidAuthor);
        }

        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(BookValidationError::InvalidYear(year));
        }

        if let Some(value) = rating {
            if !(MIN_RATING..=MAX_RATING).contains(&value) {
                return Err(BookValidationError::InvalidRating(value));
            }
        }

        Ok(Self {
            id: None,
            title: title.to_string(),
            author: author.to_string(),
            year,
            rating,
        })
    }

    /// Rebuilds a book from persisted or external data, re-running validation.
    pub fn restore(
        id: Option<BookId>,
        title: impl AsRef<str>,
        author: impl AsRef<str>,
        year: i32,
        rating: Option<i32>,
    ) -> Result<Self, BookValidationError> {
        let book = Self::new(title, author, year, rating)?;
        Ok(Self { id, ..book })
    }

    /// Attaches a storage identifier.
    pub fn with_id(self, id: BookId) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }

    pub fn id(&self) -> Option<BookId> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn rating(&self) -> Option<i32> {
        self.rating
    }

    /// Returns whether `term` occurs in the title, ignoring case.
    pub fn matches_title(&self, term: &str) -> bool {
        fold_case(&self.title).contains(&fold_case(term))
    }

    /// Returns whether this book shares `title` and `author`, ignoring case.
    pub fn is_duplicate_of(&self, title: &str, author: &str) -> bool {
        fold_case(&self.title) == fold_case(title) && fold_case(&self.author) == fold_case(author)
    }
}

impl Display for Book {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' by {}, published in {}",
            self.title, self.author, self.year
        )
    }
}

/// Case folding shared by in-memory matching and the SQLite `book_fold` function.
pub(crate) fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{fold_case, Book};

    #[test]
    fn fold_case_handles_non_ascii() {
        assert_eq!(fold_case("ÉMILE Zola"), "émile zola");
    }

    #[test]
    fn restore_keeps_identifier() {
        let book = Book::restore(Some(7), " Dune ", "Frank Herbert", 1965, Some(4)).unwrap();
        assert_eq!(book.id(), Some(7));
        assert_eq!(book.title(), "Dune");
    }

    #[test]
    fn display_uses_title_author_and_year() {
        let book = Book::new("1984", "George Orwell", 1949, None).unwrap();
        assert_eq!(book.to_string(), "'1984' by George Orwell, published in 1949");
    }
}
