//! Book domain model.
//!
//! # Responsibility
//! - Define the canonical catalog record and its caller-facing input shapes.
//! - Validate and normalize fields before they reach persistence.
//!
//! # Invariants
//! - `id` is assigned by the store on insert and never reused.
//! - `title` and `author` are stored trimmed and must be non-empty.
//! - `price` is a finite, non-negative number.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned stable identifier for a catalog record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type BookId = i64;

/// Canonical catalog record as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned id, immutable after creation.
    pub id: BookId,
    /// Book title, trimmed and non-empty.
    pub title: String,
    /// Author name, trimmed and non-empty.
    pub author: String,
    /// Unit price, finite and non-negative.
    pub price: f64,
    /// Creation time in epoch milliseconds, set by the store.
    pub created_at: i64,
    /// Last update time in epoch milliseconds, refreshed by the store.
    pub updated_at: i64,
}

/// Caller-supplied fields for creating a record.
///
/// The store assigns `id` and both timestamps; callers never provide them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub price: f64,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            price,
        }
    }

    /// Validates the draft and returns a trimmed copy ready for insertion.
    ///
    /// # Errors
    /// - `EmptyTitle` / `EmptyAuthor` when the field is blank after trimming.
    /// - `InvalidPrice` when the price is negative or not finite.
    pub fn normalized(&self) -> Result<NewBook, BookValidationError> {
        let title = trimmed_required(&self.title).ok_or(BookValidationError::EmptyTitle)?;
        let author = trimmed_required(&self.author).ok_or(BookValidationError::EmptyAuthor)?;
        validate_price(self.price)?;
        Ok(NewBook {
            title,
            author,
            price: self.price,
        })
    }
}

/// Partial update for one record; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub price: Option<f64>,
}

impl BookPatch {
    /// Returns whether the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.price.is_none()
    }

    /// Validates every supplied field and returns a trimmed copy.
    ///
    /// An all-`None` patch is rejected: accepting it would silently refresh
    /// `updated_at` without changing any caller-visible field.
    pub fn normalized(&self) -> Result<BookPatch, BookValidationError> {
        if self.is_empty() {
            return Err(BookValidationError::EmptyPatch);
        }

        let title = match self.title.as_deref() {
            Some(value) => {
                Some(trimmed_required(value).ok_or(BookValidationError::EmptyTitle)?)
            }
            None => None,
        };
        let author = match self.author.as_deref() {
            Some(value) => {
                Some(trimmed_required(value).ok_or(BookValidationError::EmptyAuthor)?)
            }
            None => None,
        };
        if let Some(price) = self.price {
            validate_price(price)?;
        }

        Ok(BookPatch {
            title,
            author,
            price: self.price,
        })
    }
}

/// Validation failure for caller-supplied book fields.
#[derive(Debug, Clone, PartialEq)]
pub enum BookValidationError {
    EmptyTitle,
    EmptyAuthor,
    InvalidPrice(f64),
    EmptyPatch,
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::EmptyAuthor => write!(f, "author must not be empty"),
            Self::InvalidPrice(price) => {
                write!(f, "price must be a non-negative number, got {price}")
            }
            Self::EmptyPatch => write!(f, "update must supply at least one field"),
        }
    }
}

impl Error for BookValidationError {}

fn trimmed_required(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn validate_price(price: f64) -> Result<(), BookValidationError> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(BookValidationError::InvalidPrice(price))
    }
}
