//! Structural validation of game documents and create payloads.
//!
//! # Responsibility
//! - Check every length/format rule before anything is persisted.
//! - Report all violations at once as human-readable field messages.
//!
//! # Invariants
//! - Validation never mutates its input.
//! - Referenced ids are format-checked only; dangling references pass.
//! - Container/item id uniqueness within a game is enforced here.

mod limits;
mod schema;

pub use limits::*;
pub use schema::{validate_create_request, validate_game};

use std::error::Error;
use std::fmt::{Display, Formatter};

/// One violated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path to the field, e.g. `containers[0].items[2].label`.
    pub path: String,
    pub message: String,
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Non-empty list of violated rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Builds a single-entry error list.
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(path, message);
        errors
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Whether any error is reported for exactly `path`.
    pub fn has_path(&self, path: &str) -> bool {
        self.errors.iter().any(|error| error.path == path)
    }

    /// Rendered `path: message` lines, in detection order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// `Ok(())` when nothing was reported.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed: {}", self.messages().join("; "))
    }
}

impl Error for ValidationErrors {}
