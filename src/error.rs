//! # Error Handling
//!
//! This module defines the error type shared by every part of the `imagemirror`
//! library. It uses `thiserror` to build a single `Error` enum whose variants
//! carry the context a caller needs to act on a failure: the policy file path,
//! the image reference being resolved, or the rule source that is inconsistent.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum covering policy file loading, decoding,
//!   reference parsing, rule validation, resolution and cache failures.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Resolution errors raised by a strategy are wrapped in `Error::Resolution`,
//! which names the image and keeps the underlying error as its source.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for imagemirror operations
#[derive(Error, Debug)]
pub enum Error {
    /// No policy file was configured, or the configured path does not exist.
    #[error("Policy file not found: {}", path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "no file specified".to_string()))]
    PolicyFileMissing { path: Option<PathBuf> },

    /// The policy file exists but holds no data.
    #[error("No data found in policy file {}", path.display())]
    PolicyFileEmpty { path: PathBuf },

    /// The policy file could not be read.
    #[error("Failed to read policy file {}: {source}", path.display())]
    PolicyFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The policy file content could not be decoded.
    #[error("Could not decode policy file {}: {message}", path.display())]
    PolicyDecode { path: PathBuf, message: String },

    /// The policy file decoded to a different API type than expected.
    #[error("Policy file {} holds {found}, expected {expected}", path.display())]
    UnexpectedKind {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// A source, mirror or image string is not a valid image reference.
    #[error("Invalid image reference {reference:?}: {message}")]
    InvalidReference { reference: String, message: String },

    /// Two image digest mirror rules for the same source disagree about
    /// whether the source may be contacted.
    #[error("Conflicting mirrorSourcePolicy for source {source_repo}: {first} and {second}")]
    ConflictingSourcePolicy {
        source_repo: String,
        first: String,
        second: String,
    },

    /// The explicit strategy found no mirror for the image.
    #[error("No alternative image references found for image: {image}")]
    NoAlternates { image: String },

    /// Resolving alternates for an image failed.
    #[error("Unable to resolve alternates for image {image}: {source}")]
    Resolution {
        image: String,
        #[source]
        source: Box<Error>,
    },

    /// A mutex guarding shared state has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },
}

impl Error {
    /// Wrap this error with the image reference whose resolution failed.
    pub fn for_image(self, image: impl ToString) -> Self {
        Error::Resolution {
            image: image.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, unwrapping any resolution context.
    pub fn root(&self) -> &Error {
        match self {
            Error::Resolution { source, .. } => source.root(),
            other => other,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
