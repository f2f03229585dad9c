//! Error types for the core crate.
//!
//! The `Display` output of the user-facing variants is the exact text shown
//! to the person at the keyboard.

use reqwest::StatusCode;
use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

/// Failure talking to the hosted record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid database URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Database URL cannot address documents: {0}")]
    NotABase(String),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response status {0}")]
    Status(StatusCode),

    #[error("Malformed store response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Outcome of a failed signup or login.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please fill all fields")]
    MissingFields,

    #[error("Password must be 6+ characters")]
    PasswordTooShort,

    #[error("Username must be 3+ characters")]
    UsernameTooShort,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Registration failed")]
    RegistrationFailed,

    #[error("Error: {}", truncate_message(.0, 40))]
    Store(#[source] StoreError),
}

/// Outcome of a failed branch operation.
#[derive(Debug, Error)]
pub enum BranchError {
    #[error("Please fill all fields")]
    MissingFields,

    #[error("Failed to add branch")]
    AddFailed,

    #[error("Error: {}", truncate_message(.0, 30))]
    Store(#[source] StoreError),
}

/// Failure persisting the local scan log.
#[derive(Debug, Error)]
pub enum ScanLogError {
    #[error("Failed to write scan log {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize scan log: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// First `max` characters of an error's message.
pub(crate) fn truncate_message(err: &impl Display, max: usize) -> String {
    err.to_string().chars().take(max).collect()
}
