//! Shared data types for the application.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp layout used for every record written by this crate.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// A registered account as stored under `users/<username>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub username: String,
    /// Hex SHA-256 digest of the password. Never the plaintext.
    #[serde(rename = "password", default)]
    pub password_hash: String,
    #[serde(default)]
    pub created_at: String,
}

/// A branch entry as stored under `branches/<user_id>/<generated key>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub created_at: String,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} - {})", self.name, self.start_date, self.end_date)
    }
}

/// One successful scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub barcode: String,
    pub timestamp: String,
}

impl fmt::Display for ScanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.timestamp, self.barcode)
    }
}

/// The signed-in user. `user_id` keys the branch collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: String,
    pub user_id: String,
}

impl CurrentUser {
    /// Build the session identity for a username; the username doubles as the id.
    pub fn new(username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            user_id: username.clone(),
            username,
        }
    }
}
