//! Signup and login against the `users/<username>` documents.

use crate::error::{AuthError, StoreError};
use crate::models::{timestamp_now, UserRecord};
use crate::store::RecordStore;
use sha2::{Digest, Sha256};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Success line shown after a completed signup.
pub const REGISTERED_MESSAGE: &str = "Registration successful";
/// Success line shown after a completed login.
pub const LOGGED_IN_MESSAGE: &str = "Login successful";

/// Lowercase hex SHA-256 of the password's UTF-8 bytes.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn user_path(username: &str) -> String {
    format!("users/{username}")
}

/// Trim both fields and require them to be non-empty.
fn require_fields<'a>(
    username: &'a str,
    password: &'a str,
) -> Result<(&'a str, &'a str), AuthError> {
    let (username, password) = (username.trim(), password.trim());
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }
    Ok((username, password))
}

/// Client-side signup policy, checked before touching the network.
pub fn validate_signup<'a>(
    username: &'a str,
    password: &'a str,
) -> Result<(&'a str, &'a str), AuthError> {
    let (username, password) = require_fields(username, password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(AuthError::UsernameTooShort);
    }
    Ok((username, password))
}

/// Hashes passwords and checks them against stored user records.
pub struct CredentialGate<S> {
    store: S,
}

impl<S: RecordStore> CredentialGate<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// True iff a user document exists. Store failures count as "no".
    pub fn user_exists(&self, username: &str) -> bool {
        match self.store.get(&user_path(username)) {
            Ok(doc) => doc.is_some(),
            Err(e) => {
                tracing::warn!("Error checking user {}: {}", username, e);
                false
            }
        }
    }

    /// Create an account.
    ///
    /// The existence check and the write are separate round trips, so two
    /// concurrent signups for one name can both succeed and the later write wins.
    pub fn register_user(&self, username: &str, password: &str) -> Result<UserRecord, AuthError> {
        let (username, password) = validate_signup(username, password)?;

        if self.user_exists(username) {
            return Err(AuthError::UsernameTaken);
        }

        let record = UserRecord {
            username: username.to_string(),
            password_hash: hash_password(password),
            created_at: timestamp_now(),
        };
        let document = serde_json::to_value(&record)
            .map_err(|e| AuthError::Store(StoreError::Decode(e)))?;

        match self.store.put(&user_path(username), &document) {
            Ok(()) => {
                tracing::info!("Registered user {}", username);
                Ok(record)
            }
            Err(StoreError::Status(status)) => {
                tracing::warn!("Registration of {} rejected with {}", username, status);
                Err(AuthError::RegistrationFailed)
            }
            Err(e) => {
                tracing::error!("Register exception: {}", e);
                Err(AuthError::Store(e))
            }
        }
    }

    /// Check credentials and return the stored record on success.
    pub fn login_user(&self, username: &str, password: &str) -> Result<UserRecord, AuthError> {
        let (username, password) = require_fields(username, password)?;

        let document = match self.store.get(&user_path(username)) {
            Ok(Some(doc)) => doc,
            Ok(None) => return Err(AuthError::UserNotFound),
            Err(StoreError::Status(status)) => {
                tracing::warn!("Login lookup for {} returned {}", username, status);
                return Err(AuthError::UserNotFound);
            }
            Err(e) => {
                tracing::error!("Login exception: {}", e);
                return Err(AuthError::Store(e));
            }
        };

        let mut record: UserRecord = serde_json::from_value(document).map_err(|e| {
            tracing::error!("Malformed user record for {}: {}", username, e);
            AuthError::Store(StoreError::Decode(e))
        })?;
        if record.username.is_empty() {
            record.username = username.to_string();
        }

        if record.password_hash == hash_password(password) {
            tracing::info!("User {} signed in", username);
            Ok(record)
        } else {
            Err(AuthError::InvalidPassword)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRecordStore;
    use crate::store::{HttpRecordStore, DEFAULT_TIMEOUT};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn digest_is_hex_sha256() {
        assert_eq!(
            hash_password("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
        assert_eq!(hash_password("secret1"), hash_password("secret1"));
        assert_ne!(hash_password("secret1"), hash_password("secret2"));
        assert_eq!(hash_password("").len(), 64);
    }

    #[test]
    fn signup_policy_order() {
        assert!(matches!(validate_signup("", "x"), Err(AuthError::MissingFields)));
        assert!(matches!(validate_signup("  ", "secret1"), Err(AuthError::MissingFields)));
        // Password length is checked before username length.
        assert!(matches!(validate_signup("ab", "12345"), Err(AuthError::PasswordTooShort)));
        assert!(matches!(validate_signup("ab", "123456"), Err(AuthError::UsernameTooShort)));
        assert_eq!(validate_signup(" abc ", " 123456 ").unwrap(), ("abc", "123456"));
    }

    #[test]
    fn register_stores_digest_not_plaintext() {
        let store = MemoryRecordStore::new();
        let gate = CredentialGate::new(&store);
        gate.register_user("alice", "hunter22").unwrap();

        let doc = store.get("users/alice").unwrap().unwrap();
        assert_eq!(doc["username"], "alice");
        assert_eq!(doc["password"], json!(hash_password("hunter22")));
        assert!(doc["created_at"].is_string());
    }

    #[test]
    fn register_rejects_taken_username() {
        let store = MemoryRecordStore::new();
        let gate = CredentialGate::new(&store);
        gate.register_user("alice", "hunter22").unwrap();
        let err = gate.register_user("alice", "another1").unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
        assert_eq!(err.to_string(), "Username already exists");
    }

    #[test]
    fn validation_failures_never_write() {
        let store = MemoryRecordStore::new();
        let gate = CredentialGate::new(&store);
        assert!(gate.register_user("al", "hunter22").is_err());
        assert!(gate.register_user("alice", "short").is_err());
        assert_eq!(store.dump(), serde_json::Value::Null);
    }

    #[test]
    fn login_outcomes() {
        let store = MemoryRecordStore::new();
        let gate = CredentialGate::new(&store);
        gate.register_user("alice", "hunter22").unwrap();

        assert_eq!(gate.login_user("alice", "hunter22").unwrap().username, "alice");
        assert_eq!(
            gate.login_user("alice", "hunter23").unwrap_err().to_string(),
            "Invalid password"
        );
        assert_eq!(
            gate.login_user("bob", "hunter22").unwrap_err().to_string(),
            "User not found"
        );
        assert!(matches!(gate.login_user("alice", " "), Err(AuthError::MissingFields)));
    }

    #[test]
    fn login_trims_input() {
        let store = MemoryRecordStore::new();
        let gate = CredentialGate::new(&store);
        gate.register_user("alice", "hunter22").unwrap();
        assert!(gate.login_user("  alice ", "hunter22 ").is_ok());
    }

    #[test]
    fn rejected_write_reports_registration_failed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users/alice.json");
            then.status(200).body("null");
        });
        server.mock(|when, then| {
            when.method(PUT).path("/users/alice.json");
            then.status(403).body(r#"{"error":"Permission denied"}"#);
        });

        let store = HttpRecordStore::new(&server.base_url(), DEFAULT_TIMEOUT).unwrap();
        let err = CredentialGate::new(store)
            .register_user("alice", "hunter22")
            .unwrap_err();
        assert_eq!(err.to_string(), "Registration failed");
    }

    #[test]
    fn lookup_status_failure_reads_as_missing_user() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users/alice.json");
            then.status(500);
        });

        let store = HttpRecordStore::new(&server.base_url(), DEFAULT_TIMEOUT).unwrap();
        let gate = CredentialGate::new(store);
        assert!(matches!(
            gate.login_user("alice", "hunter22"),
            Err(AuthError::UserNotFound)
        ));
        // The existence check fails open.
        assert!(!gate.user_exists("alice"));
    }

    #[test]
    fn unreachable_store_reports_short_error() {
        // Nothing listens on port 9 (discard) in test environments.
        let store = HttpRecordStore::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let gate = CredentialGate::new(store);

        let login = gate.login_user("alice", "hunter22").unwrap_err();
        assert!(matches!(login, AuthError::Store(StoreError::Http(_))));
        let shown = login.to_string();
        assert!(shown.starts_with("Error: "));
        assert!(shown.chars().count() <= "Error: ".len() + 40);

        // The failed existence check lets signup reach the write, which fails the same way.
        let register = gate.register_user("alice", "hunter22").unwrap_err();
        assert!(matches!(register, AuthError::Store(StoreError::Http(_))));
        assert!(register.to_string().starts_with("Error: "));
    }

    #[test]
    fn login_accepts_record_without_username_field() {
        let store = MemoryRecordStore::new();
        store
            .put("users/alice", &json!({"password": hash_password("hunter22")}))
            .unwrap();

        let record = CredentialGate::new(&store)
            .login_user("alice", "hunter22")
            .unwrap();
        assert_eq!(record.username, "alice");
    }
}
