//! Path-addressed access to the hosted JSON document store.
//!
//! Paths are slash-separated key sequences such as `users/alice` or
//! `branches/alice`. Every HTTP call is blocking and bounded by a fixed
//! timeout; nothing is retried.

use crate::error::StoreError;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Timeout applied to every request unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Read/write operations against a hierarchical JSON store.
pub trait RecordStore {
    /// Fetch the document at `path`. `Ok(None)` when nothing is stored there.
    fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the document at exactly `path`.
    fn put(&self, path: &str, document: &Value) -> Result<(), StoreError>;

    /// Append `document` as a new child of `path`.
    ///
    /// Returns the generated key, or `None` when the write succeeded but the
    /// key could not be read back.
    fn post(&self, path: &str, document: &Value) -> Result<Option<String>, StoreError>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(path)
    }

    fn put(&self, path: &str, document: &Value) -> Result<(), StoreError> {
        (**self).put(path, document)
    }

    fn post(&self, path: &str, document: &Value) -> Result<Option<String>, StoreError> {
        (**self).post(path, document)
    }
}

/// Body returned by the store for a successful `POST`.
#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

/// [`RecordStore`] backed by the store's REST interface (`<base>/<path>.json`).
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    client: Client,
    base_url: Url,
}

impl HttpRecordStore {
    /// Create a client for the database at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::NotABase(base_url.to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    /// The database root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the REST URL for a document path.
    pub fn document_url(&self, path: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|()| StoreError::NotABase(self.base_url.to_string()))?;
            parts.pop_if_empty();
            match segments.split_last() {
                Some((last, rest)) => {
                    parts.extend(rest);
                    parts.push(&format!("{last}.json"));
                }
                None => {
                    parts.push(".json");
                }
            }
        }
        Ok(url)
    }

    fn expect_ok(method: &str, url: &Url, status: StatusCode) -> Result<(), StoreError> {
        if status == StatusCode::OK {
            Ok(())
        } else {
            tracing::warn!("{} {} returned {}", method, url.path(), status);
            Err(StoreError::Status(status))
        }
    }
}

impl RecordStore for HttpRecordStore {
    fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let url = self.document_url(path)?;
        tracing::debug!("GET {}", url.path());

        let response = self.client.get(url.clone()).send().inspect_err(|e| {
            tracing::error!("GET {} failed: {}", url.path(), e);
        })?;
        Self::expect_ok("GET", &url, response.status())?;

        let value: Value = response.json()?;
        Ok(match value {
            Value::Null => None,
            other => Some(other),
        })
    }

    fn put(&self, path: &str, document: &Value) -> Result<(), StoreError> {
        let url = self.document_url(path)?;
        tracing::debug!("PUT {}", url.path());

        let response = self
            .client
            .put(url.clone())
            .json(document)
            .send()
            .inspect_err(|e| tracing::error!("PUT {} failed: {}", url.path(), e))?;
        Self::expect_ok("PUT", &url, response.status())
    }

    fn post(&self, path: &str, document: &Value) -> Result<Option<String>, StoreError> {
        let url = self.document_url(path)?;
        tracing::debug!("POST {}", url.path());

        let response = self
            .client
            .post(url.clone())
            .json(document)
            .send()
            .inspect_err(|e| tracing::error!("POST {} failed: {}", url.path(), e))?;
        Self::expect_ok("POST", &url, response.status())?;

        // The write has landed once the status is 200; the body only carries the key.
        match response.json::<PushResponse>() {
            Ok(pushed) => Ok(Some(pushed.name)),
            Err(e) => {
                tracing::warn!("POST {} succeeded without a readable key: {}", url.path(), e);
                Ok(None)
            }
        }
    }
}
