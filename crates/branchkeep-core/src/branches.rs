//! Per-user branch collection stored under `branches/<user_id>`.

use crate::error::{BranchError, StoreError};
use crate::models::{timestamp_now, Branch};
use crate::store::RecordStore;
use serde_json::Value;

/// Line shown in place of the list when the collection is empty.
pub const EMPTY_LIST_MESSAGE: &str = "No branches yet";
/// Confirmation shown after a branch is stored.
pub const ADDED_MESSAGE: &str = "Branch added successfully";

/// The signed-in user's branches, mirrored from the store.
pub struct BranchManager<S> {
    store: S,
    user_id: String,
    branches: Vec<Branch>,
}

impl<S: RecordStore> BranchManager<S> {
    /// Create an empty manager for `user_id`. Call [`Self::load_branches`] to populate it.
    pub fn new(store: S, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
            branches: Vec::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The in-memory collection, in the order it was loaded and appended.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    fn collection_path(&self) -> String {
        format!("branches/{}", self.user_id)
    }

    /// Replace the collection with what the store holds.
    ///
    /// Order is the store's key order. On failure the previous collection is kept.
    pub fn load_branches(&mut self) -> Result<&[Branch], BranchError> {
        let document = self.store.get(&self.collection_path()).map_err(|e| {
            tracing::error!("Error loading branches for {}: {}", self.user_id, e);
            BranchError::Store(e)
        })?;

        self.branches = match document {
            Some(Value::Object(children)) => children
                .into_iter()
                .filter_map(|(key, child)| match serde_json::from_value(child) {
                    Ok(branch) => Some(branch),
                    Err(e) => {
                        tracing::warn!("Skipping malformed branch {}: {}", key, e);
                        None
                    }
                })
                .collect(),
            Some(other) => {
                tracing::warn!("Unexpected branch collection shape: {}", other);
                Vec::new()
            }
            None => Vec::new(),
        };

        tracing::debug!("Loaded {} branches for {}", self.branches.len(), self.user_id);
        Ok(&self.branches)
    }

    /// Store a new branch and append it to the local collection.
    ///
    /// The local tail is not reconciled with the store's order until the next load.
    pub fn add_branch(
        &mut self,
        name: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<&Branch, BranchError> {
        let (name, start_date, end_date) = (name.trim(), start_date.trim(), end_date.trim());
        if name.is_empty() || start_date.is_empty() || end_date.is_empty() {
            return Err(BranchError::MissingFields);
        }

        let branch = Branch {
            name: name.to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            created_at: timestamp_now(),
        };
        let document =
            serde_json::to_value(&branch).map_err(|e| BranchError::Store(StoreError::Decode(e)))?;

        match self.store.post(&self.collection_path(), &document) {
            Ok(key) => {
                tracing::info!(
                    "Added branch {} ({}) for {}",
                    branch.name,
                    key.as_deref().unwrap_or("unknown key"),
                    self.user_id
                );
                self.branches.push(branch);
                Ok(&self.branches[self.branches.len() - 1])
            }
            Err(StoreError::Status(status)) => {
                tracing::warn!("Adding branch rejected with {}", status);
                Err(BranchError::AddFailed)
            }
            Err(e) => {
                tracing::error!("Error adding branch: {}", e);
                Err(BranchError::Store(e))
            }
        }
    }

    /// Display lines for the collection.
    pub fn display_lines(&self) -> Vec<String> {
        if self.branches.is_empty() {
            vec![EMPTY_LIST_MESSAGE.to_string()]
        } else {
            self.branches.iter().map(ToString::to_string).collect()
        }
    }
}
