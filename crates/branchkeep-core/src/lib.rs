//! Core models and storage for branchkeep.
//!
//! This crate provides the record store client, the credential gate, the
//! branch collection and the local scan log used by the frontends.

pub mod auth;
pub mod branches;
pub mod error;
pub mod memory;
pub mod models;
pub mod scanlog;
pub mod scanner;
pub mod store;

pub use auth::{hash_password, CredentialGate};
pub use branches::BranchManager;
pub use error::{AuthError, BranchError, ScanLogError, StoreError};
pub use memory::MemoryRecordStore;
pub use models::{Branch, CurrentUser, ScanRecord, UserRecord};
pub use scanlog::ScanLog;
pub use scanner::{Scanner, SimulatedScanner};
pub use store::{HttpRecordStore, RecordStore, DEFAULT_TIMEOUT};
