//! # accountform-core
//!
//! State management for a list of account records edited in a form.
//!
//! This crate provides:
//! - Account model (login, password, record type, marks)
//! - Field validation with per-account error messages
//! - An account store with change notification
//! - Persistence of the list into a single key of a key-value storage,
//!   skipping accounts that fail validation
//!
//! ## Example
//!
//! ```
//! use accountform_core::{AccountPatch, AccountStore, MemoryStorage};
//!
//! let mut store = AccountStore::new(MemoryStorage::new(), "accounts");
//! let id = store.create();
//! store.update(&id, &AccountPatch::new().with_login("alice").with_password("secret"));
//! store.validate_id(&id);
//! assert!(!store.has_errors());
//! store.save_or_prune();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod config;
mod error;
pub mod storage;
pub mod store;

pub use account::{
    Account, AccountErrors, AccountField, AccountId, AccountPatch, FieldErrors, Mark,
    RecordType, ValidationError, parse_marks, validate_account,
};
pub use config::StoreConfig;
pub use error::{Error, Result};
pub use storage::{FileStorage, MemoryStorage, StorageBackend};
pub use store::{AccountStore, StoreEvent, SubscriptionId};
