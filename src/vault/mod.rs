//! Vault module: entries, the in-memory collection, and encrypted storage.
//!
//! This module provides:
//! - The `Entry` record and its binary encoding (`entry`)
//! - The in-memory `Vault` and its mutating operations (`collection`)
//! - Search, sorted views, and category grouping (`query`)
//! - Binary vault file format (`format`)
//! - The session lock (`lock`)
//! - `RecordStore` for loading and atomically saving a vault (`store`)

pub mod collection;
pub mod entry;
pub mod format;
pub mod lock;
pub mod query;
pub mod store;

pub use collection::Vault;
pub use entry::Entry;
pub use format::VaultHeader;
pub use lock::VaultLock;
pub use query::SortField;
pub use store::RecordStore;
