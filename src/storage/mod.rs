//! Glucose Reading Storage
//!
//! This module provides the reading store and its persistence:
//!
//! - **types**: Core data structures (Reading, ReadingId, MealContext)
//! - **kv**: Key-value backends (in-memory, file-backed)
//! - **store**: The reading store orchestrating load, seed, add and delete
//! - **seed**: First-run example readings
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   add/delete → in-memory Vec (newest first) → JSON snapshot → KeyValueStore::set → listeners
//!
//! Read Path:
//!   open → KeyValueStore::get → parse (empty on failure) → in-memory Vec
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use glucose_log::storage::{FileStore, MealContext, ReadingStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = FileStore::open("./data")?;
//!     let mut store = ReadingStore::open(backend);
//!     store.seed_if_empty();
//!
//!     store.add(112.0, MealContext::Fasting, None)?;
//!     println!("{} readings", store.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod kv;
mod seed;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use store::{
    ChangeKind, PersistStatus, ReadingStore, StoreEvent, StoreListener, SubscriptionId,
    DEFAULT_STORAGE_KEY,
};
pub use types::{MealContext, Reading, ReadingId, UnknownMealContext};
