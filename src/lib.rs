//! # docstore
//!
//! A minimal embedded document store:
//! - One table of `(id TEXT, data TEXT)` rows over in-memory SQLite
//! - JSON documents in, JSON documents out
//! - Short random ids, unique per table
//! - Hydrate once from a loader, flush the full image to a writer on
//!   every mutation
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      DocumentStore                       │
//! │      load / get / insert / delete / execute / save       │
//! └──────┬──────────────────┬──────────────────┬─────────────┘
//!        │                  │                  │
//!        ▼                  ▼                  ▼
//!   ┌─────────┐      ┌─────────────┐    ┌──────────────┐
//!   │  Codec  │      │ IdGenerator │    │ SqliteEngine │
//!   │ (JSON)  │      │  (random)   │    │ (in-memory)  │
//!   └─────────┘      └─────────────┘    └──────┬───────┘
//!                                              │ full image
//!                                    ┌─────────┴─────────┐
//!                                    ▼                   ▼
//!                              ┌──────────┐        ┌──────────┐
//!                              │  Loader  │        │  Writer  │
//!                              │ (load)   │        │ (save)   │
//!                              └──────────┘        └──────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use docstore::{DocumentStore, MemorySink, StoreConfig};
//! use serde_json::json;
//!
//! let sink = MemorySink::new();
//! let config = StoreConfig::builder()
//!     .name("users")
//!     .sink(sink.clone())
//!     .build()
//!     .unwrap();
//!
//! let store = DocumentStore::open(config).unwrap();
//! let inserted = store.insert(&json!({ "name": "ada" })).unwrap();
//!
//! assert_eq!(store.get_by_id(&inserted.id).unwrap(), Some(json!({ "name": "ada" })));
//! assert!(sink.snapshot().is_some());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod id;
pub mod hooks;
pub mod engine;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DocStoreError, Result};
pub use config::{StoreConfig, StoreConfigBuilder};
pub use engine::{ExecOutcome, SqliteEngine};
pub use hooks::{FileSink, Loader, MemorySink, Writer};
pub use id::{IdGenerator, RandomIds};
pub use store::{DocumentStore, InsertOutcome, Lookup, SaveOutcome};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of docstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
