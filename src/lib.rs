//! # folio_core
//!
//! A library for keeping a set of Markdown articles on disk as the source
//! of truth while maintaining a queryable SQLite index (metadata plus
//! full-text search) alongside them, with both stores kept consistent
//! across every create, update, and delete.
//!
//! ## Features
//!
//! - **File-backed articles**: one `<id>.md` file per article, written
//!   atomically, with a random 128-bit id shared by file name and index key
//! - **SQLite indexing**: metadata and raw content tables plus an optional
//!   FTS5 projection, persisted on every write
//! - **Graceful degradation**: FTS5 with stemming, FTS5 without stemming,
//!   or plain substring search, probed once per database and fixed
//! - **Consistency coordination**: mutations leave both stores consistent
//!   or fail with a precise error, compensating where possible
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use folio_core::base::KnowledgeBase;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), folio_core::FolioError> {
//! let base = KnowledgeBase::open_at(std::path::Path::new("/path/to/base"))?;
//!
//! let (id, _path) = base
//!     .create("# Hello\nWorld about cats", None, Some("pets,intro"))
//!     .await?;
//!
//! let hits = base.search("cats", 10).await?;
//! assert_eq!(hits[0].meta.id, id);
//!
//! base.delete(&id).await?;
//! base.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **[`store`]**: the Document Store, durable file-level CRUD for
//!   article content and nothing else
//! - **[`index`]**: the Index Engine, with schema management, capability
//!   probing, indexing/de-indexing, ranked search, and pagination
//! - **[`base`]**: the coordinator, which sequences store and index per
//!   operation and compensates on partial failure
//! - **[`markdown`]**: title derivation and formatting removal for the
//!   searchable text
//! - **[`error`]**: the unified [`FolioError`] with automatic conversion
//!   from the component error types
//!
//! ## Consistency model
//!
//! Mutations hit the file store first and the index second. A failed
//! create deletes the orphaned file before reporting the index error. A
//! failed update cannot restore the old file content (no pre-image is
//! kept) and says so with [`FolioError::PartialUpdate`]. A failed
//! de-index after a successful file delete leaves a detectable lingering
//! index row rather than hiding the error.
//!
//! The crate assumes a single process owns a given base's files and
//! database at a time; within the process, concurrent callers are safe:
//! they queue behind one index initialization and the database serializes
//! the writes.

pub mod base;
pub mod error;
pub mod index;
pub mod markdown;
pub mod store;

/// Re-exports the most commonly used types for convenience.
pub use error::{FolioError, FolioResult};
