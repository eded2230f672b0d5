//! The queryable half of the knowledge base: a SQLite projection of every
//! article's metadata and content, with full-text search when the engine's
//! FTS5 extension is available.
//!
//! Search capability is probed once per database and then fixed:
//!
//! 1. FTS5 with Porter stemming ([`SearchCapability::FullTextStemmed`])
//! 2. FTS5 without stemming ([`SearchCapability::FullTextPlain`])
//! 3. substring matching over raw content ([`SearchCapability::SubstringFallback`])
//!
//! All three states answer [`Query::search`] with the same hit shape; the
//! degraded states simply report a rank of `0`. Writes go through
//! [`IndexEngine`]; reads go through [`Query`].

pub mod engine;
pub mod query;

pub use engine::{Article, ArticleMeta, IndexEngine, IndexError, SearchCapability};
pub use query::{DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_LIMIT, Query, SearchHit};
