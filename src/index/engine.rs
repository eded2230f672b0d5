use crate::markdown;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index write failed: {0}")]
    Write(#[source] sqlx::Error),

    #[error("index query failed: {0}")]
    Query(#[source] sqlx::Error),
}

/// Search capability of an index database, decided once when the database
/// is first initialized and recorded inside it, so the same database never
/// flips between modes across reopens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchCapability {
    /// FTS5 with Porter stemming: `search("running")` matches "run".
    FullTextStemmed,
    /// FTS5 without stemming: token match only.
    FullTextPlain,
    /// No FTS5 available: substring match over raw article content.
    SubstringFallback,
}

impl SearchCapability {
    pub fn has_fulltext(self) -> bool {
        !matches!(self, SearchCapability::SubstringFallback)
    }

    fn as_str(self) -> &'static str {
        match self {
            SearchCapability::FullTextStemmed => "fts_stemmed",
            SearchCapability::FullTextPlain => "fts_plain",
            SearchCapability::SubstringFallback => "substring",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "fts_stemmed" => Some(SearchCapability::FullTextStemmed),
            "fts_plain" => Some(SearchCapability::FullTextPlain),
            "substring" => Some(SearchCapability::SubstringFallback),
            _ => None,
        }
    }
}

/// An article as handed to the index: identity, location, and the fields
/// projected into the metadata table. `content` is the raw Markdown; the
/// engine derives the searchable text from it.
#[derive(Debug, Clone)]
pub struct Article {
    pub id: String,
    pub path: PathBuf,
    pub content: String,
    pub title: Option<String>,
    pub keywords: Option<String>,
}

/// Metadata projection of an indexed article, as returned by lookups,
/// search, and listing. Content is deliberately omitted; the file is the
/// source of truth for that.
#[derive(Debug, Clone)]
pub struct ArticleMeta {
    pub id: String,
    pub path: PathBuf,
    pub title: Option<String>,
    pub keywords: Option<String>,
}

impl ArticleMeta {
    pub(crate) fn from_row(row: &SqliteRow) -> Self {
        let path: String = row.get(1);
        ArticleMeta {
            id: row.get(0),
            path: PathBuf::from(path),
            title: row.get(2),
            keywords: row.get(3),
        }
    }
}

/// The database half of the knowledge base: metadata, raw content, and
/// (when available) an FTS5 projection of every article, kept in one
/// SQLite file next to the articles directory.
pub struct IndexEngine {
    pub(crate) pool: SqlitePool,
    pub(crate) capability: SearchCapability,
}

const STEMMED_FULLTEXT: &str = "CREATE VIRTUAL TABLE IF NOT EXISTS fulltext \
     USING fts5(id UNINDEXED, body, tokenize='porter unicode61')";
const PLAIN_FULLTEXT: &str =
    "CREATE VIRTUAL TABLE IF NOT EXISTS fulltext USING fts5(id UNINDEXED, body)";

impl IndexEngine {
    /// Opens (creating if needed) the index database at `db_path`.
    ///
    /// First initialization probes for FTS5 support and records the result
    /// in the database; later opens reuse the recorded capability instead
    /// of re-probing.
    pub async fn open(db_path: &Path) -> Result<Self, IndexError> {
        let pool = Self::connect(db_path).await?;
        Self::create_schema(&pool).await?;

        let capability = match Self::recorded_capability(&pool).await? {
            Some(capability) => capability,
            None => {
                let probed = Self::probe_fulltext(&pool).await;
                Self::record_capability(&pool, probed).await?;
                probed
            }
        };
        debug!(capability = capability.as_str(), "index opened");

        Ok(IndexEngine { pool, capability })
    }

    /// Opens the index with a forced search capability, skipping the probe.
    ///
    /// Useful for running deliberately degraded (substring-only) and for
    /// exercising the fallback paths in tests. Forcing a full-text state
    /// on an engine without FTS5 fails with [`IndexError::Write`] when the
    /// virtual table cannot be created.
    pub async fn open_with(
        db_path: &Path,
        capability: SearchCapability,
    ) -> Result<Self, IndexError> {
        let pool = Self::connect(db_path).await?;
        Self::create_schema(&pool).await?;

        let statement = match capability {
            SearchCapability::FullTextStemmed => Some(STEMMED_FULLTEXT),
            SearchCapability::FullTextPlain => Some(PLAIN_FULLTEXT),
            SearchCapability::SubstringFallback => None,
        };
        if let Some(statement) = statement {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(IndexError::Write)?;
        }

        Ok(IndexEngine { pool, capability })
    }

    /// The capability this engine was opened with.
    pub fn capability(&self) -> SearchCapability {
        self.capability
    }

    async fn connect(db_path: &Path) -> Result<SqlitePool, IndexError> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
            .busy_timeout(Duration::from_secs(5));

        // One connection: SQLite serializes writes for us, so index and
        // de-index calls from concurrent tasks cannot interleave.
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(IndexError::Write)
    }

    async fn create_schema(pool: &SqlitePool) -> Result<(), IndexError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS articles (
                id TEXT PRIMARY KEY,
                path TEXT NOT NULL,
                title TEXT,
                keywords TEXT
            )",
        )
        .execute(pool)
        .await
        .map_err(IndexError::Write)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS contents (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await
        .map_err(IndexError::Write)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS index_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await
        .map_err(IndexError::Write)?;

        Ok(())
    }

    /// Probes FTS5 support: stemmed first, plain second, substring last.
    async fn probe_fulltext(pool: &SqlitePool) -> SearchCapability {
        if sqlx::query(STEMMED_FULLTEXT).execute(pool).await.is_ok() {
            return SearchCapability::FullTextStemmed;
        }
        if sqlx::query(PLAIN_FULLTEXT).execute(pool).await.is_ok() {
            return SearchCapability::FullTextPlain;
        }
        warn!("full-text search unavailable, falling back to substring matching");
        SearchCapability::SubstringFallback
    }

    async fn recorded_capability(pool: &SqlitePool) -> Result<Option<SearchCapability>, IndexError> {
        let row = sqlx::query("SELECT value FROM index_meta WHERE key = 'search_capability'")
            .fetch_optional(pool)
            .await
            .map_err(IndexError::Query)?;

        Ok(row.and_then(|row| {
            let value: String = row.get(0);
            SearchCapability::parse(&value)
        }))
    }

    async fn record_capability(
        pool: &SqlitePool,
        capability: SearchCapability,
    ) -> Result<(), IndexError> {
        sqlx::query("INSERT OR REPLACE INTO index_meta (key, value) VALUES ('search_capability', ?)")
            .bind(capability.as_str())
            .execute(pool)
            .await
            .map_err(IndexError::Write)?;
        Ok(())
    }

    /// Indexes (or re-indexes) an article.
    ///
    /// Derives the title from the first `# ` heading when none is supplied,
    /// then upserts the metadata and raw-content rows and replaces the
    /// full-text row, all inside one transaction. A full-text write failure
    /// is logged and swallowed so the optional FTS5 feature can never take
    /// down the authoritative tables; only metadata/content failures
    /// propagate. The database is checkpointed before returning, so a
    /// successful call is durable.
    pub async fn index_article(&self, article: &Article) -> Result<(), IndexError> {
        let title = article
            .title
            .clone()
            .or_else(|| markdown::derive_title(&article.content));

        let mut tx = self.pool.begin().await.map_err(IndexError::Write)?;

        sqlx::query(
            "INSERT OR REPLACE INTO articles (id, path, title, keywords) VALUES (?, ?, ?, ?)",
        )
        .bind(&article.id)
        .bind(article.path.display().to_string())
        .bind(&title)
        .bind(&article.keywords)
        .execute(&mut *tx)
        .await
        .map_err(IndexError::Write)?;

        sqlx::query("INSERT OR REPLACE INTO contents (id, content) VALUES (?, ?)")
            .bind(&article.id)
            .bind(&article.content)
            .execute(&mut *tx)
            .await
            .map_err(IndexError::Write)?;

        if self.capability.has_fulltext() {
            // FTS5 has no in-place update; emulate upsert as delete+insert.
            let body = markdown::strip_formatting(&article.content);
            let replaced = async {
                sqlx::query("DELETE FROM fulltext WHERE id = ?")
                    .bind(&article.id)
                    .execute(&mut *tx)
                    .await?;
                sqlx::query("INSERT INTO fulltext (id, body) VALUES (?, ?)")
                    .bind(&article.id)
                    .bind(&body)
                    .execute(&mut *tx)
                    .await
            }
            .await;
            if let Err(e) = replaced {
                warn!(id = %article.id, error = %e, "full-text write failed, article indexed without it");
            }
        }

        tx.commit().await.map_err(IndexError::Write)?;
        self.checkpoint().await
    }

    /// Removes every row for `id` from the index.
    ///
    /// Metadata and content deletions are one atomic unit; if either fails
    /// the transaction rolls back and nothing is removed. A full-text
    /// deletion failure is tolerated (the stale row is replaced by the next
    /// index of that id anyway, and can never resurface an article whose
    /// metadata row is gone).
    pub async fn deindex_article(&self, id: &str) -> Result<(), IndexError> {
        let mut tx = self.pool.begin().await.map_err(IndexError::Write)?;

        sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(IndexError::Write)?;

        sqlx::query("DELETE FROM contents WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(IndexError::Write)?;

        if self.capability.has_fulltext() {
            if let Err(e) = sqlx::query("DELETE FROM fulltext WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await
            {
                warn!(id = %id, error = %e, "full-text delete failed, row left for next index");
            }
        }

        tx.commit().await.map_err(IndexError::Write)?;
        self.checkpoint().await
    }

    /// Looks up the metadata row for `id`.
    pub async fn get(&self, id: &str) -> Result<Option<ArticleMeta>, IndexError> {
        let row = sqlx::query("SELECT id, path, title, keywords FROM articles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(IndexError::Query)?;

        Ok(row.map(|row| ArticleMeta::from_row(&row)))
    }

    /// Flushes the WAL into the main database file.
    async fn checkpoint(&self) -> Result<(), IndexError> {
        sqlx::query("PRAGMA wal_checkpoint(FULL)")
            .execute(&self.pool)
            .await
            .map_err(IndexError::Write)?;
        Ok(())
    }

    /// Flushes pending writes and releases the database.
    ///
    /// Safe to call more than once; later calls are no-ops.
    pub async fn close(&self) {
        if !self.pool.is_closed() {
            if let Err(e) = self.checkpoint().await {
                debug!(error = %e, "checkpoint on close failed");
            }
        }
        self.pool.close().await;
    }
}
