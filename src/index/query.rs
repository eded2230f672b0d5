use crate::index::engine::{ArticleMeta, IndexEngine, IndexError, SearchCapability};
use sqlx::{Row, SqlitePool};

/// Default number of hits returned by a search when the caller does not say.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Default page size for listing.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Read-side interface over an [`IndexEngine`]: ranked search, pagination,
/// and keyword relations. Cheap to construct; shares the engine's pool.
pub struct Query {
    pool: SqlitePool,
    capability: SearchCapability,
}

/// One search hit: the article's metadata plus its relevance rank.
///
/// Ranks follow the BM25 convention (lower is more relevant) in the
/// full-text states and are always `0.0` in substring fallback or when
/// ranking is unavailable.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub meta: ArticleMeta,
    pub rank: f64,
}

impl Query {
    pub fn new(engine: &IndexEngine) -> Self {
        Query {
            pool: engine.pool.clone(),
            capability: engine.capability,
        }
    }

    /// Searches indexed articles for `query`, returning at most `limit` hits.
    ///
    /// In the full-text states this is an FTS5 match ordered by `bm25()`
    /// ascending; when the ranked statement fails (matching works but
    /// ranking does not) the same match runs unranked with `rank = 0`.
    /// In substring fallback it is a case-sensitive containment test over
    /// the raw stored content, in insertion order.
    ///
    /// No matches is an empty vector, never an error.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchHit>, IndexError> {
        match self.capability {
            SearchCapability::FullTextStemmed | SearchCapability::FullTextPlain => {
                self.search_fulltext(query, limit).await
            }
            SearchCapability::SubstringFallback => self.search_substring(query, limit).await,
        }
    }

    async fn search_fulltext(&self, query: &str, limit: u32) -> Result<Vec<SearchHit>, IndexError> {
        let ranked = sqlx::query(
            "SELECT a.id, a.path, a.title, a.keywords, bm25(fulltext) AS rank
             FROM fulltext
             JOIN articles a ON a.id = fulltext.id
             WHERE fulltext MATCH ?
             ORDER BY rank
             LIMIT ?",
        )
        .bind(query)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await;

        let rows = match ranked {
            Ok(rows) => {
                return Ok(rows
                    .iter()
                    .map(|row| SearchHit {
                        meta: ArticleMeta::from_row(row),
                        rank: row.get(4),
                    })
                    .collect());
            }
            // Matching may work where bm25() does not; retry unranked.
            Err(_) => sqlx::query(
                "SELECT a.id, a.path, a.title, a.keywords
                 FROM fulltext
                 JOIN articles a ON a.id = fulltext.id
                 WHERE fulltext MATCH ?
                 LIMIT ?",
            )
            .bind(query)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(IndexError::Query)?,
        };

        Ok(rows
            .iter()
            .map(|row| SearchHit {
                meta: ArticleMeta::from_row(row),
                rank: 0.0,
            })
            .collect())
    }

    async fn search_substring(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<SearchHit>, IndexError> {
        let rows = sqlx::query(
            "SELECT a.id, a.path, a.title, a.keywords
             FROM articles a
             JOIN contents c ON c.id = a.id
             WHERE instr(c.content, ?) > 0
             ORDER BY a.rowid
             LIMIT ?",
        )
        .bind(query)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(IndexError::Query)?;

        Ok(rows
            .iter()
            .map(|row| SearchHit {
                meta: ArticleMeta::from_row(row),
                rank: 0.0,
            })
            .collect())
    }

    /// Lists indexed articles in insertion order, `size` per page.
    ///
    /// Pages are 1-indexed; a page past the end is an empty vector, not an
    /// error. Page 0 is treated as page 1.
    pub async fn list(&self, page: u32, size: u32) -> Result<Vec<ArticleMeta>, IndexError> {
        let offset = i64::from(page.max(1) - 1) * i64::from(size);

        let rows = sqlx::query(
            "SELECT id, path, title, keywords FROM articles ORDER BY rowid LIMIT ? OFFSET ?",
        )
        .bind(i64::from(size))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(IndexError::Query)?;

        Ok(rows.iter().map(ArticleMeta::from_row).collect())
    }

    /// Finds articles whose comma-joined keyword list contains `keyword`.
    pub async fn find_related(
        &self,
        keyword: &str,
        limit: u32,
    ) -> Result<Vec<ArticleMeta>, IndexError> {
        let rows = sqlx::query(
            "SELECT id, path, title, keywords
             FROM articles
             WHERE keywords IS NOT NULL AND keywords LIKE '%' || ? || '%'
             ORDER BY rowid
             LIMIT ?",
        )
        .bind(keyword)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(IndexError::Query)?;

        Ok(rows.iter().map(ArticleMeta::from_row).collect())
    }
}
