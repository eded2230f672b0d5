use crate::error::{FolioError, FolioResult};
use crate::index::{Article, ArticleMeta, IndexEngine, Query, SearchHit};
use crate::store::ArticleStore;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

const INDEX_DB_FILE: &str = "index.db";
const ARTICLES_DIR: &str = "articles";

/// A single knowledge base: an `articles/` directory of `<id>.md` files
/// (the source of truth) plus an `index.db` SQLite database (the
/// queryable projection), kept consistent by sequencing every mutation
/// through this type.
///
/// Mutations run against the file store first and the index second; when
/// the second half fails the coordinator compensates where it can (create
/// deletes the orphaned file) and reports precisely where it cannot
/// (update surfaces [`FolioError::PartialUpdate`]).
pub struct KnowledgeBase {
    root: PathBuf,
    store: ArticleStore,
    index: OnceCell<IndexEngine>,
}

impl KnowledgeBase {
    /// Opens (creating if needed) the knowledge base rooted at `root`.
    ///
    /// The index database is not touched yet; it is initialized lazily by
    /// the first operation that needs it.
    pub fn open_at(root: &Path) -> FolioResult<Self> {
        let store = ArticleStore::new(root.join(ARTICLES_DIR))?;

        Ok(KnowledgeBase {
            root: root.to_path_buf(),
            store,
            index: OnceCell::new(),
        })
    }

    /// Opens the named knowledge base under the default location,
    /// `{documents dir}/folio/{name}`.
    pub fn open(name: &str) -> FolioResult<Self> {
        let docs = dirs::document_dir()
            .ok_or_else(|| FolioError::BaseDir("no documents directory".into()))?;

        Self::open_at(&docs.join("folio").join(name))
    }

    /// The root directory of this knowledge base.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// One-time index initialization gate.
    ///
    /// Every operation that touches the database awaits this; concurrent
    /// early callers queue behind the same initialization future instead
    /// of racing to create the schema twice.
    async fn index(&self) -> FolioResult<&IndexEngine> {
        let db_path = self.root.join(INDEX_DB_FILE);
        self.index
            .get_or_try_init(|| async move { IndexEngine::open(&db_path).await })
            .await
            .map_err(FolioError::from)
    }

    /// Creates an article from `content`, returning its id and file path.
    ///
    /// Writes the file first, then indexes it. If indexing fails the file
    /// is deleted best-effort and the index error propagates, so a failed
    /// create leaves nothing behind.
    pub async fn create(
        &self,
        content: &str,
        title: Option<&str>,
        keywords: Option<&str>,
    ) -> FolioResult<(String, PathBuf)> {
        let index = self.index().await?;

        let (id, path) = self.store.create(content)?;

        let article = Article {
            id: id.clone(),
            path: path.clone(),
            content: content.to_string(),
            title: title.map(str::to_string),
            keywords: keywords.map(str::to_string),
        };

        if let Err(e) = index.index_article(&article).await {
            // Compensate, and report the index failure rather than any
            // failure of the compensation itself.
            let _ = self.store.delete(&path);
            return Err(FolioError::Index(e));
        }

        Ok((id, path))
    }

    /// Reads the authoritative content of an article straight from disk.
    pub fn read(&self, id: &str) -> FolioResult<String> {
        let path = self.store.path_for(id);
        Ok(self.store.read(&path)?)
    }

    /// Replaces an article's content (and optionally title/keywords).
    ///
    /// The file is overwritten first, then re-indexed. There is no
    /// pre-image: if re-indexing fails after the overwrite, the stores
    /// disagree about the content and the caller is told so via
    /// [`FolioError::PartialUpdate`] instead of a generic failure.
    pub async fn update(
        &self,
        id: &str,
        content: &str,
        title: Option<&str>,
        keywords: Option<&str>,
    ) -> FolioResult<()> {
        let index = self.index().await?;

        let path = self.store.path_for(id);
        self.store.read(&path)?;
        self.store.update(&path, content)?;

        let article = Article {
            id: id.to_string(),
            path: path.clone(),
            content: content.to_string(),
            title: title.map(str::to_string),
            keywords: keywords.map(str::to_string),
        };

        index
            .index_article(&article)
            .await
            .map_err(|source| FolioError::PartialUpdate {
                id: id.to_string(),
                source,
            })
    }

    /// Deletes an article's file and index rows.
    ///
    /// The file goes first: if that fails the index is left untouched and
    /// the article stays discoverable, which beats silently dropping the
    /// index entry for a file that may still exist. If de-indexing then
    /// fails, the index error propagates and the lingering rows are a
    /// detectable inconsistency for a later repair pass.
    pub async fn delete(&self, id: &str) -> FolioResult<()> {
        let index = self.index().await?;

        let path = self.store.path_for(id);
        self.store.delete(&path)?;
        index.deindex_article(id).await?;

        Ok(())
    }

    /// Searches indexed articles. See [`Query::search`].
    pub async fn search(&self, query: &str, limit: u32) -> FolioResult<Vec<SearchHit>> {
        let index = self.index().await?;
        Ok(Query::new(index).search(query, limit).await?)
    }

    /// Lists indexed article metadata, paginated. See [`Query::list`].
    pub async fn list(&self, page: u32, size: u32) -> FolioResult<Vec<ArticleMeta>> {
        let index = self.index().await?;
        Ok(Query::new(index).list(page, size).await?)
    }

    /// Finds articles sharing a keyword tag. See [`Query::find_related`].
    pub async fn related(&self, keyword: &str, limit: u32) -> FolioResult<Vec<ArticleMeta>> {
        let index = self.index().await?;
        Ok(Query::new(index).find_related(keyword, limit).await?)
    }

    /// Closes the index database if it was ever opened. Idempotent.
    pub async fn close(&self) {
        if let Some(index) = self.index.get() {
            index.close().await;
        }
    }
}
