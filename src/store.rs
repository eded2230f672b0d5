use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("article file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to write article file: {0}")]
    Write(#[source] std::io::Error),
}

/// The filesystem half of the knowledge base: one `<id>.md` file per
/// article under a single directory, with the file contents as the
/// authoritative copy of the article body.
///
/// The store knows nothing about the index. It hands out ids and paths
/// and moves bytes; everything else is the coordinator's problem.
pub struct ArticleStore {
    root: PathBuf,
}

impl ArticleStore {
    /// Opens (creating if needed) the articles directory at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(StoreError::Write)?;
        Ok(ArticleStore { root })
    }

    /// The deterministic path for an article id: `{root}/{id}.md`.
    ///
    /// This naming contract is what keeps the files interoperable with
    /// manual edits: the file stem always equals the index's primary key.
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.md"))
    }

    /// Writes `content` to a fresh file and returns its generated id and path.
    ///
    /// Ids are random v4 UUIDs, so collisions are not a practical concern
    /// and ids are never reused after deletion. The write is atomic
    /// (tempfile + rename): a failure never leaves a partial file visible.
    pub fn create(&self, content: &str) -> Result<(String, PathBuf), StoreError> {
        let id = Uuid::new_v4().to_string();
        let path = self.path_for(&id);

        Self::write_atomic(&path, content.as_bytes())?;

        Ok((id, path))
    }

    /// Reads the full content of the article file at `path`.
    ///
    /// Returns [`StoreError::NotFound`] if the path is missing or unreadable.
    pub fn read(&self, path: &Path) -> Result<String, StoreError> {
        fs::read_to_string(path).map_err(|_| StoreError::NotFound(path.to_path_buf()))
    }

    /// Overwrites the file at `path` with `new_content`, atomically.
    ///
    /// Does not check that the path was previously created by this store;
    /// that is the caller's responsibility.
    pub fn update(&self, path: &Path, new_content: &str) -> Result<(), StoreError> {
        Self::write_atomic(path, new_content.as_bytes())
    }

    /// Removes the article file at `path`.
    ///
    /// Returns [`StoreError::NotFound`] if the file is already absent and
    /// [`StoreError::Write`] for any other I/O failure. Compensation callers
    /// ignore the result, so an already-deleted file never masks the error
    /// that triggered the compensation in the first place.
    pub fn delete(&self, path: &Path) -> Result<(), StoreError> {
        fs::remove_file(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(path.to_path_buf())
            } else {
                StoreError::Write(e)
            }
        })
    }

    /// Atomically replaces the file at `path` with `data`.
    ///
    /// Writes to a temporary file in the same directory and renames it
    /// into place, so readers never observe a half-written article.
    fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StoreError> {
        let dir = path.parent().ok_or_else(|| {
            StoreError::Write(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "article path has no parent directory",
            ))
        })?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(StoreError::Write)?;
        tmp.write_all(data).map_err(StoreError::Write)?;
        tmp.persist(path).map_err(|e| StoreError::Write(e.error))?;
        Ok(())
    }
}
