use thiserror::Error;

#[derive(Debug, Error)]
pub enum FolioError {
    #[error(transparent)]
    Store(#[from] crate::store::StoreError),

    #[error(transparent)]
    Index(#[from] crate::index::IndexError),

    /// The file for `id` was overwritten but re-indexing it failed, so the
    /// file and the index disagree about its content until the next
    /// successful update. No pre-image is kept, so this cannot be rolled
    /// back automatically.
    #[error("article {id} was updated on disk but re-indexing failed: {source}")]
    PartialUpdate {
        id: String,
        #[source]
        source: crate::index::IndexError,
    },

    #[error("could not resolve knowledge base directory: {0}")]
    BaseDir(String),
}

pub type FolioResult<T> = Result<T, FolioError>;
