//! Raw media storage, decoupled from the HTTP layer and the metadata store.
//!
//! Controllers upload blobs first and only then write metadata rows, so a
//! failed upload never leaves a dangling url in the database.

mod local;
mod mp4;

pub use local::LocalBlobStore;

use anyhow::Result;

/// What a blob is expected to be; the stored bytes must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    Video,
    Image,
}

impl std::fmt::Display for BlobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlobKind::Video => write!(f, "video"),
            BlobKind::Image => write!(f, "image"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("payload is not a recognized {kind} format")]
pub struct UnsupportedMedia {
    pub kind: BlobKind,
}

/// A stored blob, addressed by the public url it is served under.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub url: String,
    /// Probed from the container where the format allows it.
    pub duration_seconds: Option<f64>,
}

pub trait BlobStore: Send + Sync {
    /// Validates the payload against `kind` and persists it under a fresh url.
    fn store(&self, kind: BlobKind, bytes: &[u8]) -> Result<StoredBlob>;

    /// Deletes the blob behind a url previously returned by [`BlobStore::store`].
    /// Unknown urls are a no-op.
    fn delete(&self, url: &str) -> Result<()>;
}
