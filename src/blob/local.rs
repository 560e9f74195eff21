use super::{mp4, BlobKind, BlobStore, StoredBlob, UnsupportedMedia};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const MEDIA_URL_PREFIX: &str = "/media/";

/// Blob store backed by a flat directory, served by the static-files route.
pub struct LocalBlobStore {
    media_dir: PathBuf,
}

impl LocalBlobStore {
    pub fn new<T: AsRef<Path>>(media_dir: T) -> Result<Self> {
        std::fs::create_dir_all(media_dir.as_ref()).with_context(|| {
            format!("Failed to create media dir {}", media_dir.as_ref().display())
        })?;
        Ok(LocalBlobStore {
            media_dir: media_dir.as_ref().to_path_buf(),
        })
    }

    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    fn extension_for(kind: BlobKind, bytes: &[u8]) -> Result<&'static str> {
        let matched = infer::get(bytes).ok_or(UnsupportedMedia { kind })?;
        let expected_prefix = match kind {
            BlobKind::Video => "video/",
            BlobKind::Image => "image/",
        };
        if !matched.mime_type().starts_with(expected_prefix) {
            return Err(UnsupportedMedia { kind }.into());
        }
        Ok(matched.extension())
    }
}

impl BlobStore for LocalBlobStore {
    fn store(&self, kind: BlobKind, bytes: &[u8]) -> Result<StoredBlob> {
        let extension = Self::extension_for(kind, bytes)?;
        let filename = format!("{}.{}", uuid::Uuid::new_v4(), extension);
        let path = self.media_dir.join(&filename);
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write blob {}", path.display()))?;
        debug!("Stored {} blob {} ({} bytes)", kind, filename, bytes.len());

        let duration_seconds = match kind {
            BlobKind::Video => mp4::probe_duration(bytes),
            BlobKind::Image => None,
        };
        Ok(StoredBlob {
            url: format!("{}{}", MEDIA_URL_PREFIX, filename),
            duration_seconds,
        })
    }

    fn delete(&self, url: &str) -> Result<()> {
        let filename = match url.strip_prefix(MEDIA_URL_PREFIX) {
            Some(name) => name,
            None => return Ok(()),
        };
        // Urls we minted contain a single flat filename, refuse anything else.
        if filename.contains('/') || filename.contains("..") {
            return Ok(());
        }
        let path = self.media_dir.join(filename);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Deleted blob {}", filename);
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("Failed to delete {}", path.display())),
        }
    }
}
