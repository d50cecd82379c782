//! Native media source construction

use crate::native::{NativeMediaSource, NativePlayer, ResolvedFile};
use crate::player::MediaFileType;
use crate::utils::error::{AdapterError, Result};
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// Parse a locator as an absolute URI
pub fn parse_uri(locator: &str) -> Result<Url> {
    Url::parse(locator).map_err(|e| AdapterError::InvalidUri {
        uri: locator.to_string(),
        reason: e.to_string(),
    })
}

/// Resolve a local path (or `file://` URI) to an existing file
pub async fn resolve_local_file(locator: &str) -> Result<ResolvedFile> {
    let path = match Url::parse(locator) {
        Ok(uri) if uri.scheme() == "file" => uri
            .to_file_path()
            .map_err(|_| AdapterError::NotFound(locator.to_string()))?,
        _ => PathBuf::from(locator),
    };

    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|e| AdapterError::NotFound(format!("{}: {}", locator, e)))?;
    if !metadata.is_file() {
        return Err(AdapterError::NotFound(format!("{}: not a file", locator)));
    }

    let path = tokio::fs::canonicalize(&path)
        .await
        .map_err(|e| AdapterError::NotFound(format!("{}: {}", locator, e)))?;

    Ok(ResolvedFile {
        path,
        size: metadata.len(),
    })
}

/// Builds native sources for a locator and file type
pub struct MediaSourceBuilder {
    native: Arc<dyn NativePlayer>,
}

impl MediaSourceBuilder {
    pub fn new(native: Arc<dyn NativePlayer>) -> Self {
        Self { native }
    }

    pub async fn build(
        &self,
        locator: &str,
        file_type: MediaFileType,
    ) -> Result<Arc<dyn NativeMediaSource>> {
        match file_type {
            MediaFileType::AudioFile | MediaFileType::VideoFile => {
                let file = resolve_local_file(locator).await?;
                debug!("Resolved {} to {:?} ({} bytes)", locator, file.path, file.size);
                self.native.create_source_from_file(&file)
            }
            MediaFileType::AudioUrl | MediaFileType::VideoUrl | MediaFileType::Other => {
                let uri = parse_uri(locator)?;
                self.native.create_source_from_uri(&uri)
            }
        }
    }
}
