use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::scraper::PageFetcher;

const IMAGE_EXTENSION: &str = "jpg";

/// File name for a product image: `/` and spaces become `_`.
pub fn image_file_name(title: &str) -> String {
    format!("{}.{}", title.replace(['/', ' '], "_"), IMAGE_EXTENSION)
}

pub fn image_path(images_dir: &Path, title: &str) -> PathBuf {
    images_dir.join(image_file_name(title))
}

/// Downloads product thumbnails through the session's fetcher.
pub struct ImageRetriever {
    fetcher: Arc<dyn PageFetcher>,
    images_dir: PathBuf,
}

impl ImageRetriever {
    pub fn new(fetcher: Arc<dyn PageFetcher>, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            images_dir: images_dir.into(),
        }
    }

    /// Download `url` to the title's image path and return that path.
    ///
    /// Failures are logged and swallowed: the path is returned either way and may
    /// point at a file that was never written.
    pub async fn retrieve(&self, url: &str, title: &str) -> PathBuf {
        let path = image_path(&self.images_dir, title);

        if url.is_empty() {
            debug!(title, "No image URL, skipping download");
            return path;
        }

        let bytes = match self.fetcher.fetch_bytes(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to download image for {}: {}", title, e);
                return path;
            }
        };

        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            warn!("Failed to save image for {} to {:?}: {}", title, path, e);
        }

        path
    }
}
