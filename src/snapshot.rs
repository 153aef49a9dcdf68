use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::StorageConfig;
use crate::models::Product;
use crate::utils::error::Result;

/// Writes the product list of a finished session to a fixed JSON document.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(storage.snapshot_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the document with `products`, four-space indented.
    pub async fn write(&self, products: &[Product]) -> Result<()> {
        let body = to_indented_json(products)?;
        tokio::fs::write(&self.path, body).await?;
        info!("Saved {} products to {:?}", products.len(), self.path);
        Ok(())
    }

    pub async fn read(&self) -> Result<Vec<Product>> {
        let body = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn to_indented_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Create the data and image directories if they are missing.
pub async fn ensure_dirs(storage: &StorageConfig) -> Result<()> {
    tokio::fs::create_dir_all(&storage.data_dir).await?;
    tokio::fs::create_dir_all(&storage.images_dir).await?;
    Ok(())
}
