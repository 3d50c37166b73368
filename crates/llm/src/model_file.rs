use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// A model artifact that was found on disk.
#[derive(Debug, Clone)]
pub struct ModelFile {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl ModelFile {
    /// Check that `path` exists and is a regular file.
    pub fn inspect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path)
            .with_context(|| format!("Model file not found at {}", path.display()))?;
        if !meta.is_file() {
            bail!("Model path {} is not a file", path.display());
        }
        Ok(Self {
            path: path.to_path_buf(),
            size_bytes: meta.len(),
        })
    }

    pub fn size_gb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_GB
    }
}
