//! URL building: site links, cache-busted assets, canonical page URLs.
//!
//! Asset URLs carry a `?v=` query derived from the SHA-256 of the asset's
//! bytes. The same bytes always produce the same URL; any edit to the file
//! changes it, so far-future caching of `/assets/` is safe.

use crate::page::Page;
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Length of the hex digest prefix used as the asset version.
const ASSET_VERSION_LEN: usize = 16;

#[derive(Error, Debug)]
pub enum UrlError {
    #[error("Asset not found [{}]", .0.display())]
    AssetNotFound(PathBuf),
    #[error("Page [{}] is not located within the views directory", .0.display())]
    InvalidPageLocation(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct Url {
    base: String,
    public_dir: PathBuf,
    views_dir: PathBuf,
}

impl Url {
    pub fn new(base: &str, public_dir: impl Into<PathBuf>, views_dir: impl Into<PathBuf>) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            public_dir: public_dir.into(),
            views_dir: views_dir.into(),
        }
    }

    /// Join `path` onto the base. An empty path yields the bare base.
    pub fn to(&self, path: &str) -> String {
        let path = path.trim_matches('/');
        if path.is_empty() {
            self.base.clone()
        } else {
            format!("{}/{}", self.base, path)
        }
    }

    /// URL for a file under `{public}/assets/`, versioned by content hash.
    pub fn asset(&self, path: &str) -> Result<String, UrlError> {
        let path = path.trim_matches('/');
        let file = self.public_dir.join("assets").join(path);
        if !file.is_file() {
            return Err(UrlError::AssetNotFound(file));
        }
        let hash = hash_file(&file)?;
        Ok(format!(
            "{}?v={}",
            self.to(&format!("assets/{path}")),
            &hash[..ASSET_VERSION_LEN]
        ))
    }

    /// Canonical URL of a page: its source path relative to the views
    /// directory, extension dropped.
    ///
    /// `{views}/posts/hello-world.md` → `{base}/posts/hello-world`
    pub fn page(&self, page: &Page) -> Result<String, UrlError> {
        Ok(self.to(&self.route(page)?))
    }

    /// Request path of a page, e.g. `/posts/hello-world`.
    pub fn route(&self, page: &Page) -> Result<String, UrlError> {
        let relative = page
            .file
            .strip_prefix(&self.views_dir)
            .map_err(|_| UrlError::InvalidPageLocation(page.file.clone()))?;
        let stem = relative.with_extension("");
        let segments: Vec<String> = stem
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if segments.is_empty() {
            return Err(UrlError::InvalidPageLocation(page.file.clone()));
        }
        Ok(format!("/{}", segments.join("/")))
    }
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}
