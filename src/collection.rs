//! Discovering and listing the pages of one content kind.
//!
//! A kind is a directory under the views root (`posts/`, `talk/`). Every file
//! in it is one content item. Loading renders each item to extract its
//! [`Page`], and the result is sorted newest first.
//!
//! Loading is fail-fast: one file without front matter, with bad front
//! matter, or pointing at a missing asset aborts the whole load. These are
//! authoring mistakes and should never ship as a silently shorter list.

use crate::cache::write_atomic;
use crate::capture::{Captured, capture};
use crate::context::{Context, Globals, Props};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::page::Page;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info};

/// Which pages a load returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Hidden pages dropped; what listings and feeds show.
    Published,
    /// Every page, hidden ones included.
    All,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Published => "published",
            Visibility::All => "all",
        }
    }
}

pub trait Collection {
    /// Pages of `kind`, newest first.
    fn load(&self, kind: &str, visibility: Visibility, props: &Props) -> Result<Vec<Page>>;
}

/// Scans `{views}/{kind}/*` and renders every file.
pub struct FsCollection {
    views_dir: PathBuf,
    globals: Rc<Globals>,
}

impl FsCollection {
    pub fn new(views_dir: impl Into<PathBuf>, globals: Rc<Globals>) -> Self {
        Self {
            views_dir: views_dir.into(),
            globals,
        }
    }

    fn sources(&self, kind: &str) -> Result<Vec<PathBuf>> {
        let dir = self.views_dir.join(kind);
        if !dir.is_dir() {
            debug!(kind, dir = %dir.display(), "collection directory missing");
            return Ok(Vec::new());
        }
        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && !is_dotfile(p))
            .collect();
        // Enumeration order is filesystem-dependent; fix it before the date
        // sort so ties come out the same on every machine.
        paths.sort();
        Ok(paths)
    }
}

impl Collection for FsCollection {
    fn load(&self, kind: &str, visibility: Visibility, props: &Props) -> Result<Vec<Page>> {
        let mut pages = Vec::new();
        for path in self.sources(kind)? {
            let ctx = Context::new(&self.globals, self, props);
            let document = Document::read(&path)?;
            let Captured { value: page, .. } = capture(|out| document.render(&ctx, out))?;
            let page = page.ok_or_else(|| Error::MissingPage { file: path.clone() })?;

            if visibility == Visibility::Published && page.hidden {
                debug!(file = %path.display(), "skipping hidden page");
                continue;
            }
            pages.push(page);
        }

        sort_newest_first(&mut pages);
        debug!(kind, visibility = visibility.as_str(), count = pages.len(), "collection loaded");
        Ok(pages)
    }
}

/// Stable sort by date, descending.
pub fn sort_newest_first(pages: &mut [Page]) {
    pages.sort_by(|a, b| b.date.cmp(&a.date));
}

fn is_dotfile(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Memoises another collection's results as JSON files under a cache
/// directory, one per (kind, visibility).
///
/// A missing or unreadable cache file falls back to the wrapped collection
/// and writes the fresh result back. Nothing invalidates these files; delete
/// them to pick up content changes. Props do not participate in the key.
pub struct CachedCollection {
    cache_dir: PathBuf,
    inner: Rc<dyn Collection>,
}

impl CachedCollection {
    pub fn new(cache_dir: impl Into<PathBuf>, inner: Rc<dyn Collection>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            inner,
        }
    }

    pub fn path_for(&self, kind: &str, visibility: Visibility) -> PathBuf {
        self.cache_dir
            .join(format!("{kind}-{}-collection.json", visibility.as_str()))
    }

    fn read(path: &Path) -> Option<Vec<Page>> {
        let content = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(pages) => Some(pages),
            Err(e) => {
                info!(path = %path.display(), error = %e, "discarding corrupt collection cache");
                None
            }
        }
    }
}

impl Collection for CachedCollection {
    fn load(&self, kind: &str, visibility: Visibility, props: &Props) -> Result<Vec<Page>> {
        let path = self.path_for(kind, visibility);
        if let Some(pages) = Self::read(&path) {
            debug!(kind, path = %path.display(), "collection cache hit");
            return Ok(pages);
        }

        let pages = self.inner.load(kind, visibility, props)?;
        let json = serde_json::to_string_pretty(&pages)?;
        write_atomic(&path, json.as_bytes())?;
        debug!(kind, path = %path.display(), "collection cache written");
        Ok(pages)
    }
}
