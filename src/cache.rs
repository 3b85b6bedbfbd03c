//! Write-through page cache under the public directory.
//!
//! A rendered route is materialised at the path a static file server would
//! look for it, so a warm cache is also a deployable static site:
//!
//! ```text
//! /                 → public/index.html
//! /posts/hello      → public/posts/hello/index.html
//! /feed.xml         → public/feed.xml
//! ```
//!
//! A file on disk is a hit and is served verbatim. There is no TTL: delete the
//! file to force a re-render. In [`CacheMode::Bypass`] (local development)
//! every request re-renders and rewrites the file.
//!
//! Concurrent requests for the same cold route both render and both write;
//! writes go through a temp file plus rename, so the last writer wins with a
//! complete file.

use crate::error::Result;
use crate::response::Response;
use std::cell::Cell;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

/// File name a directory-style route is materialised as.
const INDEX_FILENAME: &str = "index.html";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Unable to create directory [{}]: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("Unable to write cache file [{}]: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Serve existing files; render and write on a miss.
    Trust,
    /// Always render and rewrite.
    Bypass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

#[derive(Debug, Clone)]
pub struct PageCache {
    public_dir: PathBuf,
    mode: CacheMode,
}

impl PageCache {
    pub fn new(public_dir: impl Into<PathBuf>, mode: CacheMode) -> Self {
        Self {
            public_dir: public_dir.into(),
            mode,
        }
    }

    /// Cache file for a request path. Paths with an extension are taken
    /// literally; everything else becomes `{path}/index.html`.
    pub fn path_for(&self, request_path: &str) -> PathBuf {
        let route = request_path.trim_matches('/');
        if route.is_empty() {
            return self.public_dir.join(INDEX_FILENAME);
        }
        let literal = self.public_dir.join(route);
        if Path::new(route).extension().is_some() {
            literal
        } else {
            literal.join(INDEX_FILENAME)
        }
    }

    pub fn apply(&self, request_path: &str, response: Response) -> CachedResponse {
        let path = self.path_for(request_path);
        let mode = self.mode;
        let outcome = Rc::new(Cell::new(None));
        let recorder = Rc::clone(&outcome);

        let response = response.decorate(move |inner| {
            if mode == CacheMode::Trust {
                match fs::read_to_string(&path) {
                    Ok(content) => {
                        debug!(path = %path.display(), "page cache hit");
                        recorder.set(Some(CacheStatus::Hit));
                        return Ok(content);
                    }
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => warn!(path = %path.display(), error = %e, "unreadable cache file, re-rendering"),
                }
            }

            recorder.set(Some(CacheStatus::Miss));
            let content = inner.render()?;
            write_atomic(&path, content.as_bytes())?;
            debug!(path = %path.display(), bytes = content.len(), "page cache written");
            Ok(content)
        });

        CachedResponse { response, outcome }
    }
}

/// A response whose render goes through the page cache and records whether
/// it was a hit.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    response: Response,
    outcome: Rc<Cell<Option<CacheStatus>>>,
}

impl CachedResponse {
    pub fn status(&self) -> u16 {
        self.response.status()
    }

    /// The wrapped headers plus `Cache-Miss: 0|1` once rendered.
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers = self.response.headers().to_vec();
        if let Some(status) = self.outcome.get() {
            let miss = if status == CacheStatus::Miss { "1" } else { "0" };
            headers.push(("Cache-Miss".to_string(), miss.to_string()));
        }
        headers
    }

    pub fn render(&self) -> Result<String> {
        self.response.render()
    }

    /// Outcome of the most recent render, if any.
    pub fn cache_status(&self) -> Option<CacheStatus> {
        self.outcome.get()
    }
}

/// Write `bytes` to `path` via a sibling temp file and rename, creating
/// parent directories as needed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::result::Result<(), CacheError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|source| CacheError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let write_err = |source| CacheError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
    file.write_all(bytes).map_err(write_err)?;
    file.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    fn counting_response(calls: &Rc<Cell<u32>>, body: &'static str) -> Response {
        let counter = Rc::clone(calls);
        Response::new(move || {
            counter.set(counter.get() + 1);
            Ok(body.to_string())
        })
    }

    #[test]
    fn path_for_routes() {
        let cache = PageCache::new("/site/public", CacheMode::Trust);
        assert_eq!(cache.path_for("/"), PathBuf::from("/site/public/index.html"));
        assert_eq!(
            cache.path_for("/posts/hello"),
            PathBuf::from("/site/public/posts/hello/index.html")
        );
        assert_eq!(cache.path_for("/feed.xml"), PathBuf::from("/site/public/feed.xml"));
    }

    #[test]
    fn miss_renders_and_writes_then_hit_serves_file() {
        let tmp = TempDir::new().unwrap();
        let cache = PageCache::new(tmp.path(), CacheMode::Trust);
        let calls = Rc::new(Cell::new(0));

        let first = cache.apply("/posts/a", counting_response(&calls, "<p>a</p>"));
        assert_eq!(first.render().unwrap(), "<p>a</p>");
        assert_eq!(first.cache_status(), Some(CacheStatus::Miss));
        assert!(first.headers().contains(&("Cache-Miss".into(), "1".into())));
        assert_eq!(
            fs::read_to_string(tmp.path().join("posts/a/index.html")).unwrap(),
            "<p>a</p>"
        );

        let second = cache.apply("/posts/a", counting_response(&calls, "<p>changed</p>"));
        assert_eq!(second.render().unwrap(), "<p>a</p>");
        assert_eq!(second.cache_status(), Some(CacheStatus::Hit));
        assert!(second.headers().contains(&("Cache-Miss".into(), "0".into())));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn bypass_always_renders() {
        let tmp = TempDir::new().unwrap();
        let cache = PageCache::new(tmp.path(), CacheMode::Bypass);
        let calls = Rc::new(Cell::new(0));

        for body in ["one", "two"] {
            let response = cache.apply("/", counting_response(&calls, body));
            assert_eq!(response.render().unwrap(), body);
            assert_eq!(response.cache_status(), Some(CacheStatus::Miss));
        }
        assert_eq!(calls.get(), 2);
        assert_eq!(fs::read_to_string(tmp.path().join("index.html")).unwrap(), "two");
    }

    #[test]
    fn no_header_before_render() {
        let tmp = TempDir::new().unwrap();
        let cache = PageCache::new(tmp.path(), CacheMode::Trust);
        let response = cache.apply("/", Response::new(|| Ok(String::new())));
        assert!(response.headers().is_empty());
        assert_eq!(response.cache_status(), None);
    }

    #[test]
    fn directory_creation_failure_is_cache_error() {
        let tmp = TempDir::new().unwrap();
        // A regular file where the public directory should be.
        let blocker = tmp.path().join("public");
        fs::write(&blocker, "not a dir").unwrap();
        let cache = PageCache::new(&blocker, CacheMode::Trust);

        let err = cache
            .apply("/posts/a", Response::new(|| Ok("x".into())))
            .render()
            .unwrap_err();
        assert!(matches!(err, Error::Cache(CacheError::CreateDir { .. })));
    }

    #[test]
    fn file_write_failure_is_cache_error() {
        let tmp = TempDir::new().unwrap();
        // A directory where the feed file should be written.
        fs::create_dir_all(tmp.path().join("feed.xml")).unwrap();
        let cache = PageCache::new(tmp.path(), CacheMode::Trust);

        let err = cache
            .apply("/feed.xml", Response::new(|| Ok("<feed/>".into())))
            .render()
            .unwrap_err();
        match err {
            Error::Cache(CacheError::Write { path, .. }) => {
                assert_eq!(path, tmp.path().join("feed.xml"))
            }
            other => panic!("expected CacheError::Write, got {other:?}"),
        }
    }

    #[test]
    fn render_failure_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let cache = PageCache::new(tmp.path(), CacheMode::Trust);
        let response = cache.apply(
            "/",
            Response::new(|| Err(Error::MissingPage { file: "x.md".into() })),
        );
        assert!(response.render().is_err());
        assert!(!tmp.path().join("index.html").exists());
    }
}
