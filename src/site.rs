//! The request kernel.
//!
//! [`Site::handle`] is the whole pipeline for one request:
//!
//! ```text
//! Request ──► Router ──► method check ──► PageCache (status < 300) ──► Reply
//!                │                                   │
//!                └──── HttpError ──► error view ◄────┘
//! ```
//!
//! Every service (globals, collection, renderer, router, cache) is built
//! fresh per request, so nothing leaks between requests. Expected HTTP
//! failures become the error view with their status kept; any other error
//! is returned to the caller, and [`Site::respond`] turns it into a fault.

use crate::cache::{CacheMode, CachedResponse, PageCache};
use crate::collection::{CachedCollection, Collection, FsCollection, Visibility};
use crate::config::{SiteConfig, load_config};
use crate::context::{Globals, Props, props};
use crate::error::{Error, Result};
use crate::fault::Fault;
use crate::http::{HttpError, Reply};
use crate::markdown::Markdown;
use crate::page::Page;
use crate::renderer::Renderer;
use crate::request::Request;
use crate::response::Response;
use crate::router::{FIXED_ROUTES, Router};
use crate::url::Url;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info};

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

pub struct Site {
    root: PathBuf,
    config: SiteConfig,
    local: bool,
    base_url: String,
}

/// Per-request services.
struct Services {
    request: Request,
    url: Url,
    collection: Rc<dyn Collection>,
    renderer: Renderer,
    router: Router,
    cache: PageCache,
}

/// A routed response, either through the page cache or not.
enum Outgoing {
    Cached(CachedResponse),
    Plain(Response),
}

impl Outgoing {
    /// Render the body and assemble the wire reply.
    fn finish(self, head: bool) -> Result<Reply> {
        let (status, body, mut headers) = match self {
            Outgoing::Cached(response) => {
                let body = response.render()?;
                (response.status(), body, response.headers())
            }
            Outgoing::Plain(response) => {
                let body = response.render()?;
                (response.status(), body, response.headers().to_vec())
            }
        };
        let has_type = headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("Content-Type"));
        if !has_type && !body.is_empty() {
            headers.insert(0, ("Content-Type".to_string(), HTML_CONTENT_TYPE.to_string()));
        }
        headers.push(("Content-Length".to_string(), body.len().to_string()));
        Ok(Reply {
            status,
            headers,
            body,
            suppress_body: head,
        })
    }
}

/// One route materialised by [`Site::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltRoute {
    pub path: String,
    pub status: u16,
    pub bytes: usize,
    /// Cache file, for cacheable statuses.
    pub file: Option<PathBuf>,
    pub cache_miss: Option<bool>,
}

/// The pages of one content kind, as reported by [`Site::inventory`].
#[derive(Debug, Clone)]
pub struct KindInventory {
    pub kind: String,
    pub pages: Vec<Page>,
}

impl Site {
    pub fn new(root: impl Into<PathBuf>, config: SiteConfig, local: bool) -> Self {
        let base_url = config.base_url(local).to_string();
        Self {
            root: root.into(),
            config,
            local,
            base_url,
        }
    }

    /// Load `site.toml` from `root`.
    pub fn load(root: &Path, local: bool) -> Result<Self> {
        let config = load_config(root)?;
        Ok(Self::new(root, config, local))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn is_local(&self) -> bool {
        self.local
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn views_dir(&self) -> PathBuf {
        self.config.paths.views_dir(&self.root)
    }

    pub fn public_dir(&self) -> PathBuf {
        self.config.paths.public_dir(&self.root)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.config.paths.cache_dir(&self.root)
    }

    pub fn error_log(&self) -> PathBuf {
        self.config.paths.error_log(&self.root)
    }

    fn globals(&self, method: &str, path: &str, listing: Visibility) -> Rc<Globals> {
        Rc::new(Globals {
            request: Request::new(&self.base_url, method, path),
            url: Url::new(&self.base_url, self.public_dir(), self.views_dir()),
            markdown: Markdown::new(),
            site: self.config.site.clone(),
            listing,
        })
    }

    fn services(&self, method: &str, path: &str) -> Services {
        let listing = if self.local {
            Visibility::All
        } else {
            Visibility::Published
        };
        let globals = self.globals(method, path, listing);
        let request = globals.request.clone();
        let url = globals.url.clone();

        let mut collection: Rc<dyn Collection> =
            Rc::new(FsCollection::new(self.views_dir(), Rc::clone(&globals)));
        if self.config.cache.collections && !self.local {
            collection = Rc::new(CachedCollection::new(self.cache_dir(), collection));
        }

        let renderer = Renderer::new(self.views_dir(), Rc::clone(&globals), Rc::clone(&collection));
        let router = Router::new(
            renderer.clone(),
            Rc::clone(&collection),
            url.clone(),
            self.config.routing.kinds.clone(),
            self.config.redirects.clone(),
        );
        let mode = if self.local {
            CacheMode::Bypass
        } else {
            CacheMode::Trust
        };

        Services {
            request,
            url,
            collection,
            renderer,
            router,
            cache: PageCache::new(self.public_dir(), mode),
        }
    }

    fn dispatch(&self, services: &Services) -> Result<Outgoing> {
        let request = &services.request;
        let response = services.router.route(request)?;
        let status = response.status();

        if self.config.routing.method_policy.applies_to(status) && !request.is_read() {
            debug!(method = request.method(), status, "method rejected");
            return Err(HttpError::MethodNotAllowed.into());
        }

        if status < 300 {
            Ok(Outgoing::Cached(services.cache.apply(request.path(), response)))
        } else {
            Ok(Outgoing::Plain(response))
        }
    }

    /// Handle one request. Expected HTTP failures are rendered as the error
    /// view; any other failure is returned.
    pub fn handle(&self, method: &str, path: &str) -> Result<Reply> {
        let services = self.services(method, path);
        let request = &services.request;
        let head = request.is_head();

        let reply = match self.dispatch(&services).and_then(|out| out.finish(head)) {
            Ok(reply) => reply,
            Err(Error::Http(failure)) => {
                let message = failure.to_string();
                let response = services.renderer.render(
                    "error",
                    props([("message", message.as_str())]),
                    failure.status(),
                )?;
                Outgoing::Plain(response).finish(head)?
            }
            Err(e) => return Err(e),
        };

        info!(
            method = request.method(),
            path = request.path(),
            status = reply.status,
            cache_miss = ?reply.header("Cache-Miss"),
            "request handled"
        );
        Ok(reply)
    }

    /// [`handle`](Self::handle), with unexpected failures reported as faults
    /// located at the call site.
    #[track_caller]
    pub fn respond(&self, method: &str, path: &str) -> Reply {
        match self.handle(method, path) {
            Ok(reply) => reply,
            Err(e) => Fault::from_error(&e).report(&self.error_log()),
        }
    }

    /// Every routable path: the fixed pages plus every page of every kind,
    /// hidden ones included.
    pub fn routes(&self) -> Result<Vec<String>> {
        let services = self.services("get", "/");
        let mut routes: Vec<String> = FIXED_ROUTES.iter().map(|r| r.to_string()).collect();
        for kind in &self.config.routing.kinds {
            for page in services.collection.load(kind, Visibility::All, &Props::new())? {
                routes.push(services.url.route(&page)?);
            }
        }
        Ok(routes)
    }

    /// GET every route, warming the page cache.
    pub fn build(&self) -> Result<Vec<BuiltRoute>> {
        let cache = PageCache::new(self.public_dir(), CacheMode::Trust);
        let mut built = Vec::new();
        for path in self.routes()? {
            let reply = self.handle("GET", &path)?;
            built.push(BuiltRoute {
                file: (reply.status < 300).then(|| cache.path_for(&path)),
                cache_miss: reply.header("Cache-Miss").map(|v| v == "1"),
                status: reply.status,
                bytes: reply.body.len(),
                path,
            });
        }
        Ok(built)
    }

    /// Load every kind straight from disk, failing on the first bad file.
    pub fn inventory(&self) -> Result<Vec<KindInventory>> {
        let globals = self.globals("get", "/", Visibility::All);
        let collection = FsCollection::new(self.views_dir(), globals);
        self.config
            .routing
            .kinds
            .iter()
            .map(|kind| {
                let pages = collection.load(kind, Visibility::All, &Props::new())?;
                Ok(KindInventory {
                    kind: kind.clone(),
                    pages,
                })
            })
            .collect()
    }
}
