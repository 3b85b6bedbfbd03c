//! Maps a request path to a response.
//!
//! Fixed routes come first, then configured redirects, then content lookup:
//! `/{kind}/{slug}` is matched against the canonical URLs of every page in
//! that kind, hidden pages included, so a hidden post is still reachable by
//! anyone holding its link.

use crate::collection::{Collection, Visibility};
use crate::context::Props;
use crate::error::Result;
use crate::http::HttpError;
use crate::renderer::Renderer;
use crate::request::Request;
use crate::response::Response;
use crate::url::Url;
use regex::Regex;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::LazyLock;
use tracing::debug;

static CONTENT_ROUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/([0-9a-z-]+)/([0-9a-z-]+)$").expect("valid route pattern"));

pub const FEED_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Routes served before redirects and content lookup.
pub const FIXED_ROUTES: [&str; 3] = ["/", "/about", "/feed.xml"];

pub struct Router {
    renderer: Renderer,
    collection: Rc<dyn Collection>,
    url: Url,
    kinds: Vec<String>,
    redirects: BTreeMap<String, String>,
}

impl Router {
    pub fn new(
        renderer: Renderer,
        collection: Rc<dyn Collection>,
        url: Url,
        kinds: Vec<String>,
        redirects: BTreeMap<String, String>,
    ) -> Self {
        Self {
            renderer,
            collection,
            url,
            kinds,
            redirects,
        }
    }

    pub fn route(&self, request: &Request) -> Result<Response> {
        match request.path() {
            "/" => self.renderer.render("home", Props::new(), 200),
            "/about" => self.renderer.render("about", Props::new(), 200),
            "/feed.xml" => Ok(self
                .renderer
                .render("feed.xml", Props::new(), 200)?
                .with_header("Content-Type", FEED_CONTENT_TYPE)),
            path => match self.redirects.get(path) {
                Some(target) => Ok(Response::redirect(self.location(target))),
                None => self.lookup(request),
            },
        }
    }

    /// Site-relative targets are made absolute; anything else passes through.
    fn location(&self, target: &str) -> String {
        if target.starts_with('/') {
            self.url.to(target)
        } else {
            target.to_string()
        }
    }

    fn lookup(&self, request: &Request) -> Result<Response> {
        let Some(captures) = CONTENT_ROUTE.captures(request.path()) else {
            return Err(HttpError::NotFound.into());
        };
        let kind = &captures[1];
        if !self.kinds.iter().any(|k| k == kind) {
            debug!(kind, "unknown content kind");
            return Err(HttpError::NotFound.into());
        }

        let wanted = request.url();
        for page in self.collection.load(kind, Visibility::All, &Props::new())? {
            if self.url.page(&page)? == wanted {
                return self
                    .renderer
                    .render(&page.file.to_string_lossy(), Props::new(), 200);
            }
        }
        Err(HttpError::NotFound.into())
    }
}
