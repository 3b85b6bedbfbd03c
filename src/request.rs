//! The incoming request: base URL, method, normalized path.

/// Immutable request value.
///
/// - `base` never ends with a slash.
/// - `method` is lower-cased.
/// - `path` always starts with `/` and never ends with one, except the root.
///   Query strings and a trailing `/index.html` are dropped, so a request for
///   a materialised cache file maps back to its route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    base: String,
    method: String,
    path: String,
}

impl Request {
    pub fn new(base: &str, method: &str, path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let mut path = path.trim_matches('/');
        if path == "index.html" {
            path = "";
        } else if let Some(stripped) = path.strip_suffix("/index.html") {
            path = stripped;
        }

        Self {
            base: base.trim_end_matches('/').to_string(),
            method: method.to_ascii_lowercase(),
            path: format!("/{path}"),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// GET and HEAD are the only methods served for known routes.
    pub fn is_read(&self) -> bool {
        matches!(self.method.as_str(), "get" | "head")
    }

    pub fn is_head(&self) -> bool {
        self.method == "head"
    }

    /// Absolute URL of this request. The root path collapses to the base.
    pub fn url(&self) -> String {
        if self.path == "/" {
            self.base.clone()
        } else {
            format!("{}{}", self.base, self.path)
        }
    }
}
