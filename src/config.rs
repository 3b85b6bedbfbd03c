//! Site configuration module.
//!
//! Loads and validates `site.toml` from the project root. Every key is
//! optional: a missing file, or a file that sets only a few keys, falls back
//! to the stock defaults for the rest.
//!
//! ## Configuration Options
//!
//! ```toml
//! [site]
//! title = "My Site"
//! subtitle = "Notes and talks"
//! author = "Site Author"
//! author_uri = "https://example.com"
//! production_url = "https://example.com"   # Base URL in production
//! local_url = "http://localhost:8000"      # Base URL with --local / LOCAL
//! default_image = "fallback.png"           # Under public/assets/
//! profile_image = "profile.png"
//!
//! [paths]
//! views = "resources/views"
//! public = "public"
//! cache = "cache"
//! error_log = "error.log"
//!
//! [routing]
//! kinds = ["posts", "talk"]
//! method_policy = "non-error"              # or "success-only"
//!
//! [cache]
//! collections = true
//!
//! [redirects]
//! "/cv" = "https://example.com/cv.pdf"
//! ```
//!
//! Unknown keys are rejected to catch typos early. Relative paths in
//! `[paths]` are resolved against the project root.

use crate::request::Request;
use crate::router::FIXED_ROUTES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file name, looked up in the project root.
pub const CONFIG_FILENAME: &str = "site.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Identity and presentation values handed to every render.
    pub site: SiteSection,
    pub paths: PathsConfig,
    pub routing: RoutingConfig,
    pub cache: CacheConfig,
    /// Exact request path → redirect target.
    pub redirects: BTreeMap<String, String>,
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, url) in [
            ("site.production_url", &self.site.production_url),
            ("site.local_url", &self.site.local_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be an http(s) URL, got {url:?}"
                )));
            }
        }
        if self.routing.kinds.is_empty() {
            return Err(ConfigError::Validation(
                "routing.kinds must not be empty".into(),
            ));
        }
        for kind in &self.routing.kinds {
            let valid = !kind.is_empty()
                && kind
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
            if !valid {
                return Err(ConfigError::Validation(format!(
                    "routing.kinds entry {kind:?} must match [0-9a-z-]+"
                )));
            }
        }
        for path in self.redirects.keys() {
            if !path.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "redirect source {path:?} must start with '/'"
                )));
            }
            // Sources are compared against normalized request paths.
            if Request::new("", "get", path).path() != path {
                return Err(ConfigError::Validation(format!(
                    "redirect source {path:?} is not a normalized path (no trailing '/', query or index.html)"
                )));
            }
            if FIXED_ROUTES.contains(&path.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "redirect source {path:?} is shadowed by a built-in route"
                )));
            }
        }
        Ok(())
    }

    /// Base URL for the given mode.
    pub fn base_url(&self, local: bool) -> &str {
        if local {
            &self.site.local_url
        } else {
            &self.site.production_url
        }
    }
}

/// Values the views and layouts read through `Context::site()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub author_uri: String,
    /// Shown under the tagline on the home page.
    pub location: Option<String>,
    pub locale: String,
    pub theme_color: String,
    /// Handle without the `@`; empty to omit the link.
    pub twitter: String,
    /// GitHub user name; empty to omit the link.
    pub github: String,
    pub production_url: String,
    pub local_url: String,
    /// Asset used for social cards when a page sets no image.
    pub default_image: String,
    pub profile_image: String,
    pub favicon: Option<String>,
    pub footer_note: Option<String>,
    /// Markdown body of the About page.
    pub about: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "My Site".to_string(),
            subtitle: "Notes, posts and talks".to_string(),
            author: "Site Author".to_string(),
            author_uri: "https://example.com".to_string(),
            location: None,
            locale: "en_US".to_string(),
            theme_color: "#ffffff".to_string(),
            twitter: String::new(),
            github: String::new(),
            production_url: "https://example.com".to_string(),
            local_url: "http://localhost:8000".to_string(),
            default_image: "fallback.png".to_string(),
            profile_image: "profile.png".to_string(),
            favicon: None,
            footer_note: None,
            about: "Hello! This is my corner of the web.".to_string(),
        }
    }
}

/// Directory layout, relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub views: String,
    pub public: String,
    pub cache: String,
    pub error_log: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            views: "resources/views".to_string(),
            public: "public".to_string(),
            cache: "cache".to_string(),
            error_log: "error.log".to_string(),
        }
    }
}

impl PathsConfig {
    pub fn views_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.views)
    }

    pub fn public_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.public)
    }

    pub fn cache_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.cache)
    }

    pub fn error_log(&self, root: &Path) -> PathBuf {
        root.join(&self.error_log)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingConfig {
    /// Content kinds served at `/{kind}/{slug}`.
    pub kinds: Vec<String>,
    pub method_policy: MethodPolicy,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            kinds: vec!["posts".to_string(), "talk".to_string()],
            method_policy: MethodPolicy::default(),
        }
    }
}

/// Which responses reject non-read methods with 405.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethodPolicy {
    /// Every status below 400, redirects included.
    #[default]
    NonError,
    /// Only statuses below 300.
    SuccessOnly,
}

impl MethodPolicy {
    pub fn applies_to(&self, status: u16) -> bool {
        match self {
            MethodPolicy::NonError => status < 400,
            MethodPolicy::SuccessOnly => status < 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Memoise collection loads as JSON under `paths.cache` in production.
    pub collections: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { collections: true }
    }
}

/// Load `site.toml` from `root`, or the defaults if there is none.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = root.join(CONFIG_FILENAME);
    if !path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(&path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `site.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Site Configuration
# ==================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Identity
# ---------------------------------------------------------------------------
[site]
title = "My Site"
subtitle = "Notes, posts and talks"
author = "Site Author"
author_uri = "https://example.com"
# location = "Somewhere"
locale = "en_US"
theme_color = "#ffffff"

# Social handles for the footer links. Empty strings omit the link.
twitter = ""
github = ""

# Base URLs. The local one is used with --local or LOCAL=1.
production_url = "https://example.com"
local_url = "http://localhost:8000"

# Images under <public>/assets/.
default_image = "fallback.png"
profile_image = "profile.png"
# favicon = "favicon.png"
# footer_note = "Made by hand"

# Markdown body of /about.
about = "Hello! This is my corner of the web."

# ---------------------------------------------------------------------------
# Directories, relative to the project root
# ---------------------------------------------------------------------------
[paths]
views = "resources/views"
public = "public"
cache = "cache"
error_log = "error.log"

# ---------------------------------------------------------------------------
# Routing
# ---------------------------------------------------------------------------
[routing]
# Directories under the views root served at /<kind>/<slug>.
kinds = ["posts", "talk"]

# "non-error": reject methods other than GET/HEAD on every status below 400.
# "success-only": only on statuses below 300.
method_policy = "non-error"

# ---------------------------------------------------------------------------
# Caching
# ---------------------------------------------------------------------------
[cache]
# Memoise collection listings as JSON in production.
collections = true

# ---------------------------------------------------------------------------
# Redirects: exact request path -> target. Targets starting with "/" are
# joined onto the base URL.
# ---------------------------------------------------------------------------
[redirects]
"##
}
