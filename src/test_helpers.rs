//! Shared test utilities.
//!
//! [`Project`] is a throwaway project root with the layout the renderer
//! expects (views, public assets) and helpers to drop content files into it.
//! [`StaticCollection`] serves a fixed page list for tests that should not
//! touch the filesystem.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let project = Project::new();
//! project.post("hello", "Hello", "2024-01-01");
//!
//! let reply = project.site(false).handle("GET", "/posts/hello").unwrap();
//! assert_eq!(reply.status, 200);
//! ```

use crate::collection::{Collection, Visibility, sort_newest_first};
use crate::config::SiteConfig;
use crate::context::{Globals, Props};
use crate::error::Result;
use crate::layout::Layout;
use crate::markdown::Markdown;
use crate::page::{OgType, Page, parse_date};
use crate::request::Request;
use crate::site::Site;
use crate::url::Url;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const LOCAL_BASE: &str = "http://localhost:8000";

/// Files created under `public/assets/` for every project.
const ASSETS: &[(&str, &str)] = &[
    ("site.css", "body { margin: 0 }"),
    ("site.js", "console.log('site')"),
    ("fallback.png", "fallback image bytes"),
    ("profile.png", "profile image bytes"),
];

pub struct Project {
    tmp: TempDir,
    config: SiteConfig,
}

impl Project {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let config = SiteConfig::default();
        fs::create_dir_all(config.paths.views_dir(tmp.path())).unwrap();
        let assets = config.paths.public_dir(tmp.path()).join("assets");
        fs::create_dir_all(&assets).unwrap();
        for (name, contents) in ASSETS {
            fs::write(assets.join(name), contents).unwrap();
        }
        Self { tmp, config }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn views_dir(&self) -> PathBuf {
        self.config.paths.views_dir(self.root())
    }

    pub fn public_dir(&self) -> PathBuf {
        self.config.paths.public_dir(self.root())
    }

    /// Globals for a request against the local base URL, listing published
    /// pages only.
    pub fn globals(&self, method: &str, path: &str) -> Globals {
        Globals {
            request: Request::new(LOCAL_BASE, method, path),
            url: Url::new(LOCAL_BASE, self.public_dir(), self.views_dir()),
            markdown: Markdown::new(),
            site: self.config.site.clone(),
            listing: Visibility::Published,
        }
    }

    pub fn site(&self, local: bool) -> Site {
        Site::new(self.root(), self.config.clone(), local)
    }

    /// Write `contents` to `views/{relative}`, creating directories.
    pub fn write_view(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.views_dir().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    /// Write `views/{kind}/{slug}.md` with the given front matter and body.
    pub fn write_post(&self, kind: &str, slug: &str, front_matter: &str, body: &str) -> PathBuf {
        self.write_view(
            &format!("{kind}/{slug}.md"),
            &format!("+++\n{front_matter}\n+++\n{body}"),
        )
    }

    /// A dated post under `posts/` with a generated description and body.
    pub fn post(&self, slug: &str, title: &str, date: &str) -> PathBuf {
        self.write_post(
            "posts",
            slug,
            &format!(
                "title = {}\ndescription = \"About {slug}\"\ndate = \"{date}\"",
                toml_string(title)
            ),
            &format!("Body of {slug}."),
        )
    }
}

/// Quote `value` as a TOML basic string.
fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

/// A published post page at `file`, dated 2024-01-01.
pub fn page_at(file: impl Into<PathBuf>) -> Page {
    Page {
        file: file.into(),
        image: "https://example.com/assets/fallback.png?v=0123456789abcdef".to_string(),
        title: "Hello".to_string(),
        description: "A page".to_string(),
        hidden: false,
        template: Layout::Post,
        og_type: OgType::Article,
        date: parse_date("2024-01-01").unwrap(),
        format: None,
        external_link: None,
        show_menu: true,
    }
}

pub fn titles(pages: &[Page]) -> Vec<&str> {
    pages.iter().map(|p| p.title.as_str()).collect()
}

/// Fixed pages, filtered by the name of their parent directory as kind.
#[derive(Debug, Default)]
pub struct StaticCollection {
    pages: Vec<Page>,
}

impl StaticCollection {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }
}

impl Collection for StaticCollection {
    fn load(&self, kind: &str, visibility: Visibility, _props: &Props) -> Result<Vec<Page>> {
        let mut pages: Vec<Page> = self
            .pages
            .iter()
            .filter(|p| {
                p.file
                    .parent()
                    .and_then(Path::file_name)
                    .is_some_and(|name| name == kind)
            })
            .filter(|p| visibility == Visibility::All || !p.hidden)
            .cloned()
            .collect();
        sort_newest_first(&mut pages);
        Ok(pages)
    }
}
