//! Markdown documents with TOML front matter.
//!
//! A content file looks like:
//!
//! ```text
//! +++
//! title = "Hello world"
//! description = "The first post"
//! date = "2024-06-01"
//! +++
//! The body, in **Markdown**.
//! ```
//!
//! The front matter becomes the document's [`Page`]; the body is emitted
//! verbatim and the layout decides what to do with it (the post layout
//! renders it as Markdown). A file without front matter yields no page,
//! which the renderer treats as a raw, unwrapped response and a collection
//! treats as an authoring error.

use crate::context::Context;
use crate::error::Result;
use crate::layout::Layout;
use crate::page::{self, Format, OgType, Page, PageError};
use chrono::Utc;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const FENCE: &str = "+++";

/// Front matter keys. Unknown keys are rejected to catch typos early.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FrontMatter {
    title: String,
    description: String,
    image: Option<String>,
    template: Option<Layout>,
    og_type: Option<OgType>,
    date: Option<String>,
    format: Option<Format>,
    external_link: Option<String>,
    #[serde(default)]
    hidden: bool,
    show_menu: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub file: PathBuf,
    front_matter: Option<String>,
    pub body: String,
}

impl Document {
    pub fn read(file: &Path) -> Result<Self> {
        let text = fs::read_to_string(file)?;
        Self::parse(file, &text)
    }

    pub fn parse(file: &Path, text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let rest = text
            .strip_prefix("+++\n")
            .or_else(|| text.strip_prefix("+++\r\n"));

        let (front_matter, body) = match rest {
            Some(rest) => {
                let (fm, body) = take_until_fence(rest, FENCE)
                    .ok_or_else(|| PageError::Unterminated(file.to_path_buf()))?;
                (Some(fm.to_string()), body.to_string())
            }
            None => (None, text.to_string()),
        };

        Ok(Self {
            file: file.to_path_buf(),
            front_matter,
            body,
        })
    }

    /// Write the body to `out` and build the page, if the document has one.
    pub fn render(&self, ctx: &Context<'_>, out: &mut String) -> Result<Option<Page>> {
        out.push_str(&self.body);
        self.page(ctx)
    }

    fn page(&self, ctx: &Context<'_>) -> Result<Option<Page>> {
        let Some(raw) = &self.front_matter else {
            return Ok(None);
        };
        let fm: FrontMatter = toml::from_str(raw).map_err(|source| PageError::FrontMatter {
            file: self.file.clone(),
            source,
        })?;

        let date = match &fm.date {
            Some(value) => page::parse_date(value).ok_or_else(|| PageError::InvalidDate {
                file: self.file.clone(),
                value: value.clone(),
            })?,
            None => Utc::now(),
        };

        let image = fm.image.as_deref().unwrap_or(&ctx.site().default_image);
        let image = if image.starts_with("http://") || image.starts_with("https://") {
            image.to_string()
        } else {
            ctx.url().asset(image)?
        };

        Ok(Some(Page {
            file: self.file.clone(),
            image,
            title: fm.title,
            description: fm.description,
            hidden: fm.hidden,
            template: fm.template.unwrap_or(Layout::Post),
            og_type: fm.og_type.unwrap_or(OgType::Article),
            date,
            format: fm.format,
            external_link: fm.external_link,
            show_menu: fm.show_menu.unwrap_or(true),
        }))
    }
}

/// Scan `rest` for a line that is exactly the fence, returning (front_matter, body).
fn take_until_fence<'a>(rest: &'a str, fence: &str) -> Option<(&'a str, &'a str)> {
    let mut idx = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches('\n').trim_end_matches('\r');
        if trimmed == fence {
            return Some((&rest[..idx], &rest[idx + line.len()..]));
        }
        idx += line.len();
    }
    None
}
