//! The content record produced by every renderable item.
//!
//! A [`Page`] is built fresh each time its source is rendered and is never
//! mutated afterwards. It is what collections list, what the router matches
//! against, and what layouts wrap.

use crate::layout::Layout;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("Front matter in [{}] is invalid: {source}", file.display())]
    FrontMatter {
        file: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid date [{value}] in [{}]: expected RFC 3339 or YYYY-MM-DD", file.display())]
    InvalidDate { file: PathBuf, value: String },
    #[error("Unterminated front matter in [{}]", .0.display())]
    Unterminated(PathBuf),
}

/// Social metadata type, emitted as `og:type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OgType {
    Website,
    Article,
}

impl OgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OgType::Website => "website",
            OgType::Article => "article",
        }
    }
}

/// Presentation format, shown as an icon in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Article,
    Video,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Source path; the page's identity.
    pub file: PathBuf,
    /// Absolute image URL for social cards.
    pub image: String,
    pub title: String,
    pub description: String,
    /// Left out of listings and feeds, still served by direct URL.
    pub hidden: bool,
    pub template: Layout,
    pub og_type: OgType,
    pub date: DateTime<Utc>,
    pub format: Option<Format>,
    pub external_link: Option<String>,
    pub show_menu: bool,
}

impl Page {
    /// `2024-06-01T00:00:00+00:00`
    pub fn atom_date(&self) -> String {
        atom_date(&self.date)
    }

    /// `1st June, 2024`
    pub fn human_date(&self) -> String {
        let day = self.date.day();
        format!("{}{} {}", day, ordinal_suffix(day), self.date.format("%B, %Y"))
    }

    pub fn is_video(&self) -> bool {
        self.format == Some(Format::Video)
    }
}

pub fn atom_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
