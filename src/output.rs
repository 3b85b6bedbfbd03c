//! CLI output formatting for `build` and `check`.
//!
//! Output is information-centric: the primary line for every page is its
//! positional index and title, with the source file and URL path as
//! indented context lines.
//!
//! ## Check
//!
//! ```text
//! posts (2 pages)
//! 001 Hello world
//!     Source: posts/hello-world.md
//!     Date: 1st June, 2024
//! 002 Draft thoughts [hidden]
//!     Source: posts/draft.md
//!     Date: 2nd March, 2024
//! talk (0 pages)
//! ```
//!
//! ## Build
//!
//! ```text
//! 200 / → index.html (rendered)
//! 200 /posts/hello-world → posts/hello-world/index.html (cached)
//! 404 /missing
//!
//! Built 2 routes: 1 rendered, 1 from cache
//! ```
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::site::{BuiltRoute, KindInventory};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `{kind} (N pages)`, singular for one.
fn kind_header(kind: &str, count: usize) -> String {
    let noun = if count == 1 { "page" } else { "pages" };
    format!("{} ({} {})", kind, count, noun)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Display `path` relative to `base` when it lives under it.
fn relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

pub fn format_check_output(inventory: &[KindInventory], views_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for kind in inventory {
        lines.push(kind_header(&kind.kind, kind.pages.len()));
        for (i, page) in kind.pages.iter().enumerate() {
            let marker = if page.hidden { " [hidden]" } else { "" };
            lines.push(format!("{} {}{}", format_index(i + 1), page.title, marker));
            lines.push(format!("{}Source: {}", indent(1), relative(&page.file, views_dir)));
            lines.push(format!("{}Date: {}", indent(1), page.human_date()));
            if !page.description.is_empty() {
                lines.push(format!(
                    "{}Description: {}",
                    indent(1),
                    truncate_desc(&page.description, 60)
                ));
            }
        }
    }
    lines
}

/// Print check output to stdout.
pub fn print_check_output(inventory: &[KindInventory], views_dir: &Path) {
    for line in format_check_output(inventory, views_dir) {
        println!("{}", line);
    }
}

pub fn format_build_output(built: &[BuiltRoute], public_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rendered = 0;
    let mut cached = 0;

    for route in built {
        let mut line = format!("{} {}", route.status, route.path);
        if let Some(file) = &route.file {
            line.push_str(&format!(" \u{2192} {}", relative(file, public_dir)));
        }
        match route.cache_miss {
            Some(true) => {
                rendered += 1;
                line.push_str(" (rendered)");
            }
            Some(false) => {
                cached += 1;
                line.push_str(" (cached)");
            }
            None => {}
        }
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(format!(
        "Built {} routes: {} rendered, {} from cache",
        built.len(),
        rendered,
        cached
    ));
    lines
}

/// Print build output to stdout.
pub fn print_build_output(built: &[BuiltRoute], public_dir: &Path) {
    for line in format_build_output(built, public_dir) {
        println!("{}", line);
    }
}
