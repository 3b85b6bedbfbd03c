//! # Folio
//!
//! A self-caching renderer for a personal website. Posts and talks are
//! Markdown files with TOML front matter; the home page, About page, Atom
//! feed and error page are built-in views. Every successful response is
//! written under `public/` at the path a static file server would look for
//! it, so the next request for the same route is served from disk and a
//! warm cache doubles as a deployable static site.
//!
//! # Request Pipeline
//!
//! ```text
//! Request ─► Router ─► Renderer ─► View / Document ─► Layout ─► PageCache ─► Reply
//!              │                         │
//!              │                         └─ Collection (posts, talk) ─► JSON cache
//!              └─ redirects, 404/405 ─► error view
//! ```
//!
//! Responses are lazy: routing only decides *what* to render, and nothing is
//! read or rendered until the cache layer asks for the body. A cache hit
//! therefore never touches the views directory.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`site`] | Request kernel: builds per-request services, dispatches, applies the method check and cache |
//! | [`router`] | Fixed routes, configured redirects, `/{kind}/{slug}` content lookup |
//! | [`renderer`] | Resolves a target to a [`view::Source`] and renders it inside its layout |
//! | [`view`] | Built-in views (home, about, feed, error) and the `Source` enum |
//! | [`document`] | Markdown files with `+++` TOML front matter |
//! | [`layout`] | The `page` and `post` layouts with shared head and foot partials |
//! | [`collection`] | Lists the pages of a content kind, with an optional JSON cache |
//! | [`cache`] | Write-through page cache and atomic file writes |
//! | [`context`] | Per-request globals and the render context |
//! | [`capture`] | Output capture for render units |
//! | [`response`] | Lazily rendered responses |
//! | [`url`] | Site links, content-hashed asset URLs, canonical page URLs |
//! | [`request`] | Request method and normalised path |
//! | [`markdown`] | Markdown rendering with heading anchors |
//! | [`page`] | The page record and its date formats |
//! | [`http`] | HTTP failures and the wire reply |
//! | [`fault`] | Error-log records and the plain-text 500 |
//! | [`config`] | `site.toml` loading and validation |
//! | [`output`] | CLI output formatting for `build` and `check` |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Files
//!
//! Views and layouts are Rust functions over [Maud](https://maud.lambda.xyz/)
//! markup. Interpolation is escaped by default and a missing field is a build
//! error rather than an empty string at runtime. Only content lives on disk.
//!
//! ## Fail Fast on Content
//!
//! A post without front matter, with an unknown front-matter key, or pointing
//! at an asset that does not exist aborts the request with a fault instead of
//! rendering a partial page. Errors reach the author, not the reader.
//!
//! ## No Invalidation
//!
//! Cache files have no TTL. Deleting a file under `public/` (or the JSON
//! collection cache) is how content changes are published. Local mode
//! (`--local`) re-renders every request and never reads the caches.

pub mod cache;
pub mod capture;
pub mod collection;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod escape;
pub mod fault;
pub mod http;
pub mod layout;
pub mod markdown;
pub mod output;
pub mod page;
pub mod renderer;
pub mod request;
pub mod response;
pub mod router;
pub mod site;
pub mod url;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;
