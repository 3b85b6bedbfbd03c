//! Turns a render target into a lazy [`Response`].
//!
//! Targets are resolved in order: built-in view name, literal file path,
//! path relative to the views directory. Rendering is two captured passes:
//! the source first, then, if the source yielded a [`Page`](crate::page::Page),
//! the page's layout around the captured output.

use crate::capture::{Captured, capture};
use crate::collection::Collection;
use crate::context::{Context, Globals, Props};
use crate::error::Result;
use crate::http::HttpError;
use crate::response::Response;
use crate::view::{Source, View};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

#[derive(Clone)]
pub struct Renderer {
    views_dir: PathBuf,
    globals: Rc<Globals>,
    collection: Rc<dyn Collection>,
}

impl Renderer {
    pub fn new(views_dir: impl Into<PathBuf>, globals: Rc<Globals>, collection: Rc<dyn Collection>) -> Self {
        Self {
            views_dir: views_dir.into(),
            globals,
            collection,
        }
    }

    pub fn resolve(&self, target: &str) -> Result<Source> {
        if let Some(view) = View::from_name(target) {
            return Ok(Source::View(view));
        }
        let literal = Path::new(target);
        if literal.is_file() {
            return Ok(Source::Document(literal.to_path_buf()));
        }
        let relative = self.views_dir.join(target.trim_start_matches('/'));
        if relative.is_file() {
            return Ok(Source::Document(relative));
        }
        debug!(target, "render target not found");
        Err(HttpError::NotFound.into())
    }

    /// Resolve now, render later. Resolution failures surface immediately;
    /// everything else surfaces from [`Response::render`].
    pub fn render(&self, target: &str, props: Props, status: u16) -> Result<Response> {
        let source = self.resolve(target)?;
        let renderer = self.clone();
        Ok(Response::new(move || renderer.produce(&source, &props)).with_status(status))
    }

    fn produce(&self, source: &Source, props: &Props) -> Result<String> {
        let ctx = Context::new(&self.globals, self.collection.as_ref(), props);
        let Captured { content, value: page } = capture(|out| source.render(&ctx, out))?;
        let Some(page) = page else {
            return Ok(content);
        };

        let layout_props = Props::new();
        let layout_ctx = ctx.with_props(&layout_props);
        let Captured { content: body, .. } =
            capture(|out| page.template.render(&layout_ctx, &page, &content, out))?;
        Ok(body)
    }
}
