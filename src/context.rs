//! The render context handed to every view, document and layout.
//!
//! [`Globals`] holds the per-request services and is built once per request.
//! A [`Context`] is assembled fresh for each render from the globals, the
//! collection used for listings, and that render's own [`Props`].

use crate::collection::{Collection, Visibility};
use crate::config::SiteSection;
use crate::escape;
use crate::markdown::Markdown;
use crate::request::Request;
use crate::url::Url;
use serde_json::Value;
use std::borrow::Cow;

/// Open extension map for render-specific data (e.g. an error message).
pub type Props = serde_json::Map<String, Value>;

/// Build [`Props`] from string pairs.
pub fn props<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Props {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

#[derive(Debug, Clone)]
pub struct Globals {
    pub request: Request,
    pub url: Url,
    pub markdown: Markdown,
    pub site: SiteSection,
    /// What listings (home, feed) show: everything locally, only published
    /// pages in production.
    pub listing: Visibility,
}

#[derive(Clone, Copy)]
pub struct Context<'a> {
    globals: &'a Globals,
    collection: &'a dyn Collection,
    props: &'a Props,
}

impl<'a> Context<'a> {
    pub fn new(globals: &'a Globals, collection: &'a dyn Collection, props: &'a Props) -> Self {
        Self {
            globals,
            collection,
            props,
        }
    }

    /// Same globals and collection, different props.
    pub fn with_props<'b>(&self, props: &'b Props) -> Context<'b>
    where
        'a: 'b,
    {
        Context {
            globals: self.globals,
            collection: self.collection,
            props,
        }
    }

    pub fn globals(&self) -> &'a Globals {
        self.globals
    }

    pub fn request(&self) -> &'a Request {
        &self.globals.request
    }

    pub fn url(&self) -> &'a Url {
        &self.globals.url
    }

    pub fn markdown(&self) -> &'a Markdown {
        &self.globals.markdown
    }

    pub fn site(&self) -> &'a SiteSection {
        &self.globals.site
    }

    pub fn collection(&self) -> &'a dyn Collection {
        self.collection
    }

    pub fn escape<'t>(&self, text: &'t str) -> Cow<'t, str> {
        escape::escape(text)
    }

    pub fn props(&self) -> &'a Props {
        self.props
    }

    pub fn prop(&self, key: &str) -> Option<&'a Value> {
        self.props.get(key)
    }

    pub fn prop_str(&self, key: &str) -> Option<&'a str> {
        self.prop(key).and_then(Value::as_str)
    }
}
