//! Crate-wide error type for the render pipeline.
//!
//! Each concern owns a small error enum next to its code ([`HttpError`],
//! [`UrlError`], [`PageError`], [`CacheError`], [`ConfigError`]). Anything
//! that runs inside a render (templates, collections, layouts) returns
//! [`Error`], which wraps all of them.
//!
//! Only [`Error::Http`] is an expected outcome. The site kernel turns it into
//! a rendered error page; every other variant is a fault that aborts the
//! request and goes to [`crate::fault`].

use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::http::HttpError;
use crate::page::PageError;
use crate::url::UrlError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error(transparent)]
    Url(#[from] UrlError),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Did not find page metadata in [{}]", file.display())]
    MissingPage { file: PathBuf },
    #[error("Unknown og:image:type extension [{0}]")]
    UnknownImageType(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

impl Error {
    /// Short type name used in fault records.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Http(_) => "HttpError",
            Error::Url(UrlError::AssetNotFound(_)) => "AssetNotFound",
            Error::Url(UrlError::InvalidPageLocation(_)) => "InvalidPageLocation",
            Error::Url(UrlError::Io(_)) => "UrlError",
            Error::Page(_) => "PageError",
            Error::Cache(_) => "CacheWriteError",
            Error::Config(_) => "ConfigError",
            Error::MissingPage { .. } => "MissingPage",
            Error::UnknownImageType(_) => "UnknownImageType",
            Error::Io(_) => "IoError",
            Error::Json(_) => "JsonError",
            Error::Fmt(_) => "FmtError",
        }
    }

    /// The HTTP failure carried by this error, if it is one.
    pub fn as_http(&self) -> Option<&HttpError> {
        match self {
            Error::Http(e) => Some(e),
            _ => None,
        }
    }
}
