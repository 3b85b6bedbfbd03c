//! Lazily rendered responses.
//!
//! A [`Response`] holds a body producer rather than a body. Nothing is read
//! or rendered until [`Response::render`] is called, and calling it again
//! renders again. Producers are pure with respect to a request, so repeat
//! renders yield the same body.

use crate::error::Result;
use std::fmt;
use std::rc::Rc;

type Body = Rc<dyn Fn() -> Result<String>>;

#[derive(Clone)]
pub struct Response {
    body: Body,
    status: u16,
    headers: Vec<(String, String)>,
}

impl Response {
    pub fn new(body: impl Fn() -> Result<String> + 'static) -> Self {
        Self {
            body: Rc::new(body),
            status: 200,
            headers: Vec::new(),
        }
    }

    /// 307 with only a `Location` header and an empty body.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::new(|| Ok(String::new()))
            .with_status(307)
            .with_header("Location", location)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Same body producer, different status.
    pub fn with_status(&self, status: u16) -> Self {
        Self {
            body: Rc::clone(&self.body),
            status,
            headers: self.headers.clone(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Wrap the body producer. `decorator` receives the original response
    /// and returns the final body; status and headers carry over.
    pub fn decorate(&self, decorator: impl Fn(&Response) -> Result<String> + 'static) -> Self {
        let original = self.clone();
        Self {
            body: Rc::new(move || decorator(&original)),
            status: self.status,
            headers: self.headers.clone(),
        }
    }

    pub fn render(&self) -> Result<String> {
        (self.body)()
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
