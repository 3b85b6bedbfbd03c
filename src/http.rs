//! HTTP-facing values: expected failures and the final wire reply.

use std::io::{self, Write};
use thiserror::Error;

/// Expected, user-facing failures. Rendered as the branded error page with
/// the status code preserved.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpError {
    #[error("Not Found")]
    NotFound,
    #[error("Method Not Allowed")]
    MethodNotAllowed,
}

impl HttpError {
    pub fn status(&self) -> u16 {
        match self {
            HttpError::NotFound => 404,
            HttpError::MethodNotAllowed => 405,
        }
    }
}

/// Reason phrase for the status line.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        301 => "Moved Permanently",
        302 => "Found",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "",
    }
}

/// A fully rendered response, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// HEAD requests compute the full body but never send it.
    pub suppress_body: bool,
}

impl Reply {
    /// First header with a matching name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Write the reply as an HTTP/1.1 message.
    pub fn write_to(&self, mut w: impl Write) -> io::Result<()> {
        write!(w, "HTTP/1.1 {} {}\r\n", self.status, reason_phrase(self.status))?;
        for (name, value) in &self.headers {
            write!(w, "{name}: {value}\r\n")?;
        }
        w.write_all(b"\r\n")?;
        if !self.suppress_body {
            w.write_all(self.body.as_bytes())?;
        }
        w.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(suppress_body: bool) -> Reply {
        Reply {
            status: 200,
            headers: vec![
                ("Content-Type".into(), "text/html; charset=utf-8".into()),
                ("Content-Length".into(), "5".into()),
            ],
            body: "hello".into(),
            suppress_body,
        }
    }

    #[test]
    fn http_error_statuses() {
        assert_eq!(HttpError::NotFound.status(), 404);
        assert_eq!(HttpError::MethodNotAllowed.status(), 405);
        assert_eq!(HttpError::NotFound.to_string(), "Not Found");
        assert_eq!(HttpError::MethodNotAllowed.to_string(), "Method Not Allowed");
    }

    #[test]
    fn write_includes_status_line_and_body() {
        let mut out = Vec::new();
        reply(false).write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Length: 5\r\n"));
        assert!(text.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn head_reply_keeps_length_but_drops_body() {
        let mut out = Vec::new();
        reply(true).write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Content-Length: 5\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        assert_eq!(reply(false).header("content-length"), Some("5"));
        assert_eq!(reply(false).header("Cache-Miss"), None);
    }
}
