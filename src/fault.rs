//! Last-resort handling for unexpected failures.
//!
//! Anything that escapes the request kernel (an [`Error`] that is not an
//! expected HTTP failure, or a panic) becomes a [`Fault`]. The fault is
//! appended to the error log with a timestamp and answered with a plain-text
//! 500 carrying the same diagnostic.

use crate::error::Error;
use crate::http::Reply;
use chrono::Utc;
use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::panic::{self, Location, PanicHookInfo};
use std::path::{Path, PathBuf};
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub kind: String,
    pub message: String,
    /// `file:line` where the fault was raised, when known.
    pub location: Option<String>,
    pub trace: String,
}

impl Fault {
    /// Build from an error. The location is the caller's; the trace is the
    /// error's source chain followed by a backtrace.
    #[track_caller]
    pub fn from_error(err: &Error) -> Self {
        let location = Location::caller();
        let mut trace = Vec::new();
        let mut source = StdError::source(err);
        while let Some(cause) = source {
            trace.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        trace.push(Backtrace::force_capture().to_string());
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            location: Some(format!("{}:{}", location.file(), location.line())),
            trace: trace.join("\n"),
        }
    }

    pub fn from_panic(info: &PanicHookInfo<'_>) -> Self {
        let payload = info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "Box<dyn Any>".to_string());
        Self::panic(message, info.location())
    }

    pub fn panic(message: impl Into<String>, location: Option<&Location<'_>>) -> Self {
        Self {
            kind: "Panic".to_string(),
            message: message.into(),
            location: location.map(|l| format!("{}:{}", l.file(), l.line())),
            trace: Backtrace::force_capture().to_string(),
        }
    }

    /// Append `[YYYY-mm-dd HH:MM:SS] record` to `log`, creating it if needed.
    pub fn append_to(&self, log: &Path) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(log)?;
        let stamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "[{stamp}] {self}")
    }

    pub fn reply(&self) -> Reply {
        let body = self.to_string();
        Reply {
            status: 500,
            headers: vec![
                ("Content-Type".to_string(), "text/plain; charset=utf-8".to_string()),
                ("Content-Length".to_string(), body.len().to_string()),
            ],
            body,
            suppress_body: false,
        }
    }

    /// Log and record the fault, then produce the client reply. A log that
    /// cannot be written is reported but does not change the reply.
    pub fn report(&self, log: &Path) -> Reply {
        error!(kind = %self.kind, location = ?self.location, "{}", self.message);
        if let Err(e) = self.append_to(log) {
            error!(log = %log.display(), error = %e, "unable to append to error log");
        }
        self.reply()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " in {location}")?;
        }
        if !self.trace.is_empty() {
            write!(f, "\n{}", self.trace)?;
        }
        Ok(())
    }
}

/// Route panics through [`Fault::report`]. With `emit_reply`, the 500 reply
/// is also written to stdout, for the one-request-per-process mode.
pub fn install_panic_hook(log: PathBuf, emit_reply: bool) {
    panic::set_hook(Box::new(move |info| {
        let reply = Fault::from_panic(info).report(&log);
        if emit_reply {
            let _ = reply.write_to(io::stdout().lock());
        }
    }));
}
