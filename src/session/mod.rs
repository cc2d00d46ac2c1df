//! Authenticated browsing session: the cookies a headless browser collected
//! after the site's JavaScript challenge, plus how to get and keep them.

pub mod acquirer;
pub mod store;

use crate::browser::BrowserError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use acquirer::{AcquireConfig, AcquireStage, SessionAcquirer};

/// A single browser cookie, shaped like the DevTools cookie records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// Seconds since the epoch, `-1` or absent for session cookies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

fn default_path() -> String {
    "/".to_string()
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: default_path(),
            expires: None,
            http_only: false,
            secure: false,
            same_site: None,
        }
    }
}

/// Cookies plus an optional snapshot of the rendered page.
///
/// Built once and only read afterwards; every authenticated catalog call
/// borrows it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    cookies: Vec<Cookie>,
    page_snapshot: Option<String>,
}

impl Session {
    pub fn new(cookies: Vec<Cookie>, page_snapshot: Option<String>) -> Self {
        Self {
            cookies,
            page_snapshot,
        }
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn page_snapshot(&self) -> Option<&str> {
        self.page_snapshot.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// `name=value` pairs joined with `; `, ready for a `Cookie` header
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Errors raised while acquiring, saving or loading a session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session acquisition failed after {attempts} attempt(s) while {stage}: {source}")]
    Acquisition {
        attempts: u32,
        stage: AcquireStage,
        #[source]
        source: BrowserError,
    },

    #[error("Cookie file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cookie file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Cookie file {0} contains no cookies")]
    Empty(String),
}

impl fmt::Display for AcquireStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AcquireStage::Launching => "launching the browser",
            AcquireStage::Navigating => "navigating",
            AcquireStage::AwaitingChallenge => "waiting for the challenge",
            AcquireStage::ExtractingCookies => "extracting cookies",
        };
        f.write_str(label)
    }
}
