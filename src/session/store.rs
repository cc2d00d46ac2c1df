//! Cookie files written by `harvest` and read back by the scanner.
//!
//! Two files are written: `cookies.json` (array of cookie records) and
//! `cookies.txt` (the `Cookie` header string). Loading accepts:
//!
//! - a bare array of cookie records
//! - an object with a `cookies` field holding either of the other shapes
//! - a `name=value; name2=value2` string

use super::{Cookie, Session, SessionError};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCookies {
    List(Vec<Cookie>),
    Header(String),
    Wrapped { cookies: Box<StoredCookies> },
}

impl StoredCookies {
    fn into_cookies(self) -> Vec<Cookie> {
        match self {
            StoredCookies::List(cookies) => cookies,
            StoredCookies::Header(header) => parse_cookie_header(&header),
            StoredCookies::Wrapped { cookies } => cookies.into_cookies(),
        }
    }
}

/// Split a `Cookie` header string into records
pub fn parse_cookie_header(header: &str) -> Vec<Cookie> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(Cookie::new(name, value.trim()))
        })
        .collect()
}

/// Parse cookie file contents in any accepted shape
pub fn parse_cookies(content: &str) -> Result<Vec<Cookie>, SessionError> {
    let stored: StoredCookies = serde_json::from_str(content)?;
    Ok(stored.into_cookies())
}

/// Load a session from a cookie JSON file. An empty cookie set is an error.
pub fn load_session(path: &Path) -> Result<Session, SessionError> {
    let content = fs::read_to_string(path)?;
    let cookies = parse_cookies(&content)?;
    if cookies.is_empty() {
        return Err(SessionError::Empty(path.display().to_string()));
    }
    log::info!("Loaded {} cookies from {}", cookies.len(), path.display());
    Ok(Session::new(cookies, None))
}

/// Write both cookie files
pub fn save_session(session: &Session, json_path: &Path, txt_path: &Path) -> Result<(), SessionError> {
    let content = serde_json::to_string_pretty(session.cookies())?;
    fs::write(json_path, content)?;
    fs::write(txt_path, session.cookie_header())?;
    log::info!(
        "Cookies saved to {} and {}",
        json_path.display(),
        txt_path.display()
    );
    Ok(())
}
