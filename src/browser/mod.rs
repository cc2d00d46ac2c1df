//! Headless browser capability used to get past the site's JavaScript
//! challenge.
//!
//! The session acquirer only needs a handful of operations, captured by
//! [`BrowserLauncher`] and [`BrowserPage`]. [`ChromeLauncher`] implements
//! them on top of headless Chrome; tests use scripted fakes.
//!
//! # Example
//!
//! ```no_run
//! use rust_anime_scanner::browser::{BrowserConfig, BrowserLauncher, BrowserPage, ChromeLauncher};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let launcher = ChromeLauncher::new(BrowserConfig::default());
//! let page = launcher.launch()?;
//! page.navigate("https://example.com", Duration::from_secs(30))?;
//! page.wait_for_visible("body", Duration::from_secs(15))?;
//! println!("{} cookies", page.cookies()?.len());
//! page.close()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod manager;

use crate::session::Cookie;
use std::time::Duration;

pub use config::BrowserConfig;
pub use manager::{BrowserError, ChromeLauncher, ChromePage};

/// Starts one isolated browser instance per call
pub trait BrowserLauncher {
    type Page: BrowserPage;

    fn launch(&self) -> Result<Self::Page, BrowserError>;
}

/// A single page in a launched browser. Owning it owns the browser process.
pub trait BrowserPage {
    /// Navigate and wait for the page to settle, failing after `timeout`
    fn navigate(&self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Wait until an element matching `selector` is present and visible
    fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;

    fn cookies(&self) -> Result<Vec<Cookie>, BrowserError>;

    /// Rendered HTML of the current document
    fn content(&self) -> Result<String, BrowserError>;

    /// Tear down the page and its browser process
    fn close(self) -> Result<(), BrowserError>;
}
