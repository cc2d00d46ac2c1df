use super::config::BrowserConfig;
use super::{BrowserLauncher, BrowserPage};
use crate::session::Cookie;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Launches a fresh headless Chrome process for every `launch()` call
pub struct ChromeLauncher {
    config: BrowserConfig,
}

impl ChromeLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Build Chrome launch options from our config
    fn build_launch_options<'a>(
        config: &BrowserConfig,
        args: &'a [String],
    ) -> Result<LaunchOptions<'a>, BrowserError> {
        let args: Vec<&OsStr> = args.iter().map(OsStr::new).collect();

        LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some(config.window_size))
            .idle_browser_timeout(config.idle_timeout())
            .args(args)
            .build()
            .map_err(|e| BrowserError::ConfigurationError(e.to_string()))
    }
}

impl BrowserLauncher for ChromeLauncher {
    type Page = ChromePage;

    fn launch(&self) -> Result<ChromePage, BrowserError> {
        let args = self.config.launch_args();
        let launch_options = Self::build_launch_options(&self.config, &args)?;

        let browser = Browser::new(launch_options)
            .map_err(|e| BrowserError::InitializationError(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::TabCreationError(e.to_string()))?;

        Ok(ChromePage { browser, tab })
    }
}

/// One tab plus the browser process that owns it.
/// Dropping it kills the process.
pub struct ChromePage {
    browser: Browser,
    tab: Arc<Tab>,
}

impl ChromePage {
    fn poll_until<F>(&self, timeout: Duration, what: &str, mut check: F) -> Result<(), BrowserError>
    where
        F: FnMut(&Tab) -> bool,
    {
        let start = Instant::now();
        loop {
            if check(&self.tab) {
                return Ok(());
            }
            if start.elapsed() > timeout {
                return Err(BrowserError::Timeout(what.to_string()));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

impl BrowserPage for ChromePage {
    fn navigate(&self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.tab.set_default_timeout(timeout);

        self.tab
            .navigate_to(url)
            .map_err(|e| BrowserError::NavigationError(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| BrowserError::NavigationError(format!("Navigation timeout for {}: {}", url, e)))?;

        Ok(())
    }

    fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        let script = format!(
            r#"(() => {{
                const el = document.querySelector('{}');
                if (!el) return false;
                const style = window.getComputedStyle(el);
                const rect = el.getBoundingClientRect();
                return style.visibility !== 'hidden' && style.display !== 'none'
                    && (rect.width > 0 || rect.height > 0);
            }})()"#,
            selector.replace('\'', "\\'")
        );

        self.poll_until(timeout, &format!("visible {}", selector), |tab| {
            match tab.evaluate(&script, false) {
                Ok(result) => result.value.and_then(|v| v.as_bool()) == Some(true),
                // document may be mid-navigation
                Err(_) => false,
            }
        })
    }

    fn cookies(&self) -> Result<Vec<Cookie>, BrowserError> {
        let cookies = self
            .tab
            .get_cookies()
            .map_err(|e| BrowserError::CookieError(e.to_string()))?;

        Ok(cookies
            .into_iter()
            .map(|c| Cookie {
                expires: if c.session || c.expires < 0.0 {
                    None
                } else {
                    Some(c.expires)
                },
                same_site: c.same_site.map(|s| format!("{:?}", s)),
                http_only: c.http_only,
                secure: c.secure,
                name: c.name,
                value: c.value,
                domain: c.domain,
                path: c.path,
            })
            .collect())
    }

    fn content(&self) -> Result<String, BrowserError> {
        self.tab
            .get_content()
            .map_err(|e| BrowserError::HtmlExtractionError(e.to_string()))
    }

    fn close(self) -> Result<(), BrowserError> {
        let result = self
            .tab
            .close(true)
            .map(|_| ())
            .map_err(|e| BrowserError::CloseError(e.to_string()));
        drop(self.browser);
        log::debug!("Browser process released");
        result
    }
}

/// Errors that can occur during browser operations
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("Browser initialization failed: {0}")]
    InitializationError(String),

    #[error("Browser configuration error: {0}")]
    ConfigurationError(String),

    #[error("Tab creation failed: {0}")]
    TabCreationError(String),

    #[error("Navigation error: {0}")]
    NavigationError(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Cookie extraction error: {0}")]
    CookieError(String),

    #[error("HTML extraction error: {0}")]
    HtmlExtractionError(String),

    #[error("Browser shutdown error: {0}")]
    CloseError(String),
}
