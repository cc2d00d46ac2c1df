use std::time::Duration;

/// Configuration for browser instances
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,

    /// Viewport size
    pub window_size: (u32, u32),

    /// Custom user agent
    pub user_agent: Option<String>,

    /// How long an idle browser connection may stay open.
    /// Must outlast the challenge settle wait.
    pub idle_timeout_seconds: u64,

    /// Additional Chrome flags
    pub chrome_flags: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1280, 800),
            user_agent: None,
            idle_timeout_seconds: 90,
            chrome_flags: [
                "--no-sandbox",
                "--disable-setuid-sandbox",
                "--disable-dev-shm-usage",
                "--disable-accelerated-2d-canvas",
                "--no-first-run",
                "--no-zygote",
                "--disable-gpu",
                "--disable-features=site-per-process",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl BrowserConfig {
    /// Visible browser for watching the challenge by hand
    pub fn debug_mode() -> Self {
        Self {
            headless: false,
            ..Self::default()
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }

    /// Flags passed to Chrome, including the user agent when set
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = self.chrome_flags.clone();
        if let Some(ua) = &self.user_agent {
            args.push(format!("--user-agent={}", ua));
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.window_size, (1280, 800));
        assert!(config.chrome_flags.iter().any(|f| f == "--no-sandbox"));
        assert!(config.idle_timeout() > Duration::from_secs(7));
    }

    #[test]
    fn test_user_agent_flag() {
        let config = BrowserConfig {
            user_agent: Some("TestAgent/1.0".to_string()),
            ..BrowserConfig::default()
        };
        let args = config.launch_args();
        assert_eq!(args.last().map(String::as_str), Some("--user-agent=TestAgent/1.0"));
    }

    #[test]
    fn test_debug_mode() {
        assert!(!BrowserConfig::debug_mode().headless);
    }
}
