//! Session acquisition with bounded retries.
//!
//! Each attempt walks Launching → Navigating → AwaitingChallenge →
//! ExtractingCookies on a browser of its own. A failed attempt releases its
//! browser, waits `base_delay × attempt` and starts over; the last failure
//! is returned once attempts run out.

use super::{Session, SessionError};
use crate::browser::{BrowserError, BrowserLauncher, BrowserPage};
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY_MS: u64 = 3000;
const NAVIGATION_TIMEOUT_SECS: u64 = 30;
const CHALLENGE_SETTLE_SECS: u64 = 7;
const READY_TIMEOUT_SECS: u64 = 15;
const READY_SELECTOR: &str = "body";

/// Where an attempt was when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireStage {
    Launching,
    Navigating,
    AwaitingChallenge,
    ExtractingCookies,
}

#[derive(Debug, Clone)]
pub struct AcquireConfig {
    pub max_attempts: u32,
    /// Multiplied by the attempt number before each retry
    pub base_delay: Duration,
    pub navigation_timeout: Duration,
    /// Fixed wait for the anti-bot challenge. Its completion is not
    /// observable, so this is a duration and not a signal.
    pub challenge_settle: Duration,
    pub ready_timeout: Duration,
    pub capture_snapshot: bool,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
            navigation_timeout: Duration::from_secs(NAVIGATION_TIMEOUT_SECS),
            challenge_settle: Duration::from_secs(CHALLENGE_SETTLE_SECS),
            ready_timeout: Duration::from_secs(READY_TIMEOUT_SECS),
            capture_snapshot: true,
        }
    }
}

pub struct SessionAcquirer<L: BrowserLauncher> {
    launcher: L,
    config: AcquireConfig,
}

impl<L: BrowserLauncher> SessionAcquirer<L> {
    pub fn new(launcher: L) -> Self {
        Self::with_config(launcher, AcquireConfig::default())
    }

    pub fn with_config(launcher: L, config: AcquireConfig) -> Self {
        Self { launcher, config }
    }

    pub fn config(&self) -> &AcquireConfig {
        &self.config
    }

    /// Wait before attempt `attempt + 1`, linear in the attempt number
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.config.base_delay * attempt
    }

    /// Acquire a session using the configured attempt budget
    pub async fn acquire(&self, url: &str) -> Result<Session, SessionError> {
        self.acquire_with_attempts(url, self.config.max_attempts).await
    }

    /// Acquire a session, trying at most `max_attempts` times (minimum one)
    pub async fn acquire_with_attempts(
        &self,
        url: &str,
        max_attempts: u32,
    ) -> Result<Session, SessionError> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;

        loop {
            log::info!("[harvest] Attempt {} - Launching browser...", attempt);

            match self.attempt(url).await {
                Ok(session) => {
                    log::info!("[harvest] Success! Got {} cookies.", session.cookies().len());
                    return Ok(session);
                }
                Err((stage, err)) => {
                    log::warn!("[harvest] Attempt {} failed while {}: {}", attempt, stage, err);

                    if attempt >= max_attempts {
                        return Err(SessionError::Acquisition {
                            attempts: attempt,
                            stage,
                            source: err,
                        });
                    }

                    let wait = self.backoff_delay(attempt);
                    log::info!("[harvest] Retrying in {} ms...", wait.as_millis());
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One full attempt on a fresh browser. The browser is released on
    /// every path before this returns.
    async fn attempt(&self, url: &str) -> Result<Session, (AcquireStage, BrowserError)> {
        let page = self
            .launcher
            .launch()
            .map_err(|e| (AcquireStage::Launching, e))?;

        let outcome = self.drive(&page, url).await;

        // a failing close must not hide the attempt's own result
        if let Err(e) = page.close() {
            log::debug!("[harvest] Ignoring browser release error: {}", e);
        }

        outcome
    }

    async fn drive(&self, page: &L::Page, url: &str) -> Result<Session, (AcquireStage, BrowserError)> {
        log::info!("[harvest] Navigating to {}...", url);
        page.navigate(url, self.config.navigation_timeout)
            .map_err(|e| (AcquireStage::Navigating, e))?;

        self.await_challenge_settle().await;

        log::info!("[harvest] Waiting for <{}> to be visible...", READY_SELECTOR);
        page.wait_for_visible(READY_SELECTOR, self.config.ready_timeout)
            .map_err(|e| (AcquireStage::AwaitingChallenge, e))?;

        log::info!("[harvest] Extracting cookies...");
        let cookies = page
            .cookies()
            .map_err(|e| (AcquireStage::ExtractingCookies, e))?;

        let snapshot = if self.config.capture_snapshot {
            Some(page.content().map_err(|e| (AcquireStage::ExtractingCookies, e))?)
        } else {
            None
        };

        Ok(Session::new(cookies, snapshot))
    }

    /// Opaque readiness condition: a fixed pause
    async fn await_challenge_settle(&self) {
        log::info!(
            "[harvest] Waiting {} seconds for JS challenge to settle...",
            self.config.challenge_settle.as_secs()
        );
        tokio::time::sleep(self.config.challenge_settle).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Cookie;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Clone, Copy)]
    enum Script {
        Ok,
        FailLaunch,
        FailNavigate,
        FailReady,
        FailCookies,
        OkButCloseFails,
    }

    #[derive(Default)]
    struct Counters {
        launched: u32,
        released: u32,
    }

    struct FakeLauncher {
        script: RefCell<VecDeque<Script>>,
        counters: Rc<RefCell<Counters>>,
    }

    impl FakeLauncher {
        fn new(script: &[Script]) -> (Self, Rc<RefCell<Counters>>) {
            let counters = Rc::new(RefCell::new(Counters::default()));
            let launcher = Self {
                script: RefCell::new(script.iter().copied().collect()),
                counters: counters.clone(),
            };
            (launcher, counters)
        }
    }

    struct FakePage {
        script: Script,
        counters: Rc<RefCell<Counters>>,
    }

    impl BrowserLauncher for FakeLauncher {
        type Page = FakePage;

        fn launch(&self) -> Result<FakePage, BrowserError> {
            let script = self.script.borrow_mut().pop_front().unwrap_or(Script::Ok);
            if let Script::FailLaunch = script {
                return Err(BrowserError::InitializationError("no chrome".into()));
            }
            self.counters.borrow_mut().launched += 1;
            Ok(FakePage {
                script,
                counters: self.counters.clone(),
            })
        }
    }

    impl BrowserPage for FakePage {
        fn navigate(&self, _url: &str, _timeout: Duration) -> Result<(), BrowserError> {
            match self.script {
                Script::FailNavigate => Err(BrowserError::NavigationError("timeout".into())),
                _ => Ok(()),
            }
        }

        fn wait_for_visible(&self, selector: &str, _timeout: Duration) -> Result<(), BrowserError> {
            match self.script {
                Script::FailReady => Err(BrowserError::Timeout(selector.to_string())),
                _ => Ok(()),
            }
        }

        fn cookies(&self) -> Result<Vec<Cookie>, BrowserError> {
            match self.script {
                Script::FailCookies => Err(BrowserError::CookieError("gone".into())),
                _ => Ok(vec![Cookie::new("__ddg2_", "token")]),
            }
        }

        fn content(&self) -> Result<String, BrowserError> {
            Ok("<html><body>ok</body></html>".to_string())
        }

        fn close(self) -> Result<(), BrowserError> {
            self.counters.borrow_mut().released += 1;
            match self.script {
                Script::OkButCloseFails => Err(BrowserError::CloseError("already dead".into())),
                _ => Ok(()),
            }
        }
    }

    fn quick_config(max_attempts: u32) -> AcquireConfig {
        AcquireConfig {
            max_attempts,
            base_delay: Duration::from_millis(3000),
            navigation_timeout: Duration::from_secs(1),
            challenge_settle: Duration::from_secs(7),
            ready_timeout: Duration::from_secs(1),
            capture_snapshot: true,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success_returns_immediately() {
        let (launcher, counters) = FakeLauncher::new(&[Script::Ok, Script::Ok]);
        let acquirer = SessionAcquirer::with_config(launcher, quick_config(3));

        let session = acquirer.acquire("https://animepahe.ru").await.unwrap();

        assert_eq!(session.cookie_header(), "__ddg2_=token");
        assert!(session.page_snapshot().is_some());
        let c = counters.borrow();
        assert_eq!(c.launched, 1);
        assert_eq!(c.released, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let (launcher, counters) =
            FakeLauncher::new(&[Script::FailNavigate, Script::FailReady, Script::Ok]);
        let acquirer = SessionAcquirer::with_config(launcher, quick_config(3));

        let session = acquirer.acquire("https://animepahe.ru").await;

        assert!(session.is_ok());
        let c = counters.borrow();
        assert_eq!(c.launched, 3);
        assert_eq!(c.released, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_report_last_error() {
        let (launcher, counters) =
            FakeLauncher::new(&[Script::FailNavigate, Script::FailNavigate, Script::FailCookies]);
        let acquirer = SessionAcquirer::with_config(launcher, quick_config(3));

        let err = acquirer.acquire("https://animepahe.ru").await.unwrap_err();

        match err {
            SessionError::Acquisition { attempts, stage, source } => {
                assert_eq!(attempts, 3);
                assert_eq!(stage, AcquireStage::ExtractingCookies);
                assert!(matches!(source, BrowserError::CookieError(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        let c = counters.borrow();
        assert_eq!(c.launched, 3);
        assert_eq!(c.released, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_exceeds_attempt_budget() {
        for n in 1..=4u32 {
            let script = vec![Script::FailReady; 10];
            let (launcher, counters) = FakeLauncher::new(&script);
            let acquirer = SessionAcquirer::with_config(launcher, quick_config(n));

            assert!(acquirer.acquire("https://x").await.is_err());
            let c = counters.borrow();
            assert_eq!(c.launched, n);
            assert_eq!(c.released, c.launched);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_tries_once() {
        let (launcher, counters) = FakeLauncher::new(&[Script::FailNavigate]);
        let acquirer = SessionAcquirer::with_config(launcher, quick_config(3));

        assert!(acquirer.acquire_with_attempts("https://x", 0).await.is_err());
        assert_eq!(counters.borrow().launched, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_launch_failure_has_nothing_to_release() {
        let (launcher, counters) = FakeLauncher::new(&[Script::FailLaunch, Script::Ok]);
        let acquirer = SessionAcquirer::with_config(launcher, quick_config(2));

        assert!(acquirer.acquire("https://x").await.is_ok());
        let c = counters.borrow();
        assert_eq!(c.launched, 1);
        assert_eq!(c.released, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_error_does_not_mask_success() {
        let (launcher, counters) = FakeLauncher::new(&[Script::OkButCloseFails]);
        let acquirer = SessionAcquirer::with_config(launcher, quick_config(1));

        assert!(acquirer.acquire("https://x").await.is_ok());
        assert_eq!(counters.borrow().released, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_wait_is_settle_plus_linear_backoff() {
        let (launcher, _) =
            FakeLauncher::new(&[Script::FailReady, Script::FailReady, Script::Ok]);
        let acquirer = SessionAcquirer::with_config(launcher, quick_config(3));

        let start = tokio::time::Instant::now();
        acquirer.acquire("https://x").await.unwrap();

        // three settles (7s each) plus backoffs of 3s and 6s
        assert_eq!(start.elapsed(), Duration::from_secs(21 + 9));
    }

    #[test]
    fn test_backoff_is_linear_and_increasing() {
        let (launcher, _) = FakeLauncher::new(&[]);
        let acquirer = SessionAcquirer::with_config(launcher, quick_config(5));

        let delays: Vec<Duration> = (1..=4).map(|k| acquirer.backoff_delay(k)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(3),
                Duration::from_secs(6),
                Duration::from_secs(9),
                Duration::from_secs(12)
            ]
        );
        assert!(delays.windows(2).all(|w| w[0] < w[1]));
    }
}
