/// Harvest-then-scan handoff: a session acquired through a scripted browser
/// is persisted and loaded back the way the scanner binary reads it
use rust_anime_scanner::browser::{BrowserError, BrowserLauncher, BrowserPage};
use rust_anime_scanner::session::store::{load_session, save_session};
use rust_anime_scanner::session::{AcquireConfig, Cookie, SessionAcquirer, SessionError};
use std::cell::Cell;
use std::fs;
use std::time::Duration;

struct FlakyLauncher {
    failures_left: Cell<u32>,
    launches: Cell<u32>,
}

struct ScriptedPage {
    fail: bool,
}

impl BrowserLauncher for FlakyLauncher {
    type Page = ScriptedPage;

    fn launch(&self) -> Result<ScriptedPage, BrowserError> {
        self.launches.set(self.launches.get() + 1);
        let fail = self.failures_left.get() > 0;
        if fail {
            self.failures_left.set(self.failures_left.get() - 1);
        }
        Ok(ScriptedPage { fail })
    }
}

impl BrowserPage for ScriptedPage {
    fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), BrowserError> {
        if self.fail {
            return Err(BrowserError::NavigationError(format!("{} timed out", url)));
        }
        Ok(())
    }

    fn wait_for_visible(&self, _selector: &str, _timeout: Duration) -> Result<(), BrowserError> {
        Ok(())
    }

    fn cookies(&self) -> Result<Vec<Cookie>, BrowserError> {
        let mut clearance = Cookie::new("cf_clearance", "xyz");
        clearance.domain = ".pahe.test".to_string();
        clearance.http_only = true;
        Ok(vec![Cookie::new("__ddg2_", "abc"), clearance])
    }

    fn content(&self) -> Result<String, BrowserError> {
        Ok("<html><body>catalog</body></html>".to_string())
    }

    fn close(self) -> Result<(), BrowserError> {
        Ok(())
    }
}

fn launcher(failures: u32) -> FlakyLauncher {
    FlakyLauncher {
        failures_left: Cell::new(failures),
        launches: Cell::new(0),
    }
}

#[tokio::test(start_paused = true)]
async fn test_acquired_session_round_trips_through_cookie_files() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("cookies.json");
    let txt_path = dir.path().join("cookies.txt");

    let acquirer = SessionAcquirer::new(launcher(1));
    let session = acquirer.acquire("https://pahe.test").await.unwrap();
    save_session(&session, &json_path, &txt_path).unwrap();

    assert_eq!(fs::read_to_string(&txt_path).unwrap(), "__ddg2_=abc; cf_clearance=xyz");

    let loaded = load_session(&json_path).unwrap();
    assert_eq!(loaded.cookies(), session.cookies());
    assert_eq!(loaded.cookie_header(), session.cookie_header());
    assert!(loaded.page_snapshot().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_acquisition_gives_up_after_budget() {
    let config = AcquireConfig {
        max_attempts: 2,
        ..AcquireConfig::default()
    };
    let acquirer = SessionAcquirer::with_config(launcher(5), config);

    let err = acquirer.acquire("https://pahe.test").await.unwrap_err();

    assert!(matches!(err, SessionError::Acquisition { attempts: 2, .. }));
    assert!(err.to_string().contains("navigat"));
}

#[test]
fn test_wrapped_cookie_file_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cookies.json");
    fs::write(&path, r#"{"cookies": [{"name": "a", "value": "1", "domain": ".pahe.test"}]}"#).unwrap();

    let session = load_session(&path).unwrap();
    assert_eq!(session.cookie_header(), "a=1");
}

#[test]
fn test_missing_cookie_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_session(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, SessionError::Io(_)));
}
