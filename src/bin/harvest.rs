use log::{error, info};
use rust_anime_scanner::browser::{BrowserConfig, ChromeLauncher};
use rust_anime_scanner::config::ScannerConfig;
use rust_anime_scanner::logging;
use rust_anime_scanner::session::store::save_session;
use rust_anime_scanner::session::SessionAcquirer;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let cfg = ScannerConfig::from_env();
    // --debug shows the browser window
    let browser_config = if std::env::args().any(|a| a == "--debug") {
        BrowserConfig::debug_mode()
    } else {
        BrowserConfig::default()
    };

    let acquirer = SessionAcquirer::new(ChromeLauncher::new(browser_config));
    let session = match acquirer.acquire(&cfg.base_url).await {
        Ok(session) => session,
        Err(e) => {
            error!("Cookie harvest failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = save_session(&session, &cfg.cookies_json, &cfg.cookies_txt) {
        error!("Failed to save cookies: {}", e);
        return ExitCode::FAILURE;
    }

    if let Some(html) = session.page_snapshot() {
        info!("Page content length: {}", html.len());
    }
    ExitCode::SUCCESS
}
