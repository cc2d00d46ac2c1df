use log::{error, info};
use rust_anime_scanner::catalog::CatalogClient;
use rust_anime_scanner::config::ScannerConfig;
use rust_anime_scanner::http_client::HttpTransport;
use rust_anime_scanner::logging;
use rust_anime_scanner::pipeline::Scanner;
use rust_anime_scanner::session::store::load_session;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let cfg = ScannerConfig::from_env();

    let session = match load_session(&cfg.cookies_json) {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to load cookies from {}: {}", cfg.cookies_json.display(), e);
            error!("Run the harvest binary first to acquire a session");
            return ExitCode::FAILURE;
        }
    };

    let transport = match HttpTransport::new() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = CatalogClient::new(transport, session, &cfg.base_url, &cfg.ranking_api_url);
    let scanner = Scanner::new(client, cfg);

    let summaries = scanner.scan_all().await;
    if summaries.iter().all(|s| s.saved()) {
        info!("Scanner finished successfully");
        ExitCode::SUCCESS
    } else {
        error!("Scanner finished with unsaved collections");
        ExitCode::FAILURE
    }
}
