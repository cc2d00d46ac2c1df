// Library interface for rust_anime_scanner
// Binaries and integration tests build on these modules

pub mod browser;
pub mod catalog;
pub mod config;
pub mod http_client;
pub mod logging;
pub mod merge;
pub mod metrics;
pub mod pipeline;
pub mod resolver;
pub mod session;
