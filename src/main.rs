use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use suivi::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).init();

    let cfg = AppConfig::from_env()?;

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "startup",
        "suivi starting: RUST_LOG='{}', http={}:{}, page_size={}, session_ttl_secs={}, seed_file={:?}",
        rust_log, cfg.http_host, cfg.http_port, cfg.page_size, cfg.session_ttl_secs, cfg.seed_file
    );

    suivi::server::run(cfg).await
}
