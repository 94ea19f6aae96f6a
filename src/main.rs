//! TENSOR DAILY: daily react & strategy-rotation runner
//!
//! Entry point. Loads configuration, initialises structured logging,
//! reads the proxy list and runs the daily cycle until interrupted.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use tensor_daily::accounts::{self, TokenFile};
use tensor_daily::config::{AppConfig, DEFAULT_CONFIG_PATH};
use tensor_daily::engine::{CycleScheduler, HttpConnector};

const BANNER: &str = r#"
 _____ _____ _   _ ____   ___  ____    ____    _    ___ _  __   __
|_   _| ____| \ | / ___| / _ \|  _ \  |  _ \  / \  |_ _| | \ \ / /
  | | |  _| |  \| \___ \| | | | |_) | | | | |/ _ \  | || |  \ V /
  | | | |___| |\  |___) | |_| |  _ <  | |_| / ___ \ | || |___| |
  |_| |_____|_| \_|____/ \___/|_| \_\ |____/_/   \_\___|_____|_|

  Daily react & strategy rotation for TruthTensor accounts
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Logging first so config loading can report what it did
    init_logging();

    let mut cfg = AppConfig::load(DEFAULT_CONFIG_PATH)?;
    cfg.override_from_env();

    println!("{BANNER}");
    info!(
        tokens_file = %cfg.runner.tokens_file,
        use_proxy = cfg.runner.use_proxy,
        cycle_interval_secs = cfg.runner.cycle_interval_secs,
        "TENSOR DAILY starting up"
    );

    // -- Proxies -----------------------------------------------------------

    let proxies = if cfg.runner.use_proxy {
        accounts::load_proxies(Path::new(&cfg.runner.proxies_file))
    } else {
        Vec::new()
    };

    let tokens = TokenFile::new(&cfg.runner.tokens_file);
    let run = cfg.into_run_config(proxies);

    // -- Main loop -----------------------------------------------------------

    let connector = HttpConnector::from_config(&run);
    let scheduler = CycleScheduler::new(run, Arc::new(tokens), Arc::new(connector));

    tokio::select! {
        _ = scheduler.run_forever() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received.");
        }
    }

    info!("TENSOR DAILY shut down cleanly.");
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tensor_daily=info"));

    let json_logging = std::env::var("TENSOR_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
