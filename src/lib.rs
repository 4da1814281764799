pub mod ai;
pub mod billing;
pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod notes;
pub mod state;
pub mod storage;
pub mod utils;

pub use config::AppConfig;
pub use error::{CommandError, Error, Result};
pub use state::AppState;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used.
/// Use RUST_LOG=debug for verbose per-operation logs.
pub fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .try_init();
}

/// Load configuration, open storage and print the current entitlement state
pub fn run() -> Result<()> {
    let config = AppConfig::from_env()?;
    init_tracing(&config.log_filter);

    let state = AppState::new(&config)?;
    let info = commands::get_subscription_info(&state);
    tracing::info!(
        tier = %info.tier,
        days_remaining = ?info.days_remaining,
        "Voice notes core ready"
    );

    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
