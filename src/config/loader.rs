//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, applying environment overrides,
//! validating all parameters, and providing clear error messages
//! for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::AppConfig;

/// Overrides `network.rpc_url`.
pub const ENV_RPC_URL: &str = "DJED_RPC_URL";
/// Overrides `network.wallet_url`.
pub const ENV_WALLET_URL: &str = "DJED_WALLET_URL";

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let mut config = parse_config(&content)?;
  apply_env_overrides(&mut config);
  validate_config(&config)?;

  info!(
    chain_id = config.network.chain_id,
    djed = %config.contracts.djed,
    wallet = config.network.wallet_url.is_some(),
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Load `path` if it exists, otherwise fall back to the built-in
/// devnet defaults (still honouring env overrides).
pub fn load_or_default(path: &str) -> Result<AppConfig> {
  if Path::new(path).exists() {
    return load_config(path);
  }

  warn!(path, "Config file not found, using built-in devnet defaults");
  let mut config = AppConfig::default();
  apply_env_overrides(&mut config);
  validate_config(&config)?;
  Ok(config)
}

/// Default config file looked up when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Resolve the config for a command line: an explicit path must exist,
/// the implicit default may be absent.
pub fn resolve_config(explicit: Option<&str>) -> Result<AppConfig> {
  match explicit {
    Some(path) => load_config(path),
    None => load_or_default(DEFAULT_CONFIG_PATH),
  }
}

/// Parse TOML text into a config without touching the environment.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  toml::from_str(content).with_context(|| "Failed to parse config.toml")
}

fn apply_env_overrides(config: &mut AppConfig) {
  if let Ok(url) = std::env::var(ENV_RPC_URL) {
    config.network.rpc_url = url;
  }
  if let Ok(url) = std::env::var(ENV_WALLET_URL) {
    config.network.wallet_url = Some(url).filter(|u| !u.trim().is_empty());
  }
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-empty endpoints
/// - Non-zero protocol addresses
/// - Sensible precisions and intervals
pub fn validate_config(config: &AppConfig) -> Result<()> {
  // Network validation
  anyhow::ensure!(
    !config.network.rpc_url.trim().is_empty(),
    "RPC URL must not be empty"
  );
  anyhow::ensure!(
    config.network.max_requests_per_second > 0,
    "max_requests_per_second must be positive"
  );
  anyhow::ensure!(
    config.network.request_timeout_secs > 0,
    "request_timeout_secs must be positive"
  );

  // Contract validation
  anyhow::ensure!(
    !config.contracts.djed.is_zero(),
    "Djed contract address must not be the zero address"
  );
  anyhow::ensure!(
    !config.contracts.oracle.is_zero(),
    "Oracle contract address must not be the zero address"
  );

  // Scaling validation: 10^77 is the largest power of ten in a U256
  anyhow::ensure!(
    config.scaling.bc_decimals <= 77,
    "bc_decimals must be at most 77, got {}",
    config.scaling.bc_decimals
  );
  anyhow::ensure!(
    config.scaling.scaling_decimals <= 77,
    "scaling_decimals must be at most 77, got {}",
    config.scaling.scaling_decimals
  );

  // Interval validation
  anyhow::ensure!(
    config.watch.refresh_period_ms > 0,
    "refresh_period_ms must be positive"
  );

  Ok(())
}
