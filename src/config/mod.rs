//! Configuration Module - TOML-based Client Configuration
//!
//! Loads and validates configuration from `config.toml` with
//! environment variable overrides via `.env` files.
//! Chain id, endpoints, contract addresses and precisions are
//! externalized here; every field defaults to the Milkomeda
//! devnet deployment so an empty file is a valid config.

pub mod loader;

use alloy::primitives::{Address, address};
use serde::Deserialize;

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Client identity and logging.
  pub app: AppSection,
  /// Node and wallet endpoints.
  pub network: NetworkConfig,
  /// Fixed protocol contract addresses.
  pub contracts: ContractConfig,
  /// Decimal precisions not read from the coin contracts.
  pub scaling: ScalingConfig,
  /// Transaction confirmation.
  pub transactions: TransactionConfig,
  /// Market monitor loop.
  pub watch: WatchConfig,
  /// Metrics and health endpoints.
  pub metrics: MetricsConfig,
}

/// Client identity configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
  /// Human-readable client name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  pub log_level: String,
}

/// Node and wallet endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
  /// Expected chain id, checked at connect time.
  pub chain_id: u64,
  /// JSON-RPC node used for every read.
  pub rpc_url: String,
  /// JSON-RPC wallet that signs (`eth_accounts` / `eth_sendTransaction`).
  /// `None` means no wallet is available.
  pub wallet_url: Option<String>,
  /// Request timeout in seconds.
  pub request_timeout_secs: u64,
  /// Upper bound on node requests per second.
  pub max_requests_per_second: u32,
}

/// Fixed protocol contract addresses.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
  /// Djed protocol contract.
  pub djed: Address,
  /// Base-asset price oracle.
  pub oracle: Address,
}

/// Precisions for values denominated in the base asset or protocol units.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ScalingConfig {
  /// Decimals of the base chain asset (prices, reserve, balances).
  pub bc_decimals: u8,
  /// Decimals of protocol fixed-point values (reserve ratio, fee).
  pub scaling_decimals: u8,
}

/// Transaction confirmation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
  /// Delay before the single receipt check (milliseconds).
  pub confirmation_delay_ms: u64,
}

/// Market monitor configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
  /// Interval between market reads (milliseconds).
  pub refresh_period_ms: u64,
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export in `watch` mode.
  pub enabled: bool,
  /// Metrics server bind address.
  pub bind_address: String,
  /// Health check endpoint port.
  pub health_port: u16,
}

impl Default for AppSection {
  fn default() -> Self {
    Self {
      name: "djed-client".to_string(),
      log_level: default_log_level(),
    }
  }
}

impl Default for NetworkConfig {
  fn default() -> Self {
    Self {
      chain_id: 200_101,
      rpc_url: "https://rpc-devnet-cardano-evm.c1.milkomeda.com/".to_string(),
      wallet_url: None,
      request_timeout_secs: 30,
      max_requests_per_second: 20,
    }
  }
}

impl Default for ContractConfig {
  fn default() -> Self {
    Self {
      djed: address!("52527fF4a1d99a35B75d821e90F23512D9327fdf"),
      oracle: address!("5A8E0B0B666A60Cf4f00E56A7C6C73FcE77eAaD6"),
    }
  }
}

impl Default for ScalingConfig {
  fn default() -> Self {
    Self {
      bc_decimals: 18,
      scaling_decimals: 24,
    }
  }
}

impl Default for TransactionConfig {
  fn default() -> Self {
    Self {
      confirmation_delay_ms: 4000,
    }
  }
}

impl Default for WatchConfig {
  fn default() -> Self {
    Self {
      refresh_period_ms: 4000,
    }
  }
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: "0.0.0.0:9090".to_string(),
      health_port: 8080,
    }
  }
}

fn default_log_level() -> String {
  "info".to_string()
}
