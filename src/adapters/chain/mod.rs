//! Chain Adapters - EVM Node and Wallet Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - Read-only node access with rate limiting and chain-id validation
//! - Transaction submission through a JSON-RPC wallet

pub mod provider;
pub mod wallet;

pub use provider::DjedProvider;
pub use wallet::RpcWallet;
