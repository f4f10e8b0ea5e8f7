//! Chain Reader Port - Read Access to the EVM Node
//!
//! Everything the use cases need from the node: raw `eth_call`,
//! native balances, receipts and the chain id. Contract-specific
//! encoding happens above this port, so adapters stay ABI-agnostic.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;

use crate::error::Result;

/// Trait for read-only node access via alloy-rs.
///
/// Failures are reported as `DjedError::RpcRead`; callers re-label
/// them with the contract method they were reading.
#[async_trait]
pub trait ChainReader: Send + Sync + 'static {
  /// Execute a read-only call against `to` with ABI-encoded `input`.
  async fn call(&self, to: Address, input: Bytes) -> Result<Bytes>;

  /// Native base-asset balance of `account`, in wei.
  async fn native_balance(&self, account: Address) -> Result<U256>;

  /// Status flag of a mined transaction, `None` if no receipt exists yet.
  async fn receipt_status(&self, hash: TxHash) -> Result<Option<bool>>;

  /// Chain id reported by the node.
  async fn chain_id(&self) -> Result<u64>;
}
