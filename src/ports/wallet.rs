//! Wallet Gateway Port - Signing and Broadcast
//!
//! The wallet owns the keys. This client only asks it which accounts
//! are connected and hands it unsigned transactions; signing and
//! broadcast are entirely the wallet's business.

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;

use crate::domain::tx::UnsignedTx;
use crate::error::Result;

/// Trait for a JSON-RPC wallet (`eth_accounts` / `eth_sendTransaction`).
#[async_trait]
pub trait WalletGateway: Send + Sync + 'static {
  /// Accounts the wallet currently exposes. Empty means disconnected.
  async fn accounts(&self) -> Result<Vec<Address>>;

  /// Ask the wallet to sign and broadcast `tx`.
  ///
  /// # Errors
  /// Whatever the wallet reports (user rejection, insufficient funds,
  /// node rejection) surfaces as `DjedError::WalletRequestRejected`.
  async fn send_transaction(&self, tx: &UnsignedTx) -> Result<TxHash>;
}
