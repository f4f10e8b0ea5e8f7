//! JSON-RPC Wallet - Signing Endpoint Adapter
//!
//! Talks to a wallet that holds the user's keys and exposes the
//! standard `eth_accounts` / `eth_sendTransaction` methods (a desktop
//! signer such as Frame, or a dev node with unlocked accounts). The
//! client never sees a private key.

use std::time::Duration;

use alloy::primitives::{Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::transports::http::{Client, Http};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::config::NetworkConfig;
use crate::domain::tx::UnsignedTx;
use crate::error::{DjedError, Result};
use crate::ports::wallet::WalletGateway;

/// Wallet reached over HTTP JSON-RPC.
pub struct RpcWallet {
    provider: RootProvider<Http<Client>>,
    timeout: Duration,
}

impl RpcWallet {
    /// Connect to the configured wallet endpoint.
    ///
    /// # Errors
    /// `WalletUnavailable` when no endpoint is configured or the
    /// endpoint does not answer `eth_accounts`. No retry.
    #[instrument(skip_all)]
    pub async fn connect(config: &NetworkConfig) -> Result<Self> {
        let Some(wallet_url) = config.wallet_url.as_deref() else {
            return Err(DjedError::WalletUnavailable(
                "no wallet endpoint configured (set network.wallet_url or DJED_WALLET_URL)"
                    .to_string(),
            ));
        };

        let url = wallet_url.parse().map_err(|_| DjedError::InvalidEndpoint {
            url: wallet_url.to_string(),
        })?;

        let wallet = Self {
            provider: ProviderBuilder::new().on_http(url),
            timeout: Duration::from_secs(config.request_timeout_secs),
        };

        let accounts = wallet
            .accounts()
            .await
            .map_err(|e| DjedError::WalletUnavailable(e.to_string()))?;

        info!(accounts = accounts.len(), "Connected to wallet");
        Ok(wallet)
    }
}

#[async_trait]
impl WalletGateway for RpcWallet {
    async fn accounts(&self) -> Result<Vec<Address>> {
        match tokio::time::timeout(self.timeout, self.provider.get_accounts()).await {
            Ok(result) => result.map_err(|e| DjedError::rpc("eth_accounts", e)),
            Err(_) => Err(DjedError::rpc("eth_accounts", "timed out")),
        }
    }

    #[instrument(skip(self, tx), fields(from = %tx.from, to = %tx.to, value = %tx.value))]
    async fn send_transaction(&self, tx: &UnsignedTx) -> Result<TxHash> {
        // Signing waits on the user, so no timeout here.
        let result = self
            .provider
            .raw_request::<_, TxHash>("eth_sendTransaction".into(), (tx.clone(),))
            .await;

        match result {
            Ok(hash) => {
                info!(%hash, "Wallet accepted transaction");
                Ok(hash)
            }
            Err(e) => {
                warn!(error = %e, "Wallet rejected transaction");
                Err(DjedError::WalletRequestRejected(e.to_string()))
            }
        }
    }
}
