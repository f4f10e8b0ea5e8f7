//! EVM RPC Provider - alloy-rs 0.9 Connection Management
//!
//! Manages the read connection to the node via alloy-rs. Validates
//! the chain id at startup, paces requests with a `governor` rate
//! limiter and bounds every request with a timeout.

use std::future::IntoFuture;
use std::num::NonZeroU32;
use std::time::Duration;

use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportResult;
use alloy::transports::http::{Client, Http};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tracing::{debug, info, instrument};

use crate::config::NetworkConfig;
use crate::error::{DjedError, Result};
use crate::ports::chain::ChainReader;

/// Shared node provider backed by alloy-rs 0.9.
///
/// All use cases share a single instance so the rate limit applies
/// to the whole process, not per component.
pub struct DjedProvider {
    /// The alloy HTTP provider connected to the node.
    provider: RootProvider<Http<Client>>,
    /// Paces outgoing requests.
    limiter: DefaultDirectRateLimiter,
    /// Per-request timeout.
    timeout: Duration,
    /// RPC endpoint URL (for diagnostics).
    rpc_url: String,
}

impl DjedProvider {
    /// Connect to the node and validate the chain id.
    ///
    /// No retry: a node that is down or on the wrong chain is reported
    /// to the caller immediately.
    #[instrument(skip_all, fields(rpc_url = %config.rpc_url))]
    pub async fn connect(config: &NetworkConfig) -> Result<Self> {
        let rpc_url = config.rpc_url.clone();
        let url = rpc_url.parse().map_err(|_| DjedError::InvalidEndpoint {
            url: rpc_url.clone(),
        })?;

        let provider = ProviderBuilder::new().on_http(url);
        let quota = Quota::per_second(
            NonZeroU32::new(config.max_requests_per_second).unwrap_or(NonZeroU32::MIN),
        );

        let this = Self {
            provider,
            limiter: RateLimiter::direct(quota),
            timeout: Duration::from_secs(config.request_timeout_secs),
            rpc_url,
        };

        let chain_id = this.chain_id().await?;
        if chain_id != config.chain_id {
            return Err(DjedError::ChainMismatch {
                expected: config.chain_id,
                actual: chain_id,
            });
        }

        info!(chain_id, "Connected to EVM RPC");
        Ok(this)
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Check if the RPC connection is healthy via a lightweight call.
    pub async fn is_healthy(&self) -> bool {
        self.request("eth_blockNumber", self.provider.get_block_number())
            .await
            .is_ok()
    }

    /// Wait for a rate-limit slot, then run `request` under the timeout.
    async fn request<F, T>(&self, method: &'static str, request: F) -> Result<T>
    where
        F: IntoFuture<Output = TransportResult<T>>,
    {
        self.limiter.until_ready().await;

        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                debug!(method, error = %e, "RPC request failed");
                Err(DjedError::rpc(method, e))
            }
            Err(_) => Err(DjedError::rpc(
                method,
                format!("timed out after {}s", self.timeout.as_secs()),
            )),
        }
    }
}

#[async_trait]
impl ChainReader for DjedProvider {
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes> {
        let tx = TransactionRequest::default().to(to).input(input.into());
        self.request("eth_call", self.provider.call(&tx)).await
    }

    async fn native_balance(&self, account: Address) -> Result<U256> {
        self.request("eth_getBalance", self.provider.get_balance(account))
            .await
    }

    async fn receipt_status(&self, hash: TxHash) -> Result<Option<bool>> {
        let receipt = self
            .request(
                "eth_getTransactionReceipt",
                self.provider.get_transaction_receipt(hash),
            )
            .await?;
        Ok(receipt.map(|r| ReceiptResponse::status(&r)))
    }

    async fn chain_id(&self) -> Result<u64> {
        self.request("eth_chainId", self.provider.get_chain_id()).await
    }
}
