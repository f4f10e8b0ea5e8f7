//! Djed Client - One Resolved Deployment
//!
//! Bundles the shared reader, the resolved contracts and the scaling
//! configuration, and hands out the use cases built on them. Pass this
//! (and a wallet, when trading) explicitly; there is no global session.

use std::sync::Arc;

use crate::config::{ContractConfig, ScalingConfig};
use crate::domain::coin::DjedContracts;
use crate::error::Result;
use crate::ports::chain::ChainReader;

use super::market::MarketReader;
use super::quoter::TradeQuoter;
use super::registry::ContractRegistry;
use super::transactions::TxBuilder;

/// Entry point for reads and quotes against one Djed deployment.
pub struct DjedClient<R: ChainReader> {
  reader: Arc<R>,
  contracts: DjedContracts,
  scaling: ScalingConfig,
}

impl<R: ChainReader> DjedClient<R> {
  /// Resolve the deployment's coin contracts and decimals.
  pub async fn connect(reader: Arc<R>, contracts: &ContractConfig, scaling: ScalingConfig) -> Result<Self> {
    let resolved = ContractRegistry::new(Arc::clone(&reader))
      .resolve(contracts.djed, contracts.oracle)
      .await?;
    Ok(Self::from_parts(reader, resolved, scaling))
  }

  /// Build a client from an already resolved contract set.
  pub const fn from_parts(reader: Arc<R>, contracts: DjedContracts, scaling: ScalingConfig) -> Self {
    Self {
      reader,
      contracts,
      scaling,
    }
  }

  pub const fn contracts(&self) -> &DjedContracts {
    &self.contracts
  }

  pub fn reader(&self) -> Arc<R> {
    Arc::clone(&self.reader)
  }

  pub fn market(&self) -> MarketReader<R> {
    MarketReader::new(Arc::clone(&self.reader), self.contracts, self.scaling)
  }

  pub fn quoter(&self) -> TradeQuoter<R> {
    TradeQuoter::new(Arc::clone(&self.reader), self.contracts, self.scaling)
  }

  pub const fn tx_builder(&self) -> TxBuilder {
    TxBuilder::new(self.contracts.djed)
  }
}
