//! Contract Registry Use Case - Deployment Discovery
//!
//! Resolves the stablecoin and reservecoin contracts from the fixed
//! protocol address, then reads both coins' decimal precision.
//!
//! Resolution flow:
//! 1. Read `stableCoin()` and `reserveCoin()` concurrently
//! 2. Read `decimals()` of both coins concurrently
//! 3. Return the aggregate `DjedContracts`

use std::sync::Arc;

use alloy::primitives::Address;
use tracing::{info, instrument};

use crate::domain::abi::{IDjed, IDjedCoin};
use crate::domain::coin::{Coin, CoinKind, DjedContracts};
use crate::error::Result;
use crate::ports::chain::ChainReader;

use super::calls::{read_address, read_u8};

/// Resolves the contract set of one Djed deployment.
pub struct ContractRegistry<R: ChainReader> {
  reader: Arc<R>,
}

impl<R: ChainReader> ContractRegistry<R> {
  pub fn new(reader: Arc<R>) -> Self {
    Self { reader }
  }

  /// Read the stablecoin and reservecoin addresses from the protocol.
  pub async fn get_coin_contracts(&self, djed: Address) -> Result<(Address, Address)> {
    let reader = &*self.reader;
    tokio::try_join!(
      read_address(reader, djed, IDjed::stableCoinCall {}),
      read_address(reader, djed, IDjed::reserveCoinCall {}),
    )
  }

  /// Read the decimal precision of both coins.
  pub async fn get_decimals(&self, stable_coin: Address, reserve_coin: Address) -> Result<(u8, u8)> {
    let reader = &*self.reader;
    tokio::try_join!(
      read_u8(reader, stable_coin, IDjedCoin::decimalsCall {}),
      read_u8(reader, reserve_coin, IDjedCoin::decimalsCall {}),
    )
  }

  /// Resolve the full contract set. Any failed read aborts resolution.
  #[instrument(skip(self))]
  pub async fn resolve(&self, djed: Address, oracle: Address) -> Result<DjedContracts> {
    let (sc_address, rc_address) = self.get_coin_contracts(djed).await?;
    let (sc_decimals, rc_decimals) = self.get_decimals(sc_address, rc_address).await?;

    info!(
      stable_coin = %sc_address,
      sc_decimals,
      reserve_coin = %rc_address,
      rc_decimals,
      "Resolved Djed contracts"
    );

    Ok(DjedContracts {
      djed,
      oracle,
      stable_coin: Coin {
        kind: CoinKind::StableCoin,
        address: sc_address,
        decimals: sc_decimals,
      },
      reserve_coin: Coin {
        kind: CoinKind::ReserveCoin,
        address: rc_address,
        decimals: rc_decimals,
      },
    })
  }
}
