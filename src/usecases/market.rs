//! Market Data Use Case - Protocol and Account Reads
//!
//! Issues batches of independent reads concurrently and scales the raw
//! integers into decimal strings. Coin amounts use the coin's own
//! precision; prices and the reserve use the base-asset precision;
//! ratios and the fee use the protocol scaling precision.
//!
//! No caching: every call re-reads from the chain.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use chrono::Utc;
use tracing::{debug, instrument};

use crate::config::ScalingConfig;
use crate::domain::abi::{IDjed, IDjedCoin, IOracle};
use crate::domain::coin::{AccountDetails, CoinDetails, DjedContracts, SystemParams};
use crate::domain::scaling::{decimal_scaling, percent_scaling};
use crate::error::Result;
use crate::ports::chain::ChainReader;

use super::calls::read_u256;

/// Reads market, system and account figures for one deployment.
pub struct MarketReader<R: ChainReader> {
  reader: Arc<R>,
  contracts: DjedContracts,
  scaling: ScalingConfig,
}

impl<R: ChainReader> MarketReader<R> {
  pub fn new(reader: Arc<R>, contracts: DjedContracts, scaling: ScalingConfig) -> Self {
    Self {
      reader,
      contracts,
      scaling,
    }
  }

  /// Supplies, prices, reserve and reserve ratio in one concurrent batch.
  #[instrument(skip(self))]
  pub async fn get_coin_details(&self) -> Result<CoinDetails> {
    let reader = &*self.reader;
    let djed = self.contracts.djed;
    let sc = self.contracts.stable_coin;
    let rc = self.contracts.reserve_coin;
    let bc = self.scaling.bc_decimals;

    let (number_sc, price_sc, number_rc, reserve_bc, reserve_ratio, buy_price_rc, sell_price_rc) = tokio::try_join!(
      read_u256(reader, sc.address, IDjedCoin::totalSupplyCall {}),
      read_u256(reader, djed, IDjed::getStableCoinWholeTargetPriceBCCall {}),
      read_u256(reader, rc.address, IDjedCoin::totalSupplyCall {}),
      read_u256(reader, djed, IDjed::reserveBCCall {}),
      read_u256(reader, djed, IDjed::getReserveRatioCall {}),
      read_u256(reader, djed, IDjed::getReserveCoinWholeBuyPriceBCCall {}),
      read_u256(reader, djed, IDjed::getReserveCoinWholeSellPriceBCCall {}),
    )?;

    let details = CoinDetails {
      scaled_number_sc: decimal_scaling(number_sc, sc.decimals),
      unscaled_number_sc: number_sc,
      scaled_price_sc: decimal_scaling(price_sc, bc),
      scaled_number_rc: decimal_scaling(number_rc, rc.decimals),
      scaled_reserve_bc: decimal_scaling(reserve_bc, bc),
      percent_reserve_ratio: percent_scaling(reserve_ratio, self.scaling.scaling_decimals),
      scaled_buy_price_rc: decimal_scaling(buy_price_rc, bc),
      scaled_sell_price_rc: decimal_scaling(sell_price_rc, bc),
      fetched_at: Utc::now(),
    };

    debug!(
      reserve_ratio = %details.percent_reserve_ratio,
      reserve_bc = %details.scaled_reserve_bc,
      "Coin details read"
    );
    Ok(details)
  }

  /// Protocol thresholds: reserve ratio bounds, fee and SC threshold supply.
  #[instrument(skip(self))]
  pub async fn get_system_params(&self) -> Result<SystemParams> {
    let reader = &*self.reader;
    let djed = self.contracts.djed;
    let scaling = self.scaling.scaling_decimals;

    let (ratio_min, ratio_max, fee, threshold_number_sc) = tokio::try_join!(
      read_u256(reader, djed, IDjed::reserveRatioMinCall {}),
      read_u256(reader, djed, IDjed::reserveRatioMaxCall {}),
      read_u256(reader, djed, IDjed::feeCall {}),
      read_u256(reader, djed, IDjed::thresholdNumberSCCall {}),
    )?;

    Ok(SystemParams {
      reserve_ratio_min: decimal_scaling(ratio_min, scaling),
      reserve_ratio_max: decimal_scaling(ratio_max, scaling),
      fee: decimal_scaling(fee, scaling),
      threshold_number_sc,
    })
  }

  /// Stablecoin, reservecoin and native balances of `account`.
  #[instrument(skip(self))]
  pub async fn get_account_details(&self, account: Address) -> Result<AccountDetails> {
    let reader = &*self.reader;
    let sc = self.contracts.stable_coin;
    let rc = self.contracts.reserve_coin;

    let (balance_sc, balance_rc, balance_bc): (U256, U256, U256) = tokio::try_join!(
      read_u256(reader, sc.address, IDjedCoin::balanceOfCall { account }),
      read_u256(reader, rc.address, IDjedCoin::balanceOfCall { account }),
      reader.native_balance(account),
    )?;

    Ok(AccountDetails {
      account,
      scaled_balance_sc: decimal_scaling(balance_sc, sc.decimals),
      unscaled_balance_sc: balance_sc,
      scaled_balance_rc: decimal_scaling(balance_rc, rc.decimals),
      unscaled_balance_rc: balance_rc,
      scaled_balance_bc: decimal_scaling(balance_bc, self.scaling.bc_decimals),
    })
  }

  /// Base-asset exchange rate reported by the oracle contract.
  pub async fn get_oracle_exchange_rate(&self) -> Result<String> {
    let rate = read_u256(&*self.reader, self.contracts.oracle, IOracle::exchangeRateCall {}).await?;
    Ok(decimal_scaling(rate, self.scaling.bc_decimals))
  }
}
