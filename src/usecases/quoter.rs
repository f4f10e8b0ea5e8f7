//! Trade Quoter Use Case - Prices, Eligibility and Limits
//!
//! All four trades (buy/sell × stablecoin/reservecoin) share one quote
//! routine parameterised by the protocol price function. Eligibility
//! and maximum-amount rules are asymmetric on purpose; they mirror what
//! the protocol does and does not expose:
//!
//! - stablecoin sell eligibility is a local balance comparison
//! - reservecoin max buy is unlimited below the SC threshold supply
//! - reservecoin max sell is capped by the account balance
//! - stablecoin max sell is just the account balance

use std::sync::Arc;

use alloy::primitives::U256;
use tracing::{debug, instrument};

use crate::config::ScalingConfig;
use crate::domain::abi::IDjed;
use crate::domain::coin::{AccountDetails, DjedContracts, MaxAmount, TradeKind, TradeQuote};
use crate::domain::scaling::{decimal_scaling, decimal_unscaling};
use crate::error::Result;
use crate::ports::chain::ChainReader;

use super::calls::{read_bool, read_u256};

/// Quotes trades and applies the protocol's buy/sell rules.
pub struct TradeQuoter<R: ChainReader> {
  reader: Arc<R>,
  contracts: DjedContracts,
  scaling: ScalingConfig,
}

impl<R: ChainReader> TradeQuoter<R> {
  pub fn new(reader: Arc<R>, contracts: DjedContracts, scaling: ScalingConfig) -> Self {
    Self {
      reader,
      contracts,
      scaling,
    }
  }

  fn decimals(&self, kind: TradeKind) -> u8 {
    self.contracts.coin(kind.coin()).decimals
  }

  /// Base-asset cost (or proceeds) of `amount` coins under the
  /// protocol price function for `kind`.
  async fn read_price(&self, kind: TradeKind, amount: U256) -> Result<U256> {
    let (reader, djed) = (&*self.reader, self.contracts.djed);
    match kind {
      TradeKind::BuyStableCoin => {
        read_u256(reader, djed, IDjed::getPriceBuyNStableCoinsBCCall { amountSC: amount }).await
      }
      TradeKind::SellStableCoin => {
        read_u256(reader, djed, IDjed::getPriceSellNStableCoinsBCCall { amountSC: amount }).await
      }
      TradeKind::BuyReserveCoin => {
        read_u256(reader, djed, IDjed::getPriceBuyNReserveCoinsBCCall { amountRC: amount }).await
      }
      TradeKind::SellReserveCoin => {
        read_u256(reader, djed, IDjed::getPriceSellNReserveCoinsBCCall { amountRC: amount }).await
      }
    }
  }

  /// Shared quote core: unscale `amount_scaled`, price exactly that many
  /// coins with the protocol function for `kind`, scale the total.
  #[instrument(skip(self))]
  pub async fn trade_data_price(&self, kind: TradeKind, amount_scaled: &str) -> Result<TradeQuote> {
    let amount_unscaled = decimal_unscaling(amount_scaled, self.decimals(kind))?;

    let total_unscaled = self.read_price(kind, amount_unscaled).await?;

    debug!(%kind, %amount_unscaled, %total_unscaled, "Trade priced");

    Ok(TradeQuote {
      kind,
      amount_scaled: amount_scaled.to_string(),
      amount_unscaled,
      total_scaled: decimal_scaling(total_unscaled, self.scaling.bc_decimals),
      total_unscaled,
    })
  }

  pub async fn trade_data_price_buy_rc(&self, amount_scaled: &str) -> Result<TradeQuote> {
    self.trade_data_price(TradeKind::BuyReserveCoin, amount_scaled).await
  }

  pub async fn trade_data_price_sell_rc(&self, amount_scaled: &str) -> Result<TradeQuote> {
    self.trade_data_price(TradeKind::SellReserveCoin, amount_scaled).await
  }

  pub async fn trade_data_price_buy_sc(&self, amount_scaled: &str) -> Result<TradeQuote> {
    self.trade_data_price(TradeKind::BuyStableCoin, amount_scaled).await
  }

  pub async fn trade_data_price_sell_sc(&self, amount_scaled: &str) -> Result<TradeQuote> {
    self.trade_data_price(TradeKind::SellStableCoin, amount_scaled).await
  }

  pub async fn check_buyable_rc(&self, unscaled_amount_rc: U256) -> Result<bool> {
    read_bool(
      &*self.reader,
      self.contracts.djed,
      IDjed::checkBuyableNReserveCoinsCall {
        amountRC: unscaled_amount_rc,
      },
    )
    .await
  }

  /// More than the balance is never sellable; otherwise ask the protocol.
  pub async fn check_sellable_rc(&self, unscaled_amount_rc: U256, unscaled_balance_rc: U256) -> Result<bool> {
    if unscaled_amount_rc > unscaled_balance_rc {
      return Ok(false);
    }
    read_bool(
      &*self.reader,
      self.contracts.djed,
      IDjed::checkSellableNReserveCoinsCall {
        amountRC: unscaled_amount_rc,
      },
    )
    .await
  }

  pub async fn check_buyable_sc(&self, unscaled_amount_sc: U256) -> Result<bool> {
    read_bool(
      &*self.reader,
      self.contracts.djed,
      IDjed::checkBuyableNStableCoinsCall {
        amountSC: unscaled_amount_sc,
      },
    )
    .await
  }

  /// Reservecoin max buy: unlimited while the stablecoin supply is
  /// below the protocol threshold, otherwise the protocol's maximum.
  pub async fn get_max_buy_rc(&self, unscaled_number_sc: U256, threshold_number_sc: U256) -> Result<MaxAmount> {
    if unscaled_number_sc < threshold_number_sc {
      return Ok(MaxAmount::Unlimited);
    }
    let max = read_u256(
      &*self.reader,
      self.contracts.djed,
      IDjed::getMaxBuyableReserveCoinsCall {},
    )
    .await?;
    Ok(MaxAmount::Limited(decimal_scaling(
      max,
      self.contracts.reserve_coin.decimals,
    )))
  }

  /// Reservecoin max sell: the lesser of the protocol maximum and the balance.
  pub async fn get_max_sell_rc(&self, unscaled_balance_rc: U256) -> Result<String> {
    let max = read_u256(
      &*self.reader,
      self.contracts.djed,
      IDjed::getMaxSellableReserveCoinsCall {},
    )
    .await?;
    Ok(decimal_scaling(
      max.min(unscaled_balance_rc),
      self.contracts.reserve_coin.decimals,
    ))
  }

  pub async fn get_max_buy_sc(&self) -> Result<String> {
    let max = read_u256(
      &*self.reader,
      self.contracts.djed,
      IDjed::getMaxBuyableStableCoinsCall {},
    )
    .await?;
    Ok(decimal_scaling(max, self.contracts.stable_coin.decimals))
  }

  /// Maximum amount for `kind`, given the current supply, threshold and
  /// account balances.
  pub async fn max_amount(
    &self,
    kind: TradeKind,
    unscaled_number_sc: U256,
    threshold_number_sc: U256,
    account: &AccountDetails,
  ) -> Result<MaxAmount> {
    match kind {
      TradeKind::BuyReserveCoin => self.get_max_buy_rc(unscaled_number_sc, threshold_number_sc).await,
      TradeKind::SellReserveCoin => self
        .get_max_sell_rc(account.unscaled_balance_rc)
        .await
        .map(MaxAmount::Limited),
      TradeKind::BuyStableCoin => self.get_max_buy_sc().await.map(MaxAmount::Limited),
      TradeKind::SellStableCoin => Ok(MaxAmount::Limited(get_max_sell_sc(&account.scaled_balance_sc))),
    }
  }

  /// Whether the protocol (or, for SC sells, the balance) allows the trade.
  pub async fn check_tradeable(&self, kind: TradeKind, unscaled_amount: U256, account: &AccountDetails) -> Result<bool> {
    match kind {
      TradeKind::BuyReserveCoin => self.check_buyable_rc(unscaled_amount).await,
      TradeKind::SellReserveCoin => {
        self
          .check_sellable_rc(unscaled_amount, account.unscaled_balance_rc)
          .await
      }
      TradeKind::BuyStableCoin => self.check_buyable_sc(unscaled_amount).await,
      TradeKind::SellStableCoin => Ok(check_sellable_sc(
        unscaled_amount,
        account.unscaled_balance_sc,
      )),
    }
  }
}

/// The protocol has no stablecoin sell check; any amount up to the
/// balance can be sold.
pub fn check_sellable_sc(unscaled_amount_sc: U256, unscaled_balance_sc: U256) -> bool {
  unscaled_amount_sc <= unscaled_balance_sc
}

/// The protocol imposes no stablecoin sell limit beyond the balance.
pub fn get_max_sell_sc(scaled_balance_sc: &str) -> String {
  scaled_balance_sc.to_string()
}
