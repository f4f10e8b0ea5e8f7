//! Transaction Use Case - Build, Submit, Confirm
//!
//! Builds unsigned protocol calls, hands them to the wallet and checks
//! the receipt once after a fixed delay.
//!
//! Trade flow:
//! 1. Quote the amount and check the protocol allows it
//! 2. Build the unsigned transaction (buys carry value, sells carry amount)
//! 3. Submit through the wallet (fails fast with no connected account)
//! 4. Wait the confirmation delay, fetch the receipt once
//!
//! The receipt check is single-shot: if the transaction is not mined
//! by then the outcome is `ReceiptUnavailable`, not a retry.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use alloy::sol_types::SolCall;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::domain::abi::IDjed;
use crate::domain::coin::{AccountDetails, TradeKind, TradeQuote};
use crate::domain::session::{TxEvent, TxPhase};
use crate::domain::tx::UnsignedTx;
use crate::error::{DjedError, Result};
use crate::ports::chain::ChainReader;
use crate::ports::wallet::WalletGateway;

use super::quoter::TradeQuoter;

/// Encodes protocol trade calls addressed to the Djed contract.
#[derive(Debug, Clone, Copy)]
pub struct TxBuilder {
  djed: Address,
}

impl TxBuilder {
  pub const fn new(djed: Address) -> Self {
    Self { djed }
  }

  /// Pay `value` base-asset wei for reservecoins.
  pub fn buy_rc_tx(&self, account: Address, value: U256) -> UnsignedTx {
    let data = IDjed::buyReserveCoinsCall {}.abi_encode();
    UnsignedTx::new(account, self.djed, value, data)
  }

  /// Sell `amount` unscaled reservecoins.
  pub fn sell_rc_tx(&self, account: Address, amount: U256) -> UnsignedTx {
    let data = IDjed::sellReserveCoinsCall { amountRC: amount }.abi_encode();
    UnsignedTx::new(account, self.djed, U256::ZERO, data)
  }

  /// Pay `value` base-asset wei for stablecoins.
  pub fn buy_sc_tx(&self, account: Address, value: U256) -> UnsignedTx {
    let data = IDjed::buyStableCoinsCall {}.abi_encode();
    UnsignedTx::new(account, self.djed, value, data)
  }

  /// Sell `amount` unscaled stablecoins.
  pub fn sell_sc_tx(&self, account: Address, amount: U256) -> UnsignedTx {
    let data = IDjed::sellStableCoinsCall { amountSC: amount }.abi_encode();
    UnsignedTx::new(account, self.djed, U256::ZERO, data)
  }

  /// Transaction for an accepted quote: buys send the quoted total as
  /// value, sells send the coin amount as argument.
  pub fn for_quote(&self, account: Address, quote: &TradeQuote) -> UnsignedTx {
    match quote.kind {
      TradeKind::BuyReserveCoin => self.buy_rc_tx(account, quote.total_unscaled),
      TradeKind::SellReserveCoin => self.sell_rc_tx(account, quote.amount_unscaled),
      TradeKind::BuyStableCoin => self.buy_sc_tx(account, quote.total_unscaled),
      TradeKind::SellStableCoin => self.sell_sc_tx(account, quote.amount_unscaled),
    }
  }
}

/// Submits transactions through the wallet and checks their receipt.
pub struct TxSubmitter<R: ChainReader, W: WalletGateway> {
  reader: Arc<R>,
  wallet: Arc<W>,
  confirmation_delay: Duration,
}

impl<R: ChainReader, W: WalletGateway> TxSubmitter<R, W> {
  pub fn new(reader: Arc<R>, wallet: Arc<W>, confirmation_delay: Duration) -> Self {
    Self {
      reader,
      wallet,
      confirmation_delay,
    }
  }

  /// Send `tx` through the wallet.
  ///
  /// # Errors
  /// `NoAccountConnected` before any network call when `accounts` is
  /// empty; otherwise whatever the wallet reports.
  pub async fn promise_tx(&self, accounts: &[Address], tx: &UnsignedTx) -> Result<TxHash> {
    if accounts.is_empty() {
      return Err(DjedError::NoAccountConnected);
    }
    self.wallet.send_transaction(tx).await
  }

  /// Wait the confirmation delay, then read the receipt status once.
  #[instrument(skip(self))]
  pub async fn verify_tx(&self, hash: TxHash) -> Result<bool> {
    tokio::time::sleep(self.confirmation_delay).await;

    match self.reader.receipt_status(hash).await? {
      Some(status) => Ok(status),
      None => {
        warn!(%hash, "Receipt not available after confirmation delay");
        Err(DjedError::ReceiptUnavailable {
          hash,
          waited_ms: u64::try_from(self.confirmation_delay.as_millis()).unwrap_or(u64::MAX),
        })
      }
    }
  }
}

/// Drives one transaction through the modal phases and publishes
/// every transition on a watch channel.
pub struct TradeExecutor<R: ChainReader, W: WalletGateway> {
  submitter: TxSubmitter<R, W>,
  phase: watch::Sender<TxPhase>,
}

impl<R: ChainReader, W: WalletGateway> TradeExecutor<R, W> {
  pub fn new(submitter: TxSubmitter<R, W>) -> Self {
    let (phase, _) = watch::channel(TxPhase::Idle);
    Self { submitter, phase }
  }

  /// Receive phase transitions (for rendering pending/success/failure).
  pub fn subscribe(&self) -> watch::Receiver<TxPhase> {
    self.phase.subscribe()
  }

  pub fn phase(&self) -> TxPhase {
    self.phase.borrow().clone()
  }

  fn advance(&self, event: TxEvent) -> TxPhase {
    let next = self.phase.borrow().clone().apply(event);
    self.phase.send_replace(next.clone());
    next
  }

  /// Submit `tx` and wait for its single receipt check.
  ///
  /// Returns the terminal phase. Errors are also reflected as a
  /// `Failure` phase before being returned.
  #[instrument(skip(self, accounts, tx), fields(to = %tx.to, value = %tx.value))]
  pub async fn execute(&self, accounts: &[Address], tx: &UnsignedTx) -> Result<TxPhase> {
    if self.phase.borrow().is_terminal() {
      self.advance(TxEvent::Reset);
    }

    let hash = match self.submitter.promise_tx(accounts, tx).await {
      Ok(hash) => hash,
      Err(e) => {
        self.advance(TxEvent::Failed(e.to_string()));
        return Err(e);
      }
    };
    self.advance(TxEvent::Submitted(hash));
    info!(%hash, "Transaction pending");

    match self.submitter.verify_tx(hash).await {
      Ok(status) => {
        let phase = self.advance(TxEvent::Confirmed(status));
        info!(%hash, success = status, "Transaction resolved");
        Ok(phase)
      }
      Err(e) => {
        self.advance(TxEvent::Failed(e.to_string()));
        Err(e)
      }
    }
  }
}

/// Quote `amount_scaled`, check the protocol accepts it and build the
/// transaction for `account`.
///
/// # Errors
/// `TradeNotAllowed` when the eligibility check fails.
pub async fn plan_trade<R: ChainReader>(
  quoter: &TradeQuoter<R>,
  builder: &TxBuilder,
  kind: TradeKind,
  amount_scaled: &str,
  account: &AccountDetails,
) -> Result<(TradeQuote, UnsignedTx)> {
  let quote = quoter.trade_data_price(kind, amount_scaled).await?;

  if !quoter
    .check_tradeable(kind, quote.amount_unscaled, account)
    .await?
  {
    return Err(DjedError::TradeNotAllowed {
      kind,
      amount: amount_scaled.to_string(),
    });
  }

  let tx = builder.for_quote(account.account, &quote);
  Ok((quote, tx))
}
