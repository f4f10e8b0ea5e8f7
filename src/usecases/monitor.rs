//! Market Monitor Use Case - Periodic Protocol Reads
//!
//! Re-reads coin details and system parameters every refresh period
//! and forwards each outcome to a channel. A failed poll is reported
//! and the loop keeps going; only the shutdown broadcast stops it.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::domain::coin::{CoinDetails, SystemParams};
use crate::ports::chain::ChainReader;

use super::market::MarketReader;

/// Outcome of one market poll.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PollEvent {
  Ok {
    coin_details: CoinDetails,
    system_params: SystemParams,
  },
  Failed {
    reason: String,
  },
}

impl PollEvent {
  pub const fn is_ok(&self) -> bool {
    matches!(self, Self::Ok { .. })
  }
}

/// Polls the market until shutdown.
pub struct MarketMonitor<R: ChainReader> {
  market: MarketReader<R>,
  refresh_period: Duration,
  shutdown_rx: broadcast::Receiver<()>,
}

impl<R: ChainReader> MarketMonitor<R> {
  pub fn new(market: MarketReader<R>, refresh_period: Duration, shutdown_rx: broadcast::Receiver<()>) -> Self {
    Self {
      market,
      refresh_period,
      shutdown_rx,
    }
  }

  /// Read coin details and parameters once.
  pub async fn poll_once(&self) -> PollEvent {
    match tokio::try_join!(self.market.get_coin_details(), self.market.get_system_params()) {
      Ok((coin_details, system_params)) => PollEvent::Ok {
        coin_details,
        system_params,
      },
      Err(e) => PollEvent::Failed { reason: e.to_string() },
    }
  }

  /// Poll immediately, then every refresh period. Returns the number of
  /// polls made once shutdown fires or the event receiver is dropped.
  pub async fn run(mut self, events: mpsc::Sender<PollEvent>) -> u64 {
    info!(period_ms = self.refresh_period.as_millis(), "Market monitor started");
    let mut interval = tokio::time::interval(self.refresh_period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut polls = 0u64;

    loop {
      tokio::select! {
        biased;
        _ = self.shutdown_rx.recv() => {
          info!(polls, "Market monitor received shutdown signal");
          break;
        }
        _ = interval.tick() => {
          let event = self.poll_once().await;
          polls += 1;
          match &event {
            PollEvent::Ok { coin_details, .. } => debug!(
              reserve_ratio = %coin_details.percent_reserve_ratio,
              "Market poll succeeded"
            ),
            PollEvent::Failed { reason } => warn!(error = %reason, "Market poll failed"),
          }
          if events.send(event).await.is_err() {
            info!(polls, "Poll receiver dropped, stopping monitor");
            break;
          }
        }
      }
    }

    polls
  }
}
