//! Prometheus Metrics Registry - Protocol Observability
//!
//! Registers and exposes Prometheus metrics on :9090 while the market
//! monitor runs. Gauges mirror the last successful coin details read;
//! the poll counter tracks read outcomes.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, Gauge, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::domain::coin::{CoinDetails, CoinKind};

/// Centralized Prometheus metrics for the Djed monitor.
///
/// All metrics follow the naming convention `djed_*`. Values are
/// exported as floats for dashboards; the exact figures stay in the
/// decimal strings of [`CoinDetails`].
pub struct MetricsRegistry {
    registry: Registry,
    /// Reserve ratio in percent.
    pub reserve_ratio_percent: Gauge,
    /// Stablecoin target price in base asset.
    pub stablecoin_price_bc: Gauge,
    /// Reservecoin buy price in base asset.
    pub reservecoin_buy_price_bc: Gauge,
    /// Reservecoin sell price in base asset.
    pub reservecoin_sell_price_bc: Gauge,
    /// Base-asset reserve held by the protocol.
    pub reserve_bc: Gauge,
    /// Circulating supply per coin.
    pub coin_supply: GaugeVec,
    /// Market polls by outcome (ok / error).
    pub polls: IntCounterVec,
    /// Unix time of the last successful poll.
    pub last_poll_timestamp: Gauge,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let reserve_ratio_percent = Gauge::new(
            "djed_reserve_ratio_percent",
            "Protocol reserve ratio in percent",
        )?;
        let stablecoin_price_bc = Gauge::new(
            "djed_stablecoin_price_bc",
            "Stablecoin target price in base asset",
        )?;
        let reservecoin_buy_price_bc = Gauge::new(
            "djed_reservecoin_buy_price_bc",
            "Reservecoin buy price in base asset",
        )?;
        let reservecoin_sell_price_bc = Gauge::new(
            "djed_reservecoin_sell_price_bc",
            "Reservecoin sell price in base asset",
        )?;
        let reserve_bc = Gauge::new("djed_reserve_bc", "Base-asset reserve of the protocol")?;

        let coin_supply = GaugeVec::new(
            Opts::new("djed_coin_supply", "Circulating supply per coin"),
            &["coin"],
        )?;

        let polls = IntCounterVec::new(
            Opts::new("djed_polls_total", "Market polls by outcome"),
            &["outcome"],
        )?;

        let last_poll_timestamp = Gauge::new(
            "djed_last_poll_timestamp_seconds",
            "Unix time of the last successful market poll",
        )?;

        registry.register(Box::new(reserve_ratio_percent.clone()))?;
        registry.register(Box::new(stablecoin_price_bc.clone()))?;
        registry.register(Box::new(reservecoin_buy_price_bc.clone()))?;
        registry.register(Box::new(reservecoin_sell_price_bc.clone()))?;
        registry.register(Box::new(reserve_bc.clone()))?;
        registry.register(Box::new(coin_supply.clone()))?;
        registry.register(Box::new(polls.clone()))?;
        registry.register(Box::new(last_poll_timestamp.clone()))?;

        Ok(Self {
            registry,
            reserve_ratio_percent,
            stablecoin_price_bc,
            reservecoin_buy_price_bc,
            reservecoin_sell_price_bc,
            reserve_bc,
            coin_supply,
            polls,
            last_poll_timestamp,
        })
    }

    /// Update every gauge from a fresh coin details read.
    pub fn record_coin_details(&self, details: &CoinDetails) {
        set_from_decimal(
            &self.reserve_ratio_percent,
            details.percent_reserve_ratio.trim_end_matches('%'),
        );
        set_from_decimal(&self.stablecoin_price_bc, &details.scaled_price_sc);
        set_from_decimal(&self.reservecoin_buy_price_bc, &details.scaled_buy_price_rc);
        set_from_decimal(&self.reservecoin_sell_price_bc, &details.scaled_sell_price_rc);
        set_from_decimal(&self.reserve_bc, &details.scaled_reserve_bc);
        set_from_decimal(
            &self
                .coin_supply
                .with_label_values(&[&CoinKind::StableCoin.to_string()]),
            &details.scaled_number_sc,
        );
        set_from_decimal(
            &self
                .coin_supply
                .with_label_values(&[&CoinKind::ReserveCoin.to_string()]),
            &details.scaled_number_rc,
        );

        #[allow(clippy::cast_precision_loss)]
        self.last_poll_timestamp
            .set(details.fetched_at.timestamp_millis() as f64 / 1000.0);
    }

    /// Count one poll outcome.
    pub fn record_poll(&self, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        self.polls.with_label_values(&[outcome]).inc();
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics_self);
                async move {
                    match metrics.render() {
                        Ok(body) => (StatusCode::OK, body),
                        Err(e) => {
                            warn!(error = %e, "Failed to encode metrics");
                            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
                        }
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

/// Gauges are best effort: an unparsable figure leaves the old value.
fn set_from_decimal(gauge: &Gauge, value: &str) {
    if let Ok(v) = value.parse::<f64>() {
        gauge.set(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;
    use chrono::Utc;

    fn details() -> CoinDetails {
        CoinDetails {
            scaled_number_sc: "1000.0".into(),
            unscaled_number_sc: U256::from(1_000_000_000u64),
            scaled_price_sc: "2.5".into(),
            scaled_number_rc: "40.0".into(),
            scaled_reserve_bc: "7500.25".into(),
            percent_reserve_ratio: "300.1234%".into(),
            scaled_buy_price_rc: "3.0".into(),
            scaled_sell_price_rc: "2.75".into(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_coin_details_sets_gauges() {
        let metrics = MetricsRegistry::new().unwrap();
        metrics.record_coin_details(&details());

        assert!((metrics.reserve_ratio_percent.get() - 300.1234).abs() < 1e-9);
        assert!((metrics.reserve_bc.get() - 7500.25).abs() < 1e-9);
        assert!((metrics.reservecoin_sell_price_bc.get() - 2.75).abs() < 1e-9);
        let sc_supply = metrics.coin_supply.with_label_values(&["stablecoin"]).get();
        assert!((sc_supply - 1000.0).abs() < 1e-9);
        assert!(metrics.last_poll_timestamp.get() > 0.0);
    }

    #[test]
    fn test_render_includes_poll_counter() {
        let metrics = MetricsRegistry::new().unwrap();
        metrics.record_poll(true);
        metrics.record_poll(false);
        metrics.record_poll(false);

        let body = metrics.render().unwrap();
        assert!(body.contains("djed_polls_total{outcome=\"ok\"} 1"));
        assert!(body.contains("djed_polls_total{outcome=\"error\"} 2"));
    }
}
