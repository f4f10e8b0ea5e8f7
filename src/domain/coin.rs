//! Djed view models.
//!
//! Read-only snapshots of on-chain state. Nothing here is persisted;
//! every value is re-derived from the chain on each read. Scaled
//! values are decimal strings, unscaled values are raw `U256`s, so no
//! precision is lost on the way to the caller. Unscaled values
//! serialize as base-10 integer strings, not hex quantities.

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Which of the two protocol tokens a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CoinKind {
    StableCoin,
    ReserveCoin,
}

impl std::fmt::Display for CoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StableCoin => write!(f, "stablecoin"),
            Self::ReserveCoin => write!(f, "reservecoin"),
        }
    }
}

/// A protocol token contract and its decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coin {
    pub kind: CoinKind,
    pub address: Address,
    pub decimals: u8,
}

/// Resolved contract set for one Djed deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DjedContracts {
    /// Protocol contract (fixed address from config).
    pub djed: Address,
    /// Price oracle contract (fixed address from config).
    pub oracle: Address,
    pub stable_coin: Coin,
    pub reserve_coin: Coin,
}

impl DjedContracts {
    pub const fn coin(&self, kind: CoinKind) -> &Coin {
        match kind {
            CoinKind::StableCoin => &self.stable_coin,
            CoinKind::ReserveCoin => &self.reserve_coin,
        }
    }
}

/// Market figures read from the protocol and both coins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoinDetails {
    pub scaled_number_sc: String,
    #[serde(serialize_with = "serialize_base10")]
    pub unscaled_number_sc: U256,
    pub scaled_price_sc: String,
    pub scaled_number_rc: String,
    pub scaled_reserve_bc: String,
    /// Reserve ratio as a percentage, e.g. `"450.0000%"`.
    pub percent_reserve_ratio: String,
    pub scaled_buy_price_rc: String,
    pub scaled_sell_price_rc: String,
    pub fetched_at: DateTime<Utc>,
}

/// Protocol thresholds. Ratios and fee use the protocol scaling precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemParams {
    pub reserve_ratio_min: String,
    pub reserve_ratio_max: String,
    pub fee: String,
    /// Stablecoin supply below which reservecoin buys are unlimited (unscaled).
    #[serde(serialize_with = "serialize_base10")]
    pub threshold_number_sc: U256,
}

/// Balances of the connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountDetails {
    pub account: Address,
    pub scaled_balance_sc: String,
    #[serde(serialize_with = "serialize_base10")]
    pub unscaled_balance_sc: U256,
    pub scaled_balance_rc: String,
    #[serde(serialize_with = "serialize_base10")]
    pub unscaled_balance_rc: U256,
    /// Native base-asset balance.
    pub scaled_balance_bc: String,
}

/// Price quote for a prospective trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeQuote {
    pub kind: TradeKind,
    pub amount_scaled: String,
    #[serde(serialize_with = "serialize_base10")]
    pub amount_unscaled: U256,
    /// Total cost (buys) or proceeds (sells) in the base asset.
    pub total_scaled: String,
    #[serde(serialize_with = "serialize_base10")]
    pub total_unscaled: U256,
}

/// The four trades the protocol supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TradeKind {
    BuyStableCoin,
    SellStableCoin,
    BuyReserveCoin,
    SellReserveCoin,
}

impl TradeKind {
    pub const ALL: [Self; 4] = [
        Self::BuyStableCoin,
        Self::SellStableCoin,
        Self::BuyReserveCoin,
        Self::SellReserveCoin,
    ];

    pub const fn coin(self) -> CoinKind {
        match self {
            Self::BuyStableCoin | Self::SellStableCoin => CoinKind::StableCoin,
            Self::BuyReserveCoin | Self::SellReserveCoin => CoinKind::ReserveCoin,
        }
    }

    pub const fn is_buy(self) -> bool {
        matches!(self, Self::BuyStableCoin | Self::BuyReserveCoin)
    }
}

impl std::fmt::Display for TradeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let side = if self.is_buy() { "buy" } else { "sell" };
        write!(f, "{side} {}", self.coin())
    }
}

/// Upper bound on a trade amount.
///
/// `Unlimited` is the protocol's "no limit" case and serializes to the
/// empty string, which is what front ends expect as the sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaxAmount {
    Unlimited,
    Limited(String),
}

impl MaxAmount {
    /// Sentinel form: `""` for unlimited, the scaled amount otherwise.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unlimited => "",
            Self::Limited(scaled) => scaled,
        }
    }
}

impl std::fmt::Display for MaxAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlimited => write!(f, "unlimited"),
            Self::Limited(scaled) => write!(f, "{scaled}"),
        }
    }
}

impl Serialize for MaxAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Raw integers go out as base-10 strings, matching the scaled figures
/// next to them.
fn serialize_base10<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_kind_routing() {
        assert_eq!(TradeKind::BuyReserveCoin.coin(), CoinKind::ReserveCoin);
        assert_eq!(TradeKind::SellStableCoin.coin(), CoinKind::StableCoin);
        assert!(TradeKind::BuyStableCoin.is_buy());
        assert!(!TradeKind::SellReserveCoin.is_buy());
        assert_eq!(TradeKind::SellReserveCoin.to_string(), "sell reservecoin");
    }

    #[test]
    fn test_max_amount_sentinel() {
        assert_eq!(MaxAmount::Unlimited.as_str(), "");
        assert_eq!(serde_json::to_string(&MaxAmount::Unlimited).unwrap(), "\"\"");
        assert_eq!(
            serde_json::to_string(&MaxAmount::Limited("12.5".into())).unwrap(),
            "\"12.5\""
        );
        assert_eq!(MaxAmount::Unlimited.to_string(), "unlimited");
    }

    #[test]
    fn test_unscaled_values_serialize_as_base10() {
        let quote = TradeQuote {
            kind: TradeKind::BuyReserveCoin,
            amount_scaled: "2.0".into(),
            amount_unscaled: U256::from(2_000_000u64),
            total_scaled: "2.0".into(),
            total_unscaled: U256::from(2_000_000_000_000_000_000u128),
        };
        let json = serde_json::to_string(&quote).unwrap();
        assert!(json.contains("\"amount_unscaled\":\"2000000\""), "{json}");
        assert!(json.contains("\"total_unscaled\":\"2000000000000000000\""), "{json}");

        let params = SystemParams {
            reserve_ratio_min: "4.0".into(),
            reserve_ratio_max: "8.0".into(),
            fee: "0.015".into(),
            threshold_number_sc: U256::from(255u64),
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["threshold_number_sc"], "255");
    }
}
