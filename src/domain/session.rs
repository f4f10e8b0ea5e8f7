//! Wallet connection status and the transaction lifecycle.
//!
//! Replaces ambient "is the wallet connected" flags and per-modal
//! visibility callbacks with plain values: a [`WalletStatus`] derived
//! from the wallet's account list, and a [`TxPhase`] machine driven by
//! [`TxEvent`]s from the submitter.

use alloy::primitives::{Address, TxHash};
use serde::Serialize;

/// Connection state of the user's wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WalletStatus {
    Disconnected,
    Connected { account: Address },
}

impl WalletStatus {
    /// The first account the wallet exposes is the active one.
    pub fn from_accounts(accounts: &[Address]) -> Self {
        accounts
            .first()
            .map_or(Self::Disconnected, |&account| Self::Connected { account })
    }

    pub const fn account(&self) -> Option<Address> {
        match self {
            Self::Disconnected => None,
            Self::Connected { account } => Some(*account),
        }
    }

    /// Button label for the connect widget.
    pub fn label(&self) -> String {
        match self {
            Self::Disconnected => "Connect your wallet".to_string(),
            Self::Connected { account } => truncate_address(account),
        }
    }
}

/// Shorten an address to `0x1234...abcd` for display.
pub fn truncate_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Lifecycle events reported while a transaction is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxEvent {
    /// The wallet accepted the transaction and returned its hash.
    Submitted(TxHash),
    /// The receipt was fetched; `true` means the transaction succeeded.
    Confirmed(bool),
    /// Signing, broadcast or confirmation failed.
    Failed(String),
    /// The user dismissed the result.
    Reset,
}

/// What the transaction modal shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TxPhase {
    Idle,
    Pending { hash: TxHash },
    Success { hash: TxHash },
    Failure { hash: Option<TxHash>, reason: String },
}

impl TxPhase {
    /// Apply an event. Events that make no sense in the current phase
    /// leave it unchanged.
    #[must_use]
    pub fn apply(self, event: TxEvent) -> Self {
        match (self, event) {
            (Self::Idle, TxEvent::Submitted(hash)) => Self::Pending { hash },
            (Self::Pending { hash }, TxEvent::Confirmed(true)) => Self::Success { hash },
            (Self::Pending { hash }, TxEvent::Confirmed(false)) => Self::Failure {
                hash: Some(hash),
                reason: "transaction reverted".to_string(),
            },
            (Self::Idle, TxEvent::Failed(reason)) => Self::Failure { hash: None, reason },
            (Self::Pending { hash }, TxEvent::Failed(reason)) => Self::Failure {
                hash: Some(hash),
                reason,
            },
            (Self::Success { .. } | Self::Failure { .. }, TxEvent::Reset) => Self::Idle,
            (phase, _) => phase,
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Failure { .. })
    }

    /// Modal heading for this phase.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Pending { .. } => "Pending for confirmation",
            Self::Success { .. } => "Successful transaction!",
            Self::Failure { .. } => "Failed transaction!",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const ACCOUNT: Address = address!("52527fF4a1d99a35B75d821e90F23512D9327fdf");

    #[test]
    fn test_wallet_status_from_accounts() {
        assert_eq!(WalletStatus::from_accounts(&[]), WalletStatus::Disconnected);
        let status = WalletStatus::from_accounts(&[ACCOUNT, Address::ZERO]);
        assert_eq!(status.account(), Some(ACCOUNT));
        assert_eq!(status.label().to_lowercase(), "0x5252...7fdf");
        assert_eq!(WalletStatus::Disconnected.label(), "Connect your wallet");
    }

    #[test]
    fn test_happy_path() {
        let hash = TxHash::repeat_byte(0xab);
        let phase = TxPhase::Idle.apply(TxEvent::Submitted(hash));
        assert_eq!(phase, TxPhase::Pending { hash });
        let phase = phase.apply(TxEvent::Confirmed(true));
        assert_eq!(phase, TxPhase::Success { hash });
        assert!(phase.is_terminal());
        assert_eq!(phase.apply(TxEvent::Reset), TxPhase::Idle);
    }

    #[test]
    fn test_reverted_and_rejected() {
        let hash = TxHash::repeat_byte(0x01);
        let reverted = TxPhase::Pending { hash }.apply(TxEvent::Confirmed(false));
        assert!(matches!(reverted, TxPhase::Failure { hash: Some(h), .. } if h == hash));

        let rejected = TxPhase::Idle.apply(TxEvent::Failed("user rejected".into()));
        assert_eq!(
            rejected,
            TxPhase::Failure {
                hash: None,
                reason: "user rejected".into()
            }
        );
        assert_eq!(rejected.title(), "Failed transaction!");
    }

    #[test]
    fn test_out_of_order_events_are_ignored() {
        let hash = TxHash::repeat_byte(0x02);
        assert_eq!(TxPhase::Idle.apply(TxEvent::Confirmed(true)), TxPhase::Idle);
        assert_eq!(TxPhase::Idle.apply(TxEvent::Reset), TxPhase::Idle);
        let pending = TxPhase::Pending { hash };
        assert_eq!(pending.clone().apply(TxEvent::Reset), pending);
        let done = TxPhase::Success { hash };
        assert_eq!(done.clone().apply(TxEvent::Submitted(hash)), done);
    }
}
