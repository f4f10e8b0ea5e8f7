//! Domain layer - Djed view models, scaling and transaction lifecycle.
//!
//! Pure values and conversions; no I/O happens here. The contract
//! ABI lives here too because both the use cases and the tests encode
//! calls against it.

pub mod abi;
pub mod coin;
pub mod scaling;
pub mod session;
pub mod tx;

pub use coin::{
    AccountDetails, Coin, CoinDetails, CoinKind, DjedContracts, MaxAmount, SystemParams,
    TradeKind, TradeQuote,
};
pub use session::{TxEvent, TxPhase, WalletStatus};
pub use tx::UnsignedTx;
