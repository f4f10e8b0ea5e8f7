//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the use cases require from
//! the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `ChainReader`: read calls, balances and receipts from the node
//! - `WalletGateway`: connected accounts and transaction submission

pub mod chain;
pub mod wallet;

pub use chain::ChainReader;
pub use wallet::WalletGateway;
