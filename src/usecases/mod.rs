//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the client's workflows. Each use case is a self-contained
//! business operation.
//!
//! Use cases:
//! - `ContractRegistry`: Resolve coin contracts and decimals
//! - `MarketReader`: Coin details, system params, account balances
//! - `TradeQuoter`: Prices, eligibility and maximum amounts
//! - `TxBuilder` / `TxSubmitter` / `TradeExecutor`: Transaction lifecycle
//! - `MarketMonitor`: Periodic market polling
//! - `DjedClient`: One resolved deployment tying the above together

pub mod calls;
pub mod client;
pub mod market;
pub mod monitor;
pub mod quoter;
pub mod registry;
pub mod transactions;

pub use client::DjedClient;
pub use market::MarketReader;
pub use monitor::{MarketMonitor, PollEvent};
pub use quoter::TradeQuoter;
pub use registry::ContractRegistry;
pub use transactions::{plan_trade, TradeExecutor, TxBuilder, TxSubmitter};
