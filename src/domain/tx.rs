//! Unsigned transaction payload handed to the wallet.

use alloy::primitives::{Address, Bytes, U256};
use serde::Serialize;

/// Payload for `eth_sendTransaction`.
///
/// Serializes to the JSON-RPC shape wallets expect: hex addresses,
/// hex quantity `value`, hex `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsignedTx {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

impl UnsignedTx {
    pub fn new(from: Address, to: Address, value: U256, data: impl Into<Bytes>) -> Self {
        Self {
            from,
            to,
            value,
            data: data.into(),
        }
    }
}
