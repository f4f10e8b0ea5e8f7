//! Typed contract reads over the `ChainReader` port.
//!
//! Encodes a generated `*Call` struct, performs the raw call and
//! decodes the single return value. Failures carry the Solidity
//! signature of the method that failed.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::{sol_data, SolCall, SolType, SolValue};

use crate::error::{DjedError, Result};
use crate::ports::chain::ChainReader;

async fn raw_call<R, C>(reader: &R, to: Address, call: &C) -> Result<Bytes>
where
  R: ChainReader + ?Sized,
  C: SolCall,
{
  reader
    .call(to, Bytes::from(call.abi_encode()))
    .await
    .map_err(|e| e.with_method(C::SIGNATURE))
}

fn decode_error<C: SolCall>(e: &alloy::sol_types::Error) -> DjedError {
  DjedError::Decode {
    method: C::SIGNATURE.to_string(),
    reason: e.to_string(),
  }
}

/// Read a `uint256` return value.
pub async fn read_u256<R, C>(reader: &R, to: Address, call: C) -> Result<U256>
where
  R: ChainReader + ?Sized,
  C: SolCall,
{
  let data = raw_call(reader, to, &call).await?;
  U256::abi_decode(&data, true).map_err(|e| decode_error::<C>(&e))
}

/// Read an `address` return value.
pub async fn read_address<R, C>(reader: &R, to: Address, call: C) -> Result<Address>
where
  R: ChainReader + ?Sized,
  C: SolCall,
{
  let data = raw_call(reader, to, &call).await?;
  Address::abi_decode(&data, true).map_err(|e| decode_error::<C>(&e))
}

/// Read a `uint8` return value.
pub async fn read_u8<R, C>(reader: &R, to: Address, call: C) -> Result<u8>
where
  R: ChainReader + ?Sized,
  C: SolCall,
{
  let data = raw_call(reader, to, &call).await?;
  <sol_data::Uint<8> as SolType>::abi_decode(&data, true).map_err(|e| decode_error::<C>(&e))
}

/// Read a `bool` return value.
pub async fn read_bool<R, C>(reader: &R, to: Address, call: C) -> Result<bool>
where
  R: ChainReader + ?Sized,
  C: SolCall,
{
  let data = raw_call(reader, to, &call).await?;
  bool::abi_decode(&data, true).map_err(|e| decode_error::<C>(&e))
}
