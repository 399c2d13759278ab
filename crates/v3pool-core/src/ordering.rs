//! Canonical token ordering.
//!
//! Uniswap V3 pools store their pair as `(token0, token1)` with
//! `token0 < token1` as unsigned 160-bit integers. Addresses are big-endian
//! byte arrays, so byte-wise ordering of [`Address`] is exactly that numeric
//! ordering, independent of how the hex input was cased.

use alloy::primitives::Address;
use v3pool_data::token::parse_address;
use v3pool_data::{PoolError, Result, Token};

/// Parses two hex addresses and returns them as `(low, high)`.
///
/// # Errors
/// [`PoolError::InvalidAddress`] if either input is malformed or both name
/// the same token.
pub fn order_tokens(address_a: &str, address_b: &str) -> Result<(Address, Address)> {
    let a = parse_address(address_a)?;
    let b = parse_address(address_b)?;
    sort_addresses(a, b)
}

/// Orders two parsed addresses as `(low, high)`.
///
/// # Errors
/// [`PoolError::InvalidAddress`] if `a == b`.
pub fn sort_addresses(a: Address, b: Address) -> Result<(Address, Address)> {
    if a == b {
        return Err(PoolError::InvalidAddress {
            input: format!("{a:#x}"),
            reason: "a pool cannot pair a token with itself".to_string(),
        });
    }

    Ok(if a < b { (a, b) } else { (b, a) })
}

/// Orders two tokens by address, carrying their decimals and symbols along.
///
/// # Errors
/// [`PoolError::InvalidAddress`] if both tokens share an address.
pub fn sort_tokens(a: Token, b: Token) -> Result<(Token, Token)> {
    let (low, _) = sort_addresses(a.address, b.address)?;
    Ok(if low == a.address { (a, b) } else { (b, a) })
}
