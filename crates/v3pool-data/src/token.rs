//! ERC-20 token value object and address parsing.

use alloy::primitives::Address;
use std::fmt;
use std::str::FromStr;

use crate::error::{PoolError, Result};

/// Decimals assumed when a token is created from its address alone.
pub const DEFAULT_DECIMALS: u8 = 18;

/// An ERC-20 token as seen by the pool math.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    /// Token contract address.
    pub address: Address,
    /// Number of decimals in the token's base unit.
    pub decimals: u8,
    /// Optional display label (e.g. "WETH").
    pub symbol: Option<String>,
}

impl Token {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            decimals: DEFAULT_DECIMALS,
            symbol: None,
        }
    }

    #[must_use]
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Symbol if known, otherwise the lowercase hex address.
    pub fn label(&self) -> String {
        self.symbol
            .clone()
            .unwrap_or_else(|| format!("{:#x}", self.address))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for Token {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self> {
        parse_address(s).map(Token::new)
    }
}

/// Parses a `0x`-prefixed, 40-digit hex address.
///
/// Hex case is ignored: mixed-case input is accepted whether or not it is a
/// valid EIP-55 checksum.
pub fn parse_address(input: &str) -> Result<Address> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| PoolError::invalid_address(input, "missing 0x prefix"))?;

    if digits.len() != 40 {
        return Err(PoolError::invalid_address(
            input,
            format!("expected 40 hex digits, got {}", digits.len()),
        ));
    }

    Address::from_str(digits).map_err(|e| PoolError::invalid_address(input, e.to_string()))
}
