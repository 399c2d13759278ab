//! Exact price conversion from Uniswap V3 `sqrtPriceX96`.
//!
//! ## Math
//!
//! `sqrtPriceX96` encodes $\sqrt{P} \times 2^{96}$ where $P = \frac{token1}{token0}$
//! in raw units. The human-readable price of token0 in units of token1 is
//!
//! $$P = \frac{sqrtPriceX96^2}{2^{192}} \times 10^{decimals_0 - decimals_1}$$
//!
//! The exponent is used with its sign: when token1 has more decimals the
//! factor is a division.
//!
//! ## Precision
//!
//! `sqrtPriceX96` is `uint160`, so its square needs up to 320 bits. The whole
//! computation runs on arbitrary-precision rationals, so nothing is shifted
//! away or rounded until the value is rendered. `f64` appears only in
//! [`PriceResult::to_f64`].

use alloy::primitives::U256;
use num_bigint::{BigInt, Sign};
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use std::fmt;
use v3pool_data::{PoolError, Result};

/// Fractional digits kept in [`PriceResult::display`].
pub const DISPLAY_PRECISION: u32 = 18;

/// Largest decimals value accepted. ERC-20 `decimals()` is a `uint8`.
pub const MAX_DECIMALS: i32 = u8::MAX as i32;

/// Exact price plus a rendered decimal string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceResult {
    /// Exact price of one token0 in token1, decimals applied.
    pub price: BigRational,
    /// Decimal rendering truncated to [`DISPLAY_PRECISION`] digits.
    pub display: String,
}

impl PriceResult {
    fn new(price: BigRational) -> Self {
        let display = format_price_display(&price, DISPLAY_PRECISION);
        Self { price, display }
    }

    /// Nearest `f64`, `None` if the conversion fails.
    pub fn to_f64(&self) -> Option<f64> {
        self.price.to_f64()
    }

    pub fn is_zero(&self) -> bool {
        self.price.is_zero()
    }

    /// Price of token1 in token0. `None` for a zero price.
    pub fn inverse(&self) -> Option<Self> {
        if self.price.is_zero() {
            return None;
        }
        Some(Self::new(self.price.recip()))
    }
}

impl fmt::Display for PriceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// Converts `sqrtPriceX96` into the decimal price of token0 in token1.
///
/// ## Parameters
///
/// - `sqrt_price_x96`: the raw Q64.96 value from `slot0`.
/// - `decimals0` / `decimals1`: decimals of the pool's token0 and token1.
///
/// # Errors
/// [`PoolError::InvalidDecimals`] if either decimals value is negative or
/// above [`MAX_DECIMALS`].
pub fn convert_slot0_to_price(
    sqrt_price_x96: U256,
    decimals0: i32,
    decimals1: i32,
) -> Result<PriceResult> {
    let valid = 0..=MAX_DECIMALS;
    if !valid.contains(&decimals0) || !valid.contains(&decimals1) {
        return Err(PoolError::InvalidDecimals {
            decimals0,
            decimals1,
        });
    }

    let sqrt = u256_to_bigint(sqrt_price_x96);
    let raw = BigRational::new(&sqrt * &sqrt, BigInt::from(1u8) << 192u32);

    let exponent = decimals0 - decimals1;
    let scale = BigRational::from_integer(BigInt::from(10u8).pow(exponent.unsigned_abs()));
    let price = if exponent >= 0 { raw * scale } else { raw / scale };

    Ok(PriceResult::new(price))
}

fn u256_to_bigint(value: U256) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>())
}

/// Renders a non-negative rational with `precision` fractional digits,
/// truncating. Trailing zeros are trimmed but at least two digits are kept.
fn format_price_display(price: &BigRational, precision: u32) -> String {
    let divisor = BigInt::from(10u8).pow(precision);
    let scaled = (price * BigRational::from_integer(divisor.clone())).floor().to_integer();
    let integer_part = &scaled / &divisor;
    let fractional_part = &scaled % &divisor;

    let int_str = integer_part.to_string();
    let frac_str = format!("{:0>width$}", fractional_part.to_string(), width = precision as usize);

    let trimmed = frac_str.trim_end_matches('0');
    let frac_display = if trimmed.len() < 2 { &frac_str[..2] } else { trimmed };

    format!("{int_str}.{frac_display}")
}
