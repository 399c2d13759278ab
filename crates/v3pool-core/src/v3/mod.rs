//! Uniswap V3 pool state.
//!
//! V3 stores price directly as `sqrtPriceX96` (a Q64.96 fixed-point √P) in
//! the pool's packed `slot0`. A single `slot0()` call gives the current price;
//! no reserve math is needed.

pub mod price;
pub mod slot0;

pub use price::{convert_slot0_to_price, PriceResult, MAX_DECIMALS};
pub use slot0::Slot0Data;
