//! Decoding of a pool's `slot0()` result.
//!
//! The RPC collaborator returns the decoded ABI outputs as [`DynSolValue`]s:
//! `(uint160 sqrtPriceX96, int24 tick, uint16, uint16, uint16, uintN
//! feeProtocol, bool unlocked)`. `feeProtocol` is `uint8` on Uniswap
//! deployments and `uint32` on the BSC deployment, so it is widened to `u32`.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::U256;
use eyre::{eyre, Result};

/// Decoded `slot0` struct.
///
/// Only `sqrt_price_x96` is needed for the price; the remaining fields are
/// kept for display and cross-checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot0Data {
    /// Current √P in Q64.96 fixed-point format (uint160 on-chain).
    pub sqrt_price_x96: U256,
    /// Current tick index (int24 on-chain).
    pub tick: i32,
    /// Index of the most recently written oracle observation.
    pub observation_index: u16,
    /// Current oracle array capacity.
    pub observation_cardinality: u16,
    /// Pending oracle array capacity.
    pub observation_cardinality_next: u16,
    /// Protocol fee configuration.
    pub fee_protocol: u32,
    /// Reentrancy guard (true = unlocked).
    pub unlocked: bool,
}

impl Slot0Data {
    /// Builds a `Slot0Data` from decoded `slot0()` outputs.
    ///
    /// # Errors
    /// Returns an error if fewer than seven outputs are present or a value has
    /// an unexpected ABI type.
    pub fn from_outputs(outputs: &[DynSolValue]) -> Result<Self> {
        if outputs.len() < 7 {
            return Err(eyre!(
                "slot0() returned {} values, expected 7",
                outputs.len()
            ));
        }

        let tick = match &outputs[1] {
            DynSolValue::Int(value, _) => sign_extend_int256_to_i32(value.into_raw()),
            other => return Err(eyre!("slot0 tick: expected int24, got {other:?}")),
        };

        let unlocked = outputs[6]
            .as_bool()
            .ok_or_else(|| eyre!("slot0 unlocked: expected bool, got {:?}", outputs[6]))?;

        Ok(Self {
            sqrt_price_x96: uint_output(&outputs[0], "sqrtPriceX96")?,
            tick,
            observation_index: uint_output(&outputs[2], "observationIndex")?.saturating_to(),
            observation_cardinality: uint_output(&outputs[3], "observationCardinality")?
                .saturating_to(),
            observation_cardinality_next: uint_output(&outputs[4], "observationCardinalityNext")?
                .saturating_to(),
            fee_protocol: uint_output(&outputs[5], "feeProtocol")?.saturating_to(),
            unlocked,
        })
    }
}

fn uint_output(value: &DynSolValue, field: &str) -> Result<U256> {
    value
        .as_uint()
        .map(|(v, _)| v)
        .ok_or_else(|| eyre!("slot0 {field}: expected uint, got {value:?}"))
}

/// Interprets a two's-complement `int256` word as `i32`.
///
/// ABI-encoded `int24` values are sign-extended to 256 bits, so the lowest 32
/// bits already hold the two's-complement `i32`.
fn sign_extend_int256_to_i32(val: U256) -> i32 {
    let low_32 = (val & U256::from(u32::MAX)).to::<u32>();
    low_32 as i32
}
