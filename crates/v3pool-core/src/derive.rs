//! Deterministic pool address derivation (CREATE2).
//!
//! The factory deploys each pool with `CREATE2`, salting the deployment with
//! the pool's identifying parameters:
//!
//! ```text
//! salt    = keccak256(abi.encode(token0, token1, uint24 fee))
//! address = keccak256(0xff ++ factory ++ salt ++ init_code_hash)[12..]
//! ```
//!
//! `abi.encode` is the standard (non-packed) encoding: three 32-byte words,
//! each value left-padded with zeros.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{keccak256, Address, B256, U256};
use v3pool_data::{FeeTier, Result};

use crate::ordering::sort_addresses;

/// Prefix byte of the CREATE2 preimage.
const CREATE2_PREFIX: u8 = 0xff;

/// `(token0, token1, fee)` with `token0 < token1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolKey {
    token0: Address,
    token1: Address,
    fee: FeeTier,
}

impl PoolKey {
    /// Builds a key from two tokens in any order.
    ///
    /// # Errors
    /// [`v3pool_data::PoolError::InvalidAddress`] if both tokens are the same.
    pub fn new(token_a: Address, token_b: Address, fee: FeeTier) -> Result<Self> {
        let (token0, token1) = sort_addresses(token_a, token_b)?;
        Ok(Self {
            token0,
            token1,
            fee,
        })
    }

    pub fn token0(&self) -> Address {
        self.token0
    }

    pub fn token1(&self) -> Address {
        self.token1
    }

    pub fn fee(&self) -> FeeTier {
        self.fee
    }

    /// `(address, address, uint24)` argument list, as passed to `getPool`.
    pub fn abi_values(&self) -> Vec<DynSolValue> {
        vec![
            DynSolValue::Address(self.token0),
            DynSolValue::Address(self.token1),
            DynSolValue::Uint(U256::from(self.fee.value()), 24),
        ]
    }

    /// Standard ABI encoding of the key (96 bytes).
    pub fn abi_encode(&self) -> Vec<u8> {
        DynSolValue::Tuple(self.abi_values()).abi_encode_params()
    }
}

/// CREATE2 salt for a pool.
pub fn compute_pool_salt(key: &PoolKey) -> B256 {
    keccak256(key.abi_encode())
}

/// CREATE2 address of the pool identified by `key`.
///
/// Pure function of its inputs; no network access.
pub fn compute_pool_address(factory: Address, init_code_hash: B256, key: &PoolKey) -> Address {
    let salt = compute_pool_salt(key);

    let mut preimage = [0u8; 85];
    preimage[0] = CREATE2_PREFIX;
    preimage[1..21].copy_from_slice(factory.as_slice());
    preimage[21..53].copy_from_slice(salt.as_slice());
    preimage[53..85].copy_from_slice(init_code_hash.as_slice());

    let hash = keccak256(preimage);
    Address::from_slice(&hash[12..])
}
