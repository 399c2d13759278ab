//! Error kinds surfaced by pool derivation and price conversion.
//!
//! Every variant is terminal for the call that produced it. Variants carry the
//! offending input and, where one is known, the chain it was evaluated on.

use thiserror::Error;

use crate::chain::Chain;

/// Boxed error produced by an RPC collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by the registry, ordering, derivation and price modules.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The chain is unknown or has no registry entry.
    #[error("unsupported chain: {chain}")]
    UnsupportedChain { chain: String },

    /// The chain has no RPC endpoint or interface descriptor configured.
    #[error("chain {chain} has no {what} configured")]
    MissingRpcConfig { chain: Chain, what: &'static str },

    /// Malformed token address, or a pair that repeats the same token.
    #[error("invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },

    /// Fee value outside {100, 500, 3000, 10000}.
    #[error("invalid fee tier {0}: expected one of 100, 500, 3000, 10000")]
    InvalidFeeTier(String),

    /// Decimal precision outside the ERC-20 `uint8` range.
    #[error("invalid decimals: token0={decimals0}, token1={decimals1}")]
    InvalidDecimals { decimals0: i32, decimals1: i32 },

    /// The named interface descriptor could not be resolved.
    #[error("interface descriptor {name:?} not found: {reason}")]
    DescriptorNotFound { name: String, reason: String },

    /// The RPC collaborator failed or returned an undecodable result.
    #[error("rpc call {method} on {chain} failed")]
    RpcFailure {
        chain: Chain,
        method: String,
        #[source]
        source: BoxError,
    },
}

impl PoolError {
    pub(crate) fn invalid_address(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Wraps a collaborator failure for `method` on `chain`.
    pub fn rpc(chain: Chain, method: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::RpcFailure {
            chain,
            method: method.into(),
            source: source.into(),
        }
    }
}

/// Result alias used throughout the workspace.
pub type Result<T, E = PoolError> = std::result::Result<T, E>;
