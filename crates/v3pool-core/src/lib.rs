//! v3pool-core: Uniswap V3 pool address derivation and price conversion.
//!
//! Orders token pairs canonically, computes CREATE2 pool addresses from the
//! chain registry (or asks the factory over RPC where the registry says so),
//! and converts a pool's `sqrtPriceX96` into a decimal price.

pub mod derive;
pub mod locator;
pub mod ordering;
pub mod rpc;
pub mod v3;

pub use derive::{compute_pool_address, compute_pool_salt, PoolKey};
pub use locator::{PoolLocator, PoolQuote};
pub use ordering::{order_tokens, sort_addresses, sort_tokens};
pub use rpc::{ContractCaller, HttpContractCaller, DEFAULT_RPC_TIMEOUT};
pub use v3::{convert_slot0_to_price, PriceResult, Slot0Data};
