//! v3pool-data crate
//!
//! Static data model for Uniswap V3 style pools: supported chains, tokens,
//! fee tiers, the per-chain factory registry and contract interface
//! descriptors.

pub mod chain;
pub mod descriptors;
pub mod error;
pub mod fee;
pub mod registry;
pub mod token;

pub use chain::Chain;
pub use descriptors::{DescriptorSource, DirectoryDescriptors, EmbeddedDescriptors};
pub use error::{PoolError, Result};
pub use fee::FeeTier;
pub use registry::{ChainConfig, ChainRegistry, Derivation};
pub use token::{parse_address, Token};
