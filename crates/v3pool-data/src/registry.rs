//! Per-chain factory configuration.
//!
//! The registry is an immutable value built once at startup from the literal
//! tables below (optionally with RPC endpoint overrides from the environment)
//! and then shared by reference. Nothing in it changes after construction.
//!
//! ## Derivation modes
//!
//! Each chain selects exactly one [`Derivation`]:
//!
//! - [`Derivation::Create2`]: the pool address is computed locally from the
//!   factory address and the pool init-code hash.
//! - [`Derivation::FactoryLookup`]: the deployed factory does not guarantee the
//!   canonical init-code hash, so the address is read from `getPool` over RPC.

use alloy::primitives::{address, b256, Address, B256};
use std::collections::HashMap;

use crate::chain::Chain;
use crate::error::{PoolError, Result};

/// Uniswap V3 factory, deployed at the same address on every supported L2.
pub const UNISWAP_V3_FACTORY: Address = address!("1F98431c8aD98523631AE4a59f267346ea31F984");

/// `keccak256(UniswapV3Pool.creationCode)`.
pub const UNISWAP_V3_POOL_INIT_CODE_HASH: B256 =
    b256!("e34f199b19b2b4f47f68442619d555527d244f78a3297ea89325f843f87b8b54");

/// V3 factory deployed on BNB Smart Chain.
pub const BSC_V3_FACTORY: Address = address!("0bfbcf9fa4f9c56b0f40a671ad40e0805a091865");

/// Descriptor for the standard Uniswap V3 pool interface.
pub const POOL_DESCRIPTOR: &str = "pool.abi.json";

/// Descriptor for the BSC pool interface (`feeProtocol` is `uint32` there).
pub const BSC_POOL_DESCRIPTOR: &str = "bsc.pool.abi.json";

/// Descriptor for the factory interface (`getPool`).
pub const FACTORY_DESCRIPTOR: &str = "factory.abi.json";

/// Prefix of the per-chain RPC override variables, e.g. `V3POOL_RPC_URL_BSC`.
pub const RPC_URL_ENV_PREFIX: &str = "V3POOL_RPC_URL_";

/// How pool addresses are obtained on a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// Compute locally with the CREATE2 formula.
    Create2 { init_code_hash: B256 },
    /// Ask the factory contract via `getPool`.
    FactoryLookup,
}

/// Static configuration for one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Pool factory (the CREATE2 deployer).
    pub factory_address: Address,
    /// Address derivation strategy.
    pub derivation: Derivation,
    /// JSON-RPC endpoint, if any.
    pub rpc_endpoint: Option<String>,
    /// Name of the pool interface descriptor.
    pub pool_abi_descriptor: Option<String>,
    /// Name of the factory interface descriptor.
    pub factory_abi_descriptor: Option<String>,
}

impl ChainConfig {
    /// Deterministic chain using the canonical Uniswap V3 deployment.
    pub fn uniswap_v3() -> Self {
        Self {
            factory_address: UNISWAP_V3_FACTORY,
            derivation: Derivation::Create2 {
                init_code_hash: UNISWAP_V3_POOL_INIT_CODE_HASH,
            },
            rpc_endpoint: None,
            pool_abi_descriptor: Some(POOL_DESCRIPTOR.to_string()),
            factory_abi_descriptor: Some(FACTORY_DESCRIPTOR.to_string()),
        }
    }

    #[must_use]
    pub fn with_rpc_endpoint(mut self, url: impl Into<String>) -> Self {
        self.rpc_endpoint = Some(url.into());
        self
    }

    /// Init-code hash for CREATE2 chains, `None` for factory-lookup chains.
    pub fn init_code_hash(&self) -> Option<B256> {
        match self.derivation {
            Derivation::Create2 { init_code_hash } => Some(init_code_hash),
            Derivation::FactoryLookup => None,
        }
    }

    pub fn uses_factory_lookup(&self) -> bool {
        matches!(self.derivation, Derivation::FactoryLookup)
    }
}

/// Immutable map from [`Chain`] to [`ChainConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRegistry {
    entries: HashMap<Chain, ChainConfig>,
}

impl ChainRegistry {
    /// Builds a registry from explicit entries. Later duplicates win.
    pub fn from_entries(entries: impl IntoIterator<Item = (Chain, ChainConfig)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// The production table: Uniswap V3 on the six L2/sidechain networks,
    /// factory lookup on BSC.
    pub fn uniswap_v3() -> Self {
        let deterministic = [
            Chain::Optimism,
            Chain::OptimisticKovan,
            Chain::ArbitrumOne,
            Chain::ArbitrumRinkeby,
            Chain::PolygonMumbai,
            Chain::Polygon,
        ]
        .into_iter()
        .map(|chain| (chain, ChainConfig::uniswap_v3()));

        let bsc = ChainConfig {
            factory_address: BSC_V3_FACTORY,
            derivation: Derivation::FactoryLookup,
            rpc_endpoint: Some("https://bsc-dataseed.binance.org".to_string()),
            pool_abi_descriptor: Some(BSC_POOL_DESCRIPTOR.to_string()),
            factory_abi_descriptor: Some(FACTORY_DESCRIPTOR.to_string()),
        };

        Self::from_entries(deterministic.chain([(Chain::Bsc, bsc)]))
            .with_rpc_endpoint(Chain::Optimism, "https://mainnet.optimism.io")
    }

    /// Replaces the RPC endpoint of a registered chain. Unregistered chains
    /// are left out.
    #[must_use]
    pub fn with_rpc_endpoint(mut self, chain: Chain, url: impl Into<String>) -> Self {
        if let Some(config) = self.entries.get_mut(&chain) {
            config.rpc_endpoint = Some(url.into());
        }
        self
    }

    /// Applies `V3POOL_RPC_URL_<CHAIN>` overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies RPC endpoint overrides read through `lookup`.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        for (chain, config) in &mut self.entries {
            let key = format!("{RPC_URL_ENV_PREFIX}{}", chain.env_suffix());
            if let Some(url) = lookup(&key).filter(|url| !url.trim().is_empty()) {
                tracing::debug!(chain = %chain, env = %key, "rpc endpoint override");
                config.rpc_endpoint = Some(url.trim().to_string());
            }
        }
        self
    }

    /// Full configuration for `chain`.
    ///
    /// # Errors
    /// Returns [`PoolError::UnsupportedChain`] if the chain has no entry.
    pub fn config(&self, chain: Chain) -> Result<&ChainConfig> {
        self.entries
            .get(&chain)
            .ok_or_else(|| PoolError::UnsupportedChain {
                chain: chain.to_string(),
            })
    }

    pub fn factory_address(&self, chain: Chain) -> Result<Address> {
        self.config(chain).map(|c| c.factory_address)
    }

    /// `None` on chains that use factory lookup.
    pub fn pool_init_code_hash(&self, chain: Chain) -> Result<Option<B256>> {
        self.config(chain).map(ChainConfig::init_code_hash)
    }

    pub fn derivation(&self, chain: Chain) -> Result<Derivation> {
        self.config(chain).map(|c| c.derivation)
    }

    /// # Errors
    /// [`PoolError::UnsupportedChain`] or [`PoolError::MissingRpcConfig`].
    pub fn rpc_endpoint(&self, chain: Chain) -> Result<&str> {
        self.config(chain)?
            .rpc_endpoint
            .as_deref()
            .ok_or(PoolError::MissingRpcConfig {
                chain,
                what: "rpc endpoint",
            })
    }

    /// # Errors
    /// [`PoolError::UnsupportedChain`] or [`PoolError::MissingRpcConfig`].
    pub fn pool_abi_descriptor(&self, chain: Chain) -> Result<&str> {
        self.config(chain)?
            .pool_abi_descriptor
            .as_deref()
            .ok_or(PoolError::MissingRpcConfig {
                chain,
                what: "pool interface descriptor",
            })
    }

    /// # Errors
    /// [`PoolError::UnsupportedChain`] or [`PoolError::MissingRpcConfig`].
    pub fn factory_abi_descriptor(&self, chain: Chain) -> Result<&str> {
        self.config(chain)?
            .factory_abi_descriptor
            .as_deref()
            .ok_or(PoolError::MissingRpcConfig {
                chain,
                what: "factory interface descriptor",
            })
    }

    /// Registered chains in [`Chain`] order.
    pub fn chains(&self) -> Vec<Chain> {
        let mut chains: Vec<Chain> = self.entries.keys().copied().collect();
        chains.sort();
        chains
    }

    pub fn contains(&self, chain: Chain) -> bool {
        self.entries.contains_key(&chain)
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::uniswap_v3()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_chain_is_registered() {
        let registry = ChainRegistry::uniswap_v3();
        for chain in Chain::ALL {
            assert!(registry.contains(chain), "{chain} missing from registry");
            assert!(registry.pool_abi_descriptor(chain).is_ok());
        }
        assert_eq!(registry.chains(), Chain::ALL.to_vec());
    }

    #[test]
    fn only_bsc_uses_factory_lookup() {
        let registry = ChainRegistry::uniswap_v3();
        let lookup: Vec<Chain> = registry
            .chains()
            .into_iter()
            .filter(|c| registry.config(*c).unwrap().uses_factory_lookup())
            .collect();
        assert_eq!(lookup, vec![Chain::Bsc]);

        assert_eq!(registry.pool_init_code_hash(Chain::Bsc).unwrap(), None);
        assert_eq!(
            registry.pool_init_code_hash(Chain::Polygon).unwrap(),
            Some(UNISWAP_V3_POOL_INIT_CODE_HASH)
        );
        assert_eq!(registry.factory_address(Chain::Bsc).unwrap(), BSC_V3_FACTORY);
        assert_eq!(registry.pool_abi_descriptor(Chain::Bsc).unwrap(), BSC_POOL_DESCRIPTOR);
    }

    #[test]
    fn missing_entry_is_unsupported() {
        let registry = ChainRegistry::from_entries([(Chain::Optimism, ChainConfig::uniswap_v3())]);
        assert!(matches!(
            registry.factory_address(Chain::Polygon),
            Err(PoolError::UnsupportedChain { ref chain }) if chain == "polygon"
        ));
        assert!(matches!(
            registry.rpc_endpoint(Chain::Polygon),
            Err(PoolError::UnsupportedChain { .. })
        ));
    }

    #[test]
    fn missing_endpoint_is_missing_rpc_config() {
        let registry = ChainRegistry::uniswap_v3();
        assert!(matches!(
            registry.rpc_endpoint(Chain::ArbitrumOne),
            Err(PoolError::MissingRpcConfig {
                chain: Chain::ArbitrumOne,
                ..
            })
        ));
        assert_eq!(
            registry.rpc_endpoint(Chain::Optimism).unwrap(),
            "https://mainnet.optimism.io"
        );
    }

    #[test]
    fn overrides_apply_per_chain() {
        let registry = ChainRegistry::uniswap_v3().with_overrides_from(|key| match key {
            "V3POOL_RPC_URL_ARBITRUM_ONE" => Some("http://localhost:8545".to_string()),
            "V3POOL_RPC_URL_BSC" => Some("   ".to_string()),
            _ => None,
        });

        assert_eq!(
            registry.rpc_endpoint(Chain::ArbitrumOne).unwrap(),
            "http://localhost:8545"
        );
        // Blank values do not clear the default.
        assert_eq!(
            registry.rpc_endpoint(Chain::Bsc).unwrap(),
            "https://bsc-dataseed.binance.org"
        );
    }
}
