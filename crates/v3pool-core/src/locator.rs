//! Pool address resolution and price quotes for configured chains.
//!
//! [`PoolLocator`] ties together the immutable [`ChainRegistry`], a
//! [`DescriptorSource`] and one [`ContractCaller`] per chain with an RPC
//! endpoint. The derivation strategy for each call is taken from the chain's
//! [`Derivation`]; CREATE2 chains never touch the network.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::Address;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use v3pool_data::{
    Chain, ChainRegistry, Derivation, DescriptorSource, FeeTier, PoolError, Result, Token,
};

use crate::derive::{compute_pool_address, PoolKey};
use crate::ordering::sort_tokens;
use crate::rpc::{ContractCaller, HttpContractCaller};
use crate::v3::price::{convert_slot0_to_price, PriceResult};
use crate::v3::slot0::Slot0Data;

const GET_POOL: &str = "getPool";
const SLOT0: &str = "slot0";

/// Price snapshot of a single pool.
#[derive(Debug, Clone)]
pub struct PoolQuote {
    pub chain: Chain,
    pub pool: Address,
    /// Lower-addressed token, with its decimals.
    pub token0: Token,
    pub token1: Token,
    pub fee: FeeTier,
    pub slot0: Slot0Data,
    /// Price of token0 in token1.
    pub price: PriceResult,
}

/// Resolves pool addresses and reads pool state.
pub struct PoolLocator {
    registry: Arc<ChainRegistry>,
    descriptors: Arc<dyn DescriptorSource>,
    callers: HashMap<Chain, Arc<dyn ContractCaller>>,
}

impl PoolLocator {
    /// Locator without any RPC access. Only CREATE2 derivation works.
    pub fn offline(registry: Arc<ChainRegistry>, descriptors: Arc<dyn DescriptorSource>) -> Self {
        Self {
            registry,
            descriptors,
            callers: HashMap::new(),
        }
    }

    /// Locator with an HTTP caller for every chain that has an RPC endpoint.
    ///
    /// # Errors
    /// Returns error if an HTTP client cannot be built.
    pub fn connect(
        registry: Arc<ChainRegistry>,
        descriptors: Arc<dyn DescriptorSource>,
        timeout: Duration,
    ) -> eyre::Result<Self> {
        let mut locator = Self::offline(registry, descriptors);
        for chain in locator.registry.chains() {
            if let Ok(url) = locator.registry.rpc_endpoint(chain) {
                let caller = HttpContractCaller::new(url, timeout)?;
                tracing::debug!(chain = %chain, rpc_url = %url, "rpc caller configured");
                locator.callers.insert(chain, Arc::new(caller));
            }
        }
        Ok(locator)
    }

    /// Replaces the caller used for `chain`.
    #[must_use]
    pub fn with_caller(mut self, chain: Chain, caller: Arc<dyn ContractCaller>) -> Self {
        self.callers.insert(chain, caller);
        self
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    fn caller(&self, chain: Chain) -> Result<&Arc<dyn ContractCaller>> {
        // Surface UnsupportedChain before MissingRpcConfig.
        self.registry.config(chain)?;
        self.callers.get(&chain).ok_or(PoolError::MissingRpcConfig {
            chain,
            what: "rpc endpoint",
        })
    }

    /// Pool address for `(token_a, token_b, fee)` on `chain`, tokens in any order.
    ///
    /// # Errors
    /// [`PoolError::UnsupportedChain`], [`PoolError::InvalidAddress`], and on
    /// factory-lookup chains [`PoolError::MissingRpcConfig`],
    /// [`PoolError::DescriptorNotFound`] or [`PoolError::RpcFailure`].
    #[tracing::instrument(skip(self), fields(chain = %chain, fee = fee.value()))]
    pub async fn derive_pool_address(
        &self,
        token_a: Address,
        token_b: Address,
        fee: FeeTier,
        chain: Chain,
    ) -> Result<Address> {
        let config = self.registry.config(chain)?;
        let key = PoolKey::new(token_a, token_b, fee)?;

        match config.derivation {
            Derivation::Create2 { init_code_hash } => {
                let pool = compute_pool_address(config.factory_address, init_code_hash, &key);
                tracing::debug!(pool = %pool, "derived pool address");
                Ok(pool)
            }
            Derivation::FactoryLookup => {
                self.lookup_pool(&key, chain, config.factory_address).await
            }
        }
    }

    async fn lookup_pool(&self, key: &PoolKey, chain: Chain, factory: Address) -> Result<Address> {
        let caller = self.caller(chain)?;
        let descriptor = self
            .descriptors
            .resolve(self.registry.factory_abi_descriptor(chain)?)?;

        let outputs = caller
            .call(factory, &descriptor, GET_POOL, &key.abi_values())
            .await
            .map_err(|e| PoolError::rpc(chain, GET_POOL, e))?;

        let pool = outputs
            .first()
            .and_then(DynSolValue::as_address)
            .ok_or_else(|| {
                PoolError::rpc(chain, GET_POOL, format!("expected an address, got {outputs:?}"))
            })?;

        if pool == Address::ZERO {
            tracing::warn!(factory = %factory, "factory reports no pool for this key");
        } else {
            tracing::debug!(pool = %pool, "factory lookup");
        }
        Ok(pool)
    }

    /// Reads `slot0()` from `pool` on `chain`.
    ///
    /// # Errors
    /// [`PoolError::UnsupportedChain`], [`PoolError::MissingRpcConfig`],
    /// [`PoolError::DescriptorNotFound`] or [`PoolError::RpcFailure`].
    #[tracing::instrument(skip(self), fields(chain = %chain, pool = %pool))]
    pub async fn fetch_slot0(&self, pool: Address, chain: Chain) -> Result<Slot0Data> {
        let caller = self.caller(chain)?;
        let descriptor = self
            .descriptors
            .resolve(self.registry.pool_abi_descriptor(chain)?)?;

        let outputs = caller
            .call(pool, &descriptor, SLOT0, &[])
            .await
            .map_err(|e| PoolError::rpc(chain, SLOT0, e))?;

        Slot0Data::from_outputs(&outputs).map_err(|e| PoolError::rpc(chain, SLOT0, e))
    }

    /// Derives the pool for two tokens, reads its `slot0` and converts the
    /// price using the tokens' decimals.
    ///
    /// # Errors
    /// Any error of [`Self::derive_pool_address`] or [`Self::fetch_slot0`].
    pub async fn fetch_pool_price(
        &self,
        token_a: Token,
        token_b: Token,
        fee: FeeTier,
        chain: Chain,
    ) -> Result<PoolQuote> {
        let (token0, token1) = sort_tokens(token_a, token_b)?;
        let pool = self
            .derive_pool_address(token0.address, token1.address, fee, chain)
            .await?;
        let slot0 = self.fetch_slot0(pool, chain).await?;
        let price = convert_slot0_to_price(
            slot0.sqrt_price_x96,
            i32::from(token0.decimals),
            i32::from(token1.decimals),
        )?;

        tracing::info!(
            chain = %chain,
            pool = %pool,
            token0 = %token0,
            token1 = %token1,
            price = %price,
            "pool quote"
        );

        Ok(PoolQuote {
            chain,
            pool,
            token0,
            token1,
            fee,
            slot0,
            price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use v3pool_data::{ChainConfig, EmbeddedDescriptors};

    const TOKEN_A: Address = address!("9d34f1d15c22e4c0924804e2a38cbe93dfb84bc2");
    const TOKEN_B: Address = address!("c84da6c8ec7a57cd10b939e79eaf9d2d17834e04");

    fn offline() -> PoolLocator {
        PoolLocator::offline(Arc::new(ChainRegistry::uniswap_v3()), Arc::new(EmbeddedDescriptors))
    }

    #[tokio::test]
    async fn create2_chain_needs_no_caller() {
        let pool = offline()
            .derive_pool_address(TOKEN_A, TOKEN_B, FeeTier::Medium, Chain::Optimism)
            .await
            .unwrap();
        assert_eq!(pool, address!("05b552c0a787c228624b389d51eb4277e1f0f348"));
    }

    #[tokio::test]
    async fn lookup_chain_without_caller_is_missing_rpc_config() {
        let err = offline()
            .derive_pool_address(TOKEN_A, TOKEN_B, FeeTier::Medium, Chain::Bsc)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PoolError::MissingRpcConfig {
                chain: Chain::Bsc,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unregistered_chain_is_unsupported() {
        let registry = ChainRegistry::from_entries([(Chain::Polygon, ChainConfig::uniswap_v3())]);
        let locator = PoolLocator::offline(Arc::new(registry), Arc::new(EmbeddedDescriptors));

        let err = locator
            .derive_pool_address(TOKEN_A, TOKEN_B, FeeTier::Low, Chain::ArbitrumOne)
            .await
            .unwrap_err();
        assert!(matches!(err, PoolError::UnsupportedChain { .. }));

        let err = locator.fetch_slot0(TOKEN_A, Chain::ArbitrumOne).await.unwrap_err();
        assert!(matches!(err, PoolError::UnsupportedChain { .. }));
    }

    #[test]
    fn connect_builds_callers_for_configured_endpoints() {
        let locator = PoolLocator::connect(
            Arc::new(ChainRegistry::uniswap_v3()),
            Arc::new(EmbeddedDescriptors),
            Duration::from_secs(1),
        )
        .unwrap();

        let mut chains: Vec<Chain> = locator.callers.keys().copied().collect();
        chains.sort();
        assert_eq!(chains, vec![Chain::Optimism, Chain::Bsc]);
    }
}
