//! Supported networks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PoolError;

/// Networks with a Uniswap V3 style factory deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chain {
    Optimism,
    OptimisticKovan,
    ArbitrumOne,
    ArbitrumRinkeby,
    PolygonMumbai,
    Polygon,
    Bsc,
}

impl Chain {
    /// Every chain, in registry order.
    pub const ALL: [Chain; 7] = [
        Chain::Optimism,
        Chain::OptimisticKovan,
        Chain::ArbitrumOne,
        Chain::ArbitrumRinkeby,
        Chain::PolygonMumbai,
        Chain::Polygon,
        Chain::Bsc,
    ];

    /// EIP-155 chain id.
    pub const fn id(self) -> u64 {
        match self {
            Chain::Optimism => 10,
            Chain::OptimisticKovan => 69,
            Chain::ArbitrumOne => 42161,
            Chain::ArbitrumRinkeby => 421611,
            Chain::PolygonMumbai => 80001,
            Chain::Polygon => 137,
            Chain::Bsc => 56,
        }
    }

    /// Lowercase name, also accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Chain::Optimism => "optimism",
            Chain::OptimisticKovan => "optimistic_kovan",
            Chain::ArbitrumOne => "arbitrum_one",
            Chain::ArbitrumRinkeby => "arbitrum_rinkeby",
            Chain::PolygonMumbai => "polygon_mumbai",
            Chain::Polygon => "polygon",
            Chain::Bsc => "bsc",
        }
    }

    /// Suffix of the `V3POOL_RPC_URL_<CHAIN>` override variable.
    pub fn env_suffix(self) -> String {
        self.name().to_ascii_uppercase()
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u64> for Chain {
    type Error = PoolError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        Chain::ALL
            .into_iter()
            .find(|chain| chain.id() == id)
            .ok_or_else(|| PoolError::UnsupportedChain {
                chain: id.to_string(),
            })
    }
}

/// Parses a chain name (`optimism`, `arbitrum-one`, ...) or a numeric chain id.
impl FromStr for Chain {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        if let Ok(id) = normalized.parse::<u64>() {
            return Chain::try_from(id);
        }

        match normalized.as_str() {
            "optimism" | "op" => Ok(Chain::Optimism),
            "optimistic_kovan" | "kovan" => Ok(Chain::OptimisticKovan),
            "arbitrum_one" | "arbitrum" => Ok(Chain::ArbitrumOne),
            "arbitrum_rinkeby" => Ok(Chain::ArbitrumRinkeby),
            "polygon_mumbai" | "mumbai" => Ok(Chain::PolygonMumbai),
            "polygon" | "matic" => Ok(Chain::Polygon),
            "bsc" | "bnb" => Ok(Chain::Bsc),
            _ => Err(PoolError::UnsupportedChain {
                chain: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_ids_round_trip() {
        for chain in Chain::ALL {
            assert_eq!(Chain::try_from(chain.id()).expect("known id"), chain);
            assert_eq!(chain.name().parse::<Chain>().expect("known name"), chain);
        }
    }

    #[test]
    fn parses_aliases_and_ids() {
        assert_eq!("Arbitrum-One".parse::<Chain>().unwrap(), Chain::ArbitrumOne);
        assert_eq!("56".parse::<Chain>().unwrap(), Chain::Bsc);
        assert_eq!(" op ".parse::<Chain>().unwrap(), Chain::Optimism);
    }

    #[test]
    fn unknown_chain_is_unsupported() {
        let err = Chain::try_from(1).unwrap_err();
        assert!(matches!(err, PoolError::UnsupportedChain { ref chain } if chain == "1"));

        let err = "goerli".parse::<Chain>().unwrap_err();
        assert!(matches!(err, PoolError::UnsupportedChain { ref chain } if chain == "goerli"));
    }

    #[test]
    fn env_suffix_is_upper_snake() {
        assert_eq!(Chain::ArbitrumOne.env_suffix(), "ARBITRUM_ONE");
    }
}
