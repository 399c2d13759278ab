//! Uniswap V3 fee tiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PoolError;

/// Pool fee in hundredths of a basis point (`3000` = 0.30%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum FeeTier {
    /// 0.01%
    Lowest,
    /// 0.05%
    Low,
    /// 0.30%
    Medium,
    /// 1.00%
    High,
}

impl FeeTier {
    pub const ALL: [FeeTier; 4] = [FeeTier::Lowest, FeeTier::Low, FeeTier::Medium, FeeTier::High];

    /// On-chain `uint24` fee value.
    pub const fn value(self) -> u32 {
        match self {
            FeeTier::Lowest => 100,
            FeeTier::Low => 500,
            FeeTier::Medium => 3000,
            FeeTier::High => 10000,
        }
    }

    /// Tick spacing the factory enables for this fee.
    pub const fn tick_spacing(self) -> i32 {
        match self {
            FeeTier::Lowest => 1,
            FeeTier::Low => 10,
            FeeTier::Medium => 60,
            FeeTier::High => 200,
        }
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.value();
        write!(f, "{}.{:02}%", value / 10_000, (value % 10_000) / 100)
    }
}

impl TryFrom<u32> for FeeTier {
    type Error = PoolError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        FeeTier::ALL
            .into_iter()
            .find(|tier| tier.value() == value)
            .ok_or_else(|| PoolError::InvalidFeeTier(value.to_string()))
    }
}

impl From<FeeTier> for u32 {
    fn from(tier: FeeTier) -> Self {
        tier.value()
    }
}

/// Accepts the numeric value (`3000`) or the tier name (`medium`).
impl FromStr for FeeTier {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<u32>() {
            return FeeTier::try_from(value);
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "lowest" => Ok(FeeTier::Lowest),
            "low" => Ok(FeeTier::Low),
            "medium" => Ok(FeeTier::Medium),
            "high" => Ok(FeeTier::High),
            _ => Err(PoolError::InvalidFeeTier(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_values() {
        let values: Vec<u32> = FeeTier::ALL.iter().map(|t| t.value()).collect();
        assert_eq!(values, vec![100, 500, 3000, 10000]);
    }

    #[test]
    fn rejects_unknown_fee() {
        assert!(matches!(
            FeeTier::try_from(2500),
            Err(PoolError::InvalidFeeTier(ref v)) if v == "2500"
        ));
        assert!(matches!(
            "0.3%".parse::<FeeTier>(),
            Err(PoolError::InvalidFeeTier(_))
        ));
    }

    #[test]
    fn parses_names_and_values() {
        assert_eq!("3000".parse::<FeeTier>().unwrap(), FeeTier::Medium);
        assert_eq!("Lowest".parse::<FeeTier>().unwrap(), FeeTier::Lowest);
    }

    #[test]
    fn displays_as_percent() {
        assert_eq!(FeeTier::Lowest.to_string(), "0.01%");
        assert_eq!(FeeTier::Low.to_string(), "0.05%");
        assert_eq!(FeeTier::Medium.to_string(), "0.30%");
        assert_eq!(FeeTier::High.to_string(), "1.00%");
    }
}
