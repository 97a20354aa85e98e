use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{PayoffError, Result};

/// planner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PlannerConfig {
    pub simulation: SimulationConfig,
    pub recommendations: RecommendationConfig,
}

/// simulator limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// hard stop for the month loop (600 = 50 years)
    pub max_months: u32,
    /// balances at or below this close and are zeroed
    pub close_epsilon: Money,
    /// a balance growing past this ends the run as divergent
    pub max_balance: Money,
}

/// thresholds for advisory generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// the other strategy is suggested when it finishes more than this many months sooner
    pub strategy_switch_months: u32,
    /// or when it saves more than this in interest
    pub strategy_switch_interest: Money,
    /// percentage points above the ledger average apr that count as high
    pub high_apr_margin: Rate,
    /// aprs below this are never flagged as high
    pub high_apr_floor: Rate,
    /// share of the monthly budget consumed by minimums before warning
    pub minimum_share_threshold: Rate,
    /// a debt's share of minimums vs. its share of balances before flagging
    pub disproportionate_minimum_factor: Decimal,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_months: 600,
            close_epsilon: Money::from_decimal(dec!(0.004)),
            max_balance: Money::from_major(1_000_000_000_000_000),
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            strategy_switch_months: 3,
            strategy_switch_interest: Money::from_major(100),
            high_apr_margin: Rate::from_percentage(5),
            high_apr_floor: Rate::from_percentage(15),
            minimum_share_threshold: Rate::from_percentage(80),
            disproportionate_minimum_factor: dec!(2),
        }
    }
}

impl PlannerConfig {
    /// shorter horizon and more eager advisories
    pub fn conservative() -> Self {
        Self {
            simulation: SimulationConfig {
                max_months: 360,
                ..SimulationConfig::default()
            },
            recommendations: RecommendationConfig {
                strategy_switch_months: 1,
                strategy_switch_interest: Money::from_major(25),
                high_apr_margin: Rate::from_percentage(3),
                high_apr_floor: Rate::from_percentage(10),
                minimum_share_threshold: Rate::from_percentage(70),
                disproportionate_minimum_factor: dec!(1.5),
            },
        }
    }

    /// parse from json; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PlannerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.simulation.max_months == 0 {
            return Err(invalid("max_months must be at least 1"));
        }
        if self.simulation.close_epsilon.is_negative()
            || self.simulation.close_epsilon >= Money::CENT
        {
            return Err(invalid("close_epsilon must be within [0, 0.01)"));
        }
        if !self.simulation.max_balance.is_positive() {
            return Err(invalid("max_balance must be positive"));
        }

        let rec = &self.recommendations;
        if rec.strategy_switch_interest.is_negative() {
            return Err(invalid("strategy_switch_interest must not be negative"));
        }
        if rec.high_apr_margin.is_negative() || rec.high_apr_floor.is_negative() {
            return Err(invalid("apr thresholds must not be negative"));
        }
        if rec.minimum_share_threshold.is_negative() || rec.minimum_share_threshold > Rate::ONE {
            return Err(invalid("minimum_share_threshold must be within [0, 1]"));
        }
        if rec.disproportionate_minimum_factor < Decimal::ONE {
            return Err(invalid("disproportionate_minimum_factor must be at least 1"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> PayoffError {
    PayoffError::InvalidConfiguration {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PlannerConfig::default().validate().is_ok());
        assert!(PlannerConfig::conservative().validate().is_ok());
        assert_eq!(PlannerConfig::default().simulation.max_months, 600);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = PlannerConfig::from_json(r#"{ "simulation": { "max_months": 120 } }"#).unwrap();
        assert_eq!(config.simulation.max_months, 120);
        assert_eq!(config.simulation.close_epsilon, SimulationConfig::default().close_epsilon);
        assert_eq!(config.recommendations, RecommendationConfig::default());
    }

    #[test]
    fn test_rejects_invalid_values() {
        let result = PlannerConfig::from_json(r#"{ "simulation": { "max_months": 0 } }"#);
        assert!(matches!(result, Err(PayoffError::InvalidConfiguration { .. })));

        let mut config = PlannerConfig::default();
        config.recommendations.minimum_share_threshold = Rate::from_percentage(150);
        assert!(config.validate().is_err());

        let mut config = PlannerConfig::default();
        config.simulation.close_epsilon = Money::from_major(1);
        assert!(config.validate().is_err());

        let mut config = PlannerConfig::default();
        config.simulation.max_balance = Money::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            PlannerConfig::from_json("{ not json"),
            Err(PayoffError::Serialization(_))
        ));
    }
}
