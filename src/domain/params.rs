//! Named numeric strategy parameters and their validation.

use std::collections::BTreeMap;

use crate::domain::error::ValidationError;
use crate::domain::strategy::StrategyKind;

/// Parameter keys whose values are share counts.
const QUANTITY_KEYS: [&str; 5] = [
    "initialQuantity",
    "minHolding",
    "maxHolding",
    "tradeQuantity",
    "minHoldingForSell",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyParams {
    values: BTreeMap<String, f64>,
}

impl StrategyParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn number(&self, name: &str) -> Result<f64, ValidationError> {
        self.get(name)
            .ok_or_else(|| ValidationError::MissingParameters(vec![name.to_string()]))
    }

    /// Share-count parameter, rounded to a whole number of shares.
    pub fn quantity(&self, name: &str) -> Result<i64, ValidationError> {
        self.number(name).map(|v| v.round() as i64)
    }
}

impl FromIterator<(String, f64)> for StrategyParams {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        StrategyParams {
            values: iter.into_iter().collect(),
        }
    }
}

/// Resolve a strategy identifier and check its parameters.
///
/// All missing keys are reported together, in the strategy's declared order.
/// Value checks only run once every key is present.
pub fn validate_params(
    strategy_id: &str,
    params: &StrategyParams,
) -> Result<StrategyKind, ValidationError> {
    let kind = StrategyKind::from_id(strategy_id)
        .ok_or_else(|| ValidationError::UnsupportedStrategy(strategy_id.to_string()))?;

    let required = kind.required_params();
    let missing: Vec<String> = required
        .iter()
        .filter(|key| !params.contains(key))
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingParameters(missing));
    }

    for key in required {
        let value = params.number(key)?;
        if !value.is_finite() {
            return Err(ValidationError::InvalidParameter {
                name: key.to_string(),
                reason: "must be a finite number".to_string(),
            });
        }
        if QUANTITY_KEYS.contains(key) && value < 0.0 {
            return Err(ValidationError::InvalidParameter {
                name: key.to_string(),
                reason: "must be non-negative".to_string(),
            });
        }
    }

    Ok(kind)
}
