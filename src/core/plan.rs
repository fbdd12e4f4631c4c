use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::DepositError;

/// Tolerance used when checking that plan weights sum to one.
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Errors that can occur when building an [`AllocationPlan`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlanError {
    /// The weight table contains no targets.
    Empty,
    /// A target carries a weight outside `(0, 1]`.
    InvalidWeight { target: String, weight: f64 },
    /// The weights do not sum to one within [`WEIGHT_EPSILON`].
    UnbalancedWeights { sum: f64 },
}

impl std::fmt::Display for PlanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanError::Empty => write!(f, "allocation plan has no targets"),
            PlanError::InvalidWeight { target, weight } => {
                write!(f, "weight {weight} for target {target} is not in (0, 1]")
            }
            PlanError::UnbalancedWeights { sum } => {
                write!(f, "plan weights sum to {sum}, expected 1")
            }
        }
    }
}

impl std::error::Error for PlanError {}

/// Fixed split applied to every deposit: target identifier to a fraction
/// of one.
///
/// The weight table is validated once at construction, never per deposit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    weights: BTreeMap<String, f64>,
}

impl AllocationPlan {
    /// Validates the weight table and builds a plan.
    pub fn new(weights: BTreeMap<String, f64>) -> Result<Self, PlanError> {
        if weights.is_empty() {
            return Err(PlanError::Empty);
        }
        for (target, &weight) in &weights {
            if !weight.is_finite() || weight <= 0.0 || weight > 1.0 {
                return Err(PlanError::InvalidWeight {
                    target: target.clone(),
                    weight,
                });
            }
        }
        let sum: f64 = weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(PlanError::UnbalancedWeights { sum });
        }
        Ok(Self { weights })
    }

    /// Splits `amount` across the plan's targets.
    ///
    /// The result contains exactly the configured targets and its values
    /// sum to `amount` up to floating rounding. Pure and deterministic.
    pub fn allocate(&self, amount: f64) -> Result<BTreeMap<String, f64>, DepositError> {
        if !(amount > 0.0) {
            return Err(DepositError::NonPositiveAmount);
        }
        Ok(self
            .weights
            .iter()
            .map(|(target, weight)| (target.clone(), amount * weight))
            .collect())
    }

    /// Iterates over the configured target identifiers.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    /// The weight configured for `target`, if present.
    pub fn weight(&self, target: &str) -> Option<f64> {
        self.weights.get(target).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_plan() {
        assert_eq!(AllocationPlan::new(BTreeMap::new()), Err(PlanError::Empty));
    }

    #[test]
    fn rejects_out_of_range_weight() {
        let err = AllocationPlan::new(BTreeMap::from([
            ("a".to_string(), 1.5),
        ]))
        .unwrap_err();
        assert!(matches!(err, PlanError::InvalidWeight { .. }));

        let err = AllocationPlan::new(BTreeMap::from([
            ("a".to_string(), 0.0),
            ("b".to_string(), 1.0),
        ]))
        .unwrap_err();
        assert!(matches!(err, PlanError::InvalidWeight { .. }));
    }

    #[test]
    fn rejects_unbalanced_weights() {
        let err = AllocationPlan::new(BTreeMap::from([
            ("a".to_string(), 0.5),
            ("b".to_string(), 0.4),
        ]))
        .unwrap_err();
        assert!(matches!(err, PlanError::UnbalancedWeights { .. }));
    }

    #[test]
    fn allocation_covers_all_targets() {
        let plan = AllocationPlan::new(BTreeMap::from([
            ("a".to_string(), 0.25),
            ("b".to_string(), 0.75),
        ]))
        .unwrap();

        let split = plan.allocate(200.0).unwrap();
        assert_eq!(split.len(), 2);
        assert_eq!(split["a"], 50.0);
        assert_eq!(split["b"], 150.0);
        let sum: f64 = split.values().sum();
        assert!((sum - 200.0).abs() < WEIGHT_EPSILON);
    }

    #[test]
    fn allocate_rejects_non_positive_amount() {
        let plan = AllocationPlan::new(BTreeMap::from([("a".to_string(), 1.0)])).unwrap();
        assert_eq!(plan.allocate(0.0), Err(DepositError::NonPositiveAmount));
        assert_eq!(plan.allocate(-3.0), Err(DepositError::NonPositiveAmount));
    }

    #[test]
    fn tolerates_inexact_weight_sum() {
        // 7 * 0.07 + 0.35 + 0.30 does not sum to exactly 1.0 in binary.
        let plan = AllocationPlan::new(BTreeMap::from([
            ("enb".to_string(), 0.07),
            ("pfe".to_string(), 0.07),
            ("corweave".to_string(), 0.07),
            ("ceg".to_string(), 0.07),
            ("ttwo".to_string(), 0.07),
            ("qqqm".to_string(), 0.35),
            ("btc".to_string(), 0.30),
        ]));
        assert!(plan.is_ok());
    }
}
