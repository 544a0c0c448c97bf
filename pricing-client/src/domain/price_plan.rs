use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("duplicate price plan name '{0}'")]
    DuplicateName(String),
    #[error("price plan '{name}' has negative unit rate {unit_rate}")]
    NegativeUnitRate { name: String, unit_rate: Decimal },
}

/// A named tariff with a fixed unit rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePlan {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    pub unit_rate: Decimal,
}

impl PricePlan {
    pub fn new(name: impl Into<String>, unit_rate: Decimal) -> Self {
        Self {
            name: name.into(),
            supplier: None,
            unit_rate,
        }
    }

    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    /// Case-insensitive name comparison used when resolving a meter's plan.
    pub fn matches(&self, plan_id: &str) -> bool {
        self.name.to_lowercase() == plan_id.to_lowercase()
    }
}

/// The fixed registry of configured price plans.
///
/// Built once at start-up and shared by reference; names are unique
/// ignoring case and unit rates are never negative.
#[derive(Debug, Clone, Default)]
pub struct PricePlans {
    plans: Vec<PricePlan>,
}

impl PricePlans {
    pub fn new(plans: Vec<PricePlan>) -> Result<Self, PlanError> {
        for (idx, plan) in plans.iter().enumerate() {
            if plan.unit_rate < Decimal::ZERO {
                return Err(PlanError::NegativeUnitRate {
                    name: plan.name.clone(),
                    unit_rate: plan.unit_rate,
                });
            }
            if plans[..idx].iter().any(|earlier| earlier.matches(&plan.name)) {
                return Err(PlanError::DuplicateName(plan.name.clone()));
            }
        }

        Ok(Self { plans })
    }

    pub fn find(&self, plan_id: &str) -> Option<&PricePlan> {
        self.plans.iter().find(|plan| plan.matches(plan_id))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PricePlan> {
        self.plans.iter()
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn find_ignores_case() {
        let plans = PricePlans::new(vec![
            PricePlan::new("price-plan-0", dec!(10)),
            PricePlan::new("Price-Plan-1", dec!(2)),
        ])
        .unwrap();

        assert_eq!(plans.find("PRICE-PLAN-0").map(|p| p.unit_rate), Some(dec!(10)));
        assert_eq!(plans.find("price-plan-1").map(|p| p.unit_rate), Some(dec!(2)));
        assert!(plans.find("price-plan-2").is_none());
    }

    #[test]
    fn rejects_names_differing_only_in_case() {
        let res = PricePlans::new(vec![
            PricePlan::new("standard", dec!(1)),
            PricePlan::new("STANDARD", dec!(2)),
        ]);

        assert_eq!(res.unwrap_err(), PlanError::DuplicateName("STANDARD".to_string()));
    }

    #[test]
    fn rejects_negative_unit_rate_but_allows_zero() {
        let res = PricePlans::new(vec![PricePlan::new("refund", dec!(-0.5))]);
        assert!(matches!(res, Err(PlanError::NegativeUnitRate { .. })));

        let free = PricePlans::new(vec![PricePlan::new("free", dec!(0))]).unwrap();
        assert_eq!(free.len(), 1);
        assert!(!free.is_empty());
        assert!(PricePlans::new(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn iterates_in_registration_order() {
        let plans = PricePlans::new(vec![
            PricePlan::new("b", dec!(1)).with_supplier("Power for Everyone"),
            PricePlan::new("a", dec!(2)),
        ])
        .unwrap();

        let names: Vec<_> = plans.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }
}
