pub mod calculator;
pub mod config;
pub mod observability;
pub mod sources;
pub mod transform;

pub use calculator::{CalculationError, CostCalculator, CostError, PlanCost};
