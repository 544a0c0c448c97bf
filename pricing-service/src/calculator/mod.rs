use std::collections::BTreeMap;

use pricing_client::{
    domain::{ElectricityReading, PricePlan, PricePlans},
    store::{MeterReadings, PlanAssignments},
};
use rust_decimal::Decimal;
use serde::Serialize;
use time::{Duration, OffsetDateTime};

/// Width of the rolling window used by the weekly cost.
pub const LAST_WEEK: Duration = Duration::WEEK;

const SECONDS_PER_HOUR: i64 = 3600;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationError {
    #[error("cannot average an empty set of readings")]
    EmptyReadings,
    #[error("readings span no time, cost rate is undefined")]
    ZeroElapsedTime,
    #[error("decimal overflow while calculating cost")]
    Overflow,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CostError {
    #[error("no readings recorded for meter '{0}'")]
    NoMeterData(String),
    #[error("no price plan mapped to meter '{0}'")]
    PlanNotMapped(String),
    #[error("price plan '{0}' is not configured")]
    PlanNotConfigured(String),
    #[error(transparent)]
    Calculation(#[from] CalculationError),
}

impl CostError {
    /// True for the lookup failures that callers usually treat as "no data".
    pub fn is_no_data(&self) -> bool {
        !matches!(self, Self::Calculation(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanCost {
    pub plan_name: String,
    pub cost: Decimal,
}

/// Quotient at the full precision of `Decimal`; only a quotient that does not
/// fit in 28 digits is rounded, on its last digit.
fn divide(dividend: Decimal, divisor: Decimal) -> Result<Decimal, CalculationError> {
    dividend.checked_div(divisor).ok_or(CalculationError::Overflow)
}

/// Mean reading value at full decimal precision.
pub fn average_reading(readings: &[ElectricityReading]) -> Result<Decimal, CalculationError> {
    if readings.is_empty() {
        return Err(CalculationError::EmptyReadings);
    }

    let sum = readings
        .iter()
        .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(r.reading))
        .ok_or(CalculationError::Overflow)?;

    divide(sum, Decimal::from(readings.len()))
}

/// Hours between the earliest and latest reading, as a continuous value.
///
/// Only whole seconds count, so readings less than a second apart span
/// zero hours.
pub fn elapsed_hours(readings: &[ElectricityReading]) -> Result<Decimal, CalculationError> {
    let first = readings.iter().map(|r| r.time).min();
    let last = readings.iter().map(|r| r.time).max();
    let (Some(first), Some(last)) = (first, last) else {
        return Err(CalculationError::EmptyReadings);
    };

    let seconds = (last - first).whole_seconds();
    Decimal::from(seconds)
        .checked_div(Decimal::from(SECONDS_PER_HOUR))
        .ok_or(CalculationError::Overflow)
}

/// Cost of a reading set under a plan: `average / elapsed hours * unit rate`.
///
/// Input order does not matter. A set spanning zero time (a single reading,
/// or all readings at one instant) has no defined rate and is rejected with
/// [`CalculationError::ZeroElapsedTime`].
pub fn calculate_cost(
    readings: &[ElectricityReading],
    plan: &PricePlan,
) -> Result<Decimal, CalculationError> {
    let average = average_reading(readings)?;
    let hours = elapsed_hours(readings)?;
    if hours.is_zero() {
        return Err(CalculationError::ZeroElapsedTime);
    }

    let rate = divide(average, hours)?;
    rate.checked_mul(plan.unit_rate)
        .map(|cost| cost.normalize())
        .ok_or(CalculationError::Overflow)
}

fn observe<T>(meter_id: &str, result: Result<T, CostError>) -> Result<T, CostError> {
    match &result {
        Ok(_) => metrics::counter!("cost_calculations_total").increment(1),
        Err(e) if e.is_no_data() => {
            tracing::debug!(meter_id, reason = %e, "no cost data for meter");
            metrics::counter!("cost_no_data_total").increment(1);
        }
        Err(e) => {
            tracing::warn!(meter_id, error = %e, "cost calculation failed");
            metrics::counter!("cost_calculation_errors_total").increment(1);
        }
    }
    result
}

/// Prices a meter's recorded consumption against the plan registry.
///
/// Holds only borrowed, read-only collaborators, so one calculator can be
/// shared across threads and called for any number of meters.
pub struct CostCalculator<'a, R: ?Sized, A: ?Sized> {
    plans: &'a PricePlans,
    readings: &'a R,
    accounts: &'a A,
}

impl<'a, R, A> CostCalculator<'a, R, A>
where
    R: MeterReadings + ?Sized,
    A: PlanAssignments + ?Sized,
{
    pub fn new(plans: &'a PricePlans, readings: &'a R, accounts: &'a A) -> Self {
        Self {
            plans,
            readings,
            accounts,
        }
    }

    /// Cost of every recorded reading for the meter under each configured plan.
    pub fn cost_for_all_plans(&self, meter_id: &str) -> Result<BTreeMap<String, Decimal>, CostError> {
        let costs = self.plan_costs(meter_id)?;
        Ok(costs.into_iter().map(|pc| (pc.plan_name, pc.cost)).collect())
    }

    /// Plans ordered cheapest first, optionally keeping only the first `limit`.
    ///
    /// Plans with equal cost keep their registry order.
    pub fn recommend(&self, meter_id: &str, limit: Option<usize>) -> Result<Vec<PlanCost>, CostError> {
        let mut costs = self.plan_costs(meter_id)?;
        costs.sort_by(|a, b| a.cost.cmp(&b.cost));
        if let Some(limit) = limit {
            costs.truncate(limit);
        }
        Ok(costs)
    }

    /// Cost under the meter's assigned plan for readings in the last seven days.
    pub fn cost_for_last_week(&self, meter_id: &str) -> Result<Decimal, CostError> {
        self.cost_for_week_ending(meter_id, OffsetDateTime::now_utc())
    }

    /// Weekly cost with an explicit window end; keeps readings strictly after
    /// `now - 7 days`.
    pub fn cost_for_week_ending(&self, meter_id: &str, now: OffsetDateTime) -> Result<Decimal, CostError> {
        observe(meter_id, self.weekly_cost(meter_id, now))
    }

    fn plan_costs(&self, meter_id: &str) -> Result<Vec<PlanCost>, CostError> {
        let result = match self.readings.readings(meter_id) {
            None => Err(CostError::NoMeterData(meter_id.to_string())),
            Some(readings) => self
                .plans
                .iter()
                .map(|plan| {
                    calculate_cost(&readings, plan).map(|cost| PlanCost {
                        plan_name: plan.name.clone(),
                        cost,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(CostError::from),
        };

        if let Ok(costs) = &result {
            tracing::debug!(meter_id, plans = costs.len(), "calculated cost for all plans");
        }
        observe(meter_id, result)
    }

    fn weekly_cost(&self, meter_id: &str, now: OffsetDateTime) -> Result<Decimal, CostError> {
        let plan_id = self
            .accounts
            .plan_id_for_meter(meter_id)
            .ok_or_else(|| CostError::PlanNotMapped(meter_id.to_string()))?;
        let plan = self
            .plans
            .find(&plan_id)
            .ok_or(CostError::PlanNotConfigured(plan_id))?;

        let since = now.checked_sub(LAST_WEEK).ok_or(CalculationError::Overflow)?;
        let recent: Vec<ElectricityReading> = self
            .readings
            .readings(meter_id)
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.time > since)
            .collect();

        let cost = calculate_cost(&recent, plan)?;
        tracing::debug!(meter_id, plan = %plan.name, readings = recent.len(), %cost, "calculated weekly cost");
        Ok(cost)
    }
}
