use std::collections::HashMap;

use pricing_client::{domain::ElectricityReading, store::InMemoryMeterReadings};
use rust_decimal::Decimal;
use time::{macros::datetime, OffsetDateTime};

const MIN_TS: OffsetDateTime = datetime!(2000-01-01 00:00:00 UTC);
const MAX_TS: OffsetDateTime = datetime!(2100-01-01 00:00:00 UTC);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("reading must be non-negative, got {0}")]
    NegativeReading(Decimal),
    #[error("timestamp {0} out of allowed range")]
    TimestampOutOfRange(OffsetDateTime),
}

/// Pure validation of an `ElectricityReading`.
///
/// Rules:
/// - reading must be non-negative.
/// - time must be within a broad sanity window [2000-01-01, 2100-01-01].
pub fn validate_reading(reading: &ElectricityReading) -> Result<(), ValidationError> {
    if reading.reading < Decimal::ZERO {
        return Err(ValidationError::NegativeReading(reading.reading));
    }

    if reading.time < MIN_TS || reading.time > MAX_TS {
        return Err(ValidationError::TimestampOutOfRange(reading.time));
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub accepted: usize,
    pub rejected: usize,
    pub meters: usize,
}

/// Validate readings, group them by meter and store each meter's batch.
///
/// Rejected readings are logged and counted, they never abort the load.
pub fn load_readings<I>(store: &InMemoryMeterReadings, readings: I) -> LoadSummary
where
    I: IntoIterator<Item = (String, ElectricityReading)>,
{
    let mut summary = LoadSummary::default();
    let mut by_meter: HashMap<String, Vec<ElectricityReading>> = HashMap::new();

    for (meter_id, reading) in readings {
        match validate_reading(&reading) {
            Ok(()) => {
                summary.accepted += 1;
                by_meter.entry(meter_id).or_default().push(reading);
            }
            Err(e) => {
                tracing::warn!(meter_id = %meter_id, error = %e, "rejected reading");
                metrics::counter!("reading_validation_rejected_total").increment(1);
                summary.rejected += 1;
            }
        }
    }

    summary.meters = by_meter.len();
    for (meter_id, batch) in by_meter {
        // batches here are never empty
        if let Err(e) = store.store_readings(&meter_id, batch) {
            tracing::warn!(error = %e, "skipped empty reading batch");
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricing_client::store::MeterReadings;
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    #[test]
    fn reading_validation_accepts_valid_reading() {
        let reading = ElectricityReading::new(datetime!(2024-01-01 00:00:00 UTC), dec!(0.4512));

        assert!(validate_reading(&reading).is_ok());
    }

    #[test]
    fn reading_validation_accepts_zero() {
        let reading = ElectricityReading::new(datetime!(2024-01-01 00:00:00 UTC), dec!(0));

        assert!(validate_reading(&reading).is_ok());
    }

    #[test]
    fn reading_validation_rejects_negative_value() {
        let reading = ElectricityReading::new(datetime!(2024-01-01 00:00:00 UTC), dec!(-0.1));

        let res = validate_reading(&reading);
        assert!(matches!(res, Err(ValidationError::NegativeReading(_))));
    }

    #[test]
    fn reading_validation_rejects_out_of_range_ts() {
        let reading = ElectricityReading::new(datetime!(1800-01-01 00:00:00 UTC), dec!(1));

        let res = validate_reading(&reading);
        assert!(matches!(res, Err(ValidationError::TimestampOutOfRange(_))));
    }

    #[test]
    fn load_groups_by_meter_and_skips_invalid() {
        let store = InMemoryMeterReadings::new();
        let ts = datetime!(2024-01-01 00:00:00 UTC);
        let readings = vec![
            ("smart-meter-0".to_string(), ElectricityReading::new(ts, dec!(1))),
            ("smart-meter-1".to_string(), ElectricityReading::new(ts, dec!(-1))),
            ("smart-meter-0".to_string(), ElectricityReading::new(ts, dec!(2))),
            ("smart-meter-2".to_string(), ElectricityReading::new(ts, dec!(3))),
        ];

        let summary = load_readings(&store, readings);

        assert_eq!(
            summary,
            LoadSummary {
                accepted: 3,
                rejected: 1,
                meters: 2
            }
        );
        assert_eq!(store.readings("smart-meter-0").map(|r| r.len()), Some(2));
        assert!(store.readings("smart-meter-1").is_none());
    }
}
