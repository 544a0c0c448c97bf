use dashmap::DashMap;

use crate::domain::ElectricityReading;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("no readings supplied for meter '{0}'")]
    EmptyBatch(String),
}

/// Source of recorded readings for a smart meter.
///
/// `None` means the meter is unknown. Returned readings are in no
/// particular order.
pub trait MeterReadings: Send + Sync {
    fn readings(&self, meter_id: &str) -> Option<Vec<ElectricityReading>>;
}

/// Concurrent in-memory reading store keyed by meter id.
#[derive(Debug, Default)]
pub struct InMemoryMeterReadings {
    readings: DashMap<String, Vec<ElectricityReading>>,
}

impl InMemoryMeterReadings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of readings for a meter, creating its entry on first use.
    pub fn store_readings(
        &self,
        meter_id: &str,
        readings: Vec<ElectricityReading>,
    ) -> Result<(), StoreError> {
        if readings.is_empty() {
            return Err(StoreError::EmptyBatch(meter_id.to_string()));
        }

        self.readings
            .entry(meter_id.to_string())
            .or_default()
            .extend(readings);
        Ok(())
    }
}

impl MeterReadings for InMemoryMeterReadings {
    fn readings(&self, meter_id: &str) -> Option<Vec<ElectricityReading>> {
        self.readings.get(meter_id).map(|entry| entry.value().clone())
    }
}
