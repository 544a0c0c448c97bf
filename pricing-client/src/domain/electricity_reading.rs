use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A single consumption-rate sample taken by a smart meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectricityReading {
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub reading: Decimal,
}

impl ElectricityReading {
    pub fn new(time: OffsetDateTime, reading: Decimal) -> Self {
        Self { time, reading }
    }
}
