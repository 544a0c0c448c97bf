//! Read-only lookups the cost calculator consumes, plus the in-memory
//! implementations used by the service binary and tests.

pub mod accounts;
pub mod meter_readings;

pub use accounts::{InMemoryAccounts, PlanAssignments};
pub use meter_readings::{InMemoryMeterReadings, MeterReadings, StoreError};
