use std::{fs::File, io::Read, path::PathBuf, str::FromStr};

use csv::StringRecord;
use pricing_client::domain::ElectricityReading;
use rust_decimal::Decimal;
use time::OffsetDateTime;

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("failed to open CSV file: {0}")]
    Open(#[from] std::io::Error),
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: {message}")]
    Record { line: u64, message: String },
}

/// CSV source of meter readings.
///
/// Expected header columns (by name, any order):
/// - meter_id
/// - time (RFC3339 timestamp)
/// - reading (decimal)
pub struct ReadingsCsvFile {
    path: PathBuf,
}

impl ReadingsCsvFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn read_all(&self) -> Result<Vec<(String, ElectricityReading)>, SourceError> {
        let file = File::open(&self.path)?;
        read_readings(file)
    }
}

fn record_to_reading(
    record: &StringRecord,
    headers: &StringRecord,
) -> Result<(String, ElectricityReading), String> {
    let get = |name: &str| -> Result<&str, String> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .ok_or_else(|| format!("missing column '{name}' in CSV record"))
    };

    let meter_id = get("meter_id")?;
    if meter_id.is_empty() {
        return Err("empty meter_id".to_string());
    }

    let time_str = get("time")?;
    let time = OffsetDateTime::parse(time_str, &time::format_description::well_known::Rfc3339)
        .map_err(|e| format!("invalid time '{time_str}': {e}"))?;

    let reading_str = get("reading")?;
    let reading = Decimal::from_str(reading_str)
        .map_err(|e| format!("invalid reading '{reading_str}': {e}"))?;

    Ok((meter_id.to_string(), ElectricityReading::new(time, reading)))
}

/// Parse every row of a readings CSV, failing on the first malformed row.
pub fn read_readings<R: Read>(input: R) -> Result<Vec<(String, ElectricityReading)>, SourceError> {
    let mut rdr = csv::Reader::from_reader(input);
    let headers = rdr.headers()?.clone();

    let mut readings = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        match record_to_reading(&record, &headers) {
            Ok(r) => readings.push(r),
            Err(message) => {
                metrics::counter!("readings_csv_parse_errors_total").increment(1);
                return Err(SourceError::Record { line, message });
            }
        }
    }

    Ok(readings)
}
