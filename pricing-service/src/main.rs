use anyhow::{bail, Result};
use pricing_client::store::{InMemoryMeterReadings, PlanAssignments};
use pricing_service::{
    calculator::{CostCalculator, CostError},
    config::AppConfig,
    observability,
    sources::ReadingsCsvFile,
    transform,
};
use serde::Serialize;
use std::env;

const USAGE: &str = "usage: pricing-service <compare|last-week|recommend> <smart_meter_id> [limit]";

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(err: CostError) -> Result<()> {
    print_json(&serde_json::json!({
        "error": err.to_string(),
        "no_data": err.is_no_data(),
    }))?;
    bail!(err)
}

fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        bail!(USAGE);
    }
    let (command, meter_id) = (args[1].as_str(), args[2].as_str());
    let limit = match args.get(3) {
        Some(raw) => Some(
            raw.parse::<usize>()
                .map_err(|e| anyhow::anyhow!("invalid limit '{raw}': {e}"))?,
        ),
        None => None,
    };

    // Load configuration
    let cfg = AppConfig::load()?;
    let plans = cfg.price_plans()?;
    if plans.is_empty() {
        bail!("no price plans configured");
    }
    let accounts = cfg.accounts();

    let readings = InMemoryMeterReadings::new();
    if let Some(path) = cfg.readings_csv_path() {
        let rows = ReadingsCsvFile::new(path).read_all()?;
        let summary = transform::load_readings(&readings, rows);
        tracing::info!(
            path = %path.display(),
            accepted = summary.accepted,
            rejected = summary.rejected,
            meters = summary.meters,
            "loaded meter readings"
        );
    }
    tracing::info!(plans = plans.len(), "price plans configured");

    let calculator = CostCalculator::new(&plans, &readings, &accounts);

    match command {
        "compare" => match calculator.cost_for_all_plans(meter_id) {
            Ok(costs) => print_json(&serde_json::json!({
                "smart_meter_id": meter_id,
                "price_plan_comparisons": costs,
                "assigned_price_plan": accounts.plan_id_for_meter(meter_id),
            })),
            Err(e) => report(e),
        },
        "last-week" => match calculator.cost_for_last_week(meter_id) {
            Ok(cost) => print_json(&serde_json::json!({
                "smart_meter_id": meter_id,
                "cost": cost,
            })),
            Err(e) => report(e),
        },
        "recommend" => match calculator.recommend(meter_id, limit) {
            Ok(ranked) => print_json(&ranked),
            Err(e) => report(e),
        },
        other => bail!("unknown command '{other}'\n{USAGE}"),
    }
}
