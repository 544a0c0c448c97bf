use std::{collections::HashMap, fs, path::PathBuf};

use pricing_client::{
    domain::{PricePlan, PricePlans},
    store::InMemoryAccounts,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ReadingsConfig {
    pub csv_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub price_plans: Vec<PricePlan>,
    /// smart meter id -> price plan id
    #[serde(default)]
    pub accounts: HashMap<String, String>,
    pub readings: Option<ReadingsConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("PRICING_CONFIG").unwrap_or_else(|_| "pricing-config.toml".to_string());
        let contents = fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read config '{path}': {e}"))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        Ok(cfg)
    }

    pub fn price_plans(&self) -> anyhow::Result<PricePlans> {
        Ok(PricePlans::new(self.price_plans.clone())?)
    }

    pub fn accounts(&self) -> InMemoryAccounts {
        InMemoryAccounts::new(self.accounts.clone())
    }

    pub fn readings_csv_path(&self) -> Option<&PathBuf> {
        self.readings.as_ref().and_then(|r| r.csv_path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricing_client::store::PlanAssignments;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = r#"
        [[price_plans]]
        name = "price-plan-0"
        supplier = "Dr Evil's Dark Energy"
        unit_rate = "10"

        [[price_plans]]
        name = "price-plan-1"
        unit_rate = "0.2"

        [accounts]
        smart-meter-0 = "price-plan-0"
        smart-meter-1 = "price-plan-1"

        [readings]
        csv_path = "readings.csv"
    "#;

    #[test]
    fn parses_plans_accounts_and_readings() {
        let cfg = AppConfig::from_toml_str(SAMPLE).unwrap();

        let plans = cfg.price_plans().unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans.find("price-plan-1").map(|p| p.unit_rate), Some(dec!(0.2)));
        assert_eq!(
            plans.find("price-plan-0").and_then(|p| p.supplier.as_deref()),
            Some("Dr Evil's Dark Energy")
        );

        assert_eq!(cfg.accounts().plan_id_for_meter("smart-meter-1").as_deref(), Some("price-plan-1"));
        assert_eq!(cfg.readings_csv_path(), Some(&PathBuf::from("readings.csv")));
    }

    #[test]
    fn accounts_and_readings_are_optional() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [[price_plans]]
            name = "standard"
            unit_rate = "1"
            "#,
        )
        .unwrap();

        assert!(cfg.accounts.is_empty());
        assert!(cfg.readings_csv_path().is_none());
    }

    #[test]
    fn duplicate_plans_fail_registry_construction() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [[price_plans]]
            name = "standard"
            unit_rate = "1"

            [[price_plans]]
            name = "Standard"
            unit_rate = "2"
            "#,
        )
        .unwrap();

        assert!(cfg.price_plans().is_err());
    }
}
