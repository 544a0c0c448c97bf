use std::collections::HashMap;

/// Maps a smart meter to the identifier of its assigned price plan.
pub trait PlanAssignments: Send + Sync {
    fn plan_id_for_meter(&self, meter_id: &str) -> Option<String>;
}

/// Immutable meter -> plan id mapping loaded once at start-up.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccounts {
    plan_ids: HashMap<String, String>,
}

impl InMemoryAccounts {
    pub fn new(plan_ids: HashMap<String, String>) -> Self {
        Self { plan_ids }
    }
}

impl FromIterator<(String, String)> for InMemoryAccounts {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl PlanAssignments for InMemoryAccounts {
    fn plan_id_for_meter(&self, meter_id: &str) -> Option<String> {
        self.plan_ids.get(meter_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_assigned_plan() {
        let accounts: InMemoryAccounts = [("smart-meter-0".to_string(), "price-plan-0".to_string())]
            .into_iter()
            .collect();

        assert_eq!(accounts.plan_id_for_meter("smart-meter-0").as_deref(), Some("price-plan-0"));
        assert_eq!(accounts.plan_id_for_meter("smart-meter-1"), None);
    }
}
