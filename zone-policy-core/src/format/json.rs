use crate::diff::result::Plan;
use crate::facts::Facts;

/// Format a plan as JSON.
pub fn format_json(plan: &Plan) -> String {
    serde_json::to_string_pretty(plan).unwrap_or_else(|_| "{}".to_string())
}

/// Format facts as JSON under the resource key.
pub fn format_facts_json(facts: &Facts) -> String {
    serde_json::to_string_pretty(facts).unwrap_or_else(|_| "{}".to_string())
}
