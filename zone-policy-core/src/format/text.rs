use crate::diff::result::{Direction, Plan};

/// Format a plan as one command per line, failures last.
pub fn format_text(plan: &Plan) -> String {
    let mut lines = Vec::with_capacity(plan.commands.len() + plan.failures.len());
    lines.extend(plan.commands.iter().cloned());
    for failure in &plan.failures {
        lines.push(format!("! {failure}"));
    }
    lines.join("\n")
}

/// Format a one-line count of what the plan does.
pub fn format_summary(plan: &Plan) -> String {
    let mut apply = 0;
    let mut remove = 0;
    for change in &plan.changes {
        match change.direction {
            Direction::Apply => apply += 1,
            Direction::Remove => remove += 1,
        }
    }

    format!(
        "changes={} apply={apply} remove={remove} commands={} failures={}",
        plan.changes.len(),
        plan.commands.len(),
        plan.failures.len()
    )
}
