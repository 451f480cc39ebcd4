use colored::Colorize;
use zone_policy_core::{State, Zone};

use crate::module::ModuleResult;

/// Color one command for terminal output.
fn paint(line: &str) -> String {
    if line.starts_with("set ") {
        line.green().to_string()
    } else if line.starts_with("delete ") {
        line.red().to_string()
    } else {
        line.to_string()
    }
}

/// Render commands for terminal output.
pub fn render_commands(commands: &[String]) -> String {
    commands
        .iter()
        .map(|line| paint(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render render failures, one per line.
pub fn render_failures(failures: &[String]) -> String {
    failures
        .iter()
        .map(|failure| format!("! {failure}").magenta().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the one-line run summary.
pub fn render_summary(state: State, result: &ModuleResult) -> String {
    let mut line = format!(
        "state={} changed={} commands={} failures={}",
        state,
        result.changed,
        result.command_lines().len(),
        result.failures.len()
    );
    if let Some(facts) = result.facts() {
        line.push_str(&format!(" zones={}", facts.len()));
    }
    line.cyan().to_string()
}

/// Render a module result as text.
pub fn render_result(state: State, result: &ModuleResult) -> String {
    let mut sections = Vec::new();

    if let Some(facts) = result.facts() {
        sections.push(render_tree(facts));
    } else if !result.command_lines().is_empty() {
        sections.push(render_commands(result.command_lines()));
    }
    if !result.failures.is_empty() {
        sections.push(render_failures(&result.failures));
    }
    sections.push(render_summary(state, result));

    sections
        .into_iter()
        .filter(|section| !section.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render zone facts as an indented tree.
pub fn render_tree(zones: &[Zone]) -> String {
    let mut out = vec!["firewall_zones".to_string()];

    for zone in zones {
        out.push(format!("  {}", zone.name.bold()));
        if let Some(action) = zone.default_action {
            out.push(format!("    default_action: {action}"));
        }
        if let Some(description) = &zone.description {
            out.push(format!("    description: {description}"));
        }
        if zone.is_local() {
            out.push("    local_zone: true".to_string());
        }
        if !zone.interface_list().is_empty() {
            out.push(format!("    interfaces: {}", zone.interface_list().join(", ")));
        }
        if !zone.rules().is_empty() {
            out.push("    from:".to_string());
            for rule in zone.rules() {
                let afi = rule.afi.map(|afi| afi.firewall_token()).unwrap_or("?");
                let rule_set = rule.rule_set_name.as_deref().unwrap_or("?");
                out.push(format!("      {} firewall {afi} {rule_set}", rule.from_zone));
            }
        }
    }

    out.join("\n")
}
