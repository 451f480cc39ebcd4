//! Turn field-level changes back into `set` / `delete` commands.
//!
//! Rendering is pure: the same change always yields the same text.

use thiserror::Error;

use crate::catalog::{Catalog, Field};
use crate::diff::result::{Change, Direction, FieldValue};

/// A change that could not be turned into commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A traffic rule lacks the data needed for its command.
    #[error("zone {zone}: traffic rule from '{from_zone}' is missing {missing}")]
    IncompleteRule {
        zone: String,
        from_zone: String,
        missing: &'static str,
    },
    /// A value was routed to a renderer for a different field.
    #[error("zone {zone}: {field} renderer cannot handle this value")]
    UnexpectedValue { zone: String, field: Field },
    /// The catalog has no descriptor for the field.
    #[error("no descriptor registered for field {0}")]
    UnknownField(Field),
}

/// Render one change through its field's catalog descriptor.
pub fn render_change(change: &Change) -> Result<Vec<String>, RenderError> {
    let field = change.field();
    let descriptor = Catalog::zone_policy()
        .descriptor(field)
        .ok_or(RenderError::UnknownField(field))?;
    (descriptor.render)(&change.zone, &change.value, change.direction)
}

pub(crate) fn interfaces(
    zone: &str,
    value: &FieldValue,
    direction: Direction,
) -> Result<Vec<String>, RenderError> {
    let FieldValue::Interfaces(names) = value else {
        return Err(unexpected(zone, Field::Interfaces));
    };
    Ok(names
        .iter()
        .map(|name| format!("{} interface {}", prefix(direction, zone), quote_spaced(name)))
        .collect())
}

pub(crate) fn description(
    zone: &str,
    value: &FieldValue,
    direction: Direction,
) -> Result<Vec<String>, RenderError> {
    let FieldValue::Description(text) = value else {
        return Err(unexpected(zone, Field::Description));
    };
    Ok(vec![match direction {
        Direction::Apply => format!("{} description {}", prefix(direction, zone), quote(text)),
        Direction::Remove => format!("{} description", prefix(direction, zone)),
    }])
}

pub(crate) fn default_action(
    zone: &str,
    value: &FieldValue,
    direction: Direction,
) -> Result<Vec<String>, RenderError> {
    let FieldValue::DefaultAction(action) = value else {
        return Err(unexpected(zone, Field::DefaultAction));
    };
    Ok(vec![match direction {
        Direction::Apply => format!(
            "{} default-action {}",
            prefix(direction, zone),
            quote(action.as_str())
        ),
        Direction::Remove => format!("{} default-action", prefix(direction, zone)),
    }])
}

pub(crate) fn from(
    zone: &str,
    value: &FieldValue,
    direction: Direction,
) -> Result<Vec<String>, RenderError> {
    match (value, direction) {
        (FieldValue::RemoveFrom, _) => Ok(vec![format!("{} from", prefix(Direction::Remove, zone))]),
        (FieldValue::From(rules), Direction::Remove) => Ok(rules
            .iter()
            .map(|rule| {
                format!(
                    "{} from {}",
                    prefix(direction, zone),
                    quote_spaced(&rule.from_zone)
                )
            })
            .collect()),
        (FieldValue::From(rules), Direction::Apply) => {
            // Validate every rule first so a bad rule yields no partial output.
            let mut commands = Vec::with_capacity(rules.len());
            for rule in rules {
                let afi = rule.afi.ok_or_else(|| RenderError::IncompleteRule {
                    zone: zone.to_string(),
                    from_zone: rule.from_zone.clone(),
                    missing: "afi",
                })?;
                let rule_set = rule.rule_set_name.as_deref().ok_or_else(|| {
                    RenderError::IncompleteRule {
                        zone: zone.to_string(),
                        from_zone: rule.from_zone.clone(),
                        missing: "rule_set_name",
                    }
                })?;
                commands.push(format!(
                    "{} from {} firewall {} {}",
                    prefix(direction, zone),
                    quote_spaced(&rule.from_zone),
                    afi.firewall_token(),
                    quote_spaced(rule_set)
                ));
            }
            Ok(commands)
        }
        _ => Err(unexpected(zone, Field::From)),
    }
}

pub(crate) fn local_zone(
    zone: &str,
    value: &FieldValue,
    direction: Direction,
) -> Result<Vec<String>, RenderError> {
    if *value != FieldValue::LocalZone {
        return Err(unexpected(zone, Field::LocalZone));
    }
    Ok(vec![format!("{} local-zone", prefix(direction, zone))])
}

pub(crate) fn remove_zone(
    zone: &str,
    value: &FieldValue,
    _direction: Direction,
) -> Result<Vec<String>, RenderError> {
    if *value != FieldValue::RemoveZone {
        return Err(unexpected(zone, Field::RemoveZone));
    }
    Ok(vec![prefix(Direction::Remove, zone)])
}

fn prefix(direction: Direction, zone: &str) -> String {
    let verb = match direction {
        Direction::Apply => "set",
        Direction::Remove => "delete",
    };
    format!("{verb} zone-policy zone {}", quote_spaced(zone))
}

fn unexpected(zone: &str, field: Field) -> RenderError {
    RenderError::UnexpectedValue {
        zone: zone.to_string(),
        field,
    }
}

/// Always quote free-text values.
fn quote(value: &str) -> String {
    if value.contains('\'') {
        format!("\"{value}\"")
    } else {
        format!("'{value}'")
    }
}

/// Quote identifiers only when they would not read back as one bare token.
fn quote_spaced(value: &str) -> String {
    if value
        .chars()
        .any(|c| c.is_whitespace() || c == '\'' || c == '"')
    {
        quote(value)
    } else {
        value.to_string()
    }
}
