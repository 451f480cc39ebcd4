//! Want document loading and schema checks.
//!
//! Every check runs before reconciliation; a document that fails any of them
//! is rejected as a whole.

use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

use crate::model::Zone;

/// A want document that does not fit the zone schema.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Document root was not a list of zones.
    #[error("config must be a list of zones, found {0}")]
    NotAList(&'static str),
    /// An entry did not deserialize into a zone.
    #[error("config[{index}]: {source}")]
    Entry {
        index: usize,
        source: serde_json::Error,
    },
    /// An entry lacks its identity.
    #[error("config[{index}]: zone name must not be empty")]
    MissingName { index: usize },
    /// Two entries share a zone name.
    #[error("zone '{0}' is declared more than once")]
    DuplicateZone(String),
    /// A traffic rule lacks its peer zone.
    #[error("zone '{zone}': traffic rule without from_zone")]
    MissingRuleKey { zone: String },
    /// Two traffic rules in one zone share a peer zone.
    #[error("zone '{zone}': traffic from '{from_zone}' is declared more than once")]
    DuplicateRule { zone: String, from_zone: String },
    /// A value mixes both quote characters and cannot be written as one token.
    #[error("zone '{zone}': {field} '{value}' contains both ' and \"")]
    Unquotable {
        zone: String,
        field: &'static str,
        value: String,
    },
    /// Document text was not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[source] serde_json::Error),
    /// Document text was not valid TOML.
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Validate a JSON-shaped want document: a list of zone records.
pub fn want_from_value(value: Value) -> Result<Vec<Zone>, ValidationError> {
    let entries = match value {
        Value::Array(entries) => entries,
        other => return Err(ValidationError::NotAList(kind(&other))),
    };

    let zones = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let zone: Zone = serde_json::from_value(entry)
                .map_err(|source| ValidationError::Entry { index, source })?;
            if zone.name.trim().is_empty() {
                return Err(ValidationError::MissingName { index });
            }
            Ok(zone)
        })
        .collect::<Result<Vec<_>, _>>()?;

    check_identities(&zones)?;
    Ok(zones)
}

/// Parse a JSON want document. Accepts a bare list or `{"config": [...]}`.
pub fn want_from_json(text: &str) -> Result<Vec<Zone>, ValidationError> {
    let value: Value = serde_json::from_str(text).map_err(ValidationError::Json)?;
    want_from_value(unwrap_config(value))
}

/// Parse a TOML want document with a top-level `config` array of tables.
pub fn want_from_toml(text: &str) -> Result<Vec<Zone>, ValidationError> {
    let table: toml::Table = toml::from_str(text)?;
    let value = serde_json::to_value(table).map_err(ValidationError::Json)?;
    want_from_value(unwrap_config(value))
}

/// Zone names unique per document, rule peers unique per zone, and every
/// value writable as a single command token.
pub fn check_identities(zones: &[Zone]) -> Result<(), ValidationError> {
    let mut names = HashSet::new();
    for zone in zones {
        check_quotable(zone)?;
        if !names.insert(zone.name.as_str()) {
            return Err(ValidationError::DuplicateZone(zone.name.clone()));
        }

        let mut peers = HashSet::new();
        for rule in zone.rules() {
            if rule.from_zone.trim().is_empty() {
                return Err(ValidationError::MissingRuleKey {
                    zone: zone.name.clone(),
                });
            }
            if !peers.insert(rule.from_zone.as_str()) {
                return Err(ValidationError::DuplicateRule {
                    zone: zone.name.clone(),
                    from_zone: rule.from_zone.clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_quotable(zone: &Zone) -> Result<(), ValidationError> {
    let mut values: Vec<(&'static str, &String)> = vec![("name", &zone.name)];
    if let Some(description) = &zone.description {
        values.push(("description", description));
    }
    values.extend(zone.interface_list().iter().map(|name| ("interfaces", name)));
    for rule in zone.rules() {
        values.push(("from_zone", &rule.from_zone));
        if let Some(rule_set) = &rule.rule_set_name {
            values.push(("rule_set_name", rule_set));
        }
    }

    for (field, value) in values {
        if value.contains('\'') && value.contains('"') {
            return Err(ValidationError::Unquotable {
                zone: zone.name.clone(),
                field,
                value: value.clone(),
            });
        }
    }
    Ok(())
}

fn unwrap_config(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("config") => {
            map.remove("config").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
