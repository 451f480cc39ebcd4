//! Fact tree construction from parser output.

use serde::Serialize;

use crate::model::{TrafficRule, Zone};
use crate::parser;

/// Resource key the fact tree is published under.
pub const RESOURCE: &str = "firewall_zones";

/// Device command whose output the parser expects.
pub const SHOW_COMMAND: &str = "show configuration commands | match zone-policy";

/// Externally visible facts for the resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facts {
    pub firewall_zones: Vec<Zone>,
}

impl Facts {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self {
            firewall_zones: zones,
        }
    }
}

/// Parse device text and normalize it into facts.
pub fn gather(text: &str) -> Vec<Zone> {
    normalize(parser::parse(text))
}

/// Strip empty values and directives; drop zones left with nothing but a name.
pub fn normalize(zones: Vec<Zone>) -> Vec<Zone> {
    zones
        .into_iter()
        .map(normalize_zone)
        .filter(|zone| !zone.is_empty())
        .collect()
}

fn normalize_zone(mut zone: Zone) -> Zone {
    zone.remove_zone = None;
    if zone.description.as_deref().is_some_and(str::is_empty) {
        zone.description = None;
    }
    if !zone.is_local() {
        zone.local_zone = None;
    }

    zone.interfaces = zone.interfaces.take().and_then(|names| {
        let mut unique: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if !name.is_empty() && !unique.contains(&name) {
                unique.push(name);
            }
        }
        (!unique.is_empty()).then_some(unique)
    });

    zone.from = zone.from.take().and_then(|rules| {
        let rules: Vec<TrafficRule> = rules
            .into_iter()
            .map(|rule| TrafficRule {
                remove_from: None,
                ..rule
            })
            .collect();
        (!rules.is_empty()).then_some(rules)
    });
    zone
}
