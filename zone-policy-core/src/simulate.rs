//! Predict device state after a change list runs.

use crate::diff::result::{Change, Direction, FieldValue};
use crate::facts::normalize;
use crate::model::{TrafficRule, Zone};

/// Apply `changes` in order to a copy of `have`.
///
/// The result is normalized the same way gathered facts are, so zones
/// emptied by deletions disappear.
pub fn simulate(have: &[Zone], changes: &[Change]) -> Vec<Zone> {
    let mut zones = have.to_vec();

    for change in changes {
        if change.value == FieldValue::RemoveZone {
            zones.retain(|zone| zone.name != change.zone);
            continue;
        }

        let index = match zones.iter().position(|zone| zone.name == change.zone) {
            Some(index) => index,
            None if change.direction == Direction::Remove => continue,
            None => {
                zones.push(Zone::new(change.zone.clone()));
                zones.len() - 1
            }
        };
        apply_change(&mut zones[index], change);
    }

    normalize(zones)
}

fn apply_change(zone: &mut Zone, change: &Change) {
    match (&change.value, change.direction) {
        (FieldValue::Interfaces(names), Direction::Apply) => {
            let interfaces = zone.interfaces.get_or_insert_with(Vec::new);
            for name in names {
                if !interfaces.contains(name) {
                    interfaces.push(name.clone());
                }
            }
        }
        (FieldValue::Interfaces(names), Direction::Remove) => {
            if let Some(interfaces) = zone.interfaces.as_mut() {
                interfaces.retain(|name| !names.contains(name));
            }
        }
        (FieldValue::Description(text), Direction::Apply) => {
            zone.description = Some(text.clone());
        }
        (FieldValue::Description(_), Direction::Remove) => zone.description = None,
        (FieldValue::DefaultAction(action), Direction::Apply) => {
            zone.default_action = Some(*action);
        }
        (FieldValue::DefaultAction(_), Direction::Remove) => zone.default_action = None,
        (FieldValue::From(rules), Direction::Apply) => {
            let current = zone.from.get_or_insert_with(Vec::new);
            for rule in rules {
                let rule = TrafficRule {
                    remove_from: None,
                    ..rule.clone()
                };
                match current.iter_mut().find(|r| r.from_zone == rule.from_zone) {
                    Some(existing) => *existing = rule,
                    None => current.push(rule),
                }
            }
        }
        (FieldValue::From(rules), Direction::Remove) => {
            if let Some(current) = zone.from.as_mut() {
                current.retain(|r| !rules.iter().any(|gone| gone.from_zone == r.from_zone));
            }
        }
        (FieldValue::RemoveFrom, _) => zone.from = None,
        (FieldValue::LocalZone, Direction::Apply) => zone.local_zone = Some(true),
        (FieldValue::LocalZone, Direction::Remove) => zone.local_zone = None,
        (FieldValue::RemoveZone, _) => {}
    }
}
