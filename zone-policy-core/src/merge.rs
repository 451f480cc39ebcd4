//! Field-aware merge of device state into a want entity.
//!
//! Scalars keep the want value when present and fall back to the device
//! value otherwise. Interface lists take the union (want order first). Traffic
//! rules combine per `from_zone`, with want winning on each key.

use crate::model::{TrafficRule, Zone};

/// Fill the gaps in `want` from `have` for the same zone.
///
/// A zone marked for removal is returned untouched, and a `from` list that
/// removes the clause does not inherit device rules.
pub fn merge_zone(mut want: Zone, have: &Zone) -> Zone {
    if want.removes_zone() {
        return want;
    }

    want.default_action = want.default_action.or(have.default_action);
    if want.description.is_none() {
        want.description = have.description.clone();
    }
    want.local_zone = want.local_zone.or(have.local_zone);
    want.interfaces = union_interfaces(want.interfaces.take(), have.interfaces.as_deref());
    want.from = merge_rules(want.from.take(), have.rules());
    want
}

fn union_interfaces(want: Option<Vec<String>>, have: Option<&[String]>) -> Option<Vec<String>> {
    match (want, have) {
        (None, None) => None,
        (None, Some(have)) => Some(have.to_vec()),
        (Some(want), None) => Some(want),
        (Some(mut want), Some(have)) => {
            for name in have {
                if !want.contains(name) {
                    want.push(name.clone());
                }
            }
            Some(want)
        }
    }
}

fn merge_rules(want: Option<Vec<TrafficRule>>, have: &[TrafficRule]) -> Option<Vec<TrafficRule>> {
    let Some(mut want) = want else {
        return if have.is_empty() {
            None
        } else {
            Some(have.to_vec())
        };
    };

    if want.iter().any(TrafficRule::removes_clause) {
        return Some(want);
    }

    for rule in &mut want {
        if let Some(existing) = have.iter().find(|h| h.from_zone == rule.from_zone) {
            // A rule that only names its address family keeps the device's
            // rule set, and vice versa.
            if rule.afi.is_none() {
                rule.afi = existing.afi;
            }
            if rule.rule_set_name.is_none() {
                rule.rule_set_name = existing.rule_set_name.clone();
            }
        }
    }
    for rule in have {
        if !want.iter().any(|w| w.from_zone == rule.from_zone) {
            want.push(rule.clone());
        }
    }
    Some(want)
}
