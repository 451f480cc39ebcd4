use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Field};
use crate::diff::result::{Change, FieldValue, Plan};
use crate::model::{find_zone, TrafficRule, Zone};
use crate::render::render_change;
use crate::state::State;

/// Reconcile `want` against `have` under `state` and render the result.
///
/// Retired zones come first, then zones in want order, fields in catalog
/// order. A change that fails to render is reported in
/// [`Plan::failures`] and contributes no commands.
pub fn reconcile(want: Vec<Zone>, have: Vec<Zone>, state: State) -> Plan {
    let policy = state.policy();
    let prepared = (policy.prepare)(want, have);

    let mut changes = Vec::new();
    if let Some(compare) = policy.compare {
        for name in &prepared.retired {
            debug!(zone = %name, "retiring zone absent from want");
            changes.push(Change::remove(name.clone(), FieldValue::RemoveZone));
        }

        let absent = Zone::default();
        for want in &prepared.want {
            let have = find_zone(&prepared.have, &want.name).unwrap_or(&absent);
            compare(want, have, &mut changes);
        }
    }

    let plan = render_plan(changes);
    info!(
        %state,
        changes = plan.changes.len(),
        commands = plan.commands.len(),
        failures = plan.failures.len(),
        "reconciled"
    );
    plan
}

/// Render changes in order, keeping only those that rendered cleanly.
pub fn render_plan(changes: Vec<Change>) -> Plan {
    let mut plan = Plan::default();
    for change in changes {
        match render_change(&change) {
            Ok(commands) => {
                plan.commands.extend(commands);
                plan.changes.push(change);
            }
            Err(err) => {
                warn!(zone = %change.zone, field = %change.field(), "{err}");
                plan.failures.push(err);
            }
        }
    }
    plan
}

/// Shared comparison for merged, replaced, overridden, and rendered.
///
/// Values in want that differ from the device are applied; values on the
/// device that want leaves out are removed. Merged runs this after filling
/// want from the device, so nothing is removed there unless asked for.
pub fn compare(want: &Zone, have: &Zone, out: &mut Vec<Change>) {
    if want.removes_zone() {
        if exists(have) {
            out.push(Change::remove(&want.name, FieldValue::RemoveZone));
        }
        return;
    }

    let zone = want.name.as_str();
    for field in Catalog::zone_policy().fields() {
        match field {
            Field::Interfaces => {
                let (added, removed) = membership(want.interface_list(), have.interface_list());
                if !removed.is_empty() {
                    debug!(zone, ?removed, "interfaces to remove");
                    out.push(Change::remove(zone, FieldValue::Interfaces(removed)));
                }
                if !added.is_empty() {
                    debug!(zone, ?added, "interfaces to add");
                    out.push(Change::apply(zone, FieldValue::Interfaces(added)));
                }
            }
            Field::Description => match (&want.description, &have.description) {
                (Some(w), Some(h)) if w == h => {}
                (Some(w), _) => out.push(Change::apply(zone, FieldValue::Description(w.clone()))),
                (None, Some(h)) => {
                    out.push(Change::remove(zone, FieldValue::Description(h.clone())))
                }
                (None, None) => {}
            },
            Field::DefaultAction => match (want.default_action, have.default_action) {
                (Some(w), Some(h)) if w == h => {}
                (Some(w), _) => out.push(Change::apply(zone, FieldValue::DefaultAction(w))),
                (None, Some(h)) => out.push(Change::remove(zone, FieldValue::DefaultAction(h))),
                (None, None) => {}
            },
            Field::From => compare_rules(zone, want.rules(), have.rules(), out),
            Field::LocalZone => match (want.is_local(), have.is_local()) {
                (true, false) => out.push(Change::apply(zone, FieldValue::LocalZone)),
                (false, true) => out.push(Change::remove(zone, FieldValue::LocalZone)),
                _ => {}
            },
            Field::RemoveZone => {}
        }
    }
}

fn compare_rules(zone: &str, want: &[TrafficRule], have: &[TrafficRule], out: &mut Vec<Change>) {
    let baseline: &[TrafficRule] = if want.iter().any(TrafficRule::removes_clause) {
        if !have.is_empty() {
            out.push(Change::remove(zone, FieldValue::RemoveFrom));
        }
        &[]
    } else {
        have
    };
    let want: Vec<&TrafficRule> = want.iter().filter(|r| !r.removes_clause()).collect();

    // A peer whose address family changes must be cleared before it is set
    // again, or the old binding stays behind. The old binding is kept when
    // its replacement cannot render.
    let stale: Vec<TrafficRule> = baseline
        .iter()
        .filter(|h| match want.iter().find(|w| w.from_zone == h.from_zone) {
            None => true,
            Some(w) => w.is_complete() && w.afi != h.afi,
        })
        .cloned()
        .collect();
    if !stale.is_empty() {
        out.push(Change::remove(zone, FieldValue::From(stale.clone())));
    }

    let pending: Vec<TrafficRule> = want
        .into_iter()
        .filter(|w| {
            let current = baseline
                .iter()
                .find(|h| h.from_zone == w.from_zone)
                .filter(|h| !stale.iter().any(|s| s.from_zone == h.from_zone));
            !current.is_some_and(|h| h.same_binding(w))
        })
        .map(|w| TrafficRule {
            remove_from: None,
            ..w.clone()
        })
        .collect();
    if !pending.is_empty() {
        out.push(Change::apply(zone, FieldValue::From(pending)));
    }
}

/// Comparison for the deleted state.
///
/// Every field want names is removed if the device has it; fields the device
/// lacks are skipped so repeated runs converge to no commands.
pub fn compare_deleted(want: &Zone, have: &Zone, out: &mut Vec<Change>) {
    if !exists(have) {
        debug!(zone = %want.name, "nothing on the device to delete");
        return;
    }
    let zone = want.name.as_str();
    if want.removes_zone() {
        out.push(Change::remove(zone, FieldValue::RemoveZone));
        return;
    }

    for field in Catalog::zone_policy().fields() {
        match field {
            Field::Interfaces => {
                if let Some(named) = &want.interfaces {
                    let mut present: Vec<String> = Vec::new();
                    for name in named {
                        if have.interface_list().contains(name) && !present.contains(name) {
                            present.push(name.clone());
                        }
                    }
                    if !present.is_empty() {
                        out.push(Change::remove(zone, FieldValue::Interfaces(present)));
                    }
                }
            }
            Field::Description => {
                if let (Some(_), Some(current)) = (&want.description, &have.description) {
                    out.push(Change::remove(zone, FieldValue::Description(current.clone())));
                }
            }
            Field::DefaultAction => {
                if let (Some(_), Some(current)) = (want.default_action, have.default_action) {
                    out.push(Change::remove(zone, FieldValue::DefaultAction(current)));
                }
            }
            Field::From => {
                if let Some(named) = &want.from {
                    if named.iter().any(TrafficRule::removes_clause) {
                        if !have.rules().is_empty() {
                            out.push(Change::remove(zone, FieldValue::RemoveFrom));
                        }
                    } else {
                        let present: Vec<TrafficRule> = named
                            .iter()
                            .filter_map(|rule| have.rule(&rule.from_zone).cloned())
                            .collect();
                        if !present.is_empty() {
                            out.push(Change::remove(zone, FieldValue::From(present)));
                        }
                    }
                }
            }
            Field::LocalZone => {
                // `false` against an unset flag is already satisfied.
                if want.local_zone.is_some() && have.is_local() {
                    out.push(Change::remove(zone, FieldValue::LocalZone));
                }
            }
            Field::RemoveZone => {}
        }
    }
}

fn exists(zone: &Zone) -> bool {
    !zone.name.is_empty()
}

/// Members of `want` missing from `have`, and members of `have` missing from
/// `want`, each in its own list's order.
fn membership(want: &[String], have: &[String]) -> (Vec<String>, Vec<String>) {
    let mut added: Vec<String> = Vec::new();
    for name in want {
        if !have.contains(name) && !added.contains(name) {
            added.push(name.clone());
        }
    }
    let removed = have
        .iter()
        .filter(|name| !want.contains(name))
        .cloned()
        .collect();
    (added, removed)
}
