use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use zone_policy_core::{
    gather, reconcile, simulate, want_from_json, want_from_toml, Afi, RenderError, State,
    TrafficRule, Zone,
};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn read(path: &str) -> String {
    fs::read_to_string(fixture(path)).expect("fixture readable")
}

fn have() -> Vec<Zone> {
    gather(&read("fixtures/running_config.txt"))
}

fn zone(name: &str) -> Zone {
    Zone::new(name)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn merged_into_new_zone_renders_in_want_then_catalog_order() {
    let have = vec![Zone {
        interfaces: Some(strings(&["eth1"])),
        ..zone("zone1")
    }];
    let want = vec![Zone {
        interfaces: Some(strings(&["eth2", "eth3"])),
        description: Some("z2".to_string()),
        ..zone("zone2")
    }];

    let plan = reconcile(want, have, State::Merged);
    assert_eq!(
        plan.commands,
        vec![
            "set zone-policy zone zone2 interface eth2",
            "set zone-policy zone zone2 interface eth3",
            "set zone-policy zone zone2 description 'z2'",
        ]
    );
}

#[test]
fn deleted_remove_from_is_one_clause_delete() {
    let have = vec![Zone {
        interfaces: Some(strings(&["eth1"])),
        from: Some(vec![TrafficRule::new("z0", Afi::Ipv4, "R")]),
        ..zone("z1")
    }];
    let want = vec![Zone {
        from: Some(vec![TrafficRule {
            from_zone: "z0".to_string(),
            remove_from: Some(true),
            ..TrafficRule::default()
        }]),
        ..zone("z1")
    }];

    let plan = reconcile(want, have, State::Deleted);
    assert_eq!(plan.commands, vec!["delete zone-policy zone z1 from"]);
}

#[test]
fn merged_fixture() {
    let want = want_from_json(&read("fixtures/want_merged.json")).expect("want");
    let plan = reconcile(want, have(), State::Merged);
    assert_eq!(
        plan.commands,
        vec![
            "set zone-policy zone LAN interface eth3",
            "set zone-policy zone LAN description 'trusted clients'",
            "set zone-policy zone GUEST interface eth4",
            "set zone-policy zone GUEST default-action 'reject'",
            "set zone-policy zone GUEST from WAN firewall name WAN-GUEST",
        ]
    );
    assert!(plan.failures.is_empty());
}

#[test]
fn merged_preserves_untouched_fields() {
    let have = vec![Zone {
        description: Some("x".to_string()),
        interfaces: Some(strings(&["eth1"])),
        ..zone("z1")
    }];
    let want = vec![Zone {
        interfaces: Some(strings(&["eth5"])),
        ..zone("z1")
    }];

    let plan = reconcile(want, have.clone(), State::Merged);
    assert!(plan.commands.iter().all(|c| !c.contains("description")));
    assert_eq!(plan.commands, vec!["set zone-policy zone z1 interface eth5"]);

    let after = simulate(&have, &plan.changes);
    assert_eq!(after[0].description.as_deref(), Some("x"));
    assert_eq!(after[0].interface_list(), ["eth1", "eth5"]);
}

#[test]
fn replaced_removes_what_want_leaves_out() {
    let want = vec![Zone {
        interfaces: Some(strings(&["eth2"])),
        ..zone("DMZ")
    }];
    let plan = reconcile(want, have(), State::Replaced);
    assert_eq!(
        plan.commands,
        vec![
            "delete zone-policy zone DMZ description",
            "delete zone-policy zone DMZ default-action",
            "delete zone-policy zone DMZ from LAN",
            "delete zone-policy zone DMZ from WAN",
        ]
    );
}

#[test]
fn replaced_leaves_unlisted_zones_alone() {
    let want = vec![Zone {
        default_action: Some(zone_policy_core::DefaultAction::Reject),
        interfaces: Some(strings(&["eth0"])),
        ..zone("WAN")
    }];
    let plan = reconcile(want, have(), State::Replaced);
    assert_eq!(
        plan.commands,
        vec!["set zone-policy zone WAN default-action 'reject'"]
    );
}

#[test]
fn overridden_fixture() {
    let want = want_from_toml(&read("fixtures/want_overridden.toml")).expect("want");
    let plan = reconcile(want, have(), State::Overridden);
    assert_eq!(
        plan.commands,
        vec![
            "delete zone-policy zone DMZ",
            "delete zone-policy zone LOCAL",
            "delete zone-policy zone LAN interface eth1.20",
            "delete zone-policy zone LAN from WAN",
        ]
    );
}

#[test]
fn overridden_removes_each_orphan_with_one_command() {
    let plan = reconcile(vec![zone("WAN")], have(), State::Overridden);
    for orphan in ["DMZ", "LAN", "LOCAL"] {
        let touching: Vec<&String> = plan
            .commands
            .iter()
            .filter(|c| c.starts_with(&format!("delete zone-policy zone {orphan}")))
            .collect();
        assert_eq!(touching, vec![&format!("delete zone-policy zone {orphan}")]);
    }
}

#[test]
fn deleted_fixture_then_rerun_is_empty() {
    let want = want_from_json(&read("fixtures/want_deleted.json")).expect("want");
    let before = have();
    let plan = reconcile(want.clone(), before.clone(), State::Deleted);
    assert_eq!(
        plan.commands,
        vec![
            "delete zone-policy zone DMZ description",
            "delete zone-policy zone DMZ from",
            "delete zone-policy zone LAN interface eth1.20",
        ]
    );

    let after = simulate(&before, &plan.changes);
    let again = reconcile(want, after, State::Deleted);
    assert!(again.commands.is_empty(), "{:?}", again.commands);
}

#[test]
fn deleted_with_empty_want_removes_every_zone() {
    let plan = reconcile(Vec::new(), have(), State::Deleted);
    assert_eq!(
        plan.commands,
        vec![
            "delete zone-policy zone DMZ",
            "delete zone-policy zone LAN",
            "delete zone-policy zone LOCAL",
            "delete zone-policy zone WAN",
        ]
    );
    assert!(simulate(&have(), &plan.changes).is_empty());
}

#[test]
fn deleted_names_fields_not_values() {
    let want = vec![Zone {
        default_action: Some(zone_policy_core::DefaultAction::Reject),
        local_zone: Some(false),
        ..zone("LOCAL")
    }];
    let plan = reconcile(want, have(), State::Deleted);
    assert_eq!(
        plan.commands,
        vec![
            "delete zone-policy zone LOCAL default-action",
            "delete zone-policy zone LOCAL local-zone",
        ]
    );
}

#[test]
fn gathered_and_parsed_produce_no_commands() {
    for state in [State::Gathered, State::Parsed] {
        let plan = reconcile(vec![zone("LAN")], have(), state);
        assert!(plan.commands.is_empty());
        assert!(plan.changes.is_empty());
    }
}

#[test]
fn rendered_ignores_device_and_scopes_failures() {
    let want = vec![
        Zone {
            description: Some("new".to_string()),
            from: Some(vec![
                TrafficRule::new("WAN", Afi::Ipv4, "WAN-LAN"),
                TrafficRule {
                    from_zone: "DMZ".to_string(),
                    afi: Some(Afi::Ipv4),
                    ..TrafficRule::default()
                },
            ]),
            local_zone: Some(true),
            ..zone("LAN")
        },
        Zone {
            interfaces: Some(strings(&["eth0"])),
            ..zone("WAN")
        },
    ];

    let plan = reconcile(want, have(), State::Rendered);
    assert_eq!(
        plan.commands,
        vec![
            "set zone-policy zone LAN description 'new'",
            "set zone-policy zone LAN local-zone",
            "set zone-policy zone WAN interface eth0",
        ]
    );
    assert_eq!(
        plan.failures,
        vec![RenderError::IncompleteRule {
            zone: "LAN".to_string(),
            from_zone: "DMZ".to_string(),
            missing: "rule_set_name",
        }]
    );
}

#[test]
fn reconciliation_is_deterministic() {
    let want = want_from_json(&read("fixtures/want_merged.json")).expect("want");
    for state in [State::Merged, State::Replaced, State::Overridden, State::Deleted] {
        let first = reconcile(want.clone(), have(), state);
        let second = reconcile(want.clone(), have(), state);
        assert_eq!(first, second, "state {state}");
    }
}

#[test]
fn applying_a_replace_converges() {
    let want = want_from_toml(&read("fixtures/want_overridden.toml")).expect("want");
    let before = have();
    let plan = reconcile(want.clone(), before.clone(), State::Overridden);
    let after = simulate(&before, &plan.changes);
    assert_eq!(after, want);
    assert!(reconcile(want, after, State::Overridden).commands.is_empty());
}
