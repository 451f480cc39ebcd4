//! Field descriptors for the `zone-policy` configuration tree.
//!
//! Each descriptor pairs a line matcher with the field it populates, the
//! field's multiplicity, and the function that renders changes to that field
//! back into commands. Catalog order is the order fields are compared and
//! emitted in.

use std::fmt::{self, Display, Formatter};
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::Serialize;
use tracing::warn;

use crate::diff::result::{Direction, FieldValue};
use crate::model::{Afi, DefaultAction, TrafficRule, Zone};
use crate::render::{self, RenderError};

/// Logical zone attribute a descriptor manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Interfaces,
    Description,
    DefaultAction,
    From,
    LocalZone,
    RemoveZone,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Interfaces => "interfaces",
            Field::Description => "description",
            Field::DefaultAction => "default_action",
            Field::From => "from",
            Field::LocalZone => "local_zone",
            Field::RemoveZone => "remove_zone",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multiplicity of a field, which decides how captures and merges combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single value; later captures overwrite.
    Scalar,
    /// Presence-only flag.
    Flag,
    /// Ordered list with set membership semantics when compared.
    OrderedList,
    /// Records identified by the named key; merges combine per key.
    KeyedCollection { key: &'static str },
    /// Transient instruction, never stored in facts.
    Directive,
}

/// Renders one field-level change for a zone.
pub type RenderFn = fn(&str, &FieldValue, Direction) -> Result<Vec<String>, RenderError>;

/// Value extracted from a single matched line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    Interface(String),
    Description(String),
    DefaultAction(DefaultAction),
    Rule(TrafficRule),
    LocalZone,
    RemoveZone,
}

impl Capture {
    /// True for captures whose value is an empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            Capture::Interface(value) | Capture::Description(value) => value.is_empty(),
            _ => false,
        }
    }

    /// Fold this capture into the zone it belongs to.
    ///
    /// List members are deduplicated and rules merge on `from_zone`.
    pub fn merge_into(self, zone: &mut Zone) {
        match self {
            Capture::Interface(name) => {
                let interfaces = zone.interfaces.get_or_insert_with(Vec::new);
                if !interfaces.contains(&name) {
                    interfaces.push(name);
                }
            }
            Capture::Description(text) => zone.description = Some(text),
            Capture::DefaultAction(action) => zone.default_action = Some(action),
            Capture::Rule(rule) => {
                let rules = zone.from.get_or_insert_with(Vec::new);
                match rules.iter_mut().find(|r| r.from_zone == rule.from_zone) {
                    Some(existing) => {
                        if let (Some(old), Some(new)) = (existing.afi, rule.afi) {
                            if old != new {
                                warn!(
                                    zone = %zone.name,
                                    from_zone = %rule.from_zone,
                                    dropped = old.firewall_token(),
                                    kept = new.firewall_token(),
                                    "peer bound under two address families; keeping the later one"
                                );
                            }
                        }
                        if rule.afi.is_some() {
                            existing.afi = rule.afi;
                        }
                        if rule.rule_set_name.is_some() {
                            existing.rule_set_name = rule.rule_set_name;
                        }
                    }
                    None => rules.push(rule),
                }
            }
            Capture::LocalZone => zone.local_zone = Some(true),
            // Retirement is the parser's business; there is nothing to store.
            Capture::RemoveZone => {}
        }
    }
}

/// A matched line: the zone it names and the value it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    pub zone: String,
    pub field: Field,
    pub shared: bool,
    pub capture: Capture,
}

/// One entry of the catalog.
pub struct FieldDescriptor {
    pub field: Field,
    pub kind: FieldKind,
    /// A shared descriptor always establishes its zone, even if nothing else
    /// about the zone is known yet.
    pub shared: bool,
    pub render: RenderFn,
    matcher: Regex,
    extract: fn(&Captures<'_>) -> Option<Capture>,
}

impl FieldDescriptor {
    /// Match one configuration line.
    ///
    /// A line of the right shape whose captures do not convert (for example an
    /// unknown address-family token) does not match.
    pub fn match_line(&self, line: &str) -> Option<LineMatch> {
        let caps = self.matcher.captures(line)?;
        let zone = caps.name("name").map(|m| unquote(m.as_str()))?;
        let capture = (self.extract)(&caps)?;
        Some(LineMatch {
            zone,
            field: self.field,
            shared: self.shared,
            capture,
        })
    }

    pub fn pattern(&self) -> &str {
        self.matcher.as_str()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("field", &self.field)
            .field("kind", &self.kind)
            .field("shared", &self.shared)
            .field("pattern", &self.matcher.as_str())
            .finish()
    }
}

/// Ordered set of field descriptors.
#[derive(Debug)]
pub struct Catalog {
    descriptors: Vec<FieldDescriptor>,
}

/// A bare token, or a quoted one that may contain whitespace.
const IDENT: &str = r#"'[^']*'|"[^"]*"|[^'"\s]+"#;
const SET_ZONE: &str = r#"^set\s+zone-policy\s+zone\s+(?P<name>'[^']*'|"[^"]*"|[^'"\s]+)"#;
const DELETE_ZONE: &str = r#"^delete\s+zone-policy\s+zone\s+(?P<name>'[^']*'|"[^"]*"|[^'"\s]+)"#;

impl Catalog {
    /// The catalog for VyOS `zone-policy zone` configuration.
    pub fn zone_policy() -> &'static Catalog {
        static CATALOG: OnceLock<Catalog> = OnceLock::new();
        CATALOG.get_or_init(build_zone_policy)
    }

    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, field: Field) -> Option<&FieldDescriptor> {
        self.descriptors.iter().find(|d| d.field == field)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.descriptors.iter().map(|d| d.field)
    }

    /// First descriptor that matches the line wins.
    pub fn match_line(&self, line: &str) -> Option<LineMatch> {
        self.descriptors.iter().find_map(|d| d.match_line(line))
    }
}

fn build_zone_policy() -> Catalog {
    let descriptors = vec![
        FieldDescriptor {
            field: Field::Interfaces,
            kind: FieldKind::OrderedList,
            shared: true,
            render: render::interfaces,
            matcher: compile(&format!(
                r"{SET_ZONE}\s+interface\s+(?P<interface>{IDENT})\s*$"
            )),
            extract: |caps| {
                caps.name("interface")
                    .map(|m| Capture::Interface(unquote(m.as_str())))
            },
        },
        FieldDescriptor {
            field: Field::Description,
            kind: FieldKind::Scalar,
            shared: false,
            render: render::description,
            matcher: compile(&format!(
                r#"{SET_ZONE}\s+description\s+(?P<description>'[^']*'|"[^"]*"|.+?)\s*$"#
            )),
            extract: |caps| {
                caps.name("description")
                    .map(|m| Capture::Description(unquote(m.as_str())))
            },
        },
        FieldDescriptor {
            field: Field::DefaultAction,
            kind: FieldKind::Scalar,
            shared: false,
            render: render::default_action,
            matcher: compile(&format!(
                r"{SET_ZONE}\s+default-action\s+'?(?P<default_action>[^'\s]+)'?\s*$"
            )),
            extract: |caps| {
                let raw = caps.name("default_action")?.as_str();
                raw.parse().ok().map(Capture::DefaultAction)
            },
        },
        FieldDescriptor {
            field: Field::From,
            kind: FieldKind::KeyedCollection { key: "from_zone" },
            shared: false,
            render: render::from,
            matcher: compile(&format!(
                r"{SET_ZONE}\s+from\s+(?P<from_zone>{IDENT})\s+firewall\s+(?P<afi>\S+)\s+(?P<rule_set_name>{IDENT})\s*$"
            )),
            extract: |caps| {
                let afi = Afi::from_firewall_token(caps.name("afi")?.as_str())?;
                Some(Capture::Rule(TrafficRule::new(
                    unquote(caps.name("from_zone")?.as_str()),
                    afi,
                    unquote(caps.name("rule_set_name")?.as_str()),
                )))
            },
        },
        FieldDescriptor {
            field: Field::LocalZone,
            kind: FieldKind::Flag,
            shared: false,
            render: render::local_zone,
            matcher: compile(&format!(r"{SET_ZONE}\s+local-zone\s*$")),
            extract: |_| Some(Capture::LocalZone),
        },
        FieldDescriptor {
            field: Field::RemoveZone,
            kind: FieldKind::Directive,
            shared: false,
            render: render::remove_zone,
            matcher: compile(&format!(r"{DELETE_ZONE}\s*$")),
            extract: |_| Some(Capture::RemoveZone),
        },
    ];

    Catalog { descriptors }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("catalog patterns are static and valid")
}

/// Strip one layer of matching single or double quotes.
pub(crate) fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    for quote in ['\'', '"'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::{unquote, Capture, Catalog, Field};
    use crate::model::{Afi, DefaultAction, TrafficRule, Zone};

    #[test]
    fn catalog_order_is_declaration_order() {
        let fields: Vec<Field> = Catalog::zone_policy().fields().collect();
        assert_eq!(
            fields,
            vec![
                Field::Interfaces,
                Field::Description,
                Field::DefaultAction,
                Field::From,
                Field::LocalZone,
                Field::RemoveZone,
            ]
        );
    }

    #[test]
    fn matches_quoted_interface() {
        let m = Catalog::zone_policy()
            .match_line("set zone-policy zone LAN interface 'eth1'")
            .expect("match");
        assert_eq!(m.zone, "LAN");
        assert!(m.shared);
        assert_eq!(m.capture, Capture::Interface("eth1".to_string()));
    }

    #[test]
    fn description_keeps_inner_whitespace() {
        let m = Catalog::zone_policy()
            .match_line("set zone-policy zone WAN description 'untrusted uplink'")
            .expect("match");
        assert_eq!(
            m.capture,
            Capture::Description("untrusted uplink".to_string())
        );
    }

    #[test]
    fn unknown_default_action_does_not_match() {
        assert!(Catalog::zone_policy()
            .match_line("set zone-policy zone WAN default-action accept")
            .is_none());
        let m = Catalog::zone_policy()
            .match_line("set zone-policy zone WAN default-action 'reject'")
            .expect("match");
        assert_eq!(m.capture, Capture::DefaultAction(DefaultAction::Reject));
    }

    #[test]
    fn from_requires_known_address_family() {
        let catalog = Catalog::zone_policy();
        assert!(catalog
            .match_line("set zone-policy zone LAN from WAN firewall ipv4-name WAN-LAN")
            .is_none());
        assert!(catalog
            .match_line("set zone-policy zone LAN from WAN firewall name")
            .is_none());

        let m = catalog
            .match_line("set zone-policy zone LAN from WAN firewall ipv6-name 'WAN-LAN-6'")
            .expect("match");
        assert_eq!(m.field, Field::From);
        assert_eq!(
            m.capture,
            Capture::Rule(TrafficRule::new("WAN", Afi::Ipv6, "WAN-LAN-6"))
        );
    }

    #[test]
    fn unrelated_lines_do_not_match() {
        let catalog = Catalog::zone_policy();
        assert!(catalog
            .match_line("set firewall name WAN-LAN default-action drop")
            .is_none());
        assert!(catalog.match_line("set zone-policy zone LAN").is_none());
    }

    #[test]
    fn rule_capture_merges_on_peer_zone() {
        let mut zone = Zone::new("LAN");
        Capture::Rule(TrafficRule::new("WAN", Afi::Ipv4, "A")).merge_into(&mut zone);
        Capture::Rule(TrafficRule::new("DMZ", Afi::Ipv4, "B")).merge_into(&mut zone);
        Capture::Rule(TrafficRule::new("WAN", Afi::Ipv4, "C")).merge_into(&mut zone);

        let rules = zone.rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].rule_set_name.as_deref(), Some("C"));
        assert_eq!(rules[1].from_zone, "DMZ");
    }

    #[test]
    fn later_address_family_replaces_earlier_one() {
        let mut zone = Zone::new("LAN");
        Capture::Rule(TrafficRule::new("WAN", Afi::Ipv4, "A")).merge_into(&mut zone);
        Capture::Rule(TrafficRule::new("WAN", Afi::Ipv6, "B")).merge_into(&mut zone);

        assert_eq!(zone.rules(), [TrafficRule::new("WAN", Afi::Ipv6, "B")]);
    }

    #[test]
    fn quoted_identifiers_may_contain_whitespace() {
        let catalog = Catalog::zone_policy();
        let m = catalog
            .match_line("set zone-policy zone 'my zone' interface \"eth 1\"")
            .expect("match");
        assert_eq!(m.zone, "my zone");
        assert_eq!(m.capture, Capture::Interface("eth 1".to_string()));

        let m = catalog
            .match_line("set zone-policy zone LAN from 'far side' firewall name 'my rules'")
            .expect("match");
        assert_eq!(
            m.capture,
            Capture::Rule(TrafficRule::new("far side", Afi::Ipv4, "my rules"))
        );

        let m = catalog
            .match_line("delete zone-policy zone 'my zone'")
            .expect("match");
        assert_eq!(m.field, Field::RemoveZone);
        assert_eq!(m.zone, "my zone");
    }

    #[test]
    fn unquote_strips_one_matching_pair() {
        assert_eq!(unquote("'a b'"), "a b");
        assert_eq!(unquote("\"x\""), "x");
        assert_eq!(unquote("'odd"), "'odd");
        assert_eq!(unquote("plain"), "plain");
    }
}
