use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Action taken on traffic entering a zone that no rule set matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultAction {
    /// Drop silently.
    Drop,
    /// Drop and notify the source.
    Reject,
}

impl DefaultAction {
    pub fn as_str(self) -> &'static str {
        match self {
            DefaultAction::Drop => "drop",
            DefaultAction::Reject => "reject",
        }
    }
}

impl FromStr for DefaultAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop" => Ok(DefaultAction::Drop),
            "reject" => Ok(DefaultAction::Reject),
            other => Err(format!("unknown default-action '{other}'")),
        }
    }
}

impl Display for DefaultAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address family a traffic rule's rule set applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Afi {
    Ipv4,
    Ipv6,
}

impl Afi {
    /// Token used after `firewall` in device syntax.
    pub fn firewall_token(self) -> &'static str {
        match self {
            Afi::Ipv4 => "name",
            Afi::Ipv6 => "ipv6-name",
        }
    }

    /// Inverse of [`Afi::firewall_token`].
    pub fn from_firewall_token(token: &str) -> Option<Self> {
        match token {
            "name" => Some(Afi::Ipv4),
            "ipv6-name" => Some(Afi::Ipv6),
            _ => None,
        }
    }
}

/// Traffic entering a zone from a peer zone, filtered by one rule set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrafficRule {
    /// Peer zone feeding traffic into the owning zone. Identity within `from`.
    pub from_zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afi: Option<Afi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_set_name: Option<String>,
    /// Directive: drop the owning zone's whole `from` clause.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_from: Option<bool>,
}

impl TrafficRule {
    pub fn new(from_zone: impl Into<String>, afi: Afi, rule_set_name: impl Into<String>) -> Self {
        Self {
            from_zone: from_zone.into(),
            afi: Some(afi),
            rule_set_name: Some(rule_set_name.into()),
            remove_from: None,
        }
    }

    pub fn removes_clause(&self) -> bool {
        self.remove_from.unwrap_or(false)
    }

    /// Has everything an apply command needs.
    pub fn is_complete(&self) -> bool {
        self.afi.is_some() && self.rule_set_name.is_some()
    }

    /// True when both rules would render the same device command.
    pub fn same_binding(&self, other: &TrafficRule) -> bool {
        self.from_zone == other.from_zone
            && self.afi == other.afi
            && self.rule_set_name == other.rule_set_name
    }
}

/// A firewall zone keyed by `name`.
///
/// Every attribute is optional; absence means "not configured" in facts and
/// "no change requested" in a want document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Zone {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_action: Option<DefaultAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_zone: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interfaces: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Vec<TrafficRule>>,
    /// Directive: delete the whole zone. Never present in facts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_zone: Option<bool>,
}

impl Zone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_local(&self) -> bool {
        self.local_zone.unwrap_or(false)
    }

    pub fn removes_zone(&self) -> bool {
        self.remove_zone.unwrap_or(false)
    }

    pub fn interface_list(&self) -> &[String] {
        self.interfaces.as_deref().unwrap_or(&[])
    }

    pub fn rules(&self) -> &[TrafficRule] {
        self.from.as_deref().unwrap_or(&[])
    }

    /// Look up a traffic rule by its peer zone.
    pub fn rule(&self, from_zone: &str) -> Option<&TrafficRule> {
        self.rules().iter().find(|rule| rule.from_zone == from_zone)
    }

    /// A zone carrying nothing but its name.
    pub fn is_empty(&self) -> bool {
        self.default_action.is_none()
            && self.description.is_none()
            && !self.is_local()
            && self.interface_list().is_empty()
            && self.rules().is_empty()
    }
}

/// Find a zone by name in an ordered zone list.
pub fn find_zone<'a>(zones: &'a [Zone], name: &str) -> Option<&'a Zone> {
    zones.iter().find(|zone| zone.name == name)
}
