//! Reconciliation states and the policy each one runs.
//!
//! A state maps to a `(prepare, compare)` pair: `prepare` reshapes the want
//! and have lists before comparison, and `compare` decides the per-zone
//! changes. States without a `compare` step produce no changes.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diff::engine::{compare, compare_deleted};
use crate::diff::result::Change;
use crate::merge::merge_zone;
use crate::model::{find_zone, Zone};

/// Requested reconciliation semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    Merged,
    Replaced,
    Overridden,
    Deleted,
    Gathered,
    Rendered,
    Parsed,
}

/// Unknown state name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown state '{0}' (expected one of: merged, replaced, overridden, deleted, gathered, rendered, parsed)")]
pub struct UnknownState(pub String);

impl State {
    pub const ALL: [State; 7] = [
        State::Merged,
        State::Replaced,
        State::Overridden,
        State::Deleted,
        State::Gathered,
        State::Rendered,
        State::Parsed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            State::Merged => "merged",
            State::Replaced => "replaced",
            State::Overridden => "overridden",
            State::Deleted => "deleted",
            State::Gathered => "gathered",
            State::Rendered => "rendered",
            State::Parsed => "parsed",
        }
    }

    /// States that compare against the device and may change it.
    pub fn is_action(self) -> bool {
        matches!(
            self,
            State::Merged | State::Replaced | State::Overridden | State::Deleted
        )
    }

    pub fn policy(self) -> Policy {
        match self {
            State::Gathered | State::Parsed => Policy {
                prepare: passthrough,
                compare: None,
            },
            State::Rendered => Policy {
                prepare: from_scratch,
                compare: Some(compare),
            },
            State::Merged => Policy {
                prepare: merge_device_state,
                compare: Some(compare),
            },
            State::Replaced => Policy {
                prepare: keep_matched,
                compare: Some(compare),
            },
            State::Overridden => Policy {
                prepare: retire_unlisted,
                compare: Some(compare),
            },
            State::Deleted => Policy {
                prepare: select_for_deletion,
                compare: Some(compare_deleted),
            },
        }
    }
}

impl FromStr for State {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        State::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compares one want zone against the device's copy (empty when absent).
pub type CompareFn = fn(&Zone, &Zone, &mut Vec<Change>);

/// Pre-processing and comparison for one state.
#[derive(Clone, Copy)]
pub struct Policy {
    pub prepare: fn(Vec<Zone>, Vec<Zone>) -> Prepared,
    pub compare: Option<CompareFn>,
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("compares", &self.compare.is_some())
            .finish()
    }
}

/// Want and have after a state's pre-processing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prepared {
    pub want: Vec<Zone>,
    pub have: Vec<Zone>,
    /// Device zones to delete outright before any comparison.
    pub retired: Vec<String>,
}

fn passthrough(_want: Vec<Zone>, have: Vec<Zone>) -> Prepared {
    Prepared {
        want: Vec::new(),
        have,
        retired: Vec::new(),
    }
}

fn from_scratch(want: Vec<Zone>, _have: Vec<Zone>) -> Prepared {
    Prepared {
        want,
        have: Vec::new(),
        retired: Vec::new(),
    }
}

fn merge_device_state(want: Vec<Zone>, have: Vec<Zone>) -> Prepared {
    let want = want
        .into_iter()
        .map(|zone| match find_zone(&have, &zone.name) {
            Some(existing) => merge_zone(zone, existing),
            None => zone,
        })
        .collect();
    Prepared {
        want,
        have,
        retired: Vec::new(),
    }
}

fn keep_matched(want: Vec<Zone>, have: Vec<Zone>) -> Prepared {
    Prepared {
        want,
        have,
        retired: Vec::new(),
    }
}

fn retire_unlisted(want: Vec<Zone>, have: Vec<Zone>) -> Prepared {
    let retired = have
        .iter()
        .filter(|zone| find_zone(&want, &zone.name).is_none())
        .map(|zone| zone.name.clone())
        .collect();
    Prepared {
        want,
        have,
        retired,
    }
}

fn select_for_deletion(want: Vec<Zone>, have: Vec<Zone>) -> Prepared {
    let have: Vec<Zone> = have
        .into_iter()
        .filter(|zone| want.is_empty() || find_zone(&want, &zone.name).is_some())
        .collect();
    // With an empty want every selected zone is retired; otherwise the
    // selection only holds zones the caller named.
    let retired = have
        .iter()
        .filter(|zone| find_zone(&want, &zone.name).is_none())
        .map(|zone| zone.name.clone())
        .collect();
    Prepared {
        want,
        have,
        retired,
    }
}
