use serde::{Serialize, Serializer};

use crate::catalog::Field;
use crate::model::{DefaultAction, TrafficRule};
use crate::render::RenderError;

/// Whether a change brings a value into effect or takes it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Apply,
    Remove,
}

/// The structured payload of one field-level change.
///
/// Collection variants carry only the members that need a command, never the
/// full configured list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Interfaces(Vec<String>),
    Description(String),
    DefaultAction(DefaultAction),
    From(Vec<TrafficRule>),
    /// Drop the zone's whole `from` clause.
    RemoveFrom,
    LocalZone,
    /// Drop the whole zone.
    RemoveZone,
}

impl FieldValue {
    pub fn field(&self) -> Field {
        match self {
            FieldValue::Interfaces(_) => Field::Interfaces,
            FieldValue::Description(_) => Field::Description,
            FieldValue::DefaultAction(_) => Field::DefaultAction,
            FieldValue::From(_) | FieldValue::RemoveFrom => Field::From,
            FieldValue::LocalZone => Field::LocalZone,
            FieldValue::RemoveZone => Field::RemoveZone,
        }
    }
}

/// One abstract field-level change for a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub zone: String,
    pub direction: Direction,
    #[serde(flatten)]
    pub value: FieldValue,
}

impl Change {
    pub fn apply(zone: impl Into<String>, value: FieldValue) -> Self {
        Self {
            zone: zone.into(),
            direction: Direction::Apply,
            value,
        }
    }

    pub fn remove(zone: impl Into<String>, value: FieldValue) -> Self {
        Self {
            zone: zone.into(),
            direction: Direction::Remove,
            value,
        }
    }

    pub fn field(&self) -> Field {
        self.value.field()
    }
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Changes that rendered, in emission order.
    pub changes: Vec<Change>,
    /// Commands for `changes`, in order.
    pub commands: Vec<String>,
    /// Changes that could not be rendered.
    #[serde(serialize_with = "serialize_failures")]
    pub failures: Vec<RenderError>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn serialize_failures<S>(failures: &[RenderError], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(failures.iter().map(ToString::to_string))
}
