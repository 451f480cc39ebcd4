//! Declarative reconciliation for VyOS `zone-policy` firewall zones.
//!
//! Raw `show configuration commands` text is parsed into [`Zone`] facts by
//! the [`catalog`] of field descriptors. A declared want list is compared
//! against those facts under a [`State`], producing an ordered list of
//! field-level [`Change`]s that the [`render`] module turns back into
//! `set` / `delete` commands.
//!
//! ```
//! use zone_policy_core::{facts, reconcile, State, Zone};
//!
//! let have = facts::gather("set zone-policy zone LAN interface 'eth1'\n");
//! let mut want = Zone::new("LAN");
//! want.description = Some("inside".to_string());
//!
//! let plan = reconcile(vec![want], have, State::Merged);
//! assert_eq!(plan.commands, vec!["set zone-policy zone LAN description 'inside'"]);
//! ```

pub mod catalog;
pub mod diff;
pub mod facts;
pub mod format;
pub mod merge;
pub mod model;
pub mod parser;
pub mod render;
pub mod simulate;
pub mod state;
pub mod validate;

pub use catalog::{Catalog, Field, FieldKind};
pub use diff::{reconcile, Change, Direction, FieldValue, Plan};
pub use facts::{gather, Facts};
pub use format::{format_facts_json, format_json, format_summary, format_text};
pub use model::{Afi, DefaultAction, TrafficRule, Zone};
pub use parser::{parse, parse_lines};
pub use render::{render_change, RenderError};
pub use simulate::simulate;
pub use state::{State, UnknownState};
pub use validate::{want_from_json, want_from_toml, want_from_value, ValidationError};
