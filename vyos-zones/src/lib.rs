//! Command-line front end for VyOS zone-policy reconciliation.
//!
//! - [`settings`]: TOML settings with embedded defaults
//! - [`module`]: parameter contract and the per-state module run
//! - [`transport`]: device seam and the snapshot-file implementation
//! - [`report`]: colored terminal rendering of results and facts

pub mod module;
pub mod report;
pub mod settings;
pub mod transport;
