//! Want/have comparison and the change list it produces.

pub mod engine;
pub mod result;

pub use engine::{compare, compare_deleted, reconcile, render_plan};
pub use result::{Change, Direction, FieldValue, Plan};
