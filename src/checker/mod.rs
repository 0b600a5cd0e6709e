//! Read-only auditor of a tree's structural invariants.
//!
//! The checker works from the raw pieces of a tree (initialization flag,
//! arena, root and a claimed directory count) rather than from the engine,
//! so it can be pointed at a deliberately inconsistent state.

mod checker;

pub use checker::{InvariantViolation, check_tree};
