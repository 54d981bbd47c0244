//! Contract storage and the rule-based execution engine

pub(crate) mod engine;
pub mod terms;

pub use terms::*;
