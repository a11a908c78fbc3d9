//! CLI command implementations

pub mod add;
pub mod calc;
pub mod completions;
pub mod list;
pub mod rm;
pub mod search;
pub mod set;
pub mod show;
pub mod update;
