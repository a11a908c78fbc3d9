//! tubmeter: bathtub measurement log
//!
//! Records bathtub measurements in a local SQLite database and derives the
//! side incline from vertical plus an estimated capacity, so models can be
//! compared for comfort and cost.

pub mod cli;
pub mod core;
