//! Command implementations for the CLI
//!
//! - estimate: Score a profile and print the audited cost estimate
//! - data: Write or display the reference tables
//! - config: Configuration display and validation

pub mod config;
pub mod data;
pub mod estimate;
