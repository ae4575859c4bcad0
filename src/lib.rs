//! Vendor aggregation pipeline behind the supply-chain risk deck.
//!
//! [`pipeline`] holds the pure transforms; the other modules load vendor
//! CSVs, read configuration and export the derived tables.

pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod util;
