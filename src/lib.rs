//! Watches the Jupiter aggregator programs for round-trip swap transactions that lock in
//! a profit, and reports each one once.

pub mod arb_logger;
pub mod arbitrage;
pub mod config;
pub mod decoder;
pub mod dedupe;
pub mod extractor;
pub mod idl;
pub mod monitor;
pub mod notify;
pub mod schema;
pub mod sources;
pub mod token_registry;
pub mod transaction;
