//! `storefront-cli` — command-line surface over the storefront core.
//!
//! Runs catalog queries and scripted cart sessions and prints JSON, so the
//! core can be driven without a rendering layer.

pub mod commands;
pub mod config;
pub mod ops;

pub use config::StorefrontConfig;
pub use ops::CartOp;
