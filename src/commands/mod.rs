//! Command implementations for the CLI
//!
//! - start: Start the pricing API server
//! - test: Check configuration and pricing sources
//! - config: Configuration display and validation
//! - quote: Calculate a quote locally
//! - admin: Edit prices on a running server

pub mod admin;
pub mod config;
pub mod quote;
pub mod start;
