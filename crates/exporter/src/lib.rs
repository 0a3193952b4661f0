//! Marzban Prometheus exporter library.
//!
//! Exposes the building blocks (config, state, error handling, metric
//! translation, routes) so integration tests and the binary entrypoint
//! can both access them.

pub mod config;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod state;
