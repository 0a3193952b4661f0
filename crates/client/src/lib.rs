//! Client library for the Marzban panel REST API.
//!
//! Exposes [`api::MarzbanClient`], an authenticated HTTP client for the
//! handful of read-only endpoints the exporter scrapes, and the typed
//! response payloads in [`models`].

pub mod api;
pub mod models;

pub use api::{ClientError, MarzbanClient};
