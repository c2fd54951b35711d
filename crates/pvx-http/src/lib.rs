//! Proxmox VE REST transport for the pvx core.
//!
//! [`ProxmoxClient`] implements [`pvx_core::ClusterClient`] over the
//! `api2/json` API: ticket authentication, `{"data": ...}` envelope decoding,
//! and one submission endpoint per [`pvx_model::OperationRequest`] variant.
//! Any non-2xx answer is reported as [`pvx_core::ClientError::Rejected`].
mod auth;
mod client;
mod config;
mod envelope;
mod error;
mod request;

pub use client::ProxmoxClient;
pub use config::ClusterConfig;
pub use error::ConfigError;
pub use request::{Method, SubmitRequest};
