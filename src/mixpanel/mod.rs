//! Mixpanel REST client.
//!
//! This module contains:
//! - Per-tenant credential resolution ([`TenantCredentials`])
//! - The endpoint table for the four API surfaces ([`Endpoints`])
//! - The tenant-scoped HTTP client ([`MixpanelClient`])
//! - One module per operation group, each adding methods to the client
//!
//! Every operation takes a typed parameter struct, builds one
//! [`RequestDescriptor`], and issues exactly one HTTP call.

pub mod annotations;
pub mod client;
pub mod credentials;
pub mod csv;
pub mod endpoints;
pub mod engage;
pub mod error;
pub mod export;
pub mod funnels;
pub mod gdpr;
pub mod identity;
pub mod ingestion;
pub mod lookup_tables;
pub mod params;
pub mod profiles;
pub mod query;
pub mod request;
pub mod response;
pub mod schemas;

pub use client::{HttpSettings, MixpanelClient, build_http_client};
pub use credentials::TenantCredentials;
pub use endpoints::{ApiSurface, Endpoints, Residency};
pub use engage::EngageOperation;
pub use error::{MixpanelError, Result};
pub use params::{Validate, parse_params};
pub use request::RequestDescriptor;
