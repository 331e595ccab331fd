//! Container lifecycle through the compose CLI

mod client;
mod file;

pub use client::{ComposeClient, HealthCheck, HealthStatus, HEALTH_TIMEOUT_MESSAGE};
pub use file::{parse_services, read_services, ServiceSummary};
