//! webhook-core: Shared infrastructure for the FHIR webhook services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
