//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies, and hosts the Prometheus-facing pieces.
//!
//! Adapter categories:
//! - `source`: Locust CSV reports read from the filesystem
//! - `metrics`: metric store, text exposition and the HTTP server

pub mod metrics;
pub mod source;
