//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (JSON-RPC node, JSON-RPC wallet, HTTP
//! endpoints). Each sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `chain`: node reads and wallet submission via alloy-rs
//! - `metrics`: Prometheus metrics export and health checks

pub mod chain;
pub mod metrics;
