//! xds-forge - Envoy cluster and route snapshot synthesis.
//!
//! xds-forge turns small routing intents (an upstream origin, a path prefix and
//! optional rewrites) into a consistent pair of discovery envelopes: a cluster
//! envelope holding one upstream cluster per intent, and a route envelope holding
//! a single route configuration whose one virtual host carries every route in
//! submission order.
//!
//! # Quick Example
//! ```
//! use xds_forge::SnapshotAssembler;
//!
//! # fn main() -> Result<(), xds_forge::XdsError> {
//! let mut assembler = SnapshotAssembler::new();
//! let snapshot = assembler.submit("https://api.example.com", "/v1/", None, None)?;
//! assert!(snapshot.clusters.contains("api.example.com"));
//! assert!(snapshot.routes.contains("/v1/"));
//! # Ok(()) }
//! ```
//!
//! # Architecture
//! Resource synthesis lives in `core` and performs no I/O. Delivery is a port
//! (`ports::snapshot_sink`) with a file adapter, and the HTTP intake surface is
//! an `axum` adapter that wraps the assembler in a lock.
//!
//! # Snapshot model
//! Every submission appends exactly one cluster and one route, then both
//! envelopes are re-rendered from the full accumulated state. There is no delta
//! path: a reader always sees clusters and routes that belong together.
//!
//! # Error Handling
//! Synthesis returns [`XdsError`]. Configuration loading and the binary use
//! `eyre::Result` with context attached through `WrapErr`.
pub mod config;
pub mod ports;
pub mod tracing_setup;

pub mod adapters;
pub mod core;

pub use crate::{
    adapters::{AppState, FileSnapshotSink},
    config::models::{ControlPlaneConfig, RoutingIntent},
    core::{
        ClusterSynthesizer, Origin, RouteSynthesizer, Snapshot, SnapshotAssembler,
        SynthesisPolicy, XdsError, XdsResult,
    },
    ports::snapshot_sink::SnapshotSink,
};
