//! Recruiting hiring-stage pipeline service.
//!
//! The crate is organized around the [`pipeline`] module, which owns the
//! candidate application state machine: the ordered stage catalog, the
//! application record and its audit history, the storage and notification
//! seams, the transition engine, and the HTTP router exposing it. The
//! remaining modules carry the service plumbing (configuration, telemetry,
//! bootstrap errors).

pub mod config;
pub mod error;
pub mod pipeline;
pub mod telemetry;
