//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - component kinds and per-component value pairs (`ComponentKind`, `ComponentValues`)
//! - the validated input record (`StudentRecord`)
//! - per-stage marks (`FinalMarks`) and rule constants (`GradingPolicy`)

pub mod types;

pub use types::*;
