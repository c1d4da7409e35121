//! Reporting utilities: terminal summaries of grading runs.

pub mod format;

pub use format::*;
