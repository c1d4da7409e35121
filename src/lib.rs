//! `spi-grader` library crate.
//!
//! The binary (`spi`) is a thin wrapper around this library so that:
//!
//! - the grading pipeline is testable without spawning processes
//! - each stage (allocation, rules, SPI) can be called on its own
//! - file formats and terminal output stay out of the grading code

pub mod allocate;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod grade;
pub mod io;
pub mod logging;
pub mod math;
pub mod report;
pub mod rules;
pub mod spi;
