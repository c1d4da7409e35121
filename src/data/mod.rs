//! Built-in and synthetic input records.

pub mod sample;

pub use sample::*;
