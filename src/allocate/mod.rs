//! Bonus allocation.
//!
//! Responsibilities:
//!
//! - turn a `StudentRecord` into a bonus allocation program
//! - solve it (most passes first, least bonus second)
//! - report per-component bonuses and the adjusted marks

pub mod allocator;

pub use allocator::*;
