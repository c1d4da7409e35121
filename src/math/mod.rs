//! Mathematical utilities: the bonus allocation program.

pub mod lp;

pub use lp::*;
