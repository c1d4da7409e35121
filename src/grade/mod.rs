//! Grade table: letter grades and grade points.

pub mod table;

pub use table::*;
