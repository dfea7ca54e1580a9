//! Refines curves by knot insertion.

pub mod insert;
