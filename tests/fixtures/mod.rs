//! Test fixtures for route-fitness.
//!
//! Provides small, hand-built road networks with known node ids, edge
//! lengths, and highway categories, so path shapes and scores can be
//! asserted exactly.

pub mod street_grid;

pub use street_grid::*;
