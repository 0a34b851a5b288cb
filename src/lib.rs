//! route-fitness core
//!
//! Route candidates over a road network, scored against a desired
//! distance and road-type mix. The registry owns named routes plus
//! their derived sub-graphs; the fitness engine attaches a weighted
//! multi-criteria score to each registered route.

pub mod error;
pub mod fitness;
pub mod graph;
pub mod haversine;
pub mod provider;
pub mod registry;
pub mod score;
