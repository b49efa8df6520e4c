//! Grid Traffic Micro-Simulation Library
//!
//! A per-tick traffic simulation over a uniform grid of signalled
//! intersections, usable headless or behind any presentation layer.

pub mod simulation;
