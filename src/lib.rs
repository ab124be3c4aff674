//! Freebody library
//!
//! Renders prepared physics world snapshots into six panels: the scene, an
//! inferred free body diagram, three motion graphs and the energy history.
//! Exposed as a library so the renderers can be driven from integration
//! tests and benchmarks without a window.

pub mod config;
pub mod events;
pub mod physics;
pub mod plugins;
pub mod prelude;
pub mod render;
pub mod states;

// Test utilities are public for integration tests
pub mod test_utils;
