//! Input handling for the volume viewer
//!
//! Provides the [`OrbitController`] that translates mouse input into
//! orbit-camera motion via the [`OrbitControl`] trait.

mod orbit_controller;

pub use orbit_controller::{OrbitControl, OrbitController};
