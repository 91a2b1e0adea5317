//! Core types for the volume viewer
//!
//! This crate owns everything that does not touch the GPU:
//!
//! - [`VolumeData`] - a normalized 3D scalar field decoded from raw
//!   16-bit samples
//! - [`RaycastParams`] - the user-facing compositing parameter state
//! - [`raycast`] - a CPU reference implementation of the compositing
//!   strategies, used to pin down the semantics the shaders implement
//!
//! The GPU pipelines in `volray_render` consume these types; the
//! reference compositor is the authority the tests check against.

mod error;
mod params;
mod volume;
pub mod raycast;

pub use error::VolumeError;
pub use params::{CompositingMode, IsoSurface, RaycastParams};
pub use volume::{VolumeData, VolumeDims};
