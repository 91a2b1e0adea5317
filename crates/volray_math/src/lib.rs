//! Math support for the volume viewer
//!
//! This crate provides the small amount of linear algebra the renderer
//! needs: a 3D vector type and 4x4 matrix helpers for the camera.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components
//! - [`Mat4`] - 4x4 matrix (column vectors in row-major storage)

mod vec3;
pub mod mat4;

pub use vec3::Vec3;
pub use mat4::Mat4;
