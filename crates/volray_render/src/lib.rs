//! Volume rendering library
//!
//! This crate provides the wgpu-based two-pass raycasting pipeline for
//! displaying a 3D scalar field.
//!
//! ## Key Components
//!
//! - [`context::RenderContext`] - WGPU device, queue, and surface management
//! - [`camera::Camera`] - orbit camera around the volume center
//! - [`shader::ShaderProgram`] - uniform table + asynchronous compilation
//! - [`pipeline::RayBoundsPipeline`] - encodes ray entry/exit coordinates
//! - [`pipeline::RaycastPipeline`] - per-pixel raymarch compositing
//! - [`pipeline::VolumeRenderer`] - per-frame orchestration of the passes

pub mod camera;
pub mod context;
pub mod pipeline;
pub mod shader;
pub mod targets;

// Re-export core types for convenience
pub use volray_core::{CompositingMode, IsoSurface, RaycastParams, VolumeData, VolumeDims};

pub use camera::Camera;
pub use context::RenderContext;
pub use pipeline::VolumeRenderer;
pub use shader::{CullConfig, ShaderDesc, ShaderError, ShaderProgram, UniformValue};
