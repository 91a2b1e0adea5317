//! Rendering pipeline components
//!
//! This module contains the ray bounds passes, the raycast compositor,
//! and the per-frame orchestration that ties them together.

pub mod bounds_pipeline;
pub mod frame;
pub mod raycast_pipeline;
pub mod types;

// Re-export types
pub use types::{
    box_vertex_layout, box_vertices, BoundsUniforms, BoxVertex, RaycastUniforms, BOX_VERTEX_COUNT,
};

// Re-export pipelines
pub use bounds_pipeline::RayBoundsPipeline;
pub use frame::VolumeRenderer;
pub use raycast_pipeline::{pack_uniforms, RaycastPipeline};
