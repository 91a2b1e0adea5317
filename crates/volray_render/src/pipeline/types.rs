//! GPU-compatible data types for the raycasting pipeline
//!
//! These types are designed to match the shader layouts exactly.
//! All types derive Pod and Zeroable for safe GPU buffer operations.

use bytemuck::{Pod, Zeroable};
use volray_math::{mat4, Mat4};

/// A vertex of the bounding box
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BoxVertex {
    /// Position in object space, components in [-0.5, 0.5]
    pub position: [f32; 3],
}

/// Uniforms for the ray bounds passes
/// Layout: 64 bytes (must match ray_bounds.wgsl BoundsUniforms)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BoundsUniforms {
    pub view_proj: Mat4,
}

impl Default for BoundsUniforms {
    fn default() -> Self {
        Self {
            view_proj: mat4::IDENTITY,
        }
    }
}

/// Uniforms for the raycast compositing pass
/// Layout: 144 bytes total (must match raycast.wgsl RaycastUniforms)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct RaycastUniforms {
    /// View-projection matrix (64 bytes)
    pub view_proj: Mat4,
    /// Camera world position + step count (16 bytes)
    pub camera_position: [f32; 3],
    pub step_count: u32,
    /// Primary iso-surface color and threshold (16 bytes)
    pub iso_color_1: [f32; 3],
    pub iso_value_1: f32,
    /// Secondary iso-surface color and threshold (16 bytes)
    pub iso_color_2: [f32; 3],
    pub iso_value_2: f32,
    /// Opacities, MIP scale correction, compositing mode (16 bytes)
    pub iso_alpha_1: f32,
    pub iso_alpha_2: f32,
    pub volume_scale: f32,
    pub mode: u32,
    /// Feature flags (16 bytes)
    pub second_iso_enabled: u32,
    pub shading_enabled: u32,
    pub _pad: [u32; 2],
}

impl Default for RaycastUniforms {
    fn default() -> Self {
        Self {
            view_proj: mat4::IDENTITY,
            camera_position: [0.0, 0.0, 1.5],
            step_count: volray_core::raycast::DEFAULT_STEP_COUNT as u32,
            iso_color_1: [1.0, 1.0, 1.0],
            iso_value_1: 0.3,
            iso_color_2: [1.0, 1.0, 1.0],
            iso_value_2: 0.15,
            iso_alpha_1: 1.0,
            iso_alpha_2: 0.4,
            volume_scale: 1.0,
            mode: 0,
            second_iso_enabled: 0,
            shading_enabled: 0,
            _pad: [0; 2],
        }
    }
}

/// Number of vertices in the bounding box triangle list
pub const BOX_VERTEX_COUNT: usize = 36;

/// Bounding box triangle list, counter-clockwise winding seen from
/// outside (matches `FrontFace::Ccw` in the pipelines)
pub fn box_vertices() -> [BoxVertex; BOX_VERTEX_COUNT] {
    const C: [[f32; 3]; 8] = [
        [-0.5, -0.5, -0.5], // 0
        [0.5, -0.5, -0.5],  // 1
        [0.5, 0.5, -0.5],   // 2
        [-0.5, 0.5, -0.5],  // 3
        [-0.5, -0.5, 0.5],  // 4
        [0.5, -0.5, 0.5],   // 5
        [0.5, 0.5, 0.5],    // 6
        [-0.5, 0.5, 0.5],   // 7
    ];
    const FACES: [[usize; 6]; 6] = [
        [4, 5, 6, 4, 6, 7], // +Z
        [1, 0, 3, 1, 3, 2], // -Z
        [5, 1, 2, 5, 2, 6], // +X
        [0, 4, 7, 0, 7, 3], // -X
        [7, 6, 2, 7, 2, 3], // +Y
        [0, 1, 5, 0, 5, 4], // -Y
    ];

    let mut vertices = [BoxVertex {
        position: [0.0; 3],
    }; BOX_VERTEX_COUNT];
    let mut i = 0;
    for face in FACES {
        for idx in face {
            vertices[i] = BoxVertex { position: C[idx] };
            i += 1;
        }
    }
    vertices
}

/// Vertex buffer layout for [`BoxVertex`]
pub fn box_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<BoxVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 0,
        }],
    }
}
