//! Per-frame pass orchestration
//!
//! [`VolumeRenderer`] owns the three pipelines and the offscreen
//! targets and runs the fixed per-frame protocol:
//!
//! 1. back faces into the back buffer (exit points)
//! 2. front faces into the front buffer (entry points)
//! 3. both buffers bound as textures of the raycast pass
//! 4. camera uniforms refreshed
//! 5. on-screen raycast pass
//!
//! The order is never changed or skipped; while no volume is loaded the
//! whole frame is a no-op.

use wgpu::util::DeviceExt;

use super::bounds_pipeline::RayBoundsPipeline;
use super::raycast_pipeline::RaycastPipeline;
use super::types::box_vertices;
use crate::camera::Camera;
use crate::context::RenderContext;
use crate::shader::{CullConfig, ShaderDesc, ShaderError, ShaderProgram, UniformValue};
use crate::targets::RenderTargets;
use volray_core::{RaycastParams, VolumeData};

/// The two-pass volume rendering pipeline
pub struct VolumeRenderer {
    front_bounds: RayBoundsPipeline,
    back_bounds: RayBoundsPipeline,
    raycast: RaycastPipeline,
    targets: RenderTargets,
    box_vertex_buffer: wgpu::Buffer,
    volume_loaded: bool,
}

impl VolumeRenderer {
    /// Compile all shader programs and build the pipelines
    ///
    /// Awaits every program's `load()` before any pipeline is built, so
    /// nothing can be drawn with a half-initialized program. A compile
    /// failure aborts construction with the failing stage in the error.
    pub async fn new(context: &RenderContext, step_count: u32) -> Result<Self, ShaderError> {
        let device = &context.device;

        // The front pass keeps front faces (culls back) and vice versa
        let mut front_program = ShaderProgram::new(ShaderDesc {
            name: "ray_bounds_front",
            vertex_src: "ray_bounds_vert",
            fragment_src: "ray_bounds_frag",
            cull: CullConfig::Back,
        });
        let mut back_program = ShaderProgram::new(ShaderDesc {
            name: "ray_bounds_back",
            vertex_src: "ray_bounds_vert",
            fragment_src: "ray_bounds_frag",
            cull: CullConfig::Front,
        });
        let mut raycast_program = ShaderProgram::new(ShaderDesc {
            name: "raycast",
            vertex_src: "raycast_vert",
            fragment_src: "raycast_frag",
            cull: CullConfig::Back,
        });

        front_program.load(device).await?;
        back_program.load(device).await?;
        raycast_program.load(device).await?;

        let front_bounds = RayBoundsPipeline::new(device, front_program)?;
        let back_bounds = RayBoundsPipeline::new(device, back_program)?;
        let mut raycast = RaycastPipeline::new(device, raycast_program, context.config.format)?;
        raycast.set_uniform("step_count", UniformValue::Int(step_count as i32));

        let targets = RenderTargets::new(device, context.size.width, context.size.height);

        let box_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bounding Box Vertex Buffer"),
            contents: bytemuck::cast_slice(&box_vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Ok(Self {
            front_bounds,
            back_bounds,
            raycast,
            targets,
            box_vertex_buffer,
            volume_loaded: false,
        })
    }

    /// Replace the displayed volume wholesale
    pub fn set_volume(&mut self, context: &RenderContext, volume: &VolumeData) {
        self.raycast
            .set_volume(&context.device, &context.queue, volume);
        self.raycast.rebuild_bind_group(
            &context.device,
            &self.targets.front.view,
            &self.targets.back.view,
        );
        self.volume_loaded = true;
        log::info!(
            "Volume texture uploaded ({}x{}x{})",
            volume.dims().width,
            volume.dims().height,
            volume.dims().depth
        );
    }

    /// Push the current parameter state into the compositor
    pub fn set_params(&mut self, params: &RaycastParams) {
        self.raycast.apply_params(params);
    }

    /// Whether a volume is loaded and frames will be rendered
    pub fn has_volume(&self) -> bool {
        self.volume_loaded
    }

    /// Recreate the offscreen buffers for a new viewport size
    pub fn resize(&mut self, context: &RenderContext, width: u32, height: u32) {
        if self.targets.ensure_size(&context.device, width, height) {
            self.raycast.rebuild_bind_group(
                &context.device,
                &self.targets.front.view,
                &self.targets.back.view,
            );
        }
    }

    /// Render one frame to the given surface view
    ///
    /// No-op until a volume is loaded.
    pub fn render(
        &mut self,
        context: &RenderContext,
        surface_view: &wgpu::TextureView,
        camera: &Camera,
        background: wgpu::Color,
    ) {
        if !self.volume_loaded {
            return;
        }

        let view_proj = camera.view_proj(context.aspect_ratio());

        self.back_bounds.update_view_proj(&context.queue, view_proj);
        self.front_bounds
            .update_view_proj(&context.queue, view_proj);
        self.raycast
            .write_uniforms(&context.queue, view_proj, camera.eye());

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Volume Render Encoder"),
            });

        // 1. exit points
        self.back_bounds
            .encode(&mut encoder, &self.targets.back.view, &self.box_vertex_buffer);
        // 2. entry points
        self.front_bounds.encode(
            &mut encoder,
            &self.targets.front.view,
            &self.box_vertex_buffer,
        );
        // 3-5. compositing pass over both targets
        self.raycast.encode(
            &mut encoder,
            surface_view,
            &self.box_vertex_buffer,
            background,
        );

        context.queue.submit(std::iter::once(encoder.finish()));
    }
}
