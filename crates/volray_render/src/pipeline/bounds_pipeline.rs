//! Ray bounds pass pipeline
//!
//! Renders the bounding box into an offscreen target, writing each
//! fragment's object-space coordinate as color. Built twice with
//! opposite culling configurations: the front-face variant produces ray
//! entry points, the back-face variant produces exit points.

use wgpu::util::DeviceExt;

use super::types::{box_vertex_layout, BoundsUniforms, BOX_VERTEX_COUNT};
use crate::shader::{ShaderError, ShaderProgram};
use crate::targets::BOUNDS_FORMAT;
use volray_math::Mat4;

/// One configuration of the coordinate-encoding pass
pub struct RayBoundsPipeline {
    /// The shader program this pipeline was built from
    program: ShaderProgram,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl RayBoundsPipeline {
    /// Build the pipeline from a loaded program
    ///
    /// The program's culling configuration selects which side of the box
    /// this pass keeps. Fails if `load()` has not completed.
    pub fn new(device: &wgpu::Device, program: ShaderProgram) -> Result<Self, ShaderError> {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Ray Bounds Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Ray Bounds Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(program.name()),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: program.vertex_module()?,
                entry_point: Some("vs_main"),
                buffers: &[box_vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: program.fragment_module()?,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: BOUNDS_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: program.cull_mode().to_wgpu(),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Ray Bounds Uniform Buffer"),
            contents: bytemuck::bytes_of(&BoundsUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Ray Bounds Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            program,
            pipeline,
            uniform_buffer,
            bind_group,
        })
    }

    /// Upload the current view-projection matrix
    pub fn update_view_proj(&self, queue: &wgpu::Queue, view_proj: Mat4) {
        let uniforms = BoundsUniforms { view_proj };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Encode the pass into an offscreen target
    ///
    /// Clears to transparent black so uncovered pixels decode as a
    /// zero-length ray, which the raycast pass discards.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        box_vertices: &wgpu::Buffer,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(self.program.name()),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, box_vertices.slice(..));
        render_pass.draw(0..BOX_VERTEX_COUNT as u32, 0..1);
    }
}
