//! Raycast compositing pipeline
//!
//! The central pass: consumes the volume's 3D density texture plus the
//! two coordinate textures from the ray bounds passes and composites a
//! final color per screen fragment. Parameter state lives in the
//! owned [`ShaderProgram`]'s uniform table and is packed into a
//! [`RaycastUniforms`] buffer once per frame, so values written before
//! the program finished loading are applied on the first flush.

use wgpu::util::DeviceExt;

use super::types::{box_vertex_layout, RaycastUniforms, BOX_VERTEX_COUNT};
use crate::shader::{ShaderError, ShaderProgram, UniformValue};
use volray_core::{RaycastParams, VolumeData};
use volray_math::{Mat4, Vec3};

/// GPU resources for the currently loaded volume
struct VolumeTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// The raycast compositor
pub struct RaycastPipeline {
    program: ShaderProgram,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    volume_sampler: wgpu::Sampler,
    volume: Option<VolumeTexture>,
    /// Rebuilt whenever the volume or the bounds targets change
    bind_group: Option<wgpu::BindGroup>,
}

impl RaycastPipeline {
    /// Build the pipeline from a loaded program
    pub fn new(
        device: &wgpu::Device,
        program: ShaderProgram,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, ShaderError> {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Raycast Bind Group Layout"),
            entries: &[
                // Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Volume density texture (trilinear)
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D3,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                // Ray entry coordinates (front faces), fetched per pixel
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Ray exit coordinates (back faces)
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Raycast Pipeline Layout"),
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
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
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
            label: Some("Raycast Uniform Buffer"),
            contents: bytemuck::bytes_of(&RaycastUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let volume_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Volume Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            program,
            pipeline,
            bind_group_layout,
            uniform_buffer,
            volume_sampler,
            volume: None,
            bind_group: None,
        })
    }

    /// Write the full parameter state into the program's uniform table
    pub fn apply_params(&mut self, params: &RaycastParams) {
        let p = &mut self.program;
        p.set_uniform("mode", UniformValue::Int(params.mode.as_index() as i32));
        p.set_uniform("iso_value_1", UniformValue::Float(params.iso[0].value));
        p.set_uniform("iso_alpha_1", UniformValue::Float(params.iso[0].alpha));
        p.set_uniform("iso_color_1", UniformValue::Vec3(params.iso[0].color));
        p.set_uniform("iso_value_2", UniformValue::Float(params.iso[1].value));
        p.set_uniform("iso_alpha_2", UniformValue::Float(params.iso[1].alpha));
        p.set_uniform("iso_color_2", UniformValue::Vec3(params.iso[1].color));
        p.set_uniform(
            "second_iso_enabled",
            UniformValue::Bool(params.second_iso_enabled),
        );
        p.set_uniform(
            "shading_enabled",
            UniformValue::Bool(params.shading_enabled),
        );
    }

    /// Set a single uniform directly (step count, volume scale, ...)
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.program.set_uniform(name, value);
    }

    /// Upload a volume as a 3D texture and drop the previous one
    ///
    /// The replacement is wholesale: texture and bind group are rebuilt
    /// before the next frame can sample them, so no frame ever mixes
    /// old and new volume state. The MIP scale correction follows the
    /// volume: its raw peak undoes the load-time normalization.
    pub fn set_volume(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, volume: &VolumeData) {
        self.program
            .set_uniform("volume_scale", UniformValue::Float(volume.max_value()));
        let dims = volume.dims();
        let size = wgpu::Extent3d {
            width: dims.width,
            height: dims.height,
            depth_or_array_layers: dims.depth,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Volume Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D3,
            format: wgpu::TextureFormat::R32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(volume.voxels()),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(dims.width * 4),
                rows_per_image: Some(dims.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.volume = Some(VolumeTexture {
            _texture: texture,
            view,
        });
        // Invalidated until the caller provides the bounds targets again
        self.bind_group = None;
    }

    /// Whether a volume texture is resident
    pub fn has_volume(&self) -> bool {
        self.volume.is_some()
    }

    /// Rebuild the bind group against the current bounds targets
    ///
    /// Call after `set_volume` and after the targets were recreated on
    /// resize. No-op while no volume is loaded.
    pub fn rebuild_bind_group(
        &mut self,
        device: &wgpu::Device,
        front: &wgpu::TextureView,
        back: &wgpu::TextureView,
    ) {
        let Some(volume) = &self.volume else {
            return;
        };
        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Raycast Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&volume.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.volume_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(front),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(back),
                },
            ],
        }));
    }

    /// Flush the uniform table to the GPU
    ///
    /// Refreshes the camera position (the camera may have moved since
    /// the last frame) and packs every buffered parameter.
    pub fn write_uniforms(&mut self, queue: &wgpu::Queue, view_proj: Mat4, camera_position: Vec3) {
        self.program.set_uniform(
            "camera_position",
            UniformValue::Vec3(camera_position.to_array()),
        );
        let uniforms = pack_uniforms(&self.program, view_proj);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Encode the on-screen compositing pass
    ///
    /// Clears to the background color; fragments with no hit discard so
    /// the background stays untouched.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        box_vertices: &wgpu::Buffer,
        background: wgpu::Color,
    ) {
        let Some(bind_group) = &self.bind_group else {
            return;
        };
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(self.program.name()),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(background),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, bind_group, &[]);
        render_pass.set_vertex_buffer(0, box_vertices.slice(..));
        render_pass.draw(0..BOX_VERTEX_COUNT as u32, 0..1);
    }
}

/// Pack the program's uniform table into the GPU layout
///
/// Pure function of the table contents: equal tables produce equal
/// uniform buffers, so toggling a parameter off and on again restores
/// bit-identical state.
pub fn pack_uniforms(program: &ShaderProgram, view_proj: Mat4) -> RaycastUniforms {
    let d = RaycastUniforms::default();
    RaycastUniforms {
        view_proj,
        camera_position: program.vec3_or("camera_position", d.camera_position),
        // The shader divides by the step count; never let 0 through
        step_count: program.u32_or("step_count", d.step_count).max(1),
        iso_color_1: program.vec3_or("iso_color_1", d.iso_color_1),
        iso_value_1: program.float_or("iso_value_1", d.iso_value_1),
        iso_color_2: program.vec3_or("iso_color_2", d.iso_color_2),
        iso_value_2: program.float_or("iso_value_2", d.iso_value_2),
        iso_alpha_1: program.float_or("iso_alpha_1", d.iso_alpha_1),
        iso_alpha_2: program.float_or("iso_alpha_2", d.iso_alpha_2),
        volume_scale: program.float_or("volume_scale", d.volume_scale),
        mode: program.u32_or("mode", d.mode),
        second_iso_enabled: program.u32_or("second_iso_enabled", d.second_iso_enabled),
        shading_enabled: program.u32_or("shading_enabled", d.shading_enabled),
        _pad: [0; 2],
    }
}
