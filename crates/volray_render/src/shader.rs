//! Shader programs
//!
//! A [`ShaderProgram`] decouples "declare what a shader needs" from
//! "make it usable on the GPU". Construction is synchronous and never
//! touches the device; [`ShaderProgram::load`] compiles the registered
//! sources asynchronously, exactly once. Uniform values written before
//! the compile completes are buffered in the program's table and picked
//! up by the first flush after readiness.
//!
//! There is no class hierarchy: the ray-bounds passes and the raycast
//! compositor are distinct [`ShaderDesc`] configurations of this one
//! type, differing in source ids and culling mode.

use std::collections::HashMap;
use std::fmt;

/// Resolve a shader-source registry id to WGSL text
///
/// Ids are opaque strings as far as the rest of the system is
/// concerned; this function is the whole registry.
pub fn shader_source(id: &str) -> Option<&'static str> {
    match id {
        "ray_bounds_vert" | "ray_bounds_frag" => {
            Some(include_str!("shaders/ray_bounds.wgsl"))
        }
        "raycast_vert" | "raycast_frag" => Some(include_str!("shaders/raycast.wgsl")),
        _ => None,
    }
}

/// Face culling configuration, settable independently of uniforms
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CullConfig {
    /// Rasterize both windings
    #[default]
    None,
    /// Discard front faces (keeps the far side of the box)
    Front,
    /// Discard back faces (keeps the near side of the box)
    Back,
}

impl CullConfig {
    pub fn to_wgpu(self) -> Option<wgpu::Face> {
        match self {
            CullConfig::None => None,
            CullConfig::Front => Some(wgpu::Face::Front),
            CullConfig::Back => Some(wgpu::Face::Back),
        }
    }
}

/// Capability record describing one shader program
#[derive(Clone, Debug)]
pub struct ShaderDesc {
    /// Label used in logs and GPU debug markers
    pub name: &'static str,
    /// Registry id of the vertex stage source
    pub vertex_src: &'static str,
    /// Registry id of the fragment stage source
    pub fragment_src: &'static str,
    /// Face culling mode for pipelines built from this program
    pub cull: CullConfig,
}

/// A buffered uniform value
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec3([f32; 3]),
    Bool(bool),
}

impl UniformValue {
    /// Read as f32, if the value is a float
    pub fn as_float(&self) -> Option<f32> {
        match self {
            UniformValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Read as a shader-side u32 flag or discriminant
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            UniformValue::Int(v) => Some(*v as u32),
            UniformValue::Bool(v) => Some(*v as u32),
            _ => None,
        }
    }

    /// Read as a 3-vector
    pub fn as_vec3(&self) -> Option<[f32; 3]> {
        match self {
            UniformValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }
}

/// Compiled GPU state, present only after a successful `load`
struct CompiledProgram {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
}

/// A shader program with a buffered uniform table
pub struct ShaderProgram {
    desc: ShaderDesc,
    uniforms: HashMap<String, UniformValue>,
    compiled: Option<CompiledProgram>,
}

impl ShaderProgram {
    /// Declare a program; does not touch the GPU
    pub fn new(desc: ShaderDesc) -> Self {
        Self {
            desc,
            uniforms: HashMap::new(),
            compiled: None,
        }
    }

    /// Program label
    pub fn name(&self) -> &'static str {
        self.desc.name
    }

    /// Current culling configuration
    pub fn cull_mode(&self) -> CullConfig {
        self.desc.cull
    }

    /// Change the culling configuration
    ///
    /// Affects only rasterization state of pipelines built afterwards;
    /// independent of the uniform table.
    pub fn set_cull_mode(&mut self, cull: CullConfig) {
        self.desc.cull = cull;
    }

    /// Store or overwrite a named uniform value
    ///
    /// Constant time; the observable effect is deferred until the next
    /// flush of the owning pipeline's uniform buffer. Safe to call
    /// before `load` completes.
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.uniforms.insert(name.to_string(), value);
    }

    /// Look up a buffered uniform value
    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    /// Float uniform with a fallback default
    pub fn float_or(&self, name: &str, default: f32) -> f32 {
        self.uniform(name).and_then(|v| v.as_float()).unwrap_or(default)
    }

    /// Flag/discriminant uniform with a fallback default
    pub fn u32_or(&self, name: &str, default: u32) -> u32 {
        self.uniform(name).and_then(|v| v.as_u32()).unwrap_or(default)
    }

    /// Vec3 uniform with a fallback default
    pub fn vec3_or(&self, name: &str, default: [f32; 3]) -> [f32; 3] {
        self.uniform(name).and_then(|v| v.as_vec3()).unwrap_or(default)
    }

    /// Whether `load` has completed successfully
    pub fn is_loaded(&self) -> bool {
        self.compiled.is_some()
    }

    /// Compile both stages
    ///
    /// Single-shot and idempotent: a second call after success is a
    /// no-op. Compile errors are surfaced through a validation error
    /// scope and reported with the failing stage; a failed program
    /// stays unloaded and must not be drawn with.
    pub async fn load(&mut self, device: &wgpu::Device) -> Result<(), ShaderError> {
        if self.compiled.is_some() {
            return Ok(());
        }

        let vertex = compile_stage(device, &self.desc, "vertex", self.desc.vertex_src).await?;
        let fragment =
            compile_stage(device, &self.desc, "fragment", self.desc.fragment_src).await?;

        log::info!("Compiled shader program '{}'", self.desc.name);
        self.compiled = Some(CompiledProgram { vertex, fragment });
        Ok(())
    }

    /// Vertex stage module; fails if the program is not loaded
    pub fn vertex_module(&self) -> Result<&wgpu::ShaderModule, ShaderError> {
        self.compiled
            .as_ref()
            .map(|c| &c.vertex)
            .ok_or(ShaderError::NotLoaded(self.desc.name))
    }

    /// Fragment stage module; fails if the program is not loaded
    pub fn fragment_module(&self) -> Result<&wgpu::ShaderModule, ShaderError> {
        self.compiled
            .as_ref()
            .map(|c| &c.fragment)
            .ok_or(ShaderError::NotLoaded(self.desc.name))
    }
}

async fn compile_stage(
    device: &wgpu::Device,
    desc: &ShaderDesc,
    stage: &'static str,
    source_id: &'static str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    let source =
        shader_source(source_id).ok_or_else(|| ShaderError::UnknownSource(source_id.to_string()))?;

    let label = format!("{} {}", desc.name, stage);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label.as_str()),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    if let Some(error) = device.pop_error_scope().await {
        return Err(ShaderError::Compile {
            stage,
            message: error.to_string(),
        });
    }
    Ok(module)
}

/// Error type for shader program operations
#[derive(Debug)]
pub enum ShaderError {
    /// The registry has no source for the given id
    UnknownSource(String),
    /// Compilation failed for one stage
    Compile {
        stage: &'static str,
        message: String,
    },
    /// The program was used before `load` completed
    NotLoaded(&'static str),
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::UnknownSource(id) => write!(f, "Unknown shader source id '{}'", id),
            ShaderError::Compile { stage, message } => {
                write!(f, "Shader {} stage failed to compile: {}", stage, message)
            }
            ShaderError::NotLoaded(name) => {
                write!(f, "Shader program '{}' used before load() completed", name)
            }
        }
    }
}

impl std::error::Error for ShaderError {}
