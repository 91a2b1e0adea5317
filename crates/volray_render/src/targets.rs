//! Offscreen render targets for the ray bounds passes

/// Format of the coordinate textures: enough precision for object-space
/// positions, filterable, renderable everywhere
pub const BOUNDS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// One offscreen color target
pub struct TargetTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl TargetTexture {
    fn new(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: BOUNDS_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// The pair of entry/exit coordinate buffers
///
/// Owned by the frame orchestrator; written then read within the same
/// frame, recreated whenever the viewport size changes.
pub struct RenderTargets {
    pub front: TargetTexture,
    pub back: TargetTexture,
    size: (u32, u32),
}

impl RenderTargets {
    /// Create targets at the given viewport size
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            front: TargetTexture::new(device, "Front Face Buffer", width, height),
            back: TargetTexture::new(device, "Back Face Buffer", width, height),
            size: (width, height),
        }
    }

    /// Recreate both targets if the viewport size changed
    ///
    /// Returns true when the textures were replaced, in which case any
    /// bind group referencing them must be rebuilt.
    pub fn ensure_size(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        let width = width.max(1);
        let height = height.max(1);
        if self.size == (width, height) {
            return false;
        }
        *self = Self::new(device, width, height);
        true
    }

    /// Current target size
    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}
