//! Volume data container
//!
//! A [`VolumeData`] owns a 3D scalar field decoded from raw unsigned
//! 16-bit little-endian samples. Samples are normalized to [0, 1] at
//! construction time by dividing by the observed maximum; the raw peak
//! is retained in `max_value` for scale correction and for the
//! histogram widget.
//!
//! Volumes are immutable after construction. Loading a new file always
//! builds a fresh `VolumeData` which replaces the previous one
//! wholesale.

use crate::VolumeError;
use std::path::Path;
use volray_math::Vec3;

/// Dimensions of a voxel grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VolumeDims {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl VolumeDims {
    /// Create new dimensions
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Total number of voxels
    pub fn voxel_count(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }
}

/// A normalized 3D scalar field
#[derive(Debug)]
pub struct VolumeData {
    dims: VolumeDims,
    /// Flat array of length `width * height * depth`, values in [0, 1],
    /// X fastest, then Y, then Z
    voxels: Vec<f32>,
    /// Observed peak of the raw samples before normalization
    max_value: f32,
}

impl VolumeData {
    /// Build a volume from raw u16 samples
    ///
    /// Fails if any dimension is zero or the sample count does not
    /// match the dimensions. Every sample is divided by the observed
    /// maximum so the normalized peak is exactly 1.0; an all-zero
    /// volume stays all zero.
    pub fn from_u16_slice(samples: &[u16], dims: VolumeDims) -> Result<Self, VolumeError> {
        if dims.width == 0 || dims.height == 0 || dims.depth == 0 {
            return Err(VolumeError::ZeroDimension {
                width: dims.width,
                height: dims.height,
                depth: dims.depth,
            });
        }
        let expected = dims.voxel_count();
        if samples.len() != expected {
            return Err(VolumeError::DimensionMismatch {
                expected,
                actual: samples.len(),
            });
        }

        let max_raw = samples.iter().copied().max().unwrap_or(0);
        let max_value = max_raw as f32;
        let scale = if max_raw > 0 { 1.0 / max_value } else { 0.0 };
        let voxels = samples.iter().map(|&s| s as f32 * scale).collect();

        Ok(Self {
            dims,
            voxels,
            max_value,
        })
    }

    /// Decode a raw little-endian u16 byte stream
    pub fn from_le_bytes(bytes: &[u8], dims: VolumeDims) -> Result<Self, VolumeError> {
        if bytes.len() % 2 != 0 {
            return Err(VolumeError::TruncatedStream { len: bytes.len() });
        }
        let samples: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        Self::from_u16_slice(&samples, dims)
    }

    /// Load a volume from a raw file on disk
    ///
    /// One-shot operation: on failure nothing is constructed and the
    /// caller keeps whatever volume it had before.
    pub fn load<P: AsRef<Path>>(path: P, dims: VolumeDims) -> Result<Self, VolumeError> {
        let bytes = std::fs::read(path.as_ref())?;
        let volume = Self::from_le_bytes(&bytes, dims)?;
        log::info!(
            "Loaded volume {}x{}x{} from {} (raw max {})",
            dims.width,
            dims.height,
            dims.depth,
            path.as_ref().display(),
            volume.max_value
        );
        Ok(volume)
    }

    /// Grid dimensions
    pub fn dims(&self) -> VolumeDims {
        self.dims
    }

    /// Normalized voxel values, length `width * height * depth`
    pub fn voxels(&self) -> &[f32] {
        &self.voxels
    }

    /// Peak of the raw samples before normalization
    pub fn max_value(&self) -> f32 {
        self.max_value
    }

    /// Normalized value at a grid coordinate (clamped to the grid)
    pub fn voxel(&self, x: u32, y: u32, z: u32) -> f32 {
        let x = x.min(self.dims.width - 1) as usize;
        let y = y.min(self.dims.height - 1) as usize;
        let z = z.min(self.dims.depth - 1) as usize;
        let w = self.dims.width as usize;
        let h = self.dims.height as usize;
        self.voxels[(z * h + y) * w + x]
    }

    /// Trilinear sample at a point in the unit cube
    ///
    /// Coordinates outside [0, 1] are clamped to the boundary, matching
    /// the clamp-to-edge sampler the GPU path uses.
    pub fn sample(&self, p: Vec3) -> f32 {
        let p = p.clamp_components(0.0, 1.0);

        // Map [0,1] onto voxel centers of an (n-1)-cell grid
        let fx = p.x * (self.dims.width - 1) as f32;
        let fy = p.y * (self.dims.height - 1) as f32;
        let fz = p.z * (self.dims.depth - 1) as f32;

        let x0 = fx.floor() as u32;
        let y0 = fy.floor() as u32;
        let z0 = fz.floor() as u32;
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;
        let tz = fz - z0 as f32;

        let c000 = self.voxel(x0, y0, z0);
        let c100 = self.voxel(x0 + 1, y0, z0);
        let c010 = self.voxel(x0, y0 + 1, z0);
        let c110 = self.voxel(x0 + 1, y0 + 1, z0);
        let c001 = self.voxel(x0, y0, z0 + 1);
        let c101 = self.voxel(x0 + 1, y0, z0 + 1);
        let c011 = self.voxel(x0, y0 + 1, z0 + 1);
        let c111 = self.voxel(x0 + 1, y0 + 1, z0 + 1);

        let c00 = c000 + (c100 - c000) * tx;
        let c10 = c010 + (c110 - c010) * tx;
        let c01 = c001 + (c101 - c001) * tx;
        let c11 = c011 + (c111 - c011) * tx;

        let c0 = c00 + (c10 - c00) * ty;
        let c1 = c01 + (c11 - c01) * ty;

        c0 + (c1 - c0) * tz
    }

    /// Density histogram over the normalized values
    ///
    /// Read by the UI collaborator; the core never consumes it.
    pub fn histogram(&self, bins: usize) -> Vec<u32> {
        let mut counts = vec![0u32; bins.max(1)];
        let last = counts.len() - 1;
        for &v in &self.voxels {
            let bin = ((v * counts.len() as f32) as usize).min(last);
            counts[bin] += 1;
        }
        counts
    }
}
