//! Raycasting parameter state
//!
//! [`RaycastParams`] is the parameter surface the UI layer writes into.
//! Every field is independently mutable at any time; range clamping is
//! the caller's job, the core trusts its inputs.

/// Compositing strategy applied along each viewing ray
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompositingMode {
    /// Maximum-intensity projection: display the highest density seen
    #[default]
    Mip,
    /// Stop at the first iso-threshold crossing and shade that point
    FirstHit,
}

impl CompositingMode {
    /// Shader-side discriminant
    pub fn as_index(self) -> u32 {
        match self {
            CompositingMode::Mip => 0,
            CompositingMode::FirstHit => 1,
        }
    }

    /// Toggle between the two strategies
    pub fn toggled(self) -> Self {
        match self {
            CompositingMode::Mip => CompositingMode::FirstHit,
            CompositingMode::FirstHit => CompositingMode::Mip,
        }
    }
}

/// One iso-surface definition: threshold, opacity, and color
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IsoSurface {
    /// Density threshold in [0, 1]
    pub value: f32,
    /// Opacity in [0, 1]
    pub alpha: f32,
    /// RGB color in [0, 1]
    pub color: [f32; 3],
}

impl IsoSurface {
    pub const fn new(value: f32, alpha: f32, color: [f32; 3]) -> Self {
        Self {
            value,
            alpha,
            color,
        }
    }

    /// Convert a byte triple from the UI color picker
    pub fn with_rgb_bytes(mut self, rgb: [u8; 3]) -> Self {
        self.color = [
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        ];
        self
    }
}

/// Full compositing parameter state
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastParams {
    pub mode: CompositingMode,
    /// Primary and secondary iso-surface definitions
    pub iso: [IsoSurface; 2],
    /// Whether the secondary surface participates at all
    pub second_iso_enabled: bool,
    /// Gradient-based directional shading for first-hit surfaces
    pub shading_enabled: bool,
}

impl Default for RaycastParams {
    fn default() -> Self {
        Self {
            mode: CompositingMode::Mip,
            iso: [
                IsoSurface::new(0.3, 1.0, [1.0, 0.85, 0.7]),
                IsoSurface::new(0.15, 0.4, [0.4, 0.6, 1.0]),
            ],
            second_iso_enabled: false,
            shading_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_indices() {
        assert_eq!(CompositingMode::Mip.as_index(), 0);
        assert_eq!(CompositingMode::FirstHit.as_index(), 1);
    }

    #[test]
    fn test_mode_toggle_round_trip() {
        let m = CompositingMode::Mip;
        assert_eq!(m.toggled().toggled(), m);
    }

    #[test]
    fn test_rgb_bytes() {
        let iso = IsoSurface::new(0.5, 1.0, [0.0; 3]).with_rgb_bytes([255, 0, 51]);
        assert_eq!(iso.color[0], 1.0);
        assert_eq!(iso.color[1], 0.0);
        assert!((iso.color[2] - 0.2).abs() < 1e-6);
    }
}
