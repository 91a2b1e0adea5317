//! CPU reference compositor
//!
//! This module is the authoritative definition of the compositing
//! semantics the WGSL raycast shader implements: fixed-step marching
//! from entry to exit, maximum-intensity projection, and first-hit
//! iso-surface compositing with an optional second surface and
//! gradient shading.
//!
//! The GPU path is not observable from unit tests, so the invariants of
//! the pipeline (order independence of MIP, first-hit positions, alpha
//! compositing) are checked against this implementation instead. The
//! constants below are mirrored verbatim in `raycast.wgsl`.

use crate::{CompositingMode, RaycastParams, VolumeData};
use volray_math::Vec3;

/// Fixed number of marching steps per ray
///
/// Calibrated for visual quality on volumes up to ~512 voxels per axis;
/// one step then advances less than half a voxel along the diagonal.
pub const DEFAULT_STEP_COUNT: usize = 256;

/// Central-difference offset for gradient estimation, in unit-cube units
pub const GRADIENT_EPSILON: f32 = 0.01;

/// Rays shorter than this are treated as grazing the box edge and
/// produce no fragment
pub const MIN_SEGMENT_LENGTH: f32 = 1e-4;

/// Ambient term for first-hit shading
pub const SHADING_AMBIENT: f32 = 0.3;

/// Diffuse term for first-hit shading
pub const SHADING_DIFFUSE: f32 = 0.7;

/// Entry and exit points of a viewing ray, in object space [0, 1]^3
#[derive(Clone, Copy, Debug)]
pub struct RaySegment {
    pub entry: Vec3,
    pub exit: Vec3,
}

impl RaySegment {
    pub const fn new(entry: Vec3, exit: Vec3) -> Self {
        Self { entry, exit }
    }
}

/// Composite one ray through the volume
///
/// Returns a straight-alpha RGBA color, or `None` when the ray produces
/// no fragment (zero-length segment, all-zero MIP, or no iso crossing).
/// `None` is the discard case: the background must show through
/// untouched.
pub fn composite(
    volume: &VolumeData,
    params: &RaycastParams,
    seg: RaySegment,
    camera_position: Vec3,
    steps: usize,
    volume_scale: f32,
) -> Option<[f32; 4]> {
    let dir = seg.exit - seg.entry;
    if dir.length() < MIN_SEGMENT_LENGTH || steps == 0 {
        return None;
    }

    match params.mode {
        CompositingMode::Mip => composite_mip(volume, seg, dir, steps, volume_scale),
        CompositingMode::FirstHit => {
            composite_first_hit(volume, params, seg, dir, camera_position, steps)
        }
    }
}

/// Composite a straight-alpha color over an opaque background
pub fn over(color: Option<[f32; 4]>, background: [f32; 3]) -> [f32; 3] {
    match color {
        None => background,
        Some([r, g, b, a]) => [
            r * a + background[0] * (1.0 - a),
            g * a + background[1] * (1.0 - a),
            b * a + background[2] * (1.0 - a),
        ],
    }
}

fn composite_mip(
    volume: &VolumeData,
    seg: RaySegment,
    dir: Vec3,
    steps: usize,
    volume_scale: f32,
) -> Option<[f32; 4]> {
    let mut max_density = 0.0f32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let d = volume.sample(seg.entry + dir * t);
        max_density = max_density.max(d);
    }
    if max_density <= 0.0 {
        return None;
    }
    let g = (max_density * volume_scale).clamp(0.0, 1.0);
    Some([g, g, g, 1.0])
}

/// A single iso-surface crossing along the march
struct Hit {
    t: f32,
    position: Vec3,
    color: [f32; 3],
    alpha: f32,
}

fn composite_first_hit(
    volume: &VolumeData,
    params: &RaycastParams,
    seg: RaySegment,
    dir: Vec3,
    camera_position: Vec3,
    steps: usize,
) -> Option<[f32; 4]> {
    let mut hits: [Option<Hit>; 2] = [None, None];
    let mut prev = 0.0f32;

    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let position = seg.entry + dir * t;
        let d = volume.sample(position);

        for (idx, surface) in params.iso.iter().enumerate() {
            if idx == 1 && !params.second_iso_enabled {
                continue;
            }
            // First ascending crossing along the march order wins
            if hits[idx].is_none() && prev < surface.value && d >= surface.value {
                hits[idx] = Some(Hit {
                    t,
                    position,
                    color: surface.color,
                    alpha: surface.alpha,
                });
            }
        }
        prev = d;
    }

    let mut found: Vec<Hit> = hits.into_iter().flatten().collect();
    if found.is_empty() {
        return None;
    }
    // The surface closer to the entry point wins depth ordering
    found.sort_by(|a, b| a.t.total_cmp(&b.t));

    let shaded = |hit: &Hit| -> [f32; 3] {
        if params.shading_enabled {
            shade(volume, hit.position, hit.color, camera_position)
        } else {
            hit.color
        }
    };

    let near = &found[0];
    let near_color = shaded(near);
    let (rgb_premul, alpha) = if let Some(far) = found.get(1) {
        // Alpha-over: near surface in front of the far one
        let far_color = shaded(far);
        let a = near.alpha + far.alpha * (1.0 - near.alpha);
        let rgb = [
            near_color[0] * near.alpha + far_color[0] * far.alpha * (1.0 - near.alpha),
            near_color[1] * near.alpha + far_color[1] * far.alpha * (1.0 - near.alpha),
            near_color[2] * near.alpha + far_color[2] * far.alpha * (1.0 - near.alpha),
        ];
        (rgb, a)
    } else {
        (
            [
                near_color[0] * near.alpha,
                near_color[1] * near.alpha,
                near_color[2] * near.alpha,
            ],
            near.alpha,
        )
    };

    if alpha <= 0.0 {
        // Fully transparent hit: background shows through exactly
        return Some([0.0, 0.0, 0.0, 0.0]);
    }
    Some([
        rgb_premul[0] / alpha,
        rgb_premul[1] / alpha,
        rgb_premul[2] / alpha,
        alpha,
    ])
}

/// Directional shading from the local density gradient
///
/// The outward surface normal is the negated gradient (density rises
/// into the object). The light sits at the camera, headlight style.
fn shade(volume: &VolumeData, p: Vec3, color: [f32; 3], camera_position: Vec3) -> [f32; 3] {
    let e = GRADIENT_EPSILON;
    let gradient = Vec3::new(
        volume.sample(p + Vec3::X * e) - volume.sample(p - Vec3::X * e),
        volume.sample(p + Vec3::Y * e) - volume.sample(p - Vec3::Y * e),
        volume.sample(p + Vec3::Z * e) - volume.sample(p - Vec3::Z * e),
    );
    if gradient.length() < 1e-6 {
        return color;
    }
    let normal = (-gradient).normalized();
    // Object space [0,1] to world space (cube centered at the origin)
    let world = p - Vec3::splat(0.5);
    let light = (camera_position - world).normalized();
    let diffuse = normal.dot(light).max(0.0);
    let factor = SHADING_AMBIENT + SHADING_DIFFUSE * diffuse;
    [color[0] * factor, color[1] * factor, color[2] * factor]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{VolumeData, VolumeDims};

    /// Volume whose density ramps 0 to 1 along +Z
    fn ramp_volume() -> VolumeData {
        let dims = VolumeDims::new(4, 4, 16);
        let mut samples = vec![0u16; dims.voxel_count()];
        for z in 0..16usize {
            let v = (z as f32 / 15.0 * 1000.0) as u16;
            for i in 0..16usize {
                samples[z * 16 + i] = v;
            }
        }
        VolumeData::from_u16_slice(&samples, dims).unwrap()
    }

    fn z_ray() -> RaySegment {
        RaySegment::new(Vec3::new(0.5, 0.5, 0.0), Vec3::new(0.5, 0.5, 1.0))
    }

    fn camera() -> Vec3 {
        Vec3::new(0.0, 0.0, 2.0)
    }

    #[test]
    fn test_zero_length_ray_discards() {
        let vol = ramp_volume();
        let p = Vec3::splat(0.5);
        let seg = RaySegment::new(p, p);
        let out = composite(&vol, &RaycastParams::default(), seg, camera(), 256, 1.0);
        assert!(out.is_none());
    }

    #[test]
    fn test_mip_reversal_same_max() {
        let vol = ramp_volume();
        let params = RaycastParams::default();
        let fwd = composite(&vol, &params, z_ray(), camera(), 128, 1.0).unwrap();
        let rev = RaySegment::new(z_ray().exit, z_ray().entry);
        let bwd = composite(&vol, &params, rev, camera(), 128, 1.0).unwrap();
        assert!((fwd[0] - bwd[0]).abs() < 1e-5);
    }

    #[test]
    fn test_first_hit_ramp_crossing_position() {
        let vol = ramp_volume();
        let mut params = RaycastParams::default();
        params.mode = CompositingMode::FirstHit;
        params.iso[0].value = 0.5;
        params.iso[0].alpha = 1.0;

        // Locate the crossing on the march grid
        let steps = 256;
        let step = 1.0 / steps as f32;
        let crossing = (0..=steps)
            .map(|i| i as f32 * step)
            .find(|&t| vol.sample(Vec3::new(0.5, 0.5, t)) >= 0.5)
            .unwrap();
        // Density ramps linearly in z, so the crossing is near z = 0.5
        assert!((crossing - 0.5).abs() <= step + 0.05);

        // Bracket the crossing with truncated segments: a segment that
        // stops short of it must miss, one that reaches past it must hit
        let segment_to = |z: f32| {
            RaySegment::new(Vec3::new(0.5, 0.5, 0.0), Vec3::new(0.5, 0.5, z))
        };
        let short = composite(&vol, &params, segment_to(crossing - 2.0 * step), camera(), steps, 1.0);
        assert!(short.is_none());
        let past = composite(&vol, &params, segment_to(crossing + 2.0 * step), camera(), steps, 1.0)
            .unwrap();
        assert_eq!(&past[..3], &params.iso[0].color);
    }

    #[test]
    fn test_iso_above_range_misses_everywhere() {
        let vol = ramp_volume();
        let mut params = RaycastParams::default();
        params.mode = CompositingMode::FirstHit;
        params.iso[0].value = 2.0;
        params.second_iso_enabled = false;
        let out = composite(&vol, &params, z_ray(), camera(), 256, 1.0);
        assert!(out.is_none());
    }

    #[test]
    fn test_zero_alpha_composites_to_background() {
        let vol = ramp_volume();
        let mut params = RaycastParams::default();
        params.mode = CompositingMode::FirstHit;
        params.iso[0].value = 0.5;
        params.iso[0].alpha = 0.0;
        let bg = [0.1, 0.2, 0.3];
        let out = composite(&vol, &params, z_ray(), camera(), 256, 1.0);
        assert_eq!(over(out, bg), bg);
    }

    #[test]
    fn test_second_surface_nearer_wins_depth_order() {
        let vol = ramp_volume();
        let mut params = RaycastParams::default();
        params.mode = CompositingMode::FirstHit;
        params.shading_enabled = false;
        // Surface 2 has the lower threshold: hit first along the ramp
        params.iso[0] = crate::IsoSurface::new(0.8, 1.0, [1.0, 0.0, 0.0]);
        params.iso[1] = crate::IsoSurface::new(0.2, 1.0, [0.0, 0.0, 1.0]);
        params.second_iso_enabled = true;

        let out = composite(&vol, &params, z_ray(), camera(), 256, 1.0).unwrap();
        // Opaque near surface hides the far one entirely
        assert_eq!(&out[..3], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_disabling_second_surface_removes_it() {
        let vol = ramp_volume();
        let mut params = RaycastParams::default();
        params.mode = CompositingMode::FirstHit;
        params.iso[0] = crate::IsoSurface::new(0.8, 1.0, [1.0, 0.0, 0.0]);
        params.iso[1] = crate::IsoSurface::new(0.2, 1.0, [0.0, 0.0, 1.0]);

        params.second_iso_enabled = true;
        let with_second = composite(&vol, &params, z_ray(), camera(), 256, 1.0).unwrap();
        params.second_iso_enabled = false;
        let without = composite(&vol, &params, z_ray(), camera(), 256, 1.0).unwrap();
        params.second_iso_enabled = true;
        let again = composite(&vol, &params, z_ray(), camera(), 256, 1.0).unwrap();

        assert_ne!(with_second, without);
        // Toggling off and back on restores identical output
        assert_eq!(with_second, again);
    }

    #[test]
    fn test_mip_all_zero_discards() {
        let dims = VolumeDims::new(2, 2, 2);
        let vol = VolumeData::from_u16_slice(&[0u16; 8], dims).unwrap();
        let out = composite(&vol, &RaycastParams::default(), z_ray(), camera(), 64, 1.0);
        assert!(out.is_none());
    }

    #[test]
    fn test_shading_darkens_backfacing_surface() {
        let vol = ramp_volume();
        let mut params = RaycastParams::default();
        params.mode = CompositingMode::FirstHit;
        params.iso[0] = crate::IsoSurface::new(0.5, 1.0, [1.0, 1.0, 1.0]);

        let unshaded = composite(&vol, &params, z_ray(), camera(), 256, 1.0).unwrap();
        params.shading_enabled = true;
        // Camera behind the ray origin: the surface normal (-Z, against
        // the ramp) faces it, so some diffuse light survives
        let cam = Vec3::new(0.0, 0.0, -2.0);
        let shaded = composite(&vol, &params, z_ray(), cam, 256, 1.0).unwrap();
        assert!(shaded[0] <= unshaded[0]);
        assert!(shaded[0] >= SHADING_AMBIENT * unshaded[0] - 1e-4);
    }
}
