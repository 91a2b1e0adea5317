//! End-to-end compositing scenarios against the CPU reference
//!
//! These tests build small volumes and march grids of rays through
//! them, checking the observable image properties the viewer depends
//! on: a bright voxel dominates MIP from any direction, and first-hit
//! surfaces blend over the background by their alpha.

use volray_core::raycast::{composite, over, RaySegment};
use volray_core::{CompositingMode, IsoSurface, RaycastParams, VolumeData, VolumeDims};
use volray_math::Vec3;

const STEPS: usize = 256;

/// 8x8x8 volume with a dim baseline and one bright voxel at (2, 5, 3)
fn bright_voxel_volume() -> VolumeData {
    let dims = VolumeDims::new(8, 8, 8);
    let mut samples = vec![100u16; dims.voxel_count()];
    let (x, y, z) = (2usize, 5usize, 3usize);
    samples[(z * 8 + y) * 8 + x] = 1000;
    VolumeData::from_u16_slice(&samples, dims).unwrap()
}

/// Object-space coordinate of voxel index i on an 8-wide axis
fn voxel_coord(i: usize) -> f32 {
    i as f32 / 7.0
}

fn mip_gray_scaled(volume: &VolumeData, seg: RaySegment, volume_scale: f32) -> f32 {
    let params = RaycastParams {
        mode: CompositingMode::Mip,
        ..RaycastParams::default()
    };
    let out = composite(
        volume,
        &params,
        seg,
        Vec3::new(0.0, 0.0, 2.0),
        STEPS,
        volume_scale,
    )
    .expect("baseline density is nonzero, every ray produces a fragment");
    out[0]
}

fn mip_gray(volume: &VolumeData, seg: RaySegment) -> f32 {
    mip_gray_scaled(volume, seg, 1.0)
}

#[test]
fn mip_ray_through_bright_voxel_dominates_grid() {
    let volume = bright_voxel_volume();
    let (bx, by) = (voxel_coord(2), voxel_coord(5));

    let mut brightest = (0.0f32, 0.0f32, 0.0f32);
    for xi in 0..8 {
        for yi in 0..8 {
            let x = voxel_coord(xi);
            let y = voxel_coord(yi);
            let seg = RaySegment::new(Vec3::new(x, y, 0.0), Vec3::new(x, y, 1.0));
            let g = mip_gray(&volume, seg);
            if g > brightest.2 {
                brightest = (x, y, g);
            }
        }
    }

    assert_eq!(brightest.0, bx);
    assert_eq!(brightest.1, by);
    // The bright voxel normalizes to 1.0, the baseline to 0.1
    assert!(brightest.2 > 0.5);
}

#[test]
fn mip_bright_voxel_visible_from_all_axes() {
    let volume = bright_voxel_volume();
    let (x, y, z) = (voxel_coord(2), voxel_coord(5), voxel_coord(3));

    let along_z = RaySegment::new(Vec3::new(x, y, 0.0), Vec3::new(x, y, 1.0));
    let along_x = RaySegment::new(Vec3::new(0.0, y, z), Vec3::new(1.0, y, z));
    let along_y = RaySegment::new(Vec3::new(x, 0.0, z), Vec3::new(x, 1.0, z));

    let gz = mip_gray(&volume, along_z);
    let gx = mip_gray(&volume, along_x);
    let gy = mip_gray(&volume, along_y);

    // Same maximum regardless of the marching axis, up to step placement
    assert!((gz - gx).abs() < 0.05, "z={gz} x={gx}");
    assert!((gz - gy).abs() < 0.05, "z={gz} y={gy}");
    assert!(gz > 0.5);
}

#[test]
fn mip_scale_correction_undoes_normalization() {
    // Away from the bright voxel the normalized density is 0.1; scale
    // correction by the raw peak restores the pre-normalization level
    // (clamped at white)
    let volume = bright_voxel_volume();
    assert_eq!(volume.max_value(), 1000.0);
    let (x, y) = (voxel_coord(6), voxel_coord(1));
    let seg = RaySegment::new(Vec3::new(x, y, 0.0), Vec3::new(x, y, 1.0));

    let unscaled = mip_gray_scaled(&volume, seg, 1.0);
    assert!((unscaled - 0.1).abs() < 0.02);
    let corrected = mip_gray_scaled(&volume, seg, volume.max_value());
    assert_eq!(corrected, 1.0);
}

#[test]
fn mip_away_from_bright_voxel_sees_baseline() {
    let volume = bright_voxel_volume();
    let (x, y) = (voxel_coord(6), voxel_coord(1));
    let seg = RaySegment::new(Vec3::new(x, y, 0.0), Vec3::new(x, y, 1.0));
    let g = mip_gray(&volume, seg);
    assert!((g - 0.1).abs() < 0.02, "baseline ray saw {g}");
}

#[test]
fn first_hit_semi_transparent_blends_with_background() {
    // Density ramps along +Z so the primary surface is crossed once
    let dims = VolumeDims::new(4, 4, 16);
    let mut samples = vec![0u16; dims.voxel_count()];
    for z in 0..16usize {
        let v = (z as f32 / 15.0 * 1000.0) as u16;
        for i in 0..16usize {
            samples[z * 16 + i] = v;
        }
    }
    let volume = VolumeData::from_u16_slice(&samples, dims).unwrap();

    let params = RaycastParams {
        mode: CompositingMode::FirstHit,
        iso: [
            IsoSurface::new(0.5, 0.5, [1.0, 0.0, 0.0]),
            IsoSurface::new(0.15, 0.4, [0.4, 0.6, 1.0]),
        ],
        second_iso_enabled: false,
        shading_enabled: false,
    };

    let seg = RaySegment::new(Vec3::new(0.5, 0.5, 0.0), Vec3::new(0.5, 0.5, 1.0));
    let out = composite(&volume, &params, seg, Vec3::new(0.0, 0.0, 2.0), STEPS, 1.0);

    let bg = [0.0, 0.0, 1.0];
    let blended = over(out, bg);
    // Half red over blue: both channels contribute
    assert!((blended[0] - 0.5).abs() < 1e-4);
    assert!((blended[2] - 0.5).abs() < 1e-4);
    assert_eq!(blended[1], 0.0);
}

#[test]
fn first_hit_miss_leaves_background_untouched() {
    let volume = bright_voxel_volume();
    let params = RaycastParams {
        mode: CompositingMode::FirstHit,
        iso: [
            // Above everything the baseline reaches away from the voxel
            IsoSurface::new(0.9, 1.0, [1.0, 0.0, 0.0]),
            IsoSurface::new(0.95, 1.0, [0.0, 1.0, 0.0]),
        ],
        second_iso_enabled: true,
        shading_enabled: false,
    };
    let (x, y) = (voxel_coord(6), voxel_coord(1));
    let seg = RaySegment::new(Vec3::new(x, y, 0.0), Vec3::new(x, y, 1.0));
    let out = composite(&volume, &params, seg, Vec3::new(0.0, 0.0, 2.0), STEPS, 1.0);
    assert!(out.is_none());

    let bg = [0.3, 0.1, 0.7];
    assert_eq!(over(out, bg), bg);
}
