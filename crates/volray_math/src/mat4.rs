//! 4x4 matrix helpers for camera transforms
//!
//! Matrices are stored as `[[f32; 4]; 4]` in the layout expected by WGSL
//! `mat4x4<f32>` uniforms (column vectors, rows of the array are columns).

use crate::Vec3;

/// 4x4 matrix type
pub type Mat4 = [[f32; 4]; 4];

/// Identity matrix
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Create a perspective projection matrix
///
/// `fov_y` is the vertical field of view in radians.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fov_y / 2.0).tan();
    let nf = 1.0 / (near - far);

    [
        [f / aspect, 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, (far + near) * nf, -1.0],
        [0.0, 0.0, 2.0 * far * near * nf, 0.0],
    ]
}

/// Create a right-handed look-at view matrix
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let f = (target - eye).normalized();
    let s = f.cross(up).normalized();
    let u = s.cross(f);

    [
        [s.x, u.x, -f.x, 0.0],
        [s.y, u.y, -f.y, 0.0],
        [s.z, u.z, -f.z, 0.0],
        [-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0],
    ]
}

/// Multiply two 4x4 matrices (`a` applied after `b`)
pub fn mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut result = [[0.0f32; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            result[col][row] = a[0][row] * b[col][0]
                + a[1][row] * b[col][1]
                + a[2][row] * b[col][2]
                + a[3][row] * b[col][3];
        }
    }
    result
}

/// Transform a point by a matrix (w = 1, with perspective divide)
pub fn transform_point(m: Mat4, p: Vec3) -> Vec3 {
    let x = m[0][0] * p.x + m[1][0] * p.y + m[2][0] * p.z + m[3][0];
    let y = m[0][1] * p.x + m[1][1] * p.y + m[2][1] * p.z + m[3][1];
    let z = m[0][2] * p.x + m[1][2] * p.y + m[2][2] * p.z + m[3][2];
    let w = m[0][3] * p.x + m[1][3] * p.y + m[2][3] * p.z + m[3][3];
    if w.abs() > 1e-8 {
        Vec3::new(x / w, y / w, z / w)
    } else {
        Vec3::new(x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perspective_nonzero() {
        let proj = perspective(std::f32::consts::FRAC_PI_4, 16.0 / 9.0, 0.1, 100.0);
        assert!(proj[0][0] != 0.0);
        assert!(proj[1][1] != 0.0);
    }

    #[test]
    fn test_identity_mul() {
        let proj = perspective(1.0, 1.0, 0.1, 10.0);
        assert_eq!(mul(proj, IDENTITY), proj);
        assert_eq!(mul(IDENTITY, proj), proj);
    }

    #[test]
    fn test_look_at_centers_target() {
        // A point at the look-at target projects onto the view axis
        let view = look_at(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y);
        let p = transform_point(view, Vec3::ZERO);
        assert!(p.x.abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
        assert!((p.z + 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_transform_point_identity() {
        let p = Vec3::new(1.0, -2.0, 3.0);
        assert_eq!(transform_point(IDENTITY, p), p);
    }

    #[test]
    fn test_mul_composes_left_to_right() {
        fn translation(t: Vec3) -> Mat4 {
            let mut m = IDENTITY;
            m[3][0] = t.x;
            m[3][1] = t.y;
            m[3][2] = t.z;
            m
        }
        let a = translation(Vec3::new(1.0, 0.0, 0.0));
        let b = translation(Vec3::new(0.0, 2.0, 0.0));
        let p = Vec3::new(0.0, 0.0, 5.0);
        // mul(a, b) applies b first, then a
        let composed = transform_point(mul(a, b), p);
        let stepwise = transform_point(a, transform_point(b, p));
        assert_eq!(composed, stepwise);
        assert_eq!(composed, Vec3::new(1.0, 2.0, 5.0));
    }
}
