//! Orbit camera
//!
//! The camera orbits a fixed target (the volume center) on a sphere.
//! The orbit radius is clamped to a minimum distance so the eye stays
//! outside the bounding box; the raycast shader assumes rays always
//! enter the volume from outside.

use volray_input::OrbitControl;
use volray_math::{mat4, Mat4, Vec3};

/// Pitch stops short of the poles to keep the view basis well defined
const PITCH_LIMIT: f32 = 1.5;

/// Orbit camera around the volume center
pub struct Camera {
    yaw: f32,
    pitch: f32,
    radius: f32,
    pub target: Vec3,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    min_radius: f32,
    max_radius: f32,
    initial_radius: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1.5)
    }
}

impl Camera {
    /// Create a camera at the given orbit radius, looking at the origin
    pub fn new(radius: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            radius,
            target: Vec3::ZERO,
            fov_y: 75.0f32.to_radians(),
            near: 0.1,
            far: 100.0,
            // Half-diagonal of the unit cube is ~0.87; stay clear of it
            min_radius: 1.0,
            max_radius: 20.0,
            initial_radius: radius,
        }
    }

    /// Builder: set the zoom range (clamped so min stays outside the box)
    pub fn with_radius_range(mut self, min: f32, max: f32) -> Self {
        self.min_radius = min.max(1.0);
        self.max_radius = max.max(self.min_radius);
        self.radius = self.radius.clamp(self.min_radius, self.max_radius);
        self
    }

    /// Builder: set the projection parameters
    pub fn with_projection(mut self, fov_y_degrees: f32, near: f32, far: f32) -> Self {
        self.fov_y = fov_y_degrees.to_radians();
        self.near = near;
        self.far = far;
        self
    }

    /// Eye position in world space
    pub fn eye(&self) -> Vec3 {
        let cp = self.pitch.cos();
        let offset = Vec3::new(
            cp * self.yaw.sin(),
            self.pitch.sin(),
            cp * self.yaw.cos(),
        ) * self.radius;
        self.target + offset
    }

    /// View matrix looking at the target
    pub fn view_matrix(&self) -> Mat4 {
        mat4::look_at(self.eye(), self.target, Vec3::Y)
    }

    /// Combined view-projection matrix for the given aspect ratio
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        mat4::mul(
            mat4::perspective(self.fov_y, aspect, self.near, self.far),
            self.view_matrix(),
        )
    }

    /// Current orbit radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Reset to the starting orientation and distance
    pub fn reset(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.radius = self.initial_radius;
    }
}

impl OrbitControl for Camera {
    fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    fn zoom(&mut self, delta: f32) {
        self.radius = (self.radius - delta).clamp(self.min_radius, self.max_radius);
    }
}
