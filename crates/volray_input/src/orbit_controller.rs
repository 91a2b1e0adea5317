//! Orbit camera controller
//!
//! Controls:
//! - Left-drag: orbit around the volume center
//! - Scroll wheel: zoom (distance to the center)
//!
//! The controller accumulates raw input events and applies them to a
//! camera once per frame in [`OrbitController::update`], so event
//! delivery rate and frame rate stay decoupled.

use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Camera-side interface for orbit input
///
/// Implemented by the renderer's camera; keeps this crate free of any
/// rendering types.
pub trait OrbitControl {
    /// Rotate around the target by yaw/pitch deltas in radians
    fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32);
    /// Move toward (positive) or away from (negative) the target
    fn zoom(&mut self, delta: f32);
}

/// Accumulates mouse input and drives an [`OrbitControl`] camera
pub struct OrbitController {
    dragging: bool,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_zoom: f32,

    // Configuration
    pub orbit_sensitivity: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitController {
    pub fn new() -> Self {
        Self {
            dragging: false,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 0.0,
            orbit_sensitivity: 0.005,
            zoom_speed: 0.1,
        }
    }

    /// Process mouse button input
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.dragging = state == ElementState::Pressed;
        }
    }

    /// Process raw mouse movement deltas
    pub fn process_mouse_motion(&mut self, delta_x: f64, delta_y: f64) {
        if self.dragging {
            self.pending_yaw += delta_x as f32;
            self.pending_pitch += delta_y as f32;
        }
    }

    /// Process scroll wheel input
    pub fn process_scroll(&mut self, delta: MouseScrollDelta) {
        let amount = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
        };
        self.pending_zoom += amount;
    }

    /// Whether the left button is currently held
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Apply accumulated input to the camera and reset the accumulators
    pub fn update<C: OrbitControl>(&mut self, camera: &mut C) {
        if self.pending_yaw != 0.0 || self.pending_pitch != 0.0 {
            camera.orbit(
                self.pending_yaw * self.orbit_sensitivity,
                self.pending_pitch * self.orbit_sensitivity,
            );
        }
        if self.pending_zoom != 0.0 {
            camera.zoom(self.pending_zoom * self.zoom_speed);
        }
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_zoom = 0.0;
    }

    /// Builder: set orbit sensitivity (radians per pixel)
    pub fn with_orbit_sensitivity(mut self, sensitivity: f32) -> Self {
        self.orbit_sensitivity = sensitivity;
        self
    }

    /// Builder: set zoom speed (distance per scroll line)
    pub fn with_zoom_speed(mut self, speed: f32) -> Self {
        self.zoom_speed = speed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCamera {
        yaw: f32,
        pitch: f32,
        distance: f32,
    }

    impl OrbitControl for TestCamera {
        fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
            self.yaw += delta_yaw;
            self.pitch += delta_pitch;
        }
        fn zoom(&mut self, delta: f32) {
            self.distance -= delta;
        }
    }

    fn camera() -> TestCamera {
        TestCamera {
            yaw: 0.0,
            pitch: 0.0,
            distance: 2.0,
        }
    }

    #[test]
    fn test_motion_ignored_without_drag() {
        let mut ctrl = OrbitController::new();
        let mut cam = camera();
        ctrl.process_mouse_motion(10.0, 5.0);
        ctrl.update(&mut cam);
        assert_eq!(cam.yaw, 0.0);
        assert_eq!(cam.pitch, 0.0);
    }

    #[test]
    fn test_drag_orbits() {
        let mut ctrl = OrbitController::new().with_orbit_sensitivity(0.01);
        let mut cam = camera();
        ctrl.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        ctrl.process_mouse_motion(10.0, -20.0);
        ctrl.update(&mut cam);
        assert!((cam.yaw - 0.1).abs() < 1e-6);
        assert!((cam.pitch + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_accumulators_reset_after_update() {
        let mut ctrl = OrbitController::new();
        let mut cam = camera();
        ctrl.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        ctrl.process_mouse_motion(10.0, 10.0);
        ctrl.update(&mut cam);
        let yaw_after_first = cam.yaw;
        ctrl.update(&mut cam);
        assert_eq!(cam.yaw, yaw_after_first);
    }

    #[test]
    fn test_scroll_zooms() {
        let mut ctrl = OrbitController::new().with_zoom_speed(0.5);
        let mut cam = camera();
        ctrl.process_scroll(MouseScrollDelta::LineDelta(0.0, 2.0));
        ctrl.update(&mut cam);
        assert!((cam.distance - 1.0).abs() < 1e-6);
    }
}
