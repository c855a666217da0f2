/// Orbit camera controls: rotate the eye around a target on a sphere
use nalgebra::{Point3, Vector3};

use crate::config::OrbitConfig;
use crate::projection::Camera;

/// Keeps the polar angle away from the poles, where `up` degenerates
const POLAR_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    radius: f32,
    /// Azimuth around +Y, zero on +Z
    theta: f32,
    /// Polar angle from +Y
    phi: f32,
    pending_theta: f32,
    pending_phi: f32,
    pending_scale: f32,
    config: OrbitConfig,
}

impl OrbitControls {
    /// Start orbiting from wherever `camera` currently is
    pub fn new(camera: &Camera, config: OrbitConfig) -> Self {
        let offset = camera.position - camera.target;
        let radius = offset.norm().max(f32::EPSILON);
        Self {
            target: camera.target,
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_scale: 1.0,
            config,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.pending_theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.pending_phi -= angle;
    }

    /// Pointer drag in pixels, scaled so a full-height drag is one
    /// `rotate_speed` turn
    pub fn drag(&mut self, dx: f32, dy: f32, viewport_height: u32) {
        let height = viewport_height.max(1) as f32;
        self.rotate_left(self.config.rotate_speed * dx / height);
        self.rotate_up(self.config.rotate_speed * dy / height);
    }

    /// Positive steps move closer
    pub fn zoom(&mut self, steps: f32) {
        self.pending_scale *= self.config.zoom_factor.powf(steps);
    }

    /// Apply pending input to `camera`. Call once per frame.
    pub fn update(&mut self, camera: &mut Camera) {
        self.theta += self.pending_theta;
        self.phi = (self.phi + self.pending_phi)
            .clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON);
        self.radius = (self.radius * self.pending_scale)
            .clamp(self.config.min_distance, self.config.max_distance);

        self.pending_theta = 0.0;
        self.pending_phi = 0.0;
        self.pending_scale = 1.0;

        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let offset = Vector3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta) * self.radius;

        camera.target = self.target;
        camera.position = self.target + offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_without_input_keeps_camera() {
        let mut camera = Camera::default();
        let mut orbit = OrbitControls::new(&camera, OrbitConfig::default());
        let start = camera.position;

        orbit.update(&mut camera);
        assert!((camera.position - start).norm() < 1e-3);
    }

    #[test]
    fn test_rotation_preserves_radius() {
        let mut camera = Camera::default();
        let mut orbit = OrbitControls::new(&camera, OrbitConfig::default());

        orbit.drag(120.0, -40.0, 600);
        orbit.update(&mut camera);

        let distance = (camera.position - camera.target).norm();
        assert!((distance - 30.0).abs() < 1e-3);
        assert!(camera.position.x.abs() > 1.0);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = Camera::default();
        let config = OrbitConfig {
            min_distance: 5.0,
            max_distance: 50.0,
            ..OrbitConfig::default()
        };
        let mut orbit = OrbitControls::new(&camera, config);

        orbit.zoom(1000.0);
        orbit.update(&mut camera);
        assert!((orbit.radius() - 5.0).abs() < 1e-5);

        orbit.zoom(-1000.0);
        orbit.update(&mut camera);
        assert!((orbit.radius() - 50.0).abs() < 1e-5);
    }

    #[test]
    fn test_polar_angle_never_flips() {
        let mut camera = Camera::default();
        let mut orbit = OrbitControls::new(&camera, OrbitConfig::default());

        orbit.rotate_up(10.0);
        orbit.update(&mut camera);
        assert!(camera.position.y > 29.9);
        assert!(camera.position.y.is_finite());
        assert!(camera.position.x.is_finite() && camera.position.z.is_finite());
    }
}
