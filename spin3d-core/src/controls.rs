/// Orbit-style camera controls: rotate around, pan and zoom toward a target
use nalgebra::{Point3, Vector3};

use crate::projection::Camera;

const POLAR_EPSILON: f32 = 1e-3;

/// Spherical coordinates of the camera around its target.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub distance: f32,
    /// Angle around the Y axis, measured from +Z
    pub azimuth: f32,
    /// Angle from +Y, in `(0, PI)`
    pub polar: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitControls {
    pub fn from_camera(camera: &Camera) -> Self {
        let offset = camera.position - camera.target;
        let distance = offset.norm().max(1e-3);
        let polar = (offset.y / distance).clamp(-1.0, 1.0).acos();
        let azimuth = offset.x.atan2(offset.z);

        Self {
            target: camera.target,
            distance,
            azimuth,
            polar: polar.clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON),
            min_distance: 0.5,
            max_distance: 200.0,
        }
    }

    pub fn rotate(&mut self, d_azimuth: f32, d_polar: f32) {
        self.azimuth += d_azimuth;
        self.polar = (self.polar + d_polar)
            .clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON);
    }

    /// `factor < 1` moves closer, `factor > 1` moves away
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
        }
    }

    /// Pan in the camera's screen plane, in world units
    pub fn pan(&mut self, right: f32, up: f32) {
        let offset = self.offset();
        let forward = -offset.normalize();
        let world_up = Vector3::y();
        let right_axis = forward
            .cross(&world_up)
            .try_normalize(1e-9)
            .unwrap_or_else(Vector3::x);
        let up_axis = right_axis.cross(&forward);
        self.target += right_axis * right + up_axis * up;
    }

    fn offset(&self) -> Vector3<f32> {
        let sin_polar = self.polar.sin();
        Vector3::new(
            self.distance * sin_polar * self.azimuth.sin(),
            self.distance * self.polar.cos(),
            self.distance * sin_polar * self.azimuth.cos(),
        )
    }

    /// Write the orbit state into the camera
    pub fn apply(&self, camera: &mut Camera) {
        camera.target = self.target;
        camera.position = self.target + self.offset();
        camera.up = Vector3::y();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_default_camera() {
        let mut camera = Camera::new(800, 600);
        let controls = OrbitControls::from_camera(&camera);
        assert!((controls.distance - 10.0).abs() < 1e-5);
        controls.apply(&mut camera);
        assert!((camera.position - Point3::new(0.0, 0.0, 10.0)).norm() < 1e-3);
    }

    #[test]
    fn test_rotation_keeps_distance() {
        let mut camera = Camera::new(800, 600);
        let mut controls = OrbitControls::from_camera(&camera);
        controls.rotate(1.0, -0.5);
        controls.apply(&mut camera);
        assert!(((camera.position - camera.target).norm() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_polar_is_clamped() {
        let camera = Camera::new(800, 600);
        let mut controls = OrbitControls::from_camera(&camera);
        controls.rotate(0.0, 10.0);
        assert!(controls.polar < std::f32::consts::PI);
        controls.rotate(0.0, -20.0);
        assert!(controls.polar > 0.0);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let camera = Camera::new(800, 600);
        let mut controls = OrbitControls::from_camera(&camera);
        controls.zoom(0.0001);
        assert_eq!(controls.distance, controls.min_distance);
        controls.zoom(f32::NAN);
        assert_eq!(controls.distance, controls.min_distance);
    }

    #[test]
    fn test_pan_moves_target() {
        let mut camera = Camera::new(800, 600);
        let mut controls = OrbitControls::from_camera(&camera);
        controls.pan(1.0, 0.0);
        controls.apply(&mut camera);
        assert!((camera.target.x - 1.0).abs() < 1e-4);
        assert!((camera.position.x - 1.0).abs() < 1e-4);
    }
}
