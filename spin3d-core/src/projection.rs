/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use crate::raycast::Ray;

/// Camera configuration for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

/// A projected vertex: screen pixel coordinates plus NDC depth in `[-1, 1]`
pub type ScreenPoint = (f32, f32, f32);

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 10.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: 75f32.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn with_position(mut self, position: Point3<f32>) -> Self {
        self.position = position;
        self
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Whether the view basis can be built at all
    pub fn is_degenerate(&self) -> bool {
        let forward = self.target - self.position;
        forward.norm() < 1e-6
            || forward.cross(&self.up).norm() < 1e-6
            || !self.aspect.is_finite()
            || self.aspect <= 0.0
    }

    /// Project a world-space point to screen space.
    ///
    /// Points behind the camera yield `None`. Points outside the viewport are
    /// still returned so the rasterizer can clip partially visible triangles.
    pub fn project_world(
        &self,
        view_projection: &Matrix4<f32>,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<ScreenPoint> {
        let clip: Vector4<f32> = view_projection * point.to_homogeneous();

        // Perspective w is the view-space distance
        if clip.w.is_nan() || clip.w < self.near {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let depth = clip.z / clip.w;

        // Convert to screen space
        let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

        Some((screen_x, screen_y, depth))
    }

    /// World-space ray through a screen pixel, used for pointer hit-testing.
    pub fn screen_ray(&self, x: f32, y: f32, width: u32, height: u32) -> Option<Ray> {
        let ndc_x = x / width.max(1) as f32 * 2.0 - 1.0;
        let ndc_y = 1.0 - y / height.max(1) as f32 * 2.0;
        let inverse = self.view_projection().try_inverse()?;

        let near = inverse.transform_point(&Point3::new(ndc_x, ndc_y, -1.0));
        let far = inverse.transform_point(&Point3::new(ndc_x, ndc_y, 1.0));
        let direction = (far - near).try_normalize(1e-9)?;

        Some(Ray::new(near, direction))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
