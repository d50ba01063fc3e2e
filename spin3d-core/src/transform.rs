/// Node transforms: position, Euler rotation and scale
use nalgebra::{Matrix4, Point3, Vector3};

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Placement of one scene node. Only the owning primitive's frame rule
/// writes to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: RotationState,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Self::default()
        }
    }

    pub fn set_uniform_scale(&mut self, s: f32) {
        self.scale = Vector3::new(s, s, s);
    }

    /// Translation * rotation * scale
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Self::translation_matrix(self.position.x, self.position.y, self.position.z)
            * Self::rotation_matrix(&self.rotation)
            * Self::scale_matrix(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite())
            && self.scale.iter().all(|c| c.is_finite())
            && [self.rotation.x, self.rotation.y, self.rotation.z]
                .iter()
                .all(|c| c.is_finite())
    }

    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        // Intrinsic XYZ order: X is applied last
        rx * ry * rz
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    /// Map a local-space point to world space
    pub fn apply(&self, point: &Point3<f32>) -> Point3<f32> {
        self.model_matrix().transform_point(point)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: RotationState::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}
