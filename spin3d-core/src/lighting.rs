/// Lighting rig: ambient + directional light, helper gizmo and flat shading
use nalgebra::{Point3, Vector3};

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub color: Color,
    pub intensity: f32,
    pub cast_shadow: bool,
}

impl DirectionalLight {
    /// Unit vector pointing from the surface toward the light
    pub fn to_light(&self) -> Vector3<f32> {
        (self.position - self.target)
            .try_normalize(1e-9)
            .unwrap_or_else(Vector3::z)
    }
}

/// Debug gizmo drawn at a directional light: a square facing the target and
/// a line toward it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightHelper {
    pub size: f32,
    pub color: Color,
}

impl LightHelper {
    pub fn segments(&self, light: &DirectionalLight) -> Vec<(Point3<f32>, Point3<f32>)> {
        let forward = -light.to_light();
        let reference = if forward.y.abs() > 0.99 {
            Vector3::z()
        } else {
            Vector3::y()
        };
        let u = forward.cross(&reference).normalize() * self.size;
        let v = u.cross(&forward).normalize() * self.size;
        let p = light.position;

        let corners = [p + u + v, p - u + v, p - u - v, p + u - v];
        let mut lines: Vec<_> = (0..4).map(|i| (corners[i], corners[(i + 1) % 4])).collect();
        lines.push((p, light.target));
        lines
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    pub helper: Option<LightHelper>,
}

impl Lighting {
    /// Lambert term for a world-space normal. Back-facing normals of
    /// double-sided surfaces are flipped by the caller.
    pub fn shade(&self, normal: &Vector3<f32>, albedo: Color) -> Color {
        let ambient = self.ambient.color.scale(self.ambient.intensity);
        let lambert = normal.dot(&self.directional.to_light()).max(0.0);
        let direct = self
            .directional
            .color
            .scale(self.directional.intensity * lambert);
        albedo.modulate(ambient + direct).clamped()
    }

    /// Keep the helper gizmo colored like its light
    pub fn set_directional(&mut self, color: Color, intensity: f32) {
        self.directional.color = color;
        self.directional.intensity = intensity.max(0.0);
        if let Some(helper) = self.helper.as_mut() {
            helper.color = color;
        }
    }
}
