use nalgebra::Vector3;

use super::Animate;
use crate::color::Color;
use crate::frame::FrameTick;
use crate::geometry::Mesh;
use crate::material::Material;
use crate::node::SceneNode;
use crate::transform::Transform;

/// Spins at one radian per second on X and Y while bobbing vertically.
#[derive(Debug, Default)]
pub struct RotatingBox;

impl RotatingBox {
    pub const BOB_AMPLITUDE: f32 = 2.0;

    pub fn node(position: Vector3<f32>, size: [f32; 3], color: Color) -> SceneNode {
        SceneNode::new(
            "box",
            Transform::at(position.x, position.y, position.z),
            Mesh::cuboid(size[0], size[1], size[2]),
            Material::standard(color),
        )
    }
}

impl Animate for RotatingBox {
    fn frame(&mut self, node: &mut SceneNode, tick: FrameTick) {
        let t = &mut node.transform;
        t.rotation.rotate(tick.delta, tick.delta, 0.0);
        // Tied to elapsed time so the bob speed ignores frame rate
        t.position.y = tick.elapsed.sin() * Self::BOB_AMPLITUDE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_accumulates_deltas() {
        let mut node = RotatingBox::node(Vector3::new(-4.0, 0.0, 0.0), [1.0; 3], Color::WHITE);
        let mut prim = RotatingBox;
        let deltas = [0.016, 0.033, 0.0, 0.25, 0.1];
        let mut elapsed = 0.0;
        for d in deltas {
            elapsed += d;
            prim.frame(&mut node, FrameTick::new(elapsed, d));
        }
        let sum: f32 = deltas.iter().sum();
        assert!((node.transform.rotation.x - sum).abs() < 1e-5);
        assert_eq!(node.transform.rotation.x, node.transform.rotation.y);
        assert_eq!(node.transform.rotation.z, 0.0);
        assert!((node.transform.position.y - elapsed.sin() * 2.0).abs() < 1e-6);
        assert_eq!(node.transform.position.x, -4.0);
    }
}
