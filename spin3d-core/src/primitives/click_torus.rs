use nalgebra::Vector3;

use super::Animate;
use crate::color::Color;
use crate::frame::FrameTick;
use crate::geometry::Mesh;
use crate::material::Material;
use crate::node::SceneNode;
use crate::pointer::{PointerEvent, PointerEventKind, Propagation};
use crate::transform::Transform;

/// Grows to 1.5x while toggled on by clicks.
#[derive(Debug, Default)]
pub struct ClickTorus {
    clicked: bool,
}

/// Torus dimensions in the same order the geometry takes them
#[derive(Debug, Clone, Copy)]
pub struct TorusArgs {
    pub radius: f32,
    pub tube: f32,
    pub radial_segments: u32,
    pub tubular_segments: u32,
}

impl ClickTorus {
    pub const CLICKED_SCALE: f32 = 1.5;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(position: Vector3<f32>, args: TorusArgs, color: Color, wireframe: bool) -> SceneNode {
        SceneNode::new(
            "torus",
            Transform::at(position.x, position.y, position.z),
            Mesh::torus(
                args.radius,
                args.tube,
                args.radial_segments,
                args.tubular_segments,
            ),
            // The inside of the tube has to stay visible
            Material::standard(color).wireframe(wireframe).double_sided(),
        )
    }

    pub fn clicked(&self) -> bool {
        self.clicked
    }

    pub fn target_scale(&self) -> f32 {
        if self.clicked {
            Self::CLICKED_SCALE
        } else {
            1.0
        }
    }
}

impl Animate for ClickTorus {
    fn frame(&mut self, node: &mut SceneNode, tick: FrameTick) {
        node.transform.rotation.rotate(tick.delta, tick.delta, 0.0);
        node.transform.set_uniform_scale(self.target_scale());
    }

    fn pointer(&mut self, event: &PointerEvent) -> Propagation {
        match event.kind {
            PointerEventKind::Click => {
                self.clicked = !self.clicked;
                Propagation::Stop
            }
            PointerEventKind::Enter | PointerEventKind::Leave => Propagation::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeId;
    use crate::pointer::Hit;
    use nalgebra::Point3;

    fn click() -> PointerEvent {
        PointerEvent::click(&Hit {
            node: NodeId(0),
            distance: 1.0,
            point: Point3::origin(),
        })
    }

    fn args() -> TorusArgs {
        TorusArgs {
            radius: 0.8,
            tube: 0.25,
            radial_segments: 8,
            tubular_segments: 12,
        }
    }

    #[test]
    fn test_double_click_restores_scale() {
        let mut node = ClickTorus::node(Vector3::new(2.0, 0.0, 0.0), args(), Color::WHITE, false);
        let mut torus = ClickTorus::new();
        torus.frame(&mut node, FrameTick::new(0.0, 0.0));
        let original = node.transform.scale;

        assert_eq!(torus.pointer(&click()), Propagation::Stop);
        torus.frame(&mut node, FrameTick::new(0.1, 0.1));
        assert_eq!(node.transform.scale, Vector3::new(1.5, 1.5, 1.5));

        torus.pointer(&click());
        torus.frame(&mut node, FrameTick::new(0.2, 0.1));
        assert_eq!(node.transform.scale, original);
    }

    #[test]
    fn test_rotation_ignores_clicked_state() {
        let mut node = ClickTorus::node(Vector3::zeros(), args(), Color::WHITE, false);
        let mut torus = ClickTorus::new();
        torus.pointer(&click());
        torus.frame(&mut node, FrameTick::new(0.5, 0.5));
        assert_eq!(node.transform.rotation.x, 0.5);
        assert_eq!(node.transform.rotation.y, 0.5);
        assert!(node.material.is_double_sided());
    }
}
