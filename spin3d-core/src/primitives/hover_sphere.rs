use nalgebra::Vector3;

use super::Animate;
use crate::color::Color;
use crate::frame::FrameTick;
use crate::geometry::Mesh;
use crate::material::Material;
use crate::node::SceneNode;
use crate::pointer::{PointerEvent, PointerEventKind, Propagation};
use crate::transform::Transform;

/// Spins faster and lights up while the pointer is over it.
#[derive(Debug)]
pub struct HoverSphere {
    hovered: bool,
    base_color: Color,
}

impl HoverSphere {
    pub const IDLE_SPEED: f32 = 2.0;
    pub const HOVER_SPEED: f32 = 5.0;
    pub const BOB_AMPLITUDE: f32 = 5.0;
    pub const HIGHLIGHT: Color = Color::ORANGE;

    pub fn new(base_color: Color) -> Self {
        Self {
            hovered: false,
            base_color,
        }
    }

    pub fn node(
        position: Vector3<f32>,
        radius: f32,
        segments: (u32, u32),
        color: Color,
        wireframe: bool,
    ) -> SceneNode {
        SceneNode::new(
            "sphere",
            Transform::at(position.x, position.y, position.z),
            Mesh::sphere(radius, segments.0, segments.1),
            Material::standard(color).wireframe(wireframe),
        )
    }

    pub fn hovered(&self) -> bool {
        self.hovered
    }

    pub fn speed(&self) -> f32 {
        if self.hovered {
            Self::HOVER_SPEED
        } else {
            Self::IDLE_SPEED
        }
    }
}

impl Animate for HoverSphere {
    fn frame(&mut self, node: &mut SceneNode, tick: FrameTick) {
        let speed = self.speed();
        let t = &mut node.transform;
        t.rotation.rotate(tick.delta * speed, tick.delta * speed, 0.0);
        t.position.y = tick.elapsed.sin() * Self::BOB_AMPLITUDE;

        node.material.color = if self.hovered {
            Self::HIGHLIGHT
        } else {
            self.base_color
        };
    }

    fn pointer(&mut self, event: &PointerEvent) -> Propagation {
        match event.kind {
            PointerEventKind::Enter => {
                self.hovered = true;
                Propagation::Stop
            }
            // Leave always clears, whatever came before
            PointerEventKind::Leave => {
                self.hovered = false;
                Propagation::Continue
            }
            PointerEventKind::Click => Propagation::Continue,
        }
    }
}
