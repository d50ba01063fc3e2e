/// Animated primitives: each owns one scene node and its per-frame rule
use crate::frame::FrameTick;
use crate::node::SceneNode;
use crate::pointer::{PointerEvent, Propagation};

pub mod click_torus;
pub mod hover_sphere;
pub mod rotating_box;
pub mod torus_knot;

pub use click_torus::ClickTorus;
pub use hover_sphere::HoverSphere;
pub use rotating_box::RotatingBox;
pub use torus_knot::TorusKnot;

/// Behaviour attached to one scene node.
///
/// `frame` is the only code that writes the node's transform. Pointer
/// handlers touch interaction flags only.
pub trait Animate {
    fn frame(&mut self, node: &mut SceneNode, tick: FrameTick);

    fn pointer(&mut self, _event: &PointerEvent) -> Propagation {
        Propagation::Continue
    }

    /// Re-render pass after parameter changes were published
    fn sync(&mut self, _node: &mut SceneNode) {}
}

pub enum Primitive {
    Box(RotatingBox),
    Sphere(HoverSphere),
    Torus(ClickTorus),
    Knot(TorusKnot),
}

impl Primitive {
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Box(_) => "box",
            Primitive::Sphere(_) => "sphere",
            Primitive::Torus(_) => "torus",
            Primitive::Knot(_) => "torus-knot",
        }
    }

    fn as_animate(&mut self) -> &mut dyn Animate {
        match self {
            Primitive::Box(p) => p,
            Primitive::Sphere(p) => p,
            Primitive::Torus(p) => p,
            Primitive::Knot(p) => p,
        }
    }
}

impl Animate for Primitive {
    fn frame(&mut self, node: &mut SceneNode, tick: FrameTick) {
        self.as_animate().frame(node, tick)
    }

    fn pointer(&mut self, event: &PointerEvent) -> Propagation {
        self.as_animate().pointer(event)
    }

    fn sync(&mut self, node: &mut SceneNode) {
        self.as_animate().sync(node)
    }
}
