use log::debug;
use nalgebra::Vector3;

use super::Animate;
use crate::color::Color;
use crate::error::ParamError;
use crate::frame::FrameTick;
use crate::geometry::Mesh;
use crate::material::{Material, Wobble};
use crate::node::SceneNode;
use crate::params::{ParamDescriptor, ParamSnapshot, ParamView, ParameterStore};
use crate::transform::Transform;

pub const KEY_COLOR: &str = "color";
pub const KEY_RADIUS: &str = "radius";
pub const KEY_TUBE: &str = "tube";
pub const KEY_TUBULAR: &str = "tubularSegments";
pub const KEY_RADIAL: &str = "radialSegments";

/// Torus knot whose shape and color come from the control panel.
#[derive(Debug)]
pub struct TorusKnot {
    params: ParamView,
    rebuilds: u32,
}

impl TorusKnot {
    pub const P: u32 = 2;
    pub const Q: u32 = 3;
    pub const WOBBLE_FACTOR: f32 = 2.0;
    pub const WOBBLE_SPEED: f32 = 5.0;

    pub fn schema() -> Result<Vec<ParamDescriptor>, ParamError> {
        Ok(vec![
            ParamDescriptor::color(KEY_COLOR, "Color", "orange")?,
            ParamDescriptor::number(KEY_RADIUS, "Radius", 0.65)
                .range(0.0, 3.0)
                .step(0.05),
            ParamDescriptor::number(KEY_TUBE, "Tube", 0.1)
                .range(0.0, 1.0)
                .step(0.01),
            ParamDescriptor::number(KEY_TUBULAR, "Tub Segments", 100.0)
                .range(0.0, 100.0)
                .step(1.0),
            ParamDescriptor::number(KEY_RADIAL, "Rad Segments", 100.0)
                .range(0.0, 100.0)
                .step(1.0),
        ])
    }

    /// Declare the knot's parameters and build its node from their defaults.
    pub fn mount(
        store: &ParameterStore,
        position: Vector3<f32>,
    ) -> Result<(Self, SceneNode), ParamError> {
        let params = store.declare("torus-knot", Self::schema()?)?;
        let snapshot = params.snapshot();
        let material = Material::standard(snapshot.color(KEY_COLOR, Color::ORANGE))
            .with_wobble(Wobble::new(Self::WOBBLE_FACTOR, Self::WOBBLE_SPEED));
        let node = SceneNode::new(
            "torus-knot",
            Transform::at(position.x, position.y, position.z),
            Self::geometry(&snapshot),
            material,
        );
        Ok((
            Self {
                params,
                rebuilds: 0,
            },
            node,
        ))
    }

    pub fn geometry(snapshot: &ParamSnapshot) -> Mesh {
        // Segment counts arrive as panel numbers
        let segments = |key: &str| snapshot.number(key, 0.0).max(0.0).floor() as u32;
        Mesh::torus_knot(
            snapshot.number(KEY_RADIUS, 0.65),
            snapshot.number(KEY_TUBE, 0.1),
            segments(KEY_TUBULAR),
            segments(KEY_RADIAL),
            Self::P,
            Self::Q,
        )
    }

    /// How many times the geometry was rebuilt after mount
    pub fn rebuilds(&self) -> u32 {
        self.rebuilds
    }
}

impl Animate for TorusKnot {
    fn frame(&mut self, node: &mut SceneNode, tick: FrameTick) {
        node.transform.rotation.rotate(tick.delta, tick.delta, 0.0);
        if let Some(wobble) = node.material.wobble.as_mut() {
            wobble.advance(tick.delta);
        }
    }

    fn sync(&mut self, node: &mut SceneNode) {
        let Some(snapshot) = self.params.poll_changed() else {
            return;
        };
        node.set_mesh(Self::geometry(&snapshot));
        node.material.color = snapshot.color(KEY_COLOR, Color::ORANGE);
        self.rebuilds += 1;
        debug!(
            "torus knot rebuilt at revision {} ({} triangles)",
            snapshot.revision(),
            node.mesh.triangles.len()
        );
    }
}
