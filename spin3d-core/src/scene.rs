//! Scene composer: lights, camera controls and the four animated primitives,
//! plus the frame/pointer/parameter entry points frontends drive.

use log::{info, trace};
use nalgebra::{Point3, Vector3};

use crate::color::Color;
use crate::controls::OrbitControls;
use crate::error::ParamError;
use crate::frame::FrameTick;
use crate::lighting::{AmbientLight, DirectionalLight, LightHelper, Lighting};
use crate::node::{NodeId, NodePool, SceneNode};
use crate::params::{ParamDescriptor, ParamView, ParameterStore};
use crate::pointer::{pick, PointerEvent, PointerRouter, Propagation};
use crate::primitives::click_torus::TorusArgs;
use crate::primitives::{
    Animate, ClickTorus, HoverSphere, Primitive, RotatingBox, TorusKnot,
};
use crate::projection::Camera;
use crate::raycast::Ray;
use crate::render::{self, DrawList};

pub const KEY_LIGHT_COLOR: &str = "lightColor";
pub const KEY_LIGHT_INTENSITY: &str = "lightIntensity";

pub const AMBIENT_INTENSITY: f32 = 0.5;
pub const LIGHT_POSITION: [f32; 3] = [0.0, 0.0, 5.0];
pub const HELPER_SIZE: f32 = 1.0;

/// A primitive and the node it owns
pub struct Mounted {
    pub id: NodeId,
    pub primitive: Primitive,
}

pub struct Scene {
    store: ParameterStore,
    light_params: ParamView,
    nodes: NodePool,
    mounted: Vec<Mounted>,
    lighting: Lighting,
    camera: Camera,
    controls: OrbitControls,
    router: PointerRouter,
}

impl Scene {
    fn light_schema() -> Result<Vec<ParamDescriptor>, ParamError> {
        Ok(vec![
            ParamDescriptor::color(KEY_LIGHT_COLOR, "Light Color", "#ffffff")?,
            ParamDescriptor::number(KEY_LIGHT_INTENSITY, "Light Intensity", 1.0)
                .range(0.0, 10.0)
                .step(0.1),
        ])
    }

    /// Declare the scene's parameters and instantiate everything in it.
    pub fn mount(store: &ParameterStore, camera: Camera) -> Result<Self, ParamError> {
        let light_params = store.declare("scene", Self::light_schema()?)?;
        let lights = light_params.snapshot();
        let light_color = lights.color(KEY_LIGHT_COLOR, Color::WHITE);

        let lighting = Lighting {
            ambient: AmbientLight {
                color: Color::WHITE,
                intensity: AMBIENT_INTENSITY,
            },
            directional: DirectionalLight {
                position: Point3::from(LIGHT_POSITION),
                target: Point3::origin(),
                color: light_color,
                intensity: lights.number(KEY_LIGHT_INTENSITY, 1.0),
                cast_shadow: true,
            },
            helper: Some(LightHelper {
                size: HELPER_SIZE,
                color: light_color,
            }),
        };

        let mut nodes = NodePool::new();
        let mut mounted = Vec::with_capacity(4);
        let mut add = |node: SceneNode, primitive: Primitive| {
            let id = nodes.insert(node);
            mounted.push(Mounted { id, primitive });
        };

        add(
            RotatingBox::node(Vector3::new(-4.0, 0.0, 0.0), [1.0; 3], parse("skyblue")?),
            Primitive::Box(RotatingBox),
        );

        let (knot, knot_node) = TorusKnot::mount(store, Vector3::new(-2.0, 0.0, 0.0))?;
        add(knot_node, Primitive::Knot(knot));

        let green = parse("green")?;
        add(
            HoverSphere::node(Vector3::zeros(), 1.0, (32, 32), green, true),
            Primitive::Sphere(HoverSphere::new(green)),
        );

        add(
            ClickTorus::node(
                Vector3::new(2.0, 0.0, 0.0),
                TorusArgs {
                    radius: 0.8,
                    tube: 0.25,
                    radial_segments: 100,
                    tubular_segments: 100,
                },
                parse("blue")?,
                false,
            ),
            Primitive::Torus(ClickTorus::new()),
        );

        let controls = OrbitControls::from_camera(&camera);
        info!("scene mounted with {} primitives", mounted.len());

        Ok(Self {
            store: store.clone(),
            light_params,
            nodes,
            mounted,
            lighting,
            camera,
            controls,
            router: PointerRouter::new(),
        })
    }

    /// Run every primitive's per-frame rule. Primitives whose node is not
    /// attached are skipped for this frame.
    pub fn frame(&mut self, tick: FrameTick) {
        for m in &mut self.mounted {
            match self.nodes.get_mut(m.id) {
                Some(node) => m.primitive.frame(node, tick),
                None => trace!("{} has no node, skipping frame", m.primitive.kind()),
            }
        }
    }

    /// Re-render pass: publish pending panel edits and let consumers pick up
    /// the new snapshots. Returns how many parameter groups changed.
    pub fn sync_parameters(&mut self) -> usize {
        let changed = self.store.publish();
        if changed == 0 {
            return 0;
        }

        if let Some(lights) = self.light_params.poll_changed() {
            self.lighting.set_directional(
                lights.color(KEY_LIGHT_COLOR, Color::WHITE),
                lights.number(KEY_LIGHT_INTENSITY, 1.0),
            );
        }
        for m in &mut self.mounted {
            if let Some(node) = self.nodes.get_mut(m.id) {
                m.primitive.sync(node);
            }
        }
        changed
    }

    pub fn pointer_move(&mut self, ray: &Ray) {
        let hits = pick(ray, &self.nodes);
        let mounted = &mut self.mounted;
        self.router
            .update(&hits, |id, event| dispatch(mounted, id, &event));
    }

    pub fn pointer_leave_all(&mut self) {
        let mounted = &mut self.mounted;
        self.router
            .leave_all(|id, event| dispatch(mounted, id, &event));
    }

    pub fn click(&mut self, ray: &Ray) {
        let hits = pick(ray, &self.nodes);
        let mounted = &mut self.mounted;
        self.router
            .click(&hits, |id, event| dispatch(mounted, id, &event));
    }

    /// Pointer moved to a pixel of a `width x height` viewport
    pub fn pointer_at(&mut self, x: f32, y: f32, width: u32, height: u32) {
        match self.camera.screen_ray(x, y, width, height) {
            Some(ray) => self.pointer_move(&ray),
            None => self.pointer_leave_all(),
        }
    }

    pub fn click_at(&mut self, x: f32, y: f32, width: u32, height: u32) {
        if let Some(ray) = self.camera.screen_ray(x, y, width, height) {
            self.click(&ray);
        }
    }

    pub fn draw_list(&self, width: u32, height: u32) -> render::Result<DrawList> {
        render::build_draw_list(&self.nodes, &self.lighting, &self.camera, width, height)
    }

    pub fn orbit(&mut self, d_azimuth: f32, d_polar: f32) {
        self.controls.rotate(d_azimuth, d_polar);
        self.controls.apply(&mut self.camera);
    }

    pub fn zoom(&mut self, factor: f32) {
        self.controls.zoom(factor);
        self.controls.apply(&mut self.camera);
    }

    pub fn pan(&mut self, right: f32, up: f32) {
        self.controls.pan(right, up);
        self.controls.apply(&mut self.camera);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn nodes(&self) -> &NodePool {
        &self.nodes
    }

    /// Take a node out of the scene; its primitive idles until reattached.
    pub fn detach_node(&mut self, id: NodeId) -> Option<SceneNode> {
        self.router.forget(id);
        self.nodes.detach(id)
    }

    pub fn attach_node(&mut self, id: NodeId, node: SceneNode) -> Option<SceneNode> {
        self.nodes.attach(id, node)
    }

    pub fn mounted(&self) -> &[Mounted] {
        &self.mounted
    }

    /// First mounted primitive of the given kind
    pub fn find(&self, kind: &str) -> Option<&Mounted> {
        self.mounted.iter().find(|m| m.primitive.kind() == kind)
    }

    pub fn node_of(&self, kind: &str) -> Option<&SceneNode> {
        self.find(kind).and_then(|m| self.nodes.get(m.id))
    }

    pub fn sphere(&self) -> Option<&HoverSphere> {
        self.mounted.iter().find_map(|m| match &m.primitive {
            Primitive::Sphere(s) => Some(s),
            _ => None,
        })
    }

    pub fn torus(&self) -> Option<&ClickTorus> {
        self.mounted.iter().find_map(|m| match &m.primitive {
            Primitive::Torus(t) => Some(t),
            _ => None,
        })
    }

    pub fn knot(&self) -> Option<&TorusKnot> {
        self.mounted.iter().find_map(|m| match &m.primitive {
            Primitive::Knot(k) => Some(k),
            _ => None,
        })
    }

    /// Deliver an event straight to the primitive owning `id`, bypassing
    /// hit-testing
    pub fn dispatch(&mut self, id: NodeId, event: &PointerEvent) -> Propagation {
        dispatch(&mut self.mounted, id, event)
    }
}

fn dispatch(mounted: &mut [Mounted], id: NodeId, event: &PointerEvent) -> Propagation {
    mounted
        .iter_mut()
        .find(|m| m.id == id)
        .map(|m| m.primitive.pointer(event))
        .unwrap_or_default()
}

fn parse(name: &str) -> Result<Color, ParamError> {
    Ok(name.parse::<Color>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;

    fn scene() -> (ParameterStore, Scene) {
        let store = ParameterStore::new();
        let scene = Scene::mount(&store, Camera::new(800, 600)).unwrap();
        (store, scene)
    }

    #[test]
    fn test_layout() {
        let (store, scene) = scene();
        let xs: Vec<(&str, f32)> = scene
            .mounted()
            .iter()
            .map(|m| {
                let x = scene.nodes().get(m.id).unwrap().transform.position.x;
                (m.primitive.kind(), x)
            })
            .collect();
        assert_eq!(
            xs,
            vec![("box", -4.0), ("torus-knot", -2.0), ("sphere", 0.0), ("torus", 2.0)]
        );
        assert_eq!(store.schema().len(), 7);
        assert!(scene.lighting().directional.cast_shadow);
        assert_eq!(scene.lighting().ambient.intensity, 0.5);
    }

    #[test]
    fn test_light_params_apply_on_sync() {
        let (store, mut scene) = scene();
        store
            .set(KEY_LIGHT_INTENSITY, ParamValue::Number(3.0))
            .unwrap();
        store.set_str(KEY_LIGHT_COLOR, "red").unwrap();
        assert_eq!(scene.lighting().directional.intensity, 1.0);

        assert_eq!(scene.sync_parameters(), 1);
        let red: Color = "red".parse().unwrap();
        assert_eq!(scene.lighting().directional.intensity, 3.0);
        assert_eq!(scene.lighting().directional.color, red);
        assert_eq!(scene.lighting().helper.unwrap().color, red);
        assert_eq!(scene.knot().unwrap().rebuilds(), 0);
    }

    #[test]
    fn test_light_intensity_steps_by_tenths() {
        let (store, _scene) = scene();
        let intensity = store.descriptor(KEY_LIGHT_INTENSITY).unwrap();
        assert_eq!(intensity.step_size(), Some(0.1));

        let snapped = store
            .set(KEY_LIGHT_INTENSITY, ParamValue::Number(2.44))
            .unwrap();
        assert!((snapped.as_number().unwrap() - 2.4).abs() < 1e-4);
        let clamped = store
            .set(KEY_LIGHT_INTENSITY, ParamValue::Number(12.0))
            .unwrap();
        assert_eq!(clamped, ParamValue::Number(10.0));
    }

    #[test]
    fn test_missing_node_skips_frame() {
        let (_store, mut scene) = scene();
        let id = scene.find("box").unwrap().id;
        let detached = scene.detach_node(id).unwrap();
        scene.frame(FrameTick::new(1.0, 1.0));
        assert!(scene.node_of("box").is_none());

        scene.attach_node(id, detached);
        assert_eq!(scene.node_of("box").unwrap().transform.rotation.x, 0.0);
        // The others kept animating
        assert_eq!(scene.node_of("torus").unwrap().transform.rotation.x, 1.0);
    }

    #[test]
    fn test_click_through_camera_hits_torus() {
        let (_store, mut scene) = scene();
        scene.frame(FrameTick::new(0.0, 0.0));
        // Through the ring's tube, off the grid seams
        let ray = Ray::new(Point3::new(2.9, 0.02, 10.0), Vector3::new(0.0, 0.0, -1.0));
        scene.click(&ray);
        assert!(scene.torus().unwrap().clicked());
        scene.click(&ray);
        assert!(!scene.torus().unwrap().clicked());
    }

    #[test]
    fn test_click_on_empty_space_does_nothing() {
        let (_store, mut scene) = scene();
        let ray = Ray::new(Point3::new(0.0, 8.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
        scene.click(&ray);
        assert!(!scene.torus().unwrap().clicked());
    }

    #[test]
    fn test_draw_list_renders_everything() {
        let (_store, mut scene) = scene();
        scene.frame(FrameTick::new(0.0, 0.0));
        let list = scene.draw_list(160, 90).unwrap();
        assert!(!list.triangles.is_empty());
        // Wireframe sphere plus the light helper
        assert!(list.lines.len() > 5);
    }
}
