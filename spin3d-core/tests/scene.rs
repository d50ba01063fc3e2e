use nalgebra::Point3;
use spin3d_core::params::ParamValue;
use spin3d_core::pointer::{Hit, PointerEvent, Propagation};
use spin3d_core::primitives::torus_knot::{KEY_RADIUS, KEY_TUBE, KEY_TUBULAR};
use spin3d_core::{
    Camera, FaultBoundary, FrameClock, FrameTick, ParamError, ParameterStore, Rendered, Scene,
    FALLBACK_MESSAGE,
};

const EPS: f32 = 1e-5;

fn mount() -> (ParameterStore, Scene) {
    let store = ParameterStore::new();
    let scene = Scene::mount(&store, Camera::new(800, 600)).unwrap();
    (store, scene)
}

#[test]
fn test_box_first_tick() {
    let (_store, mut scene) = mount();
    scene.frame(FrameTick::new(1.0, 1.0));

    let node = scene.node_of("box").unwrap();
    assert!((node.transform.rotation.x - 1.0).abs() < EPS);
    assert!((node.transform.rotation.y - 1.0).abs() < EPS);
    assert!((node.transform.position.y - 1.0f32.sin() * 2.0).abs() < EPS);
    assert_eq!(node.transform.position.x, -4.0);
}

#[test]
fn test_box_rotation_accumulates_deltas() {
    let (_store, mut scene) = mount();
    let mut clock = FrameClock::new();
    let deltas = [0.016, 0.033, 0.1, 0.0, 0.25];
    for d in deltas {
        scene.frame(clock.advance(d));
    }

    let sum: f32 = deltas.iter().sum();
    let node = scene.node_of("box").unwrap();
    assert!((node.transform.rotation.x - sum).abs() < EPS);
    assert!((node.transform.rotation.y - sum).abs() < EPS);
}

#[test]
fn test_sphere_enter_tick_leave() {
    let (_store, mut scene) = mount();
    scene.frame(FrameTick::new(0.0, 0.0));

    // Just off the center of the viewport, where the sphere sits
    scene.pointer_at(410.0, 290.0, 800, 600);
    assert!(scene.sphere().unwrap().hovered());

    scene.frame(FrameTick::new(0.5, 0.5));
    let rotation = scene.node_of("sphere").unwrap().transform.rotation;
    assert!((rotation.x - 2.5).abs() < EPS);
    assert!((rotation.y - 2.5).abs() < EPS);

    scene.pointer_leave_all();
    assert!(!scene.sphere().unwrap().hovered());

    scene.frame(FrameTick::new(1.5, 1.0));
    let rotation = scene.node_of("sphere").unwrap().transform.rotation;
    assert!((rotation.x - 4.5).abs() < EPS);
}

#[test]
fn test_sphere_highlight_follows_hover() {
    let (_store, mut scene) = mount();
    let id = scene.find("sphere").unwrap().id;
    let base = scene.node_of("sphere").unwrap().material.color;

    scene.dispatch(id, &PointerEvent::leave());
    scene.frame(FrameTick::new(0.0, 0.0));
    assert_eq!(scene.node_of("sphere").unwrap().material.color, base);

    scene.pointer_at(410.0, 290.0, 800, 600);
    scene.frame(FrameTick::new(0.1, 0.1));
    assert_ne!(scene.node_of("sphere").unwrap().material.color, base);

    // Moving off every object leaves the sphere
    scene.pointer_at(5.0, 5.0, 800, 600);
    assert!(!scene.sphere().unwrap().hovered());
}

#[test]
fn test_torus_double_click_restores_scale() {
    let (_store, mut scene) = mount();
    let id = scene.find("torus").unwrap().id;
    let click = PointerEvent::click(&Hit {
        node: id,
        distance: 9.0,
        point: Point3::new(2.0, 0.0, 1.0),
    });

    assert_eq!(scene.dispatch(id, &click), Propagation::Stop);
    scene.frame(FrameTick::new(0.1, 0.1));
    assert!((scene.node_of("torus").unwrap().transform.scale.x - 1.5).abs() < EPS);

    scene.dispatch(id, &click);
    scene.frame(FrameTick::new(0.2, 0.1));
    let scale = scene.node_of("torus").unwrap().transform.scale;
    assert!((scale.x - 1.0).abs() < EPS);
    assert!((scale.y - 1.0).abs() < EPS);
    assert!((scale.z - 1.0).abs() < EPS);
}

#[test]
fn test_knot_changes_apply_together_on_sync() {
    let (store, mut scene) = mount();
    let before = scene.node_of("torus-knot").unwrap().mesh.triangles.len();
    assert_eq!(before, 100 * 100 * 2);

    store.set(KEY_TUBULAR, ParamValue::Number(10.0)).unwrap();
    store.set(KEY_RADIUS, ParamValue::Number(7.0)).unwrap();
    store.set(KEY_TUBE, ParamValue::Number(0.3)).unwrap();

    // Nothing is visible before the re-render pass
    scene.frame(FrameTick::new(0.1, 0.1));
    assert_eq!(
        scene.node_of("torus-knot").unwrap().mesh.triangles.len(),
        before
    );
    assert_eq!(scene.knot().unwrap().rebuilds(), 0);

    assert_eq!(scene.sync_parameters(), 1);
    let knot = scene.node_of("torus-knot").unwrap();
    assert_eq!(knot.mesh.triangles.len(), 10 * 100 * 2);
    assert_eq!(scene.knot().unwrap().rebuilds(), 1);

    // Radius was clamped to its maximum before it reached the geometry
    assert_eq!(
        store.descriptor(KEY_RADIUS).unwrap().value,
        ParamValue::Number(3.0)
    );

    // A second pass with nothing pending does no work
    assert_eq!(scene.sync_parameters(), 0);
    assert_eq!(scene.knot().unwrap().rebuilds(), 1);
}

#[test]
fn test_knot_with_zero_segments_renders_empty() {
    let (store, mut scene) = mount();
    store.set(KEY_TUBULAR, ParamValue::Number(0.0)).unwrap();
    scene.sync_parameters();
    assert!(scene.node_of("torus-knot").unwrap().mesh.is_empty());
    assert!(scene.draw_list(120, 40).is_ok());
}

#[test]
fn test_rejected_writes_leave_scene_untouched() {
    let (store, mut scene) = mount();
    assert!(matches!(
        store.set("nope", ParamValue::Number(1.0)),
        Err(ParamError::UnknownKey(_))
    ));
    assert!(store.set_str("lightColor", "#12").is_err());
    assert_eq!(scene.sync_parameters(), 0);
}

#[test]
fn test_boundary_swallows_scene_render_errors() {
    let (_store, mut scene) = mount();
    let mut boundary = FaultBoundary::new();

    let ok = boundary.render("drawing scene", || scene.draw_list(120, 40));
    assert!(matches!(ok, Rendered::View(_)));

    let failed = boundary.render("drawing scene", || scene.draw_list(0, 0));
    assert_eq!(failed, Rendered::Fallback(FALLBACK_MESSAGE));

    // Failure is terminal even once the scene could render again
    scene.frame(FrameTick::new(1.0, 1.0));
    let again = boundary.render("drawing scene", || scene.draw_list(120, 40));
    assert_eq!(again, Rendered::Fallback(FALLBACK_MESSAGE));
    assert!(boundary.has_failed());
}

#[test]
fn test_lines_stay_on_screen_with_camera_fully_zoomed_in() {
    let store = ParameterStore::new();
    let mut scene = Scene::mount(&store, Camera::new(80, 40)).unwrap();
    for _ in 0..60 {
        scene.zoom(0.9);
    }
    let camera = scene.camera();
    assert!(((camera.position - camera.target).norm() - 0.5).abs() < 1e-4);

    let mut clock = FrameClock::new();
    for _ in 0..200 {
        scene.frame(clock.advance(1.0 / 60.0));
        let list = scene.draw_list(80, 40).unwrap();
        for line in &list.lines {
            for (x, y, depth) in [line.from, line.to] {
                assert!((0.0..=80.0).contains(&x), "{line:?}");
                assert!((0.0..=40.0).contains(&y), "{line:?}");
                assert!(depth.is_finite());
            }
        }
        for triangle in &list.triangles {
            assert!(triangle.points.iter().all(|p| p.0.is_finite() && p.1.is_finite()));
        }
    }
}

#[test]
fn test_schema_serializes_for_panels() {
    let (store, _scene) = mount();
    let json = serde_json::to_value(store.schema()).unwrap();
    let keys: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["key"].as_str())
        .collect();
    assert!(keys.contains(&"lightColor"));
    assert!(keys.contains(&"tubularSegments"));
    assert_eq!(keys.len(), 7);
}
