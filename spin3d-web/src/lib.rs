/// Spin3D Web - WASM frontend drawing the shared scene on a 2D canvas
///
/// The host page owns the animation loop and forwards pointer events;
/// parameter panels are built from the JSON `schema()` and write back
/// through `set_param`.
use log::{info, warn};
use spin3d_core::{
    Camera, Color, DrawList, FaultBoundary, FrameClock, ParameterStore, Rendered, Scene,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const BACKGROUND: &str = "#111111";
const FALLBACK_FONT: &str = "16px sans-serif";

#[wasm_bindgen]
pub struct WebViewer {
    store: ParameterStore,
    scene: Scene,
    boundary: FaultBoundary,
    clock: FrameClock,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

#[wasm_bindgen]
impl WebViewer {
    /// Mount the scene on the canvas with the given element id
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<WebViewer, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document available"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("canvas `{canvas_id}` not found")))?
            .dyn_into::<HtmlCanvasElement>()?;
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let store = ParameterStore::new();
        let camera = Camera::new(canvas.width(), canvas.height());
        let scene = Scene::mount(&store, camera).map_err(to_js)?;
        info!(
            "viewer mounted on `{canvas_id}` ({}x{})",
            canvas.width(),
            canvas.height()
        );

        Ok(WebViewer {
            store,
            scene,
            boundary: FaultBoundary::new(),
            clock: FrameClock::new(),
            canvas,
            context,
        })
    }

    /// One animation frame; `now_ms` is the `requestAnimationFrame` timestamp.
    /// Parameter sync, animation and drawing all run inside the fault boundary.
    pub fn frame(&mut self, now_ms: f64) {
        let tick = self.clock.tick_millis(now_ms);
        let (width, height) = (self.canvas.width(), self.canvas.height());
        let scene = &mut self.scene;
        let frame = self.boundary.render("rendering canvas frame", || {
            scene.sync_parameters();
            scene.frame(tick);
            scene.draw_list(width, height)
        });

        let drawn = match frame {
            Rendered::View(list) => paint(&self.context, &list),
            Rendered::Fallback(message) => paint_fallback(&self.context, message, width, height),
        };
        if let Err(err) = drawn {
            warn!("canvas draw failed: {err:?}");
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.scene.set_viewport(width, height);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let (width, height) = (self.canvas.width(), self.canvas.height());
        self.scene.pointer_at(x, y, width, height);
    }

    pub fn pointer_leave(&mut self) {
        self.scene.pointer_leave_all();
    }

    pub fn click(&mut self, x: f32, y: f32) {
        let (width, height) = (self.canvas.width(), self.canvas.height());
        self.scene.click_at(x, y, width, height);
    }

    /// Orbit by the given angles in radians
    pub fn orbit(&mut self, d_azimuth: f32, d_polar: f32) {
        self.scene.orbit(d_azimuth, d_polar);
    }

    pub fn zoom(&mut self, factor: f32) {
        self.scene.zoom(factor);
    }

    /// Panel write. Numbers are clamped and snapped, colors accept CSS names
    /// and hex. Applied on the next frame.
    pub fn set_param(&mut self, key: &str, value: &str) -> Result<(), JsValue> {
        self.store.set_str(key, value).map(|_| ()).map_err(to_js)
    }

    pub fn reset_params(&mut self) {
        self.store.reset();
    }

    /// Declared parameters as a JSON array of descriptors
    pub fn schema(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.store.schema()).map_err(to_js)
    }

    /// True once the fault boundary has switched to the fallback view
    pub fn failed(&self) -> bool {
        self.boundary.has_failed()
    }

    /// Current directional light intensity, as last published to the scene
    pub fn light_intensity(&self) -> f32 {
        self.scene.lighting().directional.intensity
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn css_color(color: Color) -> String {
    let [r, g, b] = color.to_bytes();
    format!("rgb({r}, {g}, {b})")
}

fn paint(context: &CanvasRenderingContext2d, list: &DrawList) -> Result<(), JsValue> {
    context.set_fill_style(&JsValue::from_str(BACKGROUND));
    context.fill_rect(0.0, 0.0, list.width as f64, list.height as f64);

    // Far to near, so nearer faces paint over farther ones
    for triangle in &list.triangles {
        let style = JsValue::from_str(&css_color(triangle.color));
        let [a, b, c] = triangle.points;
        context.begin_path();
        context.move_to(a.0 as f64, a.1 as f64);
        context.line_to(b.0 as f64, b.1 as f64);
        context.line_to(c.0 as f64, c.1 as f64);
        context.close_path();
        context.set_fill_style(&style);
        context.set_stroke_style(&style);
        context.fill();
        // Hides hairline seams between neighbouring faces
        context.stroke();
    }

    context.set_line_width(1.0);
    for line in &list.lines {
        context.begin_path();
        context.move_to(line.from.0 as f64, line.from.1 as f64);
        context.line_to(line.to.0 as f64, line.to.1 as f64);
        context.set_stroke_style(&JsValue::from_str(&css_color(line.color)));
        context.stroke();
    }
    Ok(())
}

fn paint_fallback(
    context: &CanvasRenderingContext2d,
    message: &str,
    width: u32,
    height: u32,
) -> Result<(), JsValue> {
    context.clear_rect(0.0, 0.0, width as f64, height as f64);
    context.set_fill_style(&JsValue::from_str("#cc3333"));
    context.set_font(FALLBACK_FONT);
    context.set_text_align("center");
    context.fill_text(message, width as f64 / 2.0, height as f64 / 2.0)
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Setup panic hook for better error messages in browser console
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).map_err(to_js)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_color() {
        assert_eq!(css_color(Color::WHITE), "rgb(255, 255, 255)");
        assert_eq!(css_color("skyblue".parse().unwrap()), "rgb(135, 206, 235)");
    }
}
