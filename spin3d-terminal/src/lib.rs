/// Terminal frontend: drives the shared scene from a crossterm event loop
/// and rasterizes it as ASCII.
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use log::{info, warn};
use nalgebra::Point3;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use spin3d_core::{
    Camera, DrawList, FaultBoundary, FrameClock, ParameterStore, Rendered, Scene, ViewerConfig,
};

pub mod panel;
pub mod renderer;

pub use panel::Panel;
pub use renderer::AsciiRenderer;

const ORBIT_STEP: f32 = 0.1;
const PAN_STEP: f32 = 0.25;
const ZOOM_IN: f32 = 0.9;
const ZOOM_OUT: f32 = 1.0 / ZOOM_IN;

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    store: ParameterStore,
    scene: Scene,
    boundary: FaultBoundary,
    renderer: AsciiRenderer,
    panel: Panel,
    clock: FrameClock,
    started: Instant,
    target_fps: u32,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

/// Terminal cells are roughly twice as tall as they are wide
fn camera_for(config: &ViewerConfig, width: u16, height: u16) -> Camera {
    let mut camera = Camera::new(width as u32, height as u32 * 2)
        .with_position(Point3::from(config.camera.position));
    camera.fov = config.camera.fov_degrees.to_radians();
    camera
}

impl TerminalApp {
    pub fn new(config: &ViewerConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Self::with_size(config, width, height)
    }

    pub fn with_size(config: &ViewerConfig, width: u16, height: u16) -> io::Result<Self> {
        let store = ParameterStore::new();
        let scene = Scene::mount(&store, camera_for(config, width, height))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        Ok(Self {
            store,
            scene,
            boundary: FaultBoundary::new(),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            panel: Panel::new(config.panel.visible),
            clock: FrameClock::new(),
            started: Instant::now(),
            target_fps: config.frame.target_fps.max(1),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / self.target_fps as u64);
        info!("terminal loop running at {} fps", self.target_fps);

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event);
            }

            // Update and render
            let frame = self.step();
            self.present(frame)?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, modifiers, kind, .. }: KeyEvent) {
        if kind != KeyEventKind::Press {
            return;
        }
        let shift = modifiers.contains(KeyModifiers::SHIFT);
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Up if shift => self.scene.pan(0.0, PAN_STEP),
            KeyCode::Down if shift => self.scene.pan(0.0, -PAN_STEP),
            KeyCode::Left if shift => self.scene.pan(-PAN_STEP, 0.0),
            KeyCode::Right if shift => self.scene.pan(PAN_STEP, 0.0),
            KeyCode::Char('w') | KeyCode::Up => self.scene.orbit(0.0, -ORBIT_STEP),
            KeyCode::Char('s') | KeyCode::Down => self.scene.orbit(0.0, ORBIT_STEP),
            KeyCode::Char('a') | KeyCode::Left => self.scene.orbit(-ORBIT_STEP, 0.0),
            KeyCode::Char('d') | KeyCode::Right => self.scene.orbit(ORBIT_STEP, 0.0),
            KeyCode::Char('+') | KeyCode::Char('=') => self.scene.zoom(ZOOM_IN),
            KeyCode::Char('-') => self.scene.zoom(ZOOM_OUT),
            KeyCode::Tab => self.panel.select(&self.store, true),
            KeyCode::BackTab => self.panel.select(&self.store, false),
            KeyCode::Char(']') => self.panel.nudge(&self.store, true),
            KeyCode::Char('[') => self.panel.nudge(&self.store, false),
            KeyCode::Char('r') => self.store.reset(),
            KeyCode::Char('p') => self.panel.toggle(),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, MouseEvent { kind, column, row, .. }: MouseEvent) {
        let (width, height) = (self.renderer.width() as u32, self.renderer.height() as u32);
        // Aim at the middle of the cell
        let (x, y) = (column as f32 + 0.5, row as f32 + 0.5);
        match kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.scene.pointer_at(x, y, width, height)
            }
            MouseEventKind::Down(MouseButton::Left) => self.scene.click_at(x, y, width, height),
            MouseEventKind::ScrollUp => self.scene.zoom(ZOOM_IN),
            MouseEventKind::ScrollDown => self.scene.zoom(ZOOM_OUT),
            _ => {}
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        if width == 0 || height == 0 {
            warn!("ignoring resize to {width}x{height}");
            return;
        }
        self.renderer.resize(width as usize, height as usize);
        self.scene.set_viewport(width as u32, height as u32 * 2);
    }

    /// One tick behind the fault boundary: publish panel edits, advance
    /// every primitive and build the draw list. Once the boundary has
    /// failed the scene stays frozen.
    pub fn step(&mut self) -> Rendered<DrawList> {
        let tick = self
            .clock
            .tick_seconds(self.started.elapsed().as_secs_f64());
        let (width, height) = (self.renderer.width() as u32, self.renderer.height() as u32);
        let scene = &mut self.scene;
        self.boundary.render("rendering terminal frame", || {
            scene.sync_parameters();
            scene.frame(tick);
            scene.draw_list(width, height)
        })
    }

    fn present(&mut self, frame: Rendered<DrawList>) -> io::Result<()> {
        let (width, height) = (self.renderer.width() as u32, self.renderer.height() as u32);
        let mut stdout = stdout();
        match frame {
            Rendered::View(list) => {
                self.renderer.clear();
                self.renderer.render(&list);
                queue!(stdout, cursor::MoveTo(0, 0))?;
                self.renderer.draw(&mut stdout)?;
                self.panel.draw(&mut stdout, &self.store, width as u16)?;
            }
            Rendered::Fallback(message) => {
                let column = (width as usize).saturating_sub(message.len()) / 2;
                queue!(
                    stdout,
                    terminal::Clear(ClearType::All),
                    cursor::MoveTo(column as u16, height as u16 / 2),
                    SetForegroundColor(Color::Red),
                    Print(message),
                    ResetColor
                )?;
            }
        }

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Spin3D | FPS: {:.1} | WASD/Arrows=Orbit +/-=Zoom Tab=Select [/]=Adjust P=Panel Q=Quit",
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use spin3d_core::ParamValue;

    fn app() -> TerminalApp {
        TerminalApp::with_size(&ViewerConfig::default(), 80, 40).unwrap()
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.handle_event(press(KeyCode::Char('x')));
        assert!(app.is_running());
        app.handle_event(press(KeyCode::Esc));
        assert!(!app.is_running());
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut app = app();
        app.handle_event(Event::Key(KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        }));
        assert!(app.is_running());
    }

    #[test]
    fn test_panel_keys_edit_parameters() {
        let mut app = app();
        assert!(app.panel().is_visible());
        app.handle_event(press(KeyCode::Char('p')));
        assert!(!app.panel().is_visible());

        // lightColor, lightIntensity come first
        app.handle_event(press(KeyCode::Tab));
        app.handle_event(press(KeyCode::Char('[')));
        let intensity = app.store().descriptor("lightIntensity").unwrap().value;
        assert!((intensity.as_number().unwrap() - 0.9).abs() < 1e-5);

        assert!(matches!(app.step(), Rendered::View(_)));
        assert!((app.scene().lighting().directional.intensity - 0.9).abs() < 1e-5);

        app.handle_event(press(KeyCode::Char('r')));
        assert_eq!(
            app.store().descriptor("lightIntensity").unwrap().value,
            ParamValue::Number(1.0)
        );
    }

    #[test]
    fn test_zoom_moves_camera() {
        let mut app = app();
        let before = app.scene().camera().position.z;
        app.handle_event(press(KeyCode::Char('+')));
        assert!(app.scene().camera().position.z < before);
        app.handle_event(press(KeyCode::Char('-')));
        assert!((app.scene().camera().position.z - before).abs() < 1e-4);
    }

    #[test]
    fn test_mouse_hover_and_click() {
        let mut app = app();
        app.step();
        // Center of an 80x40 screen looks at the sphere
        app.handle_event(mouse(MouseEventKind::Moved, 40, 19));
        assert!(app.scene().sphere().unwrap().hovered());

        app.handle_event(mouse(MouseEventKind::Moved, 0, 0));
        assert!(!app.scene().sphere().unwrap().hovered());
    }

    #[test]
    fn test_failed_tick_freezes_scene() {
        let mut app = app();
        app.renderer.resize(0, 0);
        assert!(matches!(app.step(), Rendered::Fallback(_)));

        // Edits are no longer published once the boundary has tripped
        app.store()
            .set("lightIntensity", ParamValue::Number(3.0))
            .unwrap();
        app.renderer.resize(80, 40);
        let before = app.scene().node_of("box").unwrap().transform;
        assert!(matches!(app.step(), Rendered::Fallback(_)));
        assert_eq!(app.scene().lighting().directional.intensity, 1.0);
        assert_eq!(app.scene().node_of("box").unwrap().transform, before);
    }

    #[test]
    fn test_resize_rejects_empty() {
        let mut app = app();
        app.handle_event(Event::Resize(0, 10));
        assert_eq!(app.renderer.width(), 80);
        app.handle_event(Event::Resize(100, 30));
        assert_eq!((app.renderer.width(), app.renderer.height()), (100, 30));
    }
}
