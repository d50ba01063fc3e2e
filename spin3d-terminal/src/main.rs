/// Spin3D Terminal Demo - animated primitives with a parameter panel
///
/// Usage: spin3d-terminal [config.toml]
/// Controls:
///   - WASD / Arrow Keys: Orbit the camera (Shift+Arrows pans)
///   - +/- or mouse wheel: Zoom
///   - Mouse: hover and click objects
///   - Tab/Shift+Tab, [ and ]: Select and adjust parameters, R resets them
///   - P: Toggle the panel
///   - Q/ESC: Quit
use std::fs::{self, File};
use std::io;
use std::path::Path;
use spin3d_core::ViewerConfig;
use spin3d_terminal::TerminalApp;

const DEFAULT_CONFIG: &str = "spin3d.toml";

fn load_config() -> io::Result<ViewerConfig> {
    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG).exists() => DEFAULT_CONFIG.to_string(),
        None => return Ok(ViewerConfig::default()),
    };
    let text = fs::read_to_string(&path)?;
    ViewerConfig::from_toml_str(&text)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{path}: {e}")))
}

/// Log to a file; anything on stderr would tear the alternate screen
fn init_logging(config: &ViewerConfig) -> io::Result<()> {
    let Some(file) = &config.log.file else {
        return Ok(());
    };
    let target = File::create(file)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log.level))
        .target(env_logger::Target::Pipe(Box::new(target)))
        .init();
    Ok(())
}

fn main() -> io::Result<()> {
    let config = load_config()?;
    init_logging(&config)?;

    println!("Spin3D Terminal Renderer - Loading...");
    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    // Run the terminal app
    let mut app = TerminalApp::new(&config)?;
    app.run()?;

    println!("Thank you for using Spin3D Terminal Renderer!");
    Ok(())
}
