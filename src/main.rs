//! Neural automata viewer.
//!
//! Usage: `neural-automata [PRESET_NAME | PATH.json]`

use std::env;

use neural_automata::error::AppError;
use neural_automata::preset::{resolve_preset, PRESETS};
use neural_automata::window::App;
use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};

fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let preset = match env::args().nth(1) {
        Some(arg) => Some(resolve_preset(&arg).inspect_err(|_| {
            let names: Vec<&str> = PRESETS.iter().map(|p| p.name).collect();
            tracing::error!("could not load {:?}; built-in presets: {}", arg, names.join(", "));
        })?),
        None => None,
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(preset);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
