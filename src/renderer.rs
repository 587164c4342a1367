//! The seam between the controller and whatever draws the simulation.

use glam::Vec3;

use crate::error::CompileError;
use crate::kernel::Kernel;
use crate::state::StateBuffer;

/// Capabilities the controller needs from a renderer.
///
/// All pushes take values by copy or by move; a renderer never observes later
/// edits to the controller's config unless they are pushed again.
///
/// `begin_render` / `stop_render` toggle the autonomous frame loop. Callers
/// only call each when the loop is in the opposite state; the controller
/// guarantees this through its paused flag.
pub trait Renderer {
    /// Grid width in cells.
    fn width(&self) -> u32;
    /// Grid height in cells.
    fn height(&self) -> u32;
    /// Change the grid size and viewport. The current state is discarded.
    fn resize(&mut self, width: u32, height: u32);

    /// Start the frame loop.
    fn begin_render(&mut self);
    /// Stop the frame loop.
    fn stop_render(&mut self);
    fn is_running(&self) -> bool;

    fn set_kernel(&mut self, kernel: Kernel);
    fn set_color(&mut self, color: Vec3);
    /// Activation WGSL used by the next [`Renderer::recompile`].
    fn set_activation_source(&mut self, source: &str);
    fn set_state(&mut self, state: StateBuffer);
    fn set_zoom_level(&mut self, zoom: u32);

    /// Rebuild the step program from the current bindings.
    fn recompile(&mut self) -> Result<(), CompileError>;
    /// Push held values to the GPU and redraw once, without touching the loop.
    fn apply_values(&mut self);

    /// One full tick: step the simulation and draw.
    fn render(&mut self);
    /// Advance the simulation one step without drawing.
    fn update_state(&mut self);
    /// Draw the current state.
    fn update_display(&mut self);

    fn simulation_speed(&self) -> u32;
    fn set_simulation_speed(&mut self, speed: u32);

    fn persistent(&self) -> bool;
    fn set_persistent(&mut self, persistent: bool);

    /// When set, two steps run per displayed frame so period-2 patterns do
    /// not flicker.
    fn skip_frames(&self) -> bool;
    fn set_skip_frames(&mut self, skip: bool);
}

/// Receives background color changes.
pub trait DisplaySink {
    fn set_background(&mut self, hex: &str);
}

/// Sink that drops every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn set_background(&mut self, _hex: &str) {}
}
