//! # neural-automata
//!
//! Neural cellular automata on the GPU: every frame each cell becomes
//! `activation(sum(kernel * neighborhood))`, with a 3×3 kernel and a
//! user-chosen WGSL activation function.
//!
//! The crate is split into a renderer-agnostic core and a wgpu front end.
//!
//! ## Core
//!
//! - [`Controller`] owns the live [`SimulationConfig`] and pushes it to a
//!   [`Renderer`] through a stop/push/restart protocol that never touches the
//!   renderer mid-frame.
//! - [`random`] generates initial grids, symmetric kernels and colors.
//! - [`Controller::randomize_all_parameters`] and
//!   [`Controller::mutate_current_settings`] explore the parameter space.
//!
//! ## Quick Start
//!
//! ```ignore
//! use neural_automata::prelude::*;
//!
//! let mut controller: Controller<GpuRenderer> = Controller::new(Box::new(NullDisplay));
//! controller.attach_renderer(renderer)?;
//! controller.load(&(find_preset("worms").unwrap().config)(), true)?;
//!
//! // later, from input handlers
//! controller.mutate_current_settings()?;
//! controller.pause_toggle();
//! ```
//!
//! ## Reset types
//!
//! | Type | Initial grid |
//! |------|--------------|
//! | `random` | grayscale noise |
//! | `random_bool` | black/white noise |
//! | `center` | one lit cell near the middle |
//! | `center_top` | one lit cell in the first row |
//! | `empty` | nothing |

pub mod activation;
pub mod config;
mod controller;
pub mod error;
pub mod gpu;
pub mod kernel;
pub mod mutation;
pub mod preset;
pub mod random;
mod renderer;
pub mod shader;
pub mod shader_validate;
pub mod state;
pub mod window;

pub use activation::{ActivationFunction, ActivationSource, ACTIVATION_FUNCTIONS};
pub use config::{RandomizationOptions, RandomizationUpdate, SimulationConfig};
pub use controller::Controller;
pub use error::{AppError, CompileError, GpuError, PresetError};
pub use glam::Vec3;
pub use gpu::{BackgroundHandle, GpuRenderer};
pub use kernel::{Kernel, Symmetry};
pub use mutation::MutationKind;
pub use preset::{find_preset, resolve_preset, Preset, PresetColor, PresetConfig, PRESETS};
pub use renderer::{DisplaySink, NullDisplay, Renderer};
pub use state::{ResetType, StateBuffer};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use neural_automata::prelude::*;
/// ```
pub mod prelude {
    pub use crate::activation::{ActivationSource, ACTIVATION_FUNCTIONS};
    pub use crate::config::{RandomizationOptions, RandomizationUpdate, SimulationConfig};
    pub use crate::controller::Controller;
    pub use crate::error::CompileError;
    pub use crate::gpu::GpuRenderer;
    pub use crate::kernel::{Kernel, Symmetry};
    pub use crate::mutation::MutationKind;
    pub use crate::preset::{find_preset, PresetColor, PresetConfig, PRESETS};
    pub use crate::renderer::{DisplaySink, NullDisplay, Renderer};
    pub use crate::state::{ResetType, StateBuffer};
    pub use crate::Vec3;
}
