//! Live simulation configuration and randomization toggles.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::activation::ActivationSource;
use crate::kernel::{Kernel, Symmetry};
use crate::state::ResetType;

pub const DEFAULT_COLOR: Vec3 = Vec3::ONE;
pub const DEFAULT_BACKGROUND: &str = "#000000";
pub const DEFAULT_SIMULATION_SPEED: u32 = 1;
pub const DEFAULT_ZOOM_LEVEL: u32 = 1;

/// Everything the controller pushes to the renderer, plus display state.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub kernel: Kernel,
    /// Foreground RGB, each channel in `[0, 1]`.
    pub color: Vec3,
    /// `#rrggbb`, drawn behind the simulation.
    pub background_color: String,
    pub activation: ActivationSource,
    pub persistent: bool,
    pub symmetry: Symmetry,
    pub reset_type: ResetType,
    /// Simulation steps per displayed frame.
    pub simulation_speed: u32,
    /// Display magnification, at least 1.
    pub zoom_level: u32,
    pub paused: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            kernel: Kernel::IDENTITY,
            color: DEFAULT_COLOR,
            background_color: DEFAULT_BACKGROUND.to_string(),
            activation: ActivationSource::default(),
            persistent: false,
            symmetry: Symmetry::NONE,
            reset_type: ResetType::Empty,
            simulation_speed: DEFAULT_SIMULATION_SPEED,
            zoom_level: DEFAULT_ZOOM_LEVEL,
            paused: false,
        }
    }
}

/// Which settings "randomize all" is allowed to touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomizationOptions {
    pub kernel: bool,
    pub foreground_color: bool,
    pub background_color: bool,
    pub persistent_pixels: bool,
    pub simulation_speed: bool,
    pub activation_function: bool,
    pub reset_type: bool,
    pub zoom_level: bool,
}

impl Default for RandomizationOptions {
    fn default() -> Self {
        Self {
            kernel: true,
            foreground_color: true,
            background_color: true,
            persistent_pixels: true,
            simulation_speed: true,
            activation_function: true,
            reset_type: true,
            zoom_level: true,
        }
    }
}

impl RandomizationOptions {
    /// Every toggle off.
    pub fn none() -> Self {
        Self {
            kernel: false,
            foreground_color: false,
            background_color: false,
            persistent_pixels: false,
            simulation_speed: false,
            activation_function: false,
            reset_type: false,
            zoom_level: false,
        }
    }

    /// Overwrite only the toggles present in `update`.
    pub fn merge(&mut self, update: RandomizationUpdate) {
        let pairs = [
            (&mut self.kernel, update.kernel),
            (&mut self.foreground_color, update.foreground_color),
            (&mut self.background_color, update.background_color),
            (&mut self.persistent_pixels, update.persistent_pixels),
            (&mut self.simulation_speed, update.simulation_speed),
            (&mut self.activation_function, update.activation_function),
            (&mut self.reset_type, update.reset_type),
            (&mut self.zoom_level, update.zoom_level),
        ];
        for (slot, value) in pairs {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

/// Partial update for [`RandomizationOptions`]; `None` keeps the stored value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomizationUpdate {
    pub kernel: Option<bool>,
    pub foreground_color: Option<bool>,
    pub background_color: Option<bool>,
    pub persistent_pixels: Option<bool>,
    pub simulation_speed: Option<bool>,
    pub activation_function: Option<bool>,
    pub reset_type: Option<bool>,
    pub zoom_level: Option<bool>,
}
