//! Parameter controller.
//!
//! [`Controller`] owns the live [`SimulationConfig`] and is the only thing that
//! talks to the [`Renderer`]. Every change goes through [`Controller::apply`],
//! which makes sure the renderer is never handed new uniforms mid-frame:
//!
//! - **running**: stop the loop, push, optionally recompile, restart the loop.
//! - **paused**: push, optionally recompile, then ask for a single redraw.
//!   The loop is not stopped or restarted because it is not running.
//!
//! Most operations still do their pure-state part when no renderer is
//! attached, so the controller can be driven headless.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::activation::{ActivationSource, ACTIVATION_FUNCTIONS};
use crate::config::{
    RandomizationOptions, RandomizationUpdate, SimulationConfig, DEFAULT_SIMULATION_SPEED,
};
use crate::error::CompileError;
use crate::kernel::{Kernel, Symmetry};
use crate::mutation::{random_delta, random_step, stepped, MutationKind};
use crate::preset::{PresetColor, PresetConfig};
use crate::random::{
    generate_state, hex_to_rgb, random_color, random_hex_color, random_kernel, rgb_to_hex,
};
use crate::renderer::{DisplaySink, Renderer};
use crate::state::ResetType;

/// Owns the simulation settings and drives a renderer.
pub struct Controller<R: Renderer> {
    config: SimulationConfig,
    randomization: RandomizationOptions,
    renderer: Option<R>,
    display: Box<dyn DisplaySink>,
    rng: SmallRng,
}

impl<R: Renderer> Controller<R> {
    /// Controller with default settings and an entropy-seeded RNG.
    pub fn new(display: Box<dyn DisplaySink>) -> Self {
        Self::with_rng(display, SmallRng::from_entropy())
    }

    /// Controller whose randomization and mutation are reproducible.
    pub fn with_seed(display: Box<dyn DisplaySink>, seed: u64) -> Self {
        Self::with_rng(display, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(display: Box<dyn DisplaySink>, rng: SmallRng) -> Self {
        Self {
            config: SimulationConfig::default(),
            randomization: RandomizationOptions::default(),
            renderer: None,
            display,
            rng,
        }
    }

    // ========== Accessors ==========

    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    pub fn randomization_options(&self) -> &RandomizationOptions {
        &self.randomization
    }

    #[inline]
    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> Option<&mut R> {
        self.renderer.as_mut()
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.config.paused
    }

    // ========== Lifecycle ==========

    /// Take ownership of `renderer`, push the current settings and start it.
    ///
    /// The grid starts as random noise regardless of the configured reset
    /// type. Rendering begins unless the controller is paused.
    pub fn attach_renderer(&mut self, mut renderer: R) -> Result<(), CompileError> {
        renderer.set_simulation_speed(self.config.simulation_speed);
        renderer.set_zoom_level(self.config.zoom_level);
        renderer.set_persistent(self.config.persistent);
        renderer.set_activation_source(self.config.activation.source());
        renderer.set_kernel(self.config.kernel);
        let compiled = renderer.recompile();
        renderer.set_color(self.config.color);
        let state = generate_state(
            &mut self.rng,
            renderer.width(),
            renderer.height(),
            ResetType::Random,
        );
        renderer.set_state(state);
        if !self.config.paused {
            renderer.begin_render();
        }
        tracing::info!(
            width = renderer.width(),
            height = renderer.height(),
            "renderer attached"
        );
        self.display.set_background(&self.config.background_color);
        self.renderer = Some(renderer);
        compiled
    }

    /// Give the renderer back, leaving the controller headless.
    pub fn detach_renderer(&mut self) -> Option<R> {
        self.renderer.take()
    }

    /// Restore every setting, including randomization toggles, to its default.
    pub fn reset_all_settings_to_defaults(&mut self) -> Result<(), CompileError> {
        let paused = self.config.paused;
        self.config = SimulationConfig {
            paused,
            ..SimulationConfig::default()
        };
        self.randomization = RandomizationOptions::default();

        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_skip_frames(false);
            renderer.set_simulation_speed(DEFAULT_SIMULATION_SPEED);
            renderer.set_zoom_level(self.config.zoom_level);
        }

        let result = self.set_persistent(self.config.persistent);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_color(self.config.color);
            renderer.set_kernel(self.config.kernel);
        }
        self.display.set_background(&self.config.background_color);
        self.reset_state(Some(self.config.reset_type));
        self.set_paused(false);

        tracing::info!("settings reset to defaults");
        result
    }

    /// Merge `update` into the stored randomization toggles.
    pub fn update_randomization_options(&mut self, update: RandomizationUpdate) {
        self.randomization.merge(update);
    }

    // ========== Apply protocol ==========

    /// Push kernel, color and activation to the renderer.
    ///
    /// Recompiles when `recompile` is set and returns the compile result.
    /// A failed compile leaves the config as it is; fixing the offending
    /// field and applying again is the recovery path.
    pub fn apply(&mut self, recompile: bool) -> Result<(), CompileError> {
        let paused = self.config.paused;
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };

        let result = if !paused {
            renderer.stop_render();
            let result = push_values(renderer, &self.config, recompile);
            renderer.begin_render();
            result
        } else {
            let result = push_values(renderer, &self.config, recompile);
            renderer.apply_values();
            result
        };

        tracing::debug!(recompile, paused, ok = result.is_ok(), "applied settings");
        if let Err(e) = &result {
            tracing::warn!("{}", e);
        }
        result
    }

    /// Replace reset type, kernel, activation and (unless random) color.
    ///
    /// Nothing is validated here: a bad activation shows up as the returned
    /// compile error.
    pub fn load(&mut self, preset: &PresetConfig, reset: bool) -> Result<(), CompileError> {
        self.config.reset_type = preset.reset_type;
        self.config.kernel = preset.filter;
        self.config.activation = ActivationSource::from_source(preset.activation.clone());
        if let PresetColor::Rgb(color) = preset.color {
            self.config.color = color;
        }

        let result = self.set_persistent(preset.persistent);
        if reset {
            self.reset_state(None);
        }
        tracing::info!(
            reset_type = %preset.reset_type,
            activation = self.config.activation.name(),
            "preset loaded"
        );
        result
    }

    /// Regenerate the grid for `reset_type` (default: the configured one).
    ///
    /// `Some(ResetType::Empty)` clears the grid without changing the stored
    /// reset type, so "clear" does not forget how to reseed.
    pub fn reset_state(&mut self, reset_type: Option<ResetType>) {
        let reset_type = reset_type.unwrap_or(self.config.reset_type);
        if reset_type != ResetType::Empty {
            self.config.reset_type = reset_type;
        }

        if let Some(renderer) = self.renderer.as_mut() {
            let state = generate_state(
                &mut self.rng,
                renderer.width(),
                renderer.height(),
                reset_type,
            );
            renderer.set_state(state);
        }
    }

    // ========== Randomization ==========

    /// Draw new values for every field enabled in `options` (else the
    /// stored toggles), then push everything and reseed the grid.
    pub fn randomize_all_parameters(
        &mut self,
        options: Option<&RandomizationOptions>,
    ) -> Result<(), CompileError> {
        let options = options.copied().unwrap_or(self.randomization);
        let rng = &mut self.rng;

        if options.kernel {
            let h_sym = rng.gen_bool(0.5);
            let v_sym = rng.gen_bool(0.5);
            let full_sym = rng.gen_bool(0.25);
            self.config.kernel = random_kernel(rng, -1.0, 1.0, h_sym, v_sym, full_sym);
            self.config.symmetry = Symmetry {
                horizontal: h_sym || full_sym,
                vertical: v_sym || full_sym,
                full: full_sym,
            };
        }

        if options.foreground_color {
            self.config.color = random_color(rng);
        }

        if options.background_color {
            self.config.background_color = random_hex_color(rng);
            self.display.set_background(&self.config.background_color);
        }

        if options.persistent_pixels {
            self.config.persistent = rng.gen_bool(0.5);
        }

        if options.simulation_speed {
            self.config.simulation_speed = rng.gen_range(1..=5);
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.set_simulation_speed(self.config.simulation_speed);
            }
        }

        if options.activation_function {
            let index = rng.gen_range(0..ACTIVATION_FUNCTIONS.len());
            self.config.activation = ActivationSource::from_catalog(index);
        }

        if options.reset_type {
            let index = rng.gen_range(0..ResetType::NON_EMPTY.len());
            self.config.reset_type = ResetType::NON_EMPTY[index];
        }

        if options.zoom_level {
            self.config.zoom_level = rng.gen_range(1..=5);
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.set_zoom_level(self.config.zoom_level);
            }
        }

        let result = self.set_persistent(self.config.persistent);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_color(self.config.color);
            renderer.set_kernel(self.config.kernel);
        }
        self.reset_state(Some(self.config.reset_type));
        result
    }

    /// Nudge exactly one randomly chosen setting, then apply.
    ///
    /// Only an activation change recompiles; every other kind is a uniform
    /// update.
    pub fn mutate_current_settings(&mut self) -> Result<MutationKind, CompileError> {
        let kind = MutationKind::random(&mut self.rng);

        match kind {
            MutationKind::Kernel => {
                let index = self.rng.gen_range(0..Kernel::LEN);
                let delta = random_delta(&mut self.rng);
                let w = &mut self.config.kernel[index];
                *w = (*w + delta).clamp(-1.0, 1.0);
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.set_kernel(self.config.kernel);
                }
            }
            MutationKind::ForegroundColor => {
                let channel = self.rng.gen_range(0..3);
                let delta = random_delta(&mut self.rng);
                let c = &mut self.config.color[channel];
                *c = (*c + delta).clamp(0.0, 1.0);
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.set_color(self.config.color);
                }
            }
            MutationKind::BackgroundColor => {
                let mut rgb = hex_to_rgb(&self.config.background_color).unwrap_or(Vec3::ZERO);
                let channel = self.rng.gen_range(0..3);
                let delta = random_delta(&mut self.rng);
                rgb[channel] = (rgb[channel] + delta).clamp(0.0, 1.0);
                self.config.background_color = rgb_to_hex(rgb);
                self.display.set_background(&self.config.background_color);
            }
            MutationKind::ActivationFunction => {
                self.config.activation = self.config.activation.next();
            }
            MutationKind::ResetType => {
                self.config.reset_type = self.config.reset_type.next();
                self.reset_state(Some(self.config.reset_type));
            }
            MutationKind::SimulationSpeed => {
                let step = random_step(&mut self.rng);
                self.config.simulation_speed = stepped(self.config.simulation_speed, step);
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.set_simulation_speed(self.config.simulation_speed);
                }
            }
            MutationKind::ZoomLevel => {
                let step = random_step(&mut self.rng);
                self.set_zoom_level(stepped(self.config.zoom_level, step));
            }
        }

        tracing::debug!(?kind, "mutated settings");
        self.apply(kind.requires_recompile())?;
        Ok(kind)
    }

    // ========== Setters ==========

    /// Forward `persistent` to the renderer and apply with a recompile.
    pub fn set_persistent(&mut self, persistent: bool) -> Result<(), CompileError> {
        self.config.persistent = persistent;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_persistent(persistent);
        }
        self.apply(true)
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.config.color = color;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_color(color);
        }
    }

    /// Set steps per frame. Negative values are ignored.
    pub fn set_simulation_speed(&mut self, speed: i64) {
        let Ok(speed) = u32::try_from(speed) else {
            tracing::debug!(speed, "ignoring invalid simulation speed");
            return;
        };
        self.config.simulation_speed = speed;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_simulation_speed(speed);
        }
    }

    /// Set steps per frame from user text.
    ///
    /// Parses a leading integer the way a form field would (`"3"`, `" 4x"`);
    /// text with no leading digits, or a negative number, is ignored.
    pub fn set_simulation_speed_input(&mut self, input: &str) {
        match parse_leading_int(input) {
            Some(speed) => self.set_simulation_speed(speed),
            None => tracing::debug!(input, "ignoring non-numeric simulation speed"),
        }
    }

    /// Set the zoom level, never below 1.
    pub fn set_zoom_level(&mut self, level: u32) {
        self.config.zoom_level = level.max(1);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_zoom_level(self.config.zoom_level);
        }
    }

    pub fn set_skip_frames(&mut self, skip: bool) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_skip_frames(skip);
        }
    }

    /// Replace the kernel. Takes effect on the next [`Controller::apply`].
    pub fn set_kernel(&mut self, kernel: Kernel, symmetry: Symmetry) {
        self.config.kernel = kernel;
        self.config.symmetry = symmetry;
    }

    /// Replace the activation. Takes effect on the next `apply(true)`.
    pub fn set_activation(&mut self, activation: ActivationSource) {
        self.config.activation = activation;
    }

    /// Replace the configured reset type without touching the grid.
    pub fn set_reset_type(&mut self, reset_type: ResetType) {
        self.config.reset_type = reset_type;
    }

    /// Set the background from `#rrggbb`. Returns `false` and changes
    /// nothing if `hex` does not parse.
    pub fn set_background_color(&mut self, hex: &str) -> bool {
        let Some(rgb) = hex_to_rgb(hex) else {
            return false;
        };
        self.config.background_color = rgb_to_hex(rgb);
        self.display.set_background(&self.config.background_color);
        true
    }

    // ========== Playback ==========

    /// Flip the paused state. Returns the new value.
    pub fn pause_toggle(&mut self) -> bool {
        self.set_paused(!self.config.paused)
    }

    /// Start or stop the render loop. Setting the current value does nothing.
    pub fn set_paused(&mut self, paused: bool) -> bool {
        if self.config.paused == paused {
            return paused;
        }
        self.config.paused = paused;
        if let Some(renderer) = self.renderer.as_mut() {
            if paused {
                renderer.stop_render();
            } else {
                renderer.begin_render();
            }
        }
        paused
    }

    /// Advance and draw a single frame.
    pub fn step(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render();
        }
    }

    /// Advance one extra step and redraw, flipping which phase of a
    /// period-2 pattern is visible while frames are being skipped.
    pub fn offset_skipped_frame(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.update_state();
            renderer.update_display();
        }
    }

    /// The output surface changed size.
    ///
    /// Stops the loop, resizes, reseeds the grid for the configured reset
    /// type and restarts unless paused. Same-size notifications are ignored.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        let paused = self.config.paused;
        let reset_type = self.config.reset_type;
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if renderer.width() == width && renderer.height() == height {
            return;
        }

        if !paused {
            renderer.stop_render();
        }
        renderer.resize(width, height);
        let state = generate_state(&mut self.rng, width, height, reset_type);
        renderer.set_state(state);
        if !paused {
            renderer.begin_render();
        }
        tracing::info!(width, height, "resized");
    }
}

fn push_values<R: Renderer>(
    renderer: &mut R,
    config: &SimulationConfig,
    recompile: bool,
) -> Result<(), CompileError> {
    renderer.set_kernel(config.kernel);
    renderer.set_color(config.color);
    renderer.set_activation_source(config.activation.source());
    if recompile {
        renderer.recompile()
    } else {
        Ok(())
    }
}

/// Leading optional sign and digits, ignoring surrounding whitespace and
/// any trailing text.
fn parse_leading_int(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    rest[..digits].parse::<i64>().ok().map(|n| sign * n)
}
