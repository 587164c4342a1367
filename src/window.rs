//! Window shell: winit event loop driving a [`Controller`] over a
//! [`GpuRenderer`].
//!
//! Keys:
//!
//! | Key | Action |
//! |-----|--------|
//! | `Space` | pause / resume |
//! | `.` | single step |
//! | `O` | offset skipped frame |
//! | `R` | randomize all |
//! | `M` | mutate one setting |
//! | `C` | reseed the grid |
//! | `D` | restore defaults |
//! | `F` | toggle frame skipping |
//! | `P` | toggle persistent trails |
//! | `+` / `-` | zoom |
//! | `[` / `]` | simulation speed |
//! | `1`-`9` | built-in presets |

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::controller::Controller;
use crate::error::AppError;
use crate::gpu::GpuRenderer;
use crate::preset::{PresetConfig, PRESETS};
use crate::renderer::Renderer;

const TITLE: &str = "Neural Automata";

pub struct App {
    window: Option<Arc<Window>>,
    controller: Option<Controller<GpuRenderer>>,
    initial_preset: Option<PresetConfig>,
    error: Option<AppError>,
}

impl App {
    pub fn new(initial_preset: Option<PresetConfig>) -> Self {
        Self {
            window: None,
            controller: None,
            initial_preset,
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let renderer = pollster::block_on(GpuRenderer::new(window.clone()))?;

        let mut controller = Controller::new(Box::new(renderer.background_handle()));
        if let Err(e) = controller.attach_renderer(renderer) {
            tracing::error!("default activation failed to compile: {}", e);
        }
        if let Some(preset) = self.initial_preset.take() {
            if let Err(e) = controller.load(&preset, true) {
                tracing::error!("preset failed to compile: {}", e);
            }
        }

        window.request_redraw();
        self.window = Some(window);
        self.controller = Some(controller);
        Ok(())
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };

        let result = match event.logical_key.as_ref() {
            Key::Named(NamedKey::Space) => {
                let paused = controller.pause_toggle();
                tracing::info!(paused, "playback toggled");
                Ok(())
            }
            Key::Character(c) => match c.to_ascii_lowercase().as_str() {
                "." => {
                    controller.step();
                    Ok(())
                }
                "o" => {
                    controller.offset_skipped_frame();
                    Ok(())
                }
                "r" => controller.randomize_all_parameters(None),
                "m" => controller.mutate_current_settings().map(|kind| {
                    tracing::info!(?kind, "mutated");
                }),
                "c" => {
                    controller.reset_state(None);
                    Ok(())
                }
                "d" => controller.reset_all_settings_to_defaults(),
                "f" => {
                    let skip = controller.renderer().is_some_and(|r| !r.skip_frames());
                    controller.set_skip_frames(skip);
                    tracing::info!(skip, "frame skipping");
                    Ok(())
                }
                "p" => {
                    let persistent = !controller.config().persistent;
                    controller.set_persistent(persistent)
                }
                "+" | "=" => {
                    let zoom = controller.config().zoom_level + 1;
                    controller.set_zoom_level(zoom);
                    controller.apply(false)
                }
                "-" => {
                    let zoom = controller.config().zoom_level.saturating_sub(1);
                    controller.set_zoom_level(zoom);
                    controller.apply(false)
                }
                "]" => {
                    let speed = controller.config().simulation_speed + 1;
                    controller.set_simulation_speed(i64::from(speed));
                    Ok(())
                }
                "[" => {
                    let speed = controller.config().simulation_speed.saturating_sub(1).max(1);
                    controller.set_simulation_speed(i64::from(speed));
                    Ok(())
                }
                digit => match digit.parse::<usize>() {
                    Ok(n @ 1..=9) => match PRESETS.get(n - 1) {
                        Some(preset) => {
                            tracing::info!(preset = preset.name, "loading preset");
                            controller.load(&(preset.config)(), true)
                        }
                        None => Ok(()),
                    },
                    _ => Ok(()),
                },
            },
            _ => Ok(()),
        };

        if let Err(e) = result {
            tracing::error!("{}", e);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("startup failed: {}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if physical_size.width == 0 || physical_size.height == 0 {
                    return;
                }
                if let Some(controller) = &mut self.controller {
                    controller.on_resize(physical_size.width, physical_size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    self.handle_key(&event);
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(renderer) = self.controller.as_mut().and_then(|c| c.renderer_mut()) else {
                    return;
                };
                if renderer.is_running() {
                    renderer.frame();
                    renderer.window().request_redraw();
                } else {
                    renderer.update_display();
                }
            }
            _ => {}
        }
    }
}
