//! wgpu implementation of [`Renderer`].
//!
//! One texel per cell: the grid is exactly the window's physical size, and
//! zoom is applied in the display pass.

mod ping_pong;

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use glam::Vec3;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::activation::ActivationSource;
use crate::error::{CompileError, GpuError};
use crate::kernel::Kernel;
use crate::random::hex_to_rgb;
use crate::renderer::{DisplaySink, Renderer};
use crate::shader::{generate_display_shader, generate_step_shader, Uniforms};
use crate::shader_validate::{validate_activation, validate_display_shader};
use crate::state::StateBuffer;

use ping_pong::{PingPong, STATE_FORMAT};

/// Background color shared between the controller's display sink and the
/// renderer's display pass.
#[derive(Clone, Debug)]
pub struct BackgroundHandle(Rc<Cell<Vec3>>);

impl BackgroundHandle {
    pub fn get(&self) -> Vec3 {
        self.0.get()
    }
}

impl DisplaySink for BackgroundHandle {
    fn set_background(&mut self, hex: &str) {
        if let Some(rgb) = hex_to_rgb(hex) {
            self.0.set(rgb);
        }
    }
}

pub struct GpuRenderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    step_pipeline: wgpu::RenderPipeline,
    display_pipeline: wgpu::RenderPipeline,
    state: PingPong,
    kernel: Kernel,
    color: Vec3,
    background: Rc<Cell<Vec3>>,
    activation_source: String,
    zoom: u32,
    persistent: bool,
    simulation_speed: u32,
    skip_frames: bool,
    running: bool,
}

impl GpuRenderer {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format =
            pick_surface_format(&surface_caps.formats).ok_or(GpuError::UnsupportedSurface)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let kernel = Kernel::IDENTITY;
        let color = Vec3::ONE;
        let background = Rc::new(Cell::new(Vec3::ZERO));
        let uniforms = Uniforms::new(
            &kernel,
            color,
            background.get(),
            (config.width, config.height),
            1,
            false,
        );
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("State Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("State Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let activation_source = ActivationSource::default().source().to_string();
        validate_activation(&activation_source)?;
        let step_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &generate_step_shader(&activation_source),
            STATE_FORMAT,
            "Step",
        );

        validate_display_shader()?;
        let display_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &generate_display_shader(),
            surface_format,
            "Display",
        );

        let state = PingPong::new(
            &device,
            &bind_group_layout,
            &uniform_buffer,
            config.width,
            config.height,
        );

        tracing::info!(
            adapter = %adapter.get_info().name,
            format = ?surface_format,
            width = config.width,
            height = config.height,
            "GPU initialized"
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            uniform_buffer,
            bind_group_layout,
            pipeline_layout,
            step_pipeline,
            display_pipeline,
            state,
            kernel,
            color,
            background,
            activation_source,
            zoom: 1,
            persistent: false,
            simulation_speed: 1,
            skip_frames: false,
            running: false,
        })
    }

    /// Display sink that feeds this renderer's background color.
    pub fn background_handle(&self) -> BackgroundHandle {
        BackgroundHandle(self.background.clone())
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Run one iteration of the frame loop if it is running.
    ///
    /// Steps `simulation_speed` times (twice that when skipping frames) and
    /// draws once.
    pub fn frame(&mut self) {
        if !self.running {
            return;
        }
        let per_tick = if self.skip_frames { 2 } else { 1 };
        let steps = self.simulation_speed * per_tick;
        if steps > 0 {
            self.write_uniforms();
            self.encode_steps(steps);
        }
        self.update_display();
    }

    /// Reconfigure the surface at its current size, e.g. after it was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn write_uniforms(&self) {
        let uniforms = Uniforms::new(
            &self.kernel,
            self.color,
            self.background.get(),
            (self.config.width, self.config.height),
            self.zoom,
            self.persistent,
        );
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    fn encode_steps(&mut self, steps: u32) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Step Encoder"),
            });

        for _ in 0..steps {
            {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Step Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: self.state.next_view(),
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                pass.set_pipeline(&self.step_pipeline);
                pass.set_bind_group(0, self.state.current_bind_group(), &[]);
                pass.draw(0..3, 0..1);
            }
            self.state.swap();
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn present(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Display Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Display Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.display_pipeline);
            pass.set_bind_group(0, self.state.current_bind_group(), &[]);
            pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        output.present();
        Ok(())
    }
}

impl Renderer for GpuRenderer {
    fn width(&self) -> u32 {
        self.config.width
    }

    fn height(&self) -> u32 {
        self.config.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.state = PingPong::new(
            &self.device,
            &self.bind_group_layout,
            &self.uniform_buffer,
            width,
            height,
        );
        self.write_uniforms();
    }

    fn begin_render(&mut self) {
        self.running = true;
        self.window.request_redraw();
    }

    fn stop_render(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn set_kernel(&mut self, kernel: Kernel) {
        self.kernel = kernel;
    }

    fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }

    fn set_activation_source(&mut self, source: &str) {
        self.activation_source = source.to_string();
    }

    fn set_state(&mut self, state: StateBuffer) {
        if !self.state.upload(&self.queue, &state) {
            tracing::warn!(
                width = state.width(),
                height = state.height(),
                "state buffer does not match grid size, ignored"
            );
        }
    }

    fn set_zoom_level(&mut self, zoom: u32) {
        self.zoom = zoom.max(1);
    }

    fn recompile(&mut self) -> Result<(), CompileError> {
        validate_activation(&self.activation_source)?;
        self.step_pipeline = create_pipeline(
            &self.device,
            &self.pipeline_layout,
            &generate_step_shader(&self.activation_source),
            STATE_FORMAT,
            "Step",
        );
        tracing::debug!("step pipeline recompiled");
        Ok(())
    }

    fn apply_values(&mut self) {
        self.update_display();
    }

    fn render(&mut self) {
        self.update_state();
        self.update_display();
    }

    fn update_state(&mut self) {
        self.write_uniforms();
        self.encode_steps(1);
    }

    fn update_display(&mut self) {
        self.write_uniforms();
        match self.present() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => self.reconfigure(),
            Err(e) => tracing::warn!("render error: {:?}", e),
        }
    }

    fn simulation_speed(&self) -> u32 {
        self.simulation_speed
    }

    fn set_simulation_speed(&mut self, speed: u32) {
        self.simulation_speed = speed;
    }

    fn persistent(&self) -> bool {
        self.persistent
    }

    fn set_persistent(&mut self, persistent: bool) {
        self.persistent = persistent;
    }

    fn skip_frames(&self) -> bool {
        self.skip_frames
    }

    fn set_skip_frames(&mut self, skip: bool) {
        self.skip_frames = skip;
    }
}

/// Preferred surface format: the first non-sRGB one, else whatever comes
/// first. Colors are specified as display values, so the sRGB encode is
/// skipped when possible.
fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first())
        .copied()
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    source: &str,
    format: wgpu::TextureFormat,
    label: &str,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
