//! Error types for neural-automata.
//!
//! Shader compile failures are ordinary values here: the controller hands
//! them back to whoever triggered the change and keeps running.

use thiserror::Error;

/// A shader failed to parse, validate or build.
///
/// Returned by [`Renderer::recompile`](crate::Renderer::recompile) and
/// [`Controller::apply`](crate::Controller::apply). The message is already
/// formatted for display (naga annotates it with the offending source span).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{stage} shader error: {message}")]
pub struct CompileError {
    /// Which shader failed ("Step" or "Display").
    pub stage: &'static str,
    /// Human-readable diagnostic.
    pub message: String,
}

impl CompileError {
    pub fn new(stage: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Errors that can occur while loading a preset file.
#[derive(Error, Debug)]
pub enum PresetError {
    /// Failed to read the file from disk.
    #[error("Failed to read preset file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not a valid preset.
    #[error("Failed to parse preset: {0}")]
    Json(#[from] serde_json::Error),
    /// No built-in preset with that name.
    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
}

/// Errors that can occur during GPU initialization.
#[derive(Error, Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support.")]
    NoAdapter,
    /// The surface reports no usable texture format for this adapter.
    #[error("Surface is not supported by the selected GPU adapter")]
    UnsupportedSurface,
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The built-in shaders did not compile.
    #[error(transparent)]
    Shader(#[from] CompileError),
}

/// Errors that can occur when running the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Failed to create or run the event loop.
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create the window.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// The requested preset could not be loaded.
    #[error(transparent)]
    Preset(#[from] PresetError),
}
