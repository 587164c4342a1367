//! Shader validation using naga.
//!
//! Activation functions are user-supplied WGSL, so the step shader is
//! validated before it reaches wgpu. A bad activation then becomes a
//! [`CompileError`] instead of a device error.

use naga::front::wgsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::CompileError;
use crate::shader::{generate_display_shader, generate_step_shader};

/// Validate the step shader built around `activation_source`.
pub fn validate_activation(activation_source: &str) -> Result<(), CompileError> {
    validate_step_shader(&generate_step_shader(activation_source))
}

/// Validate a complete step shader.
pub fn validate_step_shader(source: &str) -> Result<(), CompileError> {
    validate_wgsl(source, "Step")
}

/// Validate the display shader.
pub fn validate_display_shader() -> Result<(), CompileError> {
    validate_wgsl(&generate_display_shader(), "Display")
}

/// Validate WGSL source code.
fn validate_wgsl(source: &str, stage: &'static str) -> Result<(), CompileError> {
    let module = wgsl::parse_str(source)
        .map_err(|err| CompileError::new(stage, err.emit_to_string(source)))?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    validator
        .validate(&module)
        .map_err(|err| CompileError::new(stage, format!("{}", err)))?;

    Ok(())
}
