//! WGSL generation for the step and display passes.
//!
//! Both passes draw a single fullscreen triangle. The step pass reads the
//! previous state texture and writes the next one; the display pass maps the
//! state onto the window with the foreground/background colors and zoom.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::kernel::Kernel;

/// Uniform block shared by both passes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    /// Kernel rows, each padded to a `vec4`.
    pub kernel: [[f32; 4]; 3],
    pub color: [f32; 4],
    pub background: [f32; 4],
    /// Grid size in cells.
    pub size: [u32; 2],
    pub zoom: f32,
    /// Non-zero when lit cells should leave fading trails.
    pub persistent: u32,
}

impl Uniforms {
    pub fn new(
        kernel: &Kernel,
        color: Vec3,
        background: Vec3,
        size: (u32, u32),
        zoom: u32,
        persistent: bool,
    ) -> Self {
        Self {
            kernel: kernel.to_gpu_rows(),
            color: color.extend(1.0).to_array(),
            background: background.extend(1.0).to_array(),
            size: [size.0, size.1],
            zoom: zoom.max(1) as f32,
            persistent: persistent as u32,
        }
    }
}

/// WGSL mirror of [`Uniforms`].
pub const UNIFORMS_WGSL: &str = r#"struct Uniforms {
    kernel: array<vec4<f32>, 3>,
    color: vec4<f32>,
    background: vec4<f32>,
    size: vec2<u32>,
    zoom: f32,
    persistent: u32,
};"#;

/// How much of a cell's previous value survives a step in persistent mode.
pub const PERSISTENCE_DECAY: f32 = 0.96;

const FULLSCREEN_VERTEX: &str = r#"struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    return out;
}"#;

/// Step shader with `activation_source` spliced in.
///
/// `activation_source` must define `fn activation(x: f32) -> f32`. Edges
/// wrap, so the grid is a torus.
pub fn generate_step_shader(activation_source: &str) -> String {
    format!(
        r#"{UNIFORMS_WGSL}

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;
@group(0) @binding(1)
var state: texture_2d<f32>;

{FULLSCREEN_VERTEX}

{activation_source}

fn cell(x: i32, y: i32) -> f32 {{
    let w = i32(uniforms.size.x);
    let h = i32(uniforms.size.y);
    let wrapped = vec2<i32>((x + w) % w, (y + h) % h);
    return textureLoad(state, wrapped, 0).r;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let x = i32(in.clip_position.x);
    let y = i32(in.clip_position.y);

    var sum = 0.0;
    for (var j = 0; j < 3; j++) {{
        for (var i = 0; i < 3; i++) {{
            sum += uniforms.kernel[j][i] * cell(x + i - 1, y + j - 1);
        }}
    }}

    var value = clamp(activation(sum), 0.0, 1.0);
    if (uniforms.persistent != 0u) {{
        value = max(value, cell(x, y) * {PERSISTENCE_DECAY:.2});
    }}
    return vec4<f32>(value, value, value, value);
}}
"#
    )
}

/// Display shader: zoom about the grid center, then blend background to
/// foreground by cell value.
pub fn generate_display_shader() -> String {
    format!(
        r#"{UNIFORMS_WGSL}

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;
@group(0) @binding(1)
var state: texture_2d<f32>;

{FULLSCREEN_VERTEX}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let size = vec2<f32>(uniforms.size);
    let center = size * 0.5;
    let p = center + (in.clip_position.xy - center) / uniforms.zoom;
    let coord = clamp(vec2<i32>(floor(p)), vec2<i32>(0), vec2<i32>(uniforms.size) - 1);
    let v = clamp(textureLoad(state, coord, 0).r, 0.0, 1.0);
    return vec4<f32>(mix(uniforms.background.rgb, uniforms.color.rgb, v), 1.0);
}}
"#
    )
}
