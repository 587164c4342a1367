//! Procedural generation: initial states, kernels and colors.
//!
//! Everything here is a pure function of its arguments and the caller's RNG,
//! so a seeded [`SmallRng`](rand::rngs::SmallRng) reproduces a run exactly.
//!
//! ```ignore
//! use rand::{rngs::SmallRng, SeedableRng};
//! use neural_automata::random::{generate_state, random_kernel};
//! use neural_automata::ResetType;
//!
//! let mut rng = SmallRng::seed_from_u64(7);
//! let state = generate_state(&mut rng, 256, 256, ResetType::RandomBool);
//! let kernel = random_kernel(&mut rng, -1.0, 1.0, true, false, false);
//! ```

use glam::Vec3;
use rand::Rng;

use crate::kernel::{Kernel, Symmetry};
use crate::state::{ResetType, StateBuffer};

/// Build an initial state buffer of `width * height * 4` bytes.
///
/// `Center` lights the quad at `len / 2`, shifted forward by `2 * width`
/// bytes when `height` is even. That shift is what the simulation has always
/// done and existing presets look the way they do because of it, so it is
/// kept even though it is not the geometric center.
pub fn generate_state<R: Rng + ?Sized>(
    rng: &mut R,
    width: u32,
    height: u32,
    reset_type: ResetType,
) -> StateBuffer {
    let mut state = StateBuffer::zeroed(width, height);

    match reset_type {
        ResetType::Random => {
            for cell in state.as_bytes_mut().chunks_exact_mut(4) {
                let v: u8 = rng.gen_range(0..255);
                cell.fill(v);
            }
        }
        ResetType::RandomBool => {
            for cell in state.as_bytes_mut().chunks_exact_mut(4) {
                let v = if rng.gen::<bool>() { 255 } else { 0 };
                cell.fill(v);
            }
        }
        ResetType::Center => {
            let offset = center_offset(width, height);
            state.light_quad(offset);
        }
        ResetType::CenterTop => {
            state.light_quad(width as usize * 2);
        }
        ResetType::Empty => {}
    }

    state
}

/// Byte offset of the quad lit by [`ResetType::Center`].
pub fn center_offset(width: u32, height: u32) -> usize {
    let len = width as usize * height as usize * 4;
    let mut center = len / 2;
    if height % 2 == 0 {
        center += width as usize * 2;
    }
    center
}

/// Random 3×3 kernel with weights in `[min, max)`.
///
/// Symmetry is applied after drawing: `full_sym` wins; otherwise `h_sym`
/// and `v_sym` apply independently.
pub fn random_kernel<R: Rng + ?Sized>(
    rng: &mut R,
    min: f32,
    max: f32,
    h_sym: bool,
    v_sym: bool,
    full_sym: bool,
) -> Kernel {
    let range = max - min;
    let mut weights = [0.0f32; 9];
    for w in &mut weights {
        *w = rng.gen::<f32>() * range + min;
    }

    Kernel(weights).with_symmetry(Symmetry {
        horizontal: h_sym,
        vertical: v_sym,
        full: full_sym,
    })
}

/// Random saturated color: one channel is always exactly 1.0.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let mut color = [rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>()];
    color[rng.gen_range(0..3)] = 1.0;
    Vec3::from_array(color)
}

/// Random `#rrggbb` with each channel an independent uniform byte.
pub fn random_hex_color<R: Rng + ?Sized>(rng: &mut R) -> String {
    let (r, g, b): (u8, u8, u8) = (rng.gen(), rng.gen(), rng.gen());
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Parse `#rrggbb` / `rrggbb` (any case) into channels in `[0, 1]`.
///
/// Shorthand (`#fff`) and anything else that is not exactly six hex digits
/// returns `None`.
pub fn hex_to_rgb(hex: &str) -> Option<Vec3> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    let (r, g, b) = (channel(0)?, channel(2)?, channel(4)?);
    Some(Vec3::new(r as f32, g as f32, b as f32) / 255.0)
}

/// Format channels in `[0, 1]` as lowercase `#rrggbb`.
///
/// `rgb_to_hex(hex_to_rgb(h))` gives back `h` exactly only when `h` is
/// already lowercase and `#`-prefixed; `"#ABCDEF"` comes back as
/// `"#abcdef"`.
pub fn rgb_to_hex(rgb: Vec3) -> String {
    let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        to_byte(rgb.x),
        to_byte(rgb.y),
        to_byte(rgb.z)
    )
}
