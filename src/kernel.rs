//! Convolution kernel and mirror symmetry.
//!
//! A [`Kernel`] is a 3×3 matrix stored row-major:
//!
//! ```text
//! 0 1 2
//! 3 4 5
//! 6 7 8
//! ```
//!
//! The symmetry transforms copy one side of the matrix onto the other. They
//! work on any kernel, not only freshly generated ones, and applying one twice
//! gives the same result as applying it once.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 3×3 convolution weights, row-major.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kernel(pub [f32; 9]);

impl Kernel {
    /// Pass-through kernel: center weight 1, everything else 0.
    pub const IDENTITY: Kernel = Kernel([0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);

    /// Number of weights.
    pub const LEN: usize = 9;

    #[inline]
    pub fn as_array(&self) -> &[f32; 9] {
        &self.0
    }

    /// Mirror top/bottom: row 0 is copied onto row 2.
    pub fn h_symmetry(mut self) -> Self {
        let k = &mut self.0;
        k[6] = k[0];
        k[7] = k[1];
        k[8] = k[2];
        self
    }

    /// Mirror left/right: column 0 is copied onto column 2.
    pub fn v_symmetry(mut self) -> Self {
        let k = &mut self.0;
        k[2] = k[0];
        k[5] = k[3];
        k[8] = k[6];
        self
    }

    /// Mirror on both axes.
    ///
    /// The top-center weight is first copied to center-left so the two mirror
    /// passes agree on every edge cell.
    pub fn full_symmetry(mut self) -> Self {
        self.0[3] = self.0[1];
        self.h_symmetry().v_symmetry()
    }

    /// Apply the transforms selected by `symmetry`.
    ///
    /// `full` takes priority; otherwise horizontal then vertical are applied
    /// independently.
    pub fn with_symmetry(self, symmetry: Symmetry) -> Self {
        if symmetry.full {
            self.full_symmetry()
        } else {
            let mut k = self;
            if symmetry.horizontal {
                k = k.h_symmetry();
            }
            if symmetry.vertical {
                k = k.v_symmetry();
            }
            k
        }
    }

    /// Clamp every weight into `[min, max]`.
    pub fn clamped(mut self, min: f32, max: f32) -> Self {
        for w in &mut self.0 {
            *w = w.clamp(min, max);
        }
        self
    }

    /// Rows padded to `vec4` for a WGSL uniform block.
    pub fn to_gpu_rows(&self) -> [[f32; 4]; 3] {
        let k = &self.0;
        [
            [k[0], k[1], k[2], 0.0],
            [k[3], k[4], k[5], 0.0],
            [k[6], k[7], k[8], 0.0],
        ]
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f32; 9]> for Kernel {
    fn from(weights: [f32; 9]) -> Self {
        Kernel(weights)
    }
}

impl std::ops::Index<usize> for Kernel {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

impl std::ops::IndexMut<usize> for Kernel {
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        &mut self.0[index]
    }
}

/// How the current kernel was generated.
///
/// Informational only: kernels loaded from presets are not checked against it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symmetry {
    pub horizontal: bool,
    pub vertical: bool,
    pub full: bool,
}

impl Symmetry {
    pub const NONE: Symmetry = Symmetry {
        horizontal: false,
        vertical: false,
        full: false,
    };
}
