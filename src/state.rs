//! Initial cell state.

use serde::{Deserialize, Serialize};

/// Policy for filling the initial state buffer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetType {
    /// Monochrome noise, one random byte per cell.
    Random,
    /// Each cell fully on or fully off.
    RandomBool,
    /// A single lit cell near the middle.
    Center,
    /// A single lit cell in the first row.
    CenterTop,
    /// Everything off.
    #[default]
    Empty,
}

impl ResetType {
    /// All reset types in cycling order.
    pub const ALL: [ResetType; 5] = [
        ResetType::Random,
        ResetType::RandomBool,
        ResetType::Center,
        ResetType::CenterTop,
        ResetType::Empty,
    ];

    /// Reset types that produce a non-empty grid.
    pub const NON_EMPTY: [ResetType; 4] = [
        ResetType::Random,
        ResetType::RandomBool,
        ResetType::Center,
        ResetType::CenterTop,
    ];

    /// Next type in [`ResetType::ALL`], wrapping around.
    pub fn next(self) -> ResetType {
        let index = Self::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            ResetType::Random => "random",
            ResetType::RandomBool => "random_bool",
            ResetType::Center => "center",
            ResetType::CenterTop => "center_top",
            ResetType::Empty => "empty",
        }
    }
}

impl std::fmt::Display for ResetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// RGBA8 cell data for a `width` × `height` grid.
///
/// Always `width * height * 4` bytes. Handed to the renderer by value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl StateBuffer {
    /// All-zero buffer.
    pub fn zeroed(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * 4;
        Self {
            width,
            height,
            data: vec![0; len],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Set the four bytes starting at `offset` to 255.
    ///
    /// `offset` is a byte offset and need not be cell aligned. Bytes past the
    /// end of the buffer are dropped.
    pub fn light_quad(&mut self, offset: usize) {
        let end = (offset + 4).min(self.data.len());
        if offset < end {
            self.data[offset..end].fill(255);
        }
    }

    /// Number of non-zero bytes.
    pub fn lit_bytes(&self) -> usize {
        self.data.iter().filter(|&&b| b != 0).count()
    }
}
