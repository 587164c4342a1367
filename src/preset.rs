//! Loadable simulation presets.
//!
//! A preset is the external configuration object the controller knows how to
//! [`load`](crate::Controller::load). On disk it is JSON:
//!
//! ```json
//! {
//!   "reset_type": "random",
//!   "filter": [0.68, -0.9, 0.68, -0.9, -0.66, -0.9, 0.68, -0.9, 0.68],
//!   "activation": "fn activation(x: f32) -> f32 {\n  return abs(x);\n}",
//!   "color": [1.0, 0.4, 0.8],
//!   "persistent": false
//! }
//! ```
//!
//! `color` may also be the string `"random"`, which keeps whatever color is
//! currently active.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::activation::ACTIVATION_FUNCTIONS;
use crate::error::PresetError;
use crate::kernel::Kernel;
use crate::state::ResetType;

/// Preset color: explicit RGB, or keep the current one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PresetColor {
    Random,
    Rgb(Vec3),
}

impl Serialize for PresetColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PresetColor::Random => serializer.serialize_str("random"),
            PresetColor::Rgb(c) => c.to_array().serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for PresetColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Rgb([f32; 3]),
            Keyword(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Rgb(c) => Ok(PresetColor::Rgb(Vec3::from_array(c))),
            Repr::Keyword(k) if k == "random" => Ok(PresetColor::Random),
            Repr::Keyword(k) => Err(serde::de::Error::custom(format!(
                "expected an [r, g, b] array or \"random\", got \"{}\"",
                k
            ))),
        }
    }
}

/// Serializable simulation preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresetConfig {
    pub reset_type: ResetType,
    pub filter: Kernel,
    /// WGSL source of `fn activation(x: f32) -> f32`.
    pub activation: String,
    pub color: PresetColor,
    #[serde(default)]
    pub persistent: bool,
}

impl PresetConfig {
    /// Load a preset from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PresetError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save the preset to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PresetError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, PresetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A named built-in preset.
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub config: fn() -> PresetConfig,
}

pub static PRESETS: &[Preset] = &[
    Preset {
        name: "Worms",
        description: "Wriggling filaments that split and merge",
        config: || PresetConfig {
            reset_type: ResetType::Random,
            filter: Kernel([0.68, -0.9, 0.68, -0.9, -0.66, -0.9, 0.68, -0.9, 0.68]),
            activation: "fn activation(x: f32) -> f32 {\n  return -1.0 / pow(2.0, 0.6 * pow(x, 2.0)) + 1.0;\n}"
                .into(),
            color: PresetColor::Rgb(Vec3::new(1.0, 0.4, 0.8)),
            persistent: false,
        },
    },
    Preset {
        name: "Waves",
        description: "Interfering ripples from random noise",
        config: || PresetConfig {
            reset_type: ResetType::Random,
            filter: Kernel([0.565, -0.716, 0.565, -0.716, 0.627, -0.716, 0.565, -0.716, 0.565]),
            activation: "fn activation(x: f32) -> f32 {\n  return abs(1.2 * x);\n}".into(),
            color: PresetColor::Rgb(Vec3::new(0.2, 0.6, 1.0)),
            persistent: false,
        },
    },
    Preset {
        name: "Game of Life",
        description: "Conway's rules expressed as a convolution",
        config: || PresetConfig {
            reset_type: ResetType::RandomBool,
            filter: Kernel([1.0, 1.0, 1.0, 1.0, 9.0, 1.0, 1.0, 1.0, 1.0]),
            activation: "fn activation(x: f32) -> f32 {\n  if (x == 3.0 || x == 11.0 || x == 12.0) {\n    return 1.0;\n  }\n  return 0.0;\n}"
                .into(),
            color: PresetColor::Random,
            persistent: false,
        },
    },
    Preset {
        name: "Slime Mold",
        description: "Branching networks that slowly creep",
        config: || PresetConfig {
            reset_type: ResetType::Random,
            filter: Kernel([0.8, -0.85, 0.8, -0.85, -0.2, -0.85, 0.8, -0.85, 0.8]),
            activation: "fn activation(x: f32) -> f32 {\n  return -1.0 / (0.89 * pow(x, 2.0) + 1.0) + 1.0;\n}"
                .into(),
            color: PresetColor::Rgb(Vec3::new(0.9, 0.8, 0.2)),
            persistent: false,
        },
    },
    Preset {
        name: "Mitosis",
        description: "Blobs that grow and divide",
        config: || PresetConfig {
            reset_type: ResetType::Random,
            filter: Kernel([-0.939, 0.88, -0.939, 0.88, 0.4, 0.88, -0.939, 0.88, -0.939]),
            activation: "fn activation(x: f32) -> f32 {\n  return -1.0 / (0.9 * pow(x, 2.0) + 1.0) + 1.0;\n}"
                .into(),
            color: PresetColor::Rgb(Vec3::new(0.3, 1.0, 0.5)),
            persistent: false,
        },
    },
    Preset {
        name: "Stars",
        description: "Twinkling points with long trails",
        config: || PresetConfig {
            reset_type: ResetType::Random,
            filter: Kernel([0.565, -0.716, 0.565, -0.759, 0.627, -0.759, 0.565, -0.716, 0.565]),
            activation: ACTIVATION_FUNCTIONS[3].source.into(),
            color: PresetColor::Rgb(Vec3::new(1.0, 1.0, 0.9)),
            persistent: true,
        },
    },
    Preset {
        name: "Pulse",
        description: "A single seed expanding into a symmetric ring",
        config: || PresetConfig {
            reset_type: ResetType::Center,
            filter: Kernel([0.25, 0.5, 0.25, 0.5, -1.0, 0.5, 0.25, 0.5, 0.25]),
            activation: ACTIVATION_FUNCTIONS[6].source.into(),
            color: PresetColor::Random,
            persistent: false,
        },
    },
];

/// Find a built-in preset by name, ignoring case.
pub fn find_preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Resolve a command-line argument: a built-in preset name, else a JSON path.
pub fn resolve_preset(arg: &str) -> Result<PresetConfig, PresetError> {
    if let Some(preset) = find_preset(arg) {
        return Ok((preset.config)());
    }
    let path = Path::new(arg);
    if path.exists() {
        PresetConfig::from_file(path)
    } else {
        Err(PresetError::UnknownPreset(arg.to_string()))
    }
}
