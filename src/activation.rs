//! Activation functions.
//!
//! Each entry is a complete WGSL function with the signature
//! `fn activation(x: f32) -> f32`, spliced verbatim into the step shader.

use serde::{Deserialize, Serialize};

/// A named activation function from the built-in catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationFunction {
    pub name: &'static str,
    pub source: &'static str,
}

/// The built-in catalog, in cycling order.
pub static ACTIVATION_FUNCTIONS: [ActivationFunction; 9] = [
    ActivationFunction {
        name: "Identity",
        source: "fn activation(x: f32) -> f32 {\n  return x;\n}",
    },
    ActivationFunction {
        name: "Sin",
        source: "fn activation(x: f32) -> f32 {\n  return sin(x);\n}",
    },
    ActivationFunction {
        name: "Power",
        source: "fn activation(x: f32) -> f32 {\n  return pow(x, 2.0);\n}",
    },
    ActivationFunction {
        name: "Absolute Value",
        source: "fn activation(x: f32) -> f32 {\n  return abs(x);\n}",
    },
    ActivationFunction {
        name: "Tanh",
        source: "fn activation(x: f32) -> f32 {\n  return (exp(2.0 * x) - 1.0) / (exp(2.0 * x) + 1.0);\n}",
    },
    ActivationFunction {
        name: "Inverse Gaussian",
        source: "fn activation(x: f32) -> f32 {\n  return -1.0 / pow(2.0, pow(x, 2.0)) + 1.0;\n}",
    },
    ActivationFunction {
        name: "Sin (Scaled by PI)",
        source: "fn activation(x: f32) -> f32 {\n  return sin(x * 3.1415926535);\n}",
    },
    ActivationFunction {
        name: "Step (0.0 threshold)",
        source: "fn activation(x: f32) -> f32 {\n  return step(0.0, x);\n}",
    },
    ActivationFunction {
        name: "Smoothstep (-0.5 to 0.5)",
        source: "fn activation(x: f32) -> f32 {\n  return smoothstep(-0.5, 0.5, x);\n}",
    },
];

/// Position of `source` in the catalog, by exact text match.
pub fn catalog_index_of(source: &str) -> Option<usize> {
    ACTIVATION_FUNCTIONS.iter().position(|f| f.source == source)
}

/// The activation currently in use.
///
/// Keeps the catalog position next to the source text so cycling does not
/// depend on comparing shader strings. Sources that did not come from the
/// catalog carry `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationSource {
    catalog_index: Option<usize>,
    source: String,
}

impl ActivationSource {
    /// Catalog entry `index`, wrapped to the catalog length.
    pub fn from_catalog(index: usize) -> Self {
        let index = index % ACTIVATION_FUNCTIONS.len();
        Self {
            catalog_index: Some(index),
            source: ACTIVATION_FUNCTIONS[index].source.to_string(),
        }
    }

    /// Arbitrary WGSL. Matched against the catalog once, here.
    pub fn from_source(source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            catalog_index: catalog_index_of(&source),
            source,
        }
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn catalog_index(&self) -> Option<usize> {
        self.catalog_index
    }

    /// Catalog name, or `"Custom"`.
    pub fn name(&self) -> &'static str {
        self.catalog_index
            .map(|i| ACTIVATION_FUNCTIONS[i].name)
            .unwrap_or("Custom")
    }

    /// The next catalog entry. Custom sources restart at the first entry.
    pub fn next(&self) -> Self {
        match self.catalog_index {
            Some(i) => Self::from_catalog(i + 1),
            None => Self::from_catalog(0),
        }
    }
}

impl Default for ActivationSource {
    fn default() -> Self {
        Self::from_catalog(0)
    }
}
