//! Inference seam and a small fully-connected network behind it.
//!
//! `DenseModel` is stored as JSON: a list of layers, each with a row-major
//! `weights` matrix (`outputs x inputs`), a `bias` vector and an optional
//! `activation` (`"relu"` or `"none"`).

use std::{fs, path::Path};

use log::info;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

/// Anything that maps a flattened number crop to one raw score per class.
pub trait NumberModel {
    fn input_size(&self) -> usize;
    fn class_count(&self) -> usize;
    /// Raw, unnormalized class scores.
    fn forward(&self, input: &[f32]) -> Result<Vec<f32>, ClassifierError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    None,
    Relu,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct DenseLayerJson {
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
    #[serde(default)]
    activation: Activation,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct DenseModelJson {
    layers: Vec<DenseLayerJson>,
}

/// `y = activation(W x + b)`.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseLayer {
    weights: DMatrix<f32>,
    bias: DVector<f32>,
    activation: Activation,
}

impl DenseLayer {
    pub fn new(
        weights: DMatrix<f32>,
        bias: DVector<f32>,
        activation: Activation,
    ) -> Result<Self, ClassifierError> {
        if weights.nrows() == 0 || weights.ncols() == 0 {
            return Err(ClassifierError::ModelShape("empty weight matrix".into()));
        }
        if bias.len() != weights.nrows() {
            return Err(ClassifierError::ModelShape(format!(
                "bias has {} entries for {} outputs",
                bias.len(),
                weights.nrows()
            )));
        }
        if weights.iter().chain(bias.iter()).any(|v| !v.is_finite()) {
            return Err(ClassifierError::ModelShape("non-finite parameter".into()));
        }
        Ok(Self {
            weights,
            bias,
            activation,
        })
    }

    pub fn inputs(&self) -> usize {
        self.weights.ncols()
    }

    pub fn outputs(&self) -> usize {
        self.weights.nrows()
    }

    fn from_json(raw: DenseLayerJson, index: usize) -> Result<Self, ClassifierError> {
        let rows = raw.weights.len();
        let cols = raw.weights.first().map_or(0, Vec::len);
        if raw.weights.iter().any(|r| r.len() != cols) {
            return Err(ClassifierError::ModelShape(format!(
                "layer {index}: ragged weight rows"
            )));
        }
        let weights = DMatrix::from_fn(rows, cols, |r, c| raw.weights[r][c]);
        Self::new(weights, DVector::from_vec(raw.bias), raw.activation)
            .map_err(|e| ClassifierError::ModelShape(format!("layer {index}: {e}")))
    }

    fn to_json(&self) -> DenseLayerJson {
        DenseLayerJson {
            weights: self
                .weights
                .row_iter()
                .map(|row| row.iter().copied().collect())
                .collect(),
            bias: self.bias.iter().copied().collect(),
            activation: self.activation,
        }
    }

    fn forward(&self, x: &DVector<f32>) -> DVector<f32> {
        let y = &self.weights * x + &self.bias;
        match self.activation {
            Activation::None => y,
            Activation::Relu => y.map(|v| v.max(0.0)),
        }
    }
}

/// Stack of dense layers with checked shapes.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseModel {
    layers: Vec<DenseLayer>,
}

impl DenseModel {
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self, ClassifierError> {
        if layers.is_empty() {
            return Err(ClassifierError::ModelShape("model has no layers".into()));
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].outputs() != pair[1].inputs() {
                return Err(ClassifierError::ModelShape(format!(
                    "layer {} outputs {} values but layer {} expects {}",
                    i,
                    pair[0].outputs(),
                    i + 1,
                    pair[1].inputs()
                )));
            }
        }
        Ok(Self { layers })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ClassifierError> {
        let doc: DenseModelJson = serde_json::from_str(json)?;
        let layers = doc
            .layers
            .into_iter()
            .enumerate()
            .map(|(i, l)| DenseLayer::from_json(l, i))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(layers)
    }

    /// Load a model from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ClassifierError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json_str(&raw)?;
        info!(
            "loaded number model {} ({} layers, {} -> {})",
            path.display(),
            model.layers.len(),
            model.input_size(),
            model.class_count()
        );
        Ok(model)
    }

    pub fn to_json_string(&self) -> Result<String, ClassifierError> {
        let doc = DenseModelJson {
            layers: self.layers.iter().map(DenseLayer::to_json).collect(),
        };
        Ok(serde_json::to_string(&doc)?)
    }

    /// Write this model to disk as JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ClassifierError> {
        let path = path.as_ref();
        fs::write(path, self.to_json_string()?).map_err(|source| ClassifierError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl NumberModel for DenseModel {
    fn input_size(&self) -> usize {
        self.layers[0].inputs()
    }

    fn class_count(&self) -> usize {
        self.layers[self.layers.len() - 1].outputs()
    }

    fn forward(&self, input: &[f32]) -> Result<Vec<f32>, ClassifierError> {
        if input.len() != self.input_size() {
            return Err(ClassifierError::InputSize {
                expected: self.input_size(),
                got: input.len(),
            });
        }
        let x = DVector::from_column_slice(input);
        let y = self.layers.iter().fold(x, |acc, layer| layer.forward(&acc));
        Ok(y.iter().copied().collect())
    }
}
