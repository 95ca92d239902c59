use armor_vision_core::ParamError;
use serde::{Deserialize, Serialize};

/// Acceptance rules applied after classification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierParams {
    /// Minimum softmax confidence, inclusive.
    pub threshold: f32,
    /// Labels dropped regardless of confidence.
    pub ignore_classes: Vec<String>,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            ignore_classes: Vec::new(),
        }
    }
}

impl ClassifierParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        ParamError::check_range(
            "classifier.threshold",
            self.threshold as f64,
            0.0,
            1.0,
            "[0, 1]",
        )
    }
}
