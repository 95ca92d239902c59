//! Combined pipeline parameters and updates by flat name.

use armor_vision_classifier::ClassifierParams;
use armor_vision_core::{LightColor, ParamError};
use armor_vision_detector::DetectorParams;
use serde::{Deserialize, Serialize};

/// Names accepted by [`PipelineParams::set_named`].
pub const PARAM_NAMES: &[&str] = &[
    "min_lightness",
    "detect_color",
    "light.min_ratio",
    "light.max_ratio",
    "light.max_angle",
    "armor.min_light_ratio",
    "armor.min_small_center_distance",
    "armor.max_small_center_distance",
    "armor.min_large_center_distance",
    "armor.max_large_center_distance",
    "armor.max_angle",
    "classifier.threshold",
    "classifier.ignore_classes",
    "debug",
];

/// Everything one frame reads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    #[serde(flatten)]
    pub detector: DetectorParams,
    pub classifier: ClassifierParams,
    /// Produce [`DebugArtifacts`](crate::DebugArtifacts) per frame.
    pub debug: bool,
}

impl PipelineParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        self.detector.validate()?;
        self.classifier.validate()
    }

    /// Set one parameter by its flat name.
    ///
    /// The change is applied to a copy and validated; on error `self` is left
    /// untouched.
    pub fn set_named(&mut self, name: &str, value: ParamValue) -> Result<(), ParamError> {
        let mut next = self.clone();
        next.apply(name, value)?;
        next.validate()?;
        *self = next;
        Ok(())
    }

    fn apply(&mut self, name: &str, value: ParamValue) -> Result<(), ParamError> {
        let d = &mut self.detector;
        match name {
            "min_lightness" => {
                let v = value.as_int(name)?;
                d.preprocess.min_lightness = u8::try_from(v).map_err(|_| ParamError::OutOfRange {
                    name: name.to_owned(),
                    value: v as f64,
                    range: "[0, 255]",
                })?;
            }
            "detect_color" => {
                let v = value.as_int(name)?;
                d.preprocess.detect_color =
                    LightColor::try_from(v).map_err(|_| ParamError::OutOfRange {
                        name: name.to_owned(),
                        value: v as f64,
                        range: "{0 (red), 1 (blue)}",
                    })?;
            }
            "light.min_ratio" => d.light.min_ratio = value.as_f32(name)?,
            "light.max_ratio" => d.light.max_ratio = value.as_f32(name)?,
            "light.max_angle" => d.light.max_angle = value.as_f32(name)?,
            "armor.min_light_ratio" => d.armor.min_light_ratio = value.as_f32(name)?,
            "armor.min_small_center_distance" => {
                d.armor.min_small_center_distance = value.as_f32(name)?
            }
            "armor.max_small_center_distance" => {
                d.armor.max_small_center_distance = value.as_f32(name)?
            }
            "armor.min_large_center_distance" => {
                d.armor.min_large_center_distance = value.as_f32(name)?
            }
            "armor.max_large_center_distance" => {
                d.armor.max_large_center_distance = value.as_f32(name)?
            }
            "armor.max_angle" => d.armor.max_angle = value.as_f32(name)?,
            "classifier.threshold" => self.classifier.threshold = value.as_f32(name)?,
            "classifier.ignore_classes" => {
                self.classifier.ignore_classes = value.into_strings(name)?
            }
            "debug" => self.debug = value.as_bool(name)?,
            _ => return Err(ParamError::Unknown(name.to_owned())),
        }
        Ok(())
    }
}

/// Dynamically typed parameter value, as delivered by a parameter server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Strings(Vec<String>),
}

impl ParamValue {
    fn wrong_type(name: &str, expected: &'static str) -> ParamError {
        ParamError::WrongType {
            name: name.to_owned(),
            expected,
        }
    }

    fn as_int(&self, name: &str) -> Result<i64, ParamError> {
        match *self {
            Self::Int(v) => Ok(v),
            _ => Err(Self::wrong_type(name, "an integer")),
        }
    }

    /// Integers are accepted where a float is expected.
    fn as_f32(&self, name: &str) -> Result<f32, ParamError> {
        match *self {
            Self::Float(v) => Ok(v as f32),
            Self::Int(v) => Ok(v as f32),
            _ => Err(Self::wrong_type(name, "a number")),
        }
    }

    fn as_bool(&self, name: &str) -> Result<bool, ParamError> {
        match *self {
            Self::Bool(v) => Ok(v),
            _ => Err(Self::wrong_type(name, "a boolean")),
        }
    }

    fn into_strings(self, name: &str) -> Result<Vec<String>, ParamError> {
        match self {
            Self::Strings(v) => Ok(v),
            _ => Err(Self::wrong_type(name, "a list of strings")),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(v: Vec<String>) -> Self {
        Self::Strings(v)
    }
}
