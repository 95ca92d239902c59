use armor_vision_core::{LightColor, ParamError};
use serde::{Deserialize, Serialize};

/// How the color frame is turned into a binary mask.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinarizeMode {
    /// Gray level above `min_lightness`; color is decided per light later.
    #[default]
    Brightness,
    /// Target channel minus opposing channel above `min_lightness`.
    ColorDifference,
}

/// Inputs of the binarization stage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessParams {
    /// Foreground threshold on the 0..=255 scale (strictly greater passes).
    pub min_lightness: u8,
    pub detect_color: LightColor,
    pub binarize: BinarizeMode,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            min_lightness: 160,
            detect_color: LightColor::Red,
            binarize: BinarizeMode::Brightness,
        }
    }
}

/// Shape gate for single light bars.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightParams {
    /// Minimum `width / length`.
    pub min_ratio: f32,
    /// Maximum `width / length`.
    pub max_ratio: f32,
    /// Maximum tilt from vertical, degrees.
    pub max_angle: f32,
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            min_ratio: 0.1,
            max_ratio: 0.55,
            max_angle: 40.0,
        }
    }
}

/// Pairing rules for two lights.
///
/// Center distances are normalized by the mean light length.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmorParams {
    /// Minimum shorter/longer light length ratio.
    pub min_light_ratio: f32,
    pub min_small_center_distance: f32,
    pub max_small_center_distance: f32,
    pub min_large_center_distance: f32,
    pub max_large_center_distance: f32,
    /// Maximum tilt difference between the lights and maximum slope of the
    /// line joining their centers, degrees.
    pub max_angle: f32,
}

impl Default for ArmorParams {
    fn default() -> Self {
        Self {
            min_light_ratio: 0.6,
            min_small_center_distance: 0.8,
            max_small_center_distance: 2.8,
            min_large_center_distance: 3.2,
            max_large_center_distance: 4.3,
            max_angle: 35.0,
        }
    }
}

/// Everything the light and armor stages read for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    #[serde(flatten)]
    pub preprocess: PreprocessParams,
    pub light: LightParams,
    pub armor: ArmorParams,
}

impl DetectorParams {
    /// Reject non-finite, negative or inverted bounds.
    pub fn validate(&self) -> Result<(), ParamError> {
        let l = &self.light;
        check_non_negative("light.min_ratio", l.min_ratio)?;
        check_non_negative("light.max_ratio", l.max_ratio)?;
        ParamError::check_range("light.max_angle", l.max_angle as f64, 0.0, 90.0, "[0, 90]")?;
        ParamError::check_order(
            "light.min_ratio",
            l.min_ratio as f64,
            "light.max_ratio",
            l.max_ratio as f64,
        )?;

        let a = &self.armor;
        ParamError::check_range(
            "armor.min_light_ratio",
            a.min_light_ratio as f64,
            0.0,
            1.0,
            "[0, 1]",
        )?;
        for (name, value) in [
            ("armor.min_small_center_distance", a.min_small_center_distance),
            ("armor.max_small_center_distance", a.max_small_center_distance),
            ("armor.min_large_center_distance", a.min_large_center_distance),
            ("armor.max_large_center_distance", a.max_large_center_distance),
        ] {
            check_non_negative(name, value)?;
        }
        ParamError::check_range("armor.max_angle", a.max_angle as f64, 0.0, 90.0, "[0, 90]")?;
        ParamError::check_order(
            "armor.min_small_center_distance",
            a.min_small_center_distance as f64,
            "armor.max_small_center_distance",
            a.max_small_center_distance as f64,
        )?;
        ParamError::check_order(
            "armor.min_large_center_distance",
            a.min_large_center_distance as f64,
            "armor.max_large_center_distance",
            a.max_large_center_distance as f64,
        )
    }
}

fn check_non_negative(name: &str, value: f32) -> Result<(), ParamError> {
    ParamError::check_range(name, value as f64, 0.0, f64::MAX, "[0, inf)")
}
