//! Per-candidate measurements kept for offline tuning.

use armor_vision_core::{ArmorSize, LightColor};
use serde::{Deserialize, Serialize};

/// One fitted bright region, accepted or not.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebugLight {
    pub center_x: f32,
    pub ratio: f32,
    pub angle: f32,
    pub color: LightColor,
    pub is_light: bool,
}

/// One evaluated light pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebugArmor {
    pub center_x: f32,
    pub light_ratio: f32,
    pub center_distance: f32,
    /// Slope of the line joining the light centers, degrees.
    pub angle: f32,
    /// `None` when the pair failed any rule.
    pub size: Option<ArmorSize>,
}

/// Order records left to right for display.
pub fn sort_debug_lights(lights: &mut [DebugLight]) {
    lights.sort_by(|a, b| a.center_x.total_cmp(&b.center_x));
}

/// Order records left to right for display.
pub fn sort_debug_armors(armors: &mut [DebugArmor]) {
    armors.sort_by(|a, b| a.center_x.total_cmp(&b.center_x));
}
