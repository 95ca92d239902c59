//! Light-bar segmentation and geometric armor matching.
//!
//! The stages are free functions over explicit parameters:
//! - [`preprocess`]: color frame to binary mask,
//! - [`find_lights`]: connected regions to fitted [`Light`]s,
//! - [`match_lights`]: light pairs to [`Armor`] candidates.
//!
//! [`detect_lights_and_armors`] chains all three with one
//! [`DetectorParams`] snapshot.
//!
//! [`Light`]: armor_vision_core::Light
//! [`Armor`]: armor_vision_core::Armor

mod debug;
mod detector;
mod error;
mod lights;
mod matcher;
mod params;
mod preprocess;

pub use debug::{sort_debug_armors, sort_debug_lights, DebugArmor, DebugLight};
pub use detector::{detect_lights_and_armors, LightArmorDetection};
pub use error::DetectError;
pub use lights::{find_lights, is_light, LightScan};
pub use matcher::{
    classify_center_distance, classify_pair, match_lights, ArmorMatches, PairGeometry,
};
pub use params::{ArmorParams, BinarizeMode, DetectorParams, LightParams, PreprocessParams};
pub use preprocess::preprocess;
