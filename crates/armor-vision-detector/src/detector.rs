use armor_vision_core::{Armor, ColorImageView, GrayImage, Light};

use crate::debug::{DebugArmor, DebugLight};
use crate::error::DetectError;
use crate::lights::find_lights;
use crate::matcher::match_lights;
use crate::params::DetectorParams;
use crate::preprocess::preprocess;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Output of the geometric stages for one frame.
#[derive(Clone, Debug)]
pub struct LightArmorDetection {
    pub binary: GrayImage,
    pub lights: Vec<Light>,
    pub armors: Vec<Armor>,
    pub debug_lights: Vec<DebugLight>,
    pub debug_armors: Vec<DebugArmor>,
}

/// Run preprocessing, light extraction and matching with one parameter
/// snapshot.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(frame, params),
        fields(width = frame.width(), height = frame.height())
    )
)]
pub fn detect_lights_and_armors(
    frame: &ColorImageView<'_>,
    params: &DetectorParams,
) -> Result<LightArmorDetection, DetectError> {
    let binary = preprocess(frame, &params.preprocess);
    let scan = find_lights(
        frame,
        &binary.view(),
        &params.light,
        params.preprocess.detect_color,
    )?;
    let matches = match_lights(&scan.lights, &params.armor);

    Ok(LightArmorDetection {
        binary,
        lights: scan.lights,
        armors: matches.armors,
        debug_lights: scan.debug,
        debug_armors: matches.debug,
    })
}
