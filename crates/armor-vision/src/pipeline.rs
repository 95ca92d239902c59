use std::sync::Arc;
use std::time::Instant;

use armor_vision_classifier::{ClassifierError, DenseModel, NumberClassifier, NumberModel};
use armor_vision_core::{Frame, GrayImage, ImageError};
use armor_vision_depth::{DepthError, DepthImageView, DepthProcessor};
use armor_vision_detector::{
    detect_lights_and_armors, sort_debug_armors, sort_debug_lights, DetectError,
};
use log::debug;

use crate::output::{DebugArtifacts, FrameOutput};
use crate::store::ParamStore;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors that abort a whole frame.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error("a depth image was given but no camera matrix is set")]
    IntrinsicsNotSet,
    #[error("depth image does not match the color frame: {0}")]
    DepthSize(#[source] ImageError),
}

/// Preprocess, find lights, match armors, classify numbers and locate them.
///
/// Parameters come from a shared [`ParamStore`]; each frame reads exactly one
/// snapshot, so concurrent updates never mix within a frame.
pub struct ArmorPipeline<M = DenseModel> {
    classifier: NumberClassifier<M>,
    depth: Option<DepthProcessor>,
    params: Arc<ParamStore>,
}

impl<M: NumberModel> ArmorPipeline<M> {
    pub fn new(classifier: NumberClassifier<M>, params: Arc<ParamStore>) -> Self {
        Self {
            classifier,
            depth: None,
            params,
        }
    }

    /// Builder form of [`set_camera_matrix`](Self::set_camera_matrix).
    pub fn with_camera_matrix(mut self, camera_matrix: &[f64; 9]) -> Result<Self, DepthError> {
        self.set_camera_matrix(camera_matrix)?;
        Ok(self)
    }

    /// Set the row-major 3x3 camera matrix of the depth-aligned camera.
    pub fn set_camera_matrix(&mut self, camera_matrix: &[f64; 9]) -> Result<(), DepthError> {
        self.depth = Some(DepthProcessor::new(camera_matrix)?);
        Ok(())
    }

    pub fn params(&self) -> &Arc<ParamStore> {
        &self.params
    }

    pub fn classifier(&self) -> &NumberClassifier<M> {
        &self.classifier
    }

    pub fn depth_processor(&self) -> Option<&DepthProcessor> {
        self.depth.as_ref()
    }

    /// Run every stage on one frame.
    ///
    /// With intrinsics set, every armor gets `distance_to_center`; with a
    /// depth image as well, every armor also gets a `position` outcome.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, frame, depth),
            fields(frame_id = %frame.header.frame_id, stamp_ns = frame.header.stamp_ns)
        )
    )]
    pub fn process(
        &self,
        frame: Frame<'_>,
        depth: Option<&DepthImageView<'_>>,
    ) -> Result<FrameOutput, PipelineError> {
        let start = Instant::now();
        let params = self.params.snapshot();

        if let Some(d) = depth {
            if self.depth.is_none() {
                return Err(PipelineError::IntrinsicsNotSet);
            }
            frame.image.same_size(d).map_err(PipelineError::DepthSize)?;
        }

        let detection = detect_lights_and_armors(&frame.image, &params.detector)?;
        let mut armors = detection.armors;
        if !armors.is_empty() {
            self.classifier.extract_numbers(&frame.image, &mut armors);
            self.classifier.classify(&mut armors)?;
            self.classifier.filter(&mut armors, &params.classifier);
        }

        if let Some(processor) = &self.depth {
            match depth {
                Some(d) => processor.locate(d, &mut armors),
                None => {
                    for armor in &mut armors {
                        armor.distance_to_center = Some(processor.distance_to_center(armor.center));
                    }
                }
            }
        }

        debug!(
            "frame {}: {} lights, {} armors",
            frame.header.frame_id,
            detection.lights.len(),
            armors.len()
        );

        let debug = params.debug.then(|| {
            let mut lights = detection.debug_lights;
            let mut pairs = detection.debug_armors;
            sort_debug_lights(&mut lights);
            sort_debug_armors(&mut pairs);
            let crops: Vec<GrayImage> = armors
                .iter()
                .filter_map(|a| a.number_image.clone())
                .collect();
            DebugArtifacts {
                binary: detection.binary,
                lights,
                armors: pairs,
                number_montage: GrayImage::vconcat(&crops),
                latency_ms: start.elapsed().as_secs_f64() * 1000.0,
            }
        });

        Ok(FrameOutput {
            header: frame.header.clone(),
            armors,
            debug,
        })
    }
}
