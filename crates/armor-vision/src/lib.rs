//! High-level facade crate for the `armor-vision-*` workspace.
//!
//! This crate provides:
//! - re-exports of the stage crates,
//! - [`ArmorPipeline`], which runs preprocessing, light extraction, armor
//!   matching, number classification and depth localization on one frame,
//! - a shared, versioned [`ParamStore`] for runtime parameter updates,
//! - JSON config/report helpers and (feature `image`) file-based runners.
//!
//! ## Quickstart
//!
//! ```no_run
//! use std::sync::Arc;
//! use armor_vision::{ArmorPipeline, ParamStore, PipelineParams};
//! use armor_vision::classifier::NumberClassifier;
//! use armor_vision::core::{Frame, FrameHeader};
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(ParamStore::new(PipelineParams::default())?);
//! let classifier = NumberClassifier::from_files("model.json", "label.txt")?;
//! let pipeline = ArmorPipeline::new(classifier, store.clone());
//!
//! let img = ImageReader::open("frame.png")?.decode()?.to_rgb8();
//! let header = FrameHeader::default();
//! let frame = Frame { header: &header, image: armor_vision::detect::rgb_view(&img)? };
//! let out = pipeline.process(frame, None)?;
//! for armor in out.prioritized() {
//!     println!("{}", armor.classification_result());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `armor_vision::core`: images, lights, armors, homography, Otsu, logger.
//! - `armor_vision::detector`: preprocessing, light extraction, matching.
//! - `armor_vision::classifier`: number crops, models, labels, filtering.
//! - `armor_vision::depth`: intrinsics, depth images, back-projection.
//! - `armor_vision::detect` (feature `image`): `image`-crate adapters.

pub use armor_vision_classifier as classifier;
pub use armor_vision_core as core;
pub use armor_vision_depth as depth;
pub use armor_vision_detector as detector;

pub use armor_vision_core::{
    Armor, ArmorSize, DepthUnavailable, Frame, FrameHeader, Light, LightColor,
};

mod io;
mod output;
mod params;
mod pipeline;
mod store;

pub use io::{ArmorDetectConfig, ArmorDetectReport, ArmorIoError, ArmorRecord};
pub use output::{DebugArtifacts, FrameOutput};
pub use params::{ParamValue, PipelineParams, PARAM_NAMES};
pub use pipeline::{ArmorPipeline, PipelineError};
pub use store::ParamStore;

#[cfg(feature = "image")]
pub mod detect;
