//! End-to-end helpers built on the `image` crate.

use std::path::Path;
use std::sync::Arc;

use ::image::{ImageBuffer, ImageReader, Luma, RgbImage};
use armor_vision_classifier::{ClassifierError, NumberClassifier};
use armor_vision_core::{
    ColorEncoding, ColorImageView, Frame, FrameHeader, ImageError, ParamError,
};
use armor_vision_depth::{DepthError, DepthImage};
use log::info;

use crate::io::{ArmorDetectConfig, ArmorDetectReport, ArmorIoError};
use crate::output::FrameOutput;
use crate::pipeline::{ArmorPipeline, PipelineError};
use crate::store::ParamStore;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the file-based helpers.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    File(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] ::image::ImageError),
    #[error(transparent)]
    Buffer(#[from] ImageError),
    #[error(transparent)]
    Io(#[from] ArmorIoError),
    #[error(transparent)]
    Params(#[from] ParamError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error(transparent)]
    Depth(#[from] DepthError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("depth image given but the config has no camera_matrix")]
    MissingCameraMatrix,
}

/// Borrow an `image::RgbImage` as a color view.
pub fn rgb_view(img: &RgbImage) -> Result<ColorImageView<'_>, ImageError> {
    ColorImageView::new(
        img.width() as usize,
        img.height() as usize,
        ColorEncoding::Rgb8,
        img.as_raw(),
    )
}

/// Convert a 16-bit millimeter depth image to meters.
pub fn depth_from_luma16(
    img: &ImageBuffer<Luma<u16>, Vec<u16>>,
) -> Result<DepthImage, ImageError> {
    DepthImage::from_millimeters(img.width() as usize, img.height() as usize, img.as_raw())
}

pub fn load_rgb(path: impl AsRef<Path>) -> Result<RgbImage, RunError> {
    Ok(ImageReader::open(path)?.decode()?.to_rgb8())
}

pub fn load_depth(path: impl AsRef<Path>) -> Result<DepthImage, RunError> {
    let img = ImageReader::open(path)?.decode()?.to_luma16();
    Ok(depth_from_luma16(&img)?)
}

/// Save a gray debug image as PNG (or any format implied by the extension).
pub fn save_gray(
    img: &armor_vision_core::GrayImage,
    path: impl AsRef<Path>,
) -> Result<(), RunError> {
    let buf = ::image::GrayImage::from_raw(img.width as u32, img.height as u32, img.data.clone())
        .ok_or(ImageError::InvalidBufferLength {
            expected: img.width * img.height,
            got: img.data.len(),
        })?;
    buf.save(path)?;
    Ok(())
}

/// Run the full pipeline as described by a config and return its output.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(cfg), fields(image = %cfg.image_path))
)]
pub fn run_config(cfg: &ArmorDetectConfig) -> Result<FrameOutput, RunError> {
    let store = Arc::new(ParamStore::new(cfg.params.clone())?);
    let classifier = NumberClassifier::from_files(&cfg.model_path, &cfg.label_path)?;
    let mut pipeline = ArmorPipeline::new(classifier, store);
    if let Some(k) = &cfg.camera_matrix {
        pipeline.set_camera_matrix(k)?;
    }

    let rgb = load_rgb(&cfg.image_path)?;
    let depth = match &cfg.depth_path {
        Some(p) => {
            if cfg.camera_matrix.is_none() {
                return Err(RunError::MissingCameraMatrix);
            }
            Some(load_depth(p)?)
        }
        None => None,
    };
    let depth_view = depth.as_ref().map(DepthImage::view);

    let header = FrameHeader {
        stamp_ns: 0,
        frame_id: cfg.image_path.clone(),
    };
    let frame = Frame {
        header: &header,
        image: rgb_view(&rgb)?,
    };
    let output = pipeline.process(frame, depth_view.as_ref())?;
    info!(
        "{}: {} armors ({})",
        cfg.image_path,
        output.armors.len(),
        output
            .armors
            .iter()
            .map(|a| a.classification_result())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(output)
}

/// Run a config, write its report and, in debug mode, its debug images.
pub fn run_and_report(cfg: &ArmorDetectConfig) -> Result<ArmorDetectReport, RunError> {
    let output = run_config(cfg)?;
    let report = ArmorDetectReport::from_output(cfg.image_path.clone(), &output);
    report.write_json(cfg.output_path())?;

    if let (Some(dir), Some(debug)) = (&cfg.debug_dir, &output.debug) {
        let dir = Path::new(dir);
        std::fs::create_dir_all(dir)?;
        save_gray(&debug.binary, dir.join("binary.png"))?;
        if let Some(montage) = &debug.number_montage {
            save_gray(montage, dir.join("numbers.png"))?;
        }
    }
    Ok(report)
}
