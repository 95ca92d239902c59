use armor_vision_core::ImageError;

/// Errors returned by the detector stages.
///
/// Only malformed top-level inputs are errors; finding nothing is an empty
/// result.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("binary mask does not match the frame: {0}")]
    MaskSize(#[source] ImageError),

    #[error("malformed binary mask: {0}")]
    MaskBuffer(#[source] ImageError),
}
