use armor_vision_core::ImageError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DepthError {
    #[error("invalid camera intrinsic {name} = {value}")]
    InvalidIntrinsics { name: &'static str, value: f64 },
    #[error(transparent)]
    Image(#[from] ImageError),
}
