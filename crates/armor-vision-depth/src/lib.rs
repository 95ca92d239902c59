//! 3D localization of armor centers from an aligned depth map.
//!
//! Given intrinsics `K = [fx 0 cx; 0 fy cy; 0 0 1]` and depth `d` at pixel
//! `(u, v)`, the camera-frame point is
//!
//! ```text
//! x = (u - cx) d / fx,   y = (v - cy) d / fy,   z = d
//! ```
//!
//! Missing or invalid depth samples are reported as
//! [`DepthUnavailable`](armor_vision_core::DepthUnavailable), never as the
//! origin.

mod error;
mod image;
mod intrinsics;
mod processor;

pub use error::DepthError;
pub use image::{DepthImage, DepthImageView};
pub use intrinsics::CameraIntrinsics;
pub use processor::DepthProcessor;
