use serde::{Deserialize, Serialize};

use crate::error::DepthError;

/// Pinhole intrinsics of the depth-aligned camera, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

impl CameraIntrinsics {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Result<Self, DepthError> {
        for (name, value) in [("fx", fx), ("fy", fy)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DepthError::InvalidIntrinsics { name, value });
            }
        }
        for (name, value) in [("cx", cx), ("cy", cy)] {
            if !value.is_finite() {
                return Err(DepthError::InvalidIntrinsics { name, value });
            }
        }
        Ok(Self { fx, fy, cx, cy })
    }

    /// Read a row-major 3x3 camera matrix `[fx 0 cx; 0 fy cy; 0 0 1]`.
    pub fn from_matrix(k: &[f64; 9]) -> Result<Self, DepthError> {
        Self::new(k[0], k[4], k[2], k[5])
    }

    pub fn to_matrix(&self) -> [f64; 9] {
        [
            self.fx, 0.0, self.cx, //
            0.0, self.fy, self.cy, //
            0.0, 0.0, 1.0,
        ]
    }
}
