use armor_vision_core::{Armor, DepthUnavailable};
use log::debug;
use nalgebra::{Point2, Point3};

use crate::error::DepthError;
use crate::image::DepthImageView;
use crate::intrinsics::CameraIntrinsics;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Back-projects image points through an aligned depth map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthProcessor {
    intrinsics: CameraIntrinsics,
}

impl DepthProcessor {
    /// Build from a row-major 3x3 camera matrix.
    pub fn new(camera_matrix: &[f64; 9]) -> Result<Self, DepthError> {
        Ok(Self::from_intrinsics(CameraIntrinsics::from_matrix(
            camera_matrix,
        )?))
    }

    pub fn from_intrinsics(intrinsics: CameraIntrinsics) -> Self {
        Self { intrinsics }
    }

    pub fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    /// Camera-frame position of `point`, in the depth map's unit.
    ///
    /// Depth is read at the nearest pixel; the back-projection itself uses the
    /// unrounded point.
    pub fn get_position(
        &self,
        depth: &DepthImageView<'_>,
        point: Point2<f32>,
    ) -> Result<Point3<f64>, DepthUnavailable> {
        let u = point.x.round() as i64;
        let v = point.y.round() as i64;
        if !point.x.is_finite() || !point.y.is_finite() {
            return Err(DepthUnavailable::OutOfBounds { u, v });
        }
        let d = depth
            .get(u, v)
            .ok_or(DepthUnavailable::OutOfBounds { u, v })?;
        if !d.is_finite() || d <= 0.0 {
            return Err(DepthUnavailable::NoReading { u, v });
        }

        let k = &self.intrinsics;
        let z = d as f64;
        Ok(Point3::new(
            (point.x as f64 - k.cx) * z / k.fx,
            (point.y as f64 - k.cy) * z / k.fy,
            z,
        ))
    }

    /// Pixel distance from `point` to the principal point.
    pub fn distance_to_center(&self, point: Point2<f32>) -> f32 {
        let dx = point.x as f64 - self.intrinsics.cx;
        let dy = point.y as f64 - self.intrinsics.cy;
        dx.hypot(dy) as f32
    }

    /// Fill `position` and `distance_to_center` of every armor.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, depth, armors), fields(armors = armors.len()))
    )]
    pub fn locate(&self, depth: &DepthImageView<'_>, armors: &mut [Armor]) {
        for armor in armors.iter_mut() {
            armor.position = Some(self.get_position(depth, armor.center));
            armor.distance_to_center = Some(self.distance_to_center(armor.center));
        }
        debug!(
            "located {} of {} armors",
            armors.iter().filter(|a| a.located().is_some()).count(),
            armors.len()
        );
    }
}
