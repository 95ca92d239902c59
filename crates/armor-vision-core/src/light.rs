use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Target color of a light bar.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightColor {
    #[default]
    Red,
    Blue,
}

/// Invalid integer for a color selector.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unknown light color {0} (expected 0 = red, 1 = blue)")]
pub struct UnknownColor(pub i64);

impl LightColor {
    /// The other color.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }

    /// Integer code used by parameter servers (`0` red, `1` blue).
    pub fn code(self) -> i64 {
        match self {
            Self::Red => 0,
            Self::Blue => 1,
        }
    }
}

impl TryFrom<i64> for LightColor {
    type Error = UnknownColor;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Red),
            1 => Ok(Self::Blue),
            other => Err(UnknownColor(other)),
        }
    }
}

/// A light bar fitted with a rotated rectangle.
///
/// `top` and `bottom` are the midpoints of the short sides, with `top` having
/// the smaller image y. `length >= width` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub top: Point2<f32>,
    pub bottom: Point2<f32>,
    pub center: Point2<f32>,
    pub length: f32,
    pub width: f32,
    /// Degrees from vertical in `[-90, 90)`; positive when the top leans right.
    pub tilt_angle: f32,
    pub color: LightColor,
}

impl Light {
    /// Build a light from its axis endpoints and width.
    ///
    /// Endpoints may be given in any order; the width is clamped to the
    /// length so the shape invariant holds.
    pub fn from_axis(a: Point2<f32>, b: Point2<f32>, width: f32, color: LightColor) -> Self {
        let (top, bottom) = if (a.y, a.x) <= (b.y, b.x) {
            (a, b)
        } else {
            (b, a)
        };
        let length = (top - bottom).norm();
        let tilt_angle = (top.x - bottom.x).atan2(bottom.y - top.y).to_degrees();
        Self {
            top,
            bottom,
            center: nalgebra::center(&top, &bottom),
            length,
            width: width.min(length),
            tilt_angle,
            color,
        }
    }

    /// `width / length`, or `0` for a degenerate light.
    #[inline]
    pub fn ratio(&self) -> f32 {
        if self.length > 0.0 {
            self.width / self.length
        } else {
            0.0
        }
    }
}
