use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

use crate::{GrayImage, Light};

/// Physical armor plate class.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmorSize {
    Small,
    Large,
}

/// Why no 3D position could be produced for an image point.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DepthUnavailable {
    /// Zero, negative or non-finite depth sample.
    #[error("no depth reading at pixel ({u}, {v})")]
    NoReading { u: i64, v: i64 },
    #[error("pixel ({u}, {v}) lies outside the depth image")]
    OutOfBounds { u: i64, v: i64 },
}

/// Two paired lights and everything later stages attach to them.
#[derive(Clone, Debug)]
pub struct Armor {
    pub left_light: Light,
    pub right_light: Light,
    pub center: Point2<f32>,
    pub size: ArmorSize,
    /// Binarized number crop, filled by the classifier.
    pub number_image: Option<GrayImage>,
    pub label: Option<String>,
    pub confidence: f32,
    /// `None` until a depth lookup was requested.
    pub position: Option<Result<Point3<f64>, DepthUnavailable>>,
    /// Pixel distance from the principal point.
    pub distance_to_center: Option<f32>,
}

impl Armor {
    /// Pair two lights; left/right are assigned by center x.
    pub fn new(l1: Light, l2: Light, size: ArmorSize) -> Self {
        let (left_light, right_light) = if l1.center.x < l2.center.x {
            (l1, l2)
        } else {
            (l2, l1)
        };
        Self {
            center: nalgebra::center(&left_light.center, &right_light.center),
            left_light,
            right_light,
            size,
            number_image: None,
            label: None,
            confidence: 0.0,
            position: None,
            distance_to_center: None,
        }
    }

    /// Quad corners in image order: left bottom, left top, right top, right bottom.
    pub fn corners(&self) -> [Point2<f32>; 4] {
        [
            self.left_light.bottom,
            self.left_light.top,
            self.right_light.top,
            self.right_light.bottom,
        ]
    }

    /// Human readable `"label: 93.5%"`, empty before classification.
    pub fn classification_result(&self) -> String {
        match &self.label {
            Some(label) => format!("{label}: {:.1}%", self.confidence * 100.0),
            None => String::new(),
        }
    }

    /// Successfully located camera-frame position.
    pub fn located(&self) -> Option<Point3<f64>> {
        self.position.and_then(Result::ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LightColor;

    fn bar(x: f32) -> Light {
        Light::from_axis(
            Point2::new(x, 10.0),
            Point2::new(x, 30.0),
            4.0,
            LightColor::Red,
        )
    }

    #[test]
    fn left_right_follow_x_order() {
        let armor = Armor::new(bar(80.0), bar(20.0), ArmorSize::Small);
        assert_eq!(armor.left_light.center.x, 20.0);
        assert_eq!(armor.right_light.center.x, 80.0);
        assert_eq!(armor.center, Point2::new(50.0, 20.0));
        assert!(armor.classification_result().is_empty());
    }

    #[test]
    fn classification_result_formats_percent() {
        let mut armor = Armor::new(bar(0.0), bar(30.0), ArmorSize::Large);
        armor.label = Some("3".into());
        armor.confidence = 0.875;
        assert_eq!(armor.classification_result(), "3: 87.5%");
    }

    #[test]
    fn located_hides_unavailable_positions() {
        let mut armor = Armor::new(bar(0.0), bar(30.0), ArmorSize::Small);
        assert!(armor.located().is_none());
        armor.position = Some(Err(DepthUnavailable::NoReading { u: 1, v: 2 }));
        assert!(armor.located().is_none());
        armor.position = Some(Ok(Point3::new(0.1, 0.2, 1.5)));
        assert_eq!(armor.located(), Some(Point3::new(0.1, 0.2, 1.5)));
    }
}
