use armor_vision_core::{Armor, FrameHeader, GrayImage};
use armor_vision_detector::{DebugArmor, DebugLight};

/// Auxiliary per-frame data, produced only when `debug` is set.
#[derive(Clone, Debug)]
pub struct DebugArtifacts {
    /// Binary mask fed to light extraction.
    pub binary: GrayImage,
    /// Sorted by center x.
    pub lights: Vec<DebugLight>,
    /// Sorted by center x.
    pub armors: Vec<DebugArmor>,
    /// Number crops stacked vertically, `None` without armors.
    pub number_montage: Option<GrayImage>,
    pub latency_ms: f64,
}

/// Result of one frame.
#[derive(Clone, Debug)]
pub struct FrameOutput {
    pub header: FrameHeader,
    pub armors: Vec<Armor>,
    pub debug: Option<DebugArtifacts>,
}

impl FrameOutput {
    /// Armors closest to the principal point first.
    ///
    /// Armors without a distance keep their relative order after the others.
    pub fn prioritized(&self) -> Vec<&Armor> {
        let mut out: Vec<&Armor> = self.armors.iter().collect();
        out.sort_by(|a, b| match (a.distance_to_center, b.distance_to_center) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armor_vision_core::{ArmorSize, Light, LightColor};
    use nalgebra::Point2;

    fn armor_at(x: f32, distance: Option<f32>) -> Armor {
        let l = |x: f32| {
            Light::from_axis(
                Point2::new(x, 0.0),
                Point2::new(x, 20.0),
                4.0,
                LightColor::Red,
            )
        };
        let mut a = Armor::new(l(x), l(x + 40.0), ArmorSize::Small);
        a.distance_to_center = distance;
        a
    }

    #[test]
    fn prioritized_orders_by_distance_to_center() {
        let out = FrameOutput {
            header: FrameHeader::default(),
            armors: vec![
                armor_at(0.0, Some(30.0)),
                armor_at(100.0, None),
                armor_at(200.0, Some(5.0)),
                armor_at(300.0, Some(12.0)),
            ],
            debug: None,
        };
        let xs: Vec<f32> = out
            .prioritized()
            .iter()
            .map(|a| a.left_light.center.x)
            .collect();
        assert_eq!(xs, vec![200.0, 300.0, 0.0, 100.0]);
    }
}
