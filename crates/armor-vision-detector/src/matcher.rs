//! Pairing light bars into armor candidates.
//!
//! Every unordered pair is measured against [`ArmorParams`]. A light may end
//! up in at most one armor: geometrically valid pairs are ranked by tilt
//! difference (then scan order) and accepted greedily.

use armor_vision_core::{Armor, ArmorSize, Light};
use log::debug;

use crate::debug::DebugArmor;
use crate::params::ArmorParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Armor candidates of one frame, in pair scan order.
#[derive(Clone, Debug, Default)]
pub struct ArmorMatches {
    pub armors: Vec<Armor>,
    /// Every evaluated pair.
    pub debug: Vec<DebugArmor>,
}

/// Scale-free measurements of a light pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairGeometry {
    /// Shorter over longer light length.
    pub light_ratio: f32,
    /// Center distance over mean light length.
    pub center_distance: f32,
    /// Slope of the line joining the centers, degrees in `[0, 90]`.
    pub connection_angle: f32,
    /// Absolute tilt difference, degrees.
    pub tilt_difference: f32,
}

impl PairGeometry {
    pub fn measure(l1: &Light, l2: &Light) -> Self {
        let light_ratio = l1.length.min(l2.length) / l1.length.max(l2.length);
        let mean_length = 0.5 * (l1.length + l2.length);
        let diff = l1.center - l2.center;
        Self {
            light_ratio,
            center_distance: diff.norm() / mean_length,
            connection_angle: diff.y.abs().atan2(diff.x.abs()).to_degrees(),
            tilt_difference: (l1.tilt_angle - l2.tilt_angle).abs(),
        }
    }
}

/// Size class of a normalized center distance; both band edges inclusive,
/// the small band checked first.
pub fn classify_center_distance(distance: f32, params: &ArmorParams) -> Option<ArmorSize> {
    if (params.min_small_center_distance..=params.max_small_center_distance).contains(&distance) {
        Some(ArmorSize::Small)
    } else if (params.min_large_center_distance..=params.max_large_center_distance)
        .contains(&distance)
    {
        Some(ArmorSize::Large)
    } else {
        None
    }
}

/// Apply the per-pair rules; `None` rejects the pair.
pub fn classify_pair(geometry: &PairGeometry, params: &ArmorParams) -> Option<ArmorSize> {
    if geometry.light_ratio.is_nan() || geometry.light_ratio < params.min_light_ratio {
        return None;
    }
    if geometry.tilt_difference > params.max_angle
        || geometry.connection_angle > params.max_angle
    {
        return None;
    }
    classify_center_distance(geometry.center_distance, params)
}

/// True when a third light pokes into the box spanned by the pair.
fn contains_other_light(lights: &[Light], i: usize, j: usize) -> bool {
    let (a, b) = (&lights[i], &lights[j]);
    let pts = [a.top, a.bottom, b.top, b.bottom];
    let min_x = pts.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
    let max_x = pts.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
    let min_y = pts.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    let max_y = pts.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);

    lights
        .iter()
        .enumerate()
        .filter(|&(k, _)| k != i && k != j)
        .any(|(_, l)| {
            [l.top, l.bottom, l.center]
                .iter()
                .any(|p| p.x >= min_x && p.x <= max_x && p.y >= min_y && p.y <= max_y)
        })
}

struct Candidate {
    i: usize,
    j: usize,
    size: ArmorSize,
    tilt_difference: f32,
}

/// Pair lights into armors.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(lights, params), fields(lights = lights.len()))
)]
pub fn match_lights(lights: &[Light], params: &ArmorParams) -> ArmorMatches {
    let mut out = ArmorMatches::default();
    let mut candidates = Vec::new();

    for i in 0..lights.len() {
        for j in i + 1..lights.len() {
            let (l1, l2) = (&lights[i], &lights[j]);
            if l1.color != l2.color {
                continue;
            }
            let geometry = PairGeometry::measure(l1, l2);
            // Stacked lights have no left/right order.
            let size = classify_pair(&geometry, params)
                .filter(|_| l1.center.x != l2.center.x)
                .filter(|_| !contains_other_light(lights, i, j));

            out.debug.push(DebugArmor {
                center_x: 0.5 * (l1.center.x + l2.center.x),
                light_ratio: geometry.light_ratio,
                center_distance: geometry.center_distance,
                angle: geometry.connection_angle,
                size,
            });

            if let Some(size) = size {
                candidates.push(Candidate {
                    i,
                    j,
                    size,
                    tilt_difference: geometry.tilt_difference,
                });
            }
        }
    }

    // Best fit first; equal scores keep scan order.
    let mut ranked: Vec<&Candidate> = candidates.iter().collect();
    ranked.sort_by(|a, b| {
        a.tilt_difference
            .total_cmp(&b.tilt_difference)
            .then((a.i, a.j).cmp(&(b.i, b.j)))
    });

    let mut used = vec![false; lights.len()];
    let mut accepted = Vec::new();
    for c in ranked {
        if used[c.i] || used[c.j] {
            continue;
        }
        used[c.i] = true;
        used[c.j] = true;
        accepted.push(c);
    }
    accepted.sort_by_key(|c| (c.i, c.j));

    out.armors = accepted
        .into_iter()
        .map(|c| Armor::new(lights[c.i], lights[c.j], c.size))
        .collect();

    debug!(
        "matched {} armors from {} valid pairs",
        out.armors.len(),
        candidates.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use armor_vision_core::LightColor;
    use nalgebra::Point2;

    fn bar(x: f32, y: f32, length: f32, tilt_deg: f32) -> Light {
        let half = 0.5 * length;
        let (s, c) = tilt_deg.to_radians().sin_cos();
        let top = Point2::new(x + half * s, y - half * c);
        let bottom = Point2::new(x - half * s, y + half * c);
        Light::from_axis(top, bottom, 0.2 * length, LightColor::Red)
    }

    #[test]
    fn measures_scale_free_distance() {
        let g = PairGeometry::measure(&bar(0.0, 0.0, 20.0, 0.0), &bar(40.0, 0.0, 20.0, 0.0));
        assert_relative_eq!(g.center_distance, 2.0);
        assert_relative_eq!(g.light_ratio, 1.0);
        assert_relative_eq!(g.connection_angle, 0.0);
    }

    #[test]
    fn center_distance_bands_are_inclusive() {
        let p = ArmorParams::default();
        let small = Some(ArmorSize::Small);
        let large = Some(ArmorSize::Large);
        assert_eq!(classify_center_distance(p.min_small_center_distance, &p), small);
        assert_eq!(classify_center_distance(p.max_small_center_distance, &p), small);
        assert_eq!(classify_center_distance(p.min_large_center_distance, &p), large);
        assert_eq!(classify_center_distance(p.max_large_center_distance, &p), large);
        assert_eq!(classify_center_distance(3.0, &p), None);
        assert_eq!(classify_center_distance(0.5, &p), None);
        assert_eq!(classify_center_distance(4.5, &p), None);
    }

    #[test]
    fn exact_separations_hit_band_edges() {
        let p = ArmorParams::default();
        // Lengths are 20, so a separation of 56 px is exactly 2.8.
        let m = match_lights(&[bar(0.0, 50.0, 20.0, 0.0), bar(56.0, 50.0, 20.0, 0.0)], &p);
        assert_eq!(m.armors.len(), 1);
        assert_eq!(m.armors[0].size, ArmorSize::Small);

        let m = match_lights(&[bar(0.0, 50.0, 20.0, 0.0), bar(86.0, 50.0, 20.0, 0.0)], &p);
        assert_eq!(m.armors[0].size, ArmorSize::Large);

        let m = match_lights(&[bar(0.0, 50.0, 20.0, 0.0), bar(60.0, 50.0, 20.0, 0.0)], &p);
        assert!(m.armors.is_empty());
        assert_eq!(m.debug.len(), 1);
        assert_eq!(m.debug[0].size, None);
    }

    #[test]
    fn mismatched_lengths_and_tilts_are_rejected() {
        let p = ArmorParams::default();
        let short = match_lights(&[bar(0.0, 50.0, 20.0, 0.0), bar(40.0, 50.0, 10.0, 0.0)], &p);
        assert!(short.armors.is_empty());

        let splayed = match_lights(
            &[bar(0.0, 50.0, 20.0, -20.0), bar(40.0, 50.0, 20.0, 20.0)],
            &p,
        );
        assert!(splayed.armors.is_empty());

        let parallel = match_lights(
            &[bar(0.0, 50.0, 20.0, 20.0), bar(40.0, 50.0, 20.0, 20.0)],
            &p,
        );
        assert_eq!(parallel.armors.len(), 1);
    }

    #[test]
    fn steep_connection_is_rejected() {
        let p = ArmorParams::default();
        let m = match_lights(&[bar(0.0, 0.0, 20.0, 0.0), bar(25.0, 30.0, 20.0, 0.0)], &p);
        assert!(m.armors.is_empty());
        assert!(m.debug[0].angle > p.max_angle);
    }

    #[test]
    fn left_and_right_follow_x() {
        let p = ArmorParams::default();
        let m = match_lights(&[bar(100.0, 50.0, 20.0, 0.0), bar(60.0, 50.0, 20.0, 0.0)], &p);
        let a = &m.armors[0];
        assert!(a.left_light.center.x < a.right_light.center.x);
        assert_relative_eq!(a.left_light.center.x, 60.0);
    }

    #[test]
    fn stacked_lights_never_pair() {
        let p = ArmorParams {
            max_angle: 90.0,
            ..ArmorParams::default()
        };
        let m = match_lights(&[bar(50.0, 50.0, 20.0, 0.0), bar(50.0, 90.0, 20.0, 0.0)], &p);
        assert!(m.armors.is_empty());
        assert_eq!(m.debug.len(), 1);
        assert!(m.debug[0].size.is_none());
    }

    #[test]
    fn enclosed_light_blocks_pair() {
        let p = ArmorParams::default();
        let lights = [
            bar(0.0, 50.0, 20.0, 0.0),
            bar(20.0, 50.0, 20.0, 0.0),
            bar(40.0, 50.0, 20.0, 0.0),
        ];
        let m = match_lights(&lights, &p);
        // (0, 2) encloses light 1; (0, 1) and (1, 2) compete for light 1.
        assert_eq!(m.armors.len(), 1);
        assert_eq!(m.debug.len(), 3);
        assert_eq!(m.debug.iter().filter(|d| d.size.is_some()).count(), 2);
        assert_relative_eq!(m.armors[0].left_light.center.x, 0.0);
    }

    #[test]
    fn no_light_is_used_twice() {
        let p = ArmorParams::default();
        let lights = [
            bar(0.0, 50.0, 20.0, 2.0),
            bar(40.0, 50.0, 20.0, 0.0),
            bar(80.0, 50.0, 20.0, 0.5),
            bar(120.0, 50.0, 20.0, 5.0),
        ];
        let m = match_lights(&lights, &p);
        let mut xs: Vec<i32> = m
            .armors
            .iter()
            .flat_map(|a| [a.left_light.center.x as i32, a.right_light.center.x as i32])
            .collect();
        let n = xs.len();
        xs.sort_unstable();
        xs.dedup();
        assert_eq!(xs.len(), n);
        // (1, 2) has the smallest tilt difference and wins light 1 and 2.
        assert_eq!(m.armors.len(), 1);
        assert_relative_eq!(m.armors[0].left_light.center.x, 40.0);
    }

    #[test]
    fn equal_scores_fall_back_to_scan_order() {
        let p = ArmorParams::default();
        let lights = [
            bar(0.0, 50.0, 20.0, 0.0),
            bar(40.0, 50.0, 20.0, 0.0),
            bar(80.0, 50.0, 20.0, 0.0),
            bar(120.0, 50.0, 20.0, 0.0),
        ];
        let m = match_lights(&lights, &p);
        assert_eq!(m.armors.len(), 2);
        assert_relative_eq!(m.armors[0].left_light.center.x, 0.0);
        assert_relative_eq!(m.armors[1].left_light.center.x, 80.0);
    }
}
