//! Bright-region extraction and light-bar fitting.

use armor_vision_core::{ColorImageView, GrayImageView, Light, LightColor};
use log::debug;
use nalgebra::{Point2, Vector2};

use crate::debug::DebugLight;
use crate::error::DetectError;
use crate::params::LightParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Regions smaller than this are noise, not lights.
const MIN_REGION_PIXELS: u32 = 5;

/// Lights found in one frame, in raster discovery order.
#[derive(Clone, Debug, Default)]
pub struct LightScan {
    pub lights: Vec<Light>,
    /// Every fitted region, including rejected ones.
    pub debug: Vec<DebugLight>,
}

/// Raw moments of one 8-connected region plus its red/blue channel sums.
#[derive(Clone, Copy, Debug, Default)]
struct RegionMoments {
    n: u32,
    sx: f64,
    sy: f64,
    sxx: f64,
    syy: f64,
    sxy: f64,
    sum_r: u64,
    sum_b: u64,
}

impl RegionMoments {
    fn push(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let (xf, yf) = (x as f64, y as f64);
        self.n += 1;
        self.sx += xf;
        self.sy += yf;
        self.sxx += xf * xf;
        self.syy += yf * yf;
        self.sxy += xf * yf;
        self.sum_r += rgb[0] as u64;
        self.sum_b += rgb[2] as u64;
    }

    fn color(&self) -> LightColor {
        if self.sum_r > self.sum_b {
            LightColor::Red
        } else {
            LightColor::Blue
        }
    }

    /// Rotated rectangle with the same second moments as the region.
    ///
    /// A solid `w x h` pixel bar has variance `(h^2 - 1) / 12` along its axis,
    /// so `sqrt(12 * var + 1)` recovers the side lengths exactly.
    fn fit(&self) -> Light {
        let n = self.n as f64;
        let (mx, my) = (self.sx / n, self.sy / n);
        let a = (self.sxx / n - mx * mx).max(0.0);
        let c = (self.syy / n - my * my).max(0.0);
        let b = self.sxy / n - mx * my;

        let half_trace = 0.5 * (a + c);
        let disc = (0.25 * (a - c) * (a - c) + b * b).sqrt();
        let l_major = half_trace + disc;
        let l_minor = (half_trace - disc).max(0.0);

        // Both forms are eigenvectors of l_major; take the well-conditioned one.
        let axis = if a >= c {
            Vector2::new(l_major - c, b)
        } else {
            Vector2::new(b, l_major - a)
        };
        let axis = if axis.norm() > 1e-9 {
            axis.normalize()
        } else {
            Vector2::new(0.0, 1.0)
        };

        let length = (12.0 * l_major + 1.0).sqrt();
        let width = (12.0 * l_minor + 1.0).sqrt();
        let center = Point2::new(mx, my);
        let half = axis * (0.5 * length);
        let p0 = (center + half).cast::<f32>();
        let p1 = (center - half).cast::<f32>();

        Light::from_axis(p0, p1, width as f32, self.color())
    }
}

/// Accumulate moments of every 8-connected foreground region of `mask`,
/// in the raster order of each region's first pixel.
fn scan_regions(frame: &ColorImageView<'_>, mask: &GrayImageView<'_>) -> Vec<RegionMoments> {
    let (w, h) = (mask.width, mask.height);
    let mut visited = vec![false; w * h];
    let mut stack = Vec::new();
    let mut regions = Vec::new();

    for start in 0..w * h {
        if visited[start] || mask.data[start] == 0 {
            continue;
        }
        visited[start] = true;
        stack.push(start);
        let mut m = RegionMoments::default();

        while let Some(idx) = stack.pop() {
            let (x, y) = (idx % w, idx / w);
            m.push(x, y, frame.rgb(x, y));

            for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                    let nidx = ny * w + nx;
                    if !visited[nidx] && mask.data[nidx] != 0 {
                        visited[nidx] = true;
                        stack.push(nidx);
                    }
                }
            }
        }
        regions.push(m);
    }

    regions
}

/// Shape gate: inclusive ratio band and absolute tilt bound.
pub fn is_light(light: &Light, params: &LightParams) -> bool {
    let ratio = light.ratio();
    let ratio_ok = params.min_ratio <= ratio && ratio <= params.max_ratio;
    let angle_ok = light.tilt_angle.abs() <= params.max_angle;
    ratio_ok && angle_ok
}

/// Extract light bars of `detect_color` from a binary mask.
///
/// `frame` supplies the color samples and must match the mask size.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(frame, mask, params),
        fields(width = mask.width, height = mask.height)
    )
)]
pub fn find_lights(
    frame: &ColorImageView<'_>,
    mask: &GrayImageView<'_>,
    params: &LightParams,
    detect_color: LightColor,
) -> Result<LightScan, DetectError> {
    mask.validate().map_err(DetectError::MaskBuffer)?;
    frame.same_size(mask).map_err(DetectError::MaskSize)?;

    let mut scan = LightScan::default();
    for region in scan_regions(frame, mask) {
        if region.n < MIN_REGION_PIXELS {
            continue;
        }
        let light = region.fit();
        let accepted = is_light(&light, params) && light.color == detect_color;
        scan.debug.push(DebugLight {
            center_x: light.center.x,
            ratio: light.ratio(),
            angle: light.tilt_angle,
            color: light.color,
            is_light: accepted,
        });
        if accepted {
            scan.lights.push(light);
        }
    }

    debug!(
        "found {} lights among {} regions",
        scan.lights.len(),
        scan.debug.len()
    );
    Ok(scan)
}
