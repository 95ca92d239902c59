//! Color frame to binary light mask.

use armor_vision_core::{ColorImageView, GrayImage, LightColor};

use crate::params::{BinarizeMode, PreprocessParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Binarize a color frame into a 0/255 mask of the same size.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(frame, params),
        fields(width = frame.width(), height = frame.height())
    )
)]
pub fn preprocess(frame: &ColorImageView<'_>, params: &PreprocessParams) -> GrayImage {
    let (w, h) = (frame.width(), frame.height());
    let mut mask = GrayImage::new(w, h);
    let threshold = params.min_lightness as i32;

    for y in 0..h {
        let row = &mut mask.data[y * w..(y + 1) * w];
        for (x, out) in row.iter_mut().enumerate() {
            let level = match params.binarize {
                BinarizeMode::Brightness => frame.gray(x, y) as i32,
                BinarizeMode::ColorDifference => {
                    let [r, _, b] = frame.rgb(x, y);
                    let (target, opposing) = match params.detect_color {
                        LightColor::Red => (r, b),
                        LightColor::Blue => (b, r),
                    };
                    target as i32 - opposing as i32
                }
            };
            if level > threshold {
                *out = 255;
            }
        }
    }

    mask
}
