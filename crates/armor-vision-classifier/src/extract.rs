//! Perspective crop of the number sticker between two lights.
//!
//! The light quad is mapped onto a canonical plate of height 28 where the
//! lights span rows 7..=19; the central 20x28 window is kept and binarized.

use armor_vision_core::{
    binarize_otsu, homography_from_4pt, warp_perspective_gray, Armor, ArmorSize, ColorImageView,
    GrayImage,
};
use nalgebra::Point2;

pub const NUMBER_WIDTH: usize = 20;
pub const NUMBER_HEIGHT: usize = 28;
/// Flattened crop length fed to the model.
pub const NUMBER_PIXELS: usize = NUMBER_WIDTH * NUMBER_HEIGHT;

const LIGHT_LENGTH: f32 = 12.0;
const TOP_LIGHT_Y: f32 = (NUMBER_HEIGHT as f32 - LIGHT_LENGTH) / 2.0 - 1.0;
const BOTTOM_LIGHT_Y: f32 = TOP_LIGHT_Y + LIGHT_LENGTH;
const SMALL_WARP_WIDTH: usize = 32;
const LARGE_WARP_WIDTH: usize = 54;

/// Width of the canonical plate for an armor size.
pub fn warp_width(size: ArmorSize) -> usize {
    match size {
        ArmorSize::Small => SMALL_WARP_WIDTH,
        ArmorSize::Large => LARGE_WARP_WIDTH,
    }
}

/// Binarized 20x28 crop of the number area, or `None` when the light quad is
/// degenerate.
pub fn extract_number(frame: &ColorImageView<'_>, armor: &Armor) -> Option<GrayImage> {
    let w = warp_width(armor.size);
    let right = (w - 1) as f32;
    let plate = [
        Point2::new(0.0, BOTTOM_LIGHT_Y),
        Point2::new(0.0, TOP_LIGHT_Y),
        Point2::new(right, TOP_LIGHT_Y),
        Point2::new(right, BOTTOM_LIGHT_Y),
    ];
    let h = homography_from_4pt(&plate, &armor.corners())?;

    let mut crop = warp_perspective_gray(
        frame,
        &h,
        (w - NUMBER_WIDTH) / 2,
        NUMBER_WIDTH,
        NUMBER_HEIGHT,
    );
    binarize_otsu(&mut crop);
    Some(crop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use armor_vision_core::{ColorImage, Light, LightColor};

    fn vertical_light(x: f32, top: f32, bottom: f32) -> Light {
        Light::from_axis(
            Point2::new(x, top),
            Point2::new(x, bottom),
            2.0,
            LightColor::Red,
        )
    }

    #[test]
    fn canonical_rows_match_plate_layout() {
        assert_eq!(TOP_LIGHT_Y, 7.0);
        assert_eq!(BOTTOM_LIGHT_Y, 19.0);
        assert_eq!(warp_width(ArmorSize::Small), 32);
        assert_eq!(warp_width(ArmorSize::Large), 54);
    }

    #[test]
    fn identity_placement_crops_the_central_window() {
        // Lights placed exactly where the plate expects them: the warp is the
        // identity and the crop is columns 6..26 of the frame.
        let mut img = ColorImage::new(32, 28);
        for y in 0..28 {
            for x in 14..18 {
                img.put_rgb(x, y, [255, 255, 255]);
            }
        }
        let armor = Armor::new(
            vertical_light(0.0, 7.0, 19.0),
            vertical_light(31.0, 7.0, 19.0),
            ArmorSize::Small,
        );
        let crop = extract_number(&img.view().unwrap(), &armor).unwrap();

        assert_eq!((crop.width, crop.height), (NUMBER_WIDTH, NUMBER_HEIGHT));
        assert!(crop.data.iter().all(|&v| v == 0 || v == 255));
        for y in 0..NUMBER_HEIGHT {
            for x in 0..NUMBER_WIDTH {
                let expected = if (8..12).contains(&x) { 255 } else { 0 };
                assert_eq!(crop.get(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn degenerate_quad_yields_none() {
        let img = ColorImage::new(16, 16);
        let l = vertical_light(5.0, 5.0, 5.0);
        let armor = Armor::new(l, l, ArmorSize::Small);
        assert!(extract_number(&img.view().unwrap(), &armor).is_none());
    }
}
