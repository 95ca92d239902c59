use armor_vision::core::ColorImage;

/// Bright, red-dominant light bar color.
pub const RED_BAR: [u8; 3] = [255, 200, 200];
/// Bright, blue-dominant light bar color.
pub const BLUE_BAR: [u8; 3] = [200, 220, 255];

pub const BAR_WIDTH: usize = 6;
pub const BAR_HEIGHT: usize = 40;
pub const BAR_TOP: usize = 100;

/// Fill an axis-aligned rectangle.
pub fn paint_rect(img: &mut ColorImage, x0: usize, y0: usize, w: usize, h: usize, rgb: [u8; 3]) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            img.put_rgb(x, y, rgb);
        }
    }
}

/// 320x240 black frame with two vertical bars whose left edges are at
/// `left_x` and `right_x`.
///
/// Bars are `BAR_WIDTH x BAR_HEIGHT`, so the normalized center distance is
/// `(right_x - left_x) / BAR_HEIGHT`.
pub fn two_bar_frame(left_x: usize, right_x: usize, rgb: [u8; 3]) -> ColorImage {
    let mut img = ColorImage::new(320, 240);
    paint_rect(&mut img, left_x, BAR_TOP, BAR_WIDTH, BAR_HEIGHT, rgb);
    paint_rect(&mut img, right_x, BAR_TOP, BAR_WIDTH, BAR_HEIGHT, rgb);
    img
}
