use serde::{Deserialize, Serialize};

/// Errors raised when an image buffer does not match its declared layout.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("invalid image buffer length (expected {expected} bytes, got {got})")]
    InvalidBufferLength { expected: usize, got: usize },

    #[error("unsupported pixel encoding `{0}` (expected rgb8 or bgr8)")]
    UnsupportedEncoding(String),

    #[error("image size mismatch ({width}x{height} vs {other_width}x{other_height})")]
    SizeMismatch {
        width: usize,
        height: usize,
        other_width: usize,
        other_height: usize,
    },
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    /// All-zero image.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        check_buffer(width, height, 1, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Stack images of equal width top to bottom.
    ///
    /// Returns `None` for an empty input or mismatched widths.
    pub fn vconcat(images: &[GrayImage]) -> Option<GrayImage> {
        let width = images.first()?.width;
        if images.iter().any(|img| img.width != width) {
            return None;
        }
        let height = images.iter().map(|img| img.height).sum();
        let mut data = Vec::with_capacity(width * height);
        for img in images {
            data.extend_from_slice(&img.data);
        }
        Some(GrayImage {
            width,
            height,
            data,
        })
    }
}

/// Channel order of a 3-channel, 8-bit color frame.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorEncoding {
    #[default]
    Rgb8,
    Bgr8,
}

impl ColorEncoding {
    /// Parse a ROS-style encoding name (`rgb8`, `bgr8`).
    pub fn parse(name: &str) -> Result<Self, ImageError> {
        match name {
            "rgb8" => Ok(Self::Rgb8),
            "bgr8" => Ok(Self::Bgr8),
            other => Err(ImageError::UnsupportedEncoding(other.to_owned())),
        }
    }

    #[inline]
    fn red_offset(self) -> usize {
        match self {
            Self::Rgb8 => 0,
            Self::Bgr8 => 2,
        }
    }

    #[inline]
    fn blue_offset(self) -> usize {
        2 - self.red_offset()
    }
}

/// Borrowed 3-channel color frame. Construction validates the buffer length,
/// so every accessor can index without further checks.
#[derive(Clone, Copy, Debug)]
pub struct ColorImageView<'a> {
    width: usize,
    height: usize,
    encoding: ColorEncoding,
    data: &'a [u8],
}

impl<'a> ColorImageView<'a> {
    pub fn new(
        width: usize,
        height: usize,
        encoding: ColorEncoding,
        data: &'a [u8],
    ) -> Result<Self, ImageError> {
        check_buffer(width, height, 3, data.len())?;
        Ok(Self {
            width,
            height,
            encoding,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn encoding(&self) -> ColorEncoding {
        self.encoding
    }

    /// Pixel as `[r, g, b]` regardless of the storage order.
    #[inline]
    pub fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        let px = &self.data[i..i + 3];
        [
            px[self.encoding.red_offset()],
            px[1],
            px[self.encoding.blue_offset()],
        ]
    }

    /// Luma as computed by the usual RGB->gray conversion (BT.601 weights).
    #[inline]
    pub fn gray(&self, x: usize, y: usize) -> u8 {
        let [r, g, b] = self.rgb(x, y);
        rgb_to_gray(r, g, b)
    }

    pub fn same_size<T>(&self, other: &T) -> Result<(), ImageError>
    where
        T: HasSize,
    {
        let (w, h) = other.size();
        if w != self.width || h != self.height {
            return Err(ImageError::SizeMismatch {
                width: self.width,
                height: self.height,
                other_width: w,
                other_height: h,
            });
        }
        Ok(())
    }
}

/// Anything with pixel dimensions.
pub trait HasSize {
    fn size(&self) -> (usize, usize);
}

impl HasSize for GrayImage {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

impl<'a> GrayImageView<'a> {
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self, ImageError> {
        check_buffer(width, height, 1, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Re-check a view built from its public fields.
    pub fn validate(&self) -> Result<(), ImageError> {
        check_buffer(self.width, self.height, 1, self.data.len())
    }
}

impl HasSize for GrayImageView<'_> {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

impl HasSize for ColorImageView<'_> {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

/// Owned color frame, mostly for tests and file adapters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorImage {
    pub width: usize,
    pub height: usize,
    pub encoding: ColorEncoding,
    pub data: Vec<u8>,
}

impl ColorImage {
    /// Black RGB frame.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            encoding: ColorEncoding::Rgb8,
            data: vec![0; width * height * 3],
        }
    }

    pub fn put_rgb(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let i = (y * self.width + x) * 3;
        let (r, b) = (self.encoding.red_offset(), self.encoding.blue_offset());
        self.data[i + r] = rgb[0];
        self.data[i + 1] = rgb[1];
        self.data[i + b] = rgb[2];
    }

    pub fn view(&self) -> Result<ColorImageView<'_>, ImageError> {
        ColorImageView::new(self.width, self.height, self.encoding, &self.data)
    }
}

/// Per-frame metadata carried through the pipeline untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameHeader {
    /// Capture time in nanoseconds.
    pub stamp_ns: u64,
    pub frame_id: String,
}

/// A color frame plus its header.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub header: &'a FrameHeader,
    pub image: ColorImageView<'a>,
}

#[inline]
pub fn rgb_to_gray(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8
}

fn check_buffer(
    width: usize,
    height: usize,
    channels: usize,
    got: usize,
) -> Result<(), ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidDimensions { width, height });
    }
    let expected = width * height * channels;
    if got != expected {
        return Err(ImageError::InvalidBufferLength { expected, got });
    }
    Ok(())
}

#[inline]
fn get_rgb(src: &ColorImageView<'_>, x: i32, y: i32) -> [f32; 3] {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return [0.0; 3];
    }
    let [r, g, b] = src.rgb(x as usize, y as usize);
    [r as f32, g as f32, b as f32]
}

/// Bilinear gray sample of a color frame; outside pixels read as black.
#[inline]
pub fn sample_gray_bilinear(src: &ColorImageView<'_>, x: f32, y: f32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_rgb(src, x0, y0);
    let p10 = get_rgb(src, x0 + 1, y0);
    let p01 = get_rgb(src, x0, y0 + 1);
    let p11 = get_rgb(src, x0 + 1, y0 + 1);

    let mut rgb = [0.0f32; 3];
    for c in 0..3 {
        let a = p00[c] + fx * (p10[c] - p00[c]);
        let b = p01[c] + fx * (p11[c] - p01[c]);
        rgb[c] = a + fy * (b - a);
    }
    0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_view_checks_buffer_length() {
        let data = [255u8; 10];
        assert_eq!(
            GrayImageView::new(8, 8, &data).unwrap_err(),
            ImageError::InvalidBufferLength {
                expected: 64,
                got: 10
            }
        );
        let raw = GrayImageView {
            width: 2,
            height: 5,
            data: &data,
        };
        assert!(raw.validate().is_ok());
    }

    #[test]
    fn rejects_short_buffer() {
        let data = vec![0u8; 10];
        let err = ColorImageView::new(2, 2, ColorEncoding::Rgb8, &data).unwrap_err();
        assert_eq!(
            err,
            ImageError::InvalidBufferLength {
                expected: 12,
                got: 10
            }
        );
    }

    #[test]
    fn rejects_unknown_encoding() {
        assert!(matches!(
            ColorEncoding::parse("mono8"),
            Err(ImageError::UnsupportedEncoding(_))
        ));
        assert_eq!(ColorEncoding::parse("bgr8").unwrap(), ColorEncoding::Bgr8);
    }

    #[test]
    fn bgr_view_reports_rgb_order() {
        let data = [10u8, 20, 30];
        let view = ColorImageView::new(1, 1, ColorEncoding::Bgr8, &data).unwrap();
        assert_eq!(view.rgb(0, 0), [30, 20, 10]);
    }

    #[test]
    fn gray_of_white_is_white() {
        assert_eq!(rgb_to_gray(255, 255, 255), 255);
        assert_eq!(rgb_to_gray(255, 0, 0), 76);
    }

    #[test]
    fn vconcat_stacks_rows() {
        let a = GrayImage::from_raw(2, 1, vec![1, 2]).unwrap();
        let b = GrayImage::from_raw(2, 2, vec![3, 4, 5, 6]).unwrap();
        let out = GrayImage::vconcat(&[a, b]).unwrap();
        assert_eq!(out.height, 3);
        assert_eq!(out.data, vec![1, 2, 3, 4, 5, 6]);
        assert!(GrayImage::vconcat(&[]).is_none());
    }
}
