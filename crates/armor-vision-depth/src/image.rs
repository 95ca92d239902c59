use armor_vision_core::{HasSize, ImageError};

/// Borrowed depth map in meters, row-major.
#[derive(Clone, Copy, Debug)]
pub struct DepthImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [f32],
}

impl<'a> DepthImageView<'a> {
    pub fn new(width: usize, height: usize, data: &'a [f32]) -> Result<Self, ImageError> {
        check_len(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Sample at integer pixel `(u, v)`, `None` outside the image.
    #[inline]
    pub fn get(&self, u: i64, v: i64) -> Option<f32> {
        if u < 0 || v < 0 || u as usize >= self.width || v as usize >= self.height {
            return None;
        }
        self.data.get(v as usize * self.width + u as usize).copied()
    }
}

impl HasSize for DepthImageView<'_> {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

/// Owned depth map in meters.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl DepthImage {
    pub fn from_meters(width: usize, height: usize, data: Vec<f32>) -> Result<Self, ImageError> {
        check_len(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Convert a 16-bit millimeter depth buffer; `0` stays "no reading".
    pub fn from_millimeters(width: usize, height: usize, mm: &[u16]) -> Result<Self, ImageError> {
        check_len(width, height, mm.len())?;
        Ok(Self {
            width,
            height,
            data: mm.iter().map(|&d| d as f32 / 1000.0).collect(),
        })
    }

    pub fn view(&self) -> DepthImageView<'_> {
        DepthImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

fn check_len(width: usize, height: usize, got: usize) -> Result<(), ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidDimensions { width, height });
    }
    let expected = width * height;
    if got != expected {
        return Err(ImageError::InvalidBufferLength { expected, got });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn millimeters_become_meters() {
        let img = DepthImage::from_millimeters(2, 1, &[1500, 0]).unwrap();
        assert_relative_eq!(img.data[0], 1.5);
        assert_eq!(img.data[1], 0.0);
    }

    #[test]
    fn buffer_length_is_checked() {
        assert_eq!(
            DepthImage::from_millimeters(2, 2, &[1, 2, 3]),
            Err(ImageError::InvalidBufferLength {
                expected: 4,
                got: 3
            })
        );
        assert!(DepthImageView::new(0, 3, &[]).is_err());
    }

    #[test]
    fn get_is_bounds_checked() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let view = DepthImageView::new(3, 2, &data).unwrap();
        assert_eq!(view.get(2, 1), Some(6.0));
        assert_eq!(view.get(3, 0), None);
        assert_eq!(view.get(-1, 0), None);
        assert_eq!(view.get(0, 2), None);
    }
}
