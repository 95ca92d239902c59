//! Core types and utilities for armor detection.
//!
//! This crate is small and purely geometric: image views, the light/armor
//! data model, a four-point homography with perspective warp, and Otsu
//! thresholding. It does not depend on any concrete camera or image crate.

mod armor;
mod homography;
mod image;
mod light;
mod logger;
mod params;
mod threshold;

pub use armor::{Armor, ArmorSize, DepthUnavailable};
pub use homography::{homography_from_4pt, warp_perspective_gray, Homography};
pub use image::{
    rgb_to_gray, sample_gray_bilinear, ColorEncoding, ColorImage, ColorImageView, Frame,
    FrameHeader, GrayImage, GrayImageView, HasSize, ImageError,
};
pub use light::{Light, LightColor, UnknownColor};
pub use params::ParamError;
pub use threshold::{binarize_otsu, otsu_threshold};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
