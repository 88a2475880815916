//! Tessera Core - Basic data structures for superpixel and palette analysis
//!
//! This crate provides the data model shared by every Tessera crate:
//!
//! - [`RgbImage`] / [`RgbImageMut`] - 8-bit three-channel image (immutable / mutable)
//! - [`ChannelOrder`] - RGB or BGR byte order of an image
//! - [`Color`] - One pixel value in an image's channel order
//! - [`LabelMap`] - Dense per-pixel segment labels
//! - [`Mask`] - Boolean per-pixel grid

pub mod color;
pub mod error;
pub mod image;
pub mod labels;

pub use color::Color;
pub use error::{Error, Result};
pub use image::{ChannelOrder, RgbImage, RgbImageMut};
pub use labels::{LabelMap, Mask};
