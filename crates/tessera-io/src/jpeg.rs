//! JPEG image format support
//!
//! Reads with the `jpeg-decoder` crate (8-bit gray, RGB and CMYK) and
//! writes baseline RGB JPEGs with the `jpeg-encoder` crate.

use crate::{IoError, IoResult};
use jpeg_decoder::{Decoder, PixelFormat};
use jpeg_encoder::{ColorType, Encoder};
use std::io::{Read, Write};
use tessera_core::{ChannelOrder, RgbImage};

/// Default JPEG quality, matching common OpenCV behaviour.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Options for JPEG encoding.
#[derive(Debug, Clone)]
pub struct JpegOptions {
    /// Quality in 1..=100
    pub quality: u8,
}

impl Default for JpegOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl JpegOptions {
    /// Set the quality, clamped to 1..=100.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }
}

/// Read a JPEG image into RGB order.
pub fn read_jpeg<R: Read>(reader: R) -> IoResult<RgbImage> {
    let mut decoder = Decoder::new(reader);
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(format!("JPEG decode error: {e}")))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("JPEG header missing after decode".to_string()))?;

    let width = u32::from(info.width);
    let height = u32::from(info.height);
    let rgb = match info.pixel_format {
        PixelFormat::RGB24 => pixels,
        PixelFormat::L8 => pixels.iter().flat_map(|&g| [g, g, g]).collect(),
        PixelFormat::L16 => pixels
            .chunks_exact(2)
            .flat_map(|c| [c[0], c[0], c[0]])
            .collect(),
        PixelFormat::CMYK32 => pixels
            .chunks_exact(4)
            .flat_map(|c| {
                // Adobe CMYK JPEGs are stored inverted
                let k = u32::from(c[3]);
                let conv = |v: u8| ((u32::from(v) * k + 127) / 255) as u8;
                [conv(c[0]), conv(c[1]), conv(c[2])]
            })
            .collect(),
    };

    Ok(RgbImage::from_raw(width, height, ChannelOrder::Rgb, rgb)?)
}

/// Write an image as a baseline JPEG.
///
/// # Errors
///
/// Returns [`IoError::EncodeError`] if a dimension exceeds 65535.
pub fn write_jpeg<W: Write>(image: &RgbImage, writer: W, options: &JpegOptions) -> IoResult<()> {
    let width = u16::try_from(image.width())
        .map_err(|_| IoError::EncodeError(format!("width {} too large", image.width())))?;
    let height = u16::try_from(image.height())
        .map_err(|_| IoError::EncodeError(format!("height {} too large", image.height())))?;
    let color_type = match image.order() {
        ChannelOrder::Rgb => ColorType::Rgb,
        ChannelOrder::Bgr => ColorType::Bgr,
    };

    let encoder = Encoder::new(writer, options.quality);
    encoder
        .encode(image.data(), width, height, color_type)
        .map_err(|e| IoError::EncodeError(format!("JPEG encode error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::Color;

    #[test]
    fn test_jpeg_roundtrip_is_close() {
        let img = RgbImage::filled(16, 16, ChannelOrder::Rgb, Color::new(200, 40, 90)).unwrap();
        let mut buffer = Vec::new();
        write_jpeg(&img, &mut buffer, &JpegOptions::default()).unwrap();
        let back = read_jpeg(buffer.as_slice()).unwrap();
        assert_eq!(back.dimensions(), (16, 16));
        assert!(back.pixel(8, 8).within(Color::new(200, 40, 90), 6));
    }

    #[test]
    fn test_jpeg_bgr_written_as_rgb() {
        let img = RgbImage::filled(8, 8, ChannelOrder::Bgr, Color::new(250, 0, 0)).unwrap();
        let mut buffer = Vec::new();
        write_jpeg(&img, &mut buffer, &JpegOptions::default()).unwrap();
        let back = read_jpeg(buffer.as_slice()).unwrap();
        // BGR (250, 0, 0) is pure blue
        assert!(back.pixel(4, 4).within(Color::new(0, 0, 250), 8));
    }

    #[test]
    fn test_quality_clamped() {
        assert_eq!(JpegOptions::default().with_quality(0).quality, 1);
        assert_eq!(JpegOptions::default().with_quality(200).quality, 100);
    }
}
