//! PNG image format support
//!
//! Every PNG color type is normalised to 8-bit samples on read. Gray is
//! expanded to three equal channels and alpha is dropped.

use crate::{IoError, IoResult};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::io::{BufRead, Seek, Write};
use tessera_core::{ChannelOrder, RgbImage};

/// Read a PNG image into RGB order.
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<RgbImage> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {e}")))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {e}")))?;

    let width = output_info.width;
    let height = output_info.height;
    let (color_type, _) = reader.output_color_type();
    let samples = match color_type {
        ColorType::Grayscale => 1,
        ColorType::GrayscaleAlpha => 2,
        ColorType::Rgb => 3,
        ColorType::Rgba => 4,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unexpected PNG output color type: {other:?}"
            )));
        }
    };

    let bytes_per_row = output_info.line_size;
    let data = &buf[..output_info.buffer_size()];
    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);

    for y in 0..height as usize {
        let row = &data[y * bytes_per_row..y * bytes_per_row + width as usize * samples];
        for px in row.chunks_exact(samples) {
            match samples {
                1 | 2 => rgb.extend_from_slice(&[px[0], px[0], px[0]]),
                _ => rgb.extend_from_slice(&px[..3]),
            }
        }
    }

    Ok(RgbImage::from_raw(width, height, ChannelOrder::Rgb, rgb)?)
}

/// Write an image as 8-bit RGB PNG.
///
/// The image's channel order is converted to RGB first.
pub fn write_png<W: Write>(image: &RgbImage, writer: W) -> IoResult<()> {
    let rgb = image.to_order(ChannelOrder::Rgb);

    let mut encoder = Encoder::new(writer, rgb.width(), rgb.height());
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {e}")))?;
    writer
        .write_image_data(rgb.data())
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {e}")))?;

    Ok(())
}
