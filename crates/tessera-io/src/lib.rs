//! Tessera IO - Image reading and writing
//!
//! This crate is the codec boundary of the toolkit. Decoded images always
//! come back in [`ChannelOrder::Rgb`]; writers convert from whatever order
//! the image carries.
//!
//! - **PNG** ([`png`]): all color types, normalised to 8-bit RGB
//! - **JPEG** ([`jpeg`]): gray / RGB / CMYK read, baseline RGB write
//! - **PNM** ([`pnm`]): binary P5 / P6 read, P6 write
//! - **Format detection** ([`format`]): magic numbers and file extensions

pub mod error;
pub mod format;
#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png-format")]
pub mod png;
#[cfg(feature = "pnm")]
pub mod pnm;

pub use error::{IoError, IoResult};
pub use format::{ImageFormat, detect_format, detect_format_from_bytes};
#[cfg(feature = "jpeg")]
pub use jpeg::{DEFAULT_JPEG_QUALITY, JpegOptions};

// Re-export core types
pub use tessera_core;

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use tessera_core::{ChannelOrder, RgbImage};

/// Read an image from a file, detecting the format from its header.
///
/// # Errors
///
/// Returns [`IoError::Io`] if the file cannot be opened and
/// [`IoError::UnsupportedFormat`] for formats not compiled in.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<RgbImage> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let image = read_image_from_bytes(&data)?;
    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "read image"
    );
    Ok(image)
}

/// Read an image and convert it to `order`.
pub fn read_image_with_order<P: AsRef<Path>>(path: P, order: ChannelOrder) -> IoResult<RgbImage> {
    Ok(read_image(path)?.to_order(order))
}

/// Decode an image held in memory.
pub fn read_image_from_bytes(data: &[u8]) -> IoResult<RgbImage> {
    let format = detect_format_from_bytes(data)?;
    match format {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(Cursor::new(data)),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::read_jpeg(data),
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::read_pnm(Cursor::new(data)),
        #[allow(unreachable_patterns)]
        other => Err(IoError::UnsupportedFormat(format!(
            "{other:?} support not enabled"
        ))),
    }
}

/// Encode an image in `format` to any writer.
pub fn write_image_to<W: Write>(image: &RgbImage, writer: W, format: ImageFormat) -> IoResult<()> {
    match format {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::write_png(image, writer),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::write_jpeg(image, writer, &JpegOptions::default()),
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::write_pnm(image, writer),
        #[allow(unreachable_patterns)]
        other => {
            let _ = writer;
            Err(IoError::UnsupportedFormat(format!(
                "{other:?} support not enabled"
            )))
        }
    }
}

/// Encode an image in `format` into a byte vector.
pub fn write_image_mem(image: &RgbImage, format: ImageFormat) -> IoResult<Vec<u8>> {
    let mut buffer = Vec::new();
    write_image_to(image, &mut buffer, format)?;
    Ok(buffer)
}

/// Write an image to a file in `format`.
pub fn write_image<P: AsRef<Path>>(image: &RgbImage, path: P, format: ImageFormat) -> IoResult<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_image_to(image, &mut writer, format)?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), ?format, "wrote image");
    Ok(())
}

/// Write an image to a file, choosing the format from the extension.
///
/// # Errors
///
/// Returns [`IoError::UnsupportedFormat`] when the extension is unknown.
pub fn write_image_auto<P: AsRef<Path>>(image: &RgbImage, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path).ok_or_else(|| {
        IoError::UnsupportedFormat(format!("cannot infer format from {}", path.display()))
    })?;
    write_image(image, path, format)
}
