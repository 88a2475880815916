//! Image format detection
//!
//! Detects image formats by examining magic numbers in the file header,
//! or by file extension when writing.

use crate::{IoError, IoResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Image file formats understood by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Portable Network Graphics
    Png,
    /// JPEG / JFIF
    Jpeg,
    /// Binary portable anymap (P5 / P6)
    Pnm,
}

impl ImageFormat {
    /// Canonical file extension (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Pnm => "ppm",
        }
    }

    /// Guess the format from a path's extension (case-insensitive).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" | "jpe" | "jfif" => Some(ImageFormat::Jpeg),
            "ppm" | "pgm" | "pnm" => Some(ImageFormat::Pnm),
            _ => None,
        }
    }
}

/// Magic numbers for image format detection
mod magic {
    /// PNG: 89 50 4E 47 0D 0A 1A 0A
    pub const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    /// JPEG: FF D8 FF
    pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF];

    /// Binary PNM formats
    pub const PGM_BINARY: &[u8] = b"P5";
    pub const PPM_BINARY: &[u8] = b"P6";
}

/// Detect image format from a file path
pub fn detect_format<P: AsRef<Path>>(path: P) -> IoResult<ImageFormat> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 12];
    let bytes_read = file.read(&mut header)?;
    detect_format_from_bytes(&header[..bytes_read])
}

/// Detect image format from bytes
pub fn detect_format_from_bytes(data: &[u8]) -> IoResult<ImageFormat> {
    if data.len() < 2 {
        return Err(IoError::InvalidData(
            "not enough data to detect format".to_string(),
        ));
    }

    if data.starts_with(magic::PNG) {
        return Ok(ImageFormat::Png);
    }

    if data.starts_with(magic::JPEG) {
        return Ok(ImageFormat::Jpeg);
    }

    let first_two = &data[..2];
    if first_two == magic::PGM_BINARY || first_two == magic::PPM_BINARY {
        return Ok(ImageFormat::Pnm);
    }

    Err(IoError::UnsupportedFormat(format!(
        "unrecognized header {:02X?}",
        &data[..data.len().min(8)]
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_png() {
        let data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        assert_eq!(detect_format_from_bytes(&data).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_detect_jpeg() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(detect_format_from_bytes(&data).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_detect_pnm() {
        assert_eq!(detect_format_from_bytes(b"P6\n").unwrap(), ImageFormat::Pnm);
        assert_eq!(detect_format_from_bytes(b"P5\n").unwrap(), ImageFormat::Pnm);
    }

    #[test]
    fn test_unknown_and_short() {
        assert!(matches!(
            detect_format_from_bytes(b"GIF89a"),
            Err(IoError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            detect_format_from_bytes(b"P"),
            Err(IoError::InvalidData(_))
        ));
    }

    #[test]
    fn test_from_path() {
        assert_eq!(ImageFormat::from_path("a/b.JPEG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_path("x.png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_path("x.bmp"), None);
        assert_eq!(ImageFormat::from_path("noext"), None);
    }
}
