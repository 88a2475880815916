//! Binary PNM support
//!
//! Reads P5 (gray) and P6 (RGB) files with maxval up to 255, and writes P6.

use crate::{IoError, IoResult};
use std::io::{BufRead, Write};
use tessera_core::{ChannelOrder, RgbImage};

fn read_token<R: BufRead>(reader: &mut R) -> IoResult<String> {
    let mut token = String::new();
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        let byte = buf[0];
        reader.consume(1);
        if byte == b'#' {
            let mut comment = Vec::new();
            reader.read_until(b'\n', &mut comment)?;
            if !token.is_empty() {
                break;
            }
            continue;
        }
        if byte.is_ascii_whitespace() {
            if token.is_empty() {
                continue;
            }
            break;
        }
        token.push(char::from(byte));
    }
    if token.is_empty() {
        return Err(IoError::InvalidData("truncated PNM header".to_string()));
    }
    Ok(token)
}

fn read_number<R: BufRead>(reader: &mut R, what: &str) -> IoResult<u32> {
    let token = read_token(reader)?;
    token
        .parse()
        .map_err(|_| IoError::InvalidData(format!("bad PNM {what}: {token:?}")))
}

/// Read a binary PNM image into RGB order.
pub fn read_pnm<R: BufRead>(mut reader: R) -> IoResult<RgbImage> {
    let magic = read_token(&mut reader)?;
    let channels = match magic.as_str() {
        "P5" => 1,
        "P6" => 3,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "PNM variant {other} not supported"
            )));
        }
    };
    let width = read_number(&mut reader, "width")?;
    let height = read_number(&mut reader, "height")?;
    let maxval = read_number(&mut reader, "maxval")?;
    if maxval == 0 || maxval > 255 {
        return Err(IoError::UnsupportedFormat(format!(
            "PNM maxval {maxval} not supported"
        )));
    }

    let mut raw = vec![0u8; width as usize * height as usize * channels];
    reader.read_exact(&mut raw)?;
    if maxval != 255 {
        for v in raw.iter_mut() {
            *v = ((u32::from(*v) * 255 + maxval / 2) / maxval).min(255) as u8;
        }
    }
    let rgb = if channels == 1 {
        raw.iter().flat_map(|&g| [g, g, g]).collect()
    } else {
        raw
    };

    Ok(RgbImage::from_raw(width, height, ChannelOrder::Rgb, rgb)?)
}

/// Write an image as binary P6.
pub fn write_pnm<W: Write>(image: &RgbImage, mut writer: W) -> IoResult<()> {
    let rgb = image.to_order(ChannelOrder::Rgb);
    write!(writer, "P6\n{} {}\n255\n", rgb.width(), rgb.height())?;
    writer.write_all(rgb.data())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tessera_core::Color;

    #[test]
    fn test_p6_roundtrip() {
        let img = RgbImage::from_fn(3, 2, ChannelOrder::Rgb, |x, y| {
            Color::new(x as u8 * 40, y as u8 * 90, 17)
        })
        .unwrap();
        let mut buffer = Vec::new();
        write_pnm(&img, &mut buffer).unwrap();
        assert!(buffer.starts_with(b"P6\n3 2\n255\n"));
        assert_eq!(read_pnm(Cursor::new(buffer)).unwrap(), img);
    }

    #[test]
    fn test_p5_with_comment_and_maxval() {
        let mut data = b"P5\n# gray\n2 1\n15\n".to_vec();
        data.extend_from_slice(&[0, 15]);
        let img = read_pnm(Cursor::new(data)).unwrap();
        assert_eq!(img.pixel(0, 0), Color::gray(0));
        assert_eq!(img.pixel(1, 0), Color::gray(255));
    }

    #[test]
    fn test_ascii_variant_rejected() {
        let err = read_pnm(Cursor::new(b"P3\n1 1\n255\n0 0 0\n".to_vec())).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_truncated_data() {
        let err = read_pnm(Cursor::new(b"P6\n2 2\n255\n\x00\x01".to_vec())).unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }
}
