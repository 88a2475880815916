//! Image format regression test
//!
//! Round-trips synthetic images through PNG, PNM and JPEG, on disk and in
//! memory, and checks format detection.

use tessera_core::{ChannelOrder, Color};
use tessera_io::{
    ImageFormat, IoError, detect_format, read_image, read_image_from_bytes, read_image_with_order,
    write_image, write_image_auto, write_image_mem,
};
use tessera_test::{RegParams, synthetic};

fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

#[test]
fn ioformats_reg() {
    let mut rp = RegParams::new("ioformats");
    let dir = tempfile::tempdir().expect("create temp dir");

    let img = synthetic::gradient(37, 23).unwrap();

    // --- Lossless formats on disk ---
    for format in [ImageFormat::Png, ImageFormat::Pnm] {
        let path = dir.path().join(format!("gradient.{}", format.extension()));
        write_image(&img, &path, format).unwrap();
        rp.compare_values(1.0, flag(detect_format(&path).unwrap() == format), 0.0);
        let back = read_image(&path).unwrap();
        rp.compare_images(&img, &back);
    }

    // --- BGR images are written as the colors they represent ---
    let bgr = img.to_order(ChannelOrder::Bgr);
    let bytes = write_image_mem(&bgr, ImageFormat::Png).unwrap();
    let back = read_image_from_bytes(&bytes).unwrap();
    rp.compare_values(1.0, flag(back.order() == ChannelOrder::Rgb), 0.0);
    rp.compare_images(&img, &back);

    let path = dir.path().join("bgr.ppm");
    write_image_auto(&bgr, &path).unwrap();
    let as_bgr = read_image_with_order(&path, ChannelOrder::Bgr).unwrap();
    rp.compare_images(&bgr, &as_bgr);

    // --- JPEG is lossy: compare a flat image within a tolerance ---
    let flat_color = Color::new(180, 90, 40);
    let flat = synthetic::solid(32, 32, flat_color).unwrap();
    let path = dir.path().join("flat.jpg");
    write_image_auto(&flat, &path).unwrap();
    let back = read_image(&path).unwrap();
    rp.compare_values(32.0, back.width() as f64, 0.0);
    rp.compare_values(1.0, flag(back.pixel(16, 16).within(flat_color, 6)), 0.0);

    // --- Unknown extension and garbage bytes are rejected ---
    let err = write_image_auto(&img, dir.path().join("gradient.xyz")).unwrap_err();
    rp.compare_values(1.0, flag(matches!(err, IoError::UnsupportedFormat(_))), 0.0);
    rp.compare_values(1.0, flag(read_image_from_bytes(b"not an image").is_err()), 0.0);

    assert!(rp.cleanup());
}
