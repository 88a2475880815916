//! Scale regression test
//!
//! Tests scale_to_size and resize_with_pad on the fallback scene.

use tessera_core::{ChannelOrder, Color};
use tessera_io::ImageFormat;
use tessera_test::{RegParams, load_test_image_or_scene};
use tessera_transform::{
    ResizeOptions, ScaleMethod, pad_geometry, resize_with_options, resize_with_pad, scale_to_size,
    scale_to_size_with,
};

#[test]
fn scale_reg() {
    let mut rp = RegParams::new("scale");

    let scene = load_test_image_or_scene("landscape.png", 120, 80).unwrap();
    let (w, h) = scene.dimensions();
    eprintln!("Image size: {}x{}", w, h);

    // --- Test 1: Scale up 2x ---
    let up2 = scale_to_size(&scene, w * 2, h * 2).unwrap();
    rp.compare_values((w * 2) as f64, up2.width() as f64, 0.0);
    rp.compare_values((h * 2) as f64, up2.height() as f64, 0.0);

    // --- Test 2: Scale down then sample ---
    let down = scale_to_size_with(&scene, w / 2, h / 2, ScaleMethod::Sampling).unwrap();
    rp.compare_values((w / 2) as f64, down.width() as f64, 0.0);

    // --- Test 3: Resize with padding into a square ---
    let square = resize_with_pad(&scene, 96, 96, Color::WHITE).unwrap();
    rp.compare_values(96.0, square.width() as f64, 0.0);
    rp.compare_values(96.0, square.height() as f64, 0.0);
    let g = pad_geometry(w, h, 96, 96).unwrap();
    eprintln!(
        "  fit {}x{} at top={} left={}",
        g.scaled_width, g.scaled_height, g.top, g.left
    );
    if g.top > 0 {
        rp.compare_values(1.0, if square.pixel(48, 0) == Color::WHITE { 1.0 } else { 0.0 }, 0.0);
    }
    if g.left > 0 {
        rp.compare_values(1.0, if square.pixel(0, 48) == Color::WHITE { 1.0 } else { 0.0 }, 0.0);
    }
    rp.write_image_and_check(&square, ImageFormat::Png).unwrap();

    // --- Test 4: BGR input keeps its order and padding ---
    let bgr = scene.to_order(ChannelOrder::Bgr);
    let pad = Color::from_rgb(0, 0, 255, ChannelOrder::Bgr);
    let options = ResizeOptions::default().with_size(64, 64).with_pad_color(pad);
    let padded = resize_with_options(&bgr, &options).unwrap();
    rp.compare_values(1.0, if padded.order() == ChannelOrder::Bgr { 1.0 } else { 0.0 }, 0.0);
    let back = padded.to_order(ChannelOrder::Rgb);
    let same = resize_with_options(&scene, &options.clone().with_pad_color(Color::new(0, 0, 255)))
        .unwrap();
    rp.compare_images(&same, &back);

    assert!(rp.cleanup());
}
