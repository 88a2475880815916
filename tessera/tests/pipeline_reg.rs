//! End-to-end pipeline regression test
//!
//! File -> resize with padding -> superpixels -> recolor, and
//! file -> palette -> distribution -> JSON report, through the umbrella
//! crate's re-exports.

use tessera::color::{PaletteOptions, distribution, extract_palette};
use tessera::io::{read_image, write_image_auto};
use tessera::superpixel::{SlicOptions, recolor, segment};
use tessera::transform::resize_with_pad;
use tessera::{Color, PaletteReport};
use tessera_test::{RegParams, synthetic};

#[test]
fn pipeline_reg() {
    let mut rp = RegParams::new("pipeline");
    let dir = tempfile::tempdir().expect("create temp dir");

    let source = synthetic::scene(150, 90).unwrap();
    let path = dir.path().join("scene.png");
    write_image_auto(&source, &path).unwrap();
    let image = read_image(&path).unwrap();
    rp.compare_images(&source, &image);

    // --- Preprocess into a square canvas ---
    let square = resize_with_pad(&image, 120, 120, Color::WHITE).unwrap();
    rp.compare_values(120.0, square.width() as f64, 0.0);
    rp.compare_values(1.0, if square.pixel(60, 0) == Color::WHITE { 1.0 } else { 0.0 }, 0.0);

    // --- Superpixels ---
    let options = SlicOptions::for_image(square.width(), square.height()).with_region_size(15);
    let labels = segment(&square, &options).unwrap();
    rp.compare_values(1.0, if labels.is_four_connected() { 1.0 } else { 0.0 }, 0.0);
    let mosaic = recolor(&square, &labels).unwrap();
    let out = dir.path().join("mosaic.png");
    write_image_auto(&mosaic, &out).unwrap();
    rp.compare_images(&mosaic, &read_image(&out).unwrap());

    // --- Palette report ---
    let extraction = extract_palette(&image, &PaletteOptions::default().with_palette_size(4)).unwrap();
    let counts = distribution(&image, &extraction.palette, 10).unwrap();
    let report = PaletteReport::new(&extraction, &counts, 10, 3);
    rp.compare_values(3.0, report.colors.len() as f64, 0.0);
    let sorted = report
        .colors
        .windows(2)
        .all(|w| w[0].cluster_pixels >= w[1].cluster_pixels);
    rp.compare_values(1.0, if sorted { 1.0 } else { 0.0 }, 0.0);

    let json = serde_json::to_string(&report).unwrap();
    rp.write_data_and_check(json.as_bytes(), "json").unwrap();

    assert!(rp.cleanup());
}
