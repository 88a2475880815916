//! Palette extraction and color distribution regression test
//!
//! Tests extract_palette, extract_palette_simple, distribution and
//! color_mask on synthetic block images and the fallback scene.

use tessera_color::{
    PaletteOptions, color_distribution, color_mask, distribution, extract_palette,
    extract_palette_simple,
};
use tessera_core::{ChannelOrder, Color};
use tessera_io::ImageFormat;
use tessera_test::{RegParams, load_test_image_or_scene, synthetic};

const SIX_COLORS: [Color; 6] = [
    Color::new(200, 50, 50),
    Color::new(50, 200, 50),
    Color::new(50, 50, 200),
    Color::new(200, 200, 50),
    Color::new(200, 50, 200),
    Color::new(180, 180, 180),
];

#[test]
fn palette_reg() {
    let mut rp = RegParams::new("palette");

    // --- Checkerboard recovery ---
    let a = Color::new(240, 240, 240);
    let b = Color::new(20, 60, 120);
    let board = synthetic::checkerboard(4, 4, 1, a, b).unwrap();
    let result = extract_palette_simple(&board, 2, 42).unwrap();
    let colors = result.palette.colors();
    rp.compare_values(2.0, colors.len() as f64, 0.0);
    rp.compare_values(1.0, if colors.contains(&a) { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(1.0, if colors.contains(&b) { 1.0 } else { 0.0 }, 0.0);
    rp.compare_images(&board, &result.quantized);

    // --- Exactly k entries from block image with six colors ---
    let blocks = synthetic::blocks(60, 40, 10, &SIX_COLORS).unwrap();
    for k in [1u32, 3, 6, 9] {
        let result = extract_palette_simple(&blocks, k, 42).unwrap();
        rp.compare_values(k as f64, result.palette.len() as f64, 0.0);
        rp.compare_values(2400.0, result.palette.total_count() as f64, 0.0);
        eprintln!(
            "  k={}: iterations={} converged={} inertia={:.1}",
            k, result.iterations, result.converged, result.inertia
        );
    }

    // k = 6 reproduces the block image exactly
    let six = extract_palette_simple(&blocks, 6, 42).unwrap();
    rp.compare_values(0.0, six.inertia, 1e-9);
    rp.compare_images(&blocks, &six.quantized);

    // --- Distribution over the exact palette partitions the pixels ---
    let counts = distribution(&blocks, &six.palette, 0).unwrap();
    let total: u64 = counts.entries().iter().map(|&(_, n)| n).sum();
    rp.compare_values(2400.0, total as f64, 0.0);
    for entry in six.palette.entries() {
        rp.compare_values(
            entry.count as f64,
            counts.get(entry.color).unwrap_or(0) as f64,
            0.0,
        );
    }

    // --- Wide tolerance double counts ---
    let wide = color_distribution(&blocks, &SIX_COLORS, 255);
    for &(_, n) in wide.entries() {
        rp.compare_values(2400.0, n as f64, 0.0);
    }

    // --- Color mask for one block color ---
    let (count, mask) = color_mask(&blocks, SIX_COLORS[0], 10).unwrap();
    rp.compare_values(count as f64, mask.count() as f64, 0.0);
    rp.compare_values(1.0, if mask.get(0, 0) { 1.0 } else { 0.0 }, 0.0);

    // --- Natural image: determinism and channel order ---
    let scene = load_test_image_or_scene("landscape.png", 160, 120).unwrap();
    let options = PaletteOptions::default();
    let r1 = extract_palette(&scene, &options).unwrap();
    let r2 = extract_palette(&scene, &options).unwrap();
    rp.compare_values(10.0, r1.palette.len() as f64, 0.0);
    rp.compare_images(&r1.quantized, &r2.quantized);

    let bgr = scene.to_order(ChannelOrder::Bgr);
    let rb = extract_palette(&bgr, &options).unwrap();
    rp.compare_values(1.0, if rb.palette.order() == ChannelOrder::Bgr { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(1.0, if rb.quantized.order() == ChannelOrder::Bgr { 1.0 } else { 0.0 }, 0.0);

    rp.write_image_and_check(&r1.quantized, ImageFormat::Png)
        .unwrap();

    for entry in r1.palette.top(5) {
        eprintln!(
            "  {} {:>6}",
            entry.color.to_hex(r1.palette.order()),
            entry.count
        );
    }

    assert!(rp.cleanup());
}
