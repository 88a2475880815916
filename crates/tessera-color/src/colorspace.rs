//! Color space conversion
//!
//! sRGB to CIE XYZ (D65) to CIE L*a*b*. Superpixel clustering measures
//! color distance in L*a*b*, where Euclidean distance roughly tracks
//! perceived difference.

use tessera_core::{ChannelOrder, Color, RgbImage};

/// D65 reference white
const WHITE_X: f32 = 0.950_47;
const WHITE_Y: f32 = 1.0;
const WHITE_Z: f32 = 1.088_83;

/// (6/29)^3
const LAB_EPSILON: f32 = 0.008_856;
/// (29/6)^2 / 3
const LAB_KAPPA: f32 = 7.787;

/// CIE L*a*b* color representation
///
/// - `l`: Lightness in range [0.0, 100.0]
/// - `a`: Green-Red component, typically [-128, 127]
/// - `b`: Blue-Yellow component, typically [-128, 127]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Lab {
    /// Create a new LAB color
    pub fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Squared Euclidean distance (Delta E 1976, squared).
    #[inline]
    pub fn distance_squared(self, other: Lab) -> f32 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        dl * dl + da * da + db * db
    }
}

/// CIE XYZ color representation (D65 illuminant)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Xyz {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Xyz {
    /// Create a new XYZ color
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[inline]
fn srgb_to_linear(c: u8) -> f32 {
    let c = f32::from(c) / 255.0;
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        LAB_KAPPA * t + 16.0 / 116.0
    }
}

/// Convert RGB to CIE XYZ (D65 illuminant, sRGB color space)
pub fn rgb_to_xyz(r: u8, g: u8, b: u8) -> Xyz {
    let (r, g, b) = (srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b));
    Xyz::new(
        0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b,
        0.212_672_9 * r + 0.715_152_2 * g + 0.072_175 * b,
        0.019_333_9 * r + 0.119_192 * g + 0.950_304_1 * b,
    )
}

/// Convert CIE XYZ to CIE L*a*b*
pub fn xyz_to_lab(xyz: Xyz) -> Lab {
    let fx = lab_f(xyz.x / WHITE_X);
    let fy = lab_f(xyz.y / WHITE_Y);
    let fz = lab_f(xyz.z / WHITE_Z);
    Lab::new(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

/// Convert RGB values to CIE L*a*b*
pub fn rgb_to_lab(r: u8, g: u8, b: u8) -> Lab {
    xyz_to_lab(rgb_to_xyz(r, g, b))
}

/// Convert a color stored in `order` to CIE L*a*b*
pub fn color_to_lab(color: Color, order: ChannelOrder) -> Lab {
    let (r, g, b) = color.to_rgb(order);
    rgb_to_lab(r, g, b)
}

/// Convert every pixel of an image to L*a*b*, row-major.
///
/// Identical colors are converted once.
pub fn image_to_lab(image: &RgbImage) -> Vec<Lab> {
    let order = image.order();
    let mut cache: std::collections::HashMap<Color, Lab> = std::collections::HashMap::new();
    image
        .pixels()
        .map(|c| *cache.entry(c).or_insert_with(|| color_to_lab(c, order)))
        .collect()
}
