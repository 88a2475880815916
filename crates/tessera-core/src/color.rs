//! Three-channel color values
//!
//! A [`Color`] stores its channels in the order of the image it came from.
//! Use [`Color::from_rgb`] / [`Color::to_rgb`] to move between that order
//! and plain red/green/blue.

use crate::image::ChannelOrder;

/// An 8-bit, three-channel color in some [`ChannelOrder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Color(pub [u8; 3]);

impl Color {
    /// Black (all channels zero, identical in every order)
    pub const BLACK: Color = Color([0, 0, 0]);
    /// White (all channels 255, identical in every order)
    pub const WHITE: Color = Color([255, 255, 255]);

    /// Create a color from raw channel values in storage order.
    pub const fn new(c0: u8, c1: u8, c2: u8) -> Self {
        Color([c0, c1, c2])
    }

    /// Create a gray color (all channels equal).
    pub const fn gray(value: u8) -> Self {
        Color([value, value, value])
    }

    /// Build a color from red/green/blue, stored in `order`.
    pub const fn from_rgb(r: u8, g: u8, b: u8, order: ChannelOrder) -> Self {
        match order {
            ChannelOrder::Rgb => Color([r, g, b]),
            ChannelOrder::Bgr => Color([b, g, r]),
        }
    }

    /// Decode this color, stored in `order`, into `(r, g, b)`.
    pub const fn to_rgb(self, order: ChannelOrder) -> (u8, u8, u8) {
        let [c0, c1, c2] = self.0;
        match order {
            ChannelOrder::Rgb => (c0, c1, c2),
            ChannelOrder::Bgr => (c2, c1, c0),
        }
    }

    /// Re-express a color stored in `from` as one stored in `to`.
    pub const fn reorder(self, from: ChannelOrder, to: ChannelOrder) -> Self {
        let (r, g, b) = self.to_rgb(from);
        Color::from_rgb(r, g, b, to)
    }

    /// Raw channel values in storage order.
    #[inline]
    pub const fn channels(self) -> [u8; 3] {
        self.0
    }

    /// Format as `#RRGGBB`, interpreting the channels in `order`.
    ///
    /// # Example
    ///
    /// ```
    /// use tessera_core::{ChannelOrder, Color};
    ///
    /// let c = Color::new(0x10, 0x20, 0x30);
    /// assert_eq!(c.to_hex(ChannelOrder::Rgb), "#102030");
    /// assert_eq!(c.to_hex(ChannelOrder::Bgr), "#302010");
    /// ```
    pub fn to_hex(self, order: ChannelOrder) -> String {
        let (r, g, b) = self.to_rgb(order);
        format!("#{r:02X}{g:02X}{b:02X}")
    }

    /// True when every channel differs from `other` by at most `tolerance`.
    #[inline]
    pub fn within(self, other: Color, tolerance: u32) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(&a, &b)| u32::from(a.abs_diff(b)) <= tolerance)
    }

    /// Squared Euclidean distance between channel vectors.
    #[inline]
    pub fn distance_squared(self, other: Color) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(&a, &b)| {
                let d = u32::from(a.abs_diff(b));
                d * d
            })
            .sum()
    }
}

impl From<[u8; 3]> for Color {
    fn from(channels: [u8; 3]) -> Self {
        Color(channels)
    }
}

impl From<Color> for [u8; 3] {
    fn from(color: Color) -> Self {
        color.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_roundtrip_through_bgr() {
        let c = Color::from_rgb(1, 2, 3, ChannelOrder::Bgr);
        assert_eq!(c.channels(), [3, 2, 1]);
        assert_eq!(c.to_rgb(ChannelOrder::Bgr), (1, 2, 3));
        assert_eq!(
            c.reorder(ChannelOrder::Bgr, ChannelOrder::Rgb),
            Color::new(1, 2, 3)
        );
    }

    #[test]
    fn test_hex_formatting() {
        let green = Color::from_rgb(0, 255, 0, ChannelOrder::Bgr);
        assert_eq!(green.to_hex(ChannelOrder::Bgr), "#00FF00");
        assert_eq!(Color::WHITE.to_hex(ChannelOrder::Rgb), "#FFFFFF");
    }

    #[test]
    fn test_within_tolerance() {
        let a = Color::new(100, 100, 100);
        assert!(a.within(Color::new(110, 90, 100), 10));
        assert!(!a.within(Color::new(111, 100, 100), 10));
        assert!(a.within(a, 0));
    }

    #[test]
    fn test_distance_squared() {
        assert_eq!(Color::new(0, 0, 0).distance_squared(Color::new(3, 4, 0)), 25);
    }
}
