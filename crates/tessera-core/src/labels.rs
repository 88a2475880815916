//! Label maps and binary masks
//!
//! A [`LabelMap`] assigns every pixel of a W x H grid a segment label.
//! Labels are always dense: every value in `[0, segment_count)` is used
//! by at least one pixel and no other value appears.

use crate::error::{Error, Result};

/// Dense per-pixel segment labelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    width: u32,
    height: u32,
    labels: Vec<u32>,
    segment_count: u32,
}

fn check_len(width: u32, height: u32, len: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::EmptyInput { width, height });
    }
    let expected = width as usize * height as usize;
    if len != expected {
        return Err(Error::DataLengthMismatch {
            expected,
            actual: len,
        });
    }
    Ok(())
}

impl LabelMap {
    /// Wrap a label buffer that is already dense.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLabels`] if some value in `[0, max]` is unused.
    pub fn from_raw(width: u32, height: u32, labels: Vec<u32>) -> Result<Self> {
        check_len(width, height, labels.len())?;
        let count = labels.iter().copied().max().map_or(0, |m| m as usize + 1);
        // A dense map never has more labels than pixels
        if count > labels.len() {
            return Err(Error::InvalidLabels(format!(
                "label {} exceeds pixel count {}",
                count - 1,
                labels.len()
            )));
        }
        let mut seen = vec![false; count];
        for &l in &labels {
            seen[l as usize] = true;
        }
        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(Error::InvalidLabels(format!(
                "label {missing} unused but labels run up to {}",
                count - 1
            )));
        }
        Ok(LabelMap {
            width,
            height,
            labels,
            segment_count: count as u32,
        })
    }

    /// Compact arbitrary labels into dense ones.
    ///
    /// New labels are handed out in order of first appearance in a
    /// row-major scan, so the top-left pixel always gets label 0.
    pub fn from_sparse(width: u32, height: u32, labels: &[u32]) -> Result<Self> {
        check_len(width, height, labels.len())?;
        let mut remap: std::collections::HashMap<u32, u32> = std::collections::HashMap::new();
        let mut dense = Vec::with_capacity(labels.len());
        for &l in labels {
            let next = remap.len() as u32;
            dense.push(*remap.entry(l).or_insert(next));
        }
        Ok(LabelMap {
            width,
            height,
            labels: dense,
            segment_count: remap.len() as u32,
        })
    }

    /// Get the width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of distinct labels.
    #[inline]
    pub fn segment_count(&self) -> u32 {
        self.segment_count
    }

    /// Row-major label buffer.
    #[inline]
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// Label at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the map.
    #[inline]
    pub fn label(&self, x: u32, y: u32) -> u32 {
        self.labels[y as usize * self.width as usize + x as usize]
    }

    /// Label at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.label(x, y))
    }

    /// Number of pixels carrying each label, indexed by label.
    pub fn segment_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.segment_count as usize];
        for &l in &self.labels {
            sizes[l as usize] += 1;
        }
        sizes
    }

    /// True when some 4-neighbour of `(x, y)` has a different label.
    pub fn is_boundary(&self, x: u32, y: u32) -> bool {
        let l = self.label(x, y);
        (x > 0 && self.label(x - 1, y) != l)
            || (x + 1 < self.width && self.label(x + 1, y) != l)
            || (y > 0 && self.label(x, y - 1) != l)
            || (y + 1 < self.height && self.label(x, y + 1) != l)
    }

    /// Check whether every segment forms one 4-connected region.
    pub fn is_four_connected(&self) -> bool {
        let w = self.width as usize;
        let h = self.height as usize;
        let mut visited = vec![false; self.labels.len()];
        let mut seen_label = vec![false; self.segment_count as usize];
        let mut stack = Vec::new();
        for start in 0..self.labels.len() {
            if visited[start] {
                continue;
            }
            let label = self.labels[start];
            if seen_label[label as usize] {
                return false;
            }
            seen_label[label as usize] = true;
            visited[start] = true;
            stack.push(start);
            while let Some(i) = stack.pop() {
                let (x, y) = (i % w, i / w);
                let mut visit = |j: usize| {
                    if !visited[j] && self.labels[j] == label {
                        visited[j] = true;
                        stack.push(j);
                    }
                };
                if x > 0 {
                    visit(i - 1);
                }
                if x + 1 < w {
                    visit(i + 1);
                }
                if y > 0 {
                    visit(i - w);
                }
                if y + 1 < h {
                    visit(i + w);
                }
            }
        }
        true
    }
}

/// Boolean W x H grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// Create an all-false mask.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        check_len(width, height, width as usize * height as usize)?;
        Ok(Mask {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        })
    }

    /// Wrap a row-major boolean buffer.
    pub fn from_raw(width: u32, height: u32, bits: Vec<bool>) -> Result<Self> {
        check_len(width, height, bits.len())?;
        Ok(Mask {
            width,
            height,
            bits,
        })
    }

    /// Get the width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the mask.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bits[y as usize * self.width as usize + x as usize]
    }

    /// Set the value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the mask.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        self.bits[y as usize * self.width as usize + x as usize] = value;
    }

    /// Row-major values.
    #[inline]
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Number of set entries.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_requires_dense_labels() {
        assert!(LabelMap::from_raw(2, 2, vec![0, 1, 1, 0]).is_ok());
        assert!(matches!(
            LabelMap::from_raw(2, 2, vec![0, 2, 2, 0]),
            Err(Error::InvalidLabels(_))
        ));
        assert!(LabelMap::from_raw(2, 2, vec![0, 1, 1]).is_err());
        assert!(LabelMap::from_raw(0, 2, vec![]).is_err());
    }

    #[test]
    fn test_from_raw_rejects_label_beyond_pixel_count() {
        assert!(matches!(
            LabelMap::from_raw(1, 1, vec![u32::MAX]),
            Err(Error::InvalidLabels(_))
        ));
        assert!(matches!(
            LabelMap::from_raw(2, 1, vec![0, 2]),
            Err(Error::InvalidLabels(_))
        ));
    }

    #[test]
    fn test_from_sparse_uses_first_appearance() {
        let map = LabelMap::from_sparse(3, 2, &[7, 7, 3, 9, 3, 3]).unwrap();
        assert_eq!(map.labels(), &[0, 0, 1, 2, 1, 1]);
        assert_eq!(map.segment_count(), 3);
        assert_eq!(map.segment_sizes(), vec![2, 3, 1]);
    }

    #[test]
    fn test_boundary_and_connectivity() {
        // 0 0 1
        // 0 1 1
        let map = LabelMap::from_raw(3, 2, vec![0, 0, 1, 0, 1, 1]).unwrap();
        assert!(map.is_boundary(1, 0));
        assert!(!map.is_boundary(2, 1));
        assert!(map.is_four_connected());

        // 0 1 0 : label 0 split in two
        let split = LabelMap::from_raw(3, 1, vec![0, 1, 0]).unwrap();
        assert!(!split.is_four_connected());
    }

    #[test]
    fn test_mask_basics() {
        let mut m = Mask::new(3, 3).unwrap();
        m.set(1, 2, true);
        assert!(m.get(1, 2));
        assert_eq!(m.count(), 1);
        assert!(Mask::from_raw(2, 2, vec![true; 3]).is_err());
    }
}
