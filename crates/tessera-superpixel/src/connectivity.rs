//! Connectivity enforcement and segment merging
//!
//! After clustering a label can cover several disjoint fragments. Each
//! label keeps its largest 4-connected component; every other fragment is
//! absorbed by a neighbouring component.

use crate::error::SuperpixelResult;
use crate::summarize::segment_stats;
use std::collections::{BTreeMap, VecDeque};
use tessera_core::{LabelMap, RgbImage};

/// 4-connected components of a label buffer.
struct Components {
    /// Component id per pixel
    ids: Vec<u32>,
    /// Source label per component
    labels: Vec<u32>,
    /// Pixel count per component
    sizes: Vec<usize>,
}

fn find_components(labels: &[u32], width: usize, height: usize) -> Components {
    let mut ids = vec![u32::MAX; labels.len()];
    let mut comp_labels = Vec::new();
    let mut sizes = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..labels.len() {
        if ids[start] != u32::MAX {
            continue;
        }
        let id = comp_labels.len() as u32;
        let label = labels[start];
        let mut size = 0usize;
        ids[start] = id;
        queue.push_back(start);

        while let Some(i) = queue.pop_front() {
            size += 1;
            let (x, y) = (i % width, i / width);
            let mut visit = |j: usize| {
                if ids[j] == u32::MAX && labels[j] == label {
                    ids[j] = id;
                    queue.push_back(j);
                }
            };
            if x > 0 {
                visit(i - 1);
            }
            if x + 1 < width {
                visit(i + 1);
            }
            if y > 0 {
                visit(i - width);
            }
            if y + 1 < height {
                visit(i + width);
            }
        }

        comp_labels.push(label);
        sizes.push(size);
    }

    Components {
        ids,
        labels: comp_labels,
        sizes,
    }
}

/// Make every label 4-connected.
///
/// For each label the largest component (first found on ties) keeps it.
/// Remaining fragments join the adjacent, already-resolved component with
/// which they share the longest boundary, ties going to the lowest
/// component id. Fragments are resolved in passes until none is left, so
/// a fragment enclosed by other fragments waits for one of them.
///
/// The returned labels are sparse; callers compact them with
/// [`LabelMap::from_sparse`].
pub(crate) fn enforce_connectivity(labels: &[u32], width: usize, height: usize) -> Vec<u32> {
    let comps = find_components(labels, width, height);
    let n = comps.labels.len();

    // Largest component per label
    let mut keeper: BTreeMap<u32, u32> = BTreeMap::new();
    for c in 0..n {
        let label = comps.labels[c];
        match keeper.get(&label) {
            Some(&k) if comps.sizes[k as usize] >= comps.sizes[c] => {}
            _ => {
                keeper.insert(label, c as u32);
            }
        }
    }
    if keeper.len() == n {
        return labels.to_vec();
    }

    // Shared boundary length between adjacent components
    let mut shared: Vec<BTreeMap<u32, usize>> = vec![BTreeMap::new(); n];
    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            let a = comps.ids[i];
            let mut touch = |j: usize| {
                let b = comps.ids[j];
                if a != b {
                    *shared[a as usize].entry(b).or_insert(0) += 1;
                    *shared[b as usize].entry(a).or_insert(0) += 1;
                }
            };
            if x + 1 < width {
                touch(i + 1);
            }
            if y + 1 < height {
                touch(i + width);
            }
        }
    }

    let mut resolved: Vec<Option<u32>> = vec![None; n];
    for (&label, &c) in &keeper {
        resolved[c as usize] = Some(label);
    }

    let mut pending: Vec<usize> = (0..n).filter(|&c| resolved[c].is_none()).collect();
    let fragments = pending.len();
    while !pending.is_empty() {
        let before = pending.len();
        pending.retain(|&c| {
            let mut best: Option<(usize, u32)> = None;
            for (&other, &len) in &shared[c] {
                if resolved[other as usize].is_none() {
                    continue;
                }
                // BTreeMap iterates ids ascending, so strict > keeps the lowest on ties
                if best.is_none_or(|(best_len, _)| len > best_len) {
                    best = Some((len, other));
                }
            }
            match best {
                Some((_, other)) => {
                    resolved[c] = resolved[other as usize];
                    false
                }
                None => true,
            }
        });
        // The component graph is connected and every label has a keeper
        if pending.len() == before {
            break;
        }
    }
    tracing::trace!(components = n, fragments, "connectivity enforced");

    comps
        .ids
        .iter()
        .map(|&c| resolved[c as usize].unwrap_or(comps.labels[c as usize]))
        .collect()
}

/// Merge adjacent segments whose mean colors are close.
///
/// Two 4-adjacent segments are joined when the Euclidean distance between
/// their rounded mean colors is at most `threshold`. Joins are transitive
/// and use the means of the unmerged segments. Merged segments remain
/// 4-connected since only adjacent segments are joined.
pub(crate) fn merge_similar(
    image: &RgbImage,
    label_map: &LabelMap,
    threshold: f32,
) -> SuperpixelResult<LabelMap> {
    let stats = segment_stats(image, label_map)?;
    let limit = threshold * threshold;
    let (width, height) = label_map.dimensions();
    let (w, h) = (width as usize, height as usize);
    let labels = label_map.labels();

    let mut sets = DisjointSet::new(stats.len());
    for y in 0..h {
        for x in 0..w {
            let a = labels[y * w + x];
            let mut consider = |b: u32| {
                if a != b
                    && stats[a as usize]
                        .mean
                        .distance_squared(stats[b as usize].mean) as f32
                        <= limit
                {
                    sets.union(a, b);
                }
            };
            if x + 1 < w {
                consider(labels[y * w + x + 1]);
            }
            if y + 1 < h {
                consider(labels[(y + 1) * w + x]);
            }
        }
    }

    let merged: Vec<u32> = labels.iter().map(|&l| sets.find(l)).collect();
    let result = LabelMap::from_sparse(width, height, &merged)?;
    tracing::trace!(
        before = label_map.segment_count(),
        after = result.segment_count(),
        threshold,
        "merged similar segments"
    );
    Ok(result)
}

/// Union-find over segment labels; the smaller root wins.
struct DisjointSet {
    parent: Vec<u32>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grand = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grand;
            x = grand;
        }
        x
    }

    fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra < rb {
            self.parent[rb as usize] = ra;
        } else if rb < ra {
            self.parent[ra as usize] = rb;
        }
    }
}
