//! Region tree - arena storage for quadtree segmentations
//!
//! A [`RegionTree`] owns every [`Region`] created while splitting a region
//! of interest. Regions refer to each other by [`RegionId`] (an index into
//! the arena), so building and merging never copy subtrees.
//!
//! Each region is either a leaf (no children, label defined) or an internal
//! node with exactly four children ordered top-left, top-right, bottom-left,
//! bottom-right. Merging widens one leaf to cover its sibling and marks the
//! sibling as merged; merged regions stay in the arena but are no longer
//! valid and are skipped by [`RegionTree::valid_leaves`].

use crate::error::{RegionError, RegionResult};
use quadseg_core::{MAX_CHANNELS, Rect, RegionStats};
use std::fmt;
use std::ops::Index;

/// Index of a region inside its [`RegionTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(usize);

impl RegionId {
    pub(crate) const fn new(index: usize) -> Self {
        RegionId(index)
    }

    /// Position of the region in the arena
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Aggregate value of a leaf region: the per-channel mean
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Label {
    channels: u32,
    values: [f64; MAX_CHANNELS],
}

impl Label {
    /// Take the per-channel means of a statistics record
    pub fn from_stats(stats: &RegionStats) -> Self {
        Self::from_values(stats.means())
    }

    /// Build a label from explicit channel values
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty or longer than `MAX_CHANNELS`.
    pub fn from_values(values: &[f64]) -> Self {
        assert!(
            !values.is_empty() && values.len() <= MAX_CHANNELS,
            "label must have 1..={} channels",
            MAX_CHANNELS
        );
        let mut v = [0.0f64; MAX_CHANNELS];
        v[..values.len()].copy_from_slice(values);
        Label {
            channels: values.len() as u32,
            values: v,
        }
    }

    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Value of one channel (0.0 if the channel does not exist)
    #[inline]
    pub fn value(&self, channel: u32) -> f64 {
        if channel < self.channels {
            self.values[channel as usize]
        } else {
            0.0
        }
    }

    /// Values of all channels
    pub fn values(&self) -> &[f64] {
        &self.values[..self.channels as usize]
    }
}

/// A node of the region quadtree
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    rect: Rect,
    label: Option<Label>,
    children: Option<[RegionId; 4]>,
    parent: Option<RegionId>,
    depth: u32,
    merged_into: Option<RegionId>,
}

impl Region {
    fn new(rect: Rect, parent: Option<RegionId>, depth: u32) -> Self {
        Region {
            rect,
            label: None,
            children: None,
            parent,
            depth,
            merged_into: None,
        }
    }

    /// Bounds in field coordinates
    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Per-channel mean; `None` for internal regions
    #[inline]
    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    /// Children ordered top-left, top-right, bottom-left, bottom-right
    #[inline]
    pub fn children(&self) -> Option<&[RegionId; 4]> {
        self.children.as_ref()
    }

    #[inline]
    pub fn parent(&self) -> Option<RegionId> {
        self.parent
    }

    /// Distance from the root (the root has depth 0)
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The sibling this region was merged into, if any
    #[inline]
    pub fn merged_into(&self) -> Option<RegionId> {
        self.merged_into
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    #[inline]
    pub fn is_internal(&self) -> bool {
        self.children.is_some()
    }

    /// Whether the region is still live (not merged into a sibling)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.merged_into.is_none()
    }
}

/// Arena of regions produced by splitting one region of interest
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTree {
    roi: Rect,
    channels: u32,
    nodes: Vec<Region>,
}

impl RegionTree {
    /// Create a tree holding a single unlabeled root region over `roi`
    pub(crate) fn with_root(roi: Rect, channels: u32) -> Self {
        RegionTree {
            roi,
            channels,
            nodes: vec![Region::new(roi, None, 0)],
        }
    }

    /// Rebuild a tree from raw nodes; used by deserialization
    pub(crate) fn from_parts(roi: Rect, channels: u32, nodes: Vec<RegionRaw>) -> RegionResult<Self> {
        let mut tree = RegionTree {
            roi,
            channels,
            nodes: Vec::with_capacity(nodes.len()),
        };
        for raw in &nodes {
            tree.nodes.push(Region {
                rect: raw.rect,
                label: raw.label,
                children: raw.children,
                parent: None,
                depth: 0,
                merged_into: raw.merged_into,
            });
        }
        // Parents and depths follow from the child links
        let mut stack = vec![(tree.root(), 0u32)];
        let mut seen = vec![false; tree.nodes.len()];
        while let Some((id, depth)) = stack.pop() {
            let idx = tree.checked(id)?;
            if seen[idx] {
                return Err(RegionError::InvalidTree(format!(
                    "region {} reachable twice",
                    id
                )));
            }
            seen[idx] = true;
            tree.nodes[idx].depth = depth;
            if let Some(children) = tree.nodes[idx].children {
                for child in children {
                    let cidx = tree.checked(child)?;
                    tree.nodes[cidx].parent = Some(id);
                    stack.push((child, depth + 1));
                }
            }
        }
        if let Some(orphan) = seen.iter().position(|s| !s) {
            return Err(RegionError::InvalidTree(format!(
                "region {} is not reachable from the root",
                orphan
            )));
        }
        tree.validate()?;
        Ok(tree)
    }

    /// Append four children to `parent` and return their ids
    pub(crate) fn push_children(&mut self, parent: RegionId, rects: [Rect; 4]) -> [RegionId; 4] {
        let depth = self.nodes[parent.0].depth + 1;
        let base = self.nodes.len();
        for rect in rects {
            self.nodes.push(Region::new(rect, Some(parent), depth));
        }
        let ids = [
            RegionId(base),
            RegionId(base + 1),
            RegionId(base + 2),
            RegionId(base + 3),
        ];
        let node = &mut self.nodes[parent.0];
        node.children = Some(ids);
        node.label = None;
        ids
    }

    pub(crate) fn set_label(&mut self, id: RegionId, label: Label) {
        self.nodes[id.0].label = Some(label);
    }

    /// Widen `keep` to `union` and mark `absorbed` as merged into it
    pub(crate) fn absorb(&mut self, keep: RegionId, absorbed: RegionId, union: Rect, label: Label) {
        let node = &mut self.nodes[keep.0];
        node.rect = union;
        node.label = Some(label);
        self.nodes[absorbed.0].merged_into = Some(keep);
    }

    pub(crate) fn checked(&self, id: RegionId) -> RegionResult<usize> {
        if id.0 < self.nodes.len() {
            Ok(id.0)
        } else {
            Err(RegionError::InvalidRegion(id))
        }
    }

    /// The segmented region of interest
    #[inline]
    pub fn roi(&self) -> Rect {
        self.roi
    }

    /// Channel count of the field the tree was built from
    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Id of the root region
    #[inline]
    pub fn root(&self) -> RegionId {
        RegionId(0)
    }

    /// Total number of regions, including internal and merged ones
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a region
    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.nodes.get(id.0)
    }

    /// Iterate over all regions in arena order
    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &Region)> {
        self.nodes.iter().enumerate().map(|(i, r)| (RegionId(i), r))
    }

    /// Iterate over all leaves, valid or not, depth first in
    /// top-left, top-right, bottom-left, bottom-right order
    pub fn leaves(&self) -> Leaves<'_> {
        self.leaves_from(self.root())
    }

    /// Iterate over the leaves of the subtree rooted at `id`
    pub fn leaves_from(&self, id: RegionId) -> Leaves<'_> {
        let stack = if id.0 < self.nodes.len() {
            vec![id]
        } else {
            Vec::new()
        };
        Leaves { tree: self, stack }
    }

    /// Iterate over the leaves that have not been merged away
    pub fn valid_leaves(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.leaves().filter(|&id| self.nodes[id.0].is_valid())
    }

    /// Number of leaves, valid or not
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|r| r.is_leaf()).count()
    }

    /// Number of valid leaves
    pub fn valid_leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|r| r.is_leaf() && r.is_valid())
            .count()
    }

    /// Depth of the deepest region
    pub fn max_depth(&self) -> u32 {
        self.nodes.iter().map(|r| r.depth).max().unwrap_or(0)
    }

    /// Label every cell of the region of interest with the 1-based ordinal
    /// of the valid leaf covering it (ordinals follow [`Self::valid_leaves`])
    ///
    /// The result is row-major with `roi.w * roi.h` entries.
    pub fn label_map(&self) -> Vec<u32> {
        let w = self.roi.w as usize;
        let mut labels = vec![0u32; w * self.roi.h as usize];
        for (ordinal, id) in self.valid_leaves().enumerate() {
            let r = self.nodes[id.0].rect;
            let x0 = (r.x - self.roi.x) as usize;
            let y0 = (r.y - self.roi.y) as usize;
            for y in y0..y0 + r.h as usize {
                labels[y * w + x0..y * w + x0 + r.w as usize].fill(ordinal as u32 + 1);
            }
        }
        labels
    }

    /// Check the structural invariants of the tree
    ///
    /// - the root covers the region of interest and has no parent
    /// - leaves carry a label, internal regions do not
    /// - the live children of an internal region tile it exactly
    /// - a merged region points at a valid sibling leaf that contains it
    pub fn validate(&self) -> RegionResult<()> {
        let root = &self.nodes[0];
        if root.rect != self.roi || root.parent.is_some() || root.merged_into.is_some() {
            return Err(RegionError::InvalidTree(format!(
                "root {} does not match region of interest {}",
                root.rect, self.roi
            )));
        }

        for (id, region) in self.iter() {
            match region.children {
                None => {
                    if region.label.is_none() {
                        return Err(RegionError::InvalidTree(format!(
                            "leaf {} has no label",
                            id
                        )));
                    }
                }
                Some(children) => {
                    if region.label.is_some() {
                        return Err(RegionError::InvalidTree(format!(
                            "internal region {} has a label",
                            id
                        )));
                    }
                    self.validate_children(id, region, &children)?;
                }
            }

            if let Some(target) = region.merged_into {
                let idx = self.checked(target)?;
                let keeper = &self.nodes[idx];
                if !region.is_leaf()
                    || !keeper.is_leaf()
                    || !keeper.is_valid()
                    || keeper.parent != region.parent
                    || !keeper.rect.contains_rect(&region.rect)
                {
                    return Err(RegionError::InvalidTree(format!(
                        "region {} is merged into {} which does not absorb it",
                        id, target
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_children(
        &self,
        id: RegionId,
        region: &Region,
        children: &[RegionId; 4],
    ) -> RegionResult<()> {
        let mut live: Vec<Rect> = Vec::with_capacity(4);
        for &child in children {
            let idx = self.checked(child)?;
            let c = &self.nodes[idx];
            if c.parent != Some(id) || c.depth != region.depth + 1 {
                return Err(RegionError::InvalidTree(format!(
                    "region {} has inconsistent parent link to {}",
                    child, id
                )));
            }
            if c.is_valid() {
                live.push(c.rect);
            }
        }

        let area: u64 = live.iter().map(|r| r.area()).sum();
        let inside = live.iter().all(|r| region.rect.contains_rect(r));
        let disjoint = live
            .iter()
            .enumerate()
            .all(|(i, a)| live[i + 1..].iter().all(|b| !a.overlaps(b)));
        if area != region.rect.area() || !inside || !disjoint {
            return Err(RegionError::InvalidTree(format!(
                "children of region {} do not tile {}",
                id, region.rect
            )));
        }
        Ok(())
    }
}

impl Index<RegionId> for RegionTree {
    type Output = Region;

    fn index(&self, id: RegionId) -> &Region {
        &self.nodes[id.0]
    }
}

/// Raw node description used to rebuild a tree
#[derive(Debug, Clone)]
pub(crate) struct RegionRaw {
    pub rect: Rect,
    pub label: Option<Label>,
    pub children: Option<[RegionId; 4]>,
    pub merged_into: Option<RegionId>,
}

/// Depth-first iterator over the leaves of a [`RegionTree`]
pub struct Leaves<'a> {
    tree: &'a RegionTree,
    stack: Vec<RegionId>,
}

impl Iterator for Leaves<'_> {
    type Item = RegionId;

    fn next(&mut self) -> Option<RegionId> {
        while let Some(id) = self.stack.pop() {
            match self.tree.nodes[id.0].children {
                Some(children) => self.stack.extend(children.iter().rev()),
                None => return Some(id),
            }
        }
        None
    }
}
