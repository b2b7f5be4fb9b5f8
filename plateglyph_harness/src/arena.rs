// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node tree standing in for the host's widget tree.
//!
//! Nodes are addressed by [`NodeHandle`]s that pack a slot index and a
//! generation counter. Freed slots are recycled through a free list, and the
//! generation bump makes old handles fail to resolve.

use alloc::vec::Vec;

use kurbo::{Point, Size, Vec2};
use plateglyph_core::error::HostError;
use plateglyph_core::host::{NodeFlags, NodeHandle};

/// Sentinel for "no node" in index fields.
pub const INVALID: u32 = u32::MAX;

/// Arena-backed node tree.
#[derive(Debug, Default)]
pub struct NodeArena {
    // -- Topology --
    parent: Vec<u32>,
    first_child: Vec<u32>,
    next_sibling: Vec<u32>,
    prev_sibling: Vec<u32>,

    // -- Properties --
    node_id: Vec<u32>,
    flags: Vec<NodeFlags>,
    scale: Vec<Vec2>,
    origin: Vec<Point>,
    position: Vec<Point>,
    size: Vec<Size>,
    icon: Vec<Option<u32>>,

    // -- Allocation --
    generation: Vec<u32>,
    live: Vec<bool>,
    free_list: Vec<u32>,
}

impl NodeArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an unlinked node.
    pub fn create(&mut self, node_id: u32, size: Size) -> NodeHandle {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.node_id[i] = node_id;
            self.flags[i] = NodeFlags::empty();
            self.scale[i] = Vec2::new(1.0, 1.0);
            self.origin[i] = Point::ZERO;
            self.position[i] = Point::ZERO;
            self.size[i] = size;
            self.icon[i] = None;
            self.live[i] = true;
            idx
        } else {
            let idx = u32::try_from(self.parent.len()).unwrap_or(INVALID);
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.node_id.push(node_id);
            self.flags.push(NodeFlags::empty());
            self.scale.push(Vec2::new(1.0, 1.0));
            self.origin.push(Point::ZERO);
            self.position.push(Point::ZERO);
            self.size.push(size);
            self.icon.push(None);
            self.generation.push(0);
            self.live.push(true);
            idx
        };
        handle(idx, self.generation[idx as usize])
    }

    /// Resolves a handle to its slot index, or `None` if it is stale.
    #[must_use]
    pub fn resolve(&self, node: NodeHandle) -> Option<usize> {
        let (idx, generation) = unpack(node);
        let i = idx as usize;
        (i < self.live.len() && self.live[i] && self.generation[i] == generation).then_some(i)
    }

    /// Returns whether the handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, node: NodeHandle) -> bool {
        self.resolve(node).is_some()
    }

    fn live_index(&self, node: NodeHandle) -> Result<usize, HostError> {
        self.resolve(node).ok_or(HostError::StaleNode(node))
    }

    fn handle_at(&self, i: u32) -> NodeHandle {
        handle(i, self.generation[i as usize])
    }

    /// Number of live nodes.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.iter().filter(|&&l| l).count()
    }

    /// Number of live nodes carrying `node_id`.
    #[must_use]
    pub fn count_with_id(&self, node_id: u32) -> usize {
        (0..self.live.len())
            .filter(|&i| self.live[i] && self.node_id[i] == node_id)
            .count()
    }

    // -- Topology --

    /// Appends `child` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// [`HostError::StaleNode`] for dead handles and
    /// [`HostError::AlreadyLinked`] if `child` has a parent.
    pub fn append(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), HostError> {
        let p = self.live_index(parent)?;
        let c = self.live_index(child)?;
        if self.parent[c] != INVALID {
            return Err(HostError::AlreadyLinked(child));
        }
        let (p32, c32) = (as_u32(p), as_u32(c));
        self.parent[c] = p32;
        self.next_sibling[c] = INVALID;
        self.prev_sibling[c] = INVALID;
        if self.first_child[p] == INVALID {
            self.first_child[p] = c32;
        } else {
            let mut last = self.first_child[p];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c32;
            self.prev_sibling[c] = last;
        }
        Ok(())
    }

    /// Inserts `child` immediately after `sibling`, under the same parent.
    ///
    /// # Errors
    ///
    /// [`HostError::StaleNode`] for dead handles or a parentless `sibling`,
    /// and [`HostError::AlreadyLinked`] if `child` has a parent.
    pub fn insert_after(&mut self, sibling: NodeHandle, child: NodeHandle) -> Result<(), HostError> {
        let s = self.live_index(sibling)?;
        let c = self.live_index(child)?;
        if self.parent[c] != INVALID {
            return Err(HostError::AlreadyLinked(child));
        }
        let p = self.parent[s];
        if p == INVALID {
            return Err(HostError::StaleNode(sibling));
        }
        let c32 = as_u32(c);
        let next = self.next_sibling[s];
        self.parent[c] = p;
        self.prev_sibling[c] = as_u32(s);
        self.next_sibling[c] = next;
        if next != INVALID {
            self.prev_sibling[next as usize] = c32;
        }
        self.next_sibling[s] = c32;
        Ok(())
    }

    fn unlink_from_parent(&mut self, c: usize) {
        let p = self.parent[c];
        if p == INVALID {
            return;
        }
        let prev = self.prev_sibling[c];
        let next = self.next_sibling[c];
        if prev == INVALID {
            self.first_child[p as usize] = next;
        } else {
            self.next_sibling[prev as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }
        self.parent[c] = INVALID;
        self.next_sibling[c] = INVALID;
        self.prev_sibling[c] = INVALID;
    }

    /// Unlinks `node` from its parent (if any) and frees it with its subtree.
    ///
    /// # Errors
    ///
    /// [`HostError::StaleNode`] if the handle is dead.
    pub fn unlink_and_free(&mut self, node: NodeHandle) -> Result<(), HostError> {
        let i = self.live_index(node)?;
        self.unlink_from_parent(i);
        self.free_subtree(as_u32(i));
        Ok(())
    }

    fn free_subtree(&mut self, root: u32) {
        let mut stack = Vec::from([root]);
        while let Some(i) = stack.pop() {
            let mut child = self.first_child[i as usize];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
            let i = i as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.live[i] = false;
            self.generation[i] += 1;
            self.free_list.push(as_u32(i));
        }
    }

    /// Parent of `node`, if linked.
    #[must_use]
    pub fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        let i = self.resolve(node)?;
        let p = self.parent[i];
        (p != INVALID).then(|| self.handle_at(p))
    }

    /// Direct children of `node`, in sibling order.
    #[must_use]
    pub fn children(&self, node: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let Some(i) = self.resolve(node) else {
            return out;
        };
        let mut child = self.first_child[i];
        while child != INVALID {
            out.push(self.handle_at(child));
            child = self.next_sibling[child as usize];
        }
        out
    }

    /// Depth-first search for `node_id` below (and including) `root`.
    #[must_use]
    pub fn find(&self, root: NodeHandle, node_id: u32) -> Option<NodeHandle> {
        let root = as_u32(self.resolve(root)?);
        let mut stack = Vec::from([root]);
        while let Some(i) = stack.pop() {
            if self.node_id[i as usize] == node_id {
                return Some(self.handle_at(i));
            }
            let mut child = self.first_child[i as usize];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
        }
        None
    }

    // -- Properties --

    /// Node id, or 0 for stale handles.
    #[must_use]
    pub fn node_id(&self, node: NodeHandle) -> u32 {
        self.resolve(node).map_or(0, |i| self.node_id[i])
    }

    /// Flags.
    #[must_use]
    pub fn flags(&self, node: NodeHandle) -> NodeFlags {
        self.resolve(node).map_or(NodeFlags::empty(), |i| self.flags[i])
    }

    /// Sets flags.
    pub fn set_flags(&mut self, node: NodeHandle, flags: NodeFlags) {
        if let Some(i) = self.resolve(node) {
            self.flags[i] = flags;
        }
    }

    /// Scale.
    #[must_use]
    pub fn scale(&self, node: NodeHandle) -> Vec2 {
        self.resolve(node).map_or(Vec2::new(1.0, 1.0), |i| self.scale[i])
    }

    /// Sets scale.
    pub fn set_scale(&mut self, node: NodeHandle, scale: Vec2) {
        if let Some(i) = self.resolve(node) {
            self.scale[i] = scale;
        }
    }

    /// Origin.
    #[must_use]
    pub fn origin(&self, node: NodeHandle) -> Point {
        self.resolve(node).map_or(Point::ZERO, |i| self.origin[i])
    }

    /// Sets origin.
    pub fn set_origin(&mut self, node: NodeHandle, origin: Point) {
        if let Some(i) = self.resolve(node) {
            self.origin[i] = origin;
        }
    }

    /// Position.
    #[must_use]
    pub fn position(&self, node: NodeHandle) -> Point {
        self.resolve(node).map_or(Point::ZERO, |i| self.position[i])
    }

    /// Sets position.
    pub fn set_position(&mut self, node: NodeHandle, position: Point) {
        if let Some(i) = self.resolve(node) {
            self.position[i] = position;
        }
    }

    /// Size.
    #[must_use]
    pub fn size(&self, node: NodeHandle) -> Size {
        self.resolve(node).map_or(Size::ZERO, |i| self.size[i])
    }

    /// Bound icon texture.
    #[must_use]
    pub fn icon(&self, node: NodeHandle) -> Option<u32> {
        self.resolve(node).and_then(|i| self.icon[i])
    }

    /// Binds an icon texture.
    pub fn set_icon(&mut self, node: NodeHandle, icon_id: u32) {
        if let Some(i) = self.resolve(node) {
            self.icon[i] = Some(icon_id);
        }
    }
}

fn handle(idx: u32, generation: u32) -> NodeHandle {
    NodeHandle::from_raw((u64::from(generation) << 32) | u64::from(idx))
}

fn unpack(node: NodeHandle) -> (u32, u32) {
    let raw = node.raw();
    ((raw & 0xFFFF_FFFF) as u32, (raw >> 32) as u32)
}

fn as_u32(i: usize) -> u32 {
    u32::try_from(i).unwrap_or(INVALID)
}
