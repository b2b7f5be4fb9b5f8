// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-slot overlay state.
//!
//! A [`SlotState`] exists from node creation until widget teardown and owns
//! the slot's two [`OverlayNode`]s. Nodes are not `Clone`; the only way to
//! release them is [`NodeLifecycleManager::teardown`], which consumes the
//! states.
//!
//! [`NodeLifecycleManager::teardown`]: crate::nodes::NodeLifecycleManager::teardown

use kurbo::{Point, Vec2};

use crate::host::{HostWidgets, NodeFlags, NodeHandle, SlotTree, set_visible};
use crate::layout::{NodePlacement, OverlayLayout};
use crate::policy::DisplayDecision;

/// Name text scale the host uses when left alone.
pub const DEFAULT_NAME_SCALE: f64 = 0.5;

/// An image node the engine injected into the host tree.
#[derive(Debug, PartialEq, Eq)]
pub struct OverlayNode {
    handle: NodeHandle,
    node_id: u32,
}

impl OverlayNode {
    pub(crate) fn new(handle: NodeHandle, node_id: u32) -> Self {
        Self { handle, node_id }
    }

    /// Host handle.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    /// Node id within the component's node list.
    #[inline]
    #[must_use]
    pub fn node_id(&self) -> u32 {
        self.node_id
    }
}

/// Overlay bookkeeping for one slot.
#[derive(Debug)]
pub struct SlotState {
    slot: usize,
    tree: SlotTree,
    primary: OverlayNode,
    secondary: OverlayNode,
    is_modified: bool,
    is_global_scale_modified: bool,
    pending: Option<DisplayDecision>,
    release_requested: bool,
    use_primary: bool,
    use_secondary: bool,
    collision_scale: f64,
    needs_collision_fix: bool,
}

impl SlotState {
    pub(crate) fn new(slot: usize, tree: SlotTree, primary: OverlayNode, secondary: OverlayNode) -> Self {
        Self {
            slot,
            tree,
            primary,
            secondary,
            is_modified: false,
            is_global_scale_modified: false,
            pending: None,
            release_requested: false,
            use_primary: false,
            use_secondary: false,
            collision_scale: 1.0,
            needs_collision_fix: false,
        }
    }

    /// Slot index.
    #[inline]
    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Host handles resolved when the nodes were created.
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &SlotTree {
        &self.tree
    }

    /// Primary overlay node.
    #[must_use]
    pub fn primary(&self) -> &OverlayNode {
        &self.primary
    }

    /// Secondary overlay node.
    #[must_use]
    pub fn secondary(&self) -> &OverlayNode {
        &self.secondary
    }

    /// Whether the engine has touched this slot since its last reset.
    #[inline]
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Whether the name container is currently rescaled.
    #[must_use]
    pub fn is_global_scale_modified(&self) -> bool {
        self.is_global_scale_modified
    }

    /// Decision waiting for the draw phase.
    #[must_use]
    pub fn pending(&self) -> Option<&DisplayDecision> {
        self.pending.as_ref()
    }

    /// Whether the draw phase should reset this slot.
    #[must_use]
    pub fn release_requested(&self) -> bool {
        self.release_requested
    }

    /// Which overlay nodes the engine is currently driving.
    #[must_use]
    pub fn driven(&self) -> (bool, bool) {
        (self.use_primary, self.use_secondary)
    }

    /// Current collision multiplier.
    #[must_use]
    pub fn collision_scale(&self) -> f64 {
        self.collision_scale
    }

    /// Whether the collision region still has to be refitted.
    #[must_use]
    pub fn needs_collision_fix(&self) -> bool {
        self.needs_collision_fix
    }

    /// Stores a decision for the draw phase and marks the slot modified.
    pub fn set_pending(&mut self, decision: DisplayDecision) {
        self.pending = Some(decision);
        self.is_modified = true;
        self.release_requested = false;
    }

    /// Asks the draw phase to reset the slot. Returns `false`, doing
    /// nothing, for slots the engine has not touched.
    pub fn request_release(&mut self) -> bool {
        if !self.is_modified {
            return false;
        }
        self.pending = None;
        self.release_requested = true;
        true
    }

    pub(crate) fn take_pending(&mut self) -> Option<DisplayDecision> {
        self.pending.take()
    }

    /// Applies computed geometry to the host nodes.
    pub fn apply_layout(&mut self, widgets: &mut dyn HostWidgets, layout: &OverlayLayout) {
        let tree = self.tree;
        match layout.container {
            Some(container) => {
                widgets.set_origin(tree.name_container, container.origin);
                widgets.set_scale(tree.name_container, uniform(container.scale));
                self.is_global_scale_modified = true;
            }
            None => self.restore_container(widgets),
        }
        widgets.set_scale(tree.name_text, uniform(layout.name_scale));

        self.use_primary = place(widgets, self.primary.handle, layout.primary.as_ref());
        self.use_secondary = place(widgets, self.secondary.handle, layout.secondary.as_ref());

        self.collision_scale = layout.collision_scale;
        self.needs_collision_fix = true;
    }

    /// Copies visibility and depth sorting from the host's name text onto
    /// the driven overlay nodes.
    pub fn mirror_name_flags(&self, widgets: &mut dyn HostWidgets) {
        let source = widgets.flags(self.tree.name_text);
        for (driven, node) in [
            (self.use_primary, self.primary.handle),
            (self.use_secondary, self.secondary.handle),
        ] {
            if driven {
                let flags = widgets.flags(node).mirror(source, NodeFlags::MIRRORED);
                widgets.set_flags(node, flags);
            }
        }
    }

    /// Refits the collision region to the current name and container scale.
    /// Returns whether anything was done.
    pub fn fix_collision(&mut self, widgets: &mut dyn HostWidgets) -> bool {
        if !self.needs_collision_fix {
            return false;
        }
        let tree = self.tree;
        let name = widgets.scale(tree.name_text).x;
        let container = widgets.scale(tree.name_container).x;
        let size = widgets.size(tree.collision);
        widgets.set_origin(tree.collision, Point::new(size.width / 2.0, size.height));
        widgets.set_scale(
            tree.collision,
            uniform(name * 2.0 * container * self.collision_scale),
        );
        self.needs_collision_fix = false;
        true
    }

    /// Returns the slot's nodes to host defaults and clears every flag.
    pub fn reset(&mut self, widgets: &mut dyn HostWidgets) {
        let tree = self.tree;
        self.restore_container(widgets);
        set_visible(widgets, self.primary.handle, false);
        set_visible(widgets, self.secondary.handle, false);
        widgets.set_scale(tree.name_text, uniform(DEFAULT_NAME_SCALE));
        widgets.set_origin(tree.collision, Point::ZERO);
        widgets.set_scale(tree.collision, uniform(1.0));

        self.is_modified = false;
        self.pending = None;
        self.release_requested = false;
        self.use_primary = false;
        self.use_secondary = false;
        self.collision_scale = 1.0;
        self.needs_collision_fix = false;
    }

    fn restore_container(&mut self, widgets: &mut dyn HostWidgets) {
        if self.is_global_scale_modified {
            widgets.set_origin(self.tree.name_container, Point::ZERO);
            widgets.set_scale(self.tree.name_container, uniform(1.0));
            self.is_global_scale_modified = false;
        }
    }

    pub(crate) fn into_nodes(self) -> (SlotTree, [OverlayNode; 2]) {
        (self.tree, [self.primary, self.secondary])
    }
}

fn uniform(scale: f64) -> Vec2 {
    Vec2::new(scale, scale)
}

fn place(widgets: &mut dyn HostWidgets, node: NodeHandle, placement: Option<&NodePlacement>) -> bool {
    let Some(p) = placement else {
        set_visible(widgets, node, false);
        return false;
    };
    widgets.load_icon(node, p.icon_id);
    widgets.set_origin(node, p.origin);
    widgets.set_scale(node, uniform(p.scale));
    widgets.set_position(node, p.position);
    set_visible(widgets, node, true);
    true
}
