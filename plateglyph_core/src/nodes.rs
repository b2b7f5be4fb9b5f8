// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Creation and teardown of the overlay image nodes.
//!
//! Each slot gets two nodes. The primary is linked right after the host's own
//! icon so it draws in the same layer; the secondary is appended to the name
//! container so it moves with the text. Both are looked up by node id first,
//! which makes creation idempotent across widget reloads.

use alloc::vec::Vec;

use kurbo::Size;

use crate::error::NodeError;
use crate::host::{HostWidgets, ImageSetup, NodeFlags, NodeHandle, SlotTree};
use crate::slot::CAPACITY;
use crate::state::{OverlayNode, SlotState};

/// Node id of the primary overlay.
pub const PRIMARY_NODE_ID: u32 = 8004;
/// Node id of the secondary overlay.
pub const SECONDARY_NODE_ID: u32 = 8005;
/// Node id of the host icon the primary is linked after.
pub const HOST_ICON_NODE_ID: u32 = 4;
/// Node id of the host name text, which must exist before the secondary is
/// appended next to it.
pub const NAME_TEXT_NODE_ID: u32 = 3;
/// Icon bound to new nodes until the first layout.
pub const PLACEHOLDER_ICON_ID: u32 = 60071;

const OVERLAY_IMAGE: ImageSetup = ImageSetup {
    part: Size::new(32.0, 32.0),
    wrap_mode: 1,
    auto_fit: true,
};

/// Creates and destroys overlay nodes.
#[derive(Clone, Copy, Debug, Default)]
pub struct NodeLifecycleManager;

impl NodeLifecycleManager {
    /// Finds or creates both overlay nodes for every slot.
    ///
    /// Returns `Ok(None)` if the widget is unavailable or any slot's component
    /// has not finished loading; nothing is created in that case and the pass
    /// should be retried next frame.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError`] if a slot's handles cannot be resolved, a link
    /// target is missing, or the host rejects an operation.
    pub fn create_all(&self, widgets: &mut dyn HostWidgets) -> Result<Option<Vec<SlotState>>, NodeError> {
        if !widgets.is_available() {
            return Ok(None);
        }
        let mut trees = Vec::with_capacity(CAPACITY);
        for slot in 0..CAPACITY {
            let tree = widgets.slot_tree(slot).ok_or(NodeError::MissingTree { slot })?;
            if !widgets.component_loaded(tree.component) {
                tracing::debug!(slot, "plate component not loaded yet");
                return Ok(None);
            }
            trees.push(tree);
        }

        let mut states = Vec::with_capacity(CAPACITY);
        for (slot, tree) in trees.into_iter().enumerate() {
            let primary = self.ensure_primary(widgets, slot, &tree)?;
            let secondary = self.ensure_secondary(widgets, slot, &tree)?;
            states.push(SlotState::new(slot, tree, primary, secondary));
        }
        Ok(Some(states))
    }

    fn ensure_primary(
        &self,
        widgets: &mut dyn HostWidgets,
        slot: usize,
        tree: &SlotTree,
    ) -> Result<OverlayNode, NodeError> {
        if let Some(existing) = widgets.find_node(tree.component, PRIMARY_NODE_ID) {
            return Ok(OverlayNode::new(existing, PRIMARY_NODE_ID));
        }
        let target = widgets
            .find_node(tree.component, HOST_ICON_NODE_ID)
            .ok_or(NodeError::MissingLinkTarget {
                slot,
                node_id: PRIMARY_NODE_ID,
                target_id: HOST_ICON_NODE_ID,
            })?;
        let node = create(widgets, slot, PRIMARY_NODE_ID)?;
        if let Err(source) = widgets.link_after(tree.component, node, target) {
            discard(widgets, tree.component, node);
            return Err(NodeError::Host { slot, source });
        }
        Ok(OverlayNode::new(node, PRIMARY_NODE_ID))
    }

    fn ensure_secondary(
        &self,
        widgets: &mut dyn HostWidgets,
        slot: usize,
        tree: &SlotTree,
    ) -> Result<OverlayNode, NodeError> {
        if let Some(existing) = widgets.find_node(tree.component, SECONDARY_NODE_ID) {
            return Ok(OverlayNode::new(existing, SECONDARY_NODE_ID));
        }
        if widgets.find_node(tree.component, NAME_TEXT_NODE_ID).is_none() {
            return Err(NodeError::MissingLinkTarget {
                slot,
                node_id: SECONDARY_NODE_ID,
                target_id: NAME_TEXT_NODE_ID,
            });
        }
        let node = create(widgets, slot, SECONDARY_NODE_ID)?;
        if let Err(source) = widgets.link_at_end(tree.component, node, tree.name_container) {
            discard(widgets, tree.component, node);
            return Err(NodeError::Host { slot, source });
        }
        Ok(OverlayNode::new(node, SECONDARY_NODE_ID))
    }

    /// Releases every overlay node.
    ///
    /// Consumes `states`, then sweeps every slot for overlay node ids that
    /// are still linked, which also catches nodes left by a pass that failed
    /// halfway. Missing pieces are skipped, so calling this again is a no-op.
    /// Returns the number of nodes freed.
    pub fn teardown(&self, widgets: &mut dyn HostWidgets, states: Vec<SlotState>) -> u32 {
        let mut freed = 0;
        for state in states {
            let (tree, nodes) = state.into_nodes();
            for node in nodes {
                freed += u32::from(free_by_id(widgets, tree.component, node.node_id()));
            }
        }
        if !widgets.is_available() {
            return freed;
        }
        for slot in 0..CAPACITY {
            let Some(tree) = widgets.slot_tree(slot) else {
                continue;
            };
            for node_id in [PRIMARY_NODE_ID, SECONDARY_NODE_ID] {
                freed += u32::from(free_by_id(widgets, tree.component, node_id));
            }
        }
        freed
    }
}

fn create(widgets: &mut dyn HostWidgets, slot: usize, node_id: u32) -> Result<NodeHandle, NodeError> {
    let node = widgets
        .create_image_node(node_id, OVERLAY_IMAGE)
        .map_err(|source| NodeError::Host { slot, source })?;
    widgets.set_flags(node, NodeFlags::OVERLAY_DEFAULT);
    widgets.load_icon(node, PLACEHOLDER_ICON_ID);
    Ok(node)
}

fn discard(widgets: &mut dyn HostWidgets, component: NodeHandle, node: NodeHandle) {
    if let Err(err) = widgets.unlink_and_free(component, node) {
        tracing::debug!(?node, %err, "could not free unlinked overlay node");
    }
}

fn free_by_id(widgets: &mut dyn HostWidgets, component: NodeHandle, node_id: u32) -> bool {
    let Some(node) = widgets.find_node(component, node_id) else {
        return false;
    };
    match widgets.unlink_and_free(component, node) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(node_id, %err, "overlay node already gone");
            false
        }
    }
}
