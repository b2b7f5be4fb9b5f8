// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The contract a host adapter implements.
//!
//! The engine never owns nameplate data. Each frame the adapter hands it three
//! views of the host:
//!
//! - [`SlotArrays`]: the raw per-slot number and text arrays, valid for the
//!   current callback only. Wrapped by
//!   [`SlotFieldAccessor`](crate::accessor::SlotFieldAccessor).
//! - [`HostWidgets`]: the widget tree the overlay nodes are injected into.
//!   Handles are valid for the lifetime of one widget instance.
//! - [`HostWorld`]: game state the display policy depends on.
//!
//! Node attribute getters and setters are infallible by contract: adapters
//! return defaults for, and ignore writes to, handles that no longer resolve.
//! Structural operations report [`HostError`].

use alloc::sync::Arc;
use core::fmt;

use bitflags::bitflags;
use kurbo::{Point, Size, Vec2};

use crate::error::HostError;
use crate::job::Job;
use crate::slot::{NumberField, TextField};
use crate::status::Status;

/// Host UI option toggled to force a full nameplate pass.
pub const REDRAW_TOGGLE_OPTION: &str = "NamePlateDispJobIconType";

/// Shared, immutable text buffer.
pub type SharedText = Arc<[u8]>;

/// Opaque handle to a node in the host widget tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(u64);

impl NodeHandle {
    /// Wraps a raw adapter-defined value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHandle({:#x})", self.0)
    }
}

bitflags! {
    /// Host node flags, bit-compatible with the host's own layout.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u16 {
        /// Anchored to the top edge.
        const ANCHOR_TOP = 0x1;
        /// Anchored to the left edge.
        const ANCHOR_LEFT = 0x2;
        /// Anchored to the bottom edge.
        const ANCHOR_BOTTOM = 0x4;
        /// Anchored to the right edge.
        const ANCHOR_RIGHT = 0x8;
        /// Drawn.
        const VISIBLE = 0x10;
        /// Accepts input.
        const ENABLED = 0x20;
        /// Clips children.
        const CLIP = 0x40;
        /// Fills its parent.
        const FILL = 0x80;
        /// Has a collision region.
        const HAS_COLLISION = 0x100;
        /// Responds to the mouse.
        const RESPOND_TO_MOUSE = 0x200;
        /// Can take focus.
        const FOCUSABLE = 0x400;
        /// Accepts drops.
        const DROPPABLE = 0x800;
        /// Top-level node.
        const IS_TOP_NODE = 0x1000;
        /// Emits events.
        const EMITS_EVENTS = 0x2000;
        /// Sorted by depth rather than tree order.
        const USE_DEPTH_BASED_PRIORITY = 0x4000;
    }
}

impl NodeFlags {
    /// Bits copied from the host's name text onto overlay nodes every draw.
    pub const MIRRORED: Self = Self::VISIBLE.union(Self::USE_DEPTH_BASED_PRIORITY);

    /// Flags freshly created overlay nodes start with.
    pub const OVERLAY_DEFAULT: Self = Self::ANCHOR_TOP
        .union(Self::ANCHOR_LEFT)
        .union(Self::ENABLED)
        .union(Self::EMITS_EVENTS)
        .union(Self::USE_DEPTH_BASED_PRIORITY);

    /// Returns `self` with the bits in `mask` replaced by those in `source`.
    #[inline]
    #[must_use]
    pub fn mirror(self, source: Self, mask: Self) -> Self {
        (self - mask) | (source & mask)
    }
}

/// What the host is drawing a plate for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlateKind {
    /// Another player or the local player.
    Player,
    /// Friendly NPC.
    FriendlyNpc,
    /// Hostile.
    Enemy,
    /// Friendly combatant (e.g. a pet).
    FriendlyCombatant,
    /// Interactable object.
    Interactable,
    /// Any other discriminant.
    Other(i32),
}

impl PlateKind {
    /// Decodes the host's discriminant.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Player,
            1 => Self::FriendlyNpc,
            3 => Self::Enemy,
            4 => Self::FriendlyCombatant,
            5 => Self::Interactable,
            other => Self::Other(other),
        }
    }

    /// Returns the host's discriminant.
    #[must_use]
    pub const fn to_raw(self) -> i32 {
        match self {
            Self::Player => 0,
            Self::FriendlyNpc => 1,
            Self::Enemy => 3,
            Self::FriendlyCombatant => 4,
            Self::Interactable => 5,
            Self::Other(raw) => raw,
        }
    }
}

/// Structural handles for one slot's plate widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotTree {
    /// Component node that owns the plate's node list.
    pub component: NodeHandle,
    /// Container holding the name text and the secondary overlay.
    pub name_container: NodeHandle,
    /// The host's name text node.
    pub name_text: NodeHandle,
    /// The host's own icon node.
    pub icon: NodeHandle,
    /// Hit-test region for clicks and hover.
    pub collision: NodeHandle,
}

/// Image parameters for freshly created overlay nodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageSetup {
    /// Texture part size.
    pub part: Size,
    /// Host wrap mode.
    pub wrap_mode: u8,
    /// Scale the texture to the node size.
    pub auto_fit: bool,
}

/// Stable identity of a game entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// The player a slot currently shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerSnapshot {
    /// Entity identity.
    pub entity: EntityId,
    /// Current class or job.
    pub job: Job,
    /// Online status.
    pub status: Status,
}

/// Text written into a host text cell.
#[derive(Clone, Copy, Debug)]
pub enum TextWrite<'a> {
    /// Bytes the host copies into its own storage.
    Copy(&'a [u8]),
    /// A shared buffer the host may keep a reference to.
    Shared(&'a SharedText),
}

impl TextWrite<'_> {
    /// Returns the bytes being written.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Copy(bytes) => bytes,
            Self::Shared(shared) => shared,
        }
    }
}

/// Raw per-slot arrays for the current frame.
///
/// Returning `None` (or `false` from a setter) means the host did not expose
/// that cell this frame.
pub trait SlotArrays {
    /// Reads an integer field.
    fn number(&self, slot: usize, field: NumberField) -> Option<i32>;

    /// Writes an integer field.
    fn set_number(&mut self, slot: usize, field: NumberField, value: i32) -> bool;

    /// Reads a text field.
    fn text(&self, slot: usize, field: TextField) -> Option<&[u8]>;

    /// Writes a text field.
    fn set_text(&mut self, slot: usize, field: TextField, text: TextWrite<'_>) -> bool;
}

/// The host widget tree.
pub trait HostWidgets {
    /// Returns whether the plate widget currently exists.
    fn is_available(&self) -> bool;

    /// Resolves the structural handles for `slot`.
    fn slot_tree(&self, slot: usize) -> Option<SlotTree>;

    /// Returns whether a component's node list has finished loading.
    fn component_loaded(&self, component: NodeHandle) -> bool;

    /// Plate kind as the widget currently records it.
    fn plate_kind(&self, slot: usize) -> PlateKind;

    /// Whether the slot's plate is currently drawn.
    fn is_plate_visible(&self, slot: usize) -> bool;

    /// Width of the name text as laid out this frame.
    fn text_width(&self, slot: usize) -> f64;

    /// Finds a node by id within a component's node list.
    fn find_node(&self, component: NodeHandle, node_id: u32) -> Option<NodeHandle>;

    /// Allocates an unlinked image node.
    fn create_image_node(&mut self, node_id: u32, setup: ImageSetup)
    -> Result<NodeHandle, HostError>;

    /// Links `node` as the next sibling of `target` inside `component`.
    fn link_after(
        &mut self,
        component: NodeHandle,
        node: NodeHandle,
        target: NodeHandle,
    ) -> Result<(), HostError>;

    /// Links `node` as the last child of `parent` inside `component`.
    fn link_at_end(
        &mut self,
        component: NodeHandle,
        node: NodeHandle,
        parent: NodeHandle,
    ) -> Result<(), HostError>;

    /// Unlinks `node` from `component` and frees it.
    fn unlink_and_free(&mut self, component: NodeHandle, node: NodeHandle)
    -> Result<(), HostError>;

    /// Node flags.
    fn flags(&self, node: NodeHandle) -> NodeFlags;

    /// Replaces node flags.
    fn set_flags(&mut self, node: NodeHandle, flags: NodeFlags);

    /// Node scale.
    fn scale(&self, node: NodeHandle) -> Vec2;

    /// Sets node scale.
    fn set_scale(&mut self, node: NodeHandle, scale: Vec2);

    /// Node origin (pivot for scaling).
    fn origin(&self, node: NodeHandle) -> Point;

    /// Sets node origin.
    fn set_origin(&mut self, node: NodeHandle, origin: Point);

    /// Node position relative to its parent.
    fn position(&self, node: NodeHandle) -> Point;

    /// Sets node position.
    fn set_position(&mut self, node: NodeHandle, position: Point);

    /// Node size.
    fn size(&self, node: NodeHandle) -> Size;

    /// Binds an icon texture to an image node.
    fn load_icon(&mut self, node: NodeHandle, icon_id: u32);

    /// Asks the host to reprocess every plate on the next update, if it has
    /// a direct way to do so. Returns `false` when it does not.
    fn request_full_redraw(&mut self) -> bool {
        false
    }

    /// Reads a host UI option.
    fn ui_option(&self, name: &str) -> Option<u32>;

    /// Writes a host UI option.
    fn set_ui_option(&mut self, name: &str, value: u32);

    /// Sets the widget's own full-update flag.
    fn set_full_update(&mut self);
}

/// Game state read by the display policy.
pub trait HostWorld {
    /// The local player, if logged in.
    fn local_player(&self) -> Option<EntityId>;

    /// Current party members, local player included when in a party.
    fn party(&self) -> &[EntityId];

    /// Whether a PvP match is active.
    fn is_pvp(&self) -> bool;

    /// The player shown in `slot`, if any.
    fn player_at(&self, slot: usize) -> Option<PlayerSnapshot>;
}

/// Sets or clears [`NodeFlags::VISIBLE`] on `node`.
pub(crate) fn set_visible(widgets: &mut dyn HostWidgets, node: NodeHandle, visible: bool) {
    let mut flags = widgets.flags(node);
    flags.set(NodeFlags::VISIBLE, visible);
    widgets.set_flags(node, flags);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_copies_only_masked_bits() {
        let overlay = NodeFlags::OVERLAY_DEFAULT;
        let name = NodeFlags::VISIBLE | NodeFlags::CLIP;
        let mirrored = overlay.mirror(name, NodeFlags::MIRRORED);
        assert!(mirrored.contains(NodeFlags::VISIBLE));
        assert!(!mirrored.contains(NodeFlags::USE_DEPTH_BASED_PRIORITY));
        assert!(!mirrored.contains(NodeFlags::CLIP));
        assert!(mirrored.contains(NodeFlags::ANCHOR_TOP | NodeFlags::EMITS_EVENTS));
    }

    #[test]
    fn overlay_default_matches_host_bits() {
        assert_eq!(NodeFlags::OVERLAY_DEFAULT.bits(), 0x1 | 0x2 | 0x20 | 0x2000 | 0x4000);
    }

    #[test]
    fn plate_kind_round_trips_unknowns() {
        assert_eq!(PlateKind::from_raw(0), PlateKind::Player);
        assert_eq!(PlateKind::from_raw(7), PlateKind::Other(7));
        assert_eq!(PlateKind::Other(7).to_raw(), 7);
        assert_eq!(PlateKind::Enemy.to_raw(), 3);
    }
}
