// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated host: widget tree, game world and frame driver.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::Cell;

use kurbo::{Point, Size, Vec2};
use plateglyph_core::engine::OverlayEngine;
use plateglyph_core::error::HostError;
use plateglyph_core::frame::FrameInput;
use plateglyph_core::host::{
    EntityId, HostWidgets, HostWorld, ImageSetup, NodeFlags, NodeHandle, PlateKind,
    PlayerSnapshot, REDRAW_TOGGLE_OPTION, SlotArrays, SlotTree,
};
use plateglyph_core::slot::{CAPACITY, NumberField, SlotMask, TextField};
use plateglyph_core::status::{Status, StatusIconSource};
use plateglyph_core::trace::Tracer;

use crate::arena::NodeArena;
use crate::arrays::SimArrays;

/// Node ids of the host's own plate nodes.
pub mod ids {
    /// Component root.
    pub const COMPONENT: u32 = 1;
    /// Container for the name text.
    pub const NAME_CONTAINER: u32 = 2;
    /// Name text.
    pub const NAME_TEXT: u32 = 3;
    /// The host's icon.
    pub const ICON: u32 = 4;
    /// Collision region.
    pub const COLLISION: u32 = 5;
}

/// Size of the simulated collision node.
pub const COLLISION_SIZE: Size = Size::new(200.0, 40.0);

/// Where the host lays out its own icon.
pub const HOST_ICON_POSITION: Point = Point::new(10.0, 24.0);

/// Base of the simulated status icon ids.
pub const STATUS_ICON_BASE: u32 = 61_500;

/// Runtime fault toggles for failure-path tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostFaults {
    /// Image node allocation fails.
    pub fail_allocation: bool,
    /// The host offers a direct full-redraw call.
    pub direct_redraw: bool,
    /// The redraw toggle option does not exist.
    pub missing_redraw_option: bool,
}

/// Per-slot widget state.
#[derive(Clone, Copy, Debug)]
struct SimPlate {
    tree: SlotTree,
    loaded: bool,
    kind: PlateKind,
    visible: bool,
    text_width: f64,
}

/// Simulated plate widget.
#[derive(Debug)]
pub struct SimWidgets {
    arena: NodeArena,
    plates: Vec<SimPlate>,
    available: bool,
    options: BTreeMap<String, u32>,
    option_writes: Vec<(String, u32)>,
    full_update: bool,
    direct_redraws: u32,
    /// Active fault toggles.
    pub faults: HostFaults,
}

impl Default for SimWidgets {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWidgets {
    /// A loaded widget with every slot showing an invisible NPC plate.
    #[must_use]
    pub fn new() -> Self {
        let mut widgets = Self {
            arena: NodeArena::new(),
            plates: Vec::new(),
            available: false,
            options: BTreeMap::from([(REDRAW_TOGGLE_OPTION.to_string(), 1)]),
            option_writes: Vec::new(),
            full_update: false,
            direct_redraws: 0,
            faults: HostFaults::default(),
        };
        widgets.build();
        widgets
    }

    /// Creates the plate components. The widget becomes available.
    pub fn build(&mut self) {
        let plates = (0..CAPACITY).map(|_| self.build_plate()).collect();
        self.plates = plates;
        self.available = true;
    }

    fn build_plate(&mut self) -> SimPlate {
        let a = &mut self.arena;
        let component = a.create(ids::COMPONENT, Size::new(288.0, 96.0));
        let icon = a.create(ids::ICON, Size::new(32.0, 32.0));
        let name_container = a.create(ids::NAME_CONTAINER, Size::new(288.0, 48.0));
        let name_text = a.create(ids::NAME_TEXT, Size::new(200.0, 24.0));
        let collision = a.create(ids::COLLISION, COLLISION_SIZE);
        let links = [
            a.append(component, icon),
            a.append(component, name_container),
            a.append(name_container, name_text),
            a.append(component, collision),
        ];
        debug_assert!(links.iter().all(Result::is_ok), "fresh nodes always link");
        a.set_position(icon, HOST_ICON_POSITION);
        a.set_scale(name_text, Vec2::new(0.5, 0.5));
        a.set_flags(name_text, NodeFlags::ANCHOR_TOP | NodeFlags::ANCHOR_LEFT);
        SimPlate {
            tree: SlotTree {
                component,
                name_container,
                name_text,
                icon,
                collision,
            },
            loaded: true,
            kind: PlateKind::FriendlyNpc,
            visible: false,
            text_width: 60.0,
        }
    }

    /// Frees every node and marks the widget unavailable.
    pub fn destroy(&mut self) {
        for plate in core::mem::take(&mut self.plates) {
            if let Err(err) = self.arena.unlink_and_free(plate.tree.component) {
                tracing::warn!(%err, "plate component already freed");
            }
        }
        self.available = false;
    }

    /// The backing node arena.
    #[must_use]
    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Structural handles for `slot`.
    ///
    /// # Panics
    ///
    /// Panics if the widget has been destroyed.
    #[must_use]
    pub fn tree(&self, slot: usize) -> SlotTree {
        self.plates[slot].tree
    }

    /// Marks a component as still loading (or loaded).
    pub fn set_loaded(&mut self, slot: usize, loaded: bool) {
        self.plates[slot].loaded = loaded;
    }

    /// Sets what the plate shows and whether it is drawn. The name text
    /// visibility follows.
    pub fn set_plate(&mut self, slot: usize, kind: PlateKind, visible: bool) {
        let plate = &mut self.plates[slot];
        plate.kind = kind;
        plate.visible = visible;
        let name_text = plate.tree.name_text;
        let mut flags = self.arena.flags(name_text);
        flags.set(NodeFlags::VISIBLE, visible);
        self.arena.set_flags(name_text, flags);
    }

    /// Sets the laid-out name width.
    pub fn set_text_width(&mut self, slot: usize, width: f64) {
        self.plates[slot].text_width = width;
    }

    /// Removes one of the host's own nodes from a slot.
    pub fn remove_node(&mut self, slot: usize, node_id: u32) {
        let component = self.plates[slot].tree.component;
        if let Some(node) = self.arena.find(component, node_id) {
            if let Err(err) = self.arena.unlink_and_free(node) {
                tracing::warn!(%err, "node already freed");
            }
        }
    }

    /// UI option writes in order.
    #[must_use]
    pub fn option_writes(&self) -> &[(String, u32)] {
        &self.option_writes
    }

    /// Number of direct redraw requests served.
    #[must_use]
    pub fn direct_redraws(&self) -> u32 {
        self.direct_redraws
    }

    /// Returns and clears the pending full-update request.
    pub fn take_full_update(&mut self) -> bool {
        core::mem::take(&mut self.full_update)
    }
}

impl HostWidgets for SimWidgets {
    fn is_available(&self) -> bool {
        self.available
    }

    fn slot_tree(&self, slot: usize) -> Option<SlotTree> {
        let plate = self.plates.get(slot)?;
        self.arena.is_alive(plate.tree.component).then_some(plate.tree)
    }

    fn component_loaded(&self, component: NodeHandle) -> bool {
        self.plates
            .iter()
            .any(|p| p.tree.component == component && p.loaded)
    }

    fn plate_kind(&self, slot: usize) -> PlateKind {
        self.plates
            .get(slot)
            .map_or(PlateKind::Other(-1), |p| p.kind)
    }

    fn is_plate_visible(&self, slot: usize) -> bool {
        self.plates.get(slot).is_some_and(|p| p.visible)
    }

    fn text_width(&self, slot: usize) -> f64 {
        self.plates.get(slot).map_or(0.0, |p| p.text_width)
    }

    fn find_node(&self, component: NodeHandle, node_id: u32) -> Option<NodeHandle> {
        self.arena.find(component, node_id)
    }

    fn create_image_node(&mut self, node_id: u32, setup: ImageSetup) -> Result<NodeHandle, HostError> {
        if !self.available {
            return Err(HostError::Unavailable);
        }
        if self.faults.fail_allocation {
            return Err(HostError::AllocationFailed { node_id });
        }
        Ok(self.arena.create(node_id, setup.part))
    }

    fn link_after(
        &mut self,
        component: NodeHandle,
        node: NodeHandle,
        target: NodeHandle,
    ) -> Result<(), HostError> {
        _ = component;
        self.arena.insert_after(target, node)
    }

    fn link_at_end(
        &mut self,
        component: NodeHandle,
        node: NodeHandle,
        parent: NodeHandle,
    ) -> Result<(), HostError> {
        _ = component;
        self.arena.append(parent, node)
    }

    fn unlink_and_free(&mut self, component: NodeHandle, node: NodeHandle) -> Result<(), HostError> {
        _ = component;
        self.arena.unlink_and_free(node)
    }

    fn flags(&self, node: NodeHandle) -> NodeFlags {
        self.arena.flags(node)
    }

    fn set_flags(&mut self, node: NodeHandle, flags: NodeFlags) {
        self.arena.set_flags(node, flags);
    }

    fn scale(&self, node: NodeHandle) -> Vec2 {
        self.arena.scale(node)
    }

    fn set_scale(&mut self, node: NodeHandle, scale: Vec2) {
        self.arena.set_scale(node, scale);
    }

    fn origin(&self, node: NodeHandle) -> Point {
        self.arena.origin(node)
    }

    fn set_origin(&mut self, node: NodeHandle, origin: Point) {
        self.arena.set_origin(node, origin);
    }

    fn position(&self, node: NodeHandle) -> Point {
        self.arena.position(node)
    }

    fn set_position(&mut self, node: NodeHandle, position: Point) {
        self.arena.set_position(node, position);
    }

    fn size(&self, node: NodeHandle) -> Size {
        self.arena.size(node)
    }

    fn load_icon(&mut self, node: NodeHandle, icon_id: u32) {
        self.arena.set_icon(node, icon_id);
    }

    fn request_full_redraw(&mut self) -> bool {
        if !self.faults.direct_redraw {
            return false;
        }
        self.direct_redraws += 1;
        self.full_update = true;
        true
    }

    fn ui_option(&self, name: &str) -> Option<u32> {
        if self.faults.missing_redraw_option && name == REDRAW_TOGGLE_OPTION {
            return None;
        }
        self.options.get(name).copied()
    }

    fn set_ui_option(&mut self, name: &str, value: u32) {
        self.options.insert(name.to_string(), value);
        self.option_writes.push((name.to_string(), value));
    }

    fn set_full_update(&mut self) {
        self.full_update = true;
    }
}

/// Simulated game state.
#[derive(Clone, Debug)]
pub struct SimWorld {
    /// The local player.
    pub local_player: Option<EntityId>,
    /// Party members, local player included.
    pub party: Vec<EntityId>,
    /// A PvP match is running.
    pub pvp: bool,
    players: Vec<Option<PlayerSnapshot>>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    /// Logged out, solo, no players.
    #[must_use]
    pub fn new() -> Self {
        Self {
            local_player: None,
            party: Vec::new(),
            pvp: false,
            players: alloc::vec![None; CAPACITY],
        }
    }

    /// Sets who a slot shows.
    pub fn set_player(&mut self, slot: usize, player: Option<PlayerSnapshot>) {
        self.players[slot] = player;
    }
}

impl HostWorld for SimWorld {
    fn local_player(&self) -> Option<EntityId> {
        self.local_player
    }

    fn party(&self) -> &[EntityId] {
        &self.party
    }

    fn is_pvp(&self) -> bool {
        self.pvp
    }

    fn player_at(&self, slot: usize) -> Option<PlayerSnapshot> {
        self.players.get(slot).copied().flatten()
    }
}

/// Status icons at [`STATUS_ICON_BASE`] plus the status code. Counts lookups.
#[derive(Debug, Default)]
pub struct SimStatusIcons {
    lookups: Cell<u32>,
}

impl SimStatusIcons {
    /// Creates the source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookups served so far.
    #[must_use]
    pub fn lookups(&self) -> u32 {
        self.lookups.get()
    }
}

impl StatusIconSource for SimStatusIcons {
    fn icon_for(&self, status: Status) -> Option<u32> {
        self.lookups.set(self.lookups.get() + 1);
        (status != Status::None).then(|| STATUS_ICON_BASE + u32::from(status.code()))
    }
}

/// Icon id [`SimStatusIcons`] returns for `status`.
#[must_use]
pub fn status_icon(status: Status) -> u32 {
    STATUS_ICON_BASE + u32::from(status.code())
}

/// One host frame as the driver submits it.
#[derive(Clone, Copy, Debug)]
pub struct FrameSpec {
    /// Slots in use.
    pub active: usize,
    /// Host-initiated full update.
    pub full: bool,
    /// Slots flagged as updating.
    pub updating: SlotMask,
}

impl FrameSpec {
    /// Full update of `active` slots.
    #[must_use]
    pub fn full(active: usize) -> Self {
        Self {
            active,
            full: true,
            updating: SlotMask::EMPTY,
        }
    }

    /// Incremental update of the given slots.
    #[must_use]
    pub fn incremental(active: usize, updating: SlotMask) -> Self {
        Self {
            active,
            full: false,
            updating,
        }
    }
}

/// Everything a host adapter would hand the engine.
#[derive(Debug, Default)]
pub struct SimHost {
    /// Slot arrays.
    pub arrays: SimArrays,
    /// Widget tree.
    pub widgets: SimWidgets,
    /// Game world.
    pub world: SimWorld,
    frames: u64,
}

impl SimHost {
    /// A fresh host with a loaded widget.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames driven so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Puts `player` on `slot` with a visible player plate.
    pub fn show_player(&mut self, slot: usize, player: PlayerSnapshot, name: &[u8]) {
        self.arrays
            .put_number(slot, NumberField::PlateKind, PlateKind::Player.to_raw());
        self.arrays.put_text(slot, TextField::Name, name);
        self.arrays.put_text(slot, TextField::FreeCompanyTag, b" <FC>");
        self.world.set_player(slot, Some(player));
        self.widgets.set_plate(slot, PlateKind::Player, true);
    }

    /// Turns `slot` into a plate of another kind.
    pub fn show_other(&mut self, slot: usize, kind: PlateKind) {
        self.arrays.put_number(slot, NumberField::PlateKind, kind.to_raw());
        self.world.set_player(slot, None);
        self.widgets.set_plate(slot, kind, true);
    }

    /// Runs pre-update and pre-draw for one frame. A full update is forced
    /// when the widget asked for one.
    pub fn frame(&mut self, engine: &mut OverlayEngine, shape: FrameSpec, tracer: &mut Tracer<'_>) {
        self.frames += 1;
        let full = shape.full | self.widgets.take_full_update();
        let input = FrameInput {
            arrays: Some(&mut self.arrays as &mut dyn SlotArrays),
            active_slot_count: shape.active,
            is_full_update: full,
            updating: shape.updating,
        };
        engine.on_pre_update(input, &self.world, tracer);
        engine.on_pre_draw(&mut self.widgets, &self.world, tracer);
    }

    /// Runs frames until the engine has created its nodes, up to `limit`.
    /// Returns the frames run.
    pub fn settle(&mut self, engine: &mut OverlayEngine, active: usize, limit: u32, tracer: &mut Tracer<'_>) -> u32 {
        for n in 1..=limit {
            self.frame(engine, FrameSpec::full(active), tracer);
            if engine
                .coordinator()
                .is_some_and(|c| !c.slots().is_empty())
            {
                return n;
            }
        }
        limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plateglyph_core::nodes::{PRIMARY_NODE_ID, SECONDARY_NODE_ID};

    #[test]
    fn plate_tree_has_the_host_nodes() {
        let widgets = SimWidgets::new();
        let tree = widgets.slot_tree(7).unwrap();
        assert_eq!(widgets.find_node(tree.component, ids::ICON), Some(tree.icon));
        assert_eq!(widgets.find_node(tree.component, ids::NAME_TEXT), Some(tree.name_text));
        assert_eq!(widgets.arena().parent(tree.name_text), Some(tree.name_container));
        assert_eq!(widgets.find_node(tree.component, PRIMARY_NODE_ID), None);
        assert_eq!(widgets.arena().live_count(), CAPACITY * 5);
    }

    #[test]
    fn destroy_frees_everything() {
        let mut widgets = SimWidgets::new();
        let tree = widgets.tree(0);
        let node = widgets
            .create_image_node(SECONDARY_NODE_ID, ImageSetup {
                part: Size::new(32.0, 32.0),
                wrap_mode: 1,
                auto_fit: true,
            })
            .unwrap();
        widgets.link_at_end(tree.component, node, tree.name_container).unwrap();
        widgets.destroy();
        assert!(!widgets.is_available());
        assert_eq!(widgets.arena().live_count(), 0);
        assert_eq!(widgets.slot_tree(0), None);

        widgets.build();
        assert!(widgets.is_available());
        assert_eq!(widgets.arena().live_count(), CAPACITY * 5);
    }

    #[test]
    fn allocation_fault_is_reported() {
        let mut widgets = SimWidgets::new();
        widgets.faults.fail_allocation = true;
        let setup = ImageSetup {
            part: Size::new(32.0, 32.0),
            wrap_mode: 1,
            auto_fit: true,
        };
        assert_eq!(
            widgets.create_image_node(PRIMARY_NODE_ID, setup),
            Err(HostError::AllocationFailed {
                node_id: PRIMARY_NODE_ID
            })
        );
    }

    #[test]
    fn redraw_paths() {
        let mut widgets = SimWidgets::new();
        assert!(!widgets.request_full_redraw());
        widgets.faults.direct_redraw = true;
        assert!(widgets.request_full_redraw());
        assert!(widgets.take_full_update());
        assert!(!widgets.take_full_update());
        assert_eq!(widgets.ui_option(REDRAW_TOGGLE_OPTION), Some(1));
        widgets.faults.missing_redraw_option = true;
        assert_eq!(widgets.ui_option(REDRAW_TOGGLE_OPTION), None);
    }
}
