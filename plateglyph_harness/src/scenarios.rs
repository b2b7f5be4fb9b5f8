// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end frames through the engine against the simulated host.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use kurbo::{Point, Vec2};
use plateglyph_core::config::{
    DisplayConfiguration, EngineOptions, IconModeConfig, ModeKind, ZoneCategory,
};
use plateglyph_core::coordinator::CoordinatorState;
use plateglyph_core::engine::{EngineServices, OverlayEngine};
use plateglyph_core::error::SlotField;
use plateglyph_core::frame::FrameInput;
use plateglyph_core::host::{
    EntityId, HostWidgets, NodeFlags, NodeHandle, PlateKind, PlayerSnapshot, REDRAW_TOGGLE_OPTION,
};
use plateglyph_core::job::Job;
use plateglyph_core::layout::LayoutKind;
use plateglyph_core::nodes::{PRIMARY_NODE_ID, SECONDARY_NODE_ID};
use plateglyph_core::policy::{MembershipClass, SwapOutcome};
use plateglyph_core::slot::{CAPACITY, NumberField, SlotMask, TextField};
use plateglyph_core::state::SlotState;
use plateglyph_core::status::Status;
use plateglyph_core::trace::{
    FaultEvent, FaultKind, LayoutAppliedEvent, NodesDestroyedEvent, RedrawEvent, RedrawMethod,
    ResetReason, SlotResetEvent, SlotResolvedEvent, StateChangeEvent, TraceSink, Tracer, slot_id,
};

use crate::host::{FrameSpec, SimHost, SimStatusIcons, ids, status_icon};

const LOCAL: EntityId = EntityId(1);
const MATE: EntityId = EntityId(2);
const STRANGER: EntityId = EntityId(3);

const WHITE_MAGE_ICON: u32 = 62_000 + 24;

#[derive(Debug, Default)]
struct Events {
    states: Vec<(CoordinatorState, CoordinatorState)>,
    resolved: Vec<SlotResolvedEvent>,
    resets: Vec<SlotResetEvent>,
    layouts: Vec<LayoutAppliedEvent>,
    redraws: Vec<RedrawMethod>,
    faults: Vec<FaultEvent>,
    freed: u32,
}

impl Events {
    fn resets_for(&self, slot: u8) -> Vec<ResetReason> {
        self.resets
            .iter()
            .filter(|e| e.slot == slot)
            .map(|e| e.reason)
            .collect()
    }
}

impl TraceSink for Events {
    fn on_state_change(&mut self, e: &StateChangeEvent) {
        self.states.push((e.from, e.to));
    }

    fn on_slot_resolved(&mut self, e: &SlotResolvedEvent) {
        self.resolved.push(*e);
    }

    fn on_slot_reset(&mut self, e: &SlotResetEvent) {
        self.resets.push(*e);
    }

    fn on_layout_applied(&mut self, e: &LayoutAppliedEvent) {
        self.layouts.push(*e);
    }

    fn on_nodes_destroyed(&mut self, e: &NodesDestroyedEvent) {
        self.freed += e.freed;
    }

    fn on_redraw(&mut self, e: &RedrawEvent) {
        self.redraws.push(e.method);
    }

    fn on_fault(&mut self, e: &FaultEvent) {
        self.faults.push(*e);
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn player(entity: EntityId, job: Job, status: Status) -> PlayerSnapshot {
    PlayerSnapshot { entity, job, status }
}

fn engine(party: DisplayConfiguration) -> OverlayEngine {
    let mut engine = OverlayEngine::new(EngineServices::new(Box::new(SimStatusIcons::new())));
    engine.set_active_display_configuration(MembershipClass::PartyMember, party);
    engine.enable();
    engine
}

fn host() -> SimHost {
    let mut host = SimHost::new();
    host.world.local_player = Some(LOCAL);
    host.world.party = vec![LOCAL, MATE];
    host
}

/// Runs until nodes exist, then two more frames: the first runs the redraw
/// armed by node creation, the second is the full update it forces.
fn settle(host: &mut SimHost, engine: &mut OverlayEngine, events: &mut Events) {
    let frames = host.settle(engine, CAPACITY, 5, &mut Tracer::new(events));
    assert_eq!(frames, 2);
    step(host, engine, events, SlotMask::EMPTY);
    step(host, engine, events, SlotMask::EMPTY);
}

fn toggle_writes(host: &SimHost) -> Vec<u32> {
    host.widgets
        .option_writes()
        .iter()
        .filter(|(name, _)| name == REDRAW_TOGGLE_OPTION)
        .map(|&(_, value)| value)
        .collect()
}

fn step(host: &mut SimHost, engine: &mut OverlayEngine, events: &mut Events, updating: SlotMask) {
    host.frame(
        engine,
        FrameSpec::incremental(CAPACITY, updating),
        &mut Tracer::new(events),
    );
}

fn slot<'a>(engine: &'a OverlayEngine, index: usize) -> &'a SlotState {
    &engine.coordinator().unwrap().slots()[index]
}

fn overlay_count(host: &SimHost) -> usize {
    let arena = host.widgets.arena();
    arena.count_with_id(PRIMARY_NODE_ID) + arena.count_with_id(SECONDARY_NODE_ID)
}

fn is_visible(host: &SimHost, node: NodeHandle) -> bool {
    host.widgets.flags(node).contains(NodeFlags::VISIBLE)
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn nodes_are_created_on_the_second_draw() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();

    step(&mut host, &mut engine, &mut events, SlotMask::EMPTY);
    assert_eq!(engine.state(), Some(CoordinatorState::WaitingForNodes));
    assert_eq!(overlay_count(&host), 0);

    step(&mut host, &mut engine, &mut events, SlotMask::EMPTY);
    assert_eq!(engine.state(), Some(CoordinatorState::Ready));
    assert_eq!(overlay_count(&host), 2 * CAPACITY);
    assert_eq!(
        events.states,
        [
            (CoordinatorState::Uninitialized, CoordinatorState::WaitingForNodes),
            (CoordinatorState::WaitingForNodes, CoordinatorState::Ready),
        ]
    );

    let tree = host.widgets.tree(4);
    let children = host.widgets.arena().children(tree.component);
    assert_eq!(host.widgets.arena().node_id(children[1]), PRIMARY_NODE_ID);
    assert_eq!(children[0], tree.icon);
    let name_children = host.widgets.arena().children(tree.name_container);
    assert_eq!(host.widgets.arena().node_id(name_children[1]), SECONDARY_NODE_ID);

    // The creating draw leaves the host alone; the redraw waits for the next
    // callback.
    assert!(events.redraws.is_empty());
    assert!(toggle_writes(&host).is_empty());
    assert!(engine.coordinator().unwrap().redraw_deferred());

    step(&mut host, &mut engine, &mut events, SlotMask::EMPTY);
    assert_eq!(events.redraws, [RedrawMethod::OptionToggle]);
    assert_eq!(toggle_writes(&host), [0, 1]);
    assert!(!engine.coordinator().unwrap().redraw_deferred());

    step(&mut host, &mut engine, &mut events, SlotMask::EMPTY);
    assert_eq!(events.redraws.len(), 1);
}

#[test]
fn queued_redraw_is_folded_into_the_creation_redraw() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();

    step(&mut host, &mut engine, &mut events, SlotMask::EMPTY);
    engine.set_zone_category(ZoneCategory::Raid);
    engine.on_pre_draw(&mut host.widgets, &host.world, &mut Tracer::new(&mut events));
    assert_eq!(engine.state(), Some(CoordinatorState::Ready));
    assert!(events.redraws.is_empty());

    engine.on_pre_draw(&mut host.widgets, &host.world, &mut Tracer::new(&mut events));
    assert_eq!(events.redraws, [RedrawMethod::OptionToggle]);
}

#[test]
fn unloaded_components_delay_creation() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();
    host.widgets.set_loaded(30, false);

    for _ in 0..4 {
        step(&mut host, &mut engine, &mut events, SlotMask::EMPTY);
    }
    assert_eq!(engine.state(), Some(CoordinatorState::WaitingForNodes));
    assert_eq!(overlay_count(&host), 0);

    host.widgets.set_loaded(30, true);
    step(&mut host, &mut engine, &mut events, SlotMask::EMPTY);
    assert_eq!(engine.state(), Some(CoordinatorState::Ready));
    assert_eq!(overlay_count(&host), 2 * CAPACITY);
}

#[test]
fn finalize_is_idempotent_and_rearms() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();
    host.show_player(2, player(MATE, Job::WHITE_MAGE, Status::Busy), b"Mate");
    settle(&mut host, &mut engine, &mut events);
    assert!(slot(&engine, 2).is_modified());

    engine.on_pre_finalize(&mut host.widgets, &mut Tracer::new(&mut events));
    assert_eq!(overlay_count(&host), 0);
    assert_eq!(events.freed, 2 * u32::try_from(CAPACITY).unwrap());
    assert_eq!(events.resets_for(2), [ResetReason::ResetAll]);
    assert_eq!(engine.state(), Some(CoordinatorState::Uninitialized));
    let tree = host.widgets.tree(2);
    assert_eq!(host.widgets.scale(tree.name_text), Vec2::new(0.5, 0.5));

    engine.on_pre_finalize(&mut host.widgets, &mut Tracer::new(&mut events));
    assert_eq!(events.freed, 2 * u32::try_from(CAPACITY).unwrap());
    assert_eq!(host.widgets.arena().live_count(), CAPACITY * 5);

    host.widgets.destroy();
    host.widgets.build();
    host.widgets.set_plate(2, PlateKind::Player, true);
    settle(&mut host, &mut engine, &mut events);
    assert_eq!(overlay_count(&host), 2 * CAPACITY);
    assert!(slot(&engine, 2).is_modified());
}

#[test]
fn disable_returns_everything() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();
    host.show_player(9, player(MATE, Job::WHITE_MAGE, Status::None), b"Mate");
    settle(&mut host, &mut engine, &mut events);

    engine.disable(&mut host.widgets, &mut Tracer::new(&mut events));
    assert!(!engine.is_enabled());
    assert_eq!(overlay_count(&host), 0);

    let before = events.resolved.len();
    step(&mut host, &mut engine, &mut events, SlotMask::single(9).unwrap());
    assert_eq!(events.resolved.len(), before);
}

// ---------------------------------------------------------------------------
// Display decisions reaching the host
// ---------------------------------------------------------------------------

#[test]
fn busy_party_member_gets_small_icons() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();
    host.show_player(7, player(MATE, Job::WHITE_MAGE, Status::Busy), b"Mate");
    settle(&mut host, &mut engine, &mut events);

    let state = slot(&engine, 7);
    let (primary, secondary) = (state.primary().handle(), state.secondary().handle());
    assert_eq!(host.widgets.arena().icon(primary), Some(WHITE_MAGE_ICON));
    assert_eq!(host.widgets.arena().icon(secondary), Some(status_icon(Status::Busy)));
    assert!(is_visible(&host, primary));
    assert!(is_visible(&host, secondary));
    assert_eq!(host.widgets.position(primary), Point::new(-16.0, 24.0));

    let tree = host.widgets.tree(7);
    assert_eq!(host.widgets.scale(tree.name_text), Vec2::new(0.5, 0.5));
    assert!(close(host.widgets.scale(tree.collision).x, 1.0));
    assert_eq!(host.widgets.origin(tree.collision), Point::new(100.0, 40.0));

    let icon = i32::try_from(status_icon(Status::Busy)).unwrap();
    assert_eq!(host.arrays.peek_number(7, NumberField::NameIconId), icon);
    assert!(host.arrays.is_shared(7, TextField::StatusPrefix));
    assert_eq!(host.arrays.peek_text(7, TextField::Name), b"Mate");

    let layout = events.layouts.iter().find(|e| e.slot == 7).unwrap();
    assert_eq!(layout.kind, LayoutKind::InlineSmall);
    assert!(layout.primary_shown && layout.secondary_shown);
}

#[test]
fn important_status_swaps_into_the_big_icon() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::BigJobIcon));
    engine.set_zone_category(ZoneCategory::Dungeon);
    let mut events = Events::default();
    host.show_player(5, player(MATE, Job::WHITE_MAGE, Status::Disconnected), b"Mate");
    settle(&mut host, &mut engine, &mut events);

    let resolved = events.resolved.iter().find(|e| e.slot == 5).unwrap();
    assert_eq!(resolved.swap, SwapOutcome::Swapped);

    let state = slot(&engine, 5);
    let (primary, secondary) = (state.primary().handle(), state.secondary().handle());
    assert_eq!(host.widgets.arena().icon(primary), Some(status_icon(Status::Disconnected)));
    assert_eq!(host.widgets.arena().icon(secondary), Some(WHITE_MAGE_ICON));
    assert!(close(host.widgets.scale(primary).x, 2.1));
    assert_eq!(host.widgets.position(primary), Point::new(128.0, 70.0));
    assert_eq!(host.widgets.position(secondary), Point::new(148.0, 72.0));

    assert!(close(state.collision_scale(), 2.1 / 1.55));
    let tree = host.widgets.tree(5);
    assert!(close(host.widgets.scale(tree.collision).x, 2.0 * 2.1 / 1.55));
    assert_eq!(host.arrays.peek_text(5, TextField::Name), "\u{3000}".as_bytes());
}

#[test]
fn hidden_local_plate_draws_nothing() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    engine.set_options(EngineOptions {
        hide_local_player_nameplate: true,
        ..EngineOptions::default()
    });
    let mut events = Events::default();
    host.show_player(0, player(LOCAL, Job::PALADIN, Status::None), b"Me");
    settle(&mut host, &mut engine, &mut events);

    let state = slot(&engine, 0);
    assert!(state.is_modified());
    assert_eq!(state.driven(), (false, false));
    assert!(!is_visible(&host, state.primary().handle()));
    assert!(!is_visible(&host, state.secondary().handle()));
    assert_eq!(host.arrays.peek_text(0, TextField::Name), b"");
    assert!(host.arrays.is_shared(0, TextField::Name));
    assert!(host.arrays.is_shared(0, TextField::FreeCompanyTag));
}

#[test]
fn zero_text_width_centers_inline_large() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::BigJobIconAndPartySlot));
    let mut events = Events::default();
    host.show_player(3, player(MATE, Job::WHITE_MAGE, Status::None), b"Mate");
    host.show_player(4, player(LOCAL, Job::PALADIN, Status::None), b"Me");
    host.widgets.set_text_width(3, 0.0);
    settle(&mut host, &mut engine, &mut events);

    let kind = |slot: u8| events.layouts.iter().find(|e| e.slot == slot).unwrap().kind;
    assert_eq!(kind(3), LayoutKind::Centered);
    assert_eq!(kind(4), LayoutKind::InlineLarge);
    assert!(close(slot(&engine, 3).collision_scale(), 2.1 / 1.55));
    assert!(close(slot(&engine, 4).collision_scale(), 1.0));
}

#[test]
fn default_and_hide_never_reach_layout() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::Default);
    engine.set_active_display_configuration(MembershipClass::Other, DisplayConfiguration::Hide);
    let mut events = Events::default();
    host.show_player(1, player(MATE, Job::WHITE_MAGE, Status::None), b"Mate");
    host.show_player(6, player(STRANGER, Job::BARD, Status::None), b"Stranger");
    settle(&mut host, &mut engine, &mut events);

    assert!(events.layouts.is_empty());
    assert!(!slot(&engine, 1).is_modified());
    assert!(!slot(&engine, 6).is_modified());
    assert_eq!(host.arrays.peek_text(1, TextField::Name), b"Mate");
    assert_eq!(host.arrays.peek_text(6, TextField::Name), b"");
    assert_eq!(host.arrays.peek_text(6, TextField::FreeCompanyTag), b"");
}

#[test]
fn plate_scale_resizes_and_restores_the_container() {
    let mut host = host();
    let config = DisplayConfiguration::SmallJobIcon(IconModeConfig {
        scale: 1.5,
        ..IconModeConfig::default()
    });
    let mut engine = engine(config);
    let mut events = Events::default();
    host.show_player(7, player(MATE, Job::WHITE_MAGE, Status::None), b"Mate");
    settle(&mut host, &mut engine, &mut events);

    let tree = host.widgets.tree(7);
    assert!(slot(&engine, 7).is_global_scale_modified());
    assert_eq!(host.widgets.scale(tree.name_container), Vec2::new(1.5, 1.5));
    assert_eq!(host.widgets.origin(tree.name_container), Point::new(144.0, 107.0));
    assert!(close(host.widgets.scale(tree.collision).x, 1.5));

    // The widget starts drawing something else in this slot.
    host.widgets.set_plate(7, PlateKind::Enemy, true);
    step(&mut host, &mut engine, &mut events, SlotMask::EMPTY);

    let state = slot(&engine, 7);
    assert!(!state.is_modified());
    assert!(!state.is_global_scale_modified());
    assert_eq!(events.resets_for(7), [ResetReason::KindChanged]);
    assert_eq!(host.widgets.scale(tree.name_container), Vec2::new(1.0, 1.0));
    assert_eq!(host.widgets.origin(tree.name_container), Point::ZERO);
    assert_eq!(host.widgets.scale(tree.name_text), Vec2::new(0.5, 0.5));
    assert_eq!(host.widgets.scale(tree.collision), Vec2::new(1.0, 1.0));
    assert_eq!(host.widgets.origin(tree.collision), Point::ZERO);
    assert!(!is_visible(&host, state.primary().handle()));
    assert!(!is_visible(&host, state.secondary().handle()));
}

// ---------------------------------------------------------------------------
// Frame scoping and releases
// ---------------------------------------------------------------------------

#[test]
fn incremental_frame_touches_only_flagged_slots() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();
    host.show_player(3, player(MATE, Job::WHITE_MAGE, Status::None), b"Mate");
    host.show_player(7, player(LOCAL, Job::PALADIN, Status::Busy), b"Me");
    settle(&mut host, &mut engine, &mut events);

    host.arrays.clear_access_log();
    events = Events::default();
    step(&mut host, &mut engine, &mut events, SlotMask::single(7).unwrap());

    let accessed: Vec<usize> = host.arrays.accessed_slots().iter().collect();
    assert_eq!(accessed, [7]);
    let laid_out: Vec<u8> = events.layouts.iter().map(|e| e.slot).collect();
    assert_eq!(laid_out, [7]);
}

#[test]
fn full_update_stops_at_the_active_count() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();
    host.show_player(2, player(MATE, Job::WHITE_MAGE, Status::None), b"Mate");
    host.show_player(12, player(LOCAL, Job::PALADIN, Status::None), b"Me");
    settle(&mut host, &mut engine, &mut events);

    host.arrays.clear_access_log();
    host.frame(&mut engine, FrameSpec::full(10), &mut Tracer::new(&mut events));
    let accessed: Vec<usize> = host.arrays.accessed_slots().iter().collect();
    assert_eq!(accessed, (0..10).collect::<Vec<_>>());
}

#[test]
fn slot_that_stops_being_a_player_is_released() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();
    host.show_player(7, player(MATE, Job::WHITE_MAGE, Status::None), b"Mate");
    settle(&mut host, &mut engine, &mut events);

    host.arrays
        .put_number(7, NumberField::PlateKind, PlateKind::FriendlyNpc.to_raw());
    step(&mut host, &mut engine, &mut events, SlotMask::single(7).unwrap());
    assert_eq!(events.resets_for(7), [ResetReason::NotPlayer]);
    assert!(!slot(&engine, 7).is_modified());
    assert!(!is_visible(&host, slot(&engine, 7).primary().handle()));
}

#[test]
fn failing_slot_is_released_alone() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();
    for index in 0..3 {
        host.show_player(index, player(MATE, Job::WHITE_MAGE, Status::Busy), b"Mate");
    }
    settle(&mut host, &mut engine, &mut events);
    assert!((0..3).all(|index| slot(&engine, index).is_modified()));

    for index in [0, 2] {
        host.arrays.put_text(index, TextField::StatusPrefix, b"[AFK]");
        host.arrays.put_number(index, NumberField::NameIconId, 0);
    }
    host.arrays.hide_field(1, SlotField::Text(TextField::StatusPrefix));
    events = Events::default();
    let updating: SlotMask = (0..3).collect();
    step(&mut host, &mut engine, &mut events, updating);

    assert_eq!(engine.state(), Some(CoordinatorState::Ready));
    assert!(events.faults.is_empty());
    assert_eq!(events.resets_for(1), [ResetReason::SlotError]);
    assert!(!slot(&engine, 1).is_modified());
    assert!(!is_visible(&host, slot(&engine, 1).primary().handle()));
    assert!(!is_visible(&host, slot(&engine, 1).secondary().handle()));

    let laid_out: Vec<u8> = events.layouts.iter().map(|e| e.slot).collect();
    assert_eq!(laid_out, [0, 2]);
    let icon = i32::try_from(status_icon(Status::Busy)).unwrap();
    for index in [0, 2] {
        assert!(events.resets_for(slot_id(index)).is_empty());
        assert!(slot(&engine, index).is_modified());
        assert!(is_visible(&host, slot(&engine, index).primary().handle()));
        assert!(host.arrays.is_shared(index, TextField::StatusPrefix));
        assert_eq!(host.arrays.peek_number(index, NumberField::NameIconId), icon);
    }
}

#[test]
fn hidden_plate_and_pvp_release_slots() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();
    host.show_player(1, player(MATE, Job::WHITE_MAGE, Status::None), b"Mate");
    host.show_player(2, player(LOCAL, Job::PALADIN, Status::None), b"Me");
    settle(&mut host, &mut engine, &mut events);

    host.widgets.set_plate(1, PlateKind::Player, false);
    step(&mut host, &mut engine, &mut events, SlotMask::EMPTY);
    assert_eq!(events.resets_for(1), [ResetReason::Hidden]);

    host.world.pvp = true;
    step(&mut host, &mut engine, &mut events, SlotMask::single(2).unwrap());
    assert_eq!(events.resets_for(2), [ResetReason::PvP]);
    assert!(!slot(&engine, 2).is_modified());
}

#[test]
fn switching_to_default_releases_touched_slots() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();
    host.show_player(8, player(MATE, Job::WHITE_MAGE, Status::None), b"Mate");
    settle(&mut host, &mut engine, &mut events);
    assert!(slot(&engine, 8).is_modified());

    engine.set_active_display_configuration(MembershipClass::PartyMember, DisplayConfiguration::Default);
    // The forced redraw runs at the end of the next draw; the frame after it
    // is a full update.
    step(&mut host, &mut engine, &mut events, SlotMask::EMPTY);
    step(&mut host, &mut engine, &mut events, SlotMask::EMPTY);
    assert_eq!(events.resets_for(8), [ResetReason::PlayerDefault]);
    assert!(!slot(&engine, 8).is_modified());
}

// ---------------------------------------------------------------------------
// Fatal errors
// ---------------------------------------------------------------------------

#[test]
fn missing_link_target_stops_without_leaking() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();
    host.widgets.remove_node(3, ids::ICON);

    step(&mut host, &mut engine, &mut events, SlotMask::EMPTY);
    step(&mut host, &mut engine, &mut events, SlotMask::EMPTY);
    assert_eq!(engine.state(), Some(CoordinatorState::Stopped));
    assert_eq!(overlay_count(&host), 0);
    assert_eq!(events.faults.len(), 1);
    assert_eq!(events.faults[0].kind, FaultKind::MissingLinkTarget);
    assert_eq!(events.faults[0].slot, Some(3));

    host.show_player(0, player(MATE, Job::WHITE_MAGE, Status::None), b"Mate");
    host.frame(&mut engine, FrameSpec::full(CAPACITY), &mut Tracer::new(&mut events));
    assert!(events.resolved.is_empty());
    assert_eq!(engine.state(), Some(CoordinatorState::Stopped));
}

#[test]
fn allocation_failure_stops() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();
    host.widgets.faults.fail_allocation = true;

    step(&mut host, &mut engine, &mut events, SlotMask::EMPTY);
    step(&mut host, &mut engine, &mut events, SlotMask::EMPTY);
    assert_eq!(engine.state(), Some(CoordinatorState::Stopped));
    assert_eq!(events.faults[0].kind, FaultKind::Host);
    assert_eq!(events.faults[0].slot, Some(0));
}

#[test]
fn missing_arrays_stop_and_release_overlays() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();
    host.show_player(4, player(MATE, Job::WHITE_MAGE, Status::None), b"Mate");
    settle(&mut host, &mut engine, &mut events);
    assert!(slot(&engine, 4).is_modified());

    let input = FrameInput {
        arrays: None,
        active_slot_count: CAPACITY,
        is_full_update: true,
        updating: SlotMask::EMPTY,
    };
    engine.on_pre_update(input, &host.world, &mut Tracer::new(&mut events));
    assert_eq!(engine.state(), Some(CoordinatorState::Stopped));
    assert_eq!(events.faults[0].kind, FaultKind::ArraysMissing);

    engine.on_pre_draw(&mut host.widgets, &host.world, &mut Tracer::new(&mut events));
    assert_eq!(overlay_count(&host), 0);
    let tree = host.widgets.tree(4);
    assert_eq!(host.widgets.scale(tree.collision), Vec2::new(1.0, 1.0));
}

#[test]
fn oversized_active_count_stops() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();
    settle(&mut host, &mut engine, &mut events);

    host.frame(&mut engine, FrameSpec::full(CAPACITY + 1), &mut Tracer::new(&mut events));
    assert_eq!(engine.state(), Some(CoordinatorState::Stopped));
    assert_eq!(events.faults[0].kind, FaultKind::ActiveCountOutOfRange);
}

// ---------------------------------------------------------------------------
// Forced redraws
// ---------------------------------------------------------------------------

#[test]
fn redraw_toggles_the_option_without_a_direct_call() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();
    settle(&mut host, &mut engine, &mut events);

    assert_eq!(events.redraws, [RedrawMethod::OptionToggle]);
    assert_eq!(toggle_writes(&host), [0, 1]);
    assert_eq!(host.widgets.ui_option(REDRAW_TOGGLE_OPTION), Some(1));
}

#[test]
fn redraw_prefers_the_direct_call() {
    let mut host = host();
    host.widgets.faults.direct_redraw = true;
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();
    settle(&mut host, &mut engine, &mut events);

    assert_eq!(events.redraws, [RedrawMethod::Direct]);
    assert_eq!(host.widgets.direct_redraws(), 1);
    assert!(host.widgets.option_writes().is_empty());
}

#[test]
fn settings_changes_schedule_a_redraw() {
    let mut host = host();
    let mut engine = engine(DisplayConfiguration::preset(ModeKind::SmallJobIcon));
    let mut events = Events::default();
    settle(&mut host, &mut engine, &mut events);
    events = Events::default();

    engine.set_zone_category(ZoneCategory::Raid);
    step(&mut host, &mut engine, &mut events, SlotMask::EMPTY);
    assert_eq!(events.redraws, [RedrawMethod::OptionToggle]);

    step(&mut host, &mut engine, &mut events, SlotMask::EMPTY);
    assert_eq!(events.redraws.len(), 1);
}
