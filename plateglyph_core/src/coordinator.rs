// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame state machine.
//!
//! ```text
//!   Uninitialized ──pre-draw──► WaitingForNodes ──nodes created──► Ready
//!        ▲                            │                              │
//!        └──────── pre-finalize ──────┴──────────────────────────────┤
//!                                                                    │
//!                      node or frame error ───────────────────► Stopped
//! ```
//!
//! Pre-update resolves display decisions and writes host text; pre-draw
//! applies geometry once the host has laid out the frame. Nothing here
//! returns an error: fatal failures move the coordinator to
//! [`CoordinatorState::Stopped`], per-slot failures release the slot.

use alloc::vec::Vec;
use core::mem;

use crate::accessor::SlotFieldAccessor;
use crate::config::ModeKind;
use crate::engine::EngineResources;
use crate::error::SlotError;
use crate::frame::{FrameContext, FrameInput};
use crate::host::{HostWidgets, HostWorld, PlateKind, REDRAW_TOGGLE_OPTION, SharedText};
use crate::layout::OverlayLayoutEngine;
use crate::nodes::NodeLifecycleManager;
use crate::policy::{
    DisplayDecision, DisplayPolicyResolver, PartyView, PlateTextEdits, PolicyServices, TextEdit,
};
use crate::slot::{NumberField, TextField};
use crate::state::SlotState;
use crate::trace::{
    FaultEvent, FramePhase, LayoutAppliedEvent, NodesCreatedEvent, NodesDestroyedEvent,
    PhaseBeginEvent, PhaseEndEvent, RedrawEvent, RedrawMethod, ResetReason, SlotResetEvent,
    SlotResolvedEvent, StateChangeEvent, Tracer, slot_id,
};

/// Lifecycle of the coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoordinatorState {
    /// No widget seen yet, or the last one was torn down.
    Uninitialized,
    /// Waiting for every plate component to load.
    WaitingForNodes,
    /// Nodes exist; frames are processed.
    Ready,
    /// A fatal error occurred. Terminal until the engine is re-enabled.
    Stopped,
}

/// Drives slot states through host frames.
#[derive(Debug)]
pub struct OverlayUpdateCoordinator {
    state: CoordinatorState,
    frame_index: u64,
    slots: Vec<SlotState>,
    resolver: DisplayPolicyResolver,
    layout: OverlayLayoutEngine,
    nodes: NodeLifecycleManager,
    resources: EngineResources,
    redraw_requested: bool,
    redraw_deferred: bool,
    cleanup_pending: bool,
}

impl OverlayUpdateCoordinator {
    /// Creates a coordinator in [`CoordinatorState::Uninitialized`].
    #[must_use]
    pub fn new(
        resolver: DisplayPolicyResolver,
        layout: OverlayLayoutEngine,
        resources: EngineResources,
    ) -> Self {
        Self {
            state: CoordinatorState::Uninitialized,
            frame_index: 0,
            slots: Vec::new(),
            resolver,
            layout,
            nodes: NodeLifecycleManager,
            resources,
            redraw_requested: false,
            redraw_deferred: false,
            cleanup_pending: false,
        }
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Frames seen so far; advanced at every pre-update.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Slot states; empty unless nodes exist.
    #[must_use]
    pub fn slots(&self) -> &[SlotState] {
        &self.slots
    }

    /// The display policy.
    #[must_use]
    pub fn resolver(&self) -> &DisplayPolicyResolver {
        &self.resolver
    }

    /// Mutable access to the display policy.
    pub fn resolver_mut(&mut self) -> &mut DisplayPolicyResolver {
        &mut self.resolver
    }

    /// Shared resources.
    #[must_use]
    pub fn resources(&self) -> &EngineResources {
        &self.resources
    }

    /// Whether a forced redraw is queued.
    #[must_use]
    pub fn redraw_requested(&self) -> bool {
        self.redraw_requested
    }

    /// Whether a redraw is waiting for the callback after node creation.
    #[must_use]
    pub fn redraw_deferred(&self) -> bool {
        self.redraw_deferred
    }

    /// Queues a forced redraw for the end of the next pre-draw.
    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Moves a redraw armed by node creation into the queue. Called at the
    /// start of every callback, so it never runs in the creating one.
    fn release_deferred_redraw(&mut self) {
        if mem::take(&mut self.redraw_deferred) {
            self.redraw_requested = true;
        }
    }

    fn transition(&mut self, to: CoordinatorState, tracer: &mut Tracer<'_>) {
        if self.state == to {
            return;
        }
        tracing::debug!(from = ?self.state, to = ?to, "overlay coordinator state change");
        tracer.state_change(&StateChangeEvent {
            frame_index: self.frame_index,
            from: self.state,
            to,
        });
        self.state = to;
    }

    fn stop(&mut self, fault: &FaultEvent, tracer: &mut Tracer<'_>) {
        tracer.fault(fault);
        self.transition(CoordinatorState::Stopped, tracer);
        self.cleanup_pending = true;
    }

    // -----------------------------------------------------------------------
    // Pre-update
    // -----------------------------------------------------------------------

    /// Host is about to update plate data.
    pub fn on_pre_update(
        &mut self,
        input: FrameInput<'_>,
        world: &dyn HostWorld,
        services: PolicyServices<'_>,
        tracer: &mut Tracer<'_>,
    ) {
        self.frame_index += 1;
        self.release_deferred_redraw();
        if self.state != CoordinatorState::Ready {
            return;
        }
        let frame_index = self.frame_index;
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: FramePhase::PreUpdate,
        });

        let mut frame = match FrameContext::new(input) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::error!(%err, "nameplate frame unusable, stopping overlays");
                self.stop(&FaultEvent::frame(frame_index, &err), tracer);
                return;
            }
        };

        let view = PartyView {
            local_player: world.local_player(),
            party: world.party(),
        };
        let pvp = world.is_pvp();
        let mut touched = 0;

        for slot in frame.slots_to_process().iter() {
            let Some(state) = self.slots.get_mut(slot) else {
                continue;
            };
            touched += 1;
            let outcome = if pvp {
                Err(ResetReason::PvP)
            } else {
                update_slot(
                    slot,
                    frame.accessor(),
                    world,
                    &self.resolver,
                    view,
                    services,
                    &mut self.resources,
                    frame_index,
                    tracer,
                )
            };
            match outcome {
                Ok(decision) => state.set_pending(decision),
                Err(reason) => {
                    if state.request_release() {
                        tracer.slot_reset(&SlotResetEvent {
                            frame_index,
                            slot: slot_id(slot),
                            reason,
                        });
                    }
                }
            }
        }

        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: FramePhase::PreUpdate,
            slots_touched: touched,
        });
    }

    // -----------------------------------------------------------------------
    // Pre-draw
    // -----------------------------------------------------------------------

    /// Host is about to draw. Node creation, layout and forced redraws happen
    /// here.
    pub fn on_pre_draw(
        &mut self,
        widgets: &mut dyn HostWidgets,
        world: &dyn HostWorld,
        tracer: &mut Tracer<'_>,
    ) {
        let frame_index = self.frame_index;
        self.release_deferred_redraw();
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: FramePhase::PreDraw,
        });
        let mut touched = 0;

        match self.state {
            CoordinatorState::Uninitialized => {
                self.transition(CoordinatorState::WaitingForNodes, tracer);
            }
            CoordinatorState::WaitingForNodes => match self.nodes.create_all(widgets) {
                Ok(Some(slots)) => {
                    tracer.nodes_created(&NodesCreatedEvent {
                        frame_index,
                        slots: slot_id(slots.len()),
                    });
                    self.slots = slots;
                    // The host is mid-draw; one redraw next callback also
                    // covers anything queued before creation.
                    self.redraw_requested = false;
                    self.redraw_deferred = true;
                    self.transition(CoordinatorState::Ready, tracer);
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::error!(%err, "overlay node creation failed, stopping overlays");
                    self.stop(&FaultEvent::node(frame_index, &err), tracer);
                }
            },
            CoordinatorState::Ready => touched = self.draw_slots(widgets, world, tracer),
            CoordinatorState::Stopped => {}
        }

        if self.state == CoordinatorState::Stopped && self.cleanup_pending {
            self.release_all(widgets, tracer);
            self.cleanup_pending = false;
        }

        if self.redraw_requested && widgets.is_available() {
            self.redraw_requested = false;
            let method = force_redraw(widgets);
            tracing::debug!(?method, "forced nameplate redraw");
            tracer.redraw(&RedrawEvent {
                frame_index,
                method,
            });
        }

        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: FramePhase::PreDraw,
            slots_touched: touched,
        });
    }

    fn draw_slots(
        &mut self,
        widgets: &mut dyn HostWidgets,
        world: &dyn HostWorld,
        tracer: &mut Tracer<'_>,
    ) -> u32 {
        let frame_index = self.frame_index;
        let pvp = world.is_pvp();
        let mut touched = 0;

        for state in self.slots.iter_mut().filter(|s| s.is_modified()) {
            touched += 1;
            let slot = state.slot();
            let reason = if state.release_requested() {
                // Already reported when the release was requested.
                state.reset(widgets);
                continue;
            } else if widgets.plate_kind(slot) != PlateKind::Player {
                Some(ResetReason::KindChanged)
            } else if !widgets.is_plate_visible(slot) {
                Some(ResetReason::Hidden)
            } else if pvp {
                Some(ResetReason::PvP)
            } else {
                None
            };
            if let Some(reason) = reason {
                state.reset(widgets);
                tracer.slot_reset(&SlotResetEvent {
                    frame_index,
                    slot: slot_id(slot),
                    reason,
                });
                continue;
            }

            if let Some(decision) = state.take_pending() {
                let text_width = widgets.text_width(slot);
                let icon_position = widgets.position(state.tree().icon);
                match self.layout.compute(&decision, text_width, icon_position) {
                    Some(layout) => {
                        state.apply_layout(widgets, &layout);
                        tracer.layout_applied(&LayoutAppliedEvent {
                            frame_index,
                            slot: slot_id(slot),
                            kind: layout.kind,
                            text_width,
                            primary_shown: layout.primary.is_some(),
                            secondary_shown: layout.secondary.is_some(),
                        });
                    }
                    None => {
                        state.reset(widgets);
                        tracer.slot_reset(&SlotResetEvent {
                            frame_index,
                            slot: slot_id(slot),
                            reason: no_overlay_reason(decision.mode),
                        });
                        continue;
                    }
                }
            }

            state.mirror_name_flags(widgets);
            state.fix_collision(widgets);
        }
        touched
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Host is about to destroy the plate widget. Resets every slot, frees
    /// the overlay nodes and re-arms for the next widget instance.
    pub fn on_pre_finalize(&mut self, widgets: &mut dyn HostWidgets, tracer: &mut Tracer<'_>) {
        let frame_index = self.frame_index;
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: FramePhase::PreFinalize,
        });
        let touched = self.release_all(widgets, tracer);
        self.redraw_deferred = false;
        if self.state == CoordinatorState::Stopped {
            self.cleanup_pending = false;
        } else {
            self.transition(CoordinatorState::Uninitialized, tracer);
        }
        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: FramePhase::PreFinalize,
            slots_touched: touched,
        });
    }

    /// Resets every modified slot and tears down all overlay nodes. Safe to
    /// call repeatedly. Returns the number of slots reset.
    pub fn release_all(&mut self, widgets: &mut dyn HostWidgets, tracer: &mut Tracer<'_>) -> u32 {
        let frame_index = self.frame_index;
        let mut reset = 0;
        for state in self.slots.iter_mut().filter(|s| s.is_modified()) {
            state.reset(widgets);
            reset += 1;
            tracer.slot_reset(&SlotResetEvent {
                frame_index,
                slot: slot_id(state.slot()),
                reason: ResetReason::ResetAll,
            });
        }
        let slots = mem::take(&mut self.slots);
        let freed = self.nodes.teardown(widgets, slots);
        if freed > 0 {
            tracing::debug!(freed, "overlay nodes released");
            tracer.nodes_destroyed(&NodesDestroyedEvent {
                frame_index,
                freed,
            });
        }
        reset
    }
}

/// Resolves one slot and writes its text edits. An `Err` names why the slot
/// goes back to host defaults.
fn update_slot(
    slot: usize,
    accessor: &mut SlotFieldAccessor<'_>,
    world: &dyn HostWorld,
    resolver: &DisplayPolicyResolver,
    view: PartyView<'_>,
    services: PolicyServices<'_>,
    resources: &mut EngineResources,
    frame_index: u64,
    tracer: &mut Tracer<'_>,
) -> Result<DisplayDecision, ResetReason> {
    let kind = accessor
        .read_number(slot, NumberField::PlateKind)
        .map_err(|err| slot_failed(&err))?;
    if PlateKind::from_raw(kind) != PlateKind::Player {
        return Err(ResetReason::NotPlayer);
    }
    let player = world.player_at(slot).ok_or(ResetReason::NotPlayer)?;

    let decision = resolver.resolve(&player, view, services, &mut resources.icon_cache);
    let (primary_icon, secondary_icon) = decision
        .icons
        .map_or((0, 0), |pair| (pair.primary.icon_id, pair.secondary.icon_id));
    tracer.slot_resolved(&SlotResolvedEvent {
        frame_index,
        slot: slot_id(slot),
        mode: decision.mode,
        membership: decision.membership,
        status: decision.status,
        swap: decision.swap,
        primary_icon,
        secondary_icon,
    });

    apply_text(accessor, slot, &decision.text, &resources.empty_text)
        .map_err(|err| slot_failed(&err))?;

    if decision.has_overlay() {
        Ok(decision)
    } else {
        Err(no_overlay_reason(decision.mode))
    }
}

fn slot_failed(err: &SlotError) -> ResetReason {
    tracing::debug!(%err, "releasing slot");
    ResetReason::SlotError
}

fn no_overlay_reason(mode: ModeKind) -> ResetReason {
    if mode == ModeKind::Hide {
        ResetReason::PlayerHide
    } else {
        ResetReason::PlayerDefault
    }
}

fn apply_text(
    accessor: &mut SlotFieldAccessor<'_>,
    slot: usize,
    edits: &PlateTextEdits,
    empty: &SharedText,
) -> Result<(), SlotError> {
    for (field, edit) in [
        (TextField::Name, &edits.name),
        (TextField::StatusPrefix, &edits.prefix),
        (TextField::FreeCompanyTag, &edits.free_company),
    ] {
        match edit {
            TextEdit::Keep => {}
            TextEdit::Clear => accessor.clear_text(slot, field, empty)?,
            TextEdit::Set(bytes) => accessor.write_text(slot, field, bytes)?,
        }
    }
    if let Some(show) = edits.show_title {
        accessor.set_display_title(slot, show)?;
    }
    if let Some(icon) = edits.name_icon {
        let icon = i32::try_from(icon).unwrap_or_default();
        accessor.write_number(slot, NumberField::NameIconId, icon)?;
    }
    Ok(())
}

fn force_redraw(widgets: &mut dyn HostWidgets) -> RedrawMethod {
    if widgets.request_full_redraw() {
        return RedrawMethod::Direct;
    }
    if let Some(value) = widgets.ui_option(REDRAW_TOGGLE_OPTION) {
        widgets.set_ui_option(REDRAW_TOGGLE_OPTION, u32::from(value == 0));
        widgets.set_ui_option(REDRAW_TOGGLE_OPTION, value);
    }
    widgets.set_full_update();
    RedrawMethod::OptionToggle
}
