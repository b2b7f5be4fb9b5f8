// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structured events for the per-frame overlay pass.
//!
//! This module provides a [`TraceSink`] trait with one method per event the
//! coordinator emits. All method bodies default to no-ops, so implementing
//! only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Human-readable diagnostics go through the `tracing` facade instead; these
//! events are meant for recording and replay.

use crate::config::ModeKind;
use crate::coordinator::CoordinatorState;
use crate::error::{FrameError, NodeError};
use crate::layout::LayoutKind;
use crate::policy::{MembershipClass, SwapOutcome};
use crate::status::Status;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which host callback is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FramePhase {
    /// Before the host updates plate data.
    PreUpdate,
    /// Before the host draws.
    PreDraw,
    /// Before the host destroys the plate widget.
    PreFinalize,
}

/// Why a slot went back to host defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResetReason {
    /// The plate changed to a non-player kind between update and draw.
    KindChanged,
    /// The plate is not visible.
    Hidden,
    /// A PvP match is active.
    PvP,
    /// The slot does not show a player.
    NotPlayer,
    /// The player's mode is Default.
    PlayerDefault,
    /// The player's mode is Hide.
    PlayerHide,
    /// Every slot was reset (teardown or stop).
    ResetAll,
    /// A per-slot host access failed.
    SlotError,
}

/// How a forced redraw was carried out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RedrawMethod {
    /// The host's own redraw request.
    Direct,
    /// Flipping the host UI option and back.
    OptionToggle,
}

/// What stopped the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Host arrays missing at pre-update.
    ArraysMissing,
    /// Active slot count out of range.
    ActiveCountOutOfRange,
    /// Widget tree unresolved during node creation.
    MissingTree,
    /// Link target missing during node creation.
    MissingLinkTarget,
    /// Host call failed during node creation.
    Host,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the coordinator changes state.
#[derive(Clone, Copy, Debug)]
pub struct StateChangeEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Previous state.
    pub from: CoordinatorState,
    /// New state.
    pub to: CoordinatorState,
}

/// Marks the beginning of a host callback.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which callback.
    pub phase: FramePhase,
}

/// Marks the end of a host callback.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which callback.
    pub phase: FramePhase,
    /// Slots the callback did work for.
    pub slots_touched: u32,
}

/// Emitted after the display policy resolved a slot.
#[derive(Clone, Copy, Debug)]
pub struct SlotResolvedEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Slot index.
    pub slot: u8,
    /// Resolved mode.
    pub mode: ModeKind,
    /// Membership of the player.
    pub membership: MembershipClass,
    /// Player status.
    pub status: Status,
    /// Swap step result.
    pub swap: SwapOutcome,
    /// Primary icon id, 0 if none.
    pub primary_icon: u32,
    /// Secondary icon id, 0 if none.
    pub secondary_icon: u32,
}

/// Emitted when a slot is released to host defaults.
#[derive(Clone, Copy, Debug)]
pub struct SlotResetEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Slot index.
    pub slot: u8,
    /// Why.
    pub reason: ResetReason,
}

/// Emitted after geometry was applied to a slot's nodes.
#[derive(Clone, Copy, Debug)]
pub struct LayoutAppliedEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Slot index.
    pub slot: u8,
    /// Layout family used.
    pub kind: LayoutKind,
    /// Name text width the layout was computed from.
    pub text_width: f64,
    /// Primary node shown.
    pub primary_shown: bool,
    /// Secondary node shown.
    pub secondary_shown: bool,
}

/// Emitted when overlay nodes were created for every slot.
#[derive(Clone, Copy, Debug)]
pub struct NodesCreatedEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Number of slots equipped.
    pub slots: u8,
}

/// Emitted after overlay nodes were torn down.
#[derive(Clone, Copy, Debug)]
pub struct NodesDestroyedEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Nodes unlinked and freed.
    pub freed: u32,
}

/// Emitted when a forced redraw runs.
#[derive(Clone, Copy, Debug)]
pub struct RedrawEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Mechanism used.
    pub method: RedrawMethod,
}

/// Emitted once when the engine stops.
#[derive(Clone, Copy, Debug)]
pub struct FaultEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// What failed.
    pub kind: FaultKind,
    /// Slot involved, if any.
    pub slot: Option<u8>,
}

impl FaultEvent {
    /// Describes a frame context failure.
    #[must_use]
    pub fn frame(frame_index: u64, error: &FrameError) -> Self {
        let kind = match error {
            FrameError::ArraysMissing => FaultKind::ArraysMissing,
            FrameError::ActiveCountOutOfRange(_) => FaultKind::ActiveCountOutOfRange,
        };
        Self {
            frame_index,
            kind,
            slot: None,
        }
    }

    /// Describes a node creation failure.
    #[must_use]
    pub fn node(frame_index: u64, error: &NodeError) -> Self {
        let (kind, slot) = match *error {
            NodeError::MissingTree { slot } => (FaultKind::MissingTree, slot),
            NodeError::MissingLinkTarget { slot, .. } => (FaultKind::MissingLinkTarget, slot),
            NodeError::Host { slot, .. } => (FaultKind::Host, slot),
        };
        Self {
            frame_index,
            kind,
            slot: Some(slot_id(slot)),
        }
    }
}

/// Narrows a slot index for event payloads.
#[inline]
#[must_use]
pub fn slot_id(slot: usize) -> u8 {
    u8::try_from(slot).unwrap_or(u8::MAX)
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the coordinator.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when the coordinator changes state.
    fn on_state_change(&mut self, e: &StateChangeEvent) {
        _ = e;
    }

    /// Called at the start of a host callback.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a host callback.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after a slot was resolved.
    fn on_slot_resolved(&mut self, e: &SlotResolvedEvent) {
        _ = e;
    }

    /// Called when a slot is reset.
    fn on_slot_reset(&mut self, e: &SlotResetEvent) {
        _ = e;
    }

    /// Called after layout was applied to a slot.
    fn on_layout_applied(&mut self, e: &LayoutAppliedEvent) {
        _ = e;
    }

    /// Called after overlay nodes were created.
    fn on_nodes_created(&mut self, e: &NodesCreatedEvent) {
        _ = e;
    }

    /// Called after overlay nodes were torn down.
    fn on_nodes_destroyed(&mut self, e: &NodesDestroyedEvent) {
        _ = e;
    }

    /// Called when a forced redraw runs.
    fn on_redraw(&mut self, e: &RedrawEvent) {
        _ = e;
    }

    /// Called when the engine stops on an error.
    fn on_fault(&mut self, e: &FaultEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`StateChangeEvent`].
    #[inline]
    pub fn state_change(&mut self, e: &StateChangeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_state_change(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SlotResolvedEvent`].
    #[inline]
    pub fn slot_resolved(&mut self, e: &SlotResolvedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_slot_resolved(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SlotResetEvent`].
    #[inline]
    pub fn slot_reset(&mut self, e: &SlotResetEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_slot_reset(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LayoutAppliedEvent`].
    #[inline]
    pub fn layout_applied(&mut self, e: &LayoutAppliedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_layout_applied(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NodesCreatedEvent`].
    #[inline]
    pub fn nodes_created(&mut self, e: &NodesCreatedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_nodes_created(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NodesDestroyedEvent`].
    #[inline]
    pub fn nodes_destroyed(&mut self, e: &NodesDestroyedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_nodes_destroyed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RedrawEvent`].
    #[inline]
    pub fn redraw(&mut self, e: &RedrawEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_redraw(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FaultEvent`].
    #[inline]
    pub fn fault(&mut self, e: &FaultEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_fault(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::host::NodeHandle;

    #[test]
    fn fault_events_carry_slot() {
        let e = FaultEvent::node(
            3,
            &NodeError::MissingLinkTarget {
                slot: 12,
                node_id: 8004,
                target_id: 4,
            },
        );
        assert_eq!(e.kind, FaultKind::MissingLinkTarget);
        assert_eq!(e.slot, Some(12));

        let e = FaultEvent::node(
            3,
            &NodeError::Host {
                slot: 1,
                source: HostError::StaleNode(NodeHandle::from_raw(9)),
            },
        );
        assert_eq!(e.kind, FaultKind::Host);

        let e = FaultEvent::frame(4, &FrameError::ActiveCountOutOfRange(60));
        assert_eq!(e.kind, FaultKind::ActiveCountOutOfRange);
        assert_eq!(e.slot, None);
    }

    #[test]
    fn slot_id_saturates() {
        assert_eq!(slot_id(49), 49);
        assert_eq!(slot_id(300), u8::MAX);
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.redraw(&RedrawEvent {
            frame_index: 0,
            method: RedrawMethod::Direct,
        });
        tracer.slot_reset(&SlotResetEvent {
            frame_index: 0,
            slot: 0,
            reason: ResetReason::PvP,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct ResetLog {
            reasons: Vec<ResetReason>,
        }
        impl TraceSink for ResetLog {
            fn on_slot_reset(&mut self, e: &SlotResetEvent) {
                self.reasons.push(e.reason);
            }
        }

        let mut sink = ResetLog { reasons: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.slot_reset(&SlotResetEvent {
            frame_index: 1,
            slot: 4,
            reason: ResetReason::Hidden,
        });
        drop(tracer);
        assert_eq!(sink.reasons, [ResetReason::Hidden]);
    }
}
