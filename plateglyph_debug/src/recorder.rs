// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`]. Decoding stops at the first unknown
//! tag or discriminant.

use plateglyph_core::config::ModeKind;
use plateglyph_core::coordinator::CoordinatorState;
use plateglyph_core::layout::LayoutKind;
use plateglyph_core::policy::{MembershipClass, SwapOutcome};
use plateglyph_core::status::Status;
use plateglyph_core::trace::{
    FaultEvent, FaultKind, FramePhase, LayoutAppliedEvent, NodesCreatedEvent, NodesDestroyedEvent,
    PhaseBeginEvent, PhaseEndEvent, RedrawEvent, RedrawMethod, ResetReason, SlotResetEvent,
    SlotResolvedEvent, StateChangeEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_STATE_CHANGE: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_SLOT_RESOLVED: u8 = 4;
const TAG_SLOT_RESET: u8 = 5;
const TAG_LAYOUT_APPLIED: u8 = 6;
const TAG_NODES_CREATED: u8 = 7;
const TAG_NODES_DESTROYED: u8 = 8;
const TAG_REDRAW: u8 = 9;
const TAG_FAULT: u8 = 10;

// ---------------------------------------------------------------------------
// Enum codes
// ---------------------------------------------------------------------------

const STATES: [CoordinatorState; 4] = [
    CoordinatorState::Uninitialized,
    CoordinatorState::WaitingForNodes,
    CoordinatorState::Ready,
    CoordinatorState::Stopped,
];

const PHASES: [FramePhase; 3] = [
    FramePhase::PreUpdate,
    FramePhase::PreDraw,
    FramePhase::PreFinalize,
];

const RESET_REASONS: [ResetReason; 8] = [
    ResetReason::KindChanged,
    ResetReason::Hidden,
    ResetReason::PvP,
    ResetReason::NotPlayer,
    ResetReason::PlayerDefault,
    ResetReason::PlayerHide,
    ResetReason::ResetAll,
    ResetReason::SlotError,
];

const REDRAW_METHODS: [RedrawMethod; 2] = [RedrawMethod::Direct, RedrawMethod::OptionToggle];

const FAULT_KINDS: [FaultKind; 5] = [
    FaultKind::ArraysMissing,
    FaultKind::ActiveCountOutOfRange,
    FaultKind::MissingTree,
    FaultKind::MissingLinkTarget,
    FaultKind::Host,
];

const MODES: [ModeKind; 7] = [
    ModeKind::Default,
    ModeKind::Hide,
    ModeKind::SmallJobIcon,
    ModeKind::SmallJobIconAndRole,
    ModeKind::BigJobIcon,
    ModeKind::BigJobIconAndPartySlot,
    ModeKind::RoleLetters,
];

const MEMBERSHIPS: [MembershipClass; 3] = [
    MembershipClass::LocalPlayer,
    MembershipClass::PartyMember,
    MembershipClass::Other,
];

const SWAPS: [SwapOutcome; 3] = [
    SwapOutcome::NotApplied,
    SwapOutcome::Swapped,
    SwapOutcome::Replaced,
];

const LAYOUTS: [LayoutKind; 3] = [
    LayoutKind::InlineSmall,
    LayoutKind::InlineLarge,
    LayoutKind::Centered,
];

/// Position of `value` in `table`, as a record byte.
fn code_of<T: PartialEq>(table: &[T], value: &T) -> u8 {
    let index = table.iter().position(|v| v == value).unwrap_or(usize::from(u8::MAX));
    u8::try_from(index).unwrap_or(u8::MAX)
}

fn from_code<T: Copy>(table: &[T], code: u8) -> Option<T> {
    table.get(usize::from(code)).copied()
}

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_option_u8(&mut self, v: Option<u8>) {
        match v {
            Some(val) => {
                self.write_u8(1);
                self.write_u8(val);
            }
            None => {
                self.write_u8(0);
                self.write_u8(0);
            }
        }
    }

    fn write_code<T: PartialEq>(&mut self, table: &[T], value: &T) {
        self.write_u8(code_of(table, value));
    }
}

impl TraceSink for RecorderSink {
    fn on_state_change(&mut self, e: &StateChangeEvent) {
        self.write_u8(TAG_STATE_CHANGE);
        self.write_u64(e.frame_index);
        self.write_code(&STATES, &e.from);
        self.write_code(&STATES, &e.to);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_code(&PHASES, &e.phase);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_code(&PHASES, &e.phase);
        self.write_u32(e.slots_touched);
    }

    fn on_slot_resolved(&mut self, e: &SlotResolvedEvent) {
        self.write_u8(TAG_SLOT_RESOLVED);
        self.write_u64(e.frame_index);
        self.write_u8(e.slot);
        self.write_code(&MODES, &e.mode);
        self.write_code(&MEMBERSHIPS, &e.membership);
        self.write_u8(e.status.code());
        self.write_code(&SWAPS, &e.swap);
        self.write_u32(e.primary_icon);
        self.write_u32(e.secondary_icon);
    }

    fn on_slot_reset(&mut self, e: &SlotResetEvent) {
        self.write_u8(TAG_SLOT_RESET);
        self.write_u64(e.frame_index);
        self.write_u8(e.slot);
        self.write_code(&RESET_REASONS, &e.reason);
    }

    fn on_layout_applied(&mut self, e: &LayoutAppliedEvent) {
        self.write_u8(TAG_LAYOUT_APPLIED);
        self.write_u64(e.frame_index);
        self.write_u8(e.slot);
        self.write_code(&LAYOUTS, &e.kind);
        self.write_f64(e.text_width);
        self.write_bool(e.primary_shown);
        self.write_bool(e.secondary_shown);
    }

    fn on_nodes_created(&mut self, e: &NodesCreatedEvent) {
        self.write_u8(TAG_NODES_CREATED);
        self.write_u64(e.frame_index);
        self.write_u8(e.slots);
    }

    fn on_nodes_destroyed(&mut self, e: &NodesDestroyedEvent) {
        self.write_u8(TAG_NODES_DESTROYED);
        self.write_u64(e.frame_index);
        self.write_u32(e.freed);
    }

    fn on_redraw(&mut self, e: &RedrawEvent) {
        self.write_u8(TAG_REDRAW);
        self.write_u64(e.frame_index);
        self.write_code(&REDRAW_METHODS, &e.method);
    }

    fn on_fault(&mut self, e: &FaultEvent) {
        self.write_u8(TAG_FAULT);
        self.write_u64(e.frame_index);
        self.write_code(&FAULT_KINDS, &e.kind);
        self.write_option_u8(e.slot);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`StateChangeEvent`].
    StateChange(StateChangeEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`SlotResolvedEvent`].
    SlotResolved(SlotResolvedEvent),
    /// A [`SlotResetEvent`].
    SlotReset(SlotResetEvent),
    /// A [`LayoutAppliedEvent`].
    LayoutApplied(LayoutAppliedEvent),
    /// A [`NodesCreatedEvent`].
    NodesCreated(NodesCreatedEvent),
    /// A [`NodesDestroyedEvent`].
    NodesDestroyed(NodesDestroyedEvent),
    /// A [`RedrawEvent`].
    Redraw(RedrawEvent),
    /// A [`FaultEvent`].
    Fault(FaultEvent),
}

impl RecordedEvent {
    /// Frame counter of the event.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        match self {
            Self::StateChange(e) => e.frame_index,
            Self::PhaseBegin(e) => e.frame_index,
            Self::PhaseEnd(e) => e.frame_index,
            Self::SlotResolved(e) => e.frame_index,
            Self::SlotReset(e) => e.frame_index,
            Self::LayoutApplied(e) => e.frame_index,
            Self::NodesCreated(e) => e.frame_index,
            Self::NodesDestroyed(e) => e.frame_index,
            Self::Redraw(e) => e.frame_index,
            Self::Fault(e) => e.frame_index,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_option_u8(&mut self) -> Option<Option<u8>> {
        let present = self.read_u8()?;
        let val = self.read_u8()?;
        Some((present != 0).then_some(val))
    }

    fn read_code<T: Copy>(&mut self, table: &[T]) -> Option<T> {
        from_code(table, self.read_u8()?)
    }

    fn decode_state_change(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::StateChange(StateChangeEvent {
            frame_index: self.read_u64()?,
            from: self.read_code(&STATES)?,
            to: self.read_code(&STATES)?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            frame_index: self.read_u64()?,
            phase: self.read_code(&PHASES)?,
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            frame_index: self.read_u64()?,
            phase: self.read_code(&PHASES)?,
            slots_touched: self.read_u32()?,
        }))
    }

    fn decode_slot_resolved(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SlotResolved(SlotResolvedEvent {
            frame_index: self.read_u64()?,
            slot: self.read_u8()?,
            mode: self.read_code(&MODES)?,
            membership: self.read_code(&MEMBERSHIPS)?,
            status: Status::from_code(self.read_u8()?)?,
            swap: self.read_code(&SWAPS)?,
            primary_icon: self.read_u32()?,
            secondary_icon: self.read_u32()?,
        }))
    }

    fn decode_slot_reset(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SlotReset(SlotResetEvent {
            frame_index: self.read_u64()?,
            slot: self.read_u8()?,
            reason: self.read_code(&RESET_REASONS)?,
        }))
    }

    fn decode_layout_applied(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::LayoutApplied(LayoutAppliedEvent {
            frame_index: self.read_u64()?,
            slot: self.read_u8()?,
            kind: self.read_code(&LAYOUTS)?,
            text_width: self.read_f64()?,
            primary_shown: self.read_bool()?,
            secondary_shown: self.read_bool()?,
        }))
    }

    fn decode_nodes_created(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::NodesCreated(NodesCreatedEvent {
            frame_index: self.read_u64()?,
            slots: self.read_u8()?,
        }))
    }

    fn decode_nodes_destroyed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::NodesDestroyed(NodesDestroyedEvent {
            frame_index: self.read_u64()?,
            freed: self.read_u32()?,
        }))
    }

    fn decode_redraw(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Redraw(RedrawEvent {
            frame_index: self.read_u64()?,
            method: self.read_code(&REDRAW_METHODS)?,
        }))
    }

    fn decode_fault(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Fault(FaultEvent {
            frame_index: self.read_u64()?,
            kind: self.read_code(&FAULT_KINDS)?,
            slot: self.read_option_u8()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_STATE_CHANGE => self.decode_state_change(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_SLOT_RESOLVED => self.decode_slot_resolved(),
            TAG_SLOT_RESET => self.decode_slot_reset(),
            TAG_LAYOUT_APPLIED => self.decode_layout_applied(),
            TAG_NODES_CREATED => self.decode_nodes_created(),
            TAG_NODES_DESTROYED => self.decode_nodes_destroyed(),
            TAG_REDRAW => self.decode_redraw(),
            TAG_FAULT => self.decode_fault(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_resolved() -> SlotResolvedEvent {
        SlotResolvedEvent {
            frame_index: 12,
            slot: 7,
            mode: ModeKind::BigJobIcon,
            membership: MembershipClass::PartyMember,
            status: Status::Disconnected,
            swap: SwapOutcome::Swapped,
            primary_icon: 61_505,
            secondary_icon: 62_024,
        }
    }

    #[test]
    fn slot_resolved_keeps_every_field() {
        let mut rec = RecorderSink::new();
        let orig = sample_resolved();
        rec.on_slot_resolved(&orig);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            RecordedEvent::SlotResolved(e) => {
                assert_eq!(e.frame_index, 12);
                assert_eq!(e.slot, 7);
                assert_eq!(e.mode, ModeKind::BigJobIcon);
                assert_eq!(e.membership, MembershipClass::PartyMember);
                assert_eq!(e.status, Status::Disconnected);
                assert_eq!(e.swap, SwapOutcome::Swapped);
                assert_eq!(e.primary_icon, 61_505);
                assert_eq!(e.secondary_icon, 62_024);
            }
            other => panic!("expected SlotResolved, got {other:?}"),
        }
    }

    #[test]
    fn layout_width_survives_bit_exact() {
        let mut rec = RecorderSink::new();
        rec.on_layout_applied(&LayoutAppliedEvent {
            frame_index: 3,
            slot: 1,
            kind: LayoutKind::Centered,
            text_width: 0.1 + 0.2,
            primary_shown: true,
            secondary_shown: false,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[0] {
            RecordedEvent::LayoutApplied(e) => {
                assert_eq!(e.text_width.to_bits(), (0.1_f64 + 0.2).to_bits());
                assert_eq!(e.kind, LayoutKind::Centered);
                assert!(e.primary_shown);
                assert!(!e.secondary_shown);
            }
            other => panic!("expected LayoutApplied, got {other:?}"),
        }
    }

    #[test]
    fn fault_slot_distinguishes_none() {
        let mut rec = RecorderSink::new();
        rec.on_fault(&FaultEvent {
            frame_index: 2,
            kind: FaultKind::ArraysMissing,
            slot: None,
        });
        rec.on_fault(&FaultEvent {
            frame_index: 4,
            kind: FaultKind::MissingLinkTarget,
            slot: Some(0),
        });

        let slots: Vec<_> = decode(rec.as_bytes())
            .map(|e| match e {
                RecordedEvent::Fault(f) => (f.kind, f.slot),
                other => panic!("expected Fault, got {other:?}"),
            })
            .collect();
        assert_eq!(
            slots,
            [
                (FaultKind::ArraysMissing, None),
                (FaultKind::MissingLinkTarget, Some(0)),
            ]
        );
    }

    #[test]
    fn mixed_stream_keeps_order() {
        let mut rec = RecorderSink::new();
        rec.on_state_change(&StateChangeEvent {
            frame_index: 1,
            from: CoordinatorState::Uninitialized,
            to: CoordinatorState::WaitingForNodes,
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            frame_index: 2,
            phase: FramePhase::PreDraw,
        });
        rec.on_nodes_created(&NodesCreatedEvent {
            frame_index: 2,
            slots: 50,
        });
        rec.on_redraw(&RedrawEvent {
            frame_index: 2,
            method: RedrawMethod::OptionToggle,
        });
        rec.on_phase_end(&PhaseEndEvent {
            frame_index: 2,
            phase: FramePhase::PreDraw,
            slots_touched: 0,
        });
        rec.on_slot_reset(&SlotResetEvent {
            frame_index: 3,
            slot: 9,
            reason: ResetReason::Hidden,
        });
        rec.on_nodes_destroyed(&NodesDestroyedEvent {
            frame_index: 4,
            freed: 100,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 7);
        assert!(matches!(events[0], RecordedEvent::StateChange(_)));
        assert!(matches!(events[1], RecordedEvent::PhaseBegin(_)));
        assert!(matches!(events[2], RecordedEvent::NodesCreated(e) if e.slots == 50));
        assert!(matches!(events[3], RecordedEvent::Redraw(_)));
        assert!(matches!(events[4], RecordedEvent::PhaseEnd(_)));
        assert!(matches!(events[5], RecordedEvent::SlotReset(e) if e.reason == ResetReason::Hidden));
        assert!(matches!(events[6], RecordedEvent::NodesDestroyed(e) if e.freed == 100));
        let frames: Vec<u64> = events.iter().map(RecordedEvent::frame_index).collect();
        assert_eq!(frames, [1, 2, 2, 2, 2, 3, 4]);
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_slot_resolved(&sample_resolved());
        rec.on_slot_resolved(&sample_resolved());
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }
}
