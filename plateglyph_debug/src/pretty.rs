// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use plateglyph_core::trace::{
    FaultEvent, FramePhase, LayoutAppliedEvent, NodesCreatedEvent, NodesDestroyedEvent,
    PhaseBeginEvent, PhaseEndEvent, RedrawEvent, SlotResetEvent, SlotResolvedEvent,
    StateChangeEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    quiet_phases: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("quiet_phases", &self.quiet_phases)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            quiet_phases: false,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            quiet_phases: false,
        }
    }

    /// Skips phase lines whose callback did no slot work.
    #[must_use]
    pub fn quiet_phases(mut self, quiet: bool) -> Self {
        self.quiet_phases = quiet;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn phase_name(phase: FramePhase) -> &'static str {
    match phase {
        FramePhase::PreUpdate => "update",
        FramePhase::PreDraw => "draw",
        FramePhase::PreFinalize => "finalize",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_state_change(&mut self, e: &StateChangeEvent) {
        let _ = writeln!(
            self.writer,
            "[state] frame={} {:?} -> {:?}",
            e.frame_index, e.from, e.to,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        if self.quiet_phases {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {}",
            e.frame_index,
            phase_name(e.phase),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        if self.quiet_phases && e.slots_touched == 0 {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} slots={}",
            e.frame_index,
            phase_name(e.phase),
            e.slots_touched,
        );
    }

    fn on_slot_resolved(&mut self, e: &SlotResolvedEvent) {
        let _ = writeln!(
            self.writer,
            "[resolve] frame={} slot={} mode={:?} who={:?} status={:?} swap={:?} icons={}/{}",
            e.frame_index,
            e.slot,
            e.mode,
            e.membership,
            e.status,
            e.swap,
            e.primary_icon,
            e.secondary_icon,
        );
    }

    fn on_slot_reset(&mut self, e: &SlotResetEvent) {
        let _ = writeln!(
            self.writer,
            "[reset] frame={} slot={} reason={:?}",
            e.frame_index, e.slot, e.reason,
        );
    }

    fn on_layout_applied(&mut self, e: &LayoutAppliedEvent) {
        let shown = match (e.primary_shown, e.secondary_shown) {
            (true, true) => "both",
            (true, false) => "primary",
            (false, true) => "secondary",
            (false, false) => "none",
        };
        let _ = writeln!(
            self.writer,
            "[layout] frame={} slot={} {:?} width={:.1} shown={shown}",
            e.frame_index, e.slot, e.kind, e.text_width,
        );
    }

    fn on_nodes_created(&mut self, e: &NodesCreatedEvent) {
        let _ = writeln!(
            self.writer,
            "[nodes] frame={} created for {} slots",
            e.frame_index, e.slots,
        );
    }

    fn on_nodes_destroyed(&mut self, e: &NodesDestroyedEvent) {
        let _ = writeln!(
            self.writer,
            "[nodes] frame={} freed {}",
            e.frame_index, e.freed,
        );
    }

    fn on_redraw(&mut self, e: &RedrawEvent) {
        let _ = writeln!(
            self.writer,
            "[redraw] frame={} via {:?}",
            e.frame_index, e.method,
        );
    }

    fn on_fault(&mut self, e: &FaultEvent) {
        let slot = e.slot.map_or_else(|| "-".to_owned(), |s| s.to_string());
        let _ = writeln!(
            self.writer,
            "[FAULT] frame={} kind={:?} slot={slot}",
            e.frame_index, e.kind,
        );
    }
}
