// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Recorded events carry a frame index but no clock reading, so timestamps
//! are synthesized: each frame starts at `frame_index * frame_interval_us`
//! and events inside a frame are spaced one microsecond apart in recording
//! order. Slot events land on one track per slot (`tid = slot + 1`).
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], frame_interval_us: f64, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut clock = FrameClock::new(frame_interval_us);

    for recorded in decode(bytes) {
        let ts = clock.stamp(recorded.frame_index());
        match recorded {
            RecordedEvent::StateChange(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "StateChange",
                    "cat": "Coordinator",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "from": format!("{:?}", e.from),
                        "to": format!("{:?}", e.to),
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": format!("{:?}", e.phase),
                    "cat": "Frame",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": format!("{:?}", e.phase),
                    "cat": "Frame",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                        "slots_touched": e.slots_touched,
                    }
                }));
            }
            RecordedEvent::SlotResolved(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Resolved",
                    "cat": "Slot",
                    "ts": ts,
                    "pid": 0,
                    "tid": u32::from(e.slot) + 1,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "mode": format!("{:?}", e.mode),
                        "membership": format!("{:?}", e.membership),
                        "status": format!("{:?}", e.status),
                        "swap": format!("{:?}", e.swap),
                        "primary_icon": e.primary_icon,
                        "secondary_icon": e.secondary_icon,
                    }
                }));
            }
            RecordedEvent::SlotReset(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Reset",
                    "cat": "Slot",
                    "ts": ts,
                    "pid": 0,
                    "tid": u32::from(e.slot) + 1,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "reason": format!("{:?}", e.reason),
                    }
                }));
            }
            RecordedEvent::LayoutApplied(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Layout",
                    "cat": "Slot",
                    "ts": ts,
                    "pid": 0,
                    "tid": u32::from(e.slot) + 1,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "kind": format!("{:?}", e.kind),
                        "text_width": e.text_width,
                        "primary_shown": e.primary_shown,
                        "secondary_shown": e.secondary_shown,
                    }
                }));
            }
            RecordedEvent::NodesCreated(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "NodesCreated",
                    "cat": "Nodes",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "slots": e.slots,
                    }
                }));
            }
            RecordedEvent::NodesDestroyed(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "NodesDestroyed",
                    "cat": "Nodes",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "freed": e.freed,
                    }
                }));
            }
            RecordedEvent::Redraw(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Redraw",
                    "cat": "Coordinator",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "frame_index": e.frame_index,
                        "method": format!("{:?}", e.method),
                    }
                }));
            }
            RecordedEvent::Fault(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("Fault:{:?}", e.kind),
                    "cat": "Fault",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.slot.map_or(0, |s| u32::from(s) + 1),
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "slot": e.slot,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

/// Synthesizes monotonic timestamps from frame indices.
struct FrameClock {
    interval_us: f64,
    frame: Option<u64>,
    offset_us: f64,
}

impl FrameClock {
    fn new(interval_us: f64) -> Self {
        Self {
            interval_us,
            frame: None,
            offset_us: 0.0,
        }
    }

    fn stamp(&mut self, frame_index: u64) -> f64 {
        if self.frame == Some(frame_index) {
            self.offset_us += 1.0;
        } else {
            self.frame = Some(frame_index);
            self.offset_us = 0.0;
        }
        frame_index as f64 * self.interval_us + self.offset_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use plateglyph_core::trace::{
        FramePhase, PhaseBeginEvent, PhaseEndEvent, ResetReason, SlotResetEvent, TraceSink,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_phase_begin(&PhaseBeginEvent {
            frame_index: 2,
            phase: FramePhase::PreUpdate,
        });
        rec.on_slot_reset(&SlotResetEvent {
            frame_index: 2,
            slot: 5,
            reason: ResetReason::Hidden,
        });
        rec.on_phase_end(&PhaseEndEvent {
            frame_index: 2,
            phase: FramePhase::PreUpdate,
            slots_touched: 1,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), 1000.0, &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["name"], "PreUpdate");

        assert_eq!(parsed[1]["ph"], "i");
        assert_eq!(parsed[1]["tid"], 6);
        assert_eq!(parsed[1]["args"]["reason"], "Hidden");

        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["name"], "PreUpdate");
    }

    #[test]
    fn timestamps_advance_within_a_frame() {
        let mut rec = RecorderSink::new();
        for frame_index in [3, 3, 4] {
            rec.on_phase_begin(&PhaseBeginEvent {
                frame_index,
                phase: FramePhase::PreDraw,
            });
        }

        let mut out = Vec::new();
        export(rec.as_bytes(), 100.0, &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        let ts: Vec<f64> = parsed.iter().map(|e| e["ts"].as_f64().unwrap()).collect();
        assert_eq!(ts, [300.0, 301.0, 400.0]);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], 16_666.0, &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
