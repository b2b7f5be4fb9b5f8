// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed, bounds-checked access to the host's per-slot arrays.

use core::fmt;

use crate::error::{SlotError, SlotField};
use crate::host::{SharedText, SlotArrays, TextWrite};
use crate::slot::{NumberField, TextField};

/// `UpdateFlags` bit set while the host is refreshing a slot.
pub const UPDATE_FLAG_UPDATING: i32 = 0x1;
/// `UpdateFlags` bit requesting a color refresh.
pub const UPDATE_FLAG_COLOR: i32 = 0x2;
/// `DrawFlags` bit that hides the title.
pub const DRAW_FLAG_HIDE_TITLE: i32 = 0x80;

/// Field access for one frame.
///
/// Borrows the host arrays for the duration of a frame callback, so it cannot
/// be kept past it. Every access is checked against the frame's active slot
/// count.
pub struct SlotFieldAccessor<'f> {
    arrays: &'f mut dyn SlotArrays,
    active: usize,
}

impl fmt::Debug for SlotFieldAccessor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotFieldAccessor")
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl<'f> SlotFieldAccessor<'f> {
    /// Wraps `arrays`, treating slots `0..active` as addressable.
    pub fn new(arrays: &'f mut dyn SlotArrays, active: usize) -> Self {
        Self { arrays, active }
    }

    /// Number of addressable slots.
    #[inline]
    #[must_use]
    pub fn active_slot_count(&self) -> usize {
        self.active
    }

    fn check(&self, slot: usize) -> Result<(), SlotError> {
        if slot < self.active {
            Ok(())
        } else {
            Err(SlotError::OutOfRange {
                slot,
                active: self.active,
            })
        }
    }

    /// Reads an integer field.
    pub fn read_number(&self, slot: usize, field: NumberField) -> Result<i32, SlotError> {
        self.check(slot)?;
        self.arrays
            .number(slot, field)
            .ok_or(SlotError::MissingField {
                slot,
                field: SlotField::Number(field),
            })
    }

    /// Writes an integer field. A changed name color also requests a color
    /// refresh through `UpdateFlags`.
    pub fn write_number(&mut self, slot: usize, field: NumberField, value: i32) -> Result<(), SlotError> {
        self.check(slot)?;
        let changed = field.is_color() && self.read_number(slot, field)? != value;
        self.put_number(slot, field, value)?;
        if changed {
            let flags = self.read_number(slot, NumberField::UpdateFlags)?;
            self.put_number(slot, NumberField::UpdateFlags, flags | UPDATE_FLAG_COLOR)?;
        }
        Ok(())
    }

    fn put_number(&mut self, slot: usize, field: NumberField, value: i32) -> Result<(), SlotError> {
        if self.arrays.set_number(slot, field, value) {
            Ok(())
        } else {
            Err(SlotError::MissingField {
                slot,
                field: SlotField::Number(field),
            })
        }
    }

    /// Reads a text field.
    pub fn read_text(&self, slot: usize, field: TextField) -> Result<&[u8], SlotError> {
        self.check(slot)?;
        self.arrays.text(slot, field).ok_or(SlotError::MissingField {
            slot,
            field: SlotField::Text(field),
        })
    }

    /// Writes a text field; the host copies `bytes`.
    pub fn write_text(&mut self, slot: usize, field: TextField, bytes: &[u8]) -> Result<(), SlotError> {
        self.put_text(slot, field, TextWrite::Copy(bytes))
    }

    /// Points a text field at the shared empty sentinel.
    pub fn clear_text(&mut self, slot: usize, field: TextField, empty: &SharedText) -> Result<(), SlotError> {
        self.put_text(slot, field, TextWrite::Shared(empty))
    }

    fn put_text(&mut self, slot: usize, field: TextField, text: TextWrite<'_>) -> Result<(), SlotError> {
        self.check(slot)?;
        if self.arrays.set_text(slot, field, text) {
            Ok(())
        } else {
            Err(SlotError::MissingField {
                slot,
                field: SlotField::Text(field),
            })
        }
    }

    /// Shows or hides the title.
    pub fn set_display_title(&mut self, slot: usize, display: bool) -> Result<(), SlotError> {
        let flags = self.read_number(slot, NumberField::DrawFlags)?;
        let flags = if display {
            flags & !DRAW_FLAG_HIDE_TITLE
        } else {
            flags | DRAW_FLAG_HIDE_TITLE
        };
        self.put_number(slot, NumberField::DrawFlags, flags)
    }

    /// Returns whether the host marked the slot as updating this frame.
    pub fn is_updating(&self, slot: usize) -> Result<bool, SlotError> {
        Ok(self.read_number(slot, NumberField::UpdateFlags)? & UPDATE_FLAG_UPDATING != 0)
    }
}
