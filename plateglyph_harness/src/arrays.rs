// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory slot arrays with an access log.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;

use plateglyph_core::error::SlotField;
use plateglyph_core::host::{PlateKind, SharedText, SlotArrays, TextWrite};
use plateglyph_core::slot::{CAPACITY, NumberField, SlotMask, TextField};

/// One text cell: owned bytes, or a buffer shared with the writer.
#[derive(Clone, Debug)]
enum TextCell {
    Owned(Vec<u8>),
    Shared(SharedText),
}

impl TextCell {
    fn bytes(&self) -> &[u8] {
        match self {
            Self::Owned(bytes) => bytes,
            Self::Shared(shared) => shared,
        }
    }
}

/// Slot arrays backed by plain vectors.
///
/// Every read and write marks the slot in an access log, so tests can check
/// exactly which slots a frame touched.
#[derive(Debug)]
pub struct SimArrays {
    numbers: Vec<[i32; NumberField::COUNT]>,
    texts: Vec<[TextCell; TextField::COUNT]>,
    hidden: Vec<(usize, SlotField)>,
    accessed: Cell<u64>,
    shared_writes: u32,
}

impl Default for SimArrays {
    fn default() -> Self {
        Self::new()
    }
}

impl SimArrays {
    /// All slots empty, every plate kind set to an NPC.
    #[must_use]
    pub fn new() -> Self {
        let mut numbers = [0; NumberField::COUNT];
        numbers[NumberField::PlateKind.index()] = PlateKind::FriendlyNpc.to_raw();
        let empty: [TextCell; TextField::COUNT] = core::array::from_fn(|_| TextCell::Owned(Vec::new()));
        Self {
            numbers: alloc::vec![numbers; CAPACITY],
            texts: alloc::vec![empty; CAPACITY],
            hidden: Vec::new(),
            accessed: Cell::new(0),
            shared_writes: 0,
        }
    }

    /// Sets a number without logging.
    pub fn put_number(&mut self, slot: usize, field: NumberField, value: i32) {
        self.numbers[slot][field.index()] = value;
    }

    /// Reads a number without logging.
    #[must_use]
    pub fn peek_number(&self, slot: usize, field: NumberField) -> i32 {
        self.numbers[slot][field.index()]
    }

    /// Sets a text without logging.
    pub fn put_text(&mut self, slot: usize, field: TextField, text: &[u8]) {
        self.texts[slot][field.index()] = TextCell::Owned(text.to_vec());
    }

    /// Reads a text without logging.
    #[must_use]
    pub fn peek_text(&self, slot: usize, field: TextField) -> &[u8] {
        self.texts[slot][field.index()].bytes()
    }

    /// Whether the cell currently points at a shared buffer.
    #[must_use]
    pub fn is_shared(&self, slot: usize, field: TextField) -> bool {
        matches!(self.texts[slot][field.index()], TextCell::Shared(_))
    }

    /// Number of writes that handed over a shared buffer.
    #[must_use]
    pub fn shared_writes(&self) -> u32 {
        self.shared_writes
    }

    /// Stops exposing a cell, as a host does for fields it skips.
    pub fn hide_field(&mut self, slot: usize, field: SlotField) {
        self.hidden.push((slot, field));
    }

    /// Slots read or written since the last [`clear_access_log`](Self::clear_access_log).
    #[must_use]
    pub fn accessed_slots(&self) -> SlotMask {
        let bits = self.accessed.get();
        (0..CAPACITY).filter(|&slot| bits & (1 << slot) != 0).collect()
    }

    /// Forgets logged accesses.
    pub fn clear_access_log(&mut self) {
        self.accessed.set(0);
    }

    fn log(&self, slot: usize) {
        if slot < CAPACITY {
            self.accessed.set(self.accessed.get() | (1 << slot));
        }
    }

    fn exposed(&self, slot: usize, field: SlotField) -> bool {
        slot < CAPACITY && !self.hidden.contains(&(slot, field))
    }
}

impl SlotArrays for SimArrays {
    fn number(&self, slot: usize, field: NumberField) -> Option<i32> {
        self.log(slot);
        self.exposed(slot, SlotField::Number(field))
            .then(|| self.numbers[slot][field.index()])
    }

    fn set_number(&mut self, slot: usize, field: NumberField, value: i32) -> bool {
        self.log(slot);
        if !self.exposed(slot, SlotField::Number(field)) {
            return false;
        }
        self.numbers[slot][field.index()] = value;
        true
    }

    fn text(&self, slot: usize, field: TextField) -> Option<&[u8]> {
        self.log(slot);
        self.exposed(slot, SlotField::Text(field))
            .then(|| self.texts[slot][field.index()].bytes())
    }

    fn set_text(&mut self, slot: usize, field: TextField, text: TextWrite<'_>) -> bool {
        self.log(slot);
        if !self.exposed(slot, SlotField::Text(field)) {
            return false;
        }
        self.texts[slot][field.index()] = match text {
            TextWrite::Copy(bytes) => TextCell::Owned(bytes.to_vec()),
            TextWrite::Shared(shared) => {
                self.shared_writes += 1;
                TextCell::Shared(Arc::clone(shared))
            }
        };
        true
    }
}
