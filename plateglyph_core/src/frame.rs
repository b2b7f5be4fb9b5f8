// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame view of the host's nameplate state.

use crate::accessor::SlotFieldAccessor;
use crate::error::FrameError;
use crate::host::SlotArrays;
use crate::slot::{CAPACITY, SlotMask};

/// What the host hands the engine at pre-update.
pub struct FrameInput<'f> {
    /// Per-slot arrays; `None` if the host did not expose them.
    pub arrays: Option<&'f mut dyn SlotArrays>,
    /// Number of slots in use this frame.
    pub active_slot_count: usize,
    /// The host is refreshing every slot.
    pub is_full_update: bool,
    /// Slots the host flagged as updating, for incremental frames.
    pub updating: SlotMask,
}

impl core::fmt::Debug for FrameInput<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameInput")
            .field("arrays", &self.arrays.is_some())
            .field("active_slot_count", &self.active_slot_count)
            .field("is_full_update", &self.is_full_update)
            .field("updating", &self.updating)
            .finish()
    }
}

/// Validated frame state, rebuilt every pre-update.
#[derive(Debug)]
pub struct FrameContext<'f> {
    accessor: SlotFieldAccessor<'f>,
    is_full_update: bool,
    updating: SlotMask,
}

impl<'f> FrameContext<'f> {
    /// Validates `input`.
    ///
    /// # Errors
    ///
    /// [`FrameError::ArraysMissing`] if the host arrays are absent and
    /// [`FrameError::ActiveCountOutOfRange`] if the active count exceeds
    /// [`CAPACITY`].
    pub fn new(input: FrameInput<'f>) -> Result<Self, FrameError> {
        let arrays = input.arrays.ok_or(FrameError::ArraysMissing)?;
        if input.active_slot_count > CAPACITY {
            return Err(FrameError::ActiveCountOutOfRange(input.active_slot_count));
        }
        Ok(Self {
            accessor: SlotFieldAccessor::new(arrays, input.active_slot_count),
            is_full_update: input.is_full_update,
            updating: input.updating,
        })
    }

    /// Number of slots in use.
    #[inline]
    #[must_use]
    pub fn active_slot_count(&self) -> usize {
        self.accessor.active_slot_count()
    }

    /// Whether every active slot is being refreshed.
    #[inline]
    #[must_use]
    pub fn is_full_update(&self) -> bool {
        self.is_full_update
    }

    /// Slots that need work this frame: every active slot on a full update,
    /// otherwise only the flagged ones.
    #[must_use]
    pub fn slots_to_process(&self) -> SlotMask {
        let active = self.active_slot_count();
        if self.is_full_update {
            (0..active).collect()
        } else {
            self.updating.iter().filter(|&slot| slot < active).collect()
        }
    }

    /// Field access for this frame.
    #[inline]
    pub fn accessor(&mut self) -> &mut SlotFieldAccessor<'f> {
        &mut self.accessor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TextWrite;
    use crate::slot::{NumberField, TextField};

    struct Empty;

    impl SlotArrays for Empty {
        fn number(&self, _slot: usize, _field: NumberField) -> Option<i32> {
            Some(0)
        }

        fn set_number(&mut self, _slot: usize, _field: NumberField, _value: i32) -> bool {
            true
        }

        fn text(&self, _slot: usize, _field: TextField) -> Option<&[u8]> {
            Some(b"")
        }

        fn set_text(&mut self, _slot: usize, _field: TextField, _text: TextWrite<'_>) -> bool {
            true
        }
    }

    fn input(arrays: &mut Empty, active: usize, full: bool, updating: SlotMask) -> FrameInput<'_> {
        FrameInput {
            arrays: Some(arrays),
            active_slot_count: active,
            is_full_update: full,
            updating,
        }
    }

    #[test]
    fn missing_arrays_fail() {
        let err = FrameContext::new(FrameInput {
            arrays: None,
            active_slot_count: 3,
            is_full_update: true,
            updating: SlotMask::EMPTY,
        })
        .unwrap_err();
        assert_eq!(err, FrameError::ArraysMissing);
    }

    #[test]
    fn active_count_is_bounded() {
        let mut arrays = Empty;
        let err = FrameContext::new(input(&mut arrays, CAPACITY + 1, true, SlotMask::EMPTY)).unwrap_err();
        assert_eq!(err, FrameError::ActiveCountOutOfRange(CAPACITY + 1));
        let mut arrays = Empty;
        assert!(FrameContext::new(input(&mut arrays, CAPACITY, true, SlotMask::EMPTY)).is_ok());
        let mut arrays = Empty;
        assert!(FrameContext::new(input(&mut arrays, 0, true, SlotMask::EMPTY)).is_ok());
    }

    #[test]
    fn full_update_processes_every_active_slot() {
        let mut arrays = Empty;
        let frame = FrameContext::new(input(&mut arrays, 5, true, SlotMask::single(7).unwrap())).unwrap();
        assert_eq!(frame.slots_to_process().len(), 5);
    }

    #[test]
    fn incremental_update_processes_flagged_active_slots() {
        let mut arrays = Empty;
        let updating: SlotMask = [2, 7, 30].into_iter().collect();
        let frame = FrameContext::new(input(&mut arrays, 10, false, updating)).unwrap();
        let slots: alloc::vec::Vec<usize> = frame.slots_to_process().iter().collect();
        assert_eq!(slots, [2, 7]);
    }
}
