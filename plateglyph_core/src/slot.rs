// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot identity and per-slot host field layout.
//!
//! A slot is one fixed index into the host's nameplate array. The host lays
//! out [`NumberField::COUNT`] integers and [`TextField::COUNT`] strings per
//! slot; the enums here name those entries.

use core::fmt;

/// Number of nameplate slots the host allocates.
pub const CAPACITY: usize = 50;

/// Integer fields stored per slot in the host's number array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NumberField {
    /// Plate kind discriminant (see [`PlateKind`](crate::host::PlateKind)).
    PlateKind = 0,
    /// HP label state.
    HpLabelState = 1,
    /// Update flags. Bit 1 marks the slot as updating, bit 2 requests a
    /// color refresh.
    UpdateFlags = 2,
    /// Screen X.
    X = 3,
    /// Screen Y.
    Y = 4,
    /// Depth.
    Depth = 5,
    /// Host-side plate scale.
    Scale = 6,
    /// Gauge fill percentage.
    GaugeFillPercentage = 7,
    /// Name text color.
    NameTextColor = 8,
    /// Name edge color.
    NameEdgeColor = 9,
    /// Gauge fill color.
    GaugeFillColor = 10,
    /// Gauge container color.
    GaugeContainerColor = 11,
    /// Marker icon id.
    MarkerIconId = 12,
    /// Icon id drawn next to the name by the host itself.
    NameIconId = 13,
    /// Unknown adjustment value.
    UnknownAdjust14 = 14,
    /// Index of the plate in the host's own ordering.
    PlateIndex = 15,
    /// Unknown.
    Unknown16 = 16,
    /// Draw flags. Bit 0 puts the title before the name; bit `0x80` hides
    /// the title.
    DrawFlags = 17,
    /// Unknown.
    Unknown18 = 18,
    /// Unknown flag word.
    UnknownFlags19 = 19,
}

impl NumberField {
    /// Number of integer fields per slot.
    pub const COUNT: usize = 20;

    /// Returns the offset of this field within a slot's record.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns whether writing this field requests a color refresh.
    #[inline]
    #[must_use]
    pub const fn is_color(self) -> bool {
        matches!(self, Self::NameTextColor | Self::NameEdgeColor)
    }
}

/// Text fields stored per slot in the host's string array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TextField {
    /// Entity name.
    Name = 0,
    /// Title line.
    Title = 1,
    /// Free company tag.
    FreeCompanyTag = 2,
    /// Text drawn in front of the name.
    StatusPrefix = 3,
    /// Target suffix.
    TargetSuffix = 4,
    /// Level prefix.
    LevelPrefix = 5,
}

impl TextField {
    /// Number of text fields per slot.
    pub const COUNT: usize = 6;

    /// All text fields in host order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Name,
        Self::Title,
        Self::FreeCompanyTag,
        Self::StatusPrefix,
        Self::TargetSuffix,
        Self::LevelPrefix,
    ];

    /// Returns the dense index of this field.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the base offset of this field's block in the host string
    /// array. The entry for slot `n` lives at `host_offset() + n`.
    #[inline]
    #[must_use]
    pub const fn host_offset(self) -> usize {
        self.index() * CAPACITY
    }
}

/// A set of slot indices, one bit per slot.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SlotMask(u64);

impl SlotMask {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Returns a mask with only `slot` set, or `None` if `slot` is at or
    /// beyond [`CAPACITY`].
    #[must_use]
    pub const fn single(slot: usize) -> Option<Self> {
        if slot < CAPACITY {
            Some(Self(1 << slot))
        } else {
            None
        }
    }

    /// Returns the raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Inserts `slot`. Indices at or beyond [`CAPACITY`] are ignored.
    #[inline]
    pub fn insert(&mut self, slot: usize) {
        if slot < CAPACITY {
            self.0 |= 1 << slot;
        }
    }

    /// Returns whether `slot` is in the set.
    #[inline]
    #[must_use]
    pub const fn contains(self, slot: usize) -> bool {
        slot < CAPACITY && self.0 & (1 << slot) != 0
    }

    /// Returns whether the set is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the number of slots in the set.
    #[inline]
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterates set slots in ascending order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..CAPACITY).filter(move |&slot| self.contains(slot))
    }
}

impl FromIterator<usize> for SlotMask {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut mask = Self::EMPTY;
        for slot in iter {
            mask.insert(slot);
        }
        mask
    }
}

impl fmt::Debug for SlotMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
