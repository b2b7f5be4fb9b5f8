// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Jobs, generic roles, and job icon sets.

use serde::{Deserialize, Serialize};

/// A class or job, by the host's numeric id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Job(pub u8);

impl Job {
    /// Adventurer (no class).
    pub const ADVENTURER: Self = Self(0);
    /// Gladiator.
    pub const GLADIATOR: Self = Self(1);
    /// Conjurer.
    pub const CONJURER: Self = Self(6);
    /// Miner.
    pub const MINER: Self = Self(16);
    /// Paladin.
    pub const PALADIN: Self = Self(19);
    /// Warrior.
    pub const WARRIOR: Self = Self(21);
    /// Dragoon.
    pub const DRAGOON: Self = Self(22);
    /// Bard.
    pub const BARD: Self = Self(23);
    /// White Mage.
    pub const WHITE_MAGE: Self = Self(24);
    /// Black Mage.
    pub const BLACK_MAGE: Self = Self(25);
    /// Scholar.
    pub const SCHOLAR: Self = Self(28);
    /// Dark Knight.
    pub const DARK_KNIGHT: Self = Self(32);
    /// Astrologian.
    pub const ASTROLOGIAN: Self = Self(33);
    /// Gunbreaker.
    pub const GUNBREAKER: Self = Self(37);
    /// Sage.
    pub const SAGE: Self = Self(40);
    /// Pictomancer.
    pub const PICTOMANCER: Self = Self(42);

    /// Returns the generic role of this job, or `None` for ids the host does
    /// not assign one.
    #[must_use]
    pub const fn role(self) -> Option<GenericRole> {
        Some(match self.0 {
            1 | 3 | 19 | 21 | 32 | 37 => GenericRole::Tank,
            6 | 24 | 28 | 33 | 40 => GenericRole::Healer,
            2 | 4 | 20 | 22 | 29 | 30 | 34 | 39 | 41 => GenericRole::Melee,
            5 | 7 | 23 | 25..=27 | 31 | 35 | 36 | 38 | 42 => GenericRole::Ranged,
            8..=15 => GenericRole::Crafter,
            16..=18 => GenericRole::Gatherer,
            _ => return None,
        })
    }
}

/// Coarse role grouping used to pick icon sets and role plates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenericRole {
    /// Tanks.
    Tank,
    /// Healers.
    Healer,
    /// Melee damage.
    Melee,
    /// Ranged and caster damage.
    Ranged,
    /// Disciples of the Hand.
    Crafter,
    /// Disciples of the Land.
    Gatherer,
}

/// Named set of job icons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconSetId {
    /// Framed icons.
    Framed,
    /// Glowing icons.
    Glowing,
    /// Unframed icons.
    Plain,
    /// Gold icons.
    Gold,
}

/// Transparent margin baked into an icon texture.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Padding {
    /// Left margin in texture pixels.
    pub left: f64,
    /// Right margin in texture pixels.
    pub right: f64,
    /// Top margin in texture pixels.
    pub top: f64,
    /// Bottom margin in texture pixels.
    pub bottom: f64,
}

/// Layout metadata shared by the icons of one set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IconGroup {
    /// Icon id of job 0; job `n` is `icon_base + n`. Zero means "no icons".
    pub icon_base: u32,
    /// Base scale applied before mode multipliers.
    pub scale: f64,
    /// Texture margins.
    pub padding: Padding,
}

impl IconGroup {
    /// Group for status icons, which carry no margin.
    pub const STATUS: Self = Self {
        icon_base: 0,
        scale: 1.0,
        padding: Padding {
            left: 0.0,
            right: 0.0,
            top: 0.0,
            bottom: 0.0,
        },
    };

    /// Returns the icon id for `job`, or `None` when the group has no icons
    /// or the id would not fit in a `u32`.
    #[must_use]
    pub fn job_icon(&self, job: Job) -> Option<u32> {
        if self.icon_base == 0 {
            return None;
        }
        self.icon_base.checked_add(u32::from(job.0))
    }
}

/// Registry of job icon sets.
pub trait IconCatalog {
    /// Icon set used for `role` when the mode does not override it.
    fn default_icon_set(&self, role: GenericRole) -> IconSetId;

    /// Layout metadata of a set, if registered.
    fn icon_group(&self, set: IconSetId) -> Option<IconGroup>;

    /// Layout metadata for status icons.
    fn status_group(&self) -> IconGroup {
        IconGroup::STATUS
    }
}

/// Catalog of the sets the host ships, with framed icons as the default.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardIcons;

impl IconCatalog for StandardIcons {
    fn default_icon_set(&self, role: GenericRole) -> IconSetId {
        _ = role;
        IconSetId::Framed
    }

    fn icon_group(&self, set: IconSetId) -> Option<IconGroup> {
        let (icon_base, scale, pad) = match set {
            IconSetId::Framed => (62_000, 1.0, 2.0),
            IconSetId::Plain => (62_100, 1.0, 1.0),
            IconSetId::Glowing => (62_800, 1.0, 3.0),
            IconSetId::Gold => (62_300, 1.0, 2.0),
        };
        Some(IconGroup {
            icon_base,
            scale,
            padding: Padding {
                left: pad,
                right: pad,
                top: pad,
                bottom: pad,
            },
        })
    }
}
