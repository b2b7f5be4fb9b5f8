// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Online statuses, their per-zone visibility, and status icon lookup.
//!
//! A [`StatusVisibilityTable`] is a dense array indexed by status code. It is
//! built from configuration when the zone category or the configuration
//! changes and is read-only in between.

use alloc::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ZoneCategory;

/// Number of statuses the host defines.
pub const STATUS_COUNT: usize = 48;

/// Length of a [`StatusVisibilityTable`]; spare entries absorb statuses
/// added by host updates.
pub const STATUS_LOOKUP_LEN: usize = STATUS_COUNT + 10;

/// Online status shown next to a player's name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
#[expect(missing_docs, reason = "variant names are the host's status names")]
pub enum Status {
    None = 0,
    GameQa = 1,
    GameMasterRed = 2,
    GameMasterBlue = 3,
    EventParticipant = 4,
    Disconnected = 5,
    WaitingForFriendListApproval = 6,
    WaitingForLinkshellApproval = 7,
    WaitingForFreeCompanyApproval = 8,
    NotFound = 9,
    Offline = 10,
    BattleMentor = 11,
    Busy = 12,
    PvP = 13,
    PlayingTripleTriad = 14,
    ViewingCutscene = 15,
    UsingChocoboPorter = 16,
    AwayFromKeyboard = 17,
    CameraMode = 18,
    LookingForRepairs = 19,
    LookingToRepair = 20,
    LookingToMeldMateria = 21,
    Roleplaying = 22,
    LookingForParty = 23,
    SwordForHire = 24,
    WaitingForDutyFinder = 25,
    RecruitingPartyMembers = 26,
    Mentor = 27,
    PvEMentor = 28,
    TradeMentor = 29,
    PvPMentor = 30,
    Returner = 31,
    NewAdventurer = 32,
    AllianceLeader = 33,
    AlliancePartyLeader = 34,
    AlliancePartyMember = 35,
    PartyLeader = 36,
    PartyMember = 37,
    PartyLeaderCrossworld = 38,
    PartyMemberCrossworld = 39,
    AnotherWorld = 40,
    SharingDuty = 41,
    SimilarDuty = 42,
    InDuty = 43,
    TrialAdventurer = 44,
    FreeCompany = 45,
    GrandCompany = 46,
    Online = 47,
}

impl Status {
    /// Every status, in code order.
    pub const ALL: [Self; STATUS_COUNT] = [
        Self::None,
        Self::GameQa,
        Self::GameMasterRed,
        Self::GameMasterBlue,
        Self::EventParticipant,
        Self::Disconnected,
        Self::WaitingForFriendListApproval,
        Self::WaitingForLinkshellApproval,
        Self::WaitingForFreeCompanyApproval,
        Self::NotFound,
        Self::Offline,
        Self::BattleMentor,
        Self::Busy,
        Self::PvP,
        Self::PlayingTripleTriad,
        Self::ViewingCutscene,
        Self::UsingChocoboPorter,
        Self::AwayFromKeyboard,
        Self::CameraMode,
        Self::LookingForRepairs,
        Self::LookingToRepair,
        Self::LookingToMeldMateria,
        Self::Roleplaying,
        Self::LookingForParty,
        Self::SwordForHire,
        Self::WaitingForDutyFinder,
        Self::RecruitingPartyMembers,
        Self::Mentor,
        Self::PvEMentor,
        Self::TradeMentor,
        Self::PvPMentor,
        Self::Returner,
        Self::NewAdventurer,
        Self::AllianceLeader,
        Self::AlliancePartyLeader,
        Self::AlliancePartyMember,
        Self::PartyLeader,
        Self::PartyMember,
        Self::PartyLeaderCrossworld,
        Self::PartyMemberCrossworld,
        Self::AnotherWorld,
        Self::SharingDuty,
        Self::SimilarDuty,
        Self::InDuty,
        Self::TrialAdventurer,
        Self::FreeCompany,
        Self::GrandCompany,
        Self::Online,
    ];

    /// Statuses that are always important, regardless of configuration.
    pub const FIXED: [Self; 3] = [Self::GameQa, Self::GameMasterRed, Self::GameMasterBlue];

    /// Statuses the host can show on a nameplate and users may configure.
    pub const CONFIGURABLE: [Self; 31] = [
        Self::EventParticipant,
        Self::Disconnected,
        Self::Busy,
        Self::PlayingTripleTriad,
        Self::ViewingCutscene,
        Self::AwayFromKeyboard,
        Self::CameraMode,
        Self::LookingForRepairs,
        Self::LookingToRepair,
        Self::LookingToMeldMateria,
        Self::Roleplaying,
        Self::LookingForParty,
        Self::WaitingForDutyFinder,
        Self::RecruitingPartyMembers,
        Self::Mentor,
        Self::PvEMentor,
        Self::TradeMentor,
        Self::PvPMentor,
        Self::Returner,
        Self::NewAdventurer,
        Self::AllianceLeader,
        Self::AlliancePartyLeader,
        Self::AlliancePartyMember,
        Self::PartyLeader,
        Self::PartyMember,
        Self::PartyLeaderCrossworld,
        Self::PartyMemberCrossworld,
        Self::SharingDuty,
        Self::SimilarDuty,
        Self::InDuty,
        Self::TrialAdventurer,
    ];

    /// Decodes a host status code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Returns the host status code.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Returns whether users may configure this status.
    #[must_use]
    pub fn is_configurable(self) -> bool {
        Self::CONFIGURABLE.contains(&self)
    }

    /// Returns whether this status is always important.
    #[must_use]
    pub fn is_fixed(self) -> bool {
        Self::FIXED.contains(&self)
    }
}

/// How a status is presented on a nameplate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusVisibility {
    /// Not shown.
    #[default]
    Hide,
    /// Shown as the secondary icon.
    Show,
    /// Shown, and allowed to take the primary icon's place.
    Important,
    /// A status the host is not expected to show on nameplates.
    Unexpected,
}

impl StatusVisibility {
    /// Returns whether a status with this visibility may be drawn.
    #[inline]
    #[must_use]
    pub const fn is_shown(self) -> bool {
        matches!(self, Self::Show | Self::Important)
    }
}

/// Dense status-to-visibility lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusVisibilityTable {
    entries: [StatusVisibility; STATUS_LOOKUP_LEN],
}

impl Default for StatusVisibilityTable {
    fn default() -> Self {
        StatusPreset::Custom.table()
    }
}

impl StatusVisibilityTable {
    /// Builds a table from explicit lists. Configurable statuses in neither
    /// list are hidden.
    #[must_use]
    pub fn from_lists(important: &[Status], show: &[Status]) -> Self {
        Self::build(|status| {
            if important.contains(&status) {
                StatusVisibility::Important
            } else if show.contains(&status) {
                StatusVisibility::Show
            } else {
                StatusVisibility::Hide
            }
        })
    }

    /// Builds a table from a configuration map. Configurable statuses absent
    /// from the map are hidden.
    #[must_use]
    pub fn from_map(map: &BTreeMap<Status, StatusVisibility>) -> Self {
        Self::build(|status| map.get(&status).copied().unwrap_or_default())
    }

    fn build(configured: impl Fn(Status) -> StatusVisibility) -> Self {
        let mut entries = [StatusVisibility::Hide; STATUS_LOOKUP_LEN];
        for status in Status::ALL {
            entries[usize::from(status.code())] = if status.is_fixed() {
                StatusVisibility::Important
            } else if status.is_configurable() {
                match configured(status) {
                    // Configuration cannot mark a status unexpected.
                    StatusVisibility::Unexpected => StatusVisibility::Hide,
                    v => v,
                }
            } else {
                StatusVisibility::Unexpected
            };
        }
        Self { entries }
    }

    /// Returns the visibility of `status`.
    #[inline]
    #[must_use]
    pub fn get(&self, status: Status) -> StatusVisibility {
        self.entries[usize::from(status.code())]
    }

    /// Returns a map of the configurable entries.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<Status, StatusVisibility> {
        Status::CONFIGURABLE
            .iter()
            .map(|&status| (status, self.get(status)))
            .collect()
    }
}

/// Built-in visibility presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusPreset {
    /// Open world: most statuses shown, none important.
    Overworld,
    /// Dungeons and raids: only statuses that matter in combat.
    Instances,
    /// Field operations.
    FieldOperations,
    /// Starting point for user presets.
    Custom,
}

impl StatusPreset {
    /// Returns the preset the zone uses by default.
    #[must_use]
    pub const fn for_zone(zone: ZoneCategory) -> Self {
        match zone {
            ZoneCategory::Overworld => Self::Overworld,
            ZoneCategory::Dungeon | ZoneCategory::Raid | ZoneCategory::AllianceRaid => {
                Self::Instances
            }
            ZoneCategory::FieldOperation => Self::FieldOperations,
        }
    }

    /// Builds the preset's table.
    #[must_use]
    pub fn table(self) -> StatusVisibilityTable {
        use Status as S;
        match self {
            Self::Overworld => StatusVisibilityTable::from_lists(
                &[],
                &[
                    S::EventParticipant,
                    S::Disconnected,
                    S::Busy,
                    S::PlayingTripleTriad,
                    S::ViewingCutscene,
                    S::AwayFromKeyboard,
                    S::CameraMode,
                    S::LookingForRepairs,
                    S::LookingToRepair,
                    S::LookingToMeldMateria,
                    S::Roleplaying,
                    S::LookingForParty,
                    S::WaitingForDutyFinder,
                    S::RecruitingPartyMembers,
                    S::Mentor,
                    S::PvEMentor,
                    S::TradeMentor,
                    S::PvPMentor,
                    S::Returner,
                    S::NewAdventurer,
                    S::AllianceLeader,
                    S::AlliancePartyLeader,
                    S::AlliancePartyMember,
                    S::PartyLeader,
                    S::PartyMember,
                    S::PartyLeaderCrossworld,
                    S::PartyMemberCrossworld,
                    S::InDuty,
                    S::TrialAdventurer,
                ],
            ),
            Self::Instances => StatusVisibilityTable::from_lists(
                &[
                    S::Disconnected,
                    S::ViewingCutscene,
                    S::AwayFromKeyboard,
                    S::CameraMode,
                ],
                &[S::Returner, S::NewAdventurer],
            ),
            Self::FieldOperations => StatusVisibilityTable::from_lists(
                &[S::Disconnected],
                &[
                    S::SharingDuty,
                    S::ViewingCutscene,
                    S::AwayFromKeyboard,
                    S::CameraMode,
                    S::Returner,
                    S::NewAdventurer,
                ],
            ),
            Self::Custom => StatusVisibilityTable::from_lists(&[S::Disconnected], &[]),
        }
    }
}

/// Static game data mapping statuses to icon ids.
pub trait StatusIconSource {
    /// Looks up the icon for `status`, or `None` if the data has no row.
    fn icon_for(&self, status: Status) -> Option<u32>;
}

/// Memoized status icon lookups.
///
/// Hits are kept for the lifetime of the cache. Misses resolve to icon 0 and
/// are not cached, so data that appears later is still picked up.
#[derive(Clone, Debug, Default)]
pub struct StatusIconCache {
    icons: BTreeMap<Status, u32>,
}

impl StatusIconCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the icon for `status`, consulting `source` on a miss.
    pub fn resolve(&mut self, status: Status, source: &dyn StatusIconSource) -> u32 {
        if let Some(&icon) = self.icons.get(&status) {
            return icon;
        }
        match source.icon_for(status) {
            Some(icon) => {
                self.icons.insert(status, icon);
                icon
            }
            None => 0,
        }
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    /// Returns whether nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct CountingSource {
        calls: Cell<u32>,
    }

    impl StatusIconSource for CountingSource {
        fn icon_for(&self, status: Status) -> Option<u32> {
            self.calls.set(self.calls.get() + 1);
            (status != Status::Online).then(|| 61_500 + u32::from(status.code()))
        }
    }

    #[test]
    fn codes_match_positions() {
        for (i, status) in Status::ALL.iter().enumerate() {
            assert_eq!(usize::from(status.code()), i, "{status:?} out of order");
        }
        assert_eq!(Status::from_code(12), Some(Status::Busy));
        assert_eq!(Status::from_code(48), None);
    }

    #[test]
    fn fixed_statuses_are_always_important() {
        let table = StatusVisibilityTable::from_lists(&[], &[]);
        assert_eq!(table.get(Status::GameMasterRed), StatusVisibility::Important);
        assert_eq!(table.get(Status::Busy), StatusVisibility::Hide);
        assert_eq!(table.get(Status::Online), StatusVisibility::Unexpected);
    }

    #[test]
    fn presets_follow_zone() {
        let overworld = StatusPreset::for_zone(ZoneCategory::Overworld).table();
        assert_eq!(overworld.get(Status::Busy), StatusVisibility::Show);
        assert_eq!(overworld.get(Status::Disconnected), StatusVisibility::Show);

        let raid = StatusPreset::for_zone(ZoneCategory::Raid).table();
        assert_eq!(raid.get(Status::Disconnected), StatusVisibility::Important);
        assert_eq!(raid.get(Status::Busy), StatusVisibility::Hide);

        let field = StatusPreset::for_zone(ZoneCategory::FieldOperation).table();
        assert_eq!(field.get(Status::SharingDuty), StatusVisibility::Show);
    }

    #[test]
    fn map_cannot_override_fixed_or_unexpected() {
        let mut map = BTreeMap::new();
        map.insert(Status::GameQa, StatusVisibility::Hide);
        map.insert(Status::Offline, StatusVisibility::Show);
        map.insert(Status::Busy, StatusVisibility::Important);
        let table = StatusVisibilityTable::from_map(&map);
        assert_eq!(table.get(Status::GameQa), StatusVisibility::Important);
        assert_eq!(table.get(Status::Offline), StatusVisibility::Unexpected);
        assert_eq!(table.get(Status::Busy), StatusVisibility::Important);
        assert_eq!(table.to_map().len(), Status::CONFIGURABLE.len());
    }

    #[test]
    fn icon_cache_memoizes_hits_only() {
        let source = CountingSource {
            calls: Cell::new(0),
        };
        let mut cache = StatusIconCache::new();
        assert_eq!(cache.resolve(Status::Busy, &source), 61_512);
        assert_eq!(cache.resolve(Status::Busy, &source), 61_512);
        assert_eq!(source.calls.get(), 1);

        assert_eq!(cache.resolve(Status::Online, &source), 0);
        assert_eq!(cache.resolve(Status::Online, &source), 0);
        assert_eq!(source.calls.get(), 3);
        assert_eq!(cache.len(), 1);
    }
}
