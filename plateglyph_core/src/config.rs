// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display configuration.
//!
//! Configuration is owned by an external settings subsystem and handed to the
//! engine wholesale; the engine never mutates it. Every type here derives
//! serde traits with `#[serde(default)]`, so partial documents load with the
//! built-in defaults filled in.

use alloc::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::job::IconSetId;
use crate::layout::LayoutKind;
use crate::status::{Status, StatusPreset, StatusVisibility, StatusVisibilityTable};

/// Coarse classification of the current game area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ZoneCategory {
    /// Open world, cities, housing.
    #[default]
    Overworld,
    /// Light-party duties.
    Dungeon,
    /// Full-party raids.
    Raid,
    /// Alliance raids.
    AllianceRaid,
    /// Field operations (large instanced exploration zones).
    FieldOperation,
}

/// Duty metadata for the current territory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentInfo {
    /// Party composition type of the duty.
    pub member_type: u8,
    /// Intended use of the territory.
    pub territory_intended_use: u8,
}

impl ZoneCategory {
    /// All categories.
    pub const ALL: [Self; 5] = [
        Self::Overworld,
        Self::Dungeon,
        Self::Raid,
        Self::AllianceRaid,
        Self::FieldOperation,
    ];

    /// Classifies a territory. `None` means the territory is not a duty.
    #[must_use]
    pub const fn from_content(content: Option<ContentInfo>) -> Self {
        let Some(content) = content else {
            return Self::Overworld;
        };
        if matches!(content.territory_intended_use, 41 | 48) {
            return Self::FieldOperation;
        }
        match content.member_type {
            3 => Self::Raid,
            4 => Self::AllianceRaid,
            _ => Self::Dungeon,
        }
    }
}

/// How an important status competes with the job icon.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapStyle {
    /// Keep the job icon primary.
    #[default]
    None,
    /// Exchange primary and secondary icons.
    Swap,
    /// Show the status icon in place of the job icon.
    Replace,
}

/// User adjustments for one overlay icon.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconCustomization {
    /// Whether the icon is drawn at all.
    pub show: bool,
    /// Scale multiplier on top of the layout's scale.
    pub scale: f64,
    /// Horizontal pixel offset.
    pub offset_x: i16,
    /// Vertical pixel offset.
    pub offset_y: i16,
}

impl Default for IconCustomization {
    fn default() -> Self {
        Self {
            show: true,
            scale: 1.0,
            offset_x: 0,
            offset_y: 0,
        }
    }
}

/// Settings shared by every icon-drawing mode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconModeConfig {
    /// Scale of the whole plate around its anchor; 1 leaves it untouched.
    pub scale: f64,
    /// Resolution of job icon vs. important status.
    pub swap_style: SwapStyle,
    /// Icon set override; `None` uses the catalog default for the role.
    pub icon_set: Option<IconSetId>,
    /// Primary (job) icon adjustments.
    pub primary: IconCustomization,
    /// Secondary (status) icon adjustments.
    pub secondary: IconCustomization,
    /// Status visibility per zone. Zones without an entry use their preset.
    pub statuses: BTreeMap<ZoneCategory, BTreeMap<Status, StatusVisibility>>,
}

impl Default for IconModeConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            swap_style: SwapStyle::None,
            icon_set: None,
            primary: IconCustomization::default(),
            secondary: IconCustomization::default(),
            statuses: BTreeMap::new(),
        }
    }
}

impl IconModeConfig {
    /// Defaults with the given swap style.
    #[must_use]
    pub fn with_swap_style(swap_style: SwapStyle) -> Self {
        Self {
            swap_style,
            ..Self::default()
        }
    }

    /// Builds the visibility table for `zone`.
    #[must_use]
    pub fn status_table(&self, zone: ZoneCategory) -> StatusVisibilityTable {
        match self.statuses.get(&zone) {
            Some(map) => StatusVisibilityTable::from_map(map),
            None => StatusPreset::for_zone(zone).table(),
        }
    }
}

/// Settings for [`DisplayConfiguration::RoleLetters`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleLettersConfig {
    /// Shared icon settings.
    pub icons: IconModeConfig,
    /// Draw the job icon next to the role letters instead of suppressing it.
    pub show_job_icon: bool,
}

/// Which behavior a configuration selects, without its settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModeKind {
    /// Leave the plate to the host.
    Default,
    /// Blank the plate's text and draw nothing.
    Hide,
    /// Small job icon beside the name.
    SmallJobIcon,
    /// Small job icon plus assigned role in front of the name.
    SmallJobIconAndRole,
    /// Large centered job icon, no name.
    BigJobIcon,
    /// Large job icon followed by the party slot number.
    BigJobIconAndPartySlot,
    /// Role letters in place of the name.
    RoleLetters,
}

impl ModeKind {
    /// Returns whether the mode injects overlay icons.
    #[must_use]
    pub const fn draws_overlay(self) -> bool {
        !matches!(self, Self::Default | Self::Hide)
    }

    /// Layout family used to place the overlay icons.
    #[must_use]
    pub const fn layout(self) -> Option<LayoutKind> {
        match self {
            Self::Default | Self::Hide => None,
            Self::SmallJobIcon | Self::SmallJobIconAndRole => Some(LayoutKind::InlineSmall),
            Self::BigJobIcon => Some(LayoutKind::Centered),
            Self::BigJobIconAndPartySlot | Self::RoleLetters => Some(LayoutKind::InlineLarge),
        }
    }

    /// Scale the host's name text is drawn at in this mode.
    #[must_use]
    pub const fn name_scale(self) -> f64 {
        match self {
            Self::BigJobIcon | Self::BigJobIconAndPartySlot | Self::RoleLetters => 1.0,
            _ => 0.5,
        }
    }
}

/// A display mode together with the settings it uses.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum DisplayConfiguration {
    /// See [`ModeKind::Default`].
    #[default]
    Default,
    /// See [`ModeKind::Hide`].
    Hide,
    /// See [`ModeKind::SmallJobIcon`].
    SmallJobIcon(IconModeConfig),
    /// See [`ModeKind::SmallJobIconAndRole`].
    SmallJobIconAndRole(IconModeConfig),
    /// See [`ModeKind::BigJobIcon`].
    BigJobIcon(IconModeConfig),
    /// See [`ModeKind::BigJobIconAndPartySlot`].
    BigJobIconAndPartySlot(IconModeConfig),
    /// See [`ModeKind::RoleLetters`].
    RoleLetters(RoleLettersConfig),
}

impl DisplayConfiguration {
    /// Built-in configuration for `kind`. Large-icon modes swap important
    /// statuses into the primary slot by default.
    #[must_use]
    pub fn preset(kind: ModeKind) -> Self {
        match kind {
            ModeKind::Default => Self::Default,
            ModeKind::Hide => Self::Hide,
            ModeKind::SmallJobIcon => Self::SmallJobIcon(IconModeConfig::default()),
            ModeKind::SmallJobIconAndRole => Self::SmallJobIconAndRole(IconModeConfig::default()),
            ModeKind::BigJobIcon => {
                Self::BigJobIcon(IconModeConfig::with_swap_style(SwapStyle::Swap))
            }
            ModeKind::BigJobIconAndPartySlot => {
                Self::BigJobIconAndPartySlot(IconModeConfig::with_swap_style(SwapStyle::Swap))
            }
            ModeKind::RoleLetters => Self::RoleLetters(RoleLettersConfig {
                icons: IconModeConfig::with_swap_style(SwapStyle::Swap),
                show_job_icon: false,
            }),
        }
    }

    /// The mode this configuration selects.
    #[must_use]
    pub const fn kind(&self) -> ModeKind {
        match self {
            Self::Default => ModeKind::Default,
            Self::Hide => ModeKind::Hide,
            Self::SmallJobIcon(_) => ModeKind::SmallJobIcon,
            Self::SmallJobIconAndRole(_) => ModeKind::SmallJobIconAndRole,
            Self::BigJobIcon(_) => ModeKind::BigJobIcon,
            Self::BigJobIconAndPartySlot(_) => ModeKind::BigJobIconAndPartySlot,
            Self::RoleLetters(_) => ModeKind::RoleLetters,
        }
    }

    /// Icon settings, for modes that draw icons.
    #[must_use]
    pub const fn icons(&self) -> Option<&IconModeConfig> {
        match self {
            Self::Default | Self::Hide => None,
            Self::SmallJobIcon(c)
            | Self::SmallJobIconAndRole(c)
            | Self::BigJobIcon(c)
            | Self::BigJobIconAndPartySlot(c) => Some(c),
            Self::RoleLetters(c) => Some(&c.icons),
        }
    }
}

/// Engine-wide switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Treat every player as a party member.
    pub testing_mode: bool,
    /// Blank the local player's own plate.
    pub hide_local_player_nameplate: bool,
}

/// Which configuration applies to party members and to everyone else, per
/// zone category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneModeAssignments {
    /// Party in the open world.
    pub overworld: DisplayConfiguration,
    /// Party in dungeons.
    pub dungeon: DisplayConfiguration,
    /// Party in raids.
    pub raid: DisplayConfiguration,
    /// Party in alliance raids.
    pub alliance_raid: DisplayConfiguration,
    /// Party in field operations.
    pub field_operation_party: DisplayConfiguration,
    /// Non-party players in field operations.
    pub field_operation_others: DisplayConfiguration,
    /// Non-party players everywhere else.
    pub others: DisplayConfiguration,
}

impl Default for ZoneModeAssignments {
    fn default() -> Self {
        Self {
            overworld: DisplayConfiguration::preset(ModeKind::SmallJobIcon),
            dungeon: DisplayConfiguration::preset(ModeKind::BigJobIconAndPartySlot),
            raid: DisplayConfiguration::preset(ModeKind::RoleLetters),
            alliance_raid: DisplayConfiguration::preset(ModeKind::BigJobIconAndPartySlot),
            field_operation_party: DisplayConfiguration::preset(ModeKind::BigJobIconAndPartySlot),
            field_operation_others: DisplayConfiguration::Default,
            others: DisplayConfiguration::preset(ModeKind::SmallJobIcon),
        }
    }
}

impl ZoneModeAssignments {
    /// Returns the `(party, others)` configurations for `zone`.
    #[must_use]
    pub fn select(&self, zone: ZoneCategory) -> (&DisplayConfiguration, &DisplayConfiguration) {
        match zone {
            ZoneCategory::Overworld => (&self.overworld, &self.others),
            ZoneCategory::Dungeon => (&self.dungeon, &self.others),
            ZoneCategory::Raid => (&self.raid, &self.others),
            ZoneCategory::AllianceRaid => (&self.alliance_raid, &self.others),
            ZoneCategory::FieldOperation => {
                (&self.field_operation_party, &self.field_operation_others)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_classification() {
        assert_eq!(ZoneCategory::from_content(None), ZoneCategory::Overworld);
        let duty = |member_type, territory_intended_use| {
            ZoneCategory::from_content(Some(ContentInfo {
                member_type,
                territory_intended_use,
            }))
        };
        assert_eq!(duty(2, 0), ZoneCategory::Dungeon);
        assert_eq!(duty(3, 0), ZoneCategory::Raid);
        assert_eq!(duty(4, 0), ZoneCategory::AllianceRaid);
        assert_eq!(duty(3, 41), ZoneCategory::FieldOperation);
        assert_eq!(duty(9, 48), ZoneCategory::FieldOperation);
        assert_eq!(duty(9, 0), ZoneCategory::Dungeon);
    }

    #[test]
    fn presets_pick_swap_style() {
        let swap = |kind| {
            DisplayConfiguration::preset(kind)
                .icons()
                .map(|c| c.swap_style)
        };
        assert_eq!(swap(ModeKind::SmallJobIcon), Some(SwapStyle::None));
        assert_eq!(swap(ModeKind::BigJobIcon), Some(SwapStyle::Swap));
        assert_eq!(swap(ModeKind::RoleLetters), Some(SwapStyle::Swap));
        assert_eq!(swap(ModeKind::Hide), None);
    }

    #[test]
    fn parses_partial_json() {
        let json = r#"{
            "mode": "SmallJobIconAndRole",
            "swap_style": "Replace",
            "secondary": { "show": false },
            "statuses": { "Raid": { "Busy": "Important" } }
        }"#;
        let config: DisplayConfiguration = serde_json::from_str(json).unwrap();
        assert_eq!(config.kind(), ModeKind::SmallJobIconAndRole);
        let icons = config.icons().unwrap();
        assert_eq!(icons.swap_style, SwapStyle::Replace);
        assert!(!icons.secondary.show);
        assert!((icons.secondary.scale - 1.0).abs() < f64::EPSILON);
        assert!(icons.primary.show);

        let raid = icons.status_table(ZoneCategory::Raid);
        assert_eq!(raid.get(Status::Busy), StatusVisibility::Important);
        assert_eq!(raid.get(Status::Disconnected), StatusVisibility::Hide);
        let overworld = icons.status_table(ZoneCategory::Overworld);
        assert_eq!(overworld.get(Status::Busy), StatusVisibility::Show);
    }

    #[test]
    fn unit_modes_parse() {
        let config: DisplayConfiguration = serde_json::from_str(r#"{"mode":"Hide"}"#).unwrap();
        assert_eq!(config, DisplayConfiguration::Hide);
    }

    #[test]
    fn field_operations_split_others() {
        let assignments = ZoneModeAssignments::default();
        let (party, others) = assignments.select(ZoneCategory::FieldOperation);
        assert_eq!(party.kind(), ModeKind::BigJobIconAndPartySlot);
        assert_eq!(others.kind(), ModeKind::Default);
        let (party, others) = assignments.select(ZoneCategory::Raid);
        assert_eq!(party.kind(), ModeKind::RoleLetters);
        assert_eq!(others.kind(), ModeKind::SmallJobIcon);
    }
}
