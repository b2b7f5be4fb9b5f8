// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display policy: what a slot should show this frame.
//!
//! [`DisplayPolicyResolver`] holds the active configuration for party and
//! non-party players, the status tables built from it for the current zone,
//! and the engine options. [`DisplayPolicyResolver::resolve`] turns one
//! player into a [`DisplayDecision`]. It never fails; lookup misses degrade
//! to icon id 0.

use alloc::vec::Vec;
use core::mem;

use crate::config::{
    DisplayConfiguration, EngineOptions, IconCustomization, ModeKind, SwapStyle, ZoneCategory,
};
use crate::host::{EntityId, PlayerSnapshot};
use crate::job::{GenericRole, IconCatalog, IconGroup};
use crate::status::{Status, StatusIconCache, StatusIconSource, StatusVisibility, StatusVisibilityTable};

/// Ideographic space, used to reserve room for an icon inside name text.
pub const FULL_WIDTH_SPACE: &[u8] = "\u{3000}".as_bytes();

/// Relationship of a player to the local player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MembershipClass {
    /// The local player.
    LocalPlayer,
    /// A member of the local player's party.
    PartyMember,
    /// Anyone else.
    Other,
}

impl MembershipClass {
    /// Classifies `entity` against the local player and party roster.
    #[must_use]
    pub fn classify(entity: EntityId, local: Option<EntityId>, party: &[EntityId]) -> Self {
        if local == Some(entity) {
            Self::LocalPlayer
        } else if party.contains(&entity) {
            Self::PartyMember
        } else {
            Self::Other
        }
    }

    /// Returns whether this class reads the party configuration.
    #[inline]
    #[must_use]
    pub const fn uses_party_config(self) -> bool {
        matches!(self, Self::LocalPlayer | Self::PartyMember)
    }
}

/// Role text provided by the role-assignment subsystem.
pub trait RoleDirectory {
    /// Plate text for the role explicitly assigned to `entity`, if any.
    fn assigned_role_plate(&self, entity: EntityId) -> Option<Vec<u8>>;

    /// Plate text for a generic role.
    fn generic_role_plate(&self, role: GenericRole) -> Vec<u8>;

    /// Plate text for `entity`'s slot in the party list, if it has one.
    fn party_slot_plate(&self, entity: EntityId, role: Option<GenericRole>) -> Option<Vec<u8>> {
        _ = (entity, role);
        None
    }
}

/// A [`RoleDirectory`] with no assignments and single-letter generic plates.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenericRolePlates;

impl RoleDirectory for GenericRolePlates {
    fn assigned_role_plate(&self, entity: EntityId) -> Option<Vec<u8>> {
        _ = entity;
        None
    }

    fn generic_role_plate(&self, role: GenericRole) -> Vec<u8> {
        let letter: &[u8] = match role {
            GenericRole::Tank => b"T",
            GenericRole::Healer => b"H",
            GenericRole::Melee | GenericRole::Ranged => b"D",
            GenericRole::Crafter => b"C",
            GenericRole::Gatherer => b"G",
        };
        letter.to_vec()
    }
}

/// External lookups the resolver consults.
#[derive(Clone, Copy)]
pub struct PolicyServices<'a> {
    /// Job icon sets.
    pub icons: &'a dyn IconCatalog,
    /// Role plates.
    pub roles: &'a dyn RoleDirectory,
    /// Status icon game data.
    pub status_icons: &'a dyn StatusIconSource,
}

impl core::fmt::Debug for PolicyServices<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PolicyServices").finish_non_exhaustive()
    }
}

/// Party context for one frame.
#[derive(Clone, Copy, Debug)]
pub struct PartyView<'a> {
    /// The local player, if logged in.
    pub local_player: Option<EntityId>,
    /// Party roster.
    pub party: &'a [EntityId],
}

/// One overlay icon as decided.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IconSlot {
    /// Icon id, 0 for none.
    pub icon_id: u32,
    /// Layout metadata of the icon's set.
    pub group: IconGroup,
    /// Whether the icon is drawn.
    pub show: bool,
}

/// The two overlay icons of a slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IconPair {
    /// Primary icon; starts as the job icon.
    pub primary: IconSlot,
    /// Secondary icon; starts as the status icon.
    pub secondary: IconSlot,
}

impl IconPair {
    /// Exchanges primary and secondary as a unit: id, group and visibility
    /// move together.
    #[inline]
    pub fn swap(&mut self) {
        mem::swap(&mut self.primary, &mut self.secondary);
    }
}

/// Result of applying the swap style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwapOutcome {
    /// The status was not important, or the style is [`SwapStyle::None`].
    NotApplied,
    /// Icons were exchanged.
    Swapped,
    /// The status icon replaced the job icon.
    Replaced,
}

/// Change to one host text cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TextEdit {
    /// Leave the host's text.
    #[default]
    Keep,
    /// Blank the cell.
    Clear,
    /// Replace the text.
    Set(Vec<u8>),
}

/// Changes to the host's plate text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlateTextEdits {
    /// Name cell.
    pub name: TextEdit,
    /// Prefix cell.
    pub prefix: TextEdit,
    /// Free company tag cell.
    pub free_company: TextEdit,
    /// Title visibility override.
    pub show_title: Option<bool>,
    /// Host icon drawn beside the name.
    pub name_icon: Option<u32>,
}

impl PlateTextEdits {
    fn blank() -> Self {
        Self {
            name: TextEdit::Clear,
            prefix: TextEdit::Clear,
            free_company: TextEdit::Clear,
            show_title: Some(false),
            name_icon: None,
        }
    }

    /// Returns whether nothing would be written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Per-icon user styling carried to layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IconStyle {
    /// Whole-plate scale.
    pub plate_scale: f64,
    /// Primary node adjustments.
    pub primary: IconCustomization,
    /// Secondary node adjustments.
    pub secondary: IconCustomization,
}

/// What one slot shows this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayDecision {
    /// Resolved mode.
    pub mode: ModeKind,
    /// Membership of the player.
    pub membership: MembershipClass,
    /// Player status.
    pub status: Status,
    /// Visibility of that status in the active table.
    pub visibility: StatusVisibility,
    /// Overlay icons; `None` for modes that draw none.
    pub icons: Option<IconPair>,
    /// What the swap step did.
    pub swap: SwapOutcome,
    /// Styling for layout; `None` for modes that draw none.
    pub style: Option<IconStyle>,
    /// Host text changes.
    pub text: PlateTextEdits,
}

impl DisplayDecision {
    /// Returns whether this decision needs overlay layout.
    #[inline]
    #[must_use]
    pub fn has_overlay(&self) -> bool {
        self.mode.draws_overlay() && self.icons.is_some()
    }
}

/// Resolves display decisions from the active configuration.
#[derive(Clone, Debug)]
pub struct DisplayPolicyResolver {
    party: DisplayConfiguration,
    others: DisplayConfiguration,
    party_table: StatusVisibilityTable,
    others_table: StatusVisibilityTable,
    zone: ZoneCategory,
    options: EngineOptions,
}

impl Default for DisplayPolicyResolver {
    fn default() -> Self {
        Self::new(
            DisplayConfiguration::Default,
            DisplayConfiguration::Default,
            ZoneCategory::Overworld,
            EngineOptions::default(),
        )
    }
}

impl DisplayPolicyResolver {
    /// Creates a resolver and builds its status tables for `zone`.
    #[must_use]
    pub fn new(
        party: DisplayConfiguration,
        others: DisplayConfiguration,
        zone: ZoneCategory,
        options: EngineOptions,
    ) -> Self {
        let party_table = table_for(&party, zone);
        let others_table = table_for(&others, zone);
        Self {
            party,
            others,
            party_table,
            others_table,
            zone,
            options,
        }
    }

    /// Replaces the configuration used for `membership`. The local player
    /// shares the party configuration.
    pub fn set_configuration(&mut self, membership: MembershipClass, config: DisplayConfiguration) {
        let table = table_for(&config, self.zone);
        if membership.uses_party_config() {
            self.party = config;
            self.party_table = table;
        } else {
            self.others = config;
            self.others_table = table;
        }
    }

    /// Switches zone and rebuilds both status tables.
    pub fn set_zone(&mut self, zone: ZoneCategory) {
        self.zone = zone;
        self.party_table = table_for(&self.party, zone);
        self.others_table = table_for(&self.others, zone);
    }

    /// Replaces the engine options.
    pub fn set_options(&mut self, options: EngineOptions) {
        self.options = options;
    }

    /// Current zone.
    #[must_use]
    pub fn zone(&self) -> ZoneCategory {
        self.zone
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Configuration used for `membership`.
    #[must_use]
    pub fn configuration(&self, membership: MembershipClass) -> &DisplayConfiguration {
        if self.selects_party(membership) {
            &self.party
        } else {
            &self.others
        }
    }

    fn selects_party(&self, membership: MembershipClass) -> bool {
        self.options.testing_mode || membership.uses_party_config()
    }

    /// Decides what `player` shows.
    pub fn resolve(
        &self,
        player: &PlayerSnapshot,
        view: PartyView<'_>,
        services: PolicyServices<'_>,
        cache: &mut StatusIconCache,
    ) -> DisplayDecision {
        let membership = MembershipClass::classify(player.entity, view.local_player, view.party);
        let (config, table) = if self.selects_party(membership) {
            (&self.party, &self.party_table)
        } else {
            (&self.others, &self.others_table)
        };
        let mode = config.kind();
        let visibility = table.get(player.status);

        let mut decision = DisplayDecision {
            mode,
            membership,
            status: player.status,
            visibility,
            icons: None,
            swap: SwapOutcome::NotApplied,
            style: None,
            text: PlateTextEdits::default(),
        };

        let icon_config = match config {
            DisplayConfiguration::Default => return decision,
            DisplayConfiguration::Hide => {
                decision.text = PlateTextEdits::blank();
                return decision;
            }
            _ => match config.icons() {
                Some(c) => c,
                None => return decision,
            },
        };

        let role = player.job.role();
        let job_group = icon_config
            .icon_set
            .or_else(|| role.map(|r| services.icons.default_icon_set(r)))
            .and_then(|set| services.icons.icon_group(set))
            .unwrap_or(IconGroup::STATUS);
        let status_icon = cache.resolve(player.status, services.status_icons);

        let mut pair = IconPair {
            primary: IconSlot {
                icon_id: job_group.job_icon(player.job).unwrap_or(0),
                group: job_group,
                show: icon_config.primary.show,
            },
            secondary: IconSlot {
                icon_id: status_icon,
                group: services.icons.status_group(),
                show: icon_config.secondary.show
                    && player.status != Status::None
                    && visibility.is_shown(),
            },
        };

        if let DisplayConfiguration::RoleLetters(letters) = config {
            if !letters.show_job_icon {
                pair.primary.show = false;
            }
        }

        if visibility == StatusVisibility::Important && player.status != Status::None {
            decision.swap = match icon_config.swap_style {
                SwapStyle::None => SwapOutcome::NotApplied,
                SwapStyle::Swap => {
                    pair.swap();
                    SwapOutcome::Swapped
                }
                SwapStyle::Replace => {
                    pair.primary.icon_id = pair.secondary.icon_id;
                    pair.primary.group = pair.secondary.group;
                    pair.primary.show = true;
                    pair.secondary.show = false;
                    SwapOutcome::Replaced
                }
            };
        }

        decision.style = Some(IconStyle {
            plate_scale: icon_config.scale,
            primary: icon_config.primary,
            secondary: icon_config.secondary,
        });

        if self.hides_local_plate(membership, mode, view) {
            pair.primary.show = false;
            pair.secondary.show = false;
            decision.icons = Some(pair);
            decision.text = PlateTextEdits::blank();
            return decision;
        }

        decision.text = text_for(mode, player, role, &pair, services);
        decision.icons = Some(pair);
        decision
    }

    fn hides_local_plate(
        &self,
        membership: MembershipClass,
        mode: ModeKind,
        view: PartyView<'_>,
    ) -> bool {
        if !self.options.hide_local_player_nameplate || membership != MembershipClass::LocalPlayer {
            return false;
        }
        let letters_in_party =
            mode == ModeKind::RoleLetters && (self.options.testing_mode || !view.party.is_empty());
        !letters_in_party
    }
}

fn table_for(config: &DisplayConfiguration, zone: ZoneCategory) -> StatusVisibilityTable {
    config
        .icons()
        .map(|c| c.status_table(zone))
        .unwrap_or_default()
}

fn text_for(
    mode: ModeKind,
    player: &PlayerSnapshot,
    role: Option<GenericRole>,
    pair: &IconPair,
    services: PolicyServices<'_>,
) -> PlateTextEdits {
    let roles = services.roles;
    match mode {
        ModeKind::Default => PlateTextEdits::default(),
        ModeKind::Hide => PlateTextEdits::blank(),
        ModeKind::SmallJobIcon => PlateTextEdits {
            prefix: TextEdit::Clear,
            name_icon: Some(pair.secondary.icon_id),
            ..PlateTextEdits::default()
        },
        ModeKind::SmallJobIconAndRole => {
            let prefix = match roles.assigned_role_plate(player.entity) {
                Some(mut plate) => {
                    plate.push(b' ');
                    TextEdit::Set(plate)
                }
                None => TextEdit::Clear,
            };
            PlateTextEdits {
                prefix,
                name_icon: Some(pair.secondary.icon_id),
                ..PlateTextEdits::default()
            }
        }
        ModeKind::BigJobIcon => PlateTextEdits {
            name: TextEdit::Set(FULL_WIDTH_SPACE.to_vec()),
            ..PlateTextEdits::blank()
        },
        ModeKind::BigJobIconAndPartySlot => {
            let name = match roles.party_slot_plate(player.entity, role) {
                Some(plate) => TextEdit::Set(prefixed(FULL_WIDTH_SPACE, &plate)),
                None => TextEdit::Clear,
            };
            PlateTextEdits {
                name,
                ..PlateTextEdits::blank()
            }
        }
        ModeKind::RoleLetters => {
            let plate = roles
                .assigned_role_plate(player.entity)
                .or_else(|| role.map(|r| roles.generic_role_plate(r)))
                .unwrap_or_default();
            let name = if pair.primary.show {
                prefixed(FULL_WIDTH_SPACE, &plate)
            } else {
                plate
            };
            PlateTextEdits {
                name: TextEdit::Set(name),
                ..PlateTextEdits::blank()
            }
        }
    }
}

fn prefixed(head: &[u8], tail: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(head.len() + tail.len());
    out.extend_from_slice(head);
    out.extend_from_slice(tail);
    out
}
