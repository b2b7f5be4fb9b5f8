// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The facade host adapters and settings code talk to.
//!
//! [`OverlayEngine`] keeps the current configuration across enable/disable
//! cycles. Each [`OverlayEngine::enable`] builds a fresh
//! [`OverlayUpdateCoordinator`] with fresh [`EngineResources`]; disabling
//! drops both after returning every slot to host defaults.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;

use crate::config::{ContentInfo, DisplayConfiguration, EngineOptions, ZoneCategory, ZoneModeAssignments};
use crate::coordinator::{CoordinatorState, OverlayUpdateCoordinator};
use crate::frame::FrameInput;
use crate::host::{HostWidgets, HostWorld, SharedText};
use crate::job::{IconCatalog, StandardIcons};
use crate::layout::{LayoutConstants, OverlayLayoutEngine};
use crate::policy::{
    DisplayPolicyResolver, GenericRolePlates, MembershipClass, PolicyServices, RoleDirectory,
};
use crate::status::{StatusIconCache, StatusIconSource};
use crate::trace::Tracer;

/// Allocations that live exactly as long as one enable cycle.
#[derive(Debug)]
pub struct EngineResources {
    pub(crate) empty_text: SharedText,
    pub(crate) icon_cache: StatusIconCache,
}

impl Default for EngineResources {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineResources {
    /// Allocates the shared empty text and an empty icon cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            empty_text: Arc::from(&b""[..]),
            icon_cache: StatusIconCache::new(),
        }
    }

    /// Text every cleared host cell points at.
    #[must_use]
    pub fn empty_text(&self) -> &SharedText {
        &self.empty_text
    }

    /// Status icon lookups made so far.
    #[must_use]
    pub fn icon_cache(&self) -> &StatusIconCache {
        &self.icon_cache
    }
}

/// External lookups, owned by the engine.
pub struct EngineServices {
    /// Job icon sets.
    pub icons: Box<dyn IconCatalog>,
    /// Role plates.
    pub roles: Box<dyn RoleDirectory>,
    /// Status icon game data.
    pub status_icons: Box<dyn StatusIconSource>,
}

impl fmt::Debug for EngineServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineServices").finish_non_exhaustive()
    }
}

impl EngineServices {
    /// Uses the standard icon sets and generic role letters.
    #[must_use]
    pub fn new(status_icons: Box<dyn StatusIconSource>) -> Self {
        Self {
            icons: Box::new(StandardIcons),
            roles: Box::new(GenericRolePlates),
            status_icons,
        }
    }

    /// Replaces the role directory.
    #[must_use]
    pub fn with_roles(mut self, roles: Box<dyn RoleDirectory>) -> Self {
        self.roles = roles;
        self
    }

    /// Replaces the icon catalog.
    #[must_use]
    pub fn with_icons(mut self, icons: Box<dyn IconCatalog>) -> Self {
        self.icons = icons;
        self
    }

    fn policy(&self) -> PolicyServices<'_> {
        PolicyServices {
            icons: &*self.icons,
            roles: &*self.roles,
            status_icons: &*self.status_icons,
        }
    }
}

/// Nameplate overlay engine.
#[derive(Debug)]
pub struct OverlayEngine {
    services: EngineServices,
    party: DisplayConfiguration,
    others: DisplayConfiguration,
    zone: ZoneCategory,
    options: EngineOptions,
    layout: LayoutConstants,
    coordinator: Option<OverlayUpdateCoordinator>,
}

impl OverlayEngine {
    /// Creates a disabled engine with Default mode for everyone.
    #[must_use]
    pub fn new(services: EngineServices) -> Self {
        Self {
            services,
            party: DisplayConfiguration::Default,
            others: DisplayConfiguration::Default,
            zone: ZoneCategory::Overworld,
            options: EngineOptions::default(),
            layout: LayoutConstants::default(),
            coordinator: None,
        }
    }

    /// Uses `constants` for layouts built by later enables.
    #[must_use]
    pub fn with_layout_constants(mut self, constants: LayoutConstants) -> Self {
        self.layout = constants;
        self
    }

    /// Whether the engine is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.coordinator.is_some()
    }

    /// Coordinator state, if enabled.
    #[must_use]
    pub fn state(&self) -> Option<CoordinatorState> {
        self.coordinator.as_ref().map(OverlayUpdateCoordinator::state)
    }

    /// The running coordinator, if enabled.
    #[must_use]
    pub fn coordinator(&self) -> Option<&OverlayUpdateCoordinator> {
        self.coordinator.as_ref()
    }

    /// Current zone category.
    #[must_use]
    pub fn zone_category(&self) -> ZoneCategory {
        self.zone
    }

    /// Starts processing frames. A no-op when already enabled.
    pub fn enable(&mut self) {
        if self.coordinator.is_some() {
            return;
        }
        let resolver = DisplayPolicyResolver::new(
            self.party.clone(),
            self.others.clone(),
            self.zone,
            self.options,
        );
        self.coordinator = Some(OverlayUpdateCoordinator::new(
            resolver,
            OverlayLayoutEngine::new(self.layout),
            EngineResources::new(),
        ));
        tracing::debug!("nameplate overlays enabled");
    }

    /// Returns every slot to host defaults, frees all overlay nodes and drops
    /// the coordinator.
    pub fn disable(&mut self, widgets: &mut dyn HostWidgets, tracer: &mut Tracer<'_>) {
        if let Some(mut coordinator) = self.coordinator.take() {
            coordinator.release_all(widgets, tracer);
            tracing::debug!("nameplate overlays disabled");
        }
    }

    /// Host pre-update callback.
    pub fn on_pre_update(&mut self, input: FrameInput<'_>, world: &dyn HostWorld, tracer: &mut Tracer<'_>) {
        if let Some(coordinator) = &mut self.coordinator {
            coordinator.on_pre_update(input, world, self.services.policy(), tracer);
        }
    }

    /// Host pre-draw callback.
    pub fn on_pre_draw(&mut self, widgets: &mut dyn HostWidgets, world: &dyn HostWorld, tracer: &mut Tracer<'_>) {
        if let Some(coordinator) = &mut self.coordinator {
            coordinator.on_pre_draw(widgets, world, tracer);
        }
    }

    /// Host pre-finalize callback.
    pub fn on_pre_finalize(&mut self, widgets: &mut dyn HostWidgets, tracer: &mut Tracer<'_>) {
        if let Some(coordinator) = &mut self.coordinator {
            coordinator.on_pre_finalize(widgets, tracer);
        }
    }

    /// Replaces the configuration for `membership` and schedules a redraw.
    /// The local player shares the party configuration.
    pub fn set_active_display_configuration(
        &mut self,
        membership: MembershipClass,
        config: DisplayConfiguration,
    ) {
        if membership.uses_party_config() {
            self.party = config.clone();
        } else {
            self.others = config.clone();
        }
        if let Some(coordinator) = &mut self.coordinator {
            coordinator.resolver_mut().set_configuration(membership, config);
            coordinator.request_redraw();
        }
    }

    /// Switches zone category, rebuilding status tables, and schedules a
    /// redraw.
    pub fn set_zone_category(&mut self, zone: ZoneCategory) {
        self.zone = zone;
        if let Some(coordinator) = &mut self.coordinator {
            coordinator.resolver_mut().set_zone(zone);
            coordinator.request_redraw();
        }
    }

    /// Classifies the territory, installs the configurations `assignments`
    /// selects for it, and returns the category.
    pub fn apply_zone(
        &mut self,
        assignments: &ZoneModeAssignments,
        content: Option<ContentInfo>,
    ) -> ZoneCategory {
        let zone = ZoneCategory::from_content(content);
        let (party, others) = assignments.select(zone);
        self.set_active_display_configuration(MembershipClass::PartyMember, party.clone());
        self.set_active_display_configuration(MembershipClass::Other, others.clone());
        self.set_zone_category(zone);
        tracing::debug!(?zone, "zone display modes applied");
        zone
    }

    /// Replaces the engine options and schedules a redraw.
    pub fn set_options(&mut self, options: EngineOptions) {
        self.options = options;
        if let Some(coordinator) = &mut self.coordinator {
            coordinator.resolver_mut().set_options(options);
            coordinator.request_redraw();
        }
    }

    /// Schedules a forced redraw at the end of the next pre-draw.
    pub fn request_redraw(&mut self) {
        if let Some(coordinator) = &mut self.coordinator {
            coordinator.request_redraw();
        }
    }
}
