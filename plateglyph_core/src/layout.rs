// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay geometry.
//!
//! [`OverlayLayoutEngine::compute`] is pure: it turns a [`DisplayDecision`]
//! plus the two host layout values only known late in the frame (name text
//! width and the host icon's position) into node placements. Applying them
//! is the coordinator's job.
//!
//! All positions are in the name container's coordinate space, which the
//! host anchors at `(res_node_center, res_node_bottom)`.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::config::IconCustomization;
use crate::job::IconGroup;
use crate::policy::{DisplayDecision, IconSlot};

/// Placement family of a mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// Small icons beside the host icon, inline with the name.
    InlineSmall,
    /// Large icon left of the name, status icon after it.
    InlineLarge,
    /// Large icon centered above the anchor.
    Centered,
}

/// Tuned pixel constants, measured against the host's plate widget.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConstants {
    /// Edge length of an icon texture.
    pub icon_size: f64,
    /// Horizontal anchor of the name container.
    pub res_node_center: f64,
    /// Vertical anchor of the name container.
    pub res_node_bottom: f64,
    /// Inline-small primary shift when the secondary is also drawn.
    pub small_shift_with_secondary: f64,
    /// Inline-small primary shift when drawn alone.
    pub small_shift_alone: f64,
    /// Inline-small secondary shift.
    pub small_secondary_shift: f64,
    /// Inline-small secondary scale.
    pub small_secondary_scale: f64,
    /// Inline-large primary scale.
    pub large_primary_scale: f64,
    /// Inline-large base horizontal adjustment.
    pub large_x_adjust: f64,
    /// Text width beyond which the inline-large primary moves left.
    pub long_text_width: f64,
    /// How far it moves.
    pub long_text_shift: f64,
    /// Inline-large primary lift above the icon row.
    pub large_primary_lift: f64,
    /// Gap between the name's end and the inline-large secondary.
    pub large_secondary_gap: f64,
    /// Centered primary scale.
    pub centered_primary_scale: f64,
    /// Centered secondary shift.
    pub centered_secondary_shift: f64,
    /// Secondary scale for large layouts.
    pub large_secondary_scale: f64,
    /// Downward nudge applied to bottom-anchored icons.
    pub bottom_nudge: f64,
}

impl Default for LayoutConstants {
    fn default() -> Self {
        Self {
            icon_size: 32.0,
            res_node_center: 144.0,
            res_node_bottom: 107.0,
            small_shift_with_secondary: -28.0,
            small_shift_alone: -6.0,
            small_secondary_shift: -4.0,
            small_secondary_scale: 0.8,
            large_primary_scale: 1.55,
            large_x_adjust: 4.0,
            long_text_width: 50.0,
            long_text_shift: 19.0,
            large_primary_lift: 13.0,
            large_secondary_gap: 10.0,
            centered_primary_scale: 2.1,
            centered_secondary_shift: 6.0,
            large_secondary_scale: 0.85,
            bottom_nudge: 5.0,
        }
    }
}

/// Where and how one overlay node is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodePlacement {
    /// Icon texture.
    pub icon_id: u32,
    /// Pivot for scaling.
    pub origin: Point,
    /// Uniform scale.
    pub scale: f64,
    /// Position in the name container.
    pub position: Point,
}

/// Rescaling of the whole name container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainerScale {
    /// Pivot.
    pub origin: Point,
    /// Uniform scale.
    pub scale: f64,
}

/// Everything the coordinator applies for one slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayLayout {
    /// Family actually used, after fallbacks.
    pub kind: LayoutKind,
    /// Primary node; `None` hides it.
    pub primary: Option<NodePlacement>,
    /// Secondary node; `None` hides it.
    pub secondary: Option<NodePlacement>,
    /// Scale of the host's name text.
    pub name_scale: f64,
    /// Multiplier for the collision region.
    pub collision_scale: f64,
    /// Container rescale, when the plate scale is not 1.
    pub container: Option<ContainerScale>,
}

/// Computes overlay geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OverlayLayoutEngine {
    constants: LayoutConstants,
}

impl OverlayLayoutEngine {
    /// Creates an engine with the given constants.
    #[must_use]
    pub const fn new(constants: LayoutConstants) -> Self {
        Self { constants }
    }

    /// Constants in use.
    #[must_use]
    pub const fn constants(&self) -> &LayoutConstants {
        &self.constants
    }

    /// Computes placements, or `None` for decisions that draw no overlay.
    #[must_use]
    pub fn compute(
        &self,
        decision: &DisplayDecision,
        text_width: f64,
        icon_position: Point,
    ) -> Option<OverlayLayout> {
        let kind = decision.mode.layout()?;
        let icons = decision.icons?;
        let style = decision.style?;

        let kind = match kind {
            LayoutKind::InlineLarge if text_width <= 0.0 => LayoutKind::Centered,
            k => k,
        };
        let primary = icons.primary;
        let secondary = icons.secondary;

        let (primary, secondary) = match kind {
            LayoutKind::InlineSmall => (
                primary
                    .show
                    .then(|| self.inline_small_primary(primary, secondary.show, icon_position)),
                secondary
                    .show
                    .then(|| self.inline_small_secondary(secondary, icon_position)),
            ),
            LayoutKind::InlineLarge => (
                primary.show.then(|| self.inline_large_primary(primary, text_width)),
                secondary
                    .show
                    .then(|| self.large_secondary(secondary, self.inline_large_secondary_x(secondary.group, text_width))),
            ),
            LayoutKind::Centered => (
                primary.show.then(|| self.centered_primary(primary)),
                secondary
                    .show
                    .then(|| self.large_secondary(secondary, self.centered_secondary_x(secondary.group))),
            ),
        };

        let collision_scale = match kind {
            LayoutKind::Centered => {
                self.constants.centered_primary_scale / self.constants.large_primary_scale
            }
            LayoutKind::InlineSmall | LayoutKind::InlineLarge => 1.0,
        };
        let container = ((style.plate_scale - 1.0).abs() > f64::EPSILON).then_some(ContainerScale {
            origin: self.anchor(),
            scale: style.plate_scale,
        });

        Some(OverlayLayout {
            kind,
            primary: primary.map(|p| customize(p, style.primary)),
            secondary: secondary.map(|s| customize(s, style.secondary)),
            name_scale: decision.mode.name_scale(),
            collision_scale,
            container,
        })
    }

    fn anchor(&self) -> Point {
        Point::new(self.constants.res_node_center, self.constants.res_node_bottom)
    }

    fn inline_small_primary(
        &self,
        slot: IconSlot,
        secondary_shown: bool,
        icon: Point,
    ) -> NodePlacement {
        let c = &self.constants;
        let pad = slot.group.padding;
        let shift = if secondary_shown {
            c.small_shift_with_secondary
        } else {
            c.small_shift_alone
        };
        NodePlacement {
            icon_id: slot.icon_id,
            origin: Point::new(c.icon_size - pad.right, c.icon_size / 2.0),
            scale: slot.group.scale,
            position: Point::new(icon.x + shift + pad.right, icon.y),
        }
    }

    fn inline_small_secondary(&self, slot: IconSlot, icon: Point) -> NodePlacement {
        let c = &self.constants;
        let pad = slot.group.padding;
        NodePlacement {
            icon_id: slot.icon_id,
            origin: Point::new(c.icon_size - pad.right, c.icon_size / 2.0),
            scale: slot.group.scale * c.small_secondary_scale,
            position: Point::new(icon.x + pad.right + c.small_secondary_shift, icon.y),
        }
    }

    fn inline_large_primary(&self, slot: IconSlot, text_width: f64) -> NodePlacement {
        let c = &self.constants;
        let pad = slot.group.padding;
        let mut x_adjust = c.large_x_adjust;
        if text_width > c.long_text_width {
            x_adjust -= c.long_text_shift;
        }
        NodePlacement {
            icon_id: slot.icon_id,
            origin: Point::new(c.icon_size - pad.right, c.icon_size / 2.0),
            scale: slot.group.scale * c.large_primary_scale,
            position: Point::new(
                c.res_node_center - c.icon_size + pad.right + x_adjust,
                c.res_node_bottom - c.icon_size - c.large_primary_lift,
            ),
        }
    }

    fn centered_primary(&self, slot: IconSlot) -> NodePlacement {
        let c = &self.constants;
        let pad = slot.group.padding;
        NodePlacement {
            icon_id: slot.icon_id,
            origin: Point::new(c.icon_size / 2.0, c.icon_size - pad.bottom),
            scale: slot.group.scale * c.centered_primary_scale,
            position: Point::new(
                c.res_node_center - c.icon_size / 2.0,
                c.res_node_bottom - c.icon_size + pad.bottom - c.bottom_nudge,
            ),
        }
    }

    fn inline_large_secondary_x(&self, group: IconGroup, text_width: f64) -> f64 {
        let c = &self.constants;
        c.res_node_center + text_width - group.padding.left - c.large_secondary_gap
    }

    fn centered_secondary_x(&self, group: IconGroup) -> f64 {
        let c = &self.constants;
        c.res_node_center - group.padding.left + c.centered_secondary_shift
    }

    fn large_secondary(&self, slot: IconSlot, x: f64) -> NodePlacement {
        let c = &self.constants;
        let pad = slot.group.padding;
        NodePlacement {
            icon_id: slot.icon_id,
            origin: Point::new(pad.left, c.icon_size - pad.bottom),
            scale: slot.group.scale * c.large_secondary_scale,
            position: Point::new(x, c.res_node_bottom - c.icon_size + pad.bottom - c.bottom_nudge),
        }
    }
}

fn customize(placement: NodePlacement, custom: IconCustomization) -> NodePlacement {
    NodePlacement {
        scale: placement.scale * custom.scale,
        position: Point::new(
            placement.position.x + f64::from(custom.offset_x),
            placement.position.y + f64::from(custom.offset_y),
        ),
        ..placement
    }
}
