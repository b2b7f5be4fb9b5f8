// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Errors are split by how far they reach: a [`SlotError`] costs one slot
//! its overlay for one frame, while [`FrameError`] and [`NodeError`] stop the
//! engine for the rest of the session. None of them escape a host callback.

use thiserror::Error;

use crate::host::NodeHandle;
use crate::slot::{NumberField, TextField};

/// A host field reference, for error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotField {
    /// An integer field.
    Number(NumberField),
    /// A text field.
    Text(TextField),
}

/// Failure reported by a host adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum HostError {
    /// The widget the engine decorates does not currently exist.
    #[error("host widget is not available")]
    Unavailable,
    /// A node handle no longer refers to a live node.
    #[error("stale node handle {0:?}")]
    StaleNode(NodeHandle),
    /// The host could not allocate an image node.
    #[error("failed to allocate image node {node_id}")]
    AllocationFailed {
        /// Id the node would have carried.
        node_id: u32,
    },
    /// The node is already linked into a tree.
    #[error("node {0:?} is already linked")]
    AlreadyLinked(NodeHandle),
}

/// Per-slot failure. The slot falls back to host defaults and the frame
/// continues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SlotError {
    /// Slot index outside the frame's active range.
    #[error("slot {slot} outside active range 0..{active}")]
    OutOfRange {
        /// Offending index.
        slot: usize,
        /// Active slot count this frame.
        active: usize,
    },
    /// The host did not expose a field this frame.
    #[error("slot {slot}: host field {field:?} missing")]
    MissingField {
        /// Slot index.
        slot: usize,
        /// Missing field.
        field: SlotField,
    },
    /// Structural handles for the slot could not be resolved.
    #[error("slot {slot}: widget tree not resolved")]
    MissingTree {
        /// Slot index.
        slot: usize,
    },
    /// A host call failed while touching this slot.
    #[error("slot {slot}: {source}")]
    Host {
        /// Slot index.
        slot: usize,
        /// Underlying host failure.
        source: HostError,
    },
}

/// Failure building a [`FrameContext`](crate::frame::FrameContext). Fatal for
/// the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The host did not hand over its per-slot arrays.
    #[error("host slot arrays missing")]
    ArraysMissing,
    /// The reported active slot count exceeds the slot capacity.
    #[error("active slot count {0} exceeds capacity")]
    ActiveCountOutOfRange(usize),
}

/// Failure creating overlay nodes. Fatal for the session: a half-built pass
/// leaves the host tree inconsistent, so it is never retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum NodeError {
    /// The slot's structural handles could not be resolved.
    #[error("slot {slot}: widget tree not resolved")]
    MissingTree {
        /// Slot index.
        slot: usize,
    },
    /// The sibling the overlay node links next to was not found.
    #[error("slot {slot}: link target node {target_id} not found for node {node_id}")]
    MissingLinkTarget {
        /// Slot index.
        slot: usize,
        /// Node id being linked.
        node_id: u32,
        /// Node id of the missing target.
        target_id: u32,
    },
    /// A host call failed.
    #[error("slot {slot}: {source}")]
    Host {
        /// Slot index.
        slot: usize,
        /// Underlying host failure.
        source: HostError,
    },
}
