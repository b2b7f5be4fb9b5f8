// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-synchronized nameplate overlays for an externally owned widget tree.
//!
//! `plateglyph_core` decorates a host game client's nameplates with job and
//! status icons without replacing the host's rendering. Once per host frame
//! it reconciles the host's fixed array of nameplate slots against a display
//! policy, writes the host fields it needs to change, and places extra image
//! nodes it injected into the host's widget tree. It is `no_std` compatible
//! (with `alloc`) and never owns nameplate data beyond the current frame.
//!
//! # Architecture
//!
//! ```text
//!   host pre-update ──► FrameContext ──► DisplayPolicyResolver ──► SlotFieldAccessor
//!                            │                     │
//!                            │                     ▼
//!                            │          SlotState (pending decision)
//!                            │                     │
//!   host pre-draw ───────────┴──► OverlayLayoutEngine ──► host nodes
//!                                          ▲
//!                       NodeLifecycleManager (first usable frame)
//!
//!   host pre-finalize ──► reset every slot ──► NodeLifecycleManager::teardown
//! ```
//!
//! **[`host`]**: The traits a host adapter implements: raw slot arrays,
//! the widget tree, and the game state the policy reads.
//!
//! **[`accessor`]** and **[`frame`]**: Typed, bounds-checked, frame-scoped
//! access to the host arrays.
//!
//! **[`config`]**, **[`status`]**, **[`job`]**: Display configuration (serde
//! loadable), status visibility tables, and job icon sets.
//!
//! **[`policy`]**: Turns one player into a [`DisplayDecision`](policy::DisplayDecision).
//!
//! **[`layout`]**: Pure geometry for the overlay nodes.
//!
//! **[`nodes`]** and **[`state`]**: Overlay node creation, ownership and
//! teardown.
//!
//! **[`coordinator`]**: The per-frame state machine. **[`engine`]** is the
//! facade adapters and settings code call.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types, with
//! a zero-overhead [`Tracer`](trace::Tracer) wrapper. Free-form diagnostics
//! go through the `tracing` facade.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod accessor;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod frame;
pub mod host;
pub mod job;
pub mod layout;
pub mod nodes;
pub mod policy;
pub mod slot;
pub mod state;
pub mod status;
pub mod trace;
