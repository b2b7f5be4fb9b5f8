// Copyright 2026 the Plateglyph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory nameplate host for driving `plateglyph_core` without a game
//! client.
//!
//! - [`arena::NodeArena`]: a generational node tree standing in for the
//!   host's widget tree.
//! - [`arrays::SimArrays`]: slot arrays that log which slots were accessed.
//! - [`host::SimHost`]: widgets, world and arrays bundled with a frame driver
//!   that calls the engine's callbacks in host order.
//!
//! Failure paths are reached through [`host::HostFaults`] toggles and by
//! editing the simulated tree directly.

#![no_std]

extern crate alloc;

pub mod arena;
pub mod arrays;
pub mod host;

#[cfg(test)]
mod scenarios;

pub use arena::NodeArena;
pub use arrays::SimArrays;
pub use host::{FrameSpec, HostFaults, SimHost, SimStatusIcons, SimWidgets, SimWorld};
