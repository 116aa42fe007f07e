// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Orrery Tree: a retained 2D scene graph with lazy, dirty-flag driven transform resolution.
//!
//! Every node stores authoritative *local* state relative to its parent (offset, size, scale,
//! rotation, alignment, opacity, tint) and derived *resolved* outputs in viewport pixels.
//! Offsets and sizes carry a unit: pixels, or a fraction of a reference extent (the parent's
//! resolved size, or the viewport for roots).
//!
//! - Edits go through [`Tree::edit`] and only mark per-property [`DirtyFlags`].
//! - [`Tree::update`] walks the tree parents-first and re-runs only dirty resolvers, pushing each
//!   resolved flag down to the direct children.
//! - Children of a rotated parent orbit the parent's rotation pivot, so rotation composes like a
//!   rigid transform while the resolved outputs stay an un-rotated box plus an angle.
//! - Interactive nodes get hover and press edges once their subtree has resolved.
//!
//! ## Not a layout engine
//!
//! Nodes are placed by explicit offsets and alignment fractions. There is no measurement or
//! arrangement pass; percent units are the only relative sizing.
//!
//! ## API overview
//!
//! - [`Tree`]: arena of nodes addressed by generational [`NodeId`]s.
//! - [`NodeEditor`]: chainable local-state setters and `add_*` deltas.
//! - [`UnitValue`] / [`Unit`]: pixel or percent magnitudes.
//! - [`Resolved`]: world-space outputs of a node.
//! - [`FrameContext`] / [`PointerState`]: per-frame input to [`Tree::update`].
//! - [`NodeEvent`] / [`Subscription`]: per-node observer lists.
//! - [`RenderSink`] / [`DrawItem`]: output of [`Tree::render`].
//!
//! Key operations:
//! - [`Tree::insert`] → [`NodeId`], [`Tree::dispose`].
//! - [`Tree::set_parent`], [`Tree::add_child`], [`Tree::remove_child`]; cycles are rejected with
//!   [`SceneError::WouldCreateCycle`].
//! - [`Tree::update`] / [`Tree::update_roots`], then [`Tree::render`].
//! - [`Tree::resolved`] and [`Tree::dirty_flags`] for inspection.
//!
//! ## Example
//!
//! ```rust
//! use core::cell::Cell;
//! use std::rc::Rc;
//!
//! use kurbo::{Point, Size};
//! use orrery_tree::{FrameContext, NodeEvent, NodeKind, PointerState, Tree, UpdateScope};
//!
//! let viewport = Size::new(800.0, 600.0);
//! let mut tree = Tree::new(viewport);
//!
//! let sun = tree.insert(None, NodeKind::Circle);
//! tree.edit(sun)
//!     .set_position(400.0, 300.0)
//!     .set_size_uniform(40.0)
//!     .set_align_uniform(0.5)
//!     .set_rotation_origin_uniform(0.5)
//!     .unwrap()
//!     .set_angle_degrees(90.0);
//!
//! // Level with the sun's center and 100px to its right, before the sun's rotation.
//! let planet = tree.insert(Some(sun), NodeKind::Box);
//! tree.edit(planet).set_position(120.0, 20.0).set_size_uniform(10.0).set_interactive(true);
//!
//! let hovered = Rc::new(Cell::new(false));
//! let h = hovered.clone();
//! tree.subscribe(planet, NodeEvent::HoverEnter, move || h.set(true));
//!
//! let pointer = PointerState::at(Point::new(395.0, 405.0));
//! tree.update(sun, &FrameContext::new(viewport).with_pointer(pointer), UpdateScope::Subtree);
//!
//! // The sun pivots on its center; the planet has swung a quarter turn below it
//! // and is itself drawn rotated by the inherited quarter turn.
//! let out = tree.resolved(planet).unwrap();
//! assert!((out.origin.x - 400.0).abs() < 1e-9);
//! assert!((out.origin.y - 400.0).abs() < 1e-9);
//! assert!(hovered.get());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod color;
mod editor;
mod error;
mod interaction;
mod node;
mod observer;
mod render;
mod resolve;
mod tree;
mod types;
mod unit;

pub use color::Rgba8;
pub use editor::NodeEditor;
pub use error::SceneError;
pub use interaction::{FrameContext, PointerState};
pub use node::Resolved;
pub use observer::{NodeEvent, Subscription};
pub use render::{DrawItem, RenderSink};
pub use resolve::compose_position;
pub use tree::Tree;
pub use types::{Capabilities, DirtyFlags, NodeFlags, NodeId, NodeKind, UpdateScope};
pub use unit::{Unit, UnitValue};
