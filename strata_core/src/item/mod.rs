// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene item tree data model.
//!
//! An *item* is a node in a window's scene tree. Each item has:
//!
//! - An identity ([`ItemId`]), a generational handle that becomes stale when
//!   the item is destroyed, preventing use-after-free bugs at the API level.
//! - Topology: parent, first-child, and sibling links forming an ordered
//!   tree. Children paint bottom to top in sibling order.
//! - Geometry: a position relative to the parent, an explicit size that
//!   overrides a content-derived implicit size, and a computed bounding
//!   rectangle covering the item and its whole subtree.
//! - A kind ([`ItemKind`]): grouping node, buffer-bearing surface,
//!   decoration, or shadow.
//!
//! The tree accumulates repaint regions and quad-cache invalidation as
//! mutations happen; the owning window drains them once per frame through
//! the `take_*` methods.

mod id;
mod store;
mod traverse;

pub use id::{BufferId, INVALID, ItemId};
pub use store::{BufferSource, ItemKind, ItemTree, SurfaceData};
pub use traverse::Children;
