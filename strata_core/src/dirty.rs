// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Strata uses multi-channel dirty tracking (via [`understory_dirty`]) to
//! propagate invalidation through the item tree. Each channel represents an
//! independent category of change.
//!
//! # Propagation semantics
//!
//! - **Propagating** — [`GEOMETRY`] uses
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and has dependency edges
//!   from *parent to child*: a parent's bounding rectangle depends on its
//!   children, so marking a child dirty automatically marks every ancestor.
//!   Draining yields children before parents, which is exactly the order
//!   bounding rectangles must be recomputed in.
//!
//! - **Local-only** — [`CONTENT`] is marked with the default policy. Only the
//!   explicitly marked item appears in the drain output, since surface
//!   content is a per-item property.
//!
//! # Consumption
//!
//! [`GEOMETRY`] is drained inside
//! [`ItemTree::flush_geometry`](crate::item::ItemTree::flush_geometry), which
//! every geometry mutation calls before recording its after-change repaint.
//! [`CONTENT`] is drained by the window wrapper at frame preparation time to
//! decide which surfaces need re-upload.

use understory_dirty::Channel;

/// Position, size, or subtree shape changed — requires bounding rectangle
/// recomputation for the item and all its ancestors.
pub const GEOMETRY: Channel = Channel::new(0);

/// Surface content changed — no propagation needed.
pub const CONTENT: Channel = Channel::new(1);
