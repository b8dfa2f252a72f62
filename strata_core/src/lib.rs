// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for the strata compositor's frame-rendering pipeline.
//!
//! `strata_core` provides the foundational data structures the scene crate
//! builds on: exact integer pixel geometry and region algebra, the per-window
//! scene-item tree, the window-model contract, display-output identity, and
//! paint-loop tracing. It is `no_std` compatible (with `alloc`) and uses
//! array-based struct-of-arrays storage with generational handles for
//! cache-friendly traversal.
//!
//! # Architecture
//!
//! **[`geometry`]** / **[`region`]** — Integer pixel rectangles and
//! non-overlapping rectangle sets with boolean set operations. All damage
//! and repaint bookkeeping uses these; floating-point geometry (quad
//! vertices, buffer transforms) uses [`kurbo`] types.
//!
//! **[`item`]** — Struct-of-arrays scene-item tree with generational
//! handles. Each window owns one tree describing its visual parts (surfaces,
//! decoration, shadow). Geometry mutations schedule before/after repaints
//! and recompute bounding rectangles bottom-up.
//!
//! **[`dirty`]** — Multi-channel dirty tracking via `understory_dirty`.
//! GEOMETRY propagates from children to ancestors for bounding-rect
//! recomputation; CONTENT is local-only and drained at frame preparation.
//!
//! **[`window`]** — The [`WindowModel`](window::WindowModel) contract the
//! embedding compositor implements, plus snapshot-based stand-ins for
//! windows that linger through their close animation.
//!
//! **[`output`]** — Display-output identity and placement.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types
//! for paint-loop instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod dirty;
pub mod geometry;
pub mod item;
pub mod output;
pub mod region;
pub mod trace;
pub mod window;
