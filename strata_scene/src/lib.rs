// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame rendering for the strata compositor.
//!
//! This crate turns a set of windows into per-frame draw calls against an
//! abstract presentation backend. It provides:
//!
//! - [`Scene`] — the frame orchestrator: stacking order, occlusion culling,
//!   and the pre-paint / paint / post-paint protocol
//! - [`SceneWindow`] — one toplevel window: its item tree, per-output
//!   repaint buckets, and cached quad list
//! - [`QuadList`] — textured-quad geometry for window contents, decoration,
//!   and shadow, plus the GPU vertex layout
//! - [`DamageJournal`] — bounded per-output damage history for buffer-age
//!   repair
//! - [`EffectChain`] / [`Backend`] — the two external contracts the scene
//!   paints through
//!
//! The crate is policy-free: window management, surface protocols, and the
//! actual pixel presentation live on the other side of the
//! [`WindowModel`](strata_core::window::WindowModel) and [`Backend`]
//! contracts.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod backend;
mod damage;
mod effect;
mod mask;
mod quad;
mod scene;
mod window;

pub use backend::Backend;
pub use damage::DamageJournal;
pub use effect::{
    EffectChain, NoEffects, ScreenPaintData, ScreenPrePaintData, WindowPaintData,
    WindowPrePaintData,
};
pub use mask::{PaintDisabled, PaintMask};
pub use quad::{
    GpuVertex, Quad, QuadList, QuadRole, Vertex, build_contents_quads, build_decoration_quads,
};
pub use scene::{PaintResult, Scene};
pub use window::{DesktopThumbnail, SceneWindow, Shadow, WindowThumbnail};
