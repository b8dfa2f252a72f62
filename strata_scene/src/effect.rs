// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The effect-chain contract.
//!
//! Painting is a mutual-recursion protocol between the [`Scene`] and an
//! [`EffectChain`]: the scene starts a pass, hands control to the chain, and
//! the chain (after doing whatever it wants) must end each terminal hook in
//! the scene's `final_*` counterpart, which continues the pass and calls back
//! into the chain for the next stage. The chain and the backend are passed as
//! separate `&mut dyn` parameters so the borrows stay disjoint.
//!
//! [`NoEffects`] is the identity chain: every terminal hook forwards straight
//! to the scene.

use strata_core::output::OutputId;
use strata_core::region::Region;
use strata_core::trace::Tracer;
use strata_core::window::WindowId;

use crate::backend::Backend;
use crate::mask::PaintMask;
use crate::quad::QuadList;
use crate::scene::Scene;

/// Negotiable state for a whole screen pass, before painting starts.
#[derive(Clone, Debug)]
pub struct ScreenPrePaintData {
    /// Paint mask for the pass; effects may set transform bits.
    pub mask: PaintMask,
    /// The region that will be repainted, in global coordinates.
    pub paint: Region,
}

/// Negotiable per-window state, before painting starts.
#[derive(Clone, Debug)]
pub struct WindowPrePaintData {
    /// Paint mask for this window's draw.
    pub mask: PaintMask,
    /// The region the window will paint, in global coordinates.
    pub paint: Region,
    /// The opaque region this window blocks from windows below, in global
    /// coordinates. Must stay empty unless the window really is opaque
    /// there.
    pub clip: Region,
    /// The window's quads for this frame. Effects may filter the list, but
    /// transformed quads are not allowed at this stage.
    pub quads: QuadList,
}

/// Parameters of one window draw.
#[derive(Clone, Debug)]
pub struct WindowPaintData {
    /// Effective opacity for the draw.
    pub opacity: f64,
    /// Additional transform applied to the window's quads.
    pub transform: kurbo::Affine,
    /// The quads to draw.
    pub quads: QuadList,
}

impl WindowPaintData {
    /// Creates paint data with the given quads and neutral parameters.
    #[must_use]
    pub fn new(quads: QuadList) -> Self {
        Self {
            opacity: 1.0,
            transform: kurbo::Affine::IDENTITY,
            quads,
        }
    }
}

/// Parameters of one screen pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScreenPaintData {
    /// Whole-screen transform applied by an effect.
    pub transform: kurbo::Affine,
}

/// The chain of active effects.
///
/// The default-implemented hooks are notifications; the three terminal hooks
/// (`paint_screen`, `paint_window`, `draw_window`) carry the pass and must
/// end in the scene's matching `final_*` method. `guard` is the
/// single-slot recursion guard: when a desktop thumbnail repaints the screen
/// from inside a window draw, it carries the embedding window so that window
/// is skipped in the nested pass.
pub trait EffectChain {
    /// Negotiates the screen pass. Effects may extend the paint region or
    /// set transform bits in the mask.
    fn pre_paint_screen(&mut self, output: OutputId, data: &mut ScreenPrePaintData) {
        _ = (output, data);
    }

    /// Paints the screen. Must end in [`Scene::final_paint_screen`].
    fn paint_screen(
        &mut self,
        scene: &mut Scene,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        output: OutputId,
        mask: PaintMask,
        region: &Region,
        data: &mut ScreenPaintData,
        guard: Option<WindowId>,
    );

    /// Called after the pass; the only screen-level place an effect may
    /// schedule future damage.
    fn post_paint_screen(&mut self, scene: &mut Scene, output: OutputId) {
        _ = (scene, output);
    }

    /// Negotiates one window's draw. Effects may shrink the paint region,
    /// grow or clear the clip, or filter the quads.
    fn pre_paint_window(&mut self, window: WindowId, data: &mut WindowPrePaintData) {
        _ = (window, data);
    }

    /// Paints one window. Must end in [`Scene::final_paint_window`].
    fn paint_window(
        &mut self,
        scene: &mut Scene,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        output: OutputId,
        window: WindowId,
        mask: PaintMask,
        region: &Region,
        data: &mut WindowPaintData,
        guard: Option<WindowId>,
    );

    /// Draws one window. Must end in [`Scene::final_draw_window`].
    fn draw_window(
        &mut self,
        scene: &mut Scene,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        output: OutputId,
        window: WindowId,
        mask: PaintMask,
        region: &Region,
        data: &mut WindowPaintData,
    );

    /// Called after a window was painted; the per-window place an effect may
    /// schedule future damage.
    fn post_paint_window(&mut self, scene: &mut Scene, window: WindowId) {
        _ = (scene, window);
    }

    /// Lets effects append their own quads to a window's rebuilt quad list.
    fn build_quads(&mut self, window: WindowId, quads: &mut QuadList) {
        _ = (window, quads);
    }
}

/// The identity effect chain: no hooks, every terminal forwards to the
/// scene.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEffects;

impl EffectChain for NoEffects {
    fn paint_screen(
        &mut self,
        scene: &mut Scene,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        output: OutputId,
        mask: PaintMask,
        region: &Region,
        data: &mut ScreenPaintData,
        guard: Option<WindowId>,
    ) {
        scene.final_paint_screen(self, backend, tracer, output, mask, region, data, guard);
    }

    fn paint_window(
        &mut self,
        scene: &mut Scene,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        output: OutputId,
        window: WindowId,
        mask: PaintMask,
        region: &Region,
        data: &mut WindowPaintData,
        guard: Option<WindowId>,
    ) {
        scene.final_paint_window(
            self, backend, tracer, output, window, mask, region, data, guard,
        );
    }

    fn draw_window(
        &mut self,
        scene: &mut Scene,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        output: OutputId,
        window: WindowId,
        mask: PaintMask,
        region: &Region,
        data: &mut WindowPaintData,
    ) {
        scene.final_draw_window(self, backend, tracer, output, window, mask, region, data);
    }
}
