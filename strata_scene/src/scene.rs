// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame orchestrator.
//!
//! [`Scene`] owns the windows, the stacking order, the per-output global
//! repaint buckets, and the per-output damage journals. Painting one output
//! is a fixed protocol:
//!
//! 1. Pre-paint: the effect chain negotiates the paint mask and region.
//! 2. Paint: the chain's `paint_screen` terminates in
//!    [`Scene::final_paint_screen`], which selects a strategy. Any screen
//!    transform bit forces the generic strategy (everything painted, no
//!    clipping); otherwise the optimized strategy culls occluded pixels with
//!    a two-pass sweep over the stacking order.
//! 3. Post-paint: per-window and screen notifications, the only places an
//!    effect may schedule damage for a future frame.
//! 4. The damaged region is recorded in the output's [`DamageJournal`] and
//!    handed to the backend.
//!
//! The effect chain and the backend are call parameters rather than fields
//! so the mutual-recursion protocol borrows cleanly.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::mem;

use strata_core::geometry::Rect;
use strata_core::output::{Output, OutputId};
use strata_core::region::Region;
use strata_core::trace::{
    FrameBeginEvent, FrameEndEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, Tracer, Warning,
    WindowPaintEvent,
};
use strata_core::window::{ClosingRemnant, WindowId, WindowModel, WindowSnapshot};

use crate::backend::Backend;
use crate::damage::DamageJournal;
use crate::effect::{
    EffectChain, ScreenPaintData, ScreenPrePaintData, WindowPaintData, WindowPrePaintData,
};
use crate::mask::PaintMask;
use crate::quad::QuadList;
use crate::window::SceneWindow;

/// What one screen pass produced.
#[derive(Clone, Debug)]
pub struct PaintResult {
    /// The region that must be copied from the internal target to the
    /// visible buffer.
    pub damaged: Region,
    /// The region whose contents are now valid in the back buffer.
    pub valid: Region,
}

/// Per-frame scratch state, live between `paint_screen` entry and exit.
#[derive(Debug, Default)]
struct FrameState {
    output_index: usize,
    /// Buffer-age repair region for this frame.
    repaint: Region,
    painted: Region,
    damaged: Region,
    /// Number of `final_paint_screen` entries this frame; greater than one
    /// while a desktop thumbnail repaints the scene recursively.
    paint_screen_count: u32,
}

/// One window scheduled for the paint pass of the current strategy.
struct PhaseData {
    window: WindowId,
    region: Region,
    clip: Region,
    mask: PaintMask,
    quads: QuadList,
}

/// The scene: every window the compositor currently shows, plus the frame
/// bookkeeping to repaint only what changed.
#[derive(Debug, Default)]
pub struct Scene {
    windows: BTreeMap<WindowId, SceneWindow>,
    outputs: Vec<Output>,
    /// Bottom to top.
    stacking_order: Vec<WindowId>,
    /// Global per-output repaint buckets, parallel to `outputs`.
    repaints: Vec<Region>,
    journals: Vec<DamageJournal>,
    frame_requests: Vec<bool>,
    frame: FrameState,
}

impl Scene {
    /// Creates an empty scene with no outputs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Maintenance --

    /// Replaces the output layout.
    ///
    /// All repaint buckets and damage journals are reallocated to the new
    /// count; every bucket is refilled infinite so each output repaints
    /// fully once.
    pub fn set_outputs(&mut self, outputs: Vec<Output>) {
        self.outputs = outputs;
        let count = self.outputs.len();
        self.repaints.clear();
        self.repaints.resize(count, Region::infinite());
        self.journals.clear();
        self.journals.resize_with(count, DamageJournal::new);
        self.frame_requests.clear();
        self.frame_requests.resize(count, true);
        for window in self.windows.values_mut() {
            window.realloc_repaints(count);
        }
    }

    /// The current output layout.
    #[must_use]
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Adds a window. It is painted once it appears in the stacking order.
    pub fn add_window(&mut self, id: WindowId, model: Box<dyn WindowModel>) {
        let mut window = SceneWindow::new(id, model);
        window.realloc_repaints(self.outputs.len());
        window.reset_painting_enabled();
        self.windows.insert(id, window);
        for request in &mut self.frame_requests {
            *request = true;
        }
    }

    /// The window closed. With a snapshot the window stays in the scene,
    /// backed by a [`ClosingRemnant`], until its close animation finishes
    /// and [`Scene::remove_window`] retires it. Without one it is removed
    /// immediately.
    pub fn window_closed(&mut self, id: WindowId, snapshot: Option<WindowSnapshot>) {
        match snapshot {
            Some(snapshot) => {
                if let Some(window) = self.windows.get_mut(&id) {
                    window.replace_model(ClosingRemnant::new(snapshot).into_model());
                    window.reset_painting_enabled();
                }
            }
            None => self.remove_window(id),
        }
    }

    /// Removes a window, repainting the area it used to cover.
    pub fn remove_window(&mut self, id: WindowId) {
        let Some(mut window) = self.windows.remove(&id) else {
            return;
        };
        self.stacking_order.retain(|w| *w != id);
        let mut footprint = window.map_to_global(&window.shape());
        footprint.union_rect(window.model().geometry());
        footprint.union(&window.tree_mut().take_pending_repaints());
        let _ = self.add_repaint(&footprint);
    }

    /// Looks up a window.
    #[must_use]
    pub fn window(&self, id: WindowId) -> Option<&SceneWindow> {
        self.windows.get(&id)
    }

    /// Looks up a window mutably.
    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut SceneWindow> {
        self.windows.get_mut(&id)
    }

    /// Replaces the stacking order, bottom to top. Unknown ids are dropped.
    pub fn set_stacking_order(&mut self, order: Vec<WindowId>) {
        self.stacking_order = order;
        let windows = &self.windows;
        self.stacking_order.retain(|id| windows.contains_key(id));
    }

    /// The current stacking order, bottom to top.
    #[must_use]
    pub fn stacking_order(&self) -> &[WindowId] {
        &self.stacking_order
    }

    /// Adds global damage, split across the per-output buckets.
    ///
    /// Returns `false` (dropping the damage) while the buckets are stale
    /// against the output count; the pending reallocation already implies a
    /// full repaint.
    pub fn add_repaint(&mut self, region: &Region) -> bool {
        if self.repaints.len() != self.outputs.len() {
            return false;
        }
        for (index, output) in self.outputs.iter().enumerate() {
            let mut dirty = region.clone();
            dirty.intersect_rect(output.geometry);
            if !dirty.is_empty() {
                self.repaints[index].union(&dirty);
                self.frame_requests[index] = true;
            }
        }
        true
    }

    /// Prepares the next frame: pulls every window's current model geometry
    /// into its root item, then moves the pending item-tree repaints
    /// (including the before/after footprints of any move or resize) into
    /// the per-output buckets and requests frames for the touched outputs.
    pub fn commit(&mut self) {
        for window in self.windows.values_mut() {
            window.update_geometry();
            let pending = window.tree_mut().take_pending_repaints();
            if pending.is_empty() {
                continue;
            }
            if !window.add_layer_repaint(&self.outputs, &pending) {
                continue;
            }
            for (index, output) in self.outputs.iter().enumerate() {
                if pending.intersects_rect(output.geometry) {
                    self.frame_requests[index] = true;
                }
            }
        }
    }

    /// Drains the set of outputs whose render loop should schedule a frame.
    pub fn take_frame_requests(&mut self) -> Vec<OutputId> {
        let mut requested = Vec::new();
        for (index, request) in self.frame_requests.iter_mut().enumerate() {
            if mem::take(request) {
                requested.push(self.outputs[index].id);
            }
        }
        requested
    }

    /// The compositing space changed size; journals are stale and the
    /// backend's overlay must follow.
    pub fn screen_geometry_changed(&mut self, backend: &mut dyn Backend) {
        let mut combined = Rect::new(0, 0, 0, 0);
        for output in &self.outputs {
            combined = if combined.is_empty() {
                output.geometry
            } else {
                combined.united(output.geometry)
            };
        }
        backend.resize_overlay(combined.size());
        for journal in &mut self.journals {
            journal.clear();
        }
    }

    /// The extra region a back buffer of the given age must repaint, from
    /// the output's damage journal. Age 0 or an age beyond the retained
    /// history falls back to the whole output.
    #[must_use]
    pub fn repaint_for_buffer_age(&self, output_index: usize, buffer_age: usize) -> Region {
        match self.journals[output_index].accumulate(buffer_age) {
            Some(region) => region,
            None => Region::from_rect(self.outputs[output_index].geometry),
        }
    }

    // -- Frame entry --

    /// Paints one frame on one output: gathers the pending damage, queries
    /// the backend for the buffer age, runs the screen pass, records the
    /// damage in the journal, and finishes the backend frame.
    pub fn paint_output(
        &mut self,
        effects: &mut dyn EffectChain,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        output_index: usize,
    ) -> PaintResult {
        let output = self.outputs[output_index];
        backend.begin_frame(output.id);
        let buffer_age = backend.buffer_age(output.id);
        tracer.frame_begin(&FrameBeginEvent {
            output: output.id,
            buffer_age: u8::try_from(buffer_age).ok(),
        });

        let mut damage = mem::take(&mut self.repaints[output_index]);
        damage.intersect_rect(output.geometry);
        let repaint = self.repaint_for_buffer_age(output_index, buffer_age);

        let result = self.paint_screen(effects, backend, tracer, output_index, &damage, &repaint);

        if !result.damaged.is_empty() {
            self.journals[output_index].record(result.damaged.clone());
        }
        backend.end_frame(output.id, &result.damaged);
        tracer.frame_end(&FrameEndEvent {
            output: output.id,
            damage_rects: result.damaged.rects().len(),
        });
        self.frame_requests[output_index] = false;
        result
    }

    /// Runs the full screen-pass protocol for one output.
    ///
    /// `damage` is the new damage to paint this frame; `repaint` is the
    /// buffer-age repair region, rendered but excluded from the damage
    /// history so the journal does not snowball.
    pub fn paint_screen(
        &mut self,
        effects: &mut dyn EffectChain,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        output_index: usize,
        damage: &Region,
        repaint: &Region,
    ) -> PaintResult {
        let output = self.outputs[output_index];
        let display = Region::from_rect(output.geometry);

        tracer.phase_begin(&PhaseBeginEvent {
            output: output.id,
            phase: PhaseKind::PrePaint,
        });
        let mut pre = ScreenPrePaintData {
            mask: if *damage == display {
                PaintMask::empty()
            } else {
                PaintMask::SCREEN_REGION
            },
            paint: damage.clone(),
        };
        effects.pre_paint_screen(output.id, &mut pre);
        let mut mask = pre.mask;
        let mut region = pre.paint;

        if mask.intersects(PaintMask::SCREEN_TRANSFORMED | PaintMask::SCREEN_WITH_TRANSFORMED_WINDOWS)
        {
            // Screen damage does not match transformed positions, so
            // region-restricted painting is off the table.
            mask -= PaintMask::SCREEN_REGION;
            region = display.clone();
        } else if mask.contains(PaintMask::SCREEN_REGION) {
            region.intersect(&display);
        } else {
            region = display.clone();
        }
        tracer.phase_end(&PhaseEndEvent {
            output: output.id,
            phase: PhaseKind::PrePaint,
        });

        self.frame = FrameState {
            output_index,
            repaint: repaint.clone(),
            painted: region.clone(),
            damaged: Region::new(),
            paint_screen_count: 0,
        };

        tracer.phase_begin(&PhaseBeginEvent {
            output: output.id,
            phase: PhaseKind::Paint,
        });
        let mut data = ScreenPaintData::default();
        let pass_region = region.clone();
        effects.paint_screen(
            self, backend, tracer, output.id, mask, &pass_region, &mut data, None,
        );
        tracer.phase_end(&PhaseEndEvent {
            output: output.id,
            phase: PhaseKind::Paint,
        });

        tracer.phase_begin(&PhaseBeginEvent {
            output: output.id,
            phase: PhaseKind::PostPaint,
        });
        for id in self.stacking_order.clone() {
            effects.post_paint_window(self, id);
        }
        effects.post_paint_screen(self, output.id);
        tracer.phase_end(&PhaseEndEvent {
            output: output.id,
            phase: PhaseKind::PostPaint,
        });

        let frame = mem::take(&mut self.frame);
        let valid = region.united(&frame.painted).intersected(&display);
        PaintResult {
            damaged: frame.damaged,
            valid,
        }
    }

    // -- Strategy selection and the two strategies --

    /// The screen-pass terminal: every `EffectChain::paint_screen` must end
    /// here. Selects the painting strategy from the mask.
    #[expect(clippy::too_many_arguments, reason = "mirrors the effect-chain hook")]
    pub fn final_paint_screen(
        &mut self,
        effects: &mut dyn EffectChain,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        output: OutputId,
        mask: PaintMask,
        region: &Region,
        data: &mut ScreenPaintData,
        guard: Option<WindowId>,
    ) {
        _ = output;
        self.frame.paint_screen_count += 1;
        if mask.intersects(PaintMask::SCREEN_TRANSFORMED | PaintMask::SCREEN_WITH_TRANSFORMED_WINDOWS)
        {
            self.paint_generic_screen(effects, backend, tracer, mask, data.transform, guard);
        } else {
            self.paint_simple_screen(effects, backend, tracer, mask, region, guard);
        }
    }

    /// The generic strategy: paints every window bottom to top with no
    /// clipping. Handles screen and window transforms; the whole display
    /// ends up damaged.
    fn paint_generic_screen(
        &mut self,
        effects: &mut dyn EffectChain,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        orig_mask: PaintMask,
        screen_transform: kurbo::Affine,
        guard: Option<WindowId>,
    ) {
        let output_index = self.frame.output_index;
        let output = self.outputs[output_index];
        let display = Region::from_rect(output.geometry);

        let mut phase2 = Vec::with_capacity(self.stacking_order.len());
        for id in self.stacking_order.clone() {
            let Some(window) = self.windows.get_mut(&id) else {
                continue;
            };
            for slot in window.refresh() {
                backend.update_surface(id, slot);
            }
            // Reset here: effects schedule next-frame repaints from within
            // pre_paint_window, and those must survive this frame.
            window.reset_repaints(output_index);
            window.reset_painting_enabled();

            let mut data = WindowPrePaintData {
                mask: orig_mask
                    | if window.is_opaque() {
                        PaintMask::WINDOW_OPAQUE
                    } else {
                        PaintMask::WINDOW_TRANSLUCENT
                    },
                // No clipping in this strategy, so the paint region is moot.
                paint: display.clone(),
                clip: Region::new(),
                quads: window.build_quads(effects),
            };
            effects.pre_paint_window(id, &mut data);
            debug_assert!(
                !data.quads.is_transformed(),
                "pre-paint hooks must not transform quads"
            );
            if !window.is_painting_enabled() {
                continue;
            }
            phase2.push(PhaseData {
                window: id,
                region: display.clone(),
                clip: data.clip,
                mask: data.mask,
                quads: data.quads,
            });
        }

        self.frame.damaged = display.clone();

        if self.frame.paint_screen_count == 1 && orig_mask.contains(PaintMask::SCREEN_BACKGROUND_FIRST)
        {
            backend.draw_background(output.id, &display);
        }
        if !orig_mask.contains(PaintMask::SCREEN_BACKGROUND_FIRST) {
            backend.draw_background(output.id, &display);
        }
        for data in phase2 {
            self.paint_window(
                effects,
                backend,
                tracer,
                output.id,
                data.window,
                data.mask,
                &data.region,
                data.quads,
                screen_transform,
                guard,
            );
        }
    }

    /// The optimized strategy: occlusion culling in two passes over the
    /// stacking order.
    ///
    /// The bottom-to-top pre-paint pass computes each window's opaque clip
    /// and accumulates the dirty area. The top-to-bottom culling pass
    /// subtracts `allclips`, the running union of opaque clips above, from
    /// each window's paint region, while `upper_translucent_damage` carries
    /// the regions translucent windows above still need composited beneath
    /// them. The final bottom-to-top paint expands each region by everything
    /// painted so far, since translucency composites over whatever is
    /// already in the buffer.
    fn paint_simple_screen(
        &mut self,
        effects: &mut dyn EffectChain,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        orig_mask: PaintMask,
        region: &Region,
        guard: Option<WindowId>,
    ) {
        debug_assert!(
            !orig_mask
                .intersects(PaintMask::SCREEN_TRANSFORMED | PaintMask::SCREEN_WITH_TRANSFORMED_WINDOWS),
            "transformed passes take the generic strategy"
        );
        let output_index = self.frame.output_index;
        let output = self.outputs[output_index];
        let display = Region::from_rect(output.geometry);

        let mut phase2 = Vec::with_capacity(self.stacking_order.len());
        let mut dirty_area = region.clone();
        let mut opaque_fullscreen = false;

        for id in self.stacking_order.clone() {
            let Some(window) = self.windows.get_mut(&id) else {
                continue;
            };
            let opaque = window.is_opaque();
            let mut data = WindowPrePaintData {
                mask: orig_mask
                    | if opaque {
                        PaintMask::WINDOW_OPAQUE
                    } else {
                        PaintMask::WINDOW_TRANSLUCENT
                    },
                paint: region.clone(),
                clip: Region::new(),
                quads: QuadList::new(),
            };
            window.reset_painting_enabled();
            data.paint.union(&window.repaints(output_index, output.geometry));

            for slot in window.refresh() {
                backend.update_surface(id, slot);
            }
            window.reset_repaints(output_index);

            opaque_fullscreen = false;
            if opaque {
                opaque_fullscreen = window.model().is_fullscreen();
                data.clip.union(&window.map_to_global(&window.shape()));
            } else if window.model().has_alpha() && window.model().opacity() == 1.0 {
                let shape = window.shape();
                let opaque_part = window.opaque();
                data.clip = window.map_to_global(&shape.intersected(&opaque_part));
                // Fully opaque content behind a translucent frame still
                // clips like an opaque window.
                if opaque_part == shape {
                    data.mask = orig_mask | PaintMask::WINDOW_OPAQUE;
                }
            } else {
                data.clip = Region::new();
            }
            if let Some(decoration) = window.model().decoration() {
                if !decoration.has_alpha && window.model().opacity() == 1.0 {
                    data.clip.union(&window.map_to_global(&window.decoration_shape()));
                }
            }

            data.quads = window.build_quads(effects);
            effects.pre_paint_window(id, &mut data);
            debug_assert!(
                !data.quads.is_transformed(),
                "pre-paint hooks must not transform quads"
            );
            if !window.is_painting_enabled() {
                continue;
            }
            dirty_area.union(&data.paint);
            phase2.push(PhaseData {
                window: id,
                region: data.paint,
                clip: data.clip,
                mask: data.mask,
                quads: data.quads,
            });
        }

        // The part of the repair region nothing actually dirtied: rendered
        // to bring the reused buffer up to date, but kept out of the damage
        // history, otherwise the repaint region grows every frame until it
        // covers the whole buffer.
        let repaint_clip = self.frame.repaint.subtracted(&dirty_area);
        dirty_area.union(&self.frame.repaint);

        let mut full_repaint = dirty_area == display;
        if !full_repaint {
            backend.extend_paint_region(&mut dirty_area, opaque_fullscreen);
            full_repaint = dirty_area == display;
        }

        let mut allclips = Region::new();
        let mut upper_translucent_damage = self.frame.repaint.clone();

        for data in phase2.iter_mut().rev() {
            if full_repaint {
                data.region = display.clone();
            } else {
                data.region.union(&upper_translucent_damage);
            }
            // Pixels guaranteed to be covered by an opaque window above.
            data.region.subtract(&allclips);

            if !data.clip.is_empty() && !data.mask.contains(PaintMask::WINDOW_TRANSLUCENT) {
                allclips.union(&data.clip);
                if !full_repaint {
                    upper_translucent_damage.union(&data.region.subtracted(&data.clip));
                }
            } else if !full_repaint {
                upper_translucent_damage.union(&data.region);
            }
        }

        let mut painted_area = Region::new();
        if self.frame.paint_screen_count == 1 && orig_mask.contains(PaintMask::SCREEN_BACKGROUND_FIRST)
        {
            backend.draw_background(output.id, &display);
        }
        if !orig_mask.contains(PaintMask::SCREEN_BACKGROUND_FIRST) {
            painted_area = dirty_area.subtracted(&allclips);
            backend.draw_background(output.id, &painted_area);
        }

        for data in phase2 {
            // Everything painted beneath must be repainted through this
            // window wherever it is translucent.
            painted_area.union(&data.region);
            let paint = painted_area.clone();
            self.paint_window(
                effects,
                backend,
                tracer,
                output.id,
                data.window,
                data.mask,
                &paint,
                data.quads,
                kurbo::Affine::IDENTITY,
                guard,
            );
        }

        if full_repaint {
            self.frame.painted = display.clone();
            self.frame.damaged = display.subtracted(&repaint_clip);
        } else {
            self.frame.painted.union(&painted_area);
            self.frame.damaged = painted_area.subtracted(&repaint_clip);
        }
    }

    // -- Per-window painting --

    /// Paints one window, then composites its anchored thumbnails.
    #[expect(clippy::too_many_arguments, reason = "per-window pass parameters")]
    fn paint_window(
        &mut self,
        effects: &mut dyn EffectChain,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        output: OutputId,
        window: WindowId,
        mask: PaintMask,
        region: &Region,
        quads: QuadList,
        transform: kurbo::Affine,
        guard: Option<WindowId>,
    ) {
        let display = self.outputs[self.frame.output_index].geometry;
        let region = region.intersected(&Region::from_rect(display));
        if region.is_empty() {
            return;
        }
        let Some(win) = self.windows.get(&window) else {
            return;
        };
        if win.model().is_deleted() && win.model().skips_close_animation() {
            return;
        }
        if guard == Some(window) {
            tracer.warning(Warning::ThumbnailRecursion);
            return;
        }

        let mut data = WindowPaintData::new(quads);
        data.transform = transform;
        effects.paint_window(
            self, backend, tracer, output, window, mask, &region, &mut data, guard,
        );

        self.paint_window_thumbnails(effects, backend, tracer, output, window, &region, data.opacity);
        self.paint_desktop_thumbnails(effects, backend, tracer, output, window);
    }

    /// The window-pass terminal: every `EffectChain::paint_window` must end
    /// here.
    #[expect(clippy::too_many_arguments, reason = "mirrors the effect-chain hook")]
    pub fn final_paint_window(
        &mut self,
        effects: &mut dyn EffectChain,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        output: OutputId,
        window: WindowId,
        mask: PaintMask,
        region: &Region,
        data: &mut WindowPaintData,
        guard: Option<WindowId>,
    ) {
        _ = guard;
        effects.draw_window(self, backend, tracer, output, window, mask, region, data);
    }

    /// The draw terminal: every `EffectChain::draw_window` must end here.
    /// This is the blit.
    #[expect(clippy::too_many_arguments, reason = "mirrors the effect-chain hook")]
    pub fn final_draw_window(
        &mut self,
        effects: &mut dyn EffectChain,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        output: OutputId,
        window: WindowId,
        mask: PaintMask,
        region: &Region,
        data: &mut WindowPaintData,
    ) {
        _ = effects;
        backend.draw_window(output, window, mask, region, data);
        tracer.window_paint(&WindowPaintEvent {
            window,
            mask: mask.bits(),
            clip_rects: region.rects().len(),
        });
    }

    /// Draws the window thumbnails anchored to `embedder`: each mirrored
    /// window is an independent scaled draw, clipped to the thumbnail rect.
    fn paint_window_thumbnails(
        &mut self,
        effects: &mut dyn EffectChain,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        output: OutputId,
        embedder: WindowId,
        region: &Region,
        opacity: f64,
    ) {
        let Some(win) = self.windows.get(&embedder) else {
            return;
        };
        let thumbnails = win.window_thumbnails().to_vec();
        if thumbnails.is_empty() {
            return;
        }
        let embedder_rect = win.model().geometry();

        for thumbnail in thumbnails {
            let Some(mirrored) = self.windows.get_mut(&thumbnail.window) else {
                continue;
            };
            let mirrored_rect = mirrored.model().geometry();
            if mirrored_rect.is_empty() || thumbnail.rect.is_empty() {
                continue;
            }
            let quads = mirrored.build_quads(effects);

            // Fit the window into the thumbnail rect, preserving aspect
            // ratio and never upscaling.
            let scale = (f64::from(thumbnail.rect.width) / f64::from(mirrored_rect.width))
                .min(f64::from(thumbnail.rect.height) / f64::from(mirrored_rect.height))
                .min(1.0);
            let scaled_w = f64::from(mirrored_rect.width) * scale;
            let scaled_h = f64::from(mirrored_rect.height) * scale;
            let target = thumbnail.rect.translated(embedder_rect.x, embedder_rect.y);
            let x = f64::from(target.x) + (f64::from(target.width) - scaled_w) / 2.0;
            let y = f64::from(target.y) + (f64::from(target.height) - scaled_h) / 2.0;

            let mut clip = region.clone();
            clip.intersect_rect(embedder_rect);
            clip.intersect_rect(target);
            if clip.is_empty() {
                continue;
            }

            let mut data = WindowPaintData::new(quads);
            data.opacity = opacity * thumbnail.opacity;
            data.transform = kurbo::Affine::translate((x, y)) * kurbo::Affine::scale(scale);
            let mask = PaintMask::WINDOW_TRANSFORMED
                | if data.opacity == 1.0 {
                    PaintMask::WINDOW_OPAQUE
                } else {
                    PaintMask::WINDOW_TRANSLUCENT
                };
            effects.draw_window(
                self,
                backend,
                tracer,
                output,
                thumbnail.window,
                mask,
                &clip,
                &mut data,
            );
        }
    }

    /// Draws the desktop thumbnails anchored to `embedder`: each is a
    /// nested, scaled screen pass with the recursion guard set so the
    /// embedding window is skipped inside its own preview.
    fn paint_desktop_thumbnails(
        &mut self,
        effects: &mut dyn EffectChain,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        output: OutputId,
        embedder: WindowId,
    ) {
        let Some(win) = self.windows.get(&embedder) else {
            return;
        };
        let thumbnails = win.desktop_thumbnails().to_vec();
        if thumbnails.is_empty() {
            return;
        }
        let embedder_rect = win.model().geometry();
        let screen = self.outputs[self.frame.output_index].geometry;

        for thumbnail in thumbnails {
            if thumbnail.rect.is_empty() || screen.is_empty() {
                continue;
            }
            // Fit the screen into the thumbnail rect, preserving aspect
            // ratio.
            let scale = (f64::from(thumbnail.rect.width) / f64::from(screen.width))
                .min(f64::from(thumbnail.rect.height) / f64::from(screen.height));
            let scaled_w = f64::from(screen.width) * scale;
            let scaled_h = f64::from(screen.height) * scale;
            let target = thumbnail.rect.translated(embedder_rect.x, embedder_rect.y);
            let x = f64::from(target.x) + (f64::from(target.width) - scaled_w) / 2.0;
            let y = f64::from(target.y) + (f64::from(target.height) - scaled_h) / 2.0;

            let mut clip = Region::from_rect(target);
            clip.intersect_rect(embedder_rect);
            if clip.is_empty() {
                continue;
            }

            let mask = PaintMask::SCREEN_TRANSFORMED
                | PaintMask::WINDOW_TRANSFORMED
                | PaintMask::SCREEN_BACKGROUND_FIRST;
            let mut data = ScreenPaintData {
                transform: kurbo::Affine::translate((x, y)) * kurbo::Affine::scale(scale),
            };
            effects.paint_screen(
                self,
                backend,
                tracer,
                output,
                mask,
                &clip,
                &mut data,
                Some(embedder),
            );
        }
    }
}
