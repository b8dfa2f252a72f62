// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-window scene wrapper.
//!
//! [`SceneWindow`] couples a [`WindowModel`] with the item tree describing
//! its visual parts, the per-output repaint buckets, the cached quad list,
//! and whatever is anchored to the window (shadow, thumbnails). The scene
//! orchestrator owns these and drives them once per frame.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use strata_core::geometry::Rect;
use strata_core::item::{ItemId, ItemKind, ItemTree};
use strata_core::output::Output;
use strata_core::region::Region;
use strata_core::window::{WindowId, WindowModel};

use crate::effect::EffectChain;
use crate::mask::PaintDisabled;
use crate::quad::{QuadList, build_contents_quads, build_decoration_quads};

/// A window's drop shadow: a pre-built quad list plus the region it covers
/// beyond the frame, both window-local.
#[derive(Clone, Debug, Default)]
pub struct Shadow {
    /// Shadow quads in window-local coordinates.
    pub quads: QuadList,
    /// The area the shadow covers, window-local.
    pub region: Region,
}

/// A window thumbnail anchored inside another window.
#[derive(Clone, Copy, Debug)]
pub struct WindowThumbnail {
    /// The window being mirrored.
    pub window: WindowId,
    /// Placement within the embedding window, window-local.
    pub rect: Rect,
    /// Opacity of the mirrored draw.
    pub opacity: f64,
}

/// A live desktop preview anchored inside a window.
#[derive(Clone, Copy, Debug)]
pub struct DesktopThumbnail {
    /// Which virtual desktop is previewed.
    pub desktop: u32,
    /// Placement within the embedding window, window-local.
    pub rect: Rect,
}

/// One toplevel window as the scene sees it.
pub struct SceneWindow {
    id: WindowId,
    model: Box<dyn WindowModel>,
    tree: ItemTree,
    root: ItemId,
    /// Per-output repaint buckets. An infinite bucket means "everything".
    repaints: Vec<Region>,
    disable_painting: PaintDisabled,
    quad_cache: Option<QuadList>,
    shadow: Option<Shadow>,
    window_thumbnails: Vec<WindowThumbnail>,
    desktop_thumbnails: Vec<DesktopThumbnail>,
}

impl core::fmt::Debug for SceneWindow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SceneWindow")
            .field("id", &self.id)
            .field("geometry", &self.model.geometry())
            .field("root", &self.root)
            .field("buckets", &self.repaints.len())
            .field("disable_painting", &self.disable_painting)
            .finish_non_exhaustive()
    }
}

impl SceneWindow {
    /// Wraps a window model, creating the root item at the window's global
    /// position.
    #[must_use]
    pub fn new(id: WindowId, model: Box<dyn WindowModel>) -> Self {
        let mut tree = ItemTree::new();
        let root = tree.create_item(ItemKind::Group);
        let geometry = model.geometry();
        tree.set_position(root, geometry.position());
        tree.set_size(root, geometry.size());

        Self {
            id,
            model,
            tree,
            root,
            repaints: vec![Region::infinite()],
            disable_painting: PaintDisabled::empty(),
            quad_cache: None,
            shadow: None,
            window_thumbnails: Vec::new(),
            desktop_thumbnails: Vec::new(),
        }
    }

    /// The window's identity.
    #[must_use]
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// The window model.
    #[must_use]
    pub fn model(&self) -> &dyn WindowModel {
        &*self.model
    }

    /// Replaces the window model, e.g. with a closing remnant.
    pub fn replace_model(&mut self, model: Box<dyn WindowModel>) {
        self.model = model;
    }

    /// The window's item tree.
    #[must_use]
    pub fn tree(&self) -> &ItemTree {
        &self.tree
    }

    /// Mutable access to the item tree.
    pub fn tree_mut(&mut self) -> &mut ItemTree {
        &mut self.tree
    }

    /// The root item.
    #[must_use]
    pub fn root(&self) -> ItemId {
        self.root
    }

    /// Re-reads the window's frame geometry into the root item, scheduling
    /// the before/after repaints. The scene calls this on every commit so
    /// model moves and resizes flow into the repaint buckets; unchanged
    /// geometry is a no-op.
    pub fn update_geometry(&mut self) {
        let geometry = self.model.geometry();
        self.tree.set_position(self.root, geometry.position());
        self.tree.set_size(self.root, geometry.size());
    }

    // -- Visibility --

    /// Whether the window should appear at all: not deleted, on the current
    /// desktop and activity, and shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.model.is_deleted()
            && self.model.is_on_current_desktop()
            && self.model.is_on_current_activity()
            && self.model.is_shown()
    }

    /// Whether the window can be painted right now.
    #[must_use]
    pub fn is_painting_enabled(&self) -> bool {
        self.disable_painting.is_empty()
    }

    /// Recomputes the painting-disabled mask from the model.
    pub fn reset_painting_enabled(&mut self) {
        let mut mask = PaintDisabled::empty();
        if self.model.is_deleted() {
            mask |= PaintDisabled::BY_DELETE;
        }
        if !self.model.is_on_current_desktop() {
            mask |= PaintDisabled::BY_DESKTOP;
        }
        if !self.model.is_on_current_activity() {
            mask |= PaintDisabled::BY_ACTIVITY;
        }
        if self.model.is_minimized() {
            mask |= PaintDisabled::BY_MINIMIZE;
        }
        if self.model.is_hidden_internal() {
            mask |= PaintDisabled::HIDDEN;
        }
        self.disable_painting = mask;
    }

    /// Removes one painting-disabled reason.
    pub fn enable_painting(&mut self, reason: PaintDisabled) {
        self.disable_painting -= reason;
    }

    /// Adds one painting-disabled reason.
    pub fn disable_painting(&mut self, reason: PaintDisabled) {
        self.disable_painting |= reason;
    }

    /// Whether the window is fully opaque: full opacity and no alpha
    /// channel.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.model.opacity() == 1.0 && !self.model.has_alpha()
    }

    // -- Shape --

    /// The union of all surface shapes, in window-local coordinates.
    #[must_use]
    pub fn shape(&self) -> Region {
        self.accumulate_surfaces(|data| &data.shape)
    }

    /// The union of all surface opaque regions, in window-local
    /// coordinates.
    #[must_use]
    pub fn opaque(&self) -> Region {
        self.accumulate_surfaces(|data| &data.opaque)
    }

    /// The decoration shape: the union of the border rects, window-local.
    #[must_use]
    pub fn decoration_shape(&self) -> Region {
        let mut region = Region::new();
        if let Some(decoration) = self.model.decoration() {
            for rect in decoration.border_rects {
                region.union_rect(rect);
            }
        }
        region
    }

    /// Translates a window-local region to global coordinates.
    #[must_use]
    pub fn map_to_global(&self, region: &Region) -> Region {
        let pos = self.tree.position(self.root);
        region.translated(pos.x, pos.y)
    }

    fn accumulate_surfaces(&self, pick: impl Fn(&strata_core::item::SurfaceData) -> &Region) -> Region {
        let mut acc = Region::new();
        let mut stack = vec![self.root];
        while let Some(item) = stack.pop() {
            if let ItemKind::Surface(data) = self.tree.kind(item) {
                let pos = self.tree.window_position(item);
                acc.union(&pick(data).translated(pos.x, pos.y));
            }
            stack.extend(self.tree.children(item));
        }
        acc
    }

    // -- Repaint buckets --

    /// Unions `region ∩ output.geometry` into each intersecting bucket.
    ///
    /// Returns `false` (dropping the repaint) when the buckets have not yet
    /// been reallocated to the current output count; a reallocation with a
    /// full repaint is already pending in that case.
    pub fn add_layer_repaint(&mut self, outputs: &[Output], region: &Region) -> bool {
        if self.repaints.len() != outputs.len() {
            return false;
        }
        for (bucket, output) in self.repaints.iter_mut().zip(outputs) {
            let mut dirty = region.clone();
            dirty.intersect_rect(output.geometry);
            if !dirty.is_empty() {
                bucket.union(&dirty);
            }
        }
        true
    }

    /// The pending repaints for one output. An infinite bucket maps to the
    /// output's whole geometry.
    #[must_use]
    pub fn repaints(&self, index: usize, output_geometry: Rect) -> Region {
        let bucket = &self.repaints[index];
        if *bucket == Region::infinite() {
            Region::from_rect(output_geometry)
        } else {
            bucket.clone()
        }
    }

    /// Clears one output's bucket.
    pub fn reset_repaints(&mut self, index: usize) {
        self.repaints[index] = Region::new();
    }

    /// Resizes the buckets to the output count, refilling every bucket with
    /// an infinite region so each output fully repaints the window once.
    pub fn realloc_repaints(&mut self, count: usize) {
        self.repaints.clear();
        self.repaints.resize(count, Region::infinite());
    }

    /// Number of repaint buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.repaints.len()
    }

    // -- Quads --

    /// Returns the window's quad list, rebuilding it when a mutation has
    /// invalidated the cache.
    ///
    /// Assembly order: contents, decoration, shadow, then the effect chain's
    /// appendix. A rebuild with unchanged inputs yields an identical list.
    pub fn build_quads(&mut self, effects: &mut dyn EffectChain) -> QuadList {
        if self.tree.take_quads_dirty() {
            self.quad_cache = None;
        }
        if let Some(cached) = &self.quad_cache {
            return cached.clone();
        }

        let mut quads = build_contents_quads(&self.tree, self.root);
        if let Some(decoration) = self.model.decoration() {
            quads.append(&build_decoration_quads(
                &decoration.border_rects,
                &self.decoration_shape(),
                decoration.texture_scale,
            ));
        }
        if self.model.wants_shadow() {
            if let Some(shadow) = &self.shadow {
                quads.append(&shadow.quads);
            }
        }
        effects.build_quads(self.id, &mut quads);

        self.quad_cache = Some(quads.clone());
        quads
    }

    /// Drops the cached quad list.
    pub fn discard_quads(&mut self) {
        self.quad_cache = None;
    }

    // -- Shadow and thumbnails --

    /// The attached shadow, if any.
    #[must_use]
    pub fn shadow(&self) -> Option<&Shadow> {
        self.shadow.as_ref()
    }

    /// Attaches or removes the drop shadow, repainting its footprint.
    pub fn set_shadow(&mut self, shadow: Option<Shadow>) {
        let mut footprint = self.shadow.as_ref().map(|s| s.region.clone()).unwrap_or_default();
        if let Some(new) = &shadow {
            footprint.union(&new.region);
        }
        self.shadow = shadow;
        self.quad_cache = None;
        self.tree.schedule_repaint(self.root, &footprint);
    }

    /// Window thumbnails anchored to this window.
    #[must_use]
    pub fn window_thumbnails(&self) -> &[WindowThumbnail] {
        &self.window_thumbnails
    }

    /// Desktop thumbnails anchored to this window.
    #[must_use]
    pub fn desktop_thumbnails(&self) -> &[DesktopThumbnail] {
        &self.desktop_thumbnails
    }

    /// Anchors a window thumbnail.
    pub fn add_window_thumbnail(&mut self, thumbnail: WindowThumbnail) {
        self.window_thumbnails.push(thumbnail);
    }

    /// Anchors a desktop thumbnail.
    pub fn add_desktop_thumbnail(&mut self, thumbnail: DesktopThumbnail) {
        self.desktop_thumbnails.push(thumbnail);
    }

    /// Removes all anchored thumbnails.
    pub fn clear_thumbnails(&mut self) {
        self.window_thumbnails.clear();
        self.desktop_thumbnails.clear();
    }

    // -- Frame preparation --

    /// Drains the surface items whose buffers changed since the last frame.
    /// The backend re-pulls each one's contents before drawing.
    pub fn refresh(&mut self) -> Vec<u32> {
        self.tree.take_content_changes()
    }
}

#[cfg(test)]
mod tests {
    use strata_core::geometry::{Point, Size};
    use strata_core::item::{BufferId, BufferSource, SurfaceData};
    use strata_core::output::{Output, OutputId};
    use strata_core::window::Decoration;

    use crate::effect::NoEffects;

    use super::*;

    struct TestModel {
        geometry: Rect,
        opacity: f64,
        has_alpha: bool,
        deleted: bool,
        minimized: bool,
        decorated: bool,
    }

    impl Default for TestModel {
        fn default() -> Self {
            Self {
                geometry: Rect::new(100, 50, 400, 300),
                opacity: 1.0,
                has_alpha: false,
                deleted: false,
                minimized: false,
                decorated: false,
            }
        }
    }

    impl WindowModel for TestModel {
        fn geometry(&self) -> Rect {
            self.geometry
        }
        fn opacity(&self) -> f64 {
            self.opacity
        }
        fn has_alpha(&self) -> bool {
            self.has_alpha
        }
        fn is_deleted(&self) -> bool {
            self.deleted
        }
        fn skips_close_animation(&self) -> bool {
            false
        }
        fn is_on_current_desktop(&self) -> bool {
            true
        }
        fn is_on_current_activity(&self) -> bool {
            true
        }
        fn is_shown(&self) -> bool {
            true
        }
        fn is_minimized(&self) -> bool {
            self.minimized
        }
        fn is_hidden_internal(&self) -> bool {
            false
        }
        fn is_fullscreen(&self) -> bool {
            false
        }
        fn wants_shadow(&self) -> bool {
            false
        }
        fn decoration(&self) -> Option<Decoration> {
            self.decorated.then(|| Decoration {
                border_rects: [
                    Rect::new(0, 10, 10, 280),
                    Rect::new(0, 0, 400, 10),
                    Rect::new(390, 10, 10, 280),
                    Rect::new(0, 290, 400, 10),
                ],
                has_alpha: false,
                texture_scale: 1.0,
            })
        }
    }

    fn window(model: TestModel) -> SceneWindow {
        SceneWindow::new(WindowId(1), Box::new(model))
    }

    fn attach_surface(win: &mut SceneWindow, size: Size) -> ItemId {
        let root = win.root();
        let item = win.tree_mut().create_item(ItemKind::Surface(SurfaceData {
            shape: Region::from_rect(Rect::from_size(size)),
            opaque: Region::from_rect(Rect::from_size(size)),
            buffer: Some(BufferSource {
                id: BufferId(7),
                size,
                to_buffer: kurbo::Affine::IDENTITY,
            }),
        }));
        win.tree_mut().add_child(root, item);
        win.tree_mut().set_size(item, size);
        item
    }

    #[test]
    fn layer_repaint_round_trip() {
        let outputs = [
            Output::new(OutputId(0), Rect::new(0, 0, 1000, 1000)),
            Output::new(OutputId(1), Rect::new(1000, 0, 1000, 1000)),
        ];
        let mut win = window(TestModel::default());
        win.realloc_repaints(outputs.len());
        for i in 0..outputs.len() {
            win.reset_repaints(i);
        }

        // A repaint spanning the output seam lands split into both buckets.
        let region = Region::from_rect(Rect::new(900, 100, 200, 50));
        assert!(win.add_layer_repaint(&outputs, &region));

        assert_eq!(
            win.repaints(0, outputs[0].geometry),
            Region::from_rect(Rect::new(900, 100, 100, 50))
        );
        assert_eq!(
            win.repaints(1, outputs[1].geometry),
            Region::from_rect(Rect::new(1000, 100, 100, 50))
        );

        win.reset_repaints(0);
        assert!(win.repaints(0, outputs[0].geometry).is_empty());
        assert!(!win.repaints(1, outputs[1].geometry).is_empty());
    }

    #[test]
    fn stale_buckets_drop_repaints() {
        let outputs = [
            Output::new(OutputId(0), Rect::new(0, 0, 1000, 1000)),
            Output::new(OutputId(1), Rect::new(1000, 0, 1000, 1000)),
        ];
        // Not yet reallocated: one bucket against two outputs.
        let mut win = window(TestModel::default());
        assert_eq!(win.bucket_count(), 1);
        assert!(
            !win.add_layer_repaint(&outputs, &Region::from_rect(Rect::new(0, 0, 10, 10))),
            "repaints before reallocation must be dropped"
        );
    }

    #[test]
    fn infinite_bucket_maps_to_output_geometry() {
        let output = Output::new(OutputId(0), Rect::new(0, 0, 1920, 1080));
        let mut win = window(TestModel::default());
        win.realloc_repaints(1);
        assert_eq!(
            win.repaints(0, output.geometry),
            Region::from_rect(output.geometry)
        );
    }

    #[test]
    fn painting_disabled_mask_tracks_model() {
        let mut win = window(TestModel {
            deleted: true,
            minimized: true,
            ..TestModel::default()
        });
        win.reset_painting_enabled();
        assert!(!win.is_painting_enabled());

        win.enable_painting(PaintDisabled::BY_DELETE);
        assert!(!win.is_painting_enabled(), "minimize still disables");
        win.enable_painting(PaintDisabled::BY_MINIMIZE);
        assert!(win.is_painting_enabled());

        win.disable_painting(PaintDisabled::HIDDEN);
        assert!(!win.is_painting_enabled());
    }

    #[test]
    fn opacity_and_alpha_decide_opaqueness() {
        assert!(window(TestModel::default()).is_opaque());
        assert!(
            !window(TestModel {
                has_alpha: true,
                ..TestModel::default()
            })
            .is_opaque()
        );
        assert!(
            !window(TestModel {
                opacity: 0.9,
                ..TestModel::default()
            })
            .is_opaque()
        );
    }

    #[test]
    fn quad_cache_survives_until_invalidated() {
        let mut win = window(TestModel::default());
        let item = attach_surface(&mut win, Size::new(400, 300));
        let mut effects = NoEffects;

        let first = win.build_quads(&mut effects);
        assert_eq!(first.len(), 1);
        let second = win.build_quads(&mut effects);
        assert_eq!(first, second, "cached rebuild must be identical");

        // A geometry change invalidates the cache; the rebuild sees it.
        win.tree_mut().set_position(item, Point::new(10, 0));
        let third = win.build_quads(&mut effects);
        assert_eq!(
            third.quads()[0].vertices[0].position,
            kurbo::Point::new(10.0, 0.0)
        );
    }

    #[test]
    fn decoration_quads_are_appended() {
        let mut win = window(TestModel {
            decorated: true,
            ..TestModel::default()
        });
        let _ = attach_surface(&mut win, Size::new(380, 280));
        let mut effects = NoEffects;
        let quads = win.build_quads(&mut effects);
        // One contents quad plus the four border strips.
        assert_eq!(quads.len(), 5);
    }

    #[test]
    fn shape_accumulates_surfaces_in_window_coords() {
        let mut win = window(TestModel::default());
        let item = attach_surface(&mut win, Size::new(100, 100));
        win.tree_mut().set_position(item, Point::new(20, 30));

        assert_eq!(
            win.shape(),
            Region::from_rect(Rect::new(20, 30, 100, 100))
        );
        // Global mapping adds the window position.
        assert_eq!(
            win.map_to_global(&win.shape()),
            Region::from_rect(Rect::new(120, 80, 100, 100))
        );
    }

    #[test]
    fn update_geometry_repaints_old_and_new_footprint() {
        let mut win = window(TestModel::default());
        let _ = win.tree_mut().take_pending_repaints();

        win.replace_model(Box::new(TestModel {
            geometry: Rect::new(300, 50, 400, 300),
            ..TestModel::default()
        }));
        win.update_geometry();

        assert_eq!(win.tree().position(win.root()), Point::new(300, 50));
        let pending = win.tree_mut().take_pending_repaints();
        assert!(pending.contains_rect(Rect::new(100, 50, 400, 300)), "old footprint");
        assert!(pending.contains_rect(Rect::new(300, 50, 400, 300)), "new footprint");

        // Unchanged geometry schedules nothing.
        win.update_geometry();
        assert!(win.tree_mut().take_pending_repaints().is_empty());
    }

    #[test]
    fn refresh_drains_content_changes_once() {
        let mut win = window(TestModel::default());
        let item = attach_surface(&mut win, Size::new(64, 64));
        let _ = win.refresh();

        win.tree_mut()
            .mark_content(item, &Region::from_rect(Rect::new(0, 0, 64, 64)));
        assert_eq!(win.refresh(), alloc::vec![item.index()]);
        assert!(win.refresh().is_empty());
    }
}
