// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The presentation-backend contract.
//!
//! The scene decides *what* to paint; a [`Backend`] turns that into pixels.
//! Everything GPU- or platform-specific (swapchains, texture upload, the
//! actual blits) lives behind this trait.

use strata_core::geometry::Size;
use strata_core::output::OutputId;
use strata_core::region::Region;
use strata_core::window::WindowId;

use crate::effect::WindowPaintData;
use crate::mask::PaintMask;

/// Renders one frame at the scene's direction.
pub trait Backend {
    /// Starts a frame on the given output.
    fn begin_frame(&mut self, output: OutputId);

    /// Finishes the frame; `damaged` is the region to copy to the output's
    /// internal target.
    fn end_frame(&mut self, output: OutputId, damaged: &Region);

    /// The age of the output's back buffer in frames; 0 when unknown.
    fn buffer_age(&mut self, output: OutputId) -> usize;

    /// Fills the given region with the background.
    fn draw_background(&mut self, output: OutputId, region: &Region);

    /// Blits one window, clipped to `region`.
    fn draw_window(
        &mut self,
        output: OutputId,
        window: WindowId,
        mask: PaintMask,
        region: &Region,
        data: &WindowPaintData,
    );

    /// Re-pulls the contents of a surface item whose buffer changed.
    /// `item_slot` is the raw slot index within the window's item tree.
    fn update_surface(&mut self, window: WindowId, item_slot: u32);

    /// Lets the backend grow the region that will be repainted, e.g. for
    /// tiled renderers. `opaque_fullscreen` hints that an opaque fullscreen
    /// window covers the output.
    fn extend_paint_region(&mut self, region: &mut Region, opaque_fullscreen: bool) {
        _ = (region, opaque_fullscreen);
    }

    /// The overall compositing space changed size (outputs added, removed,
    /// or rearranged).
    fn resize_overlay(&mut self, size: Size) {
        _ = size;
    }
}
