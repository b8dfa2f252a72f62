// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint masks and painting-disabled reasons.

use bitflags::bitflags;

bitflags! {
    /// Hints negotiated between the orchestrator, the effect chain, and the
    /// backend during a paint pass.
    ///
    /// The screen bits describe the whole pass; the window bits are set per
    /// window draw. Any of the transform bits forces the generic (full
    /// repaint, no culling) painting strategy.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PaintMask: u32 {
        /// The window is painted fully opaque.
        const WINDOW_OPAQUE = 1 << 0;
        /// The window is painted with translucency.
        const WINDOW_TRANSLUCENT = 1 << 1;
        /// The window geometry is transformed by an effect.
        const WINDOW_TRANSFORMED = 1 << 2;
        /// Only a sub-region of the screen is painted.
        const SCREEN_REGION = 1 << 3;
        /// The whole screen is transformed by an effect.
        const SCREEN_TRANSFORMED = 1 << 4;
        /// At least one window on the screen is transformed.
        const SCREEN_WITH_TRANSFORMED_WINDOWS = 1 << 5;
        /// The background must be cleared before windows are painted.
        const SCREEN_BACKGROUND_FIRST = 1 << 6;
    }
}

impl PaintMask {
    /// The bits that force the generic painting strategy.
    pub const TRANSFORM_BITS: Self = Self::SCREEN_TRANSFORMED
        .union(Self::SCREEN_WITH_TRANSFORMED_WINDOWS)
        .union(Self::WINDOW_TRANSFORMED);

    /// Returns whether any transform bit is set.
    #[must_use]
    pub const fn is_transformed(self) -> bool {
        self.intersects(Self::TRANSFORM_BITS)
    }
}

bitflags! {
    /// Reasons a window is currently excluded from painting.
    ///
    /// A window paints only while this is empty. The scene recomputes the
    /// mask from the window model each frame; effects can additionally
    /// toggle individual reasons to force windows visible or invisible.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PaintDisabled: u32 {
        /// Hidden by the compositor itself.
        const HIDDEN = 1 << 0;
        /// The window is closed and lingering for its close animation.
        const BY_DELETE = 1 << 1;
        /// The window is on another virtual desktop.
        const BY_DESKTOP = 1 << 2;
        /// The window is minimized.
        const BY_MINIMIZE = 1 << 3;
        /// The window is on another activity.
        const BY_ACTIVITY = 1 << 4;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_bits_force_generic_path() {
        assert!(!PaintMask::SCREEN_REGION.is_transformed());
        assert!(PaintMask::SCREEN_TRANSFORMED.is_transformed());
        assert!(PaintMask::SCREEN_WITH_TRANSFORMED_WINDOWS.is_transformed());
        assert!(PaintMask::WINDOW_TRANSFORMED.is_transformed());
        assert!(
            (PaintMask::SCREEN_REGION | PaintMask::WINDOW_TRANSFORMED).is_transformed(),
            "any transform bit suffices"
        );
    }
}
