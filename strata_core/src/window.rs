// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The window-model contract.
//!
//! The scene never talks to a windowing stack directly. Everything it needs
//! to know about a toplevel is behind [`WindowModel`], implemented by the
//! embedding compositor. When a window closes, a read-only
//! [`WindowSnapshot`] of its final state is captured and wrapped in a
//! [`ClosingRemnant`], which stands in for the real window while its close
//! animation plays out.

use alloc::boxed::Box;
use core::fmt;

use crate::geometry::Rect;

/// Identifies a toplevel window within the scene.
///
/// The embedding compositor assigns these; the scene only requires them to
/// be unique among the windows it currently holds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u64);

impl fmt::Debug for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowId({})", self.0)
    }
}

/// Server-side decoration geometry, as reported by the window model.
///
/// The border rectangles are in window-local coordinates, in left, top,
/// right, bottom order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decoration {
    /// Left, top, right, and bottom border rectangles.
    pub border_rects: [Rect; 4],
    /// Whether the decoration needs alpha blending.
    pub has_alpha: bool,
    /// Ratio of decoration texture pixels to logical pixels.
    pub texture_scale: f64,
}

/// Everything the scene needs to know about a toplevel window.
///
/// Query methods only; all mutation flows the other way, through the scene's
/// item tree and repaint API.
pub trait WindowModel {
    /// The window frame geometry in global coordinates.
    fn geometry(&self) -> Rect;

    /// The window's overall opacity in `[0, 1]`.
    fn opacity(&self) -> f64;

    /// Whether the window's content has an alpha channel.
    fn has_alpha(&self) -> bool;

    /// Whether this window has been closed and only lingers for its close
    /// animation.
    fn is_deleted(&self) -> bool;

    /// Whether the window opted out of close animations entirely.
    fn skips_close_animation(&self) -> bool;

    /// Whether the window is on the currently shown virtual desktop.
    fn is_on_current_desktop(&self) -> bool;

    /// Whether the window is on the currently active activity.
    fn is_on_current_activity(&self) -> bool;

    /// Whether the window wants to be shown at all (not withdrawn).
    fn is_shown(&self) -> bool;

    /// Whether the window is minimized.
    fn is_minimized(&self) -> bool;

    /// Whether the compositor itself hid the window (e.g. a hidden panel).
    fn is_hidden_internal(&self) -> bool;

    /// Whether the window covers its whole output.
    fn is_fullscreen(&self) -> bool;

    /// Whether a drop shadow should be rendered for this window.
    fn wants_shadow(&self) -> bool;

    /// Server-side decoration geometry, if the window is decorated.
    fn decoration(&self) -> Option<Decoration>;
}

/// A plain read-only capture of a window model's state.
#[derive(Clone, Debug)]
pub struct WindowSnapshot {
    /// Frame geometry at capture time.
    pub geometry: Rect,
    /// Opacity at capture time.
    pub opacity: f64,
    /// Alpha-channel flag at capture time.
    pub has_alpha: bool,
    /// Close-animation opt-out at capture time.
    pub skips_close_animation: bool,
    /// Desktop visibility at capture time.
    pub is_on_current_desktop: bool,
    /// Activity visibility at capture time.
    pub is_on_current_activity: bool,
    /// Shown flag at capture time.
    pub is_shown: bool,
    /// Minimized flag at capture time.
    pub is_minimized: bool,
    /// Internal-hide flag at capture time.
    pub is_hidden_internal: bool,
    /// Fullscreen flag at capture time.
    pub is_fullscreen: bool,
    /// Shadow preference at capture time.
    pub wants_shadow: bool,
    /// Decoration geometry at capture time.
    pub decoration: Option<Decoration>,
}

impl WindowSnapshot {
    /// Captures the current state of a window model.
    #[must_use]
    pub fn capture(model: &dyn WindowModel) -> Self {
        Self {
            geometry: model.geometry(),
            opacity: model.opacity(),
            has_alpha: model.has_alpha(),
            skips_close_animation: model.skips_close_animation(),
            is_on_current_desktop: model.is_on_current_desktop(),
            is_on_current_activity: model.is_on_current_activity(),
            is_shown: model.is_shown(),
            is_minimized: model.is_minimized(),
            is_hidden_internal: model.is_hidden_internal(),
            is_fullscreen: model.is_fullscreen(),
            wants_shadow: model.wants_shadow(),
            decoration: model.decoration(),
        }
    }
}

/// A stand-in window model for a closed window.
///
/// Built from the final [`WindowSnapshot`] of the real window; every query
/// answers from the snapshot, except [`is_deleted`](WindowModel::is_deleted)
/// which is always true. The scene wrapper's ownership transfers to the
/// remnant explicitly at close time, so there is no shared back-pointer
/// between the live window and its afterimage.
#[derive(Clone, Debug)]
pub struct ClosingRemnant {
    snapshot: WindowSnapshot,
}

impl ClosingRemnant {
    /// Wraps a captured snapshot.
    #[must_use]
    pub fn new(snapshot: WindowSnapshot) -> Self {
        Self { snapshot }
    }

    /// Boxes the remnant as a window model.
    #[must_use]
    pub fn into_model(self) -> Box<dyn WindowModel> {
        Box::new(self)
    }
}

impl WindowModel for ClosingRemnant {
    fn geometry(&self) -> Rect {
        self.snapshot.geometry
    }

    fn opacity(&self) -> f64 {
        self.snapshot.opacity
    }

    fn has_alpha(&self) -> bool {
        self.snapshot.has_alpha
    }

    fn is_deleted(&self) -> bool {
        true
    }

    fn skips_close_animation(&self) -> bool {
        self.snapshot.skips_close_animation
    }

    fn is_on_current_desktop(&self) -> bool {
        self.snapshot.is_on_current_desktop
    }

    fn is_on_current_activity(&self) -> bool {
        self.snapshot.is_on_current_activity
    }

    fn is_shown(&self) -> bool {
        self.snapshot.is_shown
    }

    fn is_minimized(&self) -> bool {
        self.snapshot.is_minimized
    }

    fn is_hidden_internal(&self) -> bool {
        self.snapshot.is_hidden_internal
    }

    fn is_fullscreen(&self) -> bool {
        self.snapshot.is_fullscreen
    }

    fn wants_shadow(&self) -> bool {
        self.snapshot.wants_shadow
    }

    fn decoration(&self) -> Option<Decoration> {
        self.snapshot.decoration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl WindowModel for Fixed {
        fn geometry(&self) -> Rect {
            Rect::new(10, 20, 300, 200)
        }
        fn opacity(&self) -> f64 {
            0.5
        }
        fn has_alpha(&self) -> bool {
            true
        }
        fn is_deleted(&self) -> bool {
            false
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
            false
        }
        fn is_hidden_internal(&self) -> bool {
            false
        }
        fn is_fullscreen(&self) -> bool {
            false
        }
        fn wants_shadow(&self) -> bool {
            true
        }
        fn decoration(&self) -> Option<Decoration> {
            None
        }
    }

    #[test]
    fn remnant_answers_from_snapshot_but_is_deleted() {
        let snapshot = WindowSnapshot::capture(&Fixed);
        let remnant = ClosingRemnant::new(snapshot);

        assert!(remnant.is_deleted(), "remnants are always deleted");
        assert_eq!(remnant.geometry(), Rect::new(10, 20, 300, 200));
        assert_eq!(remnant.opacity(), 0.5);
        assert!(remnant.has_alpha());
        assert!(remnant.wants_shadow());
        assert!(!Fixed.is_deleted(), "the live window is not deleted");
    }
}
