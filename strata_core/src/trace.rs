// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the paint loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! frame orchestrator calls at each stage. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing (zero
//! overhead). When **on**, each method performs a single `Option` branch
//! before dispatching.
//!
//! Soft failures that the API reports as rejected no-ops (bad restacks,
//! stale repaint buckets, thumbnail recursion) are additionally surfaced as
//! [`Warning`] events so they are visible in traces.

use crate::output::OutputId;
use crate::window::WindowId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of the paint loop is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Screen and window pre-paint (effect negotiation, occlusion setup).
    PrePaint,
    /// The paint pass itself (background and window draws).
    Paint,
    /// Post-paint notifications (future-damage scheduling).
    PostPaint,
}

/// A recoverable protocol violation that was handled as a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Warning {
    /// A restack request was not a permutation of the current children.
    BadRestack,
    /// A repaint arrived before the repaint buckets were resized to the
    /// current output count and was dropped.
    StaleRepaintBucket,
    /// A thumbnail would have recursively embedded the window being painted.
    ThumbnailRecursion,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when painting of an output's frame starts.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Which output this frame targets.
    pub output: OutputId,
    /// The backend-reported buffer age, if queried.
    pub buffer_age: Option<u8>,
}

/// Emitted when painting of an output's frame finished.
#[derive(Clone, Copy, Debug)]
pub struct FrameEndEvent {
    /// Which output this frame targeted.
    pub output: OutputId,
    /// Number of rectangles in the frame's damaged region.
    pub damage_rects: usize,
}

/// Marks the beginning of a paint-loop phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Which output.
    pub output: OutputId,
    /// Which phase is starting.
    pub phase: PhaseKind,
}

/// Marks the end of a paint-loop phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Which output.
    pub output: OutputId,
    /// Which phase is ending.
    pub phase: PhaseKind,
}

/// Emitted for every window draw that reaches the backend.
#[derive(Clone, Copy, Debug)]
pub struct WindowPaintEvent {
    /// Which window was drawn.
    pub window: WindowId,
    /// The raw paint mask bits in effect for the draw.
    pub mask: u32,
    /// Number of rectangles in the clip region.
    pub clip_rects: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the paint loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when painting of a frame starts.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called when painting of a frame finished.
    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        _ = e;
    }

    /// Called at the beginning of a paint-loop phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a paint-loop phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called for every window draw that reaches the backend.
    fn on_window_paint(&mut self, e: &WindowPaintEvent) {
        _ = e;
    }

    /// Called when a protocol violation was handled as a no-op.
    fn on_warning(&mut self, w: Warning) {
        _ = w;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameEndEvent`].
    #[inline]
    pub fn frame_end(&mut self, e: &FrameEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`WindowPaintEvent`].
    #[inline]
    pub fn window_paint(&mut self, e: &WindowPaintEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_window_paint(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`Warning`].
    #[inline]
    pub fn warning(&mut self, w: Warning) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_warning(w);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = w;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_frame_begin(&FrameBeginEvent {
            output: OutputId(0),
            buffer_age: Some(2),
        });
        sink.on_warning(Warning::BadRestack);
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.frame_begin(&FrameBeginEvent {
            output: OutputId(0),
            buffer_age: None,
        });
        tracer.warning(Warning::StaleRepaintBucket);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            warnings: Vec<Warning>,
        }
        impl TraceSink for RecordingSink {
            fn on_warning(&mut self, w: Warning) {
                self.warnings.push(w);
            }
        }

        let mut sink = RecordingSink {
            warnings: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.warning(Warning::ThumbnailRecursion);
        drop(tracer);
        assert_eq!(sink.warnings, &[Warning::ThumbnailRecursion]);
    }
}
