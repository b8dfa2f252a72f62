// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display output identification and geometry.
//!
//! [`OutputId`] is a lightweight handle identifying a specific display.
//! Backends assign these; core treats them as opaque. [`Output`] pairs the
//! handle with the output's rectangle in global compositor coordinates.

use core::fmt;

use crate::geometry::Rect;

/// Identifies a specific display output.
///
/// Backends assign output IDs to distinguish multiple displays. Core code
/// passes them through without interpreting the value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct OutputId(pub u32);

impl fmt::Debug for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutputId({})", self.0)
    }
}

/// A display output and its placement in global coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Output {
    /// Backend-assigned identity.
    pub id: OutputId,
    /// The output's rectangle in global compositor coordinates.
    pub geometry: Rect,
}

impl Output {
    /// Creates an output description.
    #[must_use]
    pub const fn new(id: OutputId, geometry: Rect) -> Self {
        Self { id, geometry }
    }
}
