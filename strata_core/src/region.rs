// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel regions: sets of non-overlapping rectangles with boolean set
//! operations.
//!
//! All damage, repaint, and visibility bookkeeping in strata is expressed in
//! [`Region`]. The representation is a flat list of pairwise-disjoint
//! rectangles; operations preserve that invariant by splitting incoming
//! rectangles against the existing ones.
//!
//! Equality is *area* equality: two regions compare equal when they cover
//! exactly the same pixels, regardless of how they were assembled. The
//! orchestrator relies on this for its full-repaint fast path
//! (`dirty_area == display`), so `PartialEq` is implemented as an empty
//! symmetric difference rather than a representation comparison.

use alloc::vec;
use alloc::vec::Vec;

use crate::geometry::{Point, Rect};

/// A set of non-overlapping axis-aligned rectangles.
#[derive(Clone, Debug, Default)]
pub struct Region {
    rects: Vec<Rect>,
}

/// Splits `a` against `b`, pushing the up-to-four pieces of `a - b` onto `out`.
fn split_rect(a: Rect, b: Rect, out: &mut Vec<Rect>) {
    if !a.intersects(b) {
        out.push(a);
        return;
    }
    // Top strip.
    if b.y > a.y {
        out.push(Rect::new(a.x, a.y, a.width, b.y - a.y));
    }
    // Bottom strip.
    if b.bottom() < a.bottom() {
        out.push(Rect::new(a.x, b.bottom(), a.width, a.bottom() - b.bottom()));
    }
    let mid_y = a.y.max(b.y);
    let mid_h = a.bottom().min(b.bottom()) - mid_y;
    // Left strip.
    if b.x > a.x {
        out.push(Rect::new(a.x, mid_y, b.x - a.x, mid_h));
    }
    // Right strip.
    if b.right() < a.right() {
        out.push(Rect::new(b.right(), mid_y, a.right() - b.right(), mid_h));
    }
}

impl Region {
    /// Creates an empty region.
    #[must_use]
    pub const fn new() -> Self {
        Self { rects: Vec::new() }
    }

    /// Creates a region covering a single rectangle.
    ///
    /// An empty rectangle yields an empty region.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        if rect.is_empty() {
            Self::new()
        } else {
            Self { rects: vec![rect] }
        }
    }

    /// The conventional "whole plane" region.
    ///
    /// Used for unallocated repaint buckets and no-clip paint passes. It is an
    /// ordinary region covering [`Rect::INFINITE`]; intersecting it with a
    /// display rectangle produces that rectangle.
    #[must_use]
    pub fn infinite() -> Self {
        Self::from_rect(Rect::INFINITE)
    }

    /// Returns whether this region covers no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// The disjoint rectangles making up this region.
    #[must_use]
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// The smallest rectangle enclosing the whole region.
    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        let mut bounds = Rect::default();
        for &r in &self.rects {
            bounds = bounds.united(r);
        }
        bounds
    }

    /// Adds a rectangle to the region.
    pub fn union_rect(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        // Split the incoming rect against every existing rect; only the parts
        // not already covered are appended.
        let mut pending = vec![rect];
        for &existing in &self.rects {
            if pending.is_empty() {
                return;
            }
            let mut next = Vec::with_capacity(pending.len());
            for piece in pending {
                split_rect(piece, existing, &mut next);
            }
            pending = next;
        }
        self.rects.extend(pending);
    }

    /// Adds every rectangle of `other` to the region.
    pub fn union(&mut self, other: &Self) {
        for &r in &other.rects {
            self.union_rect(r);
        }
    }

    /// Returns `self ∪ other`.
    #[must_use]
    pub fn united(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.union(other);
        out
    }

    /// Removes every pixel of `other` from the region.
    pub fn subtract(&mut self, other: &Self) {
        for &r in &other.rects {
            self.subtract_rect(r);
        }
    }

    /// Removes a rectangle from the region.
    pub fn subtract_rect(&mut self, rect: Rect) {
        if rect.is_empty() || self.rects.is_empty() {
            return;
        }
        let mut out = Vec::with_capacity(self.rects.len());
        for &r in &self.rects {
            split_rect(r, rect, &mut out);
        }
        self.rects = out;
    }

    /// Returns `self − other`.
    #[must_use]
    pub fn subtracted(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.subtract(other);
        out
    }

    /// Restricts the region to `rect`.
    pub fn intersect_rect(&mut self, rect: Rect) {
        if rect.is_empty() {
            self.rects.clear();
            return;
        }
        self.rects.retain_mut(|r| {
            *r = r.intersected(rect);
            !r.is_empty()
        });
    }

    /// Restricts the region to `other`.
    pub fn intersect(&mut self, other: &Self) {
        let mut out = Vec::new();
        for &a in &self.rects {
            for &b in &other.rects {
                let i = a.intersected(b);
                if !i.is_empty() {
                    out.push(i);
                }
            }
        }
        // Pieces of `self` are disjoint, so their intersections with the
        // disjoint pieces of `other` are disjoint too.
        self.rects = out;
    }

    /// Returns `self ∩ other`.
    #[must_use]
    pub fn intersected(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.intersect(other);
        out
    }

    /// Returns the region moved by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            rects: self.rects.iter().map(|r| r.translated(dx, dy)).collect(),
        }
    }

    /// Returns whether the region covers the given pixel.
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        self.rects.iter().any(|r| r.contains_point(p))
    }

    /// Returns whether the region covers every pixel of `rect`.
    #[must_use]
    pub fn contains_rect(&self, rect: Rect) -> bool {
        Self::from_rect(rect).subtracted(self).is_empty()
    }

    /// Returns whether the region covers every pixel of `other`.
    #[must_use]
    pub fn contains_region(&self, other: &Self) -> bool {
        other.subtracted(self).is_empty()
    }

    /// Returns whether the two regions share any pixel.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.rects
            .iter()
            .any(|&a| other.rects.iter().any(|&b| a.intersects(b)))
    }

    /// Returns whether the region shares any pixel with `rect`.
    #[must_use]
    pub fn intersects_rect(&self, rect: Rect) -> bool {
        self.rects.iter().any(|&a| a.intersects(rect))
    }
}

impl PartialEq for Region {
    /// Area equality: both symmetric-difference halves are empty.
    fn eq(&self, other: &Self) -> bool {
        self.subtracted(other).is_empty() && other.subtracted(self).is_empty()
    }
}

impl Eq for Region {}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_is_disjoint() {
        let mut region = Region::new();
        region.union_rect(Rect::new(0, 0, 10, 10));
        region.union_rect(Rect::new(5, 5, 10, 10));

        let mut area = 0;
        for r in region.rects() {
            area += r.width * r.height;
            for s in region.rects() {
                if r as *const _ != s as *const _ {
                    assert!(!r.intersects(*s), "rects must stay disjoint");
                }
            }
        }
        assert_eq!(area, 100 + 100 - 25);
    }

    #[test]
    fn equality_is_area_based() {
        let mut a = Region::new();
        a.union_rect(Rect::new(0, 0, 10, 5));
        a.union_rect(Rect::new(0, 5, 10, 5));

        let b = Region::from_rect(Rect::new(0, 0, 10, 10));
        assert_eq!(a, b);
        assert_ne!(a, Region::from_rect(Rect::new(0, 0, 10, 9)));
    }

    #[test]
    fn subtract_splits_rects() {
        let mut region = Region::from_rect(Rect::new(0, 0, 10, 10));
        region.subtract_rect(Rect::new(2, 2, 6, 6));

        assert!(!region.contains_point(Point::new(5, 5)));
        assert!(region.contains_point(Point::new(0, 0)));
        assert!(region.contains_point(Point::new(9, 9)));

        let mut area = 0;
        for r in region.rects() {
            area += r.width * r.height;
        }
        assert_eq!(area, 100 - 36);
    }

    #[test]
    fn subtract_everything_is_empty() {
        let mut region = Region::from_rect(Rect::new(3, 3, 4, 4));
        region.subtract_rect(Rect::new(0, 0, 100, 100));
        assert!(region.is_empty());
    }

    #[test]
    fn intersect_clips() {
        let mut region = Region::new();
        region.union_rect(Rect::new(0, 0, 10, 10));
        region.union_rect(Rect::new(20, 0, 10, 10));
        region.intersect_rect(Rect::new(5, 0, 20, 10));

        assert_eq!(region, {
            let mut expected = Region::from_rect(Rect::new(5, 0, 5, 10));
            expected.union_rect(Rect::new(20, 0, 5, 10));
            expected
        });
    }

    #[test]
    fn infinite_clips_to_display() {
        let display = Rect::new(0, 0, 1920, 1080);
        let mut region = Region::infinite();
        region.intersect_rect(display);
        assert_eq!(region, Region::from_rect(display));
    }

    #[test]
    fn containment() {
        let mut region = Region::from_rect(Rect::new(0, 0, 10, 10));
        region.union_rect(Rect::new(10, 0, 10, 10));
        assert!(region.contains_rect(Rect::new(5, 0, 10, 10)));
        assert!(!region.contains_rect(Rect::new(5, 5, 10, 10)));
        assert!(region.contains_region(&Region::from_rect(Rect::new(0, 0, 20, 10))));
    }

    #[test]
    fn translation_moves_every_rect() {
        let mut region = Region::from_rect(Rect::new(0, 0, 5, 5));
        region.union_rect(Rect::new(10, 10, 5, 5));
        let moved = region.translated(3, -2);
        assert!(moved.contains_point(Point::new(3, -2)));
        assert!(moved.contains_point(Point::new(13, 8)));
        assert!(!moved.contains_point(Point::new(0, 0)));
    }

    #[test]
    fn intersects_requires_shared_pixels() {
        let a = Region::from_rect(Rect::new(0, 0, 10, 10));
        let b = Region::from_rect(Rect::new(10, 10, 10, 10));
        assert!(!a.intersects(&b), "corner-adjacent regions share no pixel");
        assert!(a.intersects_rect(Rect::new(9, 9, 2, 2)));
    }
}
