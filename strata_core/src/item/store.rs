// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays item storage with allocation, topology, and geometry
//! management.

use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::dirty;
use crate::geometry::{Point, Rect, Size};
use crate::region::Region;

use super::id::{BufferId, INVALID, ItemId};
use super::traverse::Children;

/// Payload of a buffer-bearing item.
///
/// `shape` and `opaque` are in item-local coordinates. An item without a
/// buffer contributes no quads and no opaque area.
#[derive(Clone, Debug, Default)]
pub struct SurfaceData {
    /// The area of the item actually covered by content.
    pub shape: Region,
    /// The part of the shape guaranteed fully opaque.
    pub opaque: Region,
    /// The backing buffer, if one has been attached.
    pub buffer: Option<BufferSource>,
}

/// A content buffer together with the mapping from item-local coordinates
/// into buffer texture coordinates.
#[derive(Clone, Copy, Debug)]
pub struct BufferSource {
    /// Backend-assigned buffer handle.
    pub id: BufferId,
    /// Buffer size in device pixels.
    pub size: Size,
    /// Maps item-local coordinates to normalized buffer coordinates.
    pub to_buffer: kurbo::Affine,
}

/// What an item contributes to the scene.
///
/// A closed enum rather than trait objects: the set of item kinds a window is
/// assembled from is fixed, and the quad builders match on it directly.
#[derive(Clone, Debug, Default)]
pub enum ItemKind {
    /// Plain positioning node (e.g. a window root).
    #[default]
    Group,
    /// Buffer-bearing content node.
    Surface(SurfaceData),
    /// Marker node for server-side decoration geometry.
    Decoration,
    /// Marker node for drop-shadow geometry.
    Shadow,
}

/// Struct-of-arrays storage for one window's scene items.
///
/// Items are addressed by [`ItemId`] handles. Internally, each item occupies
/// a slot in parallel arrays. Destroyed items are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// # Repaint sequencing
///
/// Every footprint-changing mutation follows the same sequence: the old
/// bounding rectangle (in global coordinates) is added to the pending repaint
/// region, the change is applied, bounding rectangles are recomputed
/// bottom-up, the quad cache is invalidated, and the new footprint is added
/// to the pending repaints. The owner drains accumulated state through the
/// `take_*` methods once per frame.
#[derive(Debug)]
pub struct ItemTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    position: Vec<Point>,
    explicit_size: Vec<Option<Size>>,
    implicit_size: Vec<Size>,
    kind: Vec<ItemKind>,

    // -- Computed properties (written by flush_geometry) --
    bounding: Vec<Rect>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    free_list: Vec<u32>,
    len: u32,

    // -- Dirty tracking --
    dirty: DirtyTracker<u32>,

    // -- Drained by the owner --
    pending_repaints: Region,
    quads_dirty: bool,
}

impl Default for ItemTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemTree {
    /// Creates an empty item tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            position: Vec::new(),
            explicit_size: Vec::new(),
            implicit_size: Vec::new(),
            kind: Vec::new(),
            bounding: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_repaints: Region::new(),
            quads_dirty: false,
        }
    }

    // -- Allocation API --

    /// Creates a new item and returns its handle.
    ///
    /// The item starts at the origin with empty sizes and no parent.
    pub fn create_item(&mut self, kind: ItemKind) -> ItemId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            self.generation[idx as usize] += 1;
            self.parent[idx as usize] = INVALID;
            self.first_child[idx as usize] = INVALID;
            self.next_sibling[idx as usize] = INVALID;
            self.prev_sibling[idx as usize] = INVALID;
            self.position[idx as usize] = Point::ZERO;
            self.explicit_size[idx as usize] = None;
            self.implicit_size[idx as usize] = Size::default();
            self.kind[idx as usize] = kind;
            self.bounding[idx as usize] = Rect::default();
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.position.push(Point::ZERO);
            self.explicit_size.push(None);
            self.implicit_size.push(Size::default());
            self.kind.push(kind);
            self.bounding.push(Rect::default());
            self.generation.push(0);
            idx
        };

        ItemId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys an item together with its entire subtree.
    ///
    /// The parent exclusively owns its children, so destruction is always
    /// recursive. The subtree's old footprint is scheduled for repaint and
    /// the quad cache is invalidated.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_item(&mut self, id: ItemId) {
        self.validate(id);
        let idx = id.idx;

        self.repaint_footprint(idx);

        let parent = self.parent[idx as usize];
        if parent != INVALID {
            self.unlink_from_parent(idx);
            self.dirty.remove_dependency(parent, idx, dirty::GEOMETRY);
        }

        self.free_subtree(idx);

        if parent != INVALID {
            self.dirty.mark_with(parent, dirty::GEOMETRY, &EagerPolicy);
            self.flush_geometry();
            self.repaint_footprint(parent);
        }
        self.quads_dirty = true;
    }

    /// Returns whether the given handle refers to a live item.
    #[must_use]
    pub fn is_alive(&self, id: ItemId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: ItemId, child: ItemId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );

        self.link_last(p, c);

        // The parent's bounding rect depends on the child's.
        let _ = self.dirty.add_dependency(p, c, dirty::GEOMETRY);
        self.dirty.mark_with(c, dirty::GEOMETRY, &EagerPolicy);
        self.flush_geometry();
        self.repaint_footprint(c);
        self.quads_dirty = true;
    }

    /// Moves `child` to be the last child of `new_parent`.
    ///
    /// If `child` already has a parent, it is detached first; both the old
    /// and the new footprint are scheduled for repaint.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn reparent(&mut self, child: ItemId, new_parent: ItemId) {
        self.validate(child);
        self.validate(new_parent);
        let c = child.idx;
        let p = new_parent.idx;

        if self.parent[c as usize] != INVALID {
            self.repaint_footprint(c);
            let old_p = self.parent[c as usize];
            self.unlink_from_parent(c);
            self.dirty.remove_dependency(old_p, c, dirty::GEOMETRY);
            self.dirty.mark_with(old_p, dirty::GEOMETRY, &EagerPolicy);
        }

        self.link_last(p, c);
        let _ = self.dirty.add_dependency(p, c, dirty::GEOMETRY);
        self.dirty.mark_with(c, dirty::GEOMETRY, &EagerPolicy);
        self.flush_geometry();
        self.repaint_footprint(c);
        self.quads_dirty = true;
    }

    /// Returns the parent of an item, if any.
    #[must_use]
    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| ItemId {
            idx: p,
            generation: self.generation[p as usize],
        })
    }

    /// Returns an iterator over the direct children of an item, bottom to top.
    #[must_use]
    pub fn children(&self, id: ItemId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    // -- Stacking API --

    /// Moves `item` directly below `sibling` in their parent's child list.
    ///
    /// Children paint bottom to top, so "below" means earlier in the list.
    /// Returns `false` (and changes nothing) when the two items are not
    /// siblings of the same parent.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn stack_before(&mut self, item: ItemId, sibling: ItemId) -> bool {
        self.validate(item);
        self.validate(sibling);
        let c = item.idx;
        let s = sibling.idx;
        let p = self.parent[c as usize];
        if c == s || p == INVALID || self.parent[s as usize] != p {
            return false;
        }

        self.unlink_siblings_only(c);
        // Insert before `s`.
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];
        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;

        self.after_restack(p);
        true
    }

    /// Moves `item` directly above `sibling` in their parent's child list.
    ///
    /// Returns `false` (and changes nothing) when the two items are not
    /// siblings of the same parent.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn stack_after(&mut self, item: ItemId, sibling: ItemId) -> bool {
        self.validate(item);
        self.validate(sibling);
        let c = item.idx;
        let s = sibling.idx;
        let p = self.parent[c as usize];
        if c == s || p == INVALID || self.parent[s as usize] != p {
            return false;
        }

        self.unlink_siblings_only(c);
        // Insert after `s`.
        self.prev_sibling[c as usize] = s;
        self.next_sibling[c as usize] = self.next_sibling[s as usize];
        if self.next_sibling[s as usize] != INVALID {
            self.prev_sibling[self.next_sibling[s as usize] as usize] = c;
        }
        self.next_sibling[s as usize] = c;

        self.after_restack(p);
        true
    }

    /// Replaces the child order of `parent` with `order`.
    ///
    /// `order` must be a permutation of the current children; otherwise the
    /// call is rejected as a no-op and `false` is returned.
    ///
    /// # Panics
    ///
    /// Panics if `parent` or any entry of `order` is stale.
    pub fn stack_children(&mut self, parent: ItemId, order: &[ItemId]) -> bool {
        self.validate(parent);
        for &id in order {
            self.validate(id);
        }
        let p = parent.idx;

        // Permutation check: same count and every entry is a distinct
        // current child.
        let current: Vec<u32> = self.children(parent).map(|c| c.idx).collect();
        if current.len() != order.len() {
            return false;
        }
        for &id in order {
            if self.parent[id.idx as usize] != p {
                return false;
            }
        }
        for (i, &id) in order.iter().enumerate() {
            if order[..i].iter().any(|&prev| prev.idx == id.idx) {
                return false;
            }
        }

        // Rebuild the sibling links in the requested order.
        self.first_child[p as usize] = INVALID;
        let mut prev = INVALID;
        for &id in order {
            let c = id.idx;
            self.prev_sibling[c as usize] = prev;
            self.next_sibling[c as usize] = INVALID;
            if prev == INVALID {
                self.first_child[p as usize] = c;
            } else {
                self.next_sibling[prev as usize] = c;
            }
            prev = c;
        }

        self.after_restack(p);
        true
    }

    // -- Geometry API --

    /// Returns the position of an item relative to its parent.
    #[must_use]
    pub fn position(&self, id: ItemId) -> Point {
        self.validate(id);
        self.position[id.idx as usize]
    }

    /// Moves an item relative to its parent.
    ///
    /// Both the old and the new footprint are scheduled for repaint.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_position(&mut self, id: ItemId, position: Point) {
        self.validate(id);
        let idx = id.idx;
        if self.position[idx as usize] == position {
            return;
        }

        self.repaint_footprint(idx);
        self.position[idx as usize] = position;
        // Own bounding is position-independent, but every ancestor's changes.
        self.dirty.mark_with(idx, dirty::GEOMETRY, &EagerPolicy);
        self.flush_geometry();
        self.repaint_footprint(idx);
        self.quads_dirty = true;
    }

    /// Returns the effective size: explicit if set, implicit otherwise.
    #[must_use]
    pub fn size(&self, id: ItemId) -> Size {
        self.validate(id);
        self.size_at(id.idx)
    }

    /// Returns the item's own rectangle (origin plus effective size).
    #[must_use]
    pub fn rect(&self, id: ItemId) -> Rect {
        self.validate(id);
        Rect::from_size(self.size_at(id.idx))
    }

    /// Sets the explicit size, which overrides the implicit size.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_size(&mut self, id: ItemId, size: Size) {
        self.validate(id);
        let idx = id.idx;
        if self.explicit_size[idx as usize] == Some(size) {
            return;
        }
        self.repaint_footprint(idx);
        self.explicit_size[idx as usize] = Some(size);
        self.resized(idx);
    }

    /// Sets the implicit (content-derived) size.
    ///
    /// Takes effect only while no explicit size is set; the stored value is
    /// updated either way.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_implicit_size(&mut self, id: ItemId, size: Size) {
        self.validate(id);
        let idx = id.idx;
        if self.implicit_size[idx as usize] == size {
            return;
        }
        if self.explicit_size[idx as usize].is_some() {
            self.implicit_size[idx as usize] = size;
            return;
        }
        self.repaint_footprint(idx);
        self.implicit_size[idx as usize] = size;
        self.resized(idx);
    }

    /// Clears the explicit size, reverting to the implicit size.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn reset_size(&mut self, id: ItemId) {
        self.validate(id);
        let idx = id.idx;
        if self.explicit_size[idx as usize].is_none() {
            return;
        }
        self.repaint_footprint(idx);
        self.explicit_size[idx as usize] = None;
        self.resized(idx);
    }

    /// Returns the computed bounding rectangle: the item's own rectangle
    /// united with every child's bounding rectangle translated by the child's
    /// position.
    #[must_use]
    pub fn bounding_rect(&self, id: ItemId) -> Rect {
        self.validate(id);
        self.bounding[id.idx as usize]
    }

    // -- Coordinate mapping --

    /// Accumulated position of an item within its window: the sum of its own
    /// and every ancestor's position, excluding the root item's.
    ///
    /// The root item is positioned at the window's global position, so this
    /// yields window-local coordinates.
    #[must_use]
    pub fn window_position(&self, id: ItemId) -> Point {
        self.validate(id);
        let mut pos = Point::ZERO;
        let mut idx = id.idx;
        while self.parent[idx as usize] != INVALID {
            pos += self.position[idx as usize];
            idx = self.parent[idx as usize];
        }
        pos
    }

    /// Accumulated position of an item including the root item's position,
    /// yielding global coordinates.
    #[must_use]
    pub fn root_position(&self, id: ItemId) -> Point {
        self.validate(id);
        let mut pos = Point::ZERO;
        let mut idx = id.idx;
        loop {
            pos += self.position[idx as usize];
            let p = self.parent[idx as usize];
            if p == INVALID {
                return pos;
            }
            idx = p;
        }
    }

    /// Maps an item-local region to global coordinates.
    #[must_use]
    pub fn map_to_global(&self, id: ItemId, region: &Region) -> Region {
        let pos = self.root_position(id);
        region.translated(pos.x, pos.y)
    }

    // -- Kind access --

    /// Returns the item's kind payload.
    #[must_use]
    pub fn kind(&self, id: ItemId) -> &ItemKind {
        self.validate(id);
        &self.kind[id.idx as usize]
    }

    /// Returns the surface payload, or `None` for non-surface items.
    #[must_use]
    pub fn surface(&self, id: ItemId) -> Option<&SurfaceData> {
        self.validate(id);
        match &self.kind[id.idx as usize] {
            ItemKind::Surface(data) => Some(data),
            _ => None,
        }
    }

    /// Replaces a surface item's payload.
    ///
    /// Marks the content channel, invalidates the quad cache, and schedules a
    /// repaint of the item's rectangle.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the item is not a surface.
    pub fn set_surface(&mut self, id: ItemId, data: SurfaceData) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            matches!(self.kind[idx as usize], ItemKind::Surface(_)),
            "set_surface on non-surface item"
        );
        self.kind[idx as usize] = ItemKind::Surface(data);
        self.dirty.mark(idx, dirty::CONTENT);
        self.quads_dirty = true;
        let rect = Region::from_rect(Rect::from_size(self.size_at(idx)));
        self.schedule_repaint_global(idx, &rect);
    }

    /// Records that a surface item's buffer contents changed.
    ///
    /// `damage` is in item-local coordinates; it is clipped to the item's
    /// rectangle, scheduled for repaint, and the item is queued for a buffer
    /// re-pull on the next frame.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the item is not a surface.
    pub fn mark_content(&mut self, id: ItemId, damage: &Region) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            matches!(self.kind[idx as usize], ItemKind::Surface(_)),
            "mark_content on non-surface item"
        );
        let mut damage = damage.clone();
        damage.intersect_rect(Rect::from_size(self.size_at(idx)));
        self.schedule_repaint_global(idx, &damage);
        self.dirty.mark(idx, dirty::CONTENT);
    }

    /// Schedules an explicit repaint of an item-local region.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn schedule_repaint(&mut self, id: ItemId, region: &Region) {
        self.validate(id);
        self.schedule_repaint_global(id.idx, region);
    }

    // -- Drained state --

    /// Takes the repaint region accumulated since the last call, in global
    /// coordinates.
    pub fn take_pending_repaints(&mut self) -> Region {
        core::mem::take(&mut self.pending_repaints)
    }

    /// Returns whether any mutation since the last call invalidated cached
    /// quads, clearing the flag.
    pub fn take_quads_dirty(&mut self) -> bool {
        core::mem::replace(&mut self.quads_dirty, false)
    }

    /// Drains the surface items whose buffer contents changed since the last
    /// call.
    pub fn take_content_changes(&mut self) -> Vec<u32> {
        self.dirty
            .drain(dirty::CONTENT)
            .deterministic()
            .run()
            .collect()
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    fn validate(&self, id: ItemId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale ItemId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn size_at(&self, idx: u32) -> Size {
        self.explicit_size[idx as usize].unwrap_or(self.implicit_size[idx as usize])
    }

    /// Adds the current bounding rect of `idx`, in global coordinates, to the
    /// pending repaints.
    fn repaint_footprint(&mut self, idx: u32) {
        let bounds = Region::from_rect(self.bounding[idx as usize]);
        self.schedule_repaint_global(idx, &bounds);
    }

    /// Translates an item-local region to global coordinates and records it.
    fn schedule_repaint_global(&mut self, idx: u32, region: &Region) {
        if region.is_empty() {
            return;
        }
        let mut pos = Point::ZERO;
        let mut cur = idx;
        loop {
            pos += self.position[cur as usize];
            let p = self.parent[cur as usize];
            if p == INVALID {
                break;
            }
            cur = p;
        }
        self.pending_repaints.union(&region.translated(pos.x, pos.y));
    }

    /// Shared tail of the size mutators: propagate geometry dirt, recompute,
    /// repaint the new footprint, and invalidate quads.
    fn resized(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::GEOMETRY, &EagerPolicy);
        self.flush_geometry();
        self.repaint_footprint(idx);
        self.quads_dirty = true;
    }

    /// Recomputes bounding rectangles for every geometry-dirty item.
    ///
    /// The GEOMETRY channel's dependency edges run parent→child, so draining
    /// in dependency order yields children before their ancestors, which is
    /// exactly the bottom-up order the recomputation needs.
    fn flush_geometry(&mut self) {
        let dirty_items: Vec<u32> = self
            .dirty
            .drain(dirty::GEOMETRY)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_items {
            if self.free_list.contains(&idx) {
                continue;
            }
            let mut bounds = Rect::from_size(self.size_at(idx));
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                let pos = self.position[child as usize];
                bounds = bounds.united(self.bounding[child as usize].translated(pos.x, pos.y));
                child = self.next_sibling[child as usize];
            }
            self.bounding[idx as usize] = bounds;
        }
    }

    /// Appends `c` to `p`'s child list.
    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        self.unlink_siblings_only(idx);
        self.parent[idx as usize] = INVALID;
    }

    /// Detaches `idx` from the sibling chain, leaving its parent field intact.
    fn unlink_siblings_only(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else if p != INVALID {
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Shared tail of the restack operations: paint order changed, so the
    /// parent's footprint must repaint and cached quads are stale.
    fn after_restack(&mut self, parent_idx: u32) {
        self.repaint_footprint(parent_idx);
        self.quads_dirty = true;
    }

    /// Frees `idx` and its whole subtree, bumping generations.
    fn free_subtree(&mut self, idx: u32) {
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            let next = self.next_sibling[child as usize];
            self.dirty.remove_dependency(idx, child, dirty::GEOMETRY);
            self.free_subtree(child);
            child = next;
        }
        self.dirty.remove_key(idx);
        self.generation[idx as usize] += 1;
        self.parent[idx as usize] = INVALID;
        self.first_child[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.kind[idx as usize] = ItemKind::Group;
        self.free_list.push(idx);
    }
}
