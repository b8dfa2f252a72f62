// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window quads: textured rectangles in window-local coordinates.
//!
//! Quads are the unit of geometry handed to effects and the backend. Effects
//! may translate, scale, or subdivide them; the backend flattens whatever
//! survives into a GPU vertex stream. Positions are window-local `f64`
//! ([`kurbo::Point`]); texture coordinates live in the space of whichever
//! texture the quad's role samples from.

use alloc::vec::Vec;

use bytemuck::{Pod, Zeroable};
use strata_core::geometry::Rect;
use strata_core::item::{ItemId, ItemKind, ItemTree};
use strata_core::region::Region;

/// Which texture a quad samples from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuadRole {
    /// Window content (a surface item's buffer).
    Contents,
    /// The decoration atlas.
    Decoration,
    /// The shadow texture.
    Shadow,
    /// Added by an effect; the effect owns the texture binding.
    Effect,
}

/// One corner of a quad.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    /// Window-local position.
    pub position: kurbo::Point,
    /// Texture coordinate.
    pub uv: kurbo::Point,
}

impl Vertex {
    /// Creates a vertex.
    #[must_use]
    pub const fn new(position: kurbo::Point, uv: kurbo::Point) -> Self {
        Self { position, uv }
    }
}

/// A textured rectangle: four corners in top-left, top-right, bottom-right,
/// bottom-left order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    /// Corner vertices.
    pub vertices: [Vertex; 4],
    /// Which texture the quad samples.
    pub role: QuadRole,
    /// Stable key matching the quad to its source surface node, or −1 when
    /// unkeyed. Not unique for shaped surfaces; all quads cut from one
    /// node's shape share the node's id.
    pub id: i32,
    /// Whether the texture axes are swapped (vertical decoration strips).
    pub uv_swapped: bool,
}

impl Quad {
    /// Returns whether the corners still form an axis-aligned rectangle in
    /// the canonical corner order.
    #[must_use]
    pub fn is_axis_aligned(&self) -> bool {
        let [tl, tr, br, bl] = &self.vertices;
        tl.position.y == tr.position.y
            && bl.position.y == br.position.y
            && tl.position.x == bl.position.x
            && tr.position.x == br.position.x
    }

    /// The smallest rectangle containing all four corners.
    #[must_use]
    pub fn bounds(&self) -> kurbo::Rect {
        let mut x0 = f64::INFINITY;
        let mut y0 = f64::INFINITY;
        let mut x1 = f64::NEG_INFINITY;
        let mut y1 = f64::NEG_INFINITY;
        for v in &self.vertices {
            x0 = x0.min(v.position.x);
            y0 = y0.min(v.position.y);
            x1 = x1.max(v.position.x);
            y1 = y1.max(v.position.y);
        }
        kurbo::Rect::new(x0, y0, x1, y1)
    }
}

/// Flat vertex layout for GPU upload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct GpuVertex {
    /// Window-local position.
    pub position: [f32; 2],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

/// An ordered list of quads for one window.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuadList {
    quads: Vec<Quad>,
}

impl QuadList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { quads: Vec::new() }
    }

    /// The quads, in paint order.
    #[must_use]
    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    /// Appends a quad.
    pub fn push(&mut self, quad: Quad) {
        self.quads.push(quad);
    }

    /// Appends every quad of `other`.
    pub fn append(&mut self, other: &Self) {
        self.quads.extend_from_slice(&other.quads);
    }

    /// Number of quads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    /// Returns whether the list holds no quads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Returns whether any quad no longer forms an axis-aligned rectangle.
    #[must_use]
    pub fn is_transformed(&self) -> bool {
        self.quads.iter().any(|q| !q.is_axis_aligned())
    }

    /// The smallest rectangle containing every quad.
    #[must_use]
    pub fn bounds(&self) -> kurbo::Rect {
        let mut iter = self.quads.iter();
        let Some(first) = iter.next() else {
            return kurbo::Rect::ZERO;
        };
        iter.fold(first.bounds(), |acc, q| acc.union(q.bounds()))
    }

    /// Flattens the list into a vertex stream, two triangles per quad.
    pub fn write_vertices(&self, out: &mut Vec<GpuVertex>) {
        out.reserve(self.quads.len() * 6);
        for quad in &self.quads {
            let v: [GpuVertex; 4] = core::array::from_fn(|i| {
                let vertex = quad.vertices[i];
                #[expect(clippy::cast_possible_truncation, reason = "f32 GPU layout")]
                let gpu = GpuVertex {
                    position: [vertex.position.x as f32, vertex.position.y as f32],
                    uv: [vertex.uv.x as f32, vertex.uv.y as f32],
                };
                gpu
            });
            out.extend_from_slice(&[v[0], v[1], v[2], v[2], v[3], v[0]]);
        }
    }
}

impl FromIterator<Quad> for QuadList {
    fn from_iter<T: IntoIterator<Item = Quad>>(iter: T) -> Self {
        Self {
            quads: iter.into_iter().collect(),
        }
    }
}

/// Builds the content quads for a window's item tree.
///
/// Surface items are visited depth-first with an explicit stack (children
/// pushed in reverse so the first child is processed first). Each visited
/// surface node gets the next monotonically increasing id, shared by every
/// quad cut from its shape. Positions are the shape rectangle's corners
/// offset to window-local coordinates; texture coordinates come from the
/// node's buffer transform. Surfaces without a buffer contribute nothing.
#[must_use]
pub fn build_contents_quads(tree: &ItemTree, from: ItemId) -> QuadList {
    let mut quads = QuadList::new();
    let mut next_id = 0_i32;

    let mut stack = alloc::vec![from];
    while let Some(item) = stack.pop() {
        if let ItemKind::Surface(surface) = tree.kind(item) {
            let quad_id = next_id;
            next_id += 1;

            if let Some(buffer) = &surface.buffer {
                let offset = tree.window_position(item);
                for &rect in surface.shape.rects() {
                    let corners = [
                        kurbo::Point::new(f64::from(rect.x), f64::from(rect.y)),
                        kurbo::Point::new(f64::from(rect.right()), f64::from(rect.y)),
                        kurbo::Point::new(f64::from(rect.right()), f64::from(rect.bottom())),
                        kurbo::Point::new(f64::from(rect.x), f64::from(rect.bottom())),
                    ];
                    let vertices = corners.map(|corner| {
                        Vertex::new(
                            kurbo::Point::new(
                                corner.x + f64::from(offset.x),
                                corner.y + f64::from(offset.y),
                            ),
                            buffer.to_buffer * corner,
                        )
                    });
                    quads.push(Quad {
                        vertices,
                        role: QuadRole::Contents,
                        id: quad_id,
                        uv_swapped: false,
                    });
                }
            }
        }

        let children: Vec<ItemId> = tree.children(item).collect();
        for &child in children.iter().rev() {
            stack.push(child);
        }
    }

    quads
}

/// Builds the decoration quads for the four border strips.
///
/// The decoration texture is a single atlas holding the four strips with a
/// one-pixel gutter between sprites: top first, bottom below it, then the
/// left and right strips stored rotated a quarter turn (their texture axes
/// swapped). `rects` are the left, top, right, and bottom borders in
/// window-local coordinates; `region` is the decoration shape the strips are
/// clipped against; `texture_scale` converts logical to texture pixels.
#[must_use]
pub fn build_decoration_quads(rects: &[Rect; 4], region: &Region, texture_scale: f64) -> QuadList {
    let mut quads = QuadList::new();
    let padding = 1;

    let top_sprite = (padding, padding);
    let bottom_sprite = (padding, top_sprite.1 + rects[1].height + 2 * padding);
    let left_sprite = (bottom_sprite.1 + rects[3].height + 2 * padding, padding);
    let right_sprite = (left_sprite.0 + rects[0].width + 2 * padding, padding);

    let offsets = [
        (-rects[0].x + left_sprite.0, -rects[0].y + left_sprite.1),
        (-rects[1].x + top_sprite.0, -rects[1].y + top_sprite.1),
        (-rects[2].x + right_sprite.0, -rects[2].y + right_sprite.1),
        (-rects[3].x + bottom_sprite.0, -rects[3].y + bottom_sprite.1),
    ];
    // Left and right strips are stored rotated: their texture axes swap.
    let swapped = [true, false, true, false];

    for i in 0..4 {
        let mut strip = region.clone();
        strip.intersect_rect(rects[i]);
        for &r in strip.rects() {
            let (x0, y0) = (f64::from(r.x), f64::from(r.y));
            let (x1, y1) = (f64::from(r.right()), f64::from(r.bottom()));

            let u0 = f64::from(r.x + offsets[i].0) * texture_scale;
            let v0 = f64::from(r.y + offsets[i].1) * texture_scale;
            let u1 = f64::from(r.right() + offsets[i].0) * texture_scale;
            let v1 = f64::from(r.bottom() + offsets[i].1) * texture_scale;

            let vertices = if swapped[i] {
                [
                    Vertex::new(kurbo::Point::new(x0, y0), kurbo::Point::new(v0, u0)),
                    Vertex::new(kurbo::Point::new(x1, y0), kurbo::Point::new(v0, u1)),
                    Vertex::new(kurbo::Point::new(x1, y1), kurbo::Point::new(v1, u1)),
                    Vertex::new(kurbo::Point::new(x0, y1), kurbo::Point::new(v1, u0)),
                ]
            } else {
                [
                    Vertex::new(kurbo::Point::new(x0, y0), kurbo::Point::new(u0, v0)),
                    Vertex::new(kurbo::Point::new(x1, y0), kurbo::Point::new(u1, v0)),
                    Vertex::new(kurbo::Point::new(x1, y1), kurbo::Point::new(u1, v1)),
                    Vertex::new(kurbo::Point::new(x0, y1), kurbo::Point::new(u0, v1)),
                ]
            };
            quads.push(Quad {
                vertices,
                role: QuadRole::Decoration,
                id: -1,
                uv_swapped: swapped[i],
            });
        }
    }

    quads
}

#[cfg(test)]
mod tests {
    use strata_core::geometry::{Point, Size};
    use strata_core::item::{BufferId, BufferSource, SurfaceData};

    use super::*;

    fn surface_tree() -> (ItemTree, ItemId) {
        let mut tree = ItemTree::new();
        let root = tree.create_item(ItemKind::Group);
        (tree, root)
    }

    fn buffer(size: Size) -> BufferSource {
        BufferSource {
            id: BufferId(1),
            size,
            to_buffer: kurbo::Affine::scale(1.0 / f64::from(size.width)),
        }
    }

    fn surface(tree: &mut ItemTree, parent: ItemId, rect: Rect, with_buffer: bool) -> ItemId {
        let size = rect.size();
        let item = tree.create_item(ItemKind::Surface(SurfaceData {
            shape: Region::from_rect(Rect::from_size(size)),
            opaque: Region::new(),
            buffer: with_buffer.then(|| buffer(size)),
        }));
        tree.add_child(parent, item);
        tree.set_position(item, rect.position());
        tree.set_size(item, size);
        item
    }

    #[test]
    fn contents_quads_follow_depth_first_order() {
        let (mut tree, root) = surface_tree();
        let a = surface(&mut tree, root, Rect::new(0, 0, 100, 100), true);
        let a1 = surface(&mut tree, a, Rect::new(10, 10, 20, 20), true);
        let b = surface(&mut tree, root, Rect::new(200, 0, 50, 50), true);

        let quads = build_contents_quads(&tree, root);
        assert_eq!(quads.len(), 3);
        // DFS visits a, then a's child, then b; ids count visits.
        assert_eq!(quads.quads()[0].id, 0);
        assert_eq!(quads.quads()[1].id, 1);
        assert_eq!(quads.quads()[2].id, 2);

        // Positions are window-local: the nested child is offset by its
        // parent chain.
        assert_eq!(
            quads.quads()[1].vertices[0].position,
            kurbo::Point::new(10.0, 10.0)
        );
        assert_eq!(
            quads.quads()[2].vertices[0].position,
            kurbo::Point::new(200.0, 0.0)
        );
        let _ = (a1, b);
    }

    #[test]
    fn shaped_surface_shares_one_id() {
        let (mut tree, root) = surface_tree();
        let item = surface(&mut tree, root, Rect::new(0, 0, 100, 100), true);
        let mut shape = Region::from_rect(Rect::new(0, 0, 100, 40));
        shape.union_rect(Rect::new(0, 60, 100, 40));
        let mut data = tree.surface(item).expect("surface item").clone();
        data.shape = shape;
        tree.set_surface(item, data);

        let quads = build_contents_quads(&tree, root);
        assert_eq!(quads.len(), 2);
        assert_eq!(
            quads.quads()[0].id,
            quads.quads()[1].id,
            "all quads cut from one shape share the node id"
        );
    }

    #[test]
    fn surfaces_without_buffer_contribute_nothing() {
        let (mut tree, root) = surface_tree();
        let _bare = surface(&mut tree, root, Rect::new(0, 0, 100, 100), false);
        let quads = build_contents_quads(&tree, root);
        assert!(quads.is_empty());
    }

    #[test]
    fn rebuild_is_idempotent() {
        let (mut tree, root) = surface_tree();
        let a = surface(&mut tree, root, Rect::new(0, 0, 100, 100), true);
        let _a1 = surface(&mut tree, a, Rect::new(5, 5, 10, 10), true);

        let first = build_contents_quads(&tree, root);
        let second = build_contents_quads(&tree, root);
        assert_eq!(first, second);
    }

    #[test]
    fn decoration_atlas_offsets() {
        // A 100x80 window with 10px borders; the side strips sit between the
        // full-width top and bottom strips.
        let rects = [
            Rect::new(0, 10, 10, 60),  // left
            Rect::new(0, 0, 100, 10),  // top
            Rect::new(90, 10, 10, 60), // right
            Rect::new(0, 70, 100, 10), // bottom
        ];
        let mut region = Region::from_rect(Rect::new(0, 0, 100, 80));
        region.subtract_rect(Rect::new(10, 10, 80, 60));

        let quads = build_decoration_quads(&rects, &region, 1.0);
        assert_eq!(quads.len(), 4);

        // Atlas layout: top at (1,1), bottom at (1, 13), left at (25, 1),
        // right at (37, 1).
        let top = &quads.quads()[1];
        assert!(!top.uv_swapped);
        assert_eq!(top.vertices[0].uv, kurbo::Point::new(1.0, 1.0));
        assert_eq!(top.vertices[2].uv, kurbo::Point::new(101.0, 11.0));

        let bottom = &quads.quads()[3];
        assert_eq!(bottom.vertices[0].uv, kurbo::Point::new(1.0, 13.0));

        // Vertical strips sample with swapped axes: uv = (v, u).
        let left = &quads.quads()[0];
        assert!(left.uv_swapped);
        assert_eq!(left.vertices[0].uv, kurbo::Point::new(1.0, 25.0));

        let right = &quads.quads()[2];
        assert!(right.uv_swapped);
        assert_eq!(right.vertices[0].uv, kurbo::Point::new(1.0, 37.0));
    }

    #[test]
    fn decoration_quads_clip_to_region() {
        let rects = [
            Rect::new(0, 10, 10, 60),
            Rect::new(0, 0, 100, 10),
            Rect::new(90, 10, 10, 60),
            Rect::new(0, 70, 100, 10),
        ];
        // Only the top border is present in the shape.
        let region = Region::from_rect(Rect::new(0, 0, 100, 10));
        let quads = build_decoration_quads(&rects, &region, 1.0);
        assert_eq!(quads.len(), 1);
        for quad in quads.quads() {
            assert!(quad.bounds().y1 <= 10.0, "quads must clip to the region");
        }
    }

    #[test]
    fn vertex_stream_layout() {
        let (mut tree, root) = surface_tree();
        let _a = surface(&mut tree, root, Rect::new(0, 0, 64, 64), true);
        let quads = build_contents_quads(&tree, root);

        let mut vertices = Vec::new();
        quads.write_vertices(&mut vertices);
        assert_eq!(vertices.len(), 6, "two triangles per quad");
        assert_eq!(core::mem::size_of::<GpuVertex>(), 16);

        // Pod round-trip through raw bytes.
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), vertices.len() * 16);
    }

    #[test]
    fn transformed_detection() {
        let mut quad = Quad {
            vertices: [
                Vertex::new(kurbo::Point::new(0.0, 0.0), kurbo::Point::ZERO),
                Vertex::new(kurbo::Point::new(10.0, 0.0), kurbo::Point::ZERO),
                Vertex::new(kurbo::Point::new(10.0, 10.0), kurbo::Point::ZERO),
                Vertex::new(kurbo::Point::new(0.0, 10.0), kurbo::Point::ZERO),
            ],
            role: QuadRole::Contents,
            id: -1,
            uv_swapped: false,
        };
        let mut list = QuadList::new();
        list.push(quad);
        assert!(!list.is_transformed());

        quad.vertices[0].position.x = 3.0;
        list.push(quad);
        assert!(list.is_transformed());
    }
}
