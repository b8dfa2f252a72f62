// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, ItemId};
use super::store::ItemTree;

/// An iterator over the direct children of an item, in paint order.
///
/// Created by [`ItemTree::children`].
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a ItemTree,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a ItemTree, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = ItemId;

    fn next(&mut self) -> Option<ItemId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.next_sibling[idx as usize];
        Some(ItemId {
            idx,
            generation: self.tree.generation[idx as usize],
        })
    }
}
