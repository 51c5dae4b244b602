use std::collections::HashMap;

use crate::item::Item;
use crate::vec3::Vec3;

/// Flat arena of items indexed by id.
///
/// Render handles live in a separate map owned by the caller: items never
/// embed display objects and display objects never own items, so there is
/// no ownership cycle between domain data and the render side.
pub struct Gallery {
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl Gallery {
    /// Build from loaded items. On duplicate ids the first occurrence wins.
    pub fn new(items: Vec<Item>) -> Self {
        let mut deduped: Vec<Item> = Vec::with_capacity(items.len());
        let mut index = HashMap::with_capacity(items.len());
        for item in items {
            if index.contains_key(&item.id) {
                tracing::warn!(id = %item.id, "duplicate item id ignored");
                continue;
            }
            index.insert(item.id.clone(), deduped.len());
            deduped.push(item);
        }
        Self {
            items: deduped,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Overwrite item positions from a projector run. Lengths must match;
    /// a mismatch leaves the gallery untouched.
    pub fn apply_layout(&mut self, positions: &[Vec3]) {
        if positions.len() != self.items.len() {
            tracing::warn!(
                expected = self.items.len(),
                got = positions.len(),
                "layout length mismatch, positions unchanged"
            );
            return;
        }
        for (item, pos) in self.items.iter_mut().zip(positions) {
            item.position = *pos;
        }
    }

    /// Personalization nudge: displace one item by a small delta.
    pub fn nudge_position(&mut self, id: &str, delta: Vec3) {
        if let Some(&i) = self.index.get(id) {
            self.items[i].position = self.items[i].position + delta;
        }
    }
}
