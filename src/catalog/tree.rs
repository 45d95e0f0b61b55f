//! Parent-id index over the category table.
//!
//! Categories reference their parent by id only. `CategoryTree` inverts
//! that into an id -> children lookup so menus and the cascade delete can
//! walk the hierarchy without holding object references in both directions.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Default, Clone)]
pub struct CategoryTree {
    children: HashMap<String, Vec<String>>,
    known: HashSet<String>,
}

impl CategoryTree {
    /// Builds the index from `(id, parent_id)` pairs in store order.
    ///
    /// Children keep the order in which they were supplied. A parent id that
    /// does not resolve to a known category leaves its child unreachable
    /// from any other category but still addressable by id.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        let mut tree = CategoryTree::default();
        for (id, parent_id) in pairs {
            tree.known.insert(id.clone());
            if let Some(parent) = parent_id {
                tree.children.entry(parent).or_default().push(id);
            }
        }
        tree
    }

    pub fn contains(&self, id: &str) -> bool {
        self.known.contains(id)
    }

    pub fn children_of(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every category in the subtree rooted at `id`, descendants before
    /// their ancestors, `id` itself last.
    ///
    /// Returns an empty list when `id` is unknown. Cycles in corrupted data
    /// are cut by visiting each id once.
    pub fn subtree_post_order(&self, id: &str) -> Vec<String> {
        if !self.contains(id) {
            return Vec::new();
        }

        let mut order = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        // (node, children already expanded)
        let mut stack: Vec<(&str, bool)> = vec![(id, false)];

        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                order.push(node.to_string());
                continue;
            }
            if !visited.insert(node) {
                continue;
            }
            stack.push((node, true));
            for child in self.children_of(node).iter().rev() {
                if !visited.contains(child.as_str()) {
                    stack.push((child.as_str(), false));
                }
            }
        }

        order
    }
}
