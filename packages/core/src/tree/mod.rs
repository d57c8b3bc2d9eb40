//! In-Memory Map Hierarchy
//!
//! `MapTree` is an arena built from the flat node rows of a single map. The
//! database stores only `parent_id` pointers; the children index and root
//! list are rebuilt here on every load rather than persisted, so they can
//! never drift from the source of truth.
//!
//! The tree answers the hierarchy questions the services need without
//! touching the database again:
//!
//! - which nodes form the subtree under a node (for transactional deletes)
//! - whether a reparent would create a cycle
//! - which nodes are roots, and in what order children appear
//!
//! All traversals use explicit worklists with a visited set. Depth is
//! unbounded and corrupt parent pointers (a stored cycle, a dangling parent)
//! degrade gracefully instead of hanging or overflowing the stack.
//!
//! Child order follows the order nodes are passed in, which callers obtain
//! from the store's `(created_at, id)` ordering. That keeps sibling order
//! and traversal output deterministic.

use crate::models::Node;
use std::collections::{HashMap, HashSet};

/// Per-node entry in the arena
#[derive(Debug, Clone)]
struct TreeEntry {
    parent_id: Option<String>,
    children: Vec<String>,
}

/// Hierarchy index over the nodes of one map
///
/// # Examples
///
/// ```
/// use mindmapper_core::models::{CreateNode, Node};
/// use mindmapper_core::tree::MapTree;
///
/// let root = Node::new(CreateNode {
///     map_id: "map-1".to_string(),
///     ..Default::default()
/// });
/// let child = Node::new(CreateNode {
///     map_id: "map-1".to_string(),
///     parent_id: Some(root.id.clone()),
///     ..Default::default()
/// });
///
/// let tree = MapTree::build(&[root.clone(), child.clone()]);
/// assert_eq!(tree.root_ids(), [root.id.clone()]);
/// assert_eq!(tree.descendant_ids(&root.id), vec![child.id.clone()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapTree {
    entries: HashMap<String, TreeEntry>,
    roots: Vec<String>,
}

impl MapTree {
    /// Build the arena from a map's node rows
    ///
    /// Nodes whose `parent_id` is missing, points outside the slice, or
    /// points at the node itself are treated as roots. That tolerates rows
    /// left behind by interrupted writes; nothing panics and every node
    /// stays reachable from `root_ids` unless it sits inside a stored
    /// parent-pointer cycle.
    pub fn build(nodes: &[Node]) -> Self {
        let mut entries: HashMap<String, TreeEntry> = HashMap::with_capacity(nodes.len());

        for node in nodes {
            entries.insert(
                node.id.clone(),
                TreeEntry {
                    parent_id: node.parent_id.clone(),
                    children: Vec::new(),
                },
            );
        }

        let mut roots = Vec::new();

        // Second pass preserves input order for both roots and children
        for node in nodes {
            let parent = node
                .parent_id
                .as_deref()
                .filter(|p| *p != node.id && entries.contains_key(*p));

            match parent {
                Some(parent_id) => {
                    if let Some(entry) = entries.get_mut(parent_id) {
                        entry.children.push(node.id.clone());
                    }
                }
                None => roots.push(node.id.clone()),
            }
        }

        Self { entries, roots }
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a node is part of this map
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Parent of a node, if it has one that resolves within the map
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.entries
            .get(id)
            .and_then(|e| e.parent_id.as_deref())
            .filter(|p| *p != id && self.entries.contains_key(*p))
    }

    /// Children of a node in sibling order (empty for unknown IDs)
    pub fn children(&self, id: &str) -> &[String] {
        self.entries
            .get(id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    /// Root nodes in input order
    pub fn root_ids(&self) -> &[String] {
        &self.roots
    }

    /// All descendants of a node, excluding the node itself
    ///
    /// Pre-order traversal driven by an explicit worklist, so depth is
    /// limited only by memory. The visited set makes traversal terminate
    /// even if the children index were to contain a corrupt cycle.
    pub fn descendant_ids(&self, id: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(id);

        let mut worklist: Vec<&str> = Vec::new();
        for child in self.children(id).iter().rev() {
            worklist.push(child);
        }

        while let Some(current) = worklist.pop() {
            if !visited.insert(current) {
                continue;
            }
            result.push(current.to_string());

            for child in self.children(current).iter().rev() {
                if !visited.contains(child.as_str()) {
                    worklist.push(child);
                }
            }
        }

        result
    }

    /// A node plus all of its descendants
    ///
    /// This is the deletion set for subtree removal. Unknown IDs yield an
    /// empty vector; callers distinguish "missing node" via `contains`.
    pub fn subtree_ids(&self, id: &str) -> Vec<String> {
        if !self.contains(id) {
            return Vec::new();
        }

        let mut ids = Vec::with_capacity(1);
        ids.push(id.to_string());
        ids.extend(self.descendant_ids(id));
        ids
    }

    /// Whether attaching `node_id` under `new_parent_id` would create a cycle
    ///
    /// Walks up the parent chain from the proposed parent; if the walk
    /// reaches `node_id`, the new parent sits inside the node's own subtree.
    /// A node is always considered its own ancestor, so reparenting onto
    /// itself reports `true`.
    pub fn would_create_cycle(&self, node_id: &str, new_parent_id: &str) -> bool {
        if node_id == new_parent_id {
            return true;
        }

        let mut visited = HashSet::new();
        let mut current = new_parent_id;

        while let Some(parent) = self.parent_of(current) {
            if parent == node_id {
                return true;
            }
            if !visited.insert(parent) {
                // Stored cycle above the proposed parent; it does not pass
                // through node_id or we would have returned already
                return false;
            }
            current = parent;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::{StyleColor, StyleShape, StyleType, TextRotation};

    fn node(id: &str, parent_id: Option<&str>) -> Node {
        let now = Utc::now();
        Node {
            id: id.to_string(),
            map_id: "map-1".to_string(),
            parent_id: parent_id.map(|p| p.to_string()),
            label: format!("Node {}", id),
            pos_x: 0.0,
            pos_y: 0.0,
            style_color: StyleColor::default(),
            style_shape: StyleShape::default(),
            style_type: StyleType::default(),
            text_rotation: TextRotation::default(),
            icon: None,
            created_at: now,
            modified_at: now,
        }
    }

    #[test]
    fn test_build_identifies_roots_and_children() {
        let nodes = vec![
            node("a", None),
            node("b", Some("a")),
            node("c", Some("a")),
            node("d", None),
        ];
        let tree = MapTree::build(&nodes);

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.root_ids(), ["a".to_string(), "d".to_string()]);
        assert_eq!(tree.children("a"), ["b".to_string(), "c".to_string()]);
        assert!(tree.children("b").is_empty());
        assert_eq!(tree.parent_of("b"), Some("a"));
        assert_eq!(tree.parent_of("a"), None);
    }

    #[test]
    fn test_descendants_excludes_start_and_is_preorder() {
        // a -> b -> d, e ; a -> c
        let nodes = vec![
            node("a", None),
            node("b", Some("a")),
            node("c", Some("a")),
            node("d", Some("b")),
            node("e", Some("b")),
        ];
        let tree = MapTree::build(&nodes);

        let descendants = tree.descendant_ids("a");
        assert_eq!(
            descendants,
            vec![
                "b".to_string(),
                "d".to_string(),
                "e".to_string(),
                "c".to_string()
            ]
        );
        assert!(tree.descendant_ids("d").is_empty());
    }

    #[test]
    fn test_subtree_includes_start() {
        let nodes = vec![node("a", None), node("b", Some("a")), node("c", Some("b"))];
        let tree = MapTree::build(&nodes);

        assert_eq!(
            tree.subtree_ids("b"),
            vec!["b".to_string(), "c".to_string()]
        );
        assert_eq!(tree.subtree_ids("c"), vec!["c".to_string()]);
        assert!(tree.subtree_ids("missing").is_empty());
    }

    #[test]
    fn test_orphaned_parent_treated_as_root() {
        let nodes = vec![node("a", Some("gone")), node("b", Some("a"))];
        let tree = MapTree::build(&nodes);

        assert_eq!(tree.root_ids(), ["a".to_string()]);
        assert_eq!(tree.parent_of("a"), None);
        assert_eq!(tree.descendant_ids("a"), vec!["b".to_string()]);
    }

    #[test]
    fn test_self_parent_treated_as_root() {
        let nodes = vec![node("a", Some("a"))];
        let tree = MapTree::build(&nodes);

        assert_eq!(tree.root_ids(), ["a".to_string()]);
        assert!(tree.descendant_ids("a").is_empty());
    }

    #[test]
    fn test_would_create_cycle() {
        let nodes = vec![
            node("a", None),
            node("b", Some("a")),
            node("c", Some("b")),
            node("d", None),
        ];
        let tree = MapTree::build(&nodes);

        // Self and descendants are cycles
        assert!(tree.would_create_cycle("a", "a"));
        assert!(tree.would_create_cycle("a", "b"));
        assert!(tree.would_create_cycle("a", "c"));
        assert!(tree.would_create_cycle("b", "c"));

        // Moving down-to-up or across is fine
        assert!(!tree.would_create_cycle("c", "a"));
        assert!(!tree.would_create_cycle("c", "d"));
        assert!(!tree.would_create_cycle("b", "d"));
    }

    #[test]
    fn test_corrupt_cycle_does_not_hang() {
        // a and b point at each other; traversal and cycle checks must
        // terminate anyway
        let nodes = vec![node("a", Some("b")), node("b", Some("a")), node("c", None)];
        let tree = MapTree::build(&nodes);

        assert_eq!(tree.root_ids(), ["c".to_string()]);
        assert_eq!(tree.descendant_ids("a"), vec!["b".to_string()]);
        assert!(!tree.would_create_cycle("c", "a"));
        assert!(tree.would_create_cycle("a", "b"));
    }

    #[test]
    fn test_deep_chain_traversal() {
        // 5000 levels would overflow a recursive traversal; the worklist
        // version just walks it
        let mut nodes = vec![node("n0", None)];
        for i in 1..5000 {
            nodes.push(node(&format!("n{}", i), Some(&format!("n{}", i - 1))));
        }
        let tree = MapTree::build(&nodes);

        let descendants = tree.descendant_ids("n0");
        assert_eq!(descendants.len(), 4999);
        assert_eq!(descendants[0], "n1");
        assert_eq!(descendants[4998], "n4999");

        assert!(tree.would_create_cycle("n0", "n4999"));
        assert!(!tree.would_create_cycle("n4999", "n0"));
    }
}
