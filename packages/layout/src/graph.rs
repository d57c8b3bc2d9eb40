//! Validated parent/child structure built from the caller's nodes and edges.
//!
//! Nodes are addressed by index into the input slice; ids only survive into
//! error payloads. Edges are reduced to at most one parent per node, which
//! turns any valid input into a forest.

use std::collections::HashMap;

use crate::{LayoutEdge, LayoutError, LayoutNode};

#[derive(Debug)]
pub(crate) struct Forest {
    pub children: Vec<Vec<usize>>,
    pub roots: Vec<usize>,
}

impl Forest {
    pub fn build(nodes: &[LayoutNode], edges: &[LayoutEdge]) -> Result<Self, LayoutError> {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
        for (ix, node) in nodes.iter().enumerate() {
            if index.insert(node.id.as_str(), ix).is_some() {
                return Err(LayoutError::DuplicateNode {
                    id: node.id.clone(),
                });
            }
        }

        let mut parent: Vec<Option<usize>> = vec![None; nodes.len()];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];

        for edge in edges {
            let from = *index
                .get(edge.from.as_str())
                .ok_or_else(|| LayoutError::UnknownEdgeEndpoint {
                    id: edge.from.clone(),
                })?;
            let to = *index
                .get(edge.to.as_str())
                .ok_or_else(|| LayoutError::UnknownEdgeEndpoint {
                    id: edge.to.clone(),
                })?;
            if from == to {
                return Err(LayoutError::SelfLoop {
                    id: edge.to.clone(),
                });
            }
            // First edge wins; later edges targeting the same child are
            // ignored.
            if parent[to].is_some() {
                continue;
            }
            parent[to] = Some(from);
            children[from].push(to);
        }

        let roots: Vec<usize> = (0..nodes.len()).filter(|&ix| parent[ix].is_none()).collect();

        // With at most one parent per node, anything unreachable from a root
        // must sit on a parent ring.
        let mut reached = vec![false; nodes.len()];
        let mut stack: Vec<usize> = roots.clone();
        let mut seen = 0usize;
        while let Some(ix) = stack.pop() {
            if reached[ix] {
                continue;
            }
            reached[ix] = true;
            seen += 1;
            stack.extend(children[ix].iter().copied());
        }
        if seen < nodes.len() {
            return Err(LayoutError::CycleDetected);
        }

        Ok(Self { children, roots })
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(ids: &[&str]) -> Vec<LayoutNode> {
        ids.iter().map(|id| LayoutNode::new(*id)).collect()
    }

    #[test]
    fn builds_forest_with_roots_in_input_order() {
        let nodes = nodes(&["a", "b", "c", "d"]);
        let edges = vec![LayoutEdge::new("a", "b"), LayoutEdge::new("a", "c")];

        let forest = Forest::build(&nodes, &edges).unwrap();
        assert_eq!(forest.len(), 4);
        assert_eq!(forest.roots, vec![0, 3]);
        assert_eq!(forest.children[0], vec![1, 2]);
        assert!(forest.children[1].is_empty());
    }

    #[test]
    fn first_parent_edge_wins() {
        let nodes = nodes(&["p1", "p2", "c"]);
        let edges = vec![LayoutEdge::new("p1", "c"), LayoutEdge::new("p2", "c")];

        let forest = Forest::build(&nodes, &edges).unwrap();
        assert_eq!(forest.children[0], vec![2]);
        assert!(forest.children[1].is_empty());
        assert_eq!(forest.roots, vec![0, 1]);
    }

    #[test]
    fn rejects_duplicate_node_ids() {
        let nodes = nodes(&["a", "a"]);
        let err = Forest::build(&nodes, &[]).unwrap_err();
        assert_eq!(err, LayoutError::DuplicateNode { id: "a".to_string() });
    }

    #[test]
    fn rejects_edges_to_unknown_nodes() {
        let nodes = nodes(&["a"]);
        let edges = vec![LayoutEdge::new("a", "ghost")];
        let err = Forest::build(&nodes, &edges).unwrap_err();
        assert_eq!(
            err,
            LayoutError::UnknownEdgeEndpoint {
                id: "ghost".to_string()
            }
        );
    }

    #[test]
    fn rejects_self_edges() {
        let nodes = nodes(&["a"]);
        let edges = vec![LayoutEdge::new("a", "a")];
        let err = Forest::build(&nodes, &edges).unwrap_err();
        assert_eq!(err, LayoutError::SelfLoop { id: "a".to_string() });
    }

    #[test]
    fn rejects_cycles() {
        let nodes = nodes(&["a", "b", "c"]);
        let edges = vec![
            LayoutEdge::new("a", "b"),
            LayoutEdge::new("b", "c"),
            LayoutEdge::new("c", "a"),
        ];
        let err = Forest::build(&nodes, &edges).unwrap_err();
        assert_eq!(err, LayoutError::CycleDetected);
    }

    #[test]
    fn cycle_with_attached_branch_is_still_rejected() {
        // d hangs off the ring, leaving no root to reach anything from.
        let nodes = nodes(&["a", "b", "d"]);
        let edges = vec![
            LayoutEdge::new("a", "b"),
            LayoutEdge::new("b", "a"),
            LayoutEdge::new("a", "d"),
        ];
        let err = Forest::build(&nodes, &edges).unwrap_err();
        assert_eq!(err, LayoutError::CycleDetected);
    }
}
