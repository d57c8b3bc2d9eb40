//! Coordinate assignment.
//!
//! Cross axis: a post-order pass computes each subtree's span, then a
//! pre-order pass hands every subtree an interval and centers the node over
//! its children block. Rank axis: each rank is as thick as its largest node
//! and consecutive ranks are separated by the configured gap. Both passes
//! use explicit stacks, so tree depth never touches the call stack.

use crate::graph::Forest;

/// Center coordinates along the cross axis (x in top-to-bottom layouts).
pub(crate) fn cross_centers(forest: &Forest, sizes: &[f64], node_sep: f64) -> Vec<f64> {
    let n = forest.len();
    let mut span = vec![0.0f64; n];

    // Subtree spans, children first.
    let mut stack: Vec<(usize, usize)> = Vec::new();
    for &root in &forest.roots {
        stack.push((root, 0));
        while let Some((ix, next)) = stack.last_mut() {
            let ix = *ix;
            if let Some(&child) = forest.children[ix].get(*next) {
                *next += 1;
                stack.push((child, 0));
                continue;
            }
            stack.pop();

            let kids = &forest.children[ix];
            if kids.is_empty() {
                span[ix] = sizes[ix];
            } else {
                let block = children_block(kids, &span, node_sep);
                span[ix] = block.max(sizes[ix]);
            }
        }
    }

    // Interval assignment, parents first. Each node is centered in its
    // interval; the children block is centered inside the same interval.
    let mut center = vec![0.0f64; n];
    let mut offset = vec![0.0f64; n];
    let mut cursor = 0.0f64;
    let mut walk: Vec<usize> = Vec::new();
    for &root in &forest.roots {
        offset[root] = cursor;
        cursor += span[root] + node_sep;
        walk.push(root);
    }
    while let Some(ix) = walk.pop() {
        center[ix] = offset[ix] + span[ix] / 2.0;

        let kids = &forest.children[ix];
        if kids.is_empty() {
            continue;
        }
        let block = children_block(kids, &span, node_sep);
        let mut child_offset = offset[ix] + (span[ix] - block) / 2.0;
        for &child in kids {
            offset[child] = child_offset;
            child_offset += span[child] + node_sep;
            walk.push(child);
        }
    }

    center
}

fn children_block(kids: &[usize], span: &[f64], node_sep: f64) -> f64 {
    let spans: f64 = kids.iter().map(|&c| span[c]).sum();
    spans + node_sep * (kids.len() - 1) as f64
}

/// Center coordinates along the rank axis (y in top-to-bottom layouts).
pub(crate) fn main_centers(ranks: &[usize], sizes: &[f64], rank_sep: f64) -> Vec<f64> {
    let rank_count = ranks.iter().copied().max().map_or(0, |deepest| deepest + 1);

    let mut extent = vec![0.0f64; rank_count];
    for (ix, &rank) in ranks.iter().enumerate() {
        if sizes[ix] > extent[rank] {
            extent[rank] = sizes[ix];
        }
    }

    let mut offsets = vec![0.0f64; rank_count];
    let mut cursor = 0.0f64;
    for (rank, offset) in offsets.iter_mut().enumerate() {
        *offset = cursor;
        cursor += extent[rank] + rank_sep;
    }

    ranks
        .iter()
        .map(|&rank| offsets[rank] + extent[rank] / 2.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LayoutEdge, LayoutNode};

    fn forest(ids: &[&str], edges: &[(&str, &str)]) -> Forest {
        let nodes: Vec<LayoutNode> = ids.iter().map(|id| LayoutNode::new(*id)).collect();
        let edges: Vec<LayoutEdge> = edges
            .iter()
            .map(|(from, to)| LayoutEdge::new(*from, *to))
            .collect();
        Forest::build(&nodes, &edges).unwrap()
    }

    #[test]
    fn parent_is_centered_over_its_children() {
        let forest = forest(&["root", "c1", "c2"], &[("root", "c1"), ("root", "c2")]);
        let centers = cross_centers(&forest, &[10.0, 10.0, 10.0], 5.0);

        // Children pack to [0,10) and [15,25); the root spans the block.
        assert_eq!(centers, vec![12.5, 5.0, 20.0]);
    }

    #[test]
    fn wide_parent_centers_the_children_block() {
        let forest = forest(&["root", "c1", "c2"], &[("root", "c1"), ("root", "c2")]);
        let centers = cross_centers(&forest, &[40.0, 10.0, 10.0], 5.0);

        // The 25-wide children block floats inside the 40-wide parent span.
        assert_eq!(centers, vec![20.0, 12.5, 27.5]);
    }

    #[test]
    fn root_subtrees_pack_side_by_side() {
        let forest = forest(&["r1", "r2"], &[]);
        let centers = cross_centers(&forest, &[10.0, 10.0], 5.0);
        assert_eq!(centers, vec![5.0, 20.0]);
    }

    #[test]
    fn rank_axis_accumulates_extents_and_gaps() {
        let centers = main_centers(&[0, 1, 1], &[10.0, 20.0, 10.0], 7.0);

        // Rank 0 occupies [0,10), rank 1 starts at 17 and is 20 thick.
        assert_eq!(centers, vec![5.0, 27.0, 27.0]);
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let ids: Vec<String> = (0..20_000).map(|i| format!("n{i}")).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let edge_pairs: Vec<(&str, &str)> = id_refs.windows(2).map(|w| (w[0], w[1])).collect();
        let forest = forest(&id_refs, &edge_pairs);

        let sizes = vec![10.0; ids.len()];
        let centers = cross_centers(&forest, &sizes, 5.0);
        assert!(centers.iter().all(|&c| c == 5.0));
    }
}
