//! Rank assignment.
//!
//! Ranks are the depth of each node below its root: roots sit at rank 0 and
//! every child sits exactly one rank below its parent. A breadth-first
//! worklist keeps the pass iterative regardless of tree depth.

use std::collections::VecDeque;

use crate::graph::Forest;

pub(crate) fn assign(forest: &Forest) -> Vec<usize> {
    let mut ranks = vec![0usize; forest.len()];
    let mut queue: VecDeque<usize> = forest.roots.iter().copied().collect();

    while let Some(ix) = queue.pop_front() {
        for &child in &forest.children[ix] {
            ranks[child] = ranks[ix] + 1;
            queue.push_back(child);
        }
    }

    ranks
}
