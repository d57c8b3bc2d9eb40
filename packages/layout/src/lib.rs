//! Deterministic hierarchical layout for mindmap trees.
//!
//! The engine is a pure function: node sizes and parent edges in, top-left
//! positions out. Nodes are ranked by depth below their root, packed along
//! the cross axis by subtree span, and separated along the rank axis by the
//! tallest node of each rank. No I/O and no randomness, so identical input
//! always yields identical output.
//!
//! ```
//! use mindmapper_layout::{layout, LayoutEdge, LayoutNode, LayoutOptions};
//!
//! let nodes = vec![LayoutNode::new("root"), LayoutNode::new("child")];
//! let edges = vec![LayoutEdge::new("root", "child")];
//!
//! let positioned = layout(&nodes, &edges, &LayoutOptions::default())?;
//! assert_eq!(positioned.len(), 2);
//! # Ok::<(), mindmapper_layout::LayoutError>(())
//! ```

mod graph;
mod position;
mod rank;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback node width when a [`LayoutNode`] carries no explicit size.
pub const DEFAULT_NODE_WIDTH: f64 = 172.0;
/// Fallback node height when a [`LayoutNode`] carries no explicit size.
pub const DEFAULT_NODE_HEIGHT: f64 = 36.0;
/// Default gap between consecutive ranks along the primary axis.
pub const DEFAULT_RANK_SEP: f64 = 100.0;
/// Default gap between sibling subtrees along the cross axis.
pub const DEFAULT_NODE_SEP: f64 = 50.0;

/// Primary growth direction of the layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LayoutDirection {
    /// Roots at the top, children flowing downward.
    #[serde(rename = "TB")]
    TopToBottom,
    /// Roots at the left, children flowing rightward.
    #[serde(rename = "LR")]
    LeftToRight,
}

impl Default for LayoutDirection {
    fn default() -> Self {
        Self::TopToBottom
    }
}

impl LayoutDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopToBottom => "TB",
            Self::LeftToRight => "LR",
        }
    }
}

/// Spacing configuration for a layout run.
///
/// Every field has a default taken from the vertical preset, and the struct
/// deserializes field-by-field, so API callers can send any subset of
/// options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    pub direction: LayoutDirection,
    /// Width used for nodes without an explicit size.
    pub node_width: f64,
    /// Height used for nodes without an explicit size.
    pub node_height: f64,
    /// Gap between consecutive ranks.
    pub rank_sep: f64,
    /// Gap between sibling subtrees.
    pub node_sep: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self::vertical()
    }
}

impl LayoutOptions {
    /// Top-to-bottom with the stock spacing.
    pub fn vertical() -> Self {
        Self {
            direction: LayoutDirection::TopToBottom,
            node_width: DEFAULT_NODE_WIDTH,
            node_height: DEFAULT_NODE_HEIGHT,
            rank_sep: DEFAULT_RANK_SEP,
            node_sep: DEFAULT_NODE_SEP,
        }
    }

    /// Left-to-right with a wider rank gap so labels have room to breathe.
    pub fn horizontal() -> Self {
        Self {
            direction: LayoutDirection::LeftToRight,
            rank_sep: 150.0,
            ..Self::vertical()
        }
    }

    /// Tight spacing for dense maps.
    pub fn compact() -> Self {
        Self {
            rank_sep: 60.0,
            node_sep: 30.0,
            ..Self::vertical()
        }
    }

    /// Generous spacing.
    pub fn spacious() -> Self {
        Self {
            rank_sep: 150.0,
            node_sep: 80.0,
            ..Self::vertical()
        }
    }
}

/// Named spacing presets exposed through the layout API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LayoutPreset {
    Vertical,
    Horizontal,
    Compact,
    Spacious,
}

impl LayoutPreset {
    pub fn options(self) -> LayoutOptions {
        match self {
            Self::Vertical => LayoutOptions::vertical(),
            Self::Horizontal => LayoutOptions::horizontal(),
            Self::Compact => LayoutOptions::compact(),
            Self::Spacious => LayoutOptions::spacious(),
        }
    }
}

/// A node to be positioned. Size is optional and falls back to the
/// [`LayoutOptions`] defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: String,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl LayoutNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            width: None,
            height: None,
        }
    }

    pub fn with_size(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width: Some(width),
            height: Some(height),
        }
    }
}

/// A parent-to-child edge between two nodes in the input set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    pub from: String,
    pub to: String,
}

impl LayoutEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// The computed placement of one node. `x` / `y` are the TOP-LEFT corner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Reasons a layout run can be rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Duplicate node id: {id}")]
    DuplicateNode { id: String },
    #[error("Edge references unknown node: {id}")]
    UnknownEdgeEndpoint { id: String },
    #[error("Node cannot be its own parent: {id}")]
    SelfLoop { id: String },
    #[error("Node hierarchy contains a cycle")]
    CycleDetected,
}

/// Computes positions for `nodes` arranged by the parent edges in `edges`.
///
/// The output preserves input order and is normalized so the smallest
/// top-left coordinate on each axis is `0.0`. Nodes with several incoming
/// edges keep the first one; the rest are ignored. Returns an error for
/// duplicate ids, edges naming unknown nodes, self-edges, and cyclic edge
/// sets.
pub fn layout(
    nodes: &[LayoutNode],
    edges: &[LayoutEdge],
    options: &LayoutOptions,
) -> Result<Vec<PositionedNode>, LayoutError> {
    if nodes.is_empty() {
        return Ok(Vec::new());
    }

    let forest = graph::Forest::build(nodes, edges)?;
    let ranks = rank::assign(&forest);

    // Resolve per-node extents, swapping axes for left-to-right layouts so
    // the placement passes always work in top-to-bottom space.
    let horizontal = options.direction == LayoutDirection::LeftToRight;
    let mut cross_sizes = Vec::with_capacity(nodes.len());
    let mut main_sizes = Vec::with_capacity(nodes.len());
    for node in nodes {
        let width = node.width.unwrap_or(options.node_width);
        let height = node.height.unwrap_or(options.node_height);
        if horizontal {
            cross_sizes.push(height);
            main_sizes.push(width);
        } else {
            cross_sizes.push(width);
            main_sizes.push(height);
        }
    }

    let cross = position::cross_centers(&forest, &cross_sizes, options.node_sep);
    let main = position::main_centers(&ranks, &main_sizes, options.rank_sep);

    let mut positioned: Vec<PositionedNode> = nodes
        .iter()
        .enumerate()
        .map(|(ix, node)| {
            let width = node.width.unwrap_or(options.node_width);
            let height = node.height.unwrap_or(options.node_height);
            let (center_x, center_y) = if horizontal {
                (main[ix], cross[ix])
            } else {
                (cross[ix], main[ix])
            };
            PositionedNode {
                id: node.id.clone(),
                x: center_x - width / 2.0,
                y: center_y - height / 2.0,
                width,
                height,
            }
        })
        .collect();

    // Shift the drawing so its top-left corner sits at the origin.
    let min_x = positioned.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let min_y = positioned.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    for p in &mut positioned {
        p.x -= min_x;
        p.y -= min_y;
    }

    Ok(positioned)
}
