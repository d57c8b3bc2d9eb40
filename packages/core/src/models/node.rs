//! Node Data Structures
//!
//! A node is one labeled box on a mindmap canvas. Nodes form a forest per
//! map: `parent_id = None` marks a root, anything else points at another
//! node in the same map. Style fields mirror the UI theme tokens and are
//! stored as lowercase strings; `icon` optionally names a glyph from the
//! frontend's icon set.
//!
//! # Examples
//!
//! ```rust
//! use mindmapper_core::models::{CreateNode, Node};
//!
//! // A root node with defaults
//! let root = Node::new(CreateNode {
//!     map_id: "map-1".to_string(),
//!     ..Default::default()
//! });
//! assert!(root.is_root());
//! assert_eq!(root.label, "New Node");
//!
//! // A styled child
//! let child = Node::new(CreateNode {
//!     map_id: "map-1".to_string(),
//!     label: Some("Subtopic".to_string()),
//!     parent_id: Some(root.id.clone()),
//!     ..Default::default()
//! });
//! assert!(!child.is_root());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::validation::{validate_label, validate_position, ValidationError};

/// Label applied when a node is created without one
pub const DEFAULT_NODE_LABEL: &str = "New Node";

/// Accent color of a node, matching the frontend theme palette
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleColor {
    Primary,
    Secondary,
    Accent,
    #[default]
    Neutral,
    Info,
    Success,
    Warning,
    Error,
}

impl StyleColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleColor::Primary => "primary",
            StyleColor::Secondary => "secondary",
            StyleColor::Accent => "accent",
            StyleColor::Neutral => "neutral",
            StyleColor::Info => "info",
            StyleColor::Success => "success",
            StyleColor::Warning => "warning",
            StyleColor::Error => "error",
        }
    }
}

impl FromStr for StyleColor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(StyleColor::Primary),
            "secondary" => Ok(StyleColor::Secondary),
            "accent" => Ok(StyleColor::Accent),
            "neutral" => Ok(StyleColor::Neutral),
            "info" => Ok(StyleColor::Info),
            "success" => Ok(StyleColor::Success),
            "warning" => Ok(StyleColor::Warning),
            "error" => Ok(StyleColor::Error),
            other => Err(ValidationError::InvalidValue(format!(
                "unknown style color: {}",
                other
            ))),
        }
    }
}

/// Outline shape of a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleShape {
    Rectangle,
    #[default]
    Rounded,
    Pill,
    Diamond,
}

impl StyleShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleShape::Rectangle => "rectangle",
            StyleShape::Rounded => "rounded",
            StyleShape::Pill => "pill",
            StyleShape::Diamond => "diamond",
        }
    }
}

impl FromStr for StyleShape {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rectangle" => Ok(StyleShape::Rectangle),
            "rounded" => Ok(StyleShape::Rounded),
            "pill" => Ok(StyleShape::Pill),
            "diamond" => Ok(StyleShape::Diamond),
            other => Err(ValidationError::InvalidValue(format!(
                "unknown style shape: {}",
                other
            ))),
        }
    }
}

/// Fill treatment of a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleType {
    #[default]
    Solid,
    Outline,
    Ghost,
    Filled,
}

impl StyleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleType::Solid => "solid",
            StyleType::Outline => "outline",
            StyleType::Ghost => "ghost",
            StyleType::Filled => "filled",
        }
    }
}

impl FromStr for StyleType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(StyleType::Solid),
            "outline" => Ok(StyleType::Outline),
            "ghost" => Ok(StyleType::Ghost),
            "filled" => Ok(StyleType::Filled),
            other => Err(ValidationError::InvalidValue(format!(
                "unknown style type: {}",
                other
            ))),
        }
    }
}

/// Whether label text follows the edge angle or stays horizontal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextRotation {
    Follow,
    #[default]
    Horizontal,
}

impl TextRotation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextRotation::Follow => "follow",
            TextRotation::Horizontal => "horizontal",
        }
    }
}

impl FromStr for TextRotation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "follow" => Ok(TextRotation::Follow),
            "horizontal" => Ok(TextRotation::Horizontal),
            other => Err(ValidationError::InvalidValue(format!(
                "unknown text rotation: {}",
                other
            ))),
        }
    }
}

/// One node of a mindmap.
///
/// # Fields
///
/// - `id`: Unique identifier (UUID v4)
/// - `map_id`: Owning map; nodes never move between maps
/// - `parent_id`: Optional parent in the same map; `None` marks a root
/// - `label`: Display text
/// - `pos_x` / `pos_y`: Canvas position (top-left corner), finite floats
/// - `style_*` / `text_rotation`: Presentation, see the enum docs
/// - `icon`: Optional icon reference shown beside the label
/// - `created_at` / `modified_at`: Timestamps; `created_at` also drives
///   deterministic sibling ordering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Owning map
    pub map_id: String,

    /// Parent node in the same map; `None` marks a root
    pub parent_id: Option<String>,

    /// Display text
    pub label: String,

    /// Canvas X coordinate
    pub pos_x: f64,

    /// Canvas Y coordinate
    pub pos_y: f64,

    #[serde(default)]
    pub style_color: StyleColor,

    #[serde(default)]
    pub style_shape: StyleShape,

    #[serde(default)]
    pub style_type: StyleType,

    #[serde(default)]
    pub text_rotation: TextRotation,

    /// Optional icon reference, `None` when the node has no icon
    pub icon: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

impl Node {
    /// Create a new node with an auto-generated UUID, filling unset fields
    /// with their defaults (`"New Node"`, origin position, neutral style).
    pub fn new(params: CreateNode) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            map_id: params.map_id,
            parent_id: params.parent_id,
            label: params
                .label
                .unwrap_or_else(|| DEFAULT_NODE_LABEL.to_string()),
            pos_x: params.pos_x.unwrap_or(0.0),
            pos_y: params.pos_y.unwrap_or(0.0),
            style_color: params.style_color.unwrap_or_default(),
            style_shape: params.style_shape.unwrap_or_default(),
            style_type: params.style_type.unwrap_or_default(),
            text_rotation: params.text_rotation.unwrap_or_default(),
            icon: params.icon,
            created_at: now,
            modified_at: now,
        }
    }

    /// Validate structure and field contents.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - `id` or `map_id` is empty
    /// - the label is blank or too long
    /// - a coordinate is NaN or infinite
    /// - the node references itself as parent
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }

        if self.map_id.is_empty() {
            return Err(ValidationError::MissingField("mapId".to_string()));
        }

        validate_label(&self.label)?;
        validate_position(self.pos_x, self.pos_y)?;

        if let Some(parent_id) = &self.parent_id {
            if parent_id == &self.id {
                return Err(ValidationError::InvalidParent(
                    "Node cannot be its own parent".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Check if this node is a root (has no parent)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Update the label in place
    pub fn set_label(&mut self, label: String) {
        self.label = label;
        self.modified_at = Utc::now();
    }

    /// Update the canvas position in place
    pub fn set_position(&mut self, pos_x: f64, pos_y: f64) {
        self.pos_x = pos_x;
        self.pos_y = pos_y;
        self.modified_at = Utc::now();
    }
}

/// Parameters for creating a node. Everything except `map_id` is optional
/// and falls back to the documented defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNode {
    /// Defaults to empty when absent so validation reports the missing
    /// field instead of a deserialization error
    #[serde(default)]
    pub map_id: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub parent_id: Option<String>,

    #[serde(default)]
    pub pos_x: Option<f64>,

    #[serde(default)]
    pub pos_y: Option<f64>,

    #[serde(default)]
    pub style_color: Option<StyleColor>,

    #[serde(default)]
    pub style_shape: Option<StyleShape>,

    #[serde(default)]
    pub style_type: Option<StyleType>,

    #[serde(default)]
    pub text_rotation: Option<TextRotation>,

    #[serde(default)]
    pub icon: Option<String>,
}

/// Custom deserializer for optional fields that accepts both plain values
/// and null.
///
/// Maps the three JSON states onto the double-Option pattern:
/// - Missing field → None (don't update)
/// - null → Some(None) (set to NULL)
/// - "value" → Some(Some("value")) (set to value)
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    // Missing field is handled by #[serde(default)] on the struct field
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Partial node update for PUT/PATCH operations.
///
/// All fields are optional; only provided fields are written.
///
/// # Double-Option Pattern for nullable fields
///
/// `parent_id` and `icon` are nullable, so "don't touch it" and "clear it"
/// must be distinguishable:
///
/// - `None`: Don't change the field
/// - `Some(None)`: Set it to NULL (detach the node / remove the icon)
/// - `Some(Some(value))`: Set it to `value`
///
/// Reparenting through an update goes through the same hierarchy checks as
/// an explicit move.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_x: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_y: Option<f64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub parent_id: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_color: Option<StyleColor>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_shape: Option<StyleShape>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_type: Option<StyleType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_rotation: Option<TextRotation>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub icon: Option<Option<String>>,
}

impl NodeUpdate {
    /// Create a new empty NodeUpdate
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: String) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_position(mut self, pos_x: f64, pos_y: f64) -> Self {
        self.pos_x = Some(pos_x);
        self.pos_y = Some(pos_y);
        self
    }

    /// Reparent under the given node, or detach with `None`
    pub fn with_parent(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_style_color(mut self, color: StyleColor) -> Self {
        self.style_color = Some(color);
        self
    }

    /// Set the icon, or clear it with `None`
    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Check if the update contains any changes
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.pos_x.is_none()
            && self.pos_y.is_none()
            && self.parent_id.is_none()
            && self.style_color.is_none()
            && self.style_shape.is_none()
            && self.style_type.is_none()
            && self.text_rotation.is_none()
            && self.icon.is_none()
    }
}
