//! Mindmap documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::node::Node;
use super::validation::{validate_title, ValidationError};

/// Title applied when a map is created without one
pub const DEFAULT_MAP_TITLE: &str = "Untitled Mindmap";

/// A mindmap document owned by a user. Nodes reference the map by id and are
/// removed with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMap {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Display title
    pub title: String,

    /// Owning user
    pub user_id: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

impl MindMap {
    /// Create a new map with an auto-generated UUID.
    /// A missing title falls back to [`DEFAULT_MAP_TITLE`].
    pub fn new(title: Option<String>, user_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.unwrap_or_else(|| DEFAULT_MAP_TITLE.to_string()),
            user_id,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.is_empty() {
            return Err(ValidationError::MissingField("userId".to_string()));
        }
        validate_title(&self.title)
    }
}

/// Parameters for creating a map
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMap {
    /// Optional; defaults to [`DEFAULT_MAP_TITLE`]
    #[serde(default)]
    pub title: Option<String>,
    /// Defaults to empty when absent so validation reports the missing
    /// field instead of a deserialization error
    #[serde(default)]
    pub user_id: String,
}

/// Partial map update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl MapUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: String) -> Self {
        self.title = Some(title);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
    }
}

/// A map together with every node it contains, as returned by
/// `GET /api/maps/:id/nodes`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapWithNodes {
    #[serde(flatten)]
    pub map: MindMap,
    pub nodes: Vec<Node>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_default_title() {
        let map = MindMap::new(None, "user-1".to_string());

        assert_eq!(map.title, DEFAULT_MAP_TITLE);
        assert_eq!(map.user_id, "user-1");
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_map_explicit_title() {
        let map = MindMap::new(Some("Project Plan".to_string()), "user-1".to_string());
        assert_eq!(map.title, "Project Plan");
    }

    #[test]
    fn test_map_requires_owner() {
        let map = MindMap::new(None, String::new());
        assert!(matches!(
            map.validate(),
            Err(ValidationError::MissingField(_))
        ));
    }

    #[test]
    fn test_map_serialization_is_camel_case() {
        let map = MindMap::new(None, "user-1".to_string());
        let json = serde_json::to_value(&map).unwrap();

        assert!(json.get("userId").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn test_map_update_builder() {
        assert!(MapUpdate::new().is_empty());

        let update = MapUpdate::new().with_title("Renamed".to_string());
        assert_eq!(update.title, Some("Renamed".to_string()));
        assert!(!update.is_empty());
    }
}
