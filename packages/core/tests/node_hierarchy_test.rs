//! Node Hierarchy Tests
//!
//! Integration tests for node creation, reparenting, subtree deletion, and
//! the automatic layout pass, all running through the services against a
//! real on-disk store.
//!
//! ## Coverage
//! - Parent validation (existence, same map, no cycles)
//! - Subtree deletion counts and survivor set
//! - The double-Option parent semantics of partial updates
//! - Persisted positions after an automatic layout run

#[cfg(test)]
mod node_hierarchy_tests {
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::Arc;

    use anyhow::Result;
    use mindmapper_core::db::{DatabaseService, MindmapStore, TursoStore};
    use mindmapper_core::models::{CreateMap, CreateNode, NodeUpdate, User};
    use mindmapper_core::services::{MapService, NodeService, ServiceError};
    use mindmapper_layout::LayoutOptions;
    use tempfile::TempDir;

    struct TestContext {
        maps: MapService,
        nodes: NodeService,
        store: Arc<dyn MindmapStore>,
        map_id: String,
        _temp_dir: TempDir,
    }

    /// Helper to create services over a fresh database seeded with one
    /// user and one map
    async fn create_test_context() -> Result<TestContext> {
        let temp_dir = TempDir::new()?;
        let db_path: PathBuf = temp_dir.path().join("test.db");
        let db = Arc::new(DatabaseService::new(db_path).await?);
        let store: Arc<dyn MindmapStore> = Arc::new(TursoStore::new(db));

        let user = store
            .create_user(User::new(
                "owner".to_string(),
                "owner@example.com".to_string(),
                "$argon2id$fake-hash".to_string(),
            ))
            .await?;

        let maps = MapService::new(store.clone());
        let map = maps
            .create_map(CreateMap {
                title: Some("Hierarchy".to_string()),
                user_id: user.id,
            })
            .await?;

        Ok(TestContext {
            maps,
            nodes: NodeService::new(store.clone()),
            store,
            map_id: map.id,
            _temp_dir: temp_dir,
        })
    }

    impl TestContext {
        /// Create a node in the seeded map
        async fn add_node(
            &self,
            label: &str,
            parent_id: Option<&str>,
        ) -> Result<String, ServiceError> {
            let node = self
                .nodes
                .create_node(CreateNode {
                    map_id: self.map_id.clone(),
                    label: Some(label.to_string()),
                    parent_id: parent_id.map(str::to_string),
                    ..Default::default()
                })
                .await?;
            Ok(node.id)
        }
    }

    #[tokio::test]
    async fn test_create_node_applies_documented_defaults() -> Result<()> {
        let ctx = create_test_context().await?;

        let node = ctx
            .nodes
            .create_node(CreateNode {
                map_id: ctx.map_id.clone(),
                ..Default::default()
            })
            .await?;

        assert_eq!(node.label, "New Node");
        assert_eq!(node.pos_x, 0.0);
        assert_eq!(node.pos_y, 0.0);
        assert!(node.parent_id.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_node_requires_an_existing_map() -> Result<()> {
        let ctx = create_test_context().await?;

        let err = ctx
            .nodes
            .create_node(CreateNode {
                map_id: "no-such-map".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::MapNotFound { .. }));

        let err = ctx
            .nodes
            .create_node(CreateNode::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationFailed(_)));

        Ok(())
    }

    #[tokio::test]
    async fn test_parent_must_exist_in_the_same_map() -> Result<()> {
        let ctx = create_test_context().await?;

        let err = ctx.add_node("orphan", Some("ghost")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidParent { .. }));

        // A node from a different map is not a valid parent either.
        let other_map = ctx
            .maps
            .create_map(CreateMap {
                title: Some("Other".to_string()),
                user_id: ctx.maps.get_map(&ctx.map_id).await?.user_id,
            })
            .await?;
        let foreign = ctx
            .nodes
            .create_node(CreateNode {
                map_id: other_map.id,
                ..Default::default()
            })
            .await?;

        let err = ctx.add_node("stray", Some(&foreign.id)).await.unwrap_err();
        assert!(matches!(err, ServiceError::CrossMapParent { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_subtree_removes_only_descendants() -> Result<()> {
        let ctx = create_test_context().await?;

        let root = ctx.add_node("root", None).await?;
        let a = ctx.add_node("a", Some(&root)).await?;
        let b = ctx.add_node("b", Some(&root)).await?;
        let c = ctx.add_node("c", Some(&a)).await?;
        let d = ctx.add_node("d", Some(&a)).await?;

        let deleted = ctx.nodes.delete_subtree(&a).await?;
        assert_eq!(deleted, 3, "a, c and d should go");

        let remaining: HashSet<String> = ctx
            .nodes
            .nodes_by_map(&ctx.map_id)
            .await?
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(remaining, HashSet::from([root.clone(), b.clone()]));

        let err = ctx.nodes.get_node(&c).await.unwrap_err();
        assert!(matches!(err, ServiceError::NodeNotFound { .. }));
        let err = ctx.nodes.get_node(&d).await.unwrap_err();
        assert!(matches!(err, ServiceError::NodeNotFound { .. }));

        // A repeat delete reports not-found instead of counting zero.
        let err = ctx.nodes.delete_subtree(&a).await.unwrap_err();
        assert!(matches!(err, ServiceError::NodeNotFound { .. }));

        // Deleting a leaf only counts itself.
        assert_eq!(ctx.nodes.delete_subtree(&b).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_move_node_reparents_and_detaches() -> Result<()> {
        let ctx = create_test_context().await?;

        let root = ctx.add_node("root", None).await?;
        let a = ctx.add_node("a", Some(&root)).await?;
        let b = ctx.add_node("b", Some(&root)).await?;

        assert_eq!(ctx.nodes.move_node(&a, Some(b.clone())).await?, 1);
        assert_eq!(ctx.nodes.get_node(&a).await?.parent_id, Some(b.clone()));

        assert_eq!(ctx.nodes.move_node(&a, None).await?, 1);
        assert!(ctx.nodes.get_node(&a).await?.parent_id.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_move_node_rejects_cycles() -> Result<()> {
        let ctx = create_test_context().await?;

        let root = ctx.add_node("root", None).await?;
        let a = ctx.add_node("a", Some(&root)).await?;
        let c = ctx.add_node("c", Some(&a)).await?;

        // Under a descendant.
        let err = ctx
            .nodes
            .move_node(&root, Some(c.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::CircularReference { .. }));

        // Under itself.
        let err = ctx.nodes.move_node(&a, Some(a.clone())).await.unwrap_err();
        assert!(matches!(err, ServiceError::CircularReference { .. }));

        // Nothing changed.
        assert!(ctx.nodes.get_node(&root).await?.parent_id.is_none());
        assert_eq!(ctx.nodes.get_node(&a).await?.parent_id, Some(root));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_distinguishes_detach_from_untouched_parent() -> Result<()> {
        let ctx = create_test_context().await?;

        let root = ctx.add_node("root", None).await?;
        let a = ctx.add_node("a", Some(&root)).await?;

        // parent_id absent: the parent stays.
        ctx.nodes
            .update_node(
                &a,
                NodeUpdate {
                    label: Some("renamed".to_string()),
                    ..Default::default()
                },
            )
            .await?;
        let node = ctx.nodes.get_node(&a).await?;
        assert_eq!(node.label, "renamed");
        assert_eq!(node.parent_id, Some(root.clone()));

        // parent_id: null detaches.
        ctx.nodes
            .update_node(
                &a,
                NodeUpdate {
                    parent_id: Some(None),
                    ..Default::default()
                },
            )
            .await?;
        assert!(ctx.nodes.get_node(&a).await?.parent_id.is_none());

        // Reparenting through an update still runs the cycle check.
        let err = ctx
            .nodes
            .update_node(
                &root,
                NodeUpdate {
                    parent_id: Some(Some(root.clone())),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::CircularReference { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_position_and_label_validate_their_input() -> Result<()> {
        let ctx = create_test_context().await?;
        let node = ctx.add_node("n", None).await?;

        assert_eq!(ctx.nodes.set_position(&node, 5.5, -3.25).await?, 1);
        let stored = ctx.nodes.get_node(&node).await?;
        assert_eq!((stored.pos_x, stored.pos_y), (5.5, -3.25));

        let err = ctx
            .nodes
            .set_position(&node, f64::NAN, 0.0)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationFailed(_)));

        assert_eq!(ctx.nodes.set_label(&node, "titled").await?, 1);
        assert_eq!(ctx.nodes.get_node(&node).await?.label, "titled");

        let err = ctx.nodes.set_label(&node, "").await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationFailed(_)));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_position_leaves_parent_and_siblings_alone() -> Result<()> {
        let ctx = create_test_context().await?;

        let root = ctx.add_node("root", None).await?;
        let moved = ctx.add_node("moved", Some(&root)).await?;
        let sibling = ctx.add_node("sibling", Some(&root)).await?;

        let root_before = ctx.nodes.get_node(&root).await?;
        let sibling_before = ctx.nodes.get_node(&sibling).await?;

        ctx.nodes.set_position(&moved, 400.0, 250.0).await?;

        let root_after = ctx.nodes.get_node(&root).await?;
        let sibling_after = ctx.nodes.get_node(&sibling).await?;
        assert_eq!(
            (root_before.pos_x, root_before.pos_y),
            (root_after.pos_x, root_after.pos_y)
        );
        assert_eq!(
            (sibling_before.pos_x, sibling_before.pos_y),
            (sibling_after.pos_x, sibling_after.pos_y)
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_layout_map_persists_computed_positions() -> Result<()> {
        let ctx = create_test_context().await?;

        let root = ctx.add_node("root", None).await?;
        let c1 = ctx.add_node("c1", Some(&root)).await?;
        let c2 = ctx.add_node("c2", Some(&root)).await?;

        let laid_out = ctx
            .maps
            .layout_map(&ctx.map_id, LayoutOptions::default())
            .await?;
        assert_eq!(laid_out.nodes.len(), 3);

        let by_id = |id: &str| {
            laid_out
                .nodes
                .iter()
                .find(|n| n.id == id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("node {} missing from layout result", id))
        };

        let root_node = by_id(&root)?;
        assert_eq!((root_node.pos_x, root_node.pos_y), (111.0, 0.0));

        assert_eq!(by_id(&c1)?.pos_y, 136.0);
        assert_eq!(by_id(&c2)?.pos_y, 136.0);

        let mut child_xs: Vec<f64> = vec![by_id(&c1)?.pos_x, by_id(&c2)?.pos_x];
        child_xs.sort_by(f64::total_cmp);
        assert_eq!(child_xs, vec![0.0, 222.0]);

        // Positions are persisted, not just returned.
        let stored_root = ctx.nodes.get_node(&root).await?;
        assert_eq!((stored_root.pos_x, stored_root.pos_y), (111.0, 0.0));

        Ok(())
    }

    #[tokio::test]
    async fn test_layout_map_rejects_a_stored_parent_ring() -> Result<()> {
        let ctx = create_test_context().await?;

        let a = ctx.add_node("a", None).await?;
        let b = ctx.add_node("b", Some(&a)).await?;

        // Corrupt the hierarchy behind the service's back: a -> b -> a.
        let mut raw = ctx.nodes.get_node(&a).await?;
        raw.parent_id = Some(b.clone());
        ctx.store.update_node(&raw).await?;

        let err = ctx
            .maps
            .layout_map(&ctx.map_id, LayoutOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::LayoutFailed(_)));

        // Subtree deletion still terminates and takes the whole ring.
        assert_eq!(ctx.nodes.delete_subtree(&a).await?, 2);

        Ok(())
    }
}
