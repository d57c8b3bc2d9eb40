//! Performance benchmarks for Mindmapper core operations
//!
//! Run with: `cargo bench -p mindmapper-core`
//!
//! These benchmarks measure critical path performance:
//! - Arena construction and traversal over large maps
//! - Cycle checks against deep parent chains
//! - Transactional subtree deletion through the service stack

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mindmapper_core::db::{DatabaseService, MindmapStore, TursoStore};
use mindmapper_core::models::{CreateNode, MindMap, Node, User};
use mindmapper_core::services::NodeService;
use mindmapper_core::tree::MapTree;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::runtime::Runtime;

/// Build an in-memory node list shaped as a balanced tree: node `i` hangs
/// under node `(i - 1) / fanout`, so a fanout of 1 degenerates to a chain.
fn synthetic_nodes(count: usize, fanout: usize) -> Vec<Node> {
    (0..count)
        .map(|i| {
            let mut node = Node::new(CreateNode {
                map_id: "bench-map".to_string(),
                label: Some(format!("Node {}", i)),
                parent_id: if i == 0 {
                    None
                } else {
                    Some(format!("n{}", (i - 1) / fanout))
                },
                ..Default::default()
            });
            node.id = format!("n{}", i);
            node
        })
        .collect()
}

/// Seed a fresh database with one user, one map, and `count` nodes forming
/// a single subtree under the returned root id
async fn seed_subtree(count: usize, fanout: usize) -> (NodeService, String, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("bench.db");
    let db = Arc::new(DatabaseService::new(db_path).await.unwrap());
    let store: Arc<dyn MindmapStore> = Arc::new(TursoStore::new(db));

    let user = store
        .create_user(User::new(
            "bench".to_string(),
            "bench@example.com".to_string(),
            "$argon2id$fake-hash".to_string(),
        ))
        .await
        .unwrap();
    let map = store
        .create_map(MindMap::new(Some("Bench".to_string()), user.id))
        .await
        .unwrap();

    let mut ids: Vec<String> = Vec::with_capacity(count);
    for i in 0..count {
        let node = store
            .create_node(Node::new(CreateNode {
                map_id: map.id.clone(),
                label: Some(format!("Node {}", i)),
                parent_id: if i == 0 {
                    None
                } else {
                    Some(ids[(i - 1) / fanout].clone())
                },
                ..Default::default()
            }))
            .await
            .unwrap();
        ids.push(node.id);
    }

    let root_id = ids[0].clone();
    (NodeService::new(store), root_id, temp_dir)
}

/// Benchmark arena construction and traversal
///
/// Covers the per-request cost of rebuilding the children index from flat
/// rows and of collecting a full descendant set.
fn bench_arena(c: &mut Criterion) {
    let mut group = c.benchmark_group("arena");

    for &size in &[1_000usize, 10_000] {
        let nodes = synthetic_nodes(size, 4);
        group.bench_with_input(BenchmarkId::new("build", size), &nodes, |b, nodes| {
            b.iter(|| MapTree::build(black_box(nodes)))
        });

        let tree = MapTree::build(&nodes);
        group.bench_with_input(BenchmarkId::new("descendants", size), &tree, |b, tree| {
            b.iter(|| black_box(tree.descendant_ids("n0")))
        });
    }

    // The cycle check walks the parent chain, so a pure chain is its
    // worst case.
    let chain = MapTree::build(&synthetic_nodes(2_000, 1));
    group.bench_function("cycle_check_chain_2000", |b| {
        b.iter(|| black_box(chain.would_create_cycle("n0", "n1999")))
    });

    group.finish();
}

/// Benchmark transactional subtree deletion
///
/// Measures the full service path: load the map's rows, build the arena,
/// collect the subtree, and delete it inside one transaction. Each
/// iteration reseeds because the operation is destructive.
fn bench_subtree_delete(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("subtree_delete");
    group.sample_size(10);

    group.bench_function("delete_200_node_subtree", |b| {
        b.iter_custom(|iters| {
            rt.block_on(async {
                let mut total = std::time::Duration::ZERO;

                for _ in 0..iters {
                    let (nodes, root_id, _temp) = seed_subtree(200, 4).await;

                    let start = std::time::Instant::now();
                    black_box(nodes.delete_subtree(&root_id).await.unwrap());
                    total += start.elapsed();
                }

                total
            })
        });
    });

    group.finish();
}

criterion_group!(benches, bench_arena, bench_subtree_delete);
criterion_main!(benches);
