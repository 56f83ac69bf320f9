//! Concurrent writers sharing one forest.

use arbor::{Forest, NodeId, TreeId};

use crate::helpers::*;

const WRITERS: usize = 8;

/// The test backend, except that SQLite uses a file database so that writers
/// wait on the busy timeout instead of failing on shared-cache table locks.
#[cfg_attr(not(feature = "sqlite"), allow(unused_variables))]
async fn shared_forest(dir: &tempfile::TempDir) -> Forest {
    match std::env::var("TEST_BACKEND").as_deref() {
        #[cfg(feature = "sqlite")]
        Ok("sqlite") => {
            use arbor::backend::database::Sqlite;
            let backend = Sqlite::open(dir.path().join("arbor.db"))
                .await
                .expect("Failed to open SQLite backend");
            Forest::new(Box::new(backend))
        }
        _ => test_forest().await,
    }
}

async fn writer(forest: Forest, index: usize, left: NodeId, right: NodeId) {
    let mut left_root = forest.node(left).await.unwrap();
    let mut right_root = forest.node(right).await.unwrap();

    let mut p = forest.new_node(format!("p{index}"));
    p.place_as_last_child(&mut left_root).await.unwrap();
    let mut q = forest.new_node(format!("q{index}"));
    q.place_as_first_child(&mut right_root).await.unwrap();

    // Cross-tree moves lock both trees.
    p.place_as_last_child(&mut right_root).await.unwrap();
    q.place_as_first_child(&mut p).await.unwrap();

    let mut own = forest.new_node(format!("t{index}"));
    own.make_root().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_keep_trees_valid() {
    let dir = tempfile::TempDir::new().unwrap();
    let forest = shared_forest(&dir).await;
    let left = root(&forest, "left").await;
    let right = root(&forest, "right").await;
    let (left_id, right_id) = (left.id().unwrap(), right.id().unwrap());

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| tokio::spawn(writer(forest.clone(), i, left_id, right_id)))
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(forest.verify_all().await.unwrap(), 2 + WRITERS);

    let left_rows = forest.tree_nodes(left.tree_id().unwrap()).await.unwrap();
    assert_eq!(left_rows.len(), 1);
    let right_rows = forest.tree_nodes(right.tree_id().unwrap()).await.unwrap();
    assert_eq!(right_rows.len(), 1 + 2 * WRITERS);

    // Every writer got its own tree id.
    let mut trees: Vec<TreeId> = forest
        .roots()
        .await
        .unwrap()
        .iter()
        .filter_map(|r| r.tree_id())
        .collect();
    trees.dedup();
    assert_eq!(trees.len(), 2 + WRITERS);
}
