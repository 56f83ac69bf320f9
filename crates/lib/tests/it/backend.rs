//! Storage contract checks, run against whichever backend TEST_BACKEND selects.

use arbor::{
    Bounds, NodeId, TreeId,
    backend::{Column, NewNode, RowFilter},
};

use crate::helpers::*;

fn new_node(tree: i64, left: i64, right: i64, name: &str) -> NewNode {
    NewNode {
        tree_id: TreeId::new(tree),
        bounds: Bounds::new(left, right),
        name: name.to_string(),
        data: serde_json::json!({"name": name}),
    }
}

/// root(1,8) > a(2,5) > c(3,4); root > b(6,7); other tree: x(1,2)
async fn seeded() -> (Box<dyn arbor::backend::BackendImpl>, Vec<NodeId>) {
    let backend = test_backend().await;
    let mut ids = Vec::new();
    {
        let mut tx = backend.begin().await.unwrap();
        for node in [
            new_node(1, 1, 8, "root"),
            new_node(1, 2, 5, "a"),
            new_node(1, 3, 4, "c"),
            new_node(1, 6, 7, "b"),
            new_node(2, 1, 2, "x"),
        ] {
            ids.push(tx.insert(node).await.unwrap().id);
        }
        tx.commit().await.unwrap();
    }
    (backend, ids)
}

#[tokio::test]
async fn test_select_orders_by_left() {
    let (backend, _) = seeded().await;

    let rows = backend.select(RowFilter::tree(TreeId::new(1))).await.unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["root", "a", "c", "b"]);

    let rows = backend
        .select(RowFilter::tree(TreeId::new(1)).right_at_least(5))
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);

    let rows = backend
        .select(RowFilter::tree(TreeId::new(1)).left_between(2, 4))
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].data, serde_json::json!({"name": "a"}));
}

#[tokio::test]
async fn test_roots() {
    let (backend, _) = seeded().await;
    let roots = backend.roots().await.unwrap();
    let names: Vec<&str> = roots.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["root", "x"]);
}

#[tokio::test]
async fn test_descendants_with_depth() {
    let (backend, ids) = seeded().await;

    let rows = backend.descendants(ids[0], None).await.unwrap();
    let summary: Vec<(&str, u32)> = rows.iter().map(|d| (d.row.name.as_str(), d.depth)).collect();
    assert_eq!(summary, vec![("a", 1), ("c", 2), ("b", 1)]);

    let rows = backend.descendants(ids[0], Some(1)).await.unwrap();
    assert_eq!(rows.len(), 2);

    let rows = backend.descendants(ids[1], None).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].depth, 1);

    assert!(backend.descendants(ids[4], None).await.unwrap().is_empty());

    let err = backend
        .descendants(NodeId::new(12345), None)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_increment_and_rollback() {
    let (backend, ids) = seeded().await;

    {
        let mut tx = backend.begin().await.unwrap();
        let updated = tx
            .increment(
                RowFilter::tree(TreeId::new(1)).left_between(2, 5),
                Column::BOTH,
                10,
            )
            .await
            .unwrap();
        assert_eq!(updated, 2);
        assert_eq!(tx.get(ids[1]).await.unwrap().bounds, Bounds::new(12, 15));
        // Dropped without commit.
    }
    assert_eq!(backend.get(ids[1]).await.unwrap().bounds, Bounds::new(2, 5));

    let mut tx = backend.begin().await.unwrap();
    let updated = tx
        .increment(
            RowFilter::tree(TreeId::new(1)).right_at_least(5),
            &[Column::Right],
            2,
        )
        .await
        .unwrap();
    assert_eq!(updated, 3);
    tx.commit().await.unwrap();

    assert_eq!(backend.get(ids[0]).await.unwrap().bounds, Bounds::new(1, 10));
    assert_eq!(backend.get(ids[1]).await.unwrap().bounds, Bounds::new(2, 7));
    assert_eq!(backend.get(ids[2]).await.unwrap().bounds, Bounds::new(3, 4));
}

#[tokio::test]
async fn test_set_tree_id_and_max() {
    let (backend, ids) = seeded().await;

    let mut tx = backend.begin().await.unwrap();
    assert_eq!(tx.max_tree_id().await.unwrap(), Some(TreeId::new(2)));
    tx.lock_tree(TreeId::new(1)).await.unwrap();
    tx.lock_tree(TreeId::new(7)).await.unwrap();

    let moved = tx
        .set_tree_id(RowFilter::tree(TreeId::new(1)).left_between(2, 5), TreeId::new(7))
        .await
        .unwrap();
    assert_eq!(moved, 2);
    assert_eq!(tx.max_tree_id().await.unwrap(), Some(TreeId::new(7)));
    tx.commit().await.unwrap();

    assert_eq!(backend.get(ids[2]).await.unwrap().tree_id, TreeId::new(7));
    assert_eq!(backend.get(ids[3]).await.unwrap().tree_id, TreeId::new(1));
}

#[tokio::test]
async fn test_empty_table() {
    let backend = test_backend().await;
    let mut tx = backend.begin().await.unwrap();
    assert_eq!(tx.max_tree_id().await.unwrap(), None);
    assert!(tx.get(NodeId::new(1)).await.unwrap_err().is_not_found());
}
