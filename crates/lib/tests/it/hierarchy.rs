use std::sync::atomic::Ordering;

use arbor::{Children, Error, Forest, node::NodeError};

use crate::helpers::*;

fn names(nodes: &[arbor::Node]) -> Vec<&str> {
    nodes.iter().map(|n| n.name()).collect()
}

#[tokio::test]
async fn test_load_children_rebuilds_nesting() {
    let forest = test_forest().await;
    let mut root = root(&forest, "root").await;
    let _a = child(&forest, &mut root, "A").await;
    let mut b = child(&forest, &mut root, "B").await;
    let _c = child(&forest, &mut b, "C").await;

    let children = root.load_children(None).await.unwrap();
    assert_eq!(names(children), vec!["A", "B"]);

    assert!(children[0].children().is_empty());
    match children[1].children() {
        Children::Loaded(below) => {
            assert_eq!(names(below), vec!["C"]);
            assert!(below[0].children().is_empty());
        }
        other => panic!("B should have loaded children, got {other:?}"),
    }
}

#[tokio::test]
async fn test_depth_limit() {
    let forest = test_forest().await;
    let mut root = root(&forest, "root").await;
    let mut a = child(&forest, &mut root, "a").await;
    let mut b = child(&forest, &mut a, "b").await;
    let _c = child(&forest, &mut b, "c").await;
    let _d = child(&forest, &mut root, "d").await;

    let children = root.load_children(Some(1)).await.unwrap();
    assert_eq!(names(children), vec!["a", "d"]);
    assert!(children[0].children().is_unloaded());
    assert!(children[1].children().is_empty());

    let mut a = forest.node(a.id().unwrap()).await.unwrap();
    let below_a = a.load_children(Some(2)).await.unwrap();
    assert_eq!(names(below_a), vec!["b"]);
    assert_eq!(names(below_a[0].children().as_slice()), vec!["c"]);
}

#[tokio::test]
async fn test_leaf_is_cached_as_empty() {
    let (backend, calls) = CountingBackend::new();
    let forest = Forest::new(Box::new(backend));
    let mut root = root(&forest, "root").await;

    assert!(root.load_children(None).await.unwrap().is_empty());
    assert!(root.children().is_empty());

    let before = calls.load(Ordering::SeqCst);
    assert!(root.load_children(None).await.unwrap().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), before);
}

#[tokio::test]
async fn test_loaded_children_are_cached() {
    let (backend, calls) = CountingBackend::new();
    let forest = Forest::new(Box::new(backend));
    let mut root = root(&forest, "root").await;
    let _a = child(&forest, &mut root, "a").await;

    assert_eq!(root.load_children(None).await.unwrap().len(), 1);
    let before = calls.load(Ordering::SeqCst);
    assert_eq!(root.load_children(None).await.unwrap().len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), before);
}

#[tokio::test]
async fn test_mutation_invalidates_cache() {
    let forest = test_forest().await;
    let mut root = root(&forest, "root").await;
    let mut a = child(&forest, &mut root, "a").await;
    assert_eq!(root.load_children(None).await.unwrap().len(), 1);
    assert!(a.load_children(None).await.unwrap().is_empty());

    let mut b = forest.new_node("b");
    b.place_as_next_sibling(&mut a).await.unwrap();
    assert!(a.children().is_unloaded());

    // The root was not involved, so its cache is stale until reloaded.
    assert_eq!(root.children().as_slice().len(), 1);
    root.reload().await.unwrap();
    assert_eq!(names(root.load_children(None).await.unwrap()), vec!["a", "b"]);

    let mut c = forest.new_node("c");
    c.place_as_first_child(&mut root).await.unwrap();
    assert!(root.children().is_unloaded());
    assert_eq!(
        names(root.load_children(None).await.unwrap()),
        vec!["c", "a", "b"]
    );
}

#[tokio::test]
async fn test_transient_node_has_no_children() {
    let forest = test_forest().await;
    let mut node = forest.new_node("node");

    let err = node.load_children(None).await.unwrap_err();
    assert!(matches!(err, Error::Node(NodeError::NotPersisted)));
    assert!(node.children().is_unloaded());
}

#[tokio::test]
async fn test_zero_depth_limit_keeps_children_unloaded() {
    let forest = test_forest().await;
    let mut root = root(&forest, "root").await;
    let _a = child(&forest, &mut root, "a").await;

    assert!(root.load_children(Some(0)).await.unwrap().is_empty());
    assert!(root.children().is_unloaded());

    assert_eq!(names(root.load_children(None).await.unwrap()), vec!["a"]);
}
