use std::sync::atomic::Ordering;

use arbor::{Bounds, Forest, TreeId};

use crate::helpers::*;

#[tokio::test]
async fn test_cross_tree_move() {
    let forest = test_forest().await;

    let mut source = root(&forest, "source").await;
    let mut p = child(&forest, &mut source, "p").await;
    let _c1 = child(&forest, &mut p, "c1").await;
    let _c2 = child(&forest, &mut p, "c2").await;
    let _q = child(&forest, &mut source, "q").await;

    let mut target = root(&forest, "target").await;
    let _r = child(&forest, &mut target, "r").await;

    source.reload().await.unwrap();
    p.reload().await.unwrap();
    assert_eq!(source.bounds(), Some(Bounds::new(1, 10)));
    assert_eq!(p.size(), Some(5));

    p.place_as_last_child(&mut target).await.unwrap();

    assert_eq!(p.tree_id(), target.tree_id());
    assert_eq!(p.bounds(), Some(Bounds::new(4, 9)));
    assert_eq!(target.bounds(), Some(Bounds::new(1, 10)));
    assert_eq!(
        layout(&forest, &source).await,
        expect_layout(&[("source", 1, 4), ("q", 2, 3)])
    );
    assert_eq!(
        layout(&forest, &target).await,
        expect_layout(&[
            ("target", 1, 10),
            ("r", 2, 3),
            ("p", 4, 9),
            ("c1", 5, 6),
            ("c2", 7, 8),
        ])
    );
    forest.verify_all().await.unwrap();
}

#[tokio::test]
async fn test_replacing_in_place_keeps_boundaries() {
    let forest = test_forest().await;
    let mut root = root(&forest, "root").await;
    let mut a = child(&forest, &mut root, "a").await;
    let _x = child(&forest, &mut a, "x").await;
    let mut b = child(&forest, &mut root, "b").await;
    let before = layout(&forest, &root).await;

    a.place_as_first_child(&mut root).await.unwrap();
    assert_eq!(layout(&forest, &root).await, before);

    b.place_as_next_sibling(&mut a).await.unwrap();
    assert_eq!(layout(&forest, &root).await, before);
}

#[tokio::test]
async fn test_move_within_tree() {
    let forest = test_forest().await;
    let mut root = root(&forest, "root").await;
    let mut a = child(&forest, &mut root, "a").await;
    let _x = child(&forest, &mut a, "x").await;
    let mut b = child(&forest, &mut root, "b").await;

    a.place_as_next_sibling(&mut b).await.unwrap();
    assert_eq!(a.bounds(), Some(Bounds::new(4, 7)));
    assert_eq!(b.bounds(), Some(Bounds::new(2, 3)));
    assert_eq!(
        layout(&forest, &root).await,
        expect_layout(&[("root", 1, 8), ("b", 2, 3), ("a", 4, 7), ("x", 5, 6)])
    );

    // And back again.
    a.place_as_previous_sibling(&mut b).await.unwrap();
    assert_eq!(
        layout(&forest, &root).await,
        expect_layout(&[("root", 1, 8), ("a", 2, 5), ("x", 3, 4), ("b", 6, 7)])
    );
}

#[tokio::test]
async fn test_make_root_of_subtree() {
    let forest = test_forest().await;
    let mut root = root(&forest, "root").await;
    let mut a = child(&forest, &mut root, "a").await;
    let _b = child(&forest, &mut a, "b").await;
    let _c = child(&forest, &mut root, "c").await;

    a.make_root().await.unwrap();

    assert!(a.is_root());
    assert_eq!(a.tree_id(), Some(TreeId::new(2)));
    assert_eq!(
        layout(&forest, &a).await,
        expect_layout(&[("a", 1, 4), ("b", 2, 3)])
    );
    assert_eq!(
        layout(&forest, &root).await,
        expect_layout(&[("root", 1, 4), ("c", 2, 3)])
    );
    assert_eq!(forest.verify_all().await.unwrap(), 2);
}

#[tokio::test]
async fn test_make_root_on_root_is_free() {
    let (backend, calls) = CountingBackend::new();
    let forest = Forest::new(Box::new(backend));

    let mut root = root(&forest, "root").await;
    let before = calls.load(Ordering::SeqCst);

    root.make_root().await.unwrap();
    root.make_root().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), before);
    assert_eq!(root.bounds(), Some(Bounds::ROOT));
}

#[tokio::test]
async fn test_moving_a_root_merges_trees() {
    let forest = test_forest().await;
    let mut first = root(&forest, "first").await;
    let mut second = root(&forest, "second").await;
    let _leaf = child(&forest, &mut second, "leaf").await;

    second.place_as_first_child(&mut first).await.unwrap();

    assert_eq!(second.tree_id(), first.tree_id());
    assert_eq!(
        layout(&forest, &first).await,
        expect_layout(&[("first", 1, 6), ("second", 2, 5), ("leaf", 3, 4)])
    );
    let roots = forest.roots().await.unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(forest.tree_nodes(TreeId::new(2)).await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_make_root_takes_next_tree_id() {
    let forest = test_forest().await;
    let mut first = root(&forest, "first").await;
    let mut a = child(&forest, &mut first, "a").await;
    let _second = root(&forest, "second").await;
    let third = root(&forest, "third").await;
    assert_eq!(third.tree_id(), Some(TreeId::new(3)));

    a.make_root().await.unwrap();

    assert_eq!(a.tree_id(), Some(TreeId::new(4)));
    assert_eq!(a.bounds(), Some(Bounds::ROOT));
    first.reload().await.unwrap();
    assert_eq!(first.bounds(), Some(Bounds::ROOT));
    assert_eq!(forest.verify_all().await.unwrap(), 4);
}
