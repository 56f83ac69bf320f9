use arbor::{Error, Item, LoadOptions, LoadPolicy, node::NodeError};

use crate::helpers::*;

fn catalog() -> Vec<Item> {
    vec![
        Item::new("Electronics").with_children(vec![
            Item::new("Phones"),
            Item::new("Laptops").with_children(vec![Item::new("Ultrabooks")]),
        ]),
        Item::new("Books"),
    ]
}

/// An item nested `levels` deep.
fn chain(levels: usize) -> Item {
    let mut item = Item::new(format!("level-{levels}"));
    for level in (1..levels).rev() {
        item = Item::new(format!("level-{level}")).with_children(vec![item]);
    }
    item
}

#[tokio::test]
async fn test_build_forest() {
    let forest = test_forest().await;

    let summary = forest
        .build_forest(&catalog(), &LoadOptions::default())
        .await
        .unwrap();
    assert_eq!(summary.created, 6);
    assert_eq!(summary.skipped, 0);

    let root = summary.root;
    assert_eq!(root.name(), "Root Item");
    assert_eq!(root.size(), Some(11));
    assert_eq!(
        layout(&forest, &root).await,
        expect_layout(&[
            ("Root Item", 1, 12),
            ("Electronics", 2, 9),
            ("Phones", 3, 4),
            ("Laptops", 5, 8),
            ("Ultrabooks", 6, 7),
            ("Books", 10, 11),
        ])
    );
    forest.verify(root.tree_id().unwrap()).await.unwrap();
}

#[tokio::test]
async fn test_build_forest_with_root_name() {
    let forest = test_forest().await;
    let options = LoadOptions::default().with_root_name("Catalog");

    let summary = forest.build_forest(&[], &options).await.unwrap();
    assert_eq!(summary.root.name(), "Catalog");
    assert_eq!(summary.created, 1);
    assert!(summary.root.is_root());
}

#[tokio::test]
async fn test_too_deep_fails_before_writing() {
    let forest = test_forest().await;
    let options = LoadOptions::default().with_max_depth(3);

    let err = forest
        .build_forest(&[Item::new("ok"), chain(4)], &options)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Node(NodeError::HierarchyTooDeep { limit: 3 })
    ));
    assert!(forest.roots().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_skip_failed_items() {
    let forest = test_forest().await;
    let options = LoadOptions::default()
        .with_max_depth(3)
        .with_policy(LoadPolicy::SkipFailedItems);

    let summary = forest
        .build_forest(&[chain(3), chain(5), Item::new("last")], &options)
        .await
        .unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.created, 5);

    let mut root = summary.root;
    let names: Vec<String> = root
        .load_children(Some(1))
        .await
        .unwrap()
        .iter()
        .map(|n| n.name().to_string())
        .collect();
    assert_eq!(names, vec!["level-1", "last"]);
}
