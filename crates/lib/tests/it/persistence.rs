use std::fs;
use std::io::Write;

use arbor::{Forest, Item, LoadOptions, backend::database::InMemory};
use tempfile::TempDir;

use crate::helpers::*;

#[tokio::test]
async fn test_in_memory_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("arbor.json");

    let tree_id = {
        let backend = InMemory::new();
        let forest = Forest::new(Box::new(backend));
        let items = vec![Item::new("a").with_children(vec![Item::new("b")])];
        let summary = forest
            .build_forest(&items, &LoadOptions::default())
            .await
            .unwrap();

        let backend = forest
            .backend()
            .as_any()
            .downcast_ref::<InMemory>()
            .unwrap();
        backend.save_to_file(&path).await.unwrap();
        summary.root.tree_id().unwrap()
    };
    assert!(path.exists());

    let forest = Forest::new(Box::new(InMemory::load_from_file(&path).await.unwrap()));
    let root = &forest.roots().await.unwrap()[0];
    assert_eq!(root.tree_id(), Some(tree_id));
    assert_eq!(
        layout(&forest, root).await,
        expect_layout(&[("Root Item", 1, 6), ("a", 2, 5), ("b", 3, 4)])
    );

    // Ids keep counting from where the saved table stopped.
    let mut root = forest.node(root.id().unwrap()).await.unwrap();
    let c = child(&forest, &mut root, "c").await;
    assert_eq!(c.id().unwrap().get(), 4);
}

#[tokio::test]
async fn test_load_non_existent_file() {
    let dir = TempDir::new().unwrap();
    let backend = InMemory::load_from_file(dir.path().join("missing.json"))
        .await
        .unwrap();
    assert!(backend.all_ids().await.is_empty());
}

#[tokio::test]
async fn test_load_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("invalid.json");
    {
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "{{invalid json").unwrap();
    }

    let err = InMemory::load_from_file(&path).await.unwrap_err();
    assert!(err.is_io_error());
}
