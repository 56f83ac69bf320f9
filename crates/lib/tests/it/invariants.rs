//! Randomized operation sequences, verifying every tree after each step.

use arbor::{ChildPosition, Forest, Node, SiblingPosition};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::helpers::*;

const STEPS: usize = 150;

async fn verify_everything(forest: &Forest, step: usize) {
    forest
        .verify_all()
        .await
        .unwrap_or_else(|e| panic!("invariants broken after step {step}: {e}"));

    let roots = forest.roots().await.unwrap();
    let mut trees: Vec<_> = roots.iter().map(|r| r.tree_id().unwrap()).collect();
    trees.dedup();
    assert_eq!(trees.len(), roots.len(), "one root per tree");
}

/// Every stored node, freshly read.
async fn all_nodes(forest: &Forest) -> Vec<Node> {
    let mut nodes = Vec::new();
    for root in forest.roots().await.unwrap() {
        for row in forest.tree_nodes(root.tree_id().unwrap()).await.unwrap() {
            nodes.push(forest.node(row.id).await.unwrap());
        }
    }
    nodes
}

async fn run(seed: u64) {
    let forest = test_forest().await;
    let mut rng = StdRng::seed_from_u64(seed);
    let _first = root(&forest, "root-0").await;

    for step in 0..STEPS {
        let mut nodes = all_nodes(&forest).await;
        let total = nodes.len();
        let target = rng.gen_range(0..total);
        let mut reference = nodes.swap_remove(target);

        let moving_existing = total > 1 && rng.gen_bool(0.4);
        let mut node = if moving_existing {
            nodes.swap_remove(rng.gen_range(0..nodes.len()))
        } else {
            forest.new_node(format!("n{step}"))
        };

        let result = match rng.gen_range(0..5) {
            0 => node.place_as_child(&mut reference, ChildPosition::First).await,
            1 => node.place_as_child(&mut reference, ChildPosition::Last).await,
            2 => {
                node.place_as_sibling(&mut reference, SiblingPosition::Previous)
                    .await
            }
            3 => node.place_as_sibling(&mut reference, SiblingPosition::Next).await,
            _ => node.make_root().await,
        };

        if let Err(err) = result {
            // Sibling of a root, or a move below its own subtree.
            assert!(err.is_validation_error(), "unexpected error: {err}");
        }
        verify_everything(&forest, step).await;
    }
}

#[tokio::test]
async fn test_random_sequence_seed_1() {
    run(1).await;
}

#[tokio::test]
async fn test_random_sequence_seed_42() {
    run(42).await;
}

#[tokio::test]
async fn test_detach_and_reinsert_round_trip() {
    let forest = test_forest().await;
    let mut rng = StdRng::seed_from_u64(7);
    let mut root = root(&forest, "root").await;

    let mut placed = vec![];
    for i in 0..20 {
        let mut parent = if placed.is_empty() || rng.gen_bool(0.3) {
            forest.node(root.id().unwrap()).await.unwrap()
        } else {
            let index = rng.gen_range(0..placed.len());
            forest.node(placed[index]).await.unwrap()
        };
        let node = child(&forest, &mut parent, &format!("n{i}")).await;
        placed.push(node.id().unwrap());
    }
    root.reload().await.unwrap();
    let before = layout(&forest, &root).await;
    let tree_id = root.tree_id().unwrap();

    // Put every node back where it already is: after its previous sibling,
    // or first below its parent.
    for id in placed {
        let rows = forest.tree_nodes(tree_id).await.unwrap();
        let mut node = forest.node(id).await.unwrap();
        let bounds = node.bounds().unwrap();

        if let Some(previous) = rows.iter().find(|r| r.bounds.right == bounds.left - 1) {
            let mut previous = forest.node(previous.id).await.unwrap();
            node.place_as_next_sibling(&mut previous).await.unwrap();
        } else {
            let parent = rows.iter().find(|r| r.bounds.left == bounds.left - 1).unwrap();
            let mut parent = forest.node(parent.id).await.unwrap();
            node.place_as_first_child(&mut parent).await.unwrap();
        }

        assert_eq!(layout(&forest, &root).await, before, "moving node {id}");
    }
}
