//! Node creation and move commands.

use arbor::{ChildPosition, Forest, Node, NodeId, SiblingPosition};

use crate::backend::{open_forest, persist};
use crate::cli::{AddArgs, BackendConfig, MoveArgs, Position, TargetArgs};
use crate::output::{NODE_HEADERS, OutputFormat, node_json, node_row, print_table};

/// Place `node` where `target` says, reading the reference first.
async fn place(forest: &Forest, node: &mut Node, target: &TargetArgs) -> arbor::Result<()> {
    let Some(reference) = target.reference else {
        return node.make_root().await;
    };
    let mut reference = forest.node(NodeId::new(reference)).await?;

    match target.position {
        Position::FirstChild => node.place_as_child(&mut reference, ChildPosition::First).await,
        Position::LastChild => node.place_as_child(&mut reference, ChildPosition::Last).await,
        Position::Previous => {
            node.place_as_sibling(&mut reference, SiblingPosition::Previous)
                .await
        }
        Position::Next => node.place_as_sibling(&mut reference, SiblingPosition::Next).await,
    }
}

fn report(node: &Node, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Human => print_table(&NODE_HEADERS, &[node_row(node)]),
        OutputFormat::Json => println!("{}", serde_json::to_string(&node_json(node))?),
    }
    Ok(())
}

/// Run the `node add` command
pub async fn add(
    args: &AddArgs,
    config: &BackendConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let forest = open_forest(config).await?;

    let mut node = forest.new_node(args.name.as_str());
    if let Some(data) = &args.data {
        node = node.with_data(serde_json::from_str(data)?);
    }
    place(&forest, &mut node, &args.target).await?;
    persist(&forest, config).await?;

    tracing::info!("Created node {}", node.name());
    report(&node, format)
}

/// Run the `node move` command
pub async fn move_node(
    args: &MoveArgs,
    config: &BackendConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let forest = open_forest(config).await?;

    let mut node = forest.node(NodeId::new(args.id)).await?;
    place(&forest, &mut node, &args.target).await?;
    persist(&forest, config).await?;

    report(&node, format)
}
