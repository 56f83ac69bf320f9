//! Tree inspection commands.

use arbor::TreeId;

use crate::backend::open_forest;
use crate::cli::{BackendConfig, ShowArgs};
use crate::output::{NODE_HEADERS, OutputFormat, node_json, node_row, outline, print_table};

/// Run the `tree list` command
pub async fn list(
    config: &BackendConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let forest = open_forest(config).await?;
    let roots = forest.roots().await?;

    match format {
        OutputFormat::Human => {
            if roots.is_empty() {
                println!("No trees found.");
                return Ok(());
            }
            let rows: Vec<_> = roots.iter().map(node_row).collect();
            print_table(&NODE_HEADERS, &rows);
        }
        OutputFormat::Json => {
            let entries: Vec<_> = roots.iter().map(node_json).collect();
            println!("{}", serde_json::to_string(&entries)?);
        }
    }

    Ok(())
}

/// Run the `tree show` command
pub async fn show(
    args: &ShowArgs,
    config: &BackendConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let forest = open_forest(config).await?;
    let tree_id = TreeId::new(args.tree_id);

    let rows = forest.tree_nodes(tree_id).await?;
    let Some(root) = rows.iter().find(|row| row.bounds.is_root()) else {
        return Err(format!("Tree {tree_id} not found").into());
    };

    let mut root = forest.node(root.id).await?;
    root.load_children(args.depth).await?;

    match format {
        OutputFormat::Human => {
            for line in outline(&root) {
                println!("{line}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&node_json(&root))?),
    }

    Ok(())
}
