//! Bulk import of a JSON item file.

use arbor::{Item, LoadOptions, LoadPolicy};

use crate::backend::{open_forest, persist};
use crate::cli::{BackendConfig, ImportArgs};
use crate::output::{OutputFormat, node_row, print_table};

/// Run the `import` command
pub async fn run(
    args: &ImportArgs,
    config: &BackendConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let contents = tokio::fs::read_to_string(&args.file).await?;
    let items: Vec<Item> = serde_json::from_str(&contents)?;

    let mut options = LoadOptions::default();
    if let Some(name) = &args.root_name {
        options = options.with_root_name(name.as_str());
    }
    if let Some(depth) = args.max_depth {
        options = options.with_max_depth(depth);
    }
    if args.skip_failed {
        options = options.with_policy(LoadPolicy::SkipFailedItems);
    }

    let forest = open_forest(config).await?;
    let summary = forest.build_forest(&items, &options).await?;
    persist(&forest, config).await?;

    match format {
        OutputFormat::Human => {
            print_table(&["ID", "TREE", "LEFT", "RIGHT", "ROOT"], &[node_row(&summary.root)]);
            println!();
            println!("Created:  {}", summary.created);
            println!("Skipped:  {}", summary.skipped);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "root": summary.root.id().map(|id| id.get()),
                "tree_id": summary.root.tree_id().map(|t| t.get()),
                "created": summary.created,
                "skipped": summary.skipped,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
