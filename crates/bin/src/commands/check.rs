//! Invariant verification command.

use arbor::TreeId;

use crate::backend::{backend_label, open_forest};
use crate::cli::{BackendConfig, CheckArgs};
use crate::output::OutputFormat;

/// Run the `check` command
///
/// Fails with the first violation found.
pub async fn run(
    args: &CheckArgs,
    config: &BackendConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let forest = open_forest(config).await?;

    let trees = match args.tree_id {
        Some(tree_id) => {
            forest.verify(TreeId::new(tree_id)).await?;
            1
        }
        None => forest.verify_all().await?,
    };

    let backend = backend_label(config);
    match format {
        OutputFormat::Human => {
            println!("Backend:  {backend}");
            println!("Trees:    {trees} ok");
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "backend": backend,
                "trees": trees,
                "ok": true,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
