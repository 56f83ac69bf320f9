use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod commands;
mod output;

use cli::{Cli, Commands, NodeCommand, TreeCommand};
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so JSON output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("arbor=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::from_flag(cli.json);
    let config = &cli.backend_config;

    match &cli.command {
        Commands::Tree(TreeCommand::List) => commands::tree::list(config, format).await,
        Commands::Tree(TreeCommand::Show(args)) => commands::tree::show(args, config, format).await,
        Commands::Node(NodeCommand::Add(args)) => commands::node::add(args, config, format).await,
        Commands::Node(NodeCommand::Move(args)) => {
            commands::node::move_node(args, config, format).await
        }
        Commands::Import(args) => commands::import::run(args, config, format).await,
        Commands::Check(args) => commands::check::run(args, config, format).await,
    }
}
