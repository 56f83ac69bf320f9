//! CLI argument definitions for the Arbor binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Storage backend type
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Backend {
    /// SQLite database (default)
    Sqlite,
    /// PostgreSQL database
    Postgres,
    /// In-memory with JSON persistence
    Inmemory,
}

/// Where a node goes relative to the reference node
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Position {
    /// First child of the reference
    FirstChild,
    /// Last child of the reference
    LastChild,
    /// Sibling immediately before the reference
    Previous,
    /// Sibling immediately after the reference
    Next,
}

/// Arbor nested-set forest tool
#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(about = "Arbor: inspect and edit nested-set forests")]
#[command(version)]
pub struct Cli {
    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub backend_config: BackendConfig,

    #[command(subcommand)]
    pub command: Commands,
}

/// Storage selection shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct BackendConfig {
    /// Storage backend to use
    #[arg(short, long, default_value = "sqlite", env = "ARBOR_BACKEND", global = true)]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For SQLite: stores arbor.db
    /// For InMemory: stores arbor.json
    #[arg(short = 'D', long, env = "ARBOR_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// PostgreSQL connection URL (required when backend=postgres)
    #[arg(long, env = "ARBOR_POSTGRES_URL", global = true)]
    pub postgres_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect trees
    #[command(subcommand)]
    Tree(TreeCommand),
    /// Create and move nodes
    #[command(subcommand)]
    Node(NodeCommand),
    /// Load a JSON file of items below a new root
    Import(ImportArgs),
    /// Verify nested-set invariants
    Check(CheckArgs),
}

#[derive(Subcommand, Debug)]
pub enum TreeCommand {
    /// List the root of every tree
    List,
    /// Print the hierarchy of one tree
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Tree to print
    pub tree_id: i64,

    /// Only print this many levels below the root
    #[arg(short, long)]
    pub depth: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum NodeCommand {
    /// Create a node
    Add(AddArgs),
    /// Move an existing node together with its subtree
    Move(MoveArgs),
}

/// Target of a placement
#[derive(clap::Args, Debug)]
pub struct TargetArgs {
    /// Reference node; the node becomes a new root when omitted
    #[arg(short, long)]
    pub reference: Option<i64>,

    /// Where to put the node relative to the reference
    #[arg(short, long, default_value = "last-child")]
    pub position: Position,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Name of the new node
    pub name: String,

    /// JSON payload stored with the node
    #[arg(long)]
    pub data: Option<String>,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    /// Node to move
    pub id: i64,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// JSON file holding an array of `{"label": ..., "children": [...]}` items
    pub file: PathBuf,

    /// Name of the synthetic root
    #[arg(long)]
    pub root_name: Option<String>,

    /// Reject items nested deeper than this
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Keep going when a top-level item fails
    #[arg(long)]
    pub skip_failed: bool,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Tree to verify; every tree when omitted
    pub tree_id: Option<i64>,
}
