//! Backend creation and utility functions.

use std::path::PathBuf;

use arbor::{
    Forest,
    backend::{
        BackendImpl,
        database::{InMemory, Postgres, Sqlite},
    },
};

use crate::cli::{Backend, BackendConfig};

/// Redact credentials from a PostgreSQL connection URL for safe logging
pub fn redact_postgres_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut redacted = parsed.clone();
        if !parsed.username().is_empty() {
            let _ = redacted.set_username("***");
        }
        if parsed.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted.to_string()
    } else {
        "postgres://***@<unparsable-url>".to_string()
    }
}

fn data_dir(config: &BackendConfig) -> PathBuf {
    config.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
}

fn json_path(config: &BackendConfig) -> PathBuf {
    data_dir(config).join("arbor.json")
}

/// Create the appropriate backend based on configuration
pub async fn create_backend(
    config: &BackendConfig,
) -> Result<Box<dyn BackendImpl>, Box<dyn std::error::Error>> {
    let data_dir = data_dir(config);
    tokio::fs::create_dir_all(&data_dir).await?;

    match config.backend {
        Backend::Sqlite => {
            let db_path = data_dir.join("arbor.db");
            tracing::info!("Using SQLite backend at {}", db_path.display());
            Ok(Box::new(Sqlite::open(&db_path).await?))
        }
        Backend::Postgres => {
            let url = config
                .postgres_url
                .as_ref()
                .ok_or("PostgreSQL backend requires --postgres-url or ARBOR_POSTGRES_URL")?;

            let display_url = redact_postgres_url(url);
            tracing::info!("Connecting to PostgreSQL backend at {}", display_url);

            match Postgres::connect(url).await {
                Ok(backend) => Ok(Box::new(backend)),
                Err(e) => {
                    Err(format!("Failed to connect to PostgreSQL at {display_url}: {e}").into())
                }
            }
        }
        Backend::Inmemory => {
            let json_path = json_path(config);
            tracing::info!(
                "Using in-memory backend with persistence at {}",
                json_path.display()
            );
            // A missing file yields an empty table.
            Ok(Box::new(InMemory::load_from_file(&json_path).await?))
        }
    }
}

/// Open the forest described by `config`.
pub async fn open_forest(config: &BackendConfig) -> Result<Forest, Box<dyn std::error::Error>> {
    Ok(Forest::new(create_backend(config).await?))
}

/// Write the in-memory table back to its JSON file. SQL backends have
/// already committed.
pub async fn persist(
    forest: &Forest,
    config: &BackendConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(in_memory) = forest.backend().as_any().downcast_ref::<InMemory>() {
        let path = json_path(config);
        in_memory.save_to_file(&path).await?;
        tracing::debug!("Saved forest to {}", path.display());
    }
    Ok(())
}

/// Short label for the configured backend.
pub fn backend_label(config: &BackendConfig) -> String {
    match config.backend {
        Backend::Sqlite => format!("sqlite ({})", data_dir(config).join("arbor.db").display()),
        Backend::Postgres => match &config.postgres_url {
            Some(url) => format!("postgres ({})", redact_postgres_url(url)),
            None => "postgres".to_string(),
        },
        Backend::Inmemory => format!("inmemory ({})", json_path(config).display()),
    }
}
