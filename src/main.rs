//! schemadump - database schema metadata extraction
//!
//! Walks the system catalogs of a database server and captures tables,
//! columns, keys, constraints and views into an immutable snapshot, then
//! hands that snapshot to one renderer:
//! - Text: a fixed-format report on stdout
//! - SQLite: a portable file for offline inspection

mod assembler;
mod catalog;
mod cli;
mod config;
mod connection;
mod error;
mod filter;
mod model;
mod render;

use crate::assembler::MetadataAssembler;
use crate::catalog::PostgresCatalog;
use crate::cli::Cli;
use crate::config::Settings;
use crate::connection::Engine;
use crate::error::ExtractError;
use crate::render::RenderSummary;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    // Unsupported engines fail before configuration is read or anything connects
    let engine = cli.engine.ensure_supported()?;

    let mut settings = Settings::load().map_err(ExtractError::from)?;
    if let Some(schema) = &cli.schema {
        settings.extract.schema = schema.clone();
    }
    info!(
        "Configuration loaded: {}@{}:{} schema {}",
        settings.database.user, settings.database.host, settings.database.port, settings.extract.schema
    );

    let filter = cli.exclusion_filter(&settings.extract);
    info!("Excluding names containing {:?}", filter.patterns());
    let renderer = cli.renderer(&settings);

    let snapshot = match engine {
        Engine::Postgres => {
            let reader = PostgresCatalog::new(settings.database.clone(), settings.extract.schema.clone());
            MetadataAssembler::new(&reader, &filter, cli.scope())
                .extract()
                .await
                .inspect_err(|e| match e.object() {
                    Some(object) => error!("Extraction failed at {}: {}", object, e),
                    None => error!("Extraction failed: {}", e),
                })?
        }
        Engine::SqlServer => return Err(ExtractError::UnsupportedEngine(engine).into()),
    };

    match renderer.render(&snapshot) {
        Ok(RenderSummary::Text { bytes }) => info!("Wrote {} bytes of text report", bytes),
        Ok(RenderSummary::PortableFile { path, entities, columns }) => info!(
            "SQLite Exported to: {} ({} entities, {} columns)",
            path.display(),
            entities,
            columns
        ),
        Err(e) => {
            error!("Rendering failed: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}

/// Initialize tracing with structured logging on stderr
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .compact(),
        )
        .init();
}
