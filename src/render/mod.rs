//! Renderers
//!
//! Consumers of a finished [`ServerSnapshot`]. A renderer never queries the
//! source database; it only formats or exports the model it is given.

pub mod sqlite;
pub mod text;

use crate::error::RenderError;
use crate::model::ServerSnapshot;
use std::path::PathBuf;

pub use sqlite::SqliteExporter;
pub use text::TextRenderer;

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    #[value(name = "text", alias = "1")]
    Text,
    #[value(name = "sqlite", alias = "2")]
    Sqlite,
}

/// The closed set of renderers
#[derive(Debug)]
pub enum Renderer {
    Text(TextRenderer),
    PortableFile(SqliteExporter),
}

/// What a render produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderSummary {
    Text { bytes: usize },
    PortableFile { path: PathBuf, entities: usize, columns: usize },
}

impl Renderer {
    pub fn render(&self, snapshot: &ServerSnapshot) -> Result<RenderSummary, RenderError> {
        match self {
            Renderer::Text(renderer) => {
                let bytes = renderer.render_to_stdout(snapshot)?;
                Ok(RenderSummary::Text { bytes })
            }
            Renderer::PortableFile(exporter) => {
                let summary = exporter.export(snapshot)?;
                Ok(RenderSummary::PortableFile {
                    path: exporter.path().to_path_buf(),
                    entities: summary.entities,
                    columns: summary.columns,
                })
            }
        }
    }
}
