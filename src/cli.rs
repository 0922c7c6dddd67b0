//! Command-line interface

use crate::assembler::DatabaseScope;
use crate::config::{ExtractConfig, Settings};
use crate::connection::Engine;
use crate::filter::ExclusionFilter;
use crate::render::{OutputFormat, Renderer, SqliteExporter, TextRenderer};
use clap::Parser;
use std::path::PathBuf;

/// Dump table, column, constraint and view metadata of a database server
#[derive(Parser, Debug)]
#[command(name = "schemadump", version, about)]
pub struct Cli {
    /// Source engine: postgres (1) or sqlserver (2)
    #[arg(value_enum)]
    pub engine: Engine,

    /// Output format: text (1) or sqlite (2)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// SQLite file to write instead of the timestamped default
    #[arg(long, value_name = "PATH")]
    pub out_file: Option<PathBuf>,

    /// Extract only this database instead of every connectable one.
    /// DB_NAME only selects the database used to list the others.
    #[arg(short, long, value_name = "NAME")]
    pub database: Option<String>,

    /// Schema to read in each database (default: DB_SCHEMA or public)
    #[arg(long, value_name = "NAME")]
    pub schema: Option<String>,

    /// Name substrings to exclude; replaces the configured patterns
    #[arg(long = "exclude", value_name = "PATTERN", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Do not exclude any table or view
    #[arg(long, conflicts_with = "exclude")]
    pub no_exclude: bool,
}

impl Cli {
    pub fn scope(&self) -> DatabaseScope {
        match &self.database {
            Some(name) => DatabaseScope::Single(name.clone()),
            None => DatabaseScope::All,
        }
    }

    pub fn exclusion_filter(&self, config: &ExtractConfig) -> ExclusionFilter {
        if self.no_exclude {
            ExclusionFilter::new(Vec::<String>::new())
        } else if !self.exclude.is_empty() {
            ExclusionFilter::new(&self.exclude)
        } else if let Some(patterns) = &config.exclude_patterns {
            ExclusionFilter::new(patterns)
        } else {
            ExclusionFilter::default()
        }
    }

    pub fn renderer(&self, settings: &Settings) -> Renderer {
        match self.output {
            OutputFormat::Text => Renderer::Text(TextRenderer),
            OutputFormat::Sqlite => {
                let path = self.out_file.clone().unwrap_or_else(|| {
                    SqliteExporter::default_path(&settings.output.sqlite_dir, &self.engine.to_string())
                });
                Renderer::PortableFile(SqliteExporter::new(path))
            }
        }
    }
}
