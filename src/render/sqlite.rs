//! Portable SQLite export
//!
//! Writes two tables into an SQLite file: `database_entities`, one row per
//! table or view with its creation statement, and `table_schema`, one row
//! per column. Each export runs in a single transaction and first removes
//! rows left by earlier exports of the same databases, so exporting the
//! same snapshot twice leaves exactly one copy.

use crate::error::RenderError;
use crate::model::{ddl, ServerSnapshot};
use chrono::Local;
use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CREATE_TABLES: &str = r#"
    CREATE TABLE IF NOT EXISTS database_entities (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        database_name TEXT NOT NULL,
        entity_type TEXT NOT NULL,
        entity_name TEXT NOT NULL,
        ddl TEXT
    );

    CREATE TABLE IF NOT EXISTS table_schema (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        database_name TEXT NOT NULL,
        table_name TEXT NOT NULL,
        column_name TEXT,
        data_type TEXT,
        nullable TEXT,
        default_value TEXT
    );
"#;

const INSERT_ENTITY: &str = "INSERT INTO database_entities (database_name, entity_type, entity_name, ddl) \
     VALUES (?1, ?2, ?3, ?4)";

const INSERT_COLUMN: &str = "INSERT INTO table_schema \
     (database_name, table_name, column_name, data_type, nullable, default_value) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

/// Row counts of one export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub entities: usize,
    pub columns: usize,
}

#[derive(Debug, Clone)]
pub struct SqliteExporter {
    path: PathBuf,
}

impl SqliteExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Timestamp-named file under `dir`, e.g. `postgres_to_sqlite_17Oct2026_09:30:00.sqlite`
    pub fn default_path(dir: &Path, source: &str) -> PathBuf {
        let stamp = Local::now().format("%d%b%Y_%H:%M:%S");
        dir.join(format!("{}_to_sqlite_{}.sqlite", source, stamp))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn export(&self, snapshot: &ServerSnapshot) -> Result<ExportSummary, RenderError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut conn = Connection::open(&self.path)?;
        conn.execute_batch(CREATE_TABLES)?;

        let tx = conn.transaction()?;
        let mut summary = ExportSummary::default();
        {
            let mut insert_entity = tx.prepare(INSERT_ENTITY)?;
            let mut insert_column = tx.prepare(INSERT_COLUMN)?;

            for db in &snapshot.databases {
                let removed = tx.execute(
                    "DELETE FROM database_entities WHERE database_name = ?1",
                    params![db.name],
                )?;
                tx.execute(
                    "DELETE FROM table_schema WHERE database_name = ?1",
                    params![db.name],
                )?;
                if removed > 0 {
                    debug!("Replacing {} earlier entities of database {}", removed, db.name);
                }

                for table in &db.tables {
                    insert_entity.execute(params![
                        db.name,
                        "table",
                        table.name,
                        ddl::create_table(table)
                    ])?;
                    summary.entities += 1;

                    for col in &table.columns {
                        insert_column.execute(params![
                            db.name,
                            table.name,
                            col.name,
                            col.declared_type,
                            if col.nullable { "YES" } else { "NO" },
                            col.default_expression,
                        ])?;
                        summary.columns += 1;
                    }
                }

                for view in &db.views {
                    insert_entity.execute(params![
                        db.name,
                        "view",
                        view.name,
                        ddl::create_view(view)
                    ])?;
                    summary.entities += 1;
                }
            }
        }
        tx.commit()?;

        debug!(
            "Committed {} entities and {} columns to {}",
            summary.entities,
            summary.columns,
            self.path.display()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnSpec, DatabaseSnapshot, TableSnapshot, ViewSnapshot};
    use pretty_assertions::assert_eq;

    fn snapshot() -> ServerSnapshot {
        let column = |name: &str, nullable: bool, default: Option<&str>, pos: i32| ColumnSpec {
            name: name.to_string(),
            declared_type: "integer".to_string(),
            nullable,
            default_expression: default.map(String::from),
            ordinal_position: pos,
        };

        ServerSnapshot {
            databases: vec![DatabaseSnapshot {
                name: "shop".to_string(),
                tables: vec![TableSnapshot {
                    name: "orders".to_string(),
                    columns: vec![column("id", false, None, 1), column("qty", true, Some("0"), 2)],
                    primary_key: vec!["id".to_string()],
                    foreign_keys: vec![],
                    unique_constraints: vec![],
                    unique_groups: vec![],
                    check_constraints: vec![],
                }],
                views: vec![ViewSnapshot {
                    name: "all_orders".to_string(),
                    definition: " SELECT orders.id\n   FROM orders".to_string(),
                }],
            }],
        }
    }

    fn entities(path: &Path) -> Vec<(String, String, String, String)> {
        let conn = Connection::open(path).unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT database_name, entity_type, entity_name, ddl \
                 FROM database_entities ORDER BY id",
            )
            .unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))
            .unwrap();
        rows.collect::<Result<Vec<_>, _>>().unwrap()
    }

    #[test]
    fn test_export_writes_entities_and_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.sqlite");
        let exporter = SqliteExporter::new(&path);

        let summary = exporter.export(&snapshot()).unwrap();
        assert_eq!(summary, ExportSummary { entities: 2, columns: 2 });

        let rows = entities(&path);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].1, "table");
        assert_eq!(rows[0].2, "orders");
        assert!(rows[0].3.starts_with("CREATE TABLE \"orders\" ("));
        assert_eq!(rows[1].1, "view");
        assert_eq!(
            rows[1].3,
            "CREATE OR REPLACE VIEW \"all_orders\" AS\n SELECT orders.id\n   FROM orders;"
        );

        let conn = Connection::open(&path).unwrap();
        let columns: Vec<(String, String, Option<String>)> = conn
            .prepare("SELECT column_name, nullable, default_value FROM table_schema ORDER BY id")
            .unwrap()
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            columns,
            vec![
                ("id".to_string(), "NO".to_string(), None),
                ("qty".to_string(), "YES".to_string(), Some("0".to_string())),
            ]
        );
    }

    #[test]
    fn test_export_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sqlite");
        let exporter = SqliteExporter::new(&path);

        exporter.export(&snapshot()).unwrap();
        let first = entities(&path);
        exporter.export(&snapshot()).unwrap();
        let second = entities(&path);

        let strip = |rows: Vec<(String, String, String, String)>| {
            rows.into_iter().map(|(db, ty, name, _)| (db, ty, name)).collect::<Vec<_>>()
        };
        assert_eq!(strip(first), strip(second.clone()));
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_other_databases_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sqlite");
        let exporter = SqliteExporter::new(&path);

        exporter.export(&snapshot()).unwrap();
        let mut other = snapshot();
        other.databases[0].name = "warehouse".to_string();
        exporter.export(&other).unwrap();

        let names: Vec<String> = entities(&path).into_iter().map(|r| r.0).collect();
        assert_eq!(names, vec!["shop", "shop", "warehouse", "warehouse"]);
    }

    #[test]
    fn test_default_path_is_timestamped() {
        let path = SqliteExporter::default_path(Path::new("./sqlite_output"), "postgres");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();

        assert!(path.starts_with("./sqlite_output"));
        assert!(name.starts_with("postgres_to_sqlite_"));
        assert!(name.ends_with(".sqlite"));
    }

    #[test]
    fn test_unwritable_location_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"not a directory").unwrap();

        let exporter = SqliteExporter::new(blocker.join("out.sqlite"));
        assert!(exporter.export(&snapshot()).is_err());
    }
}
