//! PostgreSQL catalog reader
//!
//! Reads `information_schema` and `pg_catalog` for one schema of every
//! database. PostgreSQL connections are bound to a single database, so each
//! session opens its own connection.

use super::queries;
use super::{CatalogReader, CatalogResult, DatabaseCatalog, ForeignKeyRow, KeyColumnRow};
use crate::config::DatabaseConfig;
use crate::connection::{self, PooledConnection};
use crate::error::CatalogError;
use crate::model::{CheckConstraintSpec, ColumnSpec};
use async_trait::async_trait;
use tokio_postgres::Row;
use tracing::debug;

/// Catalog reader for a PostgreSQL server
pub struct PostgresCatalog {
    config: DatabaseConfig,
    schema: String,
}

impl PostgresCatalog {
    pub fn new(config: DatabaseConfig, schema: impl Into<String>) -> Self {
        Self {
            config,
            schema: schema.into(),
        }
    }
}

#[async_trait]
impl CatalogReader for PostgresCatalog {
    type Session = PostgresSession;

    async fn list_databases(&self) -> CatalogResult<Vec<String>> {
        let conn = connection::connect(&self.config, &self.config.database).await?;
        let rows = conn.client().query(queries::LIST_DATABASES, &[]).await?;

        Ok(rows.iter().map(|row| row.get("datname")).collect())
    }

    async fn open(&self, database: &str) -> CatalogResult<PostgresSession> {
        let conn = connection::connect(&self.config, database).await?;

        Ok(PostgresSession {
            conn,
            database: database.to_string(),
            schema: self.schema.clone(),
        })
    }
}

/// Connection to one database, scoped to one schema
pub struct PostgresSession {
    conn: PooledConnection,
    database: String,
    schema: String,
}

impl PostgresSession {
    async fn names(&self, query: &str, column: &str) -> CatalogResult<Vec<String>> {
        let rows = self.conn.client().query(query, &[&self.schema]).await?;
        Ok(rows.iter().map(|row| row.get(column)).collect())
    }

    async fn per_object(&self, query: &str, object: &str) -> CatalogResult<Vec<Row>> {
        Ok(self.conn.client().query(query, &[&self.schema, &object]).await?)
    }

    fn qualified(&self, object: &str) -> String {
        format!("{}.{}", self.schema, object)
    }
}

#[async_trait]
impl DatabaseCatalog for PostgresSession {
    async fn list_tables(&self) -> CatalogResult<Vec<String>> {
        self.names(queries::LIST_TABLES, "table_name").await
    }

    async fn list_views(&self) -> CatalogResult<Vec<String>> {
        self.names(queries::LIST_VIEWS, "view_name").await
    }

    async fn get_columns(&self, table: &str) -> CatalogResult<Vec<ColumnSpec>> {
        let rows = self.per_object(queries::GET_COLUMNS, table).await?;

        if rows.is_empty() {
            return Err(CatalogError::Missing(self.qualified(table)));
        }

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            // Present only for a table without columns
            let Some(name) = row.get::<_, Option<String>>("column_name") else {
                continue;
            };

            let is_nullable: String = row.get("is_nullable");
            columns.push(ColumnSpec {
                name,
                declared_type: row.get("data_type"),
                nullable: parse_nullable(&is_nullable)?,
                default_expression: row.get("column_default"),
                ordinal_position: row.get("ordinal_position"),
            });
        }

        debug!(
            database = %self.database,
            table = %table,
            columns = columns.len(),
            "Read columns"
        );
        Ok(columns)
    }

    async fn get_primary_key(&self, table: &str) -> CatalogResult<Vec<KeyColumnRow>> {
        let rows = self.per_object(queries::GET_PRIMARY_KEY, table).await?;
        Ok(rows.iter().map(key_column_row).collect())
    }

    async fn get_foreign_keys(&self, table: &str) -> CatalogResult<Vec<ForeignKeyRow>> {
        let rows = self.per_object(queries::GET_FOREIGN_KEYS, table).await?;

        Ok(rows
            .iter()
            .map(|row| ForeignKeyRow {
                constraint_name: row.get("constraint_name"),
                source_table: row.get("source_table"),
                source_columns: vec![row.get("source_column")],
                target_table: row.get("target_table"),
                target_columns: vec![row.get("target_column")],
            })
            .collect())
    }

    async fn get_unique_constraints(&self, table: &str) -> CatalogResult<Vec<KeyColumnRow>> {
        let rows = self.per_object(queries::GET_UNIQUE_CONSTRAINTS, table).await?;
        Ok(rows.iter().map(key_column_row).collect())
    }

    async fn get_check_constraints(&self, table: &str) -> CatalogResult<Vec<CheckConstraintSpec>> {
        let rows = self.per_object(queries::GET_CHECK_CONSTRAINTS, table).await?;

        Ok(rows
            .iter()
            .map(|row| CheckConstraintSpec {
                name: row.get("constraint_name"),
                expression: row.get("definition"),
            })
            .collect())
    }

    async fn get_view_definition(&self, view: &str) -> CatalogResult<String> {
        let row = self
            .conn
            .client()
            .query_opt(queries::GET_VIEW_DEFINITION, &[&self.schema, &view])
            .await?
            .ok_or_else(|| CatalogError::Missing(self.qualified(view)))?;

        let definition: Option<String> = row.get("definition");
        let definition = definition.ok_or_else(|| CatalogError::Missing(self.qualified(view)))?;

        Ok(normalize_view_definition(&definition))
    }
}

fn key_column_row(row: &Row) -> KeyColumnRow {
    KeyColumnRow {
        constraint_name: row.get("constraint_name"),
        column_name: row.get("column_name"),
        position: row.get("position"),
    }
}

/// `information_schema` reports nullability as the strings `YES` / `NO`
fn parse_nullable(flag: &str) -> CatalogResult<bool> {
    match flag {
        "YES" => Ok(true),
        "NO" => Ok(false),
        other => Err(CatalogError::Malformed(format!("is_nullable = {:?}", other))),
    }
}

/// `pg_get_viewdef` ends the body with `;`; renderers add their own terminator
fn normalize_view_definition(definition: &str) -> String {
    let trimmed = definition.trim_end();
    trimmed.strip_suffix(';').unwrap_or(trimmed).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nullable() {
        assert!(parse_nullable("YES").unwrap());
        assert!(!parse_nullable("NO").unwrap());
        assert!(matches!(parse_nullable("yes"), Err(CatalogError::Malformed(_))));
        assert!(matches!(parse_nullable(""), Err(CatalogError::Malformed(_))));
    }

    #[test]
    fn test_normalize_view_definition() {
        assert_eq!(
            normalize_view_definition(" SELECT orders.id\n   FROM orders;"),
            " SELECT orders.id\n   FROM orders"
        );
        assert_eq!(normalize_view_definition(" SELECT 1;\n"), " SELECT 1");
        assert_eq!(normalize_view_definition(" SELECT ';'"), " SELECT ';'");
    }
}
