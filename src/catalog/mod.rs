//! Catalog readers
//!
//! Engine-specific access to system catalogs. A [`CatalogReader`] lists the
//! databases of a server and opens a [`DatabaseCatalog`] session per database;
//! the session answers every per-object query. Dropping a session releases
//! its connection.
//!
//! Constraint queries return raw per-column rows. Grouping them into model
//! records is done once, engine-independently, by the assembler.

pub mod postgres;
pub mod queries;

#[cfg(test)]
pub mod fixture;

use crate::error::CatalogError;
use crate::model::{CheckConstraintSpec, ColumnSpec};
use async_trait::async_trait;

pub use postgres::PostgresCatalog;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// One column of a primary key or unique constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumnRow {
    pub constraint_name: String,
    pub column_name: String,
    /// 1-based position within the constraint's key
    pub position: i32,
}

/// Foreign key join row, usually one per key column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRow {
    pub constraint_name: String,
    pub source_table: String,
    pub source_columns: Vec<String>,
    pub target_table: String,
    pub target_columns: Vec<String>,
}

/// Server-level catalog access
#[async_trait]
pub trait CatalogReader: Send + Sync {
    type Session: DatabaseCatalog;

    /// Connectable, non-template databases
    async fn list_databases(&self) -> CatalogResult<Vec<String>>;

    /// Open a session bound to one database
    async fn open(&self, database: &str) -> CatalogResult<Self::Session>;
}

/// Per-database catalog access. Every operation is read-only.
#[async_trait]
pub trait DatabaseCatalog: Send + Sync {
    async fn list_tables(&self) -> CatalogResult<Vec<String>>;

    async fn list_views(&self) -> CatalogResult<Vec<String>>;

    /// Columns in ordinal order
    async fn get_columns(&self, table: &str) -> CatalogResult<Vec<ColumnSpec>>;

    async fn get_primary_key(&self, table: &str) -> CatalogResult<Vec<KeyColumnRow>>;

    /// Ordered by constraint name, then key position
    async fn get_foreign_keys(&self, table: &str) -> CatalogResult<Vec<ForeignKeyRow>>;

    async fn get_unique_constraints(&self, table: &str) -> CatalogResult<Vec<KeyColumnRow>>;

    async fn get_check_constraints(&self, table: &str) -> CatalogResult<Vec<CheckConstraintSpec>>;

    async fn get_view_definition(&self, view: &str) -> CatalogResult<String>;
}
