//! Schema model
//!
//! Immutable snapshot types produced by one extraction pass and handed
//! whole to a renderer.

pub mod ddl;

/// Everything visible to one connection at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerSnapshot {
    pub databases: Vec<DatabaseSnapshot>,
}

impl ServerSnapshot {
    pub fn table_count(&self) -> usize {
        self.databases.iter().map(|db| db.tables.len()).sum()
    }

    pub fn view_count(&self) -> usize {
        self.databases.iter().map(|db| db.views.len()).sum()
    }
}

/// One database's tables and views, in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSnapshot {
    pub name: String,
    pub tables: Vec<TableSnapshot>,
    pub views: Vec<ViewSnapshot>,
}

/// Table representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSnapshot {
    pub name: String,
    /// Physical column order
    pub columns: Vec<ColumnSpec>,
    /// Primary key columns in key order; empty when the table has none
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKeySpec>,
    /// Every column that takes part in a UNIQUE constraint, without duplicates
    pub unique_constraints: Vec<String>,
    /// The same UNIQUE constraints grouped per constraint
    pub unique_groups: Vec<UniqueConstraintSpec>,
    pub check_constraints: Vec<CheckConstraintSpec>,
}

/// Column representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub declared_type: String,
    pub nullable: bool,
    /// `None` means no default; `Some("")` is a default that renders empty
    pub default_expression: Option<String>,
    pub ordinal_position: i32,
}

/// Foreign key relationship; column lists are paired by position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeySpec {
    pub constraint_name: String,
    pub source_columns: Vec<String>,
    pub target_table: String,
    pub target_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraintSpec {
    pub constraint_name: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConstraintSpec {
    pub name: String,
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub name: String,
    /// Pretty-printed defining query, without the trailing semicolon
    pub definition: String,
}
