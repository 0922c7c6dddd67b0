//! In-memory catalog used by tests

use super::{CatalogReader, CatalogResult, DatabaseCatalog, ForeignKeyRow, KeyColumnRow};
use crate::error::CatalogError;
use crate::model::{CheckConstraintSpec, ColumnSpec};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct FixtureTable {
    pub columns: Vec<ColumnSpec>,
    pub primary_key: Vec<KeyColumnRow>,
    pub foreign_keys: Vec<ForeignKeyRow>,
    pub uniques: Vec<KeyColumnRow>,
    pub checks: Vec<CheckConstraintSpec>,
}

#[derive(Debug, Clone, Default)]
pub struct FixtureDatabase {
    pub name: String,
    pub tables: Vec<(String, FixtureTable)>,
    pub views: Vec<(String, String)>,
}

#[derive(Default)]
struct Shared {
    calls: Mutex<Vec<String>>,
    opened: AtomicUsize,
    released: AtomicUsize,
}

/// Catalog backed by fixed data that records every query it answers
#[derive(Default)]
pub struct FixtureCatalog {
    databases: Vec<FixtureDatabase>,
    /// `(operation, object)` pairs that fail with `CatalogError::Missing`
    failures: Vec<(String, String)>,
    shared: Arc<Shared>,
}

impl FixtureCatalog {
    pub fn new(databases: Vec<FixtureDatabase>) -> Self {
        Self {
            databases,
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, operation: &str, object: &str) -> Self {
        self.failures.push((operation.to_string(), object.to_string()));
        self
    }

    /// Every call answered so far, as `operation:database/object`
    pub fn calls(&self) -> Vec<String> {
        self.shared.calls.lock().unwrap().clone()
    }

    pub fn opened(&self) -> usize {
        self.shared.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.shared.released.load(Ordering::SeqCst)
    }
}

fn check(failures: &[(String, String)], operation: &str, object: &str) -> CatalogResult<()> {
    if failures.iter().any(|(op, obj)| op == operation && obj == object) {
        Err(CatalogError::Missing(object.to_string()))
    } else {
        Ok(())
    }
}

#[async_trait]
impl CatalogReader for FixtureCatalog {
    type Session = FixtureSession;

    async fn list_databases(&self) -> CatalogResult<Vec<String>> {
        self.shared.calls.lock().unwrap().push("list_databases".to_string());
        check(&self.failures, "list_databases", "")?;
        Ok(self.databases.iter().map(|db| db.name.clone()).collect())
    }

    async fn open(&self, database: &str) -> CatalogResult<FixtureSession> {
        self.shared.calls.lock().unwrap().push(format!("open:{}", database));
        check(&self.failures, "open", database)?;

        let db = self
            .databases
            .iter()
            .find(|db| db.name == database)
            .cloned()
            .ok_or_else(|| CatalogError::Unavailable {
                target: database.to_string(),
                reason: "database does not exist".to_string(),
            })?;

        self.shared.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FixtureSession {
            tables: db.tables.iter().cloned().collect(),
            db,
            failures: self.failures.clone(),
            shared: Arc::clone(&self.shared),
        })
    }
}

pub struct FixtureSession {
    db: FixtureDatabase,
    tables: HashMap<String, FixtureTable>,
    failures: Vec<(String, String)>,
    shared: Arc<Shared>,
}

impl FixtureSession {
    fn record(&self, operation: &str, object: &str) -> CatalogResult<()> {
        self.shared
            .calls
            .lock()
            .unwrap()
            .push(format!("{}:{}/{}", operation, self.db.name, object));
        check(&self.failures, operation, object)
    }

    fn table(&self, table: &str) -> CatalogResult<&FixtureTable> {
        self.tables
            .get(table)
            .ok_or_else(|| CatalogError::Missing(table.to_string()))
    }
}

impl Drop for FixtureSession {
    fn drop(&mut self) {
        self.shared.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DatabaseCatalog for FixtureSession {
    async fn list_tables(&self) -> CatalogResult<Vec<String>> {
        self.record("list_tables", "")?;
        Ok(self.db.tables.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn list_views(&self) -> CatalogResult<Vec<String>> {
        self.record("list_views", "")?;
        Ok(self.db.views.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn get_columns(&self, table: &str) -> CatalogResult<Vec<ColumnSpec>> {
        self.record("get_columns", table)?;
        Ok(self.table(table)?.columns.clone())
    }

    async fn get_primary_key(&self, table: &str) -> CatalogResult<Vec<KeyColumnRow>> {
        self.record("get_primary_key", table)?;
        Ok(self.table(table)?.primary_key.clone())
    }

    async fn get_foreign_keys(&self, table: &str) -> CatalogResult<Vec<ForeignKeyRow>> {
        self.record("get_foreign_keys", table)?;
        Ok(self.table(table)?.foreign_keys.clone())
    }

    async fn get_unique_constraints(&self, table: &str) -> CatalogResult<Vec<KeyColumnRow>> {
        self.record("get_unique_constraints", table)?;
        Ok(self.table(table)?.uniques.clone())
    }

    async fn get_check_constraints(&self, table: &str) -> CatalogResult<Vec<CheckConstraintSpec>> {
        self.record("get_check_constraints", table)?;
        Ok(self.table(table)?.checks.clone())
    }

    async fn get_view_definition(&self, view: &str) -> CatalogResult<String> {
        self.record("get_view_definition", view)?;
        self.db
            .views
            .iter()
            .find(|(name, _)| name == view)
            .map(|(_, definition)| definition.clone())
            .ok_or_else(|| CatalogError::Missing(view.to_string()))
    }
}
