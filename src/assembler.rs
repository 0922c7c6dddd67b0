//! Metadata assembler
//!
//! Drives a catalog reader and the exclusion filter across every database,
//! table and view visible to the connection and builds the schema model.
//! Extraction is a single sequential pass: either every object is read or
//! the whole run fails with the object that was in progress.

use crate::catalog::{CatalogReader, DatabaseCatalog, ForeignKeyRow, KeyColumnRow};
use crate::error::{catalog_error, CatalogError, CatalogObject, ExtractError};
use crate::filter::ExclusionFilter;
use crate::model::{
    ColumnSpec, DatabaseSnapshot, ForeignKeySpec, ServerSnapshot, TableSnapshot,
    UniqueConstraintSpec, ViewSnapshot,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Which databases to extract
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseScope {
    /// Every connectable database on the server
    All,
    /// Exactly one database; the server is not enumerated
    Single(String),
}

pub struct MetadataAssembler<'a, R: CatalogReader> {
    reader: &'a R,
    filter: &'a ExclusionFilter,
    scope: DatabaseScope,
}

impl<'a, R: CatalogReader> MetadataAssembler<'a, R> {
    pub fn new(reader: &'a R, filter: &'a ExclusionFilter, scope: DatabaseScope) -> Self {
        Self {
            reader,
            filter,
            scope,
        }
    }

    /// Extract the complete server snapshot
    pub async fn extract(&self) -> Result<ServerSnapshot, ExtractError> {
        let names = match &self.scope {
            DatabaseScope::All => self
                .reader
                .list_databases()
                .await
                .map_err(catalog_error(CatalogObject::Server, "list_databases"))?,
            DatabaseScope::Single(name) => vec![name.clone()],
        };

        ensure_unique(&names, CatalogObject::Server, "list_databases")?;

        let mut databases = Vec::with_capacity(names.len());
        for name in &names {
            databases.push(self.extract_database(name).await?);
        }

        let snapshot = ServerSnapshot { databases };
        info!(
            "Extracted {} databases, {} tables, {} views",
            snapshot.databases.len(),
            snapshot.table_count(),
            snapshot.view_count()
        );

        Ok(snapshot)
    }

    async fn extract_database(&self, name: &str) -> Result<DatabaseSnapshot, ExtractError> {
        let object = CatalogObject::Database(name.to_string());
        let session = self
            .reader
            .open(name)
            .await
            .map_err(catalog_error(object.clone(), "open"))?;

        let result = self.read_database(&session, name).await;
        // Release the connection before reporting either outcome
        drop(session);

        match &result {
            Ok(db) => info!(
                "Database {}: {} tables, {} views",
                db.name,
                db.tables.len(),
                db.views.len()
            ),
            Err(e) => warn!("Extraction of database {} failed: {}", name, e),
        }

        result
    }

    async fn read_database(
        &self,
        session: &R::Session,
        database: &str,
    ) -> Result<DatabaseSnapshot, ExtractError> {
        let object = CatalogObject::Database(database.to_string());

        let table_names = session
            .list_tables()
            .await
            .map_err(catalog_error(object.clone(), "list_tables"))?;
        ensure_unique(&table_names, object.clone(), "list_tables")?;

        let mut tables = Vec::new();
        for table in table_names {
            if self.filter.should_exclude(&table) {
                debug!("Skipping excluded table {}.{}", database, table);
                continue;
            }
            tables.push(read_table(session, database, table).await?);
        }

        let view_names = session
            .list_views()
            .await
            .map_err(catalog_error(object.clone(), "list_views"))?;
        ensure_unique(&view_names, object, "list_views")?;

        let mut views = Vec::new();
        for view in view_names {
            if self.filter.should_exclude(&view) {
                debug!("Skipping excluded view {}.{}", database, view);
                continue;
            }

            let definition = session.get_view_definition(&view).await.map_err(catalog_error(
                CatalogObject::View {
                    database: database.to_string(),
                    view: view.clone(),
                },
                "get_view_definition",
            ))?;
            views.push(ViewSnapshot {
                name: view,
                definition,
            });
        }

        Ok(DatabaseSnapshot {
            name: database.to_string(),
            tables,
            views,
        })
    }
}

async fn read_table<S: DatabaseCatalog>(
    session: &S,
    database: &str,
    table: String,
) -> Result<TableSnapshot, ExtractError> {
    let object = CatalogObject::Table {
        database: database.to_string(),
        table: table.clone(),
    };
    let fail = |operation: &'static str| catalog_error(object.clone(), operation);

    let columns = session.get_columns(&table).await.map_err(fail("get_columns"))?;
    check_columns(&columns).map_err(fail("get_columns"))?;

    let pk_rows = session
        .get_primary_key(&table)
        .await
        .map_err(fail("get_primary_key"))?;
    let fk_rows = session
        .get_foreign_keys(&table)
        .await
        .map_err(fail("get_foreign_keys"))?;
    let unique_rows = session
        .get_unique_constraints(&table)
        .await
        .map_err(fail("get_unique_constraints"))?;
    let check_constraints = session
        .get_check_constraints(&table)
        .await
        .map_err(fail("get_check_constraints"))?;

    let foreign_keys = group_foreign_keys(&table, &fk_rows).map_err(fail("get_foreign_keys"))?;
    let (unique_groups, unique_constraints) = group_unique_constraints(&unique_rows);

    debug!(
        "Assembled table {}.{} ({} columns, {} foreign keys)",
        database,
        table,
        columns.len(),
        foreign_keys.len()
    );

    Ok(TableSnapshot {
        name: table,
        columns,
        primary_key: key_columns(&pk_rows),
        foreign_keys,
        unique_constraints,
        unique_groups,
        check_constraints,
    })
}

fn ensure_unique(
    names: &[String],
    object: CatalogObject,
    operation: &'static str,
) -> Result<(), ExtractError> {
    let mut seen = HashSet::new();
    match names.iter().find(|name| !seen.insert(name.as_str())) {
        Some(dup) => Err(catalog_error(object, operation)(CatalogError::Inconsistent(
            format!("{} listed twice", dup),
        ))),
        None => Ok(()),
    }
}

/// Columns must arrive in strictly ascending ordinal order with unique names
pub fn check_columns(columns: &[ColumnSpec]) -> Result<(), CatalogError> {
    let mut names = HashSet::new();
    for pair in columns.windows(2) {
        if pair[1].ordinal_position <= pair[0].ordinal_position {
            return Err(CatalogError::Inconsistent(format!(
                "column {} (position {}) follows {} (position {})",
                pair[1].name, pair[1].ordinal_position, pair[0].name, pair[0].ordinal_position
            )));
        }
    }
    for col in columns {
        if !names.insert(col.name.as_str()) {
            return Err(CatalogError::Inconsistent(format!("duplicate column {}", col.name)));
        }
    }
    Ok(())
}

/// Column names of a single key, in key position order
pub fn key_columns(rows: &[KeyColumnRow]) -> Vec<String> {
    let mut rows: Vec<&KeyColumnRow> = rows.iter().collect();
    rows.sort_by_key(|r| r.position);

    let mut columns: Vec<String> = Vec::with_capacity(rows.len());
    for row in rows {
        if !columns.contains(&row.column_name) {
            columns.push(row.column_name.clone());
        }
    }
    columns
}

/// Fold per-column join rows of `table` into one record per constraint,
/// ordered by constraint name. Rows of one constraint must arrive in key order.
pub fn group_foreign_keys(
    table: &str,
    rows: &[ForeignKeyRow],
) -> Result<Vec<ForeignKeySpec>, CatalogError> {
    let mut grouped: BTreeMap<&str, ForeignKeySpec> = BTreeMap::new();

    for row in rows {
        if row.source_table != table {
            return Err(CatalogError::Inconsistent(format!(
                "foreign key {} belongs to {}, not {}",
                row.constraint_name, row.source_table, table
            )));
        }
        if row.source_columns.is_empty()
            || row.source_columns.len() != row.target_columns.len()
        {
            return Err(CatalogError::Inconsistent(format!(
                "foreign key {} pairs {} source columns with {} target columns",
                row.constraint_name,
                row.source_columns.len(),
                row.target_columns.len()
            )));
        }

        let spec = grouped
            .entry(row.constraint_name.as_str())
            .or_insert_with(|| ForeignKeySpec {
                constraint_name: row.constraint_name.clone(),
                source_columns: Vec::new(),
                target_table: row.target_table.clone(),
                target_columns: Vec::new(),
            });

        if spec.target_table != row.target_table {
            return Err(CatalogError::Inconsistent(format!(
                "foreign key {} references both {} and {}",
                row.constraint_name, spec.target_table, row.target_table
            )));
        }

        spec.source_columns.extend(row.source_columns.iter().cloned());
        spec.target_columns.extend(row.target_columns.iter().cloned());
    }

    Ok(grouped.into_values().collect())
}

/// Group unique-constraint rows per constraint and flatten them into the
/// set of participating columns
pub fn group_unique_constraints(
    rows: &[KeyColumnRow],
) -> (Vec<UniqueConstraintSpec>, Vec<String>) {
    let mut order: Vec<&str> = Vec::new();
    let mut by_name: BTreeMap<&str, Vec<KeyColumnRow>> = BTreeMap::new();
    for row in rows {
        let name = row.constraint_name.as_str();
        if !by_name.contains_key(name) {
            order.push(name);
        }
        by_name.entry(name).or_default().push(row.clone());
    }

    let groups: Vec<UniqueConstraintSpec> = order
        .into_iter()
        .map(|name| UniqueConstraintSpec {
            constraint_name: name.to_string(),
            columns: key_columns(&by_name[name]),
        })
        .collect();

    let mut columns: Vec<String> = Vec::new();
    for column in groups.iter().flat_map(|g| g.columns.iter()) {
        if !columns.contains(column) {
            columns.push(column.clone());
        }
    }

    (groups, columns)
}
