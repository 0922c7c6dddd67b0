//! PostgreSQL catalog queries
//!
//! Every query is read-only. `$1` is always the schema name and `$2` the
//! table or view name.

/// List the non-template databases the current role may connect to
pub const LIST_DATABASES: &str = r#"
    SELECT datname::text AS datname
    FROM pg_database
    WHERE datistemplate = false
        AND datallowconn = true
        AND has_database_privilege(datname, 'CONNECT')
    ORDER BY datname
"#;

/// List all base tables in a schema
pub const LIST_TABLES: &str = r#"
    SELECT table_name::text AS table_name
    FROM information_schema.tables
    WHERE table_schema = $1
        AND table_type = 'BASE TABLE'
    ORDER BY table_name
"#;

/// List all views in a schema
pub const LIST_VIEWS: &str = r#"
    SELECT table_name::text AS view_name
    FROM information_schema.views
    WHERE table_schema = $1
    ORDER BY table_name
"#;

/// Get column information for a table.
///
/// The outer table join yields no rows for a table that no longer exists and
/// a single all-NULL column row for a table without columns.
pub const GET_COLUMNS: &str = r#"
    SELECT
        c.column_name::text AS column_name,
        c.data_type::text AS data_type,
        c.is_nullable::text AS is_nullable,
        c.column_default::text AS column_default,
        c.ordinal_position::int4 AS ordinal_position
    FROM information_schema.tables t
    LEFT JOIN information_schema.columns c
        ON c.table_schema = t.table_schema
        AND c.table_name = t.table_name
    WHERE t.table_schema = $1
        AND t.table_name = $2
    ORDER BY c.ordinal_position
"#;

/// Get primary key columns for a table.
///
/// Read from `pg_constraint` like the other constraint queries:
/// `information_schema.table_constraints` only shows tables owned by the
/// current role, which would hide keys from a read-only role.
pub const GET_PRIMARY_KEY: &str = r#"
    SELECT
        con.conname::text AS constraint_name,
        a.attname::text AS column_name,
        k.position::int4 AS position
    FROM pg_catalog.pg_constraint con
    JOIN pg_catalog.pg_class c ON c.oid = con.conrelid
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    CROSS JOIN LATERAL unnest(con.conkey) WITH ORDINALITY AS k(attnum, position)
    JOIN pg_catalog.pg_attribute a
        ON a.attrelid = con.conrelid AND a.attnum = k.attnum
    WHERE con.contype = 'p'
        AND n.nspname = $1
        AND c.relname = $2
    ORDER BY k.position
"#;

/// Get unique constraint columns for a table
pub const GET_UNIQUE_CONSTRAINTS: &str = r#"
    SELECT
        con.conname::text AS constraint_name,
        a.attname::text AS column_name,
        k.position::int4 AS position
    FROM pg_catalog.pg_constraint con
    JOIN pg_catalog.pg_class c ON c.oid = con.conrelid
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    CROSS JOIN LATERAL unnest(con.conkey) WITH ORDINALITY AS k(attnum, position)
    JOIN pg_catalog.pg_attribute a
        ON a.attrelid = con.conrelid AND a.attnum = k.attnum
    WHERE con.contype = 'u'
        AND n.nspname = $1
        AND c.relname = $2
    ORDER BY con.conname, k.position
"#;

/// Get foreign keys for a table, one row per key column pair.
///
/// `information_schema.constraint_column_usage` cannot pair the columns of a
/// multi-column key, so the pairs come from `conkey`/`confkey` directly.
pub const GET_FOREIGN_KEYS: &str = r#"
    SELECT
        con.conname::text AS constraint_name,
        src.relname::text AS source_table,
        sa.attname::text AS source_column,
        tgt.relname::text AS target_table,
        ta.attname::text AS target_column
    FROM pg_catalog.pg_constraint con
    JOIN pg_catalog.pg_class src ON src.oid = con.conrelid
    JOIN pg_catalog.pg_namespace n ON n.oid = src.relnamespace
    JOIN pg_catalog.pg_class tgt ON tgt.oid = con.confrelid
    CROSS JOIN LATERAL unnest(con.conkey, con.confkey)
        WITH ORDINALITY AS k(source_attnum, target_attnum, position)
    JOIN pg_catalog.pg_attribute sa
        ON sa.attrelid = con.conrelid AND sa.attnum = k.source_attnum
    JOIN pg_catalog.pg_attribute ta
        ON ta.attrelid = con.confrelid AND ta.attnum = k.target_attnum
    WHERE con.contype = 'f'
        AND n.nspname = $1
        AND src.relname = $2
    ORDER BY con.conname, k.position
"#;

/// Get check constraints for a table
pub const GET_CHECK_CONSTRAINTS: &str = r#"
    SELECT
        con.conname::text AS constraint_name,
        pg_catalog.pg_get_constraintdef(con.oid, true) AS definition
    FROM pg_catalog.pg_constraint con
    JOIN pg_catalog.pg_class c ON c.oid = con.conrelid
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    WHERE con.contype = 'c'
        AND n.nspname = $1
        AND c.relname = $2
    ORDER BY con.conname
"#;

/// Get the pretty-printed definition of a view
pub const GET_VIEW_DEFINITION: &str = r#"
    SELECT pg_catalog.pg_get_viewdef(c.oid, true) AS definition
    FROM pg_catalog.pg_class c
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    WHERE c.relkind IN ('v', 'm')
        AND n.nspname = $1
        AND c.relname = $2
"#;
