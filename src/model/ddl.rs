//! Creation statements synthesized from the schema model

use super::{TableSnapshot, ViewSnapshot};

/// Quote an identifier (table/column name) safely
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn quote_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the CREATE TABLE statement for a table snapshot
pub fn create_table(table: &TableSnapshot) -> String {
    let mut lines: Vec<String> = table
        .columns
        .iter()
        .map(|col| {
            let mut line = format!("    {} {}", quote_ident(&col.name), col.declared_type);
            if !col.nullable {
                line.push_str(" NOT NULL");
            }
            if let Some(default) = &col.default_expression {
                line.push_str(" DEFAULT ");
                line.push_str(default);
            }
            line
        })
        .collect();

    if !table.primary_key.is_empty() {
        lines.push(format!("    PRIMARY KEY ({})", quote_list(&table.primary_key)));
    }

    for fk in &table.foreign_keys {
        lines.push(format!(
            "    CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            quote_ident(&fk.constraint_name),
            quote_list(&fk.source_columns),
            quote_ident(&fk.target_table),
            quote_list(&fk.target_columns),
        ));
    }

    for unique in &table.unique_groups {
        lines.push(format!(
            "    CONSTRAINT {} UNIQUE ({})",
            quote_ident(&unique.constraint_name),
            quote_list(&unique.columns),
        ));
    }

    for check in &table.check_constraints {
        let body = check.expression.trim();
        let body = if body.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("CHECK")) {
            body.to_string()
        } else {
            format!("CHECK ({})", body)
        };
        lines.push(format!("    CONSTRAINT {} {}", quote_ident(&check.name), body));
    }

    format!(
        "CREATE TABLE {} (\n{}\n);",
        quote_ident(&table.name),
        lines.join(",\n")
    )
}

/// Build the CREATE OR REPLACE VIEW statement for a view snapshot
pub fn create_view(view: &ViewSnapshot) -> String {
    format!(
        "CREATE OR REPLACE VIEW {} AS\n{};",
        quote_ident(&view.name),
        view.definition
    )
}
