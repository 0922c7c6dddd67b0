//! Plain-text schema report

use crate::model::{ColumnSpec, DatabaseSnapshot, ServerSnapshot, TableSnapshot, ViewSnapshot};
use std::io::{self, BufWriter, Write};

pub const SPACER: &str = "\n--------------------------------\n";

#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl TextRenderer {
    /// Write the report to stdout and return the number of bytes written
    pub fn render_to_stdout(&self, snapshot: &ServerSnapshot) -> io::Result<usize> {
        let mut out = CountingWriter::new(BufWriter::new(io::stdout().lock()));
        self.write(snapshot, &mut out)?;
        out.flush()?;
        Ok(out.count)
    }

    pub fn write<W: Write>(&self, snapshot: &ServerSnapshot, out: &mut W) -> io::Result<()> {
        for db in &snapshot.databases {
            write_database(db, out)?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn render_to_string(&self, snapshot: &ServerSnapshot) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write(snapshot, &mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn write_database<W: Write>(db: &DatabaseSnapshot, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", header(&format!("Database: {}", db.name)))?;
    for table in &db.tables {
        write_table(table, out)?;
    }
    for view in &db.views {
        write_view(view, out)?;
    }
    Ok(())
}

fn header(title: &str) -> String {
    format!(
        "\n==============================\n     {}\n==============================\n",
        title
    )
}

/// `{name} {type} {NOT NULL|NULL}[ DEFAULT {expr}]`
pub fn column_line(col: &ColumnSpec) -> String {
    let mut line = format!(
        "{} {} {}",
        col.name,
        col.declared_type,
        if col.nullable { "NULL" } else { "NOT NULL" }
    );
    if let Some(default) = &col.default_expression {
        line.push_str(" DEFAULT ");
        line.push_str(default);
    }
    line
}

fn write_table<W: Write>(table: &TableSnapshot, out: &mut W) -> io::Result<()> {
    writeln!(out, "*** TABLE: {} ***", table.name)?;

    for col in &table.columns {
        writeln!(out, "{}", column_line(col))?;
    }

    if !table.primary_key.is_empty() {
        writeln!(out, "\nPRIMARY KEY: {}", table.primary_key.join(", "))?;
    }

    if !table.foreign_keys.is_empty() {
        writeln!(out, "\nFOREIGN KEYS:")?;
        for fk in &table.foreign_keys {
            writeln!(out, "  - {}:", fk.constraint_name)?;
            writeln!(
                out,
                "      {}({}) → {}({})",
                table.name,
                fk.source_columns.join(", "),
                fk.target_table,
                fk.target_columns.join(", ")
            )?;
        }
    }

    if !table.unique_constraints.is_empty() {
        writeln!(out, "\nUNIQUE: {}", table.unique_constraints.join(", "))?;
    }

    if !table.check_constraints.is_empty() {
        writeln!(out, "\nCHECK:")?;
        for check in &table.check_constraints {
            writeln!(out, "  - {}: {}", check.name, check.expression)?;
        }
    }

    writeln!(out, "{}", SPACER)
}

fn write_view<W: Write>(view: &ViewSnapshot, out: &mut W) -> io::Result<()> {
    writeln!(out, "*** VIEW: {} ***", view.name)?;
    writeln!(out, "\nVIEW: {}", view.name)?;
    writeln!(out, "CREATE OR REPLACE VIEW {} AS\n{};", view.name, view.definition)?;
    writeln!(out, "{}", SPACER)
}

struct CountingWriter<W> {
    inner: W,
    count: usize,
}

impl<W> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
