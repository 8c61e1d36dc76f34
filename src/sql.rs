//! SQL text generation for the SQLite dialect.
//!
//! Identifiers are always double-quoted; values are always bound as `?`
//! parameters and never spliced into statement text.

use crate::client::UpdateMethod;
use crate::schema::TableSchema;

/// Quotes an identifier, doubling any embedded quote.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `"database"."object"`
pub fn qualified(database: &str, name: &str) -> String {
    format!("{}.{}", quote_ident(database), quote_ident(name))
}

fn column_list<S: AsRef<str>>(columns: &[S]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn attach_database(name: &str) -> String {
    format!("ATTACH DATABASE ? AS {}", quote_ident(name))
}

pub fn detach_database(name: &str) -> String {
    format!("DETACH DATABASE {}", quote_ident(name))
}

pub fn create_table(database: &str, schema: &TableSchema) -> String {
    let mut definitions: Vec<String> = schema
        .columns()
        .iter()
        .map(|(name, definition)| {
            let definition = definition.trim();
            if definition.is_empty() {
                quote_ident(name)
            } else {
                format!("{} {}", quote_ident(name), definition)
            }
        })
        .collect();
    definitions.push(format!(
        "PRIMARY KEY ({})",
        column_list(schema.primary_key().key_columns())
    ));
    format!(
        "CREATE TABLE {} ({})",
        qualified(database, schema.name()),
        definitions.join(", ")
    )
}

pub fn drop_table(database: &str, table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", qualified(database, table))
}

/// The index name carries the schema; SQLite resolves the table inside it.
pub fn create_index(database: &str, index: &str, table: &str, column: &str) -> String {
    format!(
        "CREATE INDEX {} ON {} ({})",
        qualified(database, index),
        quote_ident(table),
        quote_ident(column)
    )
}

/// Multi-row insert with `row_count` groups of placeholders.
pub fn insert<S: AsRef<str>>(
    database: &str,
    table: &str,
    columns: &[S],
    row_count: usize,
    method: UpdateMethod,
) -> String {
    let verb = match method {
        UpdateMethod::Insert | UpdateMethod::Upsert => "INSERT INTO",
        UpdateMethod::Replace => "INSERT OR REPLACE INTO",
    };
    let group = format!("({})", vec!["?"; columns.len()].join(", "));
    let values = vec![group.as_str(); row_count].join(", ");
    let mut sql = format!(
        "{verb} {} ({}) VALUES {values}",
        qualified(database, table),
        column_list(columns)
    );
    if method == UpdateMethod::Upsert {
        let assignments = columns
            .iter()
            .map(|c| {
                let c = quote_ident(c.as_ref());
                format!("{c} = excluded.{c}")
            })
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(" ON CONFLICT DO UPDATE SET ");
        sql.push_str(&assignments);
    }
    sql
}

pub fn select<S: AsRef<str>>(database: &str, table: &str, columns: &[S]) -> String {
    format!(
        "SELECT {} FROM {}",
        column_list(columns),
        qualified(database, table)
    )
}
