use std::collections::HashMap;

use crate::client::ClientResult;
use crate::metadata::commands;
use crate::metadata::executor::{CommandExecutor, Fetch};
use crate::metadata::records::TableSchemaRecord;
use crate::symbols::{non_empty, ColumnSymbol, ScalarType, TableSymbol};

/// Load every table of the executor's database from one schema command.
///
/// `NotFound` here means the database itself does not exist.
pub async fn load_tables(exec: &CommandExecutor<'_>) -> ClientResult<Fetch<Vec<TableSymbol>>> {
    let command = commands::database_schema(exec.database());
    Ok(exec
        .run::<TableSchemaRecord>(&command)
        .await?
        .map(group_tables))
}

/// Group per-column rows into tables.
///
/// Tables appear in order of first mention. A row with an empty column name
/// documents the table rather than adding a column. Rows without a table
/// name are dropped.
pub fn group_tables(rows: Vec<TableSchemaRecord>) -> Vec<TableSymbol> {
    let mut tables: Vec<TableSymbol> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        if row.table_name.is_empty() {
            continue;
        }

        let position = *index.entry(row.table_name.clone()).or_insert_with(|| {
            tables.push(TableSymbol {
                name: row.table_name.clone(),
                columns: Vec::new(),
                description: None,
                folder: None,
            });
            tables.len() - 1
        });
        let table = &mut tables[position];

        if table.folder.is_none() {
            table.folder = non_empty(&row.folder);
        }

        if row.column_name.is_empty() {
            table.description = non_empty(&row.doc_string);
        } else {
            table.columns.push(
                ColumnSymbol::new(row.column_name, ScalarType::resolve(&row.column_type))
                    .with_description(non_empty(&row.doc_string)),
            );
        }
    }

    tables
}
