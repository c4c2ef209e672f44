//! Typed records decoded from command result tables.
//!
//! Every command has a record type with an explicit column mapping table.
//! Column positions are looked up by name once per result table; a missing
//! required column fails the whole decode instead of yielding partial rows.

use serde_json::Value;

use crate::client::{ClientError, ClientResult, ResultSet, ResultTable};

/// One column of a record's mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Column name in the response.
    pub name: &'static str,
    /// Whether decoding fails when the column is absent.
    pub required: bool,
}

/// A record decoded from one result row.
pub trait Record: Sized {
    /// Mapping table, in field order.
    const FIELDS: &'static [Field];

    /// Build a record from a row whose cells are addressed by field index.
    fn from_row(row: &Row<'_>) -> ClientResult<Self>;
}

/// A result row viewed through a record's mapping table.
pub struct Row<'a> {
    command: &'a str,
    fields: &'static [Field],
    positions: &'a [Option<usize>],
    cells: &'a [Value],
}

impl Row<'_> {
    /// Text of the field at `index`; absent optional columns and nulls are empty.
    pub fn text(&self, index: usize) -> ClientResult<String> {
        let field = self.fields[index];
        let Some(position) = self.positions[index] else {
            return Ok(String::new());
        };

        match self.cells.get(position) {
            Some(Value::Null) => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(other) => Ok(other.to_string()),
            None if field.required => Err(ClientError::Decode {
                command: self.command.to_string(),
                column: field.name.to_string(),
                message: format!("row has {} cells", self.cells.len()),
            }),
            None => Ok(String::new()),
        }
    }
}

/// Map each field to its column position, failing on missing required columns.
pub fn validate(
    command: &str,
    table: &ResultTable,
    fields: &[Field],
) -> ClientResult<Vec<Option<usize>>> {
    let positions: Vec<Option<usize>> = fields
        .iter()
        .map(|f| table.column_index(f.name))
        .collect();

    let missing: Vec<String> = fields
        .iter()
        .zip(&positions)
        .filter(|(f, p)| f.required && p.is_none())
        .map(|(f, _)| f.name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(positions)
    } else {
        Err(ClientError::Shape {
            command: command.to_string(),
            missing,
        })
    }
}

/// Decode the primary table of a command response.
pub fn decode<R: Record>(command: &str, result: &ResultSet) -> ClientResult<Vec<R>> {
    let table = result
        .primary()
        .ok_or_else(|| ClientError::NoResult(command.to_string()))?;
    let positions = validate(command, table, R::FIELDS)?;

    table
        .rows
        .iter()
        .map(|cells| {
            R::from_row(&Row {
                command,
                fields: R::FIELDS,
                positions: &positions,
                cells,
            })
        })
        .collect()
}

macro_rules! record {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $field:ident => $column:literal, $required:literal; )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            $( pub $field: String, )*
        }

        impl Record for $name {
            const FIELDS: &'static [Field] = &[
                $( Field { name: $column, required: $required }, )*
            ];

            fn from_row(row: &Row<'_>) -> ClientResult<Self> {
                let mut index = 0usize;
                $(
                    let $field = row.text(index)?;
                    index += 1;
                )*
                debug_assert_eq!(index, Self::FIELDS.len());
                Ok(Self { $( $field, )* })
            }
        }
    };
}

record! {
    /// Row of `.show databases`.
    DatabaseRecord {
        database_name => "DatabaseName", true;
        pretty_name => "PrettyName", false;
    }
}

record! {
    /// Row of `.show database <db> schema`.
    ///
    /// Rows with an empty column name carry table-level documentation.
    TableSchemaRecord {
        database_name => "DatabaseName", false;
        table_name => "TableName", true;
        column_name => "ColumnName", true;
        column_type => "ColumnType", true;
        doc_string => "DocString", false;
        folder => "Folder", false;
    }
}

record! {
    /// Row of `.show external tables`.
    ExternalTableRecord {
        table_name => "TableName", true;
        table_type => "TableType", false;
        folder => "Folder", false;
        doc_string => "DocString", false;
    }
}

record! {
    /// Row of `.show external table <t> cslschema`.
    ExternalTableSchemaRecord {
        table_name => "TableName", false;
        schema => "Schema", true;
        database_name => "DatabaseName", false;
        folder => "Folder", false;
        doc_string => "DocString", false;
    }
}

record! {
    /// Row of `.show materialized-views`.
    MaterializedViewRecord {
        name => "Name", true;
        source_table => "SourceTable", false;
        query => "Query", true;
        folder => "Folder", false;
        doc_string => "DocString", false;
    }
}

record! {
    /// Row of `.show materialized-view <v> cslschema`.
    MaterializedViewSchemaRecord {
        name => "Name", false;
        schema => "Schema", true;
        database_name => "DatabaseName", false;
        folder => "Folder", false;
        doc_string => "DocString", false;
    }
}

record! {
    /// Row of `.show functions`.
    FunctionRecord {
        name => "Name", true;
        parameters => "Parameters", true;
        body => "Body", true;
        folder => "Folder", false;
        doc_string => "DocString", false;
    }
}

record! {
    /// Row of `.show entity_groups`.
    EntityGroupRecord {
        name => "Name", true;
        entities => "Entities", true;
    }
}
