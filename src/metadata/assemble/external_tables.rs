use tracing::debug;

use super::follow_up;
use crate::client::{ClientError, ClientResult};
use crate::metadata::commands;
use crate::metadata::executor::{CommandExecutor, Fetch};
use crate::metadata::records::{ExternalTableRecord, ExternalTableSchemaRecord};
use crate::symbols::schema_text::{parenthesize, parse_columns};
use crate::symbols::{non_empty, ExternalTableSymbol};

/// List the external tables, then describe each one.
///
/// A table whose describe command fails (tolerated) or returns no rows is
/// left out.
pub async fn load_external_tables(
    exec: &CommandExecutor<'_>,
    concurrency: usize,
) -> ClientResult<Fetch<Vec<ExternalTableSymbol>>> {
    let listed = match exec
        .run::<ExternalTableRecord>(commands::SHOW_EXTERNAL_TABLES)
        .await?
        .into_found()
    {
        Ok(listed) => listed,
        Err(other) => return Ok(other),
    };

    let exec = *exec;
    let symbols = follow_up(listed, concurrency, move |record| describe(exec, record)).await?;
    Ok(Fetch::Found(symbols))
}

async fn describe(
    exec: CommandExecutor<'_>,
    listed: ExternalTableRecord,
) -> ClientResult<Option<ExternalTableSymbol>> {
    let command = commands::external_table_schema(&listed.table_name);
    let Some(row) = exec
        .run::<ExternalTableSchemaRecord>(&command)
        .await?
        .found()
        .and_then(|rows| rows.into_iter().next())
    else {
        debug!(table = %listed.table_name, "external table has no schema; skipping");
        return Ok(None);
    };

    let schema = parenthesize(&row.schema);
    let columns = match parse_columns(&schema) {
        Ok(columns) => columns,
        Err(e) => {
            exec.tolerate(
                &command,
                ClientError::Decode {
                    command: command.clone(),
                    column: "Schema".to_string(),
                    message: e.to_string(),
                },
            )?;
            Vec::new()
        }
    };

    Ok(Some(ExternalTableSymbol {
        name: listed.table_name,
        schema,
        columns,
        description: non_empty(&listed.doc_string).or_else(|| non_empty(&row.doc_string)),
        folder: non_empty(&listed.folder).or_else(|| non_empty(&row.folder)),
    }))
}
