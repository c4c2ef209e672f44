use tracing::debug;

use super::follow_up;
use crate::client::{ClientError, ClientResult};
use crate::metadata::commands;
use crate::metadata::executor::{CommandExecutor, Fetch};
use crate::metadata::records::{MaterializedViewRecord, MaterializedViewSchemaRecord};
use crate::symbols::schema_text::{parenthesize, parse_columns};
use crate::symbols::{non_empty, MaterializedViewSymbol};

/// List the materialized views, then describe each one.
///
/// The defining query comes from the listing; the schema from the describe
/// command. Views whose describe fails or returns no rows are left out.
pub async fn load_materialized_views(
    exec: &CommandExecutor<'_>,
    concurrency: usize,
) -> ClientResult<Fetch<Vec<MaterializedViewSymbol>>> {
    let listed = match exec
        .run::<MaterializedViewRecord>(commands::SHOW_MATERIALIZED_VIEWS)
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
    listed: MaterializedViewRecord,
) -> ClientResult<Option<MaterializedViewSymbol>> {
    let command = commands::materialized_view_schema(&listed.name);
    let Some(row) = exec
        .run::<MaterializedViewSchemaRecord>(&command)
        .await?
        .found()
        .and_then(|rows| rows.into_iter().next())
    else {
        debug!(view = %listed.name, "materialized view has no schema; skipping");
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

    Ok(Some(MaterializedViewSymbol {
        name: listed.name,
        schema,
        columns,
        query: listed.query,
        source_table: non_empty(&listed.source_table),
        description: non_empty(&listed.doc_string).or_else(|| non_empty(&row.doc_string)),
        folder: non_empty(&listed.folder).or_else(|| non_empty(&row.folder)),
    }))
}
