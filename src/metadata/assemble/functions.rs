use crate::client::{ClientError, ClientResult};
use crate::metadata::commands;
use crate::metadata::executor::{CommandExecutor, Fetch};
use crate::metadata::records::FunctionRecord;
use crate::symbols::schema_text::parse_parameters;
use crate::symbols::{non_empty, FunctionSymbol};

/// Load the stored functions, parsing each parameter list.
///
/// A parameter list that does not parse keeps its raw text and an empty
/// parsed list.
pub async fn load_functions(exec: &CommandExecutor<'_>) -> ClientResult<Fetch<Vec<FunctionSymbol>>> {
    let listed = match exec
        .run::<FunctionRecord>(commands::SHOW_FUNCTIONS)
        .await?
        .into_found()
    {
        Ok(listed) => listed,
        Err(other) => return Ok(other),
    };

    let mut functions = Vec::with_capacity(listed.len());
    for record in listed {
        let parameters = match parse_parameters(&record.parameters) {
            Ok(parameters) => parameters,
            Err(e) => {
                exec.tolerate(
                    commands::SHOW_FUNCTIONS,
                    ClientError::Decode {
                        command: commands::SHOW_FUNCTIONS.to_string(),
                        column: "Parameters".to_string(),
                        message: e.to_string(),
                    },
                )?;
                Vec::new()
            }
        };

        functions.push(FunctionSymbol {
            name: record.name,
            parameters_text: record.parameters,
            parameters,
            body: record.body,
            description: non_empty(&record.doc_string),
            folder: non_empty(&record.folder),
        });
    }

    Ok(Fetch::Found(functions))
}
