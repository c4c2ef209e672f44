use crate::client::ClientResult;
use crate::metadata::commands;
use crate::metadata::executor::{CommandExecutor, Fetch};
use crate::metadata::records::EntityGroupRecord;
use crate::symbols::schema_text::parse_entities;
use crate::symbols::EntityGroupSymbol;

pub async fn load_entity_groups(
    exec: &CommandExecutor<'_>,
) -> ClientResult<Fetch<Vec<EntityGroupSymbol>>> {
    Ok(exec
        .run::<EntityGroupRecord>(commands::SHOW_ENTITY_GROUPS)
        .await?
        .map(|records| {
            records
                .into_iter()
                .map(|record| EntityGroupSymbol {
                    entities: parse_entities(&record.entities),
                    name: record.name,
                    definition: record.entities,
                })
                .collect()
        }))
}
