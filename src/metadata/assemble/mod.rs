//! Schema assemblers.
//!
//! Each assembler turns the output of one or more administrative commands
//! into one category of database members. Tables come from a single
//! per-column command; the other categories list their items first and then
//! issue one follow-up command per item.

mod entity_groups;
mod external_tables;
mod functions;
mod materialized_views;
mod tables;

pub use entity_groups::load_entity_groups;
pub use external_tables::load_external_tables;
pub use functions::load_functions;
pub use materialized_views::load_materialized_views;
pub use tables::{group_tables, load_tables};

use std::future::Future;

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::client::ClientResult;

/// Run `describe` for every listed item, keeping the items it returns.
///
/// With `concurrency` above one, up to that many calls are in flight at once;
/// results keep listing order either way. The first error aborts the batch.
pub(crate) async fn follow_up<I, T, F, Fut>(
    items: Vec<I>,
    concurrency: usize,
    describe: F,
) -> ClientResult<Vec<T>>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = ClientResult<Option<T>>>,
{
    if concurrency <= 1 {
        let mut described = Vec::with_capacity(items.len());
        for item in items {
            if let Some(symbol) = describe(item).await? {
                described.push(symbol);
            }
        }
        return Ok(described);
    }

    let described: Vec<Option<T>> = stream::iter(items)
        .map(describe)
        .buffered(concurrency)
        .try_collect()
        .await?;
    Ok(described.into_iter().flatten().collect())
}
