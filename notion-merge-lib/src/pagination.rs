//! Cursor-driven reading of every record in a database.

use futures::stream::{self, Stream, TryStreamExt};

use notion_merge_client::{ApiError, WorkspaceApi};
use notion_merge_core::Record;

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Pages of records from `database_id`, in service order, one query per
/// item. A page that claims more results but carries no cursor ends the
/// stream.
pub fn record_pages<'a, A: WorkspaceApi>(
    api: &'a A,
    database_id: &'a str,
) -> impl Stream<Item = Result<Vec<Record>, ApiError>> + 'a {
    stream::try_unfold(Cursor::Start, move |cursor| async move {
        let start = match cursor {
            Cursor::Start => None,
            Cursor::Next(next) => Some(next),
            Cursor::Done => return Ok(None),
        };

        let page = api.query_database(database_id, start.as_deref()).await?;
        let next = match (page.has_more, page.next_cursor) {
            (true, Some(next)) => Cursor::Next(next),
            (true, None) => {
                log::warn!(
                    "Database {} reported more results without a cursor; stopping",
                    database_id
                );
                Cursor::Done
            }
            (false, _) => Cursor::Done,
        };
        Ok(Some((page.results, next)))
    })
}

/// Every record in `database_id`, loaded fully into memory.
pub async fn fetch_all_records<A: WorkspaceApi>(
    api: &A,
    database_id: &str,
) -> Result<Vec<Record>, ApiError> {
    record_pages(api, database_id).try_concat().await
}
