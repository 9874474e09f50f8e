use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::debug;

use super::types::RecommendationRecord;

/// Looks up the poster image path of a title. Implementations swallow their
/// own failures: anything that goes wrong is reported as `None`.
#[async_trait]
pub trait PosterLookup: Send + Sync {
    async fn poster_path(&self, id: &str) -> Option<String>;
}

/// Adds `poster_path` to every record. At most `concurrency` lookups are in
/// flight; the output keeps the input order no matter which lookup finishes
/// first.
pub async fn enrich<L>(
    records: Vec<RecommendationRecord>,
    lookup: &L,
    concurrency: usize,
) -> Vec<RecommendationRecord>
where
    L: PosterLookup + ?Sized,
{
    stream::iter(records.into_iter().map(move |record| async move {
        let poster_path = match record.id() {
            Some(id) => lookup.poster_path(&id).await,
            None => {
                debug!("Recommendation without usable id, skipping poster lookup");
                None
            }
        };
        record.with_poster_path(poster_path)
    }))
    .buffered(concurrency.max(1))
    .collect()
    .await
}
