use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::enrich::{enrich, PosterLookup};
use super::error::RecommendError;
use super::process::Recommender;
use super::types::{EnrichedResponse, RecommendationDocument};

pub struct RecommendationService {
    recommender: Arc<dyn Recommender>,
    posters: Arc<dyn PosterLookup>,
    enrich_concurrency: usize,
}

impl RecommendationService {
    pub fn new(
        recommender: Arc<dyn Recommender>,
        posters: Arc<dyn PosterLookup>,
        enrich_concurrency: usize,
    ) -> Self {
        Self {
            recommender,
            posters,
            enrich_concurrency: enrich_concurrency.max(1),
        }
    }

    pub async fn recommend(&self, query: Option<&str>) -> Result<EnrichedResponse, RecommendError> {
        let query = query
            .filter(|q| !q.is_empty())
            .ok_or(RecommendError::MissingQuery)?;

        let start = Instant::now();
        let records = match self.recommender.recommend(query).await? {
            RecommendationDocument::Error(message) => {
                warn!(query = %query, error = %message, "Recommender reported an error");
                return Err(RecommendError::Upstream(message));
            }
            RecommendationDocument::Recommendations(records) => records,
        };

        let count = records.len();
        let recommendations = enrich(records, self.posters.as_ref(), self.enrich_concurrency).await;

        info!(
            query = %query,
            count = count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Recommendations ready"
        );

        Ok(EnrichedResponse { recommendations })
    }
}
