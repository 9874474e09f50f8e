pub mod enrich;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod process;
pub mod service;
pub mod types;

pub use enrich::{enrich, PosterLookup};
pub use error::RecommendError;
pub use handlers::*;
pub use process::{ProcessRecommender, Recommender};
pub use service::RecommendationService;
pub use types::*;
