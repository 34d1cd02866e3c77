use crate::{
    Result,
    tmdb::SearchParams,
    types::{Film, SearchPage},
};
use async_trait::async_trait;

/// Remote source of film metadata
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Provider identifier (e.g., "tmdb")
    fn id(&self) -> &'static str;

    /// Human-readable provider name
    fn name(&self) -> &'static str;

    /// Search films by title. Implementations validate `params` first.
    async fn search(&self, params: &SearchParams) -> Result<SearchPage>;

    /// Fetch the full record for a film
    async fn film_details(&self, id: u64, language: Option<&str>) -> Result<Film>;

    /// Root URL for image downloads
    async fn image_base_url(&self) -> String;

    /// Cheap authenticated call used to check connectivity and credentials
    async fn probe(&self) -> Result<()>;
}
