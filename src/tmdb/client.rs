use super::api_types::{ConfigurationResponse, MovieDetails, MovieResult, SearchResponse};
use crate::{
    Result,
    tmdb::{HttpClient, MetadataProvider, SearchParams},
    types::{
        Film, Genre, ProductionCompany, ProductionCountry, SearchPage, SearchResult,
        SpokenLanguage,
    },
};
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
/// Image root used when the configuration endpoint cannot be reached
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/";

const UNKNOWN_TITLE: &str = "Unknown Title";

pub struct TmdbClient {
    client: HttpClient,
    api_key: String,
    image_base: OnceCell<String>,
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, TMDB_BASE_URL)
    }

    /// Client against a non-default API root
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(base_url)?,
            api_key: api_key.into(),
            image_base: OnceCell::new(),
        })
    }

    /// Shared HTTP client, reused for image downloads
    pub fn http(&self) -> &reqwest::Client {
        self.client.inner()
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        extra_params: &[(&str, &str)],
    ) -> Result<T> {
        let mut params: Vec<(&str, &str)> = Vec::with_capacity(extra_params.len() + 1);
        params.push(("api_key", self.api_key.as_str()));
        params.extend_from_slice(extra_params);

        self.client.get_with_params(endpoint, &params).await
    }

    async fn fetch_image_base(&self) -> Result<String> {
        let config: ConfigurationResponse = self.request("/configuration", &[]).await?;
        let images = config.images;

        debug!(
            "Image configuration: {} poster sizes, {} backdrop sizes",
            images.poster_sizes.len(),
            images.backdrop_sizes.len()
        );

        Ok(images
            .secure_base_url
            .or(images.base_url)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_BASE.to_string()))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<MovieResult> for SearchResult {
    fn from(movie: MovieResult) -> Self {
        let title = non_empty(movie.title).unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        Self {
            id: movie.id,
            original_title: non_empty(movie.original_title).unwrap_or_else(|| title.clone()),
            title,
            release_date: movie.release_date.unwrap_or_default(),
            vote_average: movie.vote_average.unwrap_or_default(),
            vote_count: movie.vote_count.unwrap_or_default(),
            overview: movie.overview.unwrap_or_default(),
            popularity: movie.popularity.unwrap_or_default(),
            adult: movie.adult.unwrap_or_default(),
            video: movie.video.unwrap_or_default(),
            poster_path: non_empty(movie.poster_path),
        }
    }
}

impl From<MovieDetails> for Film {
    fn from(movie: MovieDetails) -> Self {
        let title = non_empty(movie.title).unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        Self {
            id: movie.id,
            original_title: non_empty(movie.original_title).unwrap_or_else(|| title.clone()),
            title,
            original_language: movie.original_language.unwrap_or_default(),
            overview: movie.overview.unwrap_or_default(),
            release_date: movie.release_date.unwrap_or_default(),
            runtime: movie.runtime.unwrap_or_default(),
            vote_average: movie.vote_average.unwrap_or_default(),
            vote_count: movie.vote_count.unwrap_or_default(),
            popularity: movie.popularity.unwrap_or_default(),
            status: movie.status.unwrap_or_default(),
            tagline: movie.tagline.unwrap_or_default(),
            budget: movie.budget.unwrap_or_default(),
            revenue: movie.revenue.unwrap_or_default(),
            adult: movie.adult.unwrap_or_default(),
            genres: movie
                .genres
                .into_iter()
                .map(|g| Genre {
                    id: g.id,
                    name: g.name.unwrap_or_default(),
                })
                .collect(),
            production_companies: movie
                .production_companies
                .into_iter()
                .map(|c| ProductionCompany {
                    id: c.id,
                    name: c.name.unwrap_or_default(),
                    origin_country: c.origin_country.unwrap_or_default(),
                })
                .collect(),
            production_countries: movie
                .production_countries
                .into_iter()
                .map(|c| ProductionCountry {
                    name: c.name.unwrap_or_else(|| c.iso_3166_1.clone()),
                    iso_3166_1: c.iso_3166_1,
                })
                .collect(),
            spoken_languages: movie
                .spoken_languages
                .into_iter()
                .map(|l| SpokenLanguage {
                    english_name: non_empty(l.english_name)
                        .unwrap_or_else(|| l.iso_639_1.clone()),
                    name: l.name.unwrap_or_default(),
                    iso_639_1: l.iso_639_1,
                })
                .collect(),
            poster_path: non_empty(movie.poster_path),
            backdrop_path: non_empty(movie.backdrop_path),
            imdb_id: non_empty(movie.imdb_id),
            homepage: non_empty(movie.homepage),
        }
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    fn id(&self) -> &'static str {
        "tmdb"
    }

    fn name(&self) -> &'static str {
        "The Movie Database"
    }

    async fn search(&self, params: &SearchParams) -> Result<SearchPage> {
        params.validate()?;

        let query = params.query.trim();
        let page = params.page.to_string();
        let year_str;
        let mut query_params = vec![
            ("query", query),
            ("include_adult", if params.include_adult { "true" } else { "false" }),
            ("page", page.as_str()),
        ];
        if let Some(year) = params.year {
            year_str = year.to_string();
            query_params.push(("year", &year_str));
        }
        if let Some(ref language) = params.language {
            query_params.push(("language", language));
        }

        let response: SearchResponse<MovieResult> =
            self.request("/search/movie", &query_params).await?;

        debug!(
            "Search {:?} page {} returned {} results",
            query,
            params.page,
            response.results.len()
        );

        let results: Vec<SearchResult> = response.results.into_iter().map(Into::into).collect();
        Ok(SearchPage {
            page: response.page.unwrap_or(params.page),
            total_pages: response.total_pages.unwrap_or(1),
            total_results: response.total_results.unwrap_or(results.len() as u64),
            results,
        })
    }

    async fn film_details(&self, id: u64, language: Option<&str>) -> Result<Film> {
        let endpoint = format!("/movie/{id}");
        let mut params = Vec::new();
        if let Some(language) = language {
            params.push(("language", language));
        }

        let details: MovieDetails = self.request(&endpoint, &params).await?;
        Ok(details.into())
    }

    async fn image_base_url(&self) -> String {
        match self
            .image_base
            .get_or_try_init(|| self.fetch_image_base())
            .await
        {
            Ok(url) => url.clone(),
            Err(e) => {
                warn!("Falling back to default image URL: {}", e);
                DEFAULT_IMAGE_BASE.to_string()
            }
        }
    }

    async fn probe(&self) -> Result<()> {
        let url = self.fetch_image_base().await?;
        let _ = self.image_base.set(url);
        Ok(())
    }
}
