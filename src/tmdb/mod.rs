//! Metadata client adapter for The Movie Database

mod api_types;
mod client;
mod http;
mod images;
mod provider;
mod search;

pub use client::{DEFAULT_IMAGE_BASE, TMDB_BASE_URL, TmdbClient};
pub use http::HttpClient;
pub use images::{ImageKind, ImageUrls};
pub use provider::MetadataProvider;
pub use search::{EARLIEST_FILM_YEAR, MAX_PAGE, SearchParams};
