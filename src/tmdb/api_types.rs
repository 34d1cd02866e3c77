use serde::Deserialize;

// Search responses
#[derive(Debug, Deserialize)]
pub struct SearchResponse<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    pub page: Option<u32>,
    pub total_pages: Option<u32>,
    pub total_results: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct MovieResult {
    pub id: u64,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    pub overview: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub popularity: Option<f64>,
    pub adult: Option<bool>,
    pub video: Option<bool>,
}

// Detail responses
#[derive(Debug, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub original_language: Option<String>,
    pub tagline: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub popularity: Option<f64>,
    pub status: Option<String>,
    pub budget: Option<u64>,
    pub revenue: Option<u64>,
    pub adult: Option<bool>,
    pub imdb_id: Option<String>,
    pub homepage: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub production_companies: Vec<Company>,
    #[serde(default)]
    pub production_countries: Vec<Country>,
    #[serde(default)]
    pub spoken_languages: Vec<Language>,
}

// Common types
#[derive(Debug, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Company {
    pub id: u64,
    pub name: Option<String>,
    pub origin_country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Country {
    pub iso_3166_1: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Language {
    pub iso_639_1: String,
    pub english_name: Option<String>,
    pub name: Option<String>,
}

// Configuration
#[derive(Debug, Deserialize)]
pub struct ConfigurationResponse {
    pub images: ImagesConfiguration,
}

#[derive(Debug, Deserialize)]
pub struct ImagesConfiguration {
    pub base_url: Option<String>,
    pub secure_base_url: Option<String>,
    #[serde(default)]
    pub poster_sizes: Vec<String>,
    #[serde(default)]
    pub backdrop_sizes: Vec<String>,
}
