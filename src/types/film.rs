use serde::{Deserialize, Serialize};

/// Complete metadata for a film, as persisted in `data.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    /// TMDB id
    pub id: u64,
    pub title: String,
    pub original_title: String,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub overview: String,
    /// Release date (YYYY-MM-DD), empty when unknown
    #[serde(default)]
    pub release_date: String,
    /// Runtime in minutes
    #[serde(default)]
    pub runtime: u32,
    /// Average rating (0-10 scale)
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub budget: u64,
    #[serde(default)]
    pub revenue: u64,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub production_companies: Vec<ProductionCompany>,
    #[serde(default)]
    pub production_countries: Vec<ProductionCountry>,
    #[serde(default)]
    pub spoken_languages: Vec<SpokenLanguage>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub imdb_id: Option<String>,
    pub homepage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCompany {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub origin_country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCountry {
    pub iso_3166_1: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpokenLanguage {
    pub iso_639_1: String,
    pub english_name: String,
    #[serde(default)]
    pub name: String,
}

impl Film {
    /// Create a film with only identity set; every other field is empty
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id,
            original_title: title.clone(),
            title,
            original_language: String::new(),
            overview: String::new(),
            release_date: String::new(),
            runtime: 0,
            vote_average: 0.0,
            vote_count: 0,
            popularity: 0.0,
            status: String::new(),
            tagline: String::new(),
            budget: 0,
            revenue: 0,
            adult: false,
            genres: Vec::new(),
            production_companies: Vec::new(),
            production_countries: Vec::new(),
            spoken_languages: Vec::new(),
            poster_path: None,
            backdrop_path: None,
            imdb_id: None,
            homepage: None,
        }
    }

    /// Release year parsed from the release date
    pub fn year(&self) -> Option<i32> {
        self.release_date
            .split('-')
            .next()
            .and_then(|y| y.parse().ok())
    }

    pub fn genre_names(&self) -> Vec<&str> {
        self.genres.iter().map(|g| g.name.as_str()).collect()
    }

    pub fn company_names(&self) -> Vec<&str> {
        self.production_companies
            .iter()
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn country_names(&self) -> Vec<&str> {
        self.production_countries
            .iter()
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn language_names(&self) -> Vec<&str> {
        self.spoken_languages
            .iter()
            .map(|l| l.english_name.as_str())
            .collect()
    }

    pub fn imdb_url(&self) -> Option<String> {
        self.imdb_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| format!("https://www.imdb.com/title/{id}"))
    }

    /// Title with the release year appended when known, e.g. `The Matrix (1999)`
    pub fn display_title(&self) -> String {
        match self.year() {
            Some(year) => format!("{} ({year})", self.title),
            None => self.title.clone(),
        }
    }
}
