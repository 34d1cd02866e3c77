use serde::{Deserialize, Serialize};

/// Lightweight projection of a film shown in the selection list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    pub title: String,
    pub original_title: String,
    /// Release date (YYYY-MM-DD), empty when unknown
    pub release_date: String,
    pub vote_average: f64,
    pub vote_count: u64,
    pub overview: String,
    pub popularity: f64,
    pub adult: bool,
    pub video: bool,
    pub poster_path: Option<String>,
}

impl SearchResult {
    pub fn year(&self) -> Option<i32> {
        self.release_date
            .split('-')
            .next()
            .and_then(|y| y.parse().ok())
    }
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u64,
}

impl SearchPage {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
