use crate::{Error, Result};
use chrono::{Datelike, Utc};

/// First year a film could have been released
pub const EARLIEST_FILM_YEAR: i32 = 1888;
/// Highest page the search endpoint serves
pub const MAX_PAGE: u32 = 500;
const MIN_QUERY_CHARS: usize = 2;

/// Parameters of a title search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    /// Release year filter
    pub year: Option<i32>,
    pub include_adult: bool,
    /// 1-indexed result page
    pub page: u32,
    /// Preferred language (e.g. `en-US`)
    pub language: Option<String>,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            year: None,
            include_adult: false,
            page: 1,
            language: None,
        }
    }

    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn with_adult(mut self, include_adult: bool) -> Self {
        self.include_adult = include_adult;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Check the parameters before any remote call is made
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().chars().count() < MIN_QUERY_CHARS {
            return Err(Error::validation(
                "query",
                format!("must be at least {MIN_QUERY_CHARS} characters"),
            ));
        }

        if let Some(year) = self.year {
            let latest = Utc::now().year() + 1;
            if !(EARLIEST_FILM_YEAR..=latest).contains(&year) {
                return Err(Error::validation(
                    "year",
                    format!("{year} is outside {EARLIEST_FILM_YEAR}..={latest}"),
                ));
            }
        }

        if !(1..=MAX_PAGE).contains(&self.page) {
            return Err(Error::validation(
                "page",
                format!("{} is outside 1..={MAX_PAGE}", self.page),
            ));
        }

        Ok(())
    }
}
