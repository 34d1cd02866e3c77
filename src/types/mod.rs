mod film;
mod search;

pub use film::{Film, Genre, ProductionCompany, ProductionCountry, SpokenLanguage};
pub use search::{SearchPage, SearchResult};
