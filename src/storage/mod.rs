//! Local persistence of films: one directory per film holding `data.json`,
//! a derived `metadata.txt` and optional poster/backdrop images.

mod downloader;
mod film_store;
mod metadata_text;

pub use downloader::{Downloader, ImageOutcome};
pub use film_store::{
    DATA_FILE, FilmStorage, METADATA_FILE, SaveRequest, SavedFilm, StorageStats,
    create_film_directory_name,
};
pub use metadata_text::{format_currency, render_metadata};
pub(crate) use metadata_text::render_details;
