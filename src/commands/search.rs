use super::prompt::Console;
use crate::Result;
use crate::config::ConfigStore;
use crate::storage::{Downloader, FilmStorage, SaveRequest, SavedFilm, render_details};
use crate::tmdb::{ImageUrls, MetadataProvider, SearchParams};
use crate::types::SearchResult;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

const OVERVIEW_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    pub query: String,
    pub year: Option<i32>,
    /// Include adult titles regardless of the configured preference
    pub adult: bool,
    pub page: u32,
    pub output: Option<PathBuf>,
    pub no_images: bool,
    /// Take the first result and save without confirmation
    pub yes: bool,
}

/// Search, let the user pick a result, show its details and save it.
///
/// Returns `None` when nothing was found or the user declined to save.
pub async fn search<P, R, W>(
    provider: &P,
    store: &ConfigStore,
    downloader: Option<Downloader>,
    args: &SearchArgs,
    console: &mut Console<R, W>,
) -> Result<Option<SavedFilm>>
where
    P: MetadataProvider + ?Sized,
    R: BufRead,
    W: Write,
{
    let config = store.load_config()?.user;

    let params = SearchParams::new(args.query.trim())
        .with_year(args.year)
        .with_adult(args.adult || config.include_adult)
        .with_page(args.page.max(1))
        .with_language(config.language.clone());
    params.validate()?;

    debug!(provider = provider.id(), "Searching for {:?}", params.query);
    let page = provider.search(&params).await?;
    if let Err(e) = store.mark_credentials_used() {
        warn!("Failed to update credentials: {}", e);
    }

    if page.is_empty() {
        console.say(format!("No films found for \"{}\".", params.query))?;
        return Ok(None);
    }

    console.say(format!(
        "Found {} results (page {} of {}):",
        page.total_results, page.page, page.total_pages
    ))?;
    console.blank()?;
    for (i, result) in page.results.iter().enumerate() {
        print_result(console, i + 1, result)?;
    }
    console.blank()?;

    let index = if args.yes {
        0
    } else {
        console.choose("Select a film", page.results.len())?
    };
    let selected = &page.results[index];

    let film = provider
        .film_details(selected.id, Some(&config.language))
        .await?;
    console.blank()?;
    console.say(render_details(&film).trim_end())?;
    console.blank()?;

    if !args.yes && !console.confirm("Save this film?", true)? {
        console.say("Not saved.")?;
        return Ok(None);
    }

    let download_images = config.download_images && !args.no_images;
    let images = if download_images {
        let base_url = provider.image_base_url().await;
        ImageUrls::for_film(
            &film,
            &base_url,
            config.image_quality,
            config.max_image_size,
        )
    } else {
        ImageUrls::default()
    };

    let mut storage = FilmStorage::new(config.default_output_dir.clone(), download_images);
    if let Some(downloader) = downloader {
        storage = storage.with_downloader(downloader);
    }

    let request = SaveRequest::new(&film)
        .with_output_dir(args.output.as_deref())
        .with_images(images);
    let saved = storage.save_film(&request).await?;

    info!("Saved film {} as {}", film.id, saved.directory_name);
    console.say(format!(
        "Saved {} to {}",
        film.display_title(),
        saved.directory.display()
    ))?;
    for failed in saved.failed_images() {
        console.say(format!("  Could not download {}", failed.kind))?;
    }

    Ok(Some(saved))
}

fn print_result<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    number: usize,
    result: &SearchResult,
) -> Result<()> {
    let year = result
        .year()
        .map_or_else(|| "????".to_string(), |y| y.to_string());

    console.say(format!(
        "{number:>3}. {} ({year})  {:.1}/10 ({} votes)",
        result.title, result.vote_average, result.vote_count
    ))?;
    if !result.overview.is_empty() {
        console.say(format!("     {}", preview(&result.overview)))?;
    }
    Ok(())
}

fn preview(text: &str) -> String {
    if text.chars().count() <= OVERVIEW_PREVIEW_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(OVERVIEW_PREVIEW_CHARS).collect();
    format!("{}...", cut.trim_end())
}
