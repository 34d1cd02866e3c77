use super::prompt::Console;
use crate::Result;
use crate::storage::{FilmStorage, StorageStats, render_details};
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct ListArgs {
    pub output: Option<PathBuf>,
    pub stats: bool,
    pub show: Option<String>,
    pub delete: Option<String>,
    /// Delete without confirmation
    pub yes: bool,
}

/// List saved films, or show, delete or summarize them
pub async fn list<R: BufRead, W: Write>(
    storage: &FilmStorage,
    args: &ListArgs,
    console: &mut Console<R, W>,
) -> Result<()> {
    let output = args.output.as_deref();

    if let Some(ref name) = args.delete {
        return delete(storage, name, args, console).await;
    }

    if let Some(ref name) = args.show {
        return match storage.get_saved_film(name, output).await? {
            Some(film) => {
                console.say(render_details(&film).trim_end())?;
                console.say(format!(
                    "Directory: {}",
                    storage.film_directory(name, output)?.display()
                ))
            }
            None => console.say(format!("No saved film named {name}.")),
        };
    }

    if args.stats {
        let stats = storage.get_storage_stats(output).await?;
        return print_stats(console, &stats);
    }

    let mut films = storage.load_all(output).await?;
    if films.is_empty() {
        console.say(format!(
            "No saved films in {}.",
            storage.base_dir(output).display()
        ))?;
        return Ok(());
    }

    films.sort_by(|(_, a), (_, b)| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then(a.release_date.cmp(&b.release_date))
    });

    console.say(format!(
        "{} saved films in {}:",
        films.len(),
        storage.base_dir(output).display()
    ))?;
    console.blank()?;
    for (dir_name, film) in &films {
        console.say(format!(
            "  {:<40} {:.1}/10  [{dir_name}]",
            film.display_title(),
            film.vote_average
        ))?;
    }

    Ok(())
}

async fn delete<R: BufRead, W: Write>(
    storage: &FilmStorage,
    name: &str,
    args: &ListArgs,
    console: &mut Console<R, W>,
) -> Result<()> {
    let output = args.output.as_deref();
    let label = match storage.get_saved_film(name, output).await {
        Ok(Some(film)) => film.display_title(),
        _ => name.to_string(),
    };

    if !args.yes && !console.confirm(&format!("Delete {label}?"), false)? {
        console.say("Nothing deleted.")?;
        return Ok(());
    }

    storage.delete_film(name, output).await?;
    console.say(format!("Deleted {label}."))
}

fn print_stats<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    stats: &StorageStats,
) -> Result<()> {
    console.say(format!("Films:        {}", stats.total_films))?;
    console.say(format!("Total size:   {}", format_bytes(stats.total_size)))?;
    console.say(format!("Average size: {}", format_bytes(stats.average_size)))
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
