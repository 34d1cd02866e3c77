use crate::types::Film;
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Human-readable summary written next to `data.json` as `metadata.txt`
#[must_use]
pub fn render_metadata(film: &Film, saved_at: DateTime<Utc>) -> String {
    let mut out = render_details(film);
    let _ = writeln!(out);
    let _ = writeln!(out, "Saved: {}", saved_at.to_rfc3339());
    out
}

/// The labeled block shared by `metadata.txt` and text exports
pub(crate) fn render_details(film: &Film) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Title: {}", film.title);
    if film.original_title != film.title {
        let _ = writeln!(out, "Original Title: {}", film.original_title);
    }
    let _ = writeln!(out, "TMDB ID: {}", film.id);
    let _ = writeln!(out, "Release Date: {}", or_unknown(&film.release_date));
    let _ = writeln!(out, "Runtime: {}", format_runtime(film.runtime));
    let _ = writeln!(
        out,
        "Rating: {:.1}/10 ({} votes)",
        film.vote_average, film.vote_count
    );
    let _ = writeln!(out, "Popularity: {:.1}", film.popularity);
    let _ = writeln!(out, "Status: {}", or_unknown(&film.status));
    if !film.tagline.is_empty() {
        let _ = writeln!(out, "Tagline: {}", film.tagline);
    }
    let _ = writeln!(out, "Genres: {}", join_or_unknown(&film.genre_names()));
    if !film.original_language.is_empty() {
        let _ = writeln!(out, "Original Language: {}", film.original_language);
    }
    let _ = writeln!(out, "Budget: {}", format_money(film.budget));
    let _ = writeln!(out, "Revenue: {}", format_money(film.revenue));
    if let Some(url) = film.imdb_url() {
        let _ = writeln!(out, "IMDB: {url}");
    }
    if let Some(ref homepage) = film.homepage {
        let _ = writeln!(out, "Homepage: {homepage}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Overview:");
    let _ = writeln!(
        out,
        "{}",
        if film.overview.is_empty() {
            "No overview available."
        } else {
            film.overview.as_str()
        }
    );

    out
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() { "Unknown" } else { value }
}

pub(crate) fn join_or_unknown(values: &[&str]) -> String {
    if values.is_empty() {
        "Unknown".to_string()
    } else {
        values.join(", ")
    }
}

fn format_runtime(minutes: u32) -> String {
    match minutes {
        0 => "Unknown".to_string(),
        m if m < 60 => format!("{m} minutes"),
        m => format!("{m} minutes ({}h {}m)", m / 60, m % 60),
    }
}

fn format_money(amount: u64) -> String {
    if amount == 0 {
        "Unknown".to_string()
    } else {
        format_currency(amount)
    }
}

/// `63000000` -> `$63,000,000`
#[must_use]
pub fn format_currency(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("${grouped}")
}
