use crate::storage::{format_currency, render_details};
use crate::types::Film;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Header row of CSV exports
pub const CSV_HEADER: &str =
    "Title,Original Title,Release Date,Runtime,Rating,Vote Count,Overview,Genres,Budget,Revenue";

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Txt,
}

impl ExportFormat {
    /// File extension, without the dot
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Txt => "txt",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "txt" | "text" => Ok(Self::Txt),
            _ => Err(Error::validation(
                "format",
                format!("unsupported export format {s:?} (expected json, csv or txt)"),
            )),
        }
    }
}

/// Quote a CSV cell only when it needs it
fn csv_cell(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        quote(value)
    } else {
        value.to_string()
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// One CSV data row for a film. The overview is always quoted and kept on one line.
#[must_use]
pub fn csv_row(film: &Film) -> String {
    let overview = film
        .overview
        .split(['\r', '\n'])
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    [
        csv_cell(&film.title),
        csv_cell(&film.original_title),
        csv_cell(&film.release_date),
        film.runtime.to_string(),
        format!("{:.1}", film.vote_average),
        film.vote_count.to_string(),
        quote(&overview),
        csv_cell(&film.genre_names().join(";")),
        film.budget.to_string(),
        film.revenue.to_string(),
    ]
    .join(",")
}

/// Text export block: the saved-metadata layout plus production details
#[must_use]
pub fn render_text(film: &Film, exported_at: DateTime<Utc>) -> String {
    let mut out = render_details(film);

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Production Companies: {}",
        join_or_none(&film.company_names())
    );
    let _ = writeln!(
        out,
        "Production Countries: {}",
        join_or_none(&film.country_names())
    );
    let _ = writeln!(
        out,
        "Spoken Languages: {}",
        join_or_none(&film.language_names())
    );
    if film.budget > 0 && film.revenue > 0 {
        let _ = writeln!(
            out,
            "Box Office Ratio: {:.2}x ({} on {})",
            film.revenue as f64 / film.budget as f64,
            format_currency(film.revenue),
            format_currency(film.budget)
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Exported: {}", exported_at.to_rfc3339());

    out
}

fn join_or_none(values: &[&str]) -> String {
    if values.is_empty() {
        "None".to_string()
    } else {
        values.join(", ")
    }
}
