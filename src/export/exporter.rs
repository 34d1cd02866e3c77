use super::formats::{CSV_HEADER, ExportFormat, csv_row, render_text};
use crate::storage::FilmStorage;
use crate::tmdb::ImageKind;
use crate::types::Film;
use crate::{Error, Result, fs_utils};
use chrono::Utc;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File stem of the aggregate export file
pub const SUMMARY_STEM: &str = "films-summary";

const TEXT_SEPARATOR: &str = "\n----------------------------------------\n\n";

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub destination: PathBuf,
    /// Collection to read; the storage default when `None`
    pub source_dir: Option<PathBuf>,
    /// Copy poster and backdrop next to each JSON export
    pub include_images: bool,
}

impl ExportOptions {
    pub fn new(format: ExportFormat, destination: impl Into<PathBuf>) -> Self {
        Self {
            format,
            destination: destination.into(),
            source_dir: None,
            include_images: false,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source_dir: Option<PathBuf>) -> Self {
        self.source_dir = source_dir;
        self
    }

    #[must_use]
    pub fn with_images(mut self, include_images: bool) -> Self {
        self.include_images = include_images;
        self
    }
}

/// What an export produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub summary: PathBuf,
    pub files: Vec<PathBuf>,
    pub exported: usize,
}

/// Writes the saved collection out in one of the supported formats
pub struct Exporter<'a> {
    storage: &'a FilmStorage,
}

impl<'a> Exporter<'a> {
    pub fn new(storage: &'a FilmStorage) -> Self {
        Self { storage }
    }

    /// Export every readable saved film into `options.destination`.
    ///
    /// Writes `films-summary.<ext>` plus one `<title>.<ext>` per film. Films
    /// with the same sanitized title share a file name and the later one wins.
    pub async fn export(&self, options: &ExportOptions) -> Result<ExportReport> {
        let source = options.source_dir.as_deref();
        let films = self.storage.load_all(source).await?;
        let ext = options.format.extension();

        fs_utils::ensure_dir(&options.destination).await?;
        debug!(
            "Exporting {} films as {} to {:?}",
            films.len(),
            ext,
            options.destination
        );

        let exported_at = Utc::now();
        let summary = options.destination.join(format!("{SUMMARY_STEM}.{ext}"));
        let summary_body = match options.format {
            ExportFormat::Json => {
                let all: Vec<&Film> = films.iter().map(|(_, film)| film).collect();
                serde_json::to_string_pretty(&all).map_err(|e| Error::parse(&summary, e))?
            }
            ExportFormat::Csv => csv_document(films.iter().map(|(_, film)| film)),
            ExportFormat::Txt => {
                let mut body = format!(
                    "Film collection export: {} films\nExported: {}\n",
                    films.len(),
                    exported_at.to_rfc3339()
                );
                for (_, film) in &films {
                    body.push_str(TEXT_SEPARATOR);
                    body.push_str(&render_text(film, exported_at));
                }
                body
            }
        };
        fs_utils::write_string(&summary, &summary_body).await?;

        let mut files = Vec::with_capacity(films.len());
        let mut written = HashSet::new();
        for (dir_name, film) in &films {
            let stem = fs_utils::sanitize_filename(&film.title);
            let path = options.destination.join(format!("{stem}.{ext}"));

            match options.format {
                ExportFormat::Json => {
                    fs_utils::write_json_pretty(&path, film).await?;
                    if options.include_images {
                        let images_dir = options.destination.join(format!("{stem}-images"));
                        self.copy_images(dir_name, source, &images_dir).await?;
                    }
                }
                ExportFormat::Csv => {
                    fs_utils::write_string(&path, &csv_document(std::iter::once(film))).await?;
                }
                ExportFormat::Txt => {
                    fs_utils::write_string(&path, &render_text(film, exported_at)).await?;
                }
            }

            if written.insert(path.clone()) {
                files.push(path);
            } else {
                warn!(
                    "{} shares the export file {:?} with an earlier film and replaces it",
                    dir_name, path
                );
            }
        }

        info!("Exported {} films to {:?}", files.len(), options.destination);

        Ok(ExportReport {
            summary,
            exported: files.len(),
            files,
        })
    }

    /// Copy whichever of `poster.jpg` and `backdrop.jpg` exist for a saved film
    async fn copy_images(
        &self,
        dir_name: &str,
        source: Option<&Path>,
        images_dir: &Path,
    ) -> Result<()> {
        let film_dir = self.storage.film_directory(dir_name, source)?;

        let mut present = Vec::new();
        for kind in ImageKind::ALL {
            let from = film_dir.join(kind.file_name());
            if fs_utils::exists(&from).await {
                present.push((kind, from));
            }
        }
        if present.is_empty() {
            return Ok(());
        }

        fs_utils::ensure_dir(images_dir).await?;
        for (kind, from) in present {
            let to = images_dir.join(kind.file_name());
            if let Err(e) = fs_utils::copy_file(&from, &to).await {
                warn!("Failed to copy {} for {}: {}", kind, dir_name, e);
            }
        }

        Ok(())
    }
}

fn csv_document<'f>(films: impl Iterator<Item = &'f Film>) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for film in films {
        out.push_str(&csv_row(film));
        out.push('\n');
    }
    out
}
