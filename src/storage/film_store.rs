use super::downloader::{Downloader, ImageOutcome};
use super::metadata_text::render_metadata;
use crate::config::UserConfig;
use crate::fs_utils::{self, sanitize_filename};
use crate::tmdb::ImageUrls;
use crate::types::Film;
use crate::{Error, Result};
use chrono::Utc;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Canonical film record inside a film directory
pub const DATA_FILE: &str = "data.json";
/// Derived human-readable summary, never read back
pub const METADATA_FILE: &str = "metadata.txt";

/// Directory name for a film: `{id}-{sanitized title}`.
///
/// The id prefix keeps films with identical titles apart.
#[must_use]
pub fn create_film_directory_name(id: u64, title: &str) -> String {
    format!("{id}-{}", sanitize_filename(title))
}

/// A film to persist
#[derive(Debug, Clone)]
pub struct SaveRequest<'a> {
    pub film: &'a Film,
    /// Base directory override; the configured default is used when `None`
    pub output_dir: Option<&'a Path>,
    /// Images to fetch when image downloads are enabled
    pub images: ImageUrls,
}

impl<'a> SaveRequest<'a> {
    pub fn new(film: &'a Film) -> Self {
        Self {
            film,
            output_dir: None,
            images: ImageUrls::default(),
        }
    }

    pub fn with_output_dir(mut self, output_dir: Option<&'a Path>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_images(mut self, images: ImageUrls) -> Self {
        self.images = images;
        self
    }
}

/// Result of a successful save
#[derive(Debug)]
pub struct SavedFilm {
    /// Absolute path of the film directory
    pub directory: PathBuf,
    pub directory_name: String,
    /// One entry per attempted image download
    pub images: Vec<ImageOutcome>,
}

impl SavedFilm {
    pub fn failed_images(&self) -> impl Iterator<Item = &ImageOutcome> {
        self.images.iter().filter(|o| !o.is_ok())
    }
}

/// Aggregate size of the saved collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub total_films: usize,
    /// Bytes across the top-level files of every film directory
    pub total_size: u64,
    /// `total_size / total_films`, 0 when empty
    pub average_size: u64,
}

/// Film storage service
pub struct FilmStorage {
    default_dir: PathBuf,
    download_images: bool,
    downloader: Option<Downloader>,
}

impl FilmStorage {
    pub fn new(default_dir: impl Into<PathBuf>, download_images: bool) -> Self {
        Self {
            default_dir: default_dir.into(),
            download_images,
            downloader: None,
        }
    }

    pub fn from_config(config: &UserConfig) -> Self {
        Self::new(config.default_output_dir.clone(), config.download_images)
    }

    /// Share an existing HTTP client for image downloads
    #[must_use]
    pub fn with_downloader(mut self, downloader: Downloader) -> Self {
        self.downloader = Some(downloader);
        self
    }

    /// Effective base directory: explicit override, else the configured default
    pub fn base_dir(&self, output_dir: Option<&Path>) -> PathBuf {
        output_dir.map_or_else(|| self.default_dir.clone(), Path::to_path_buf)
    }

    /// Path of a saved film directory under the effective base directory
    pub fn film_directory(&self, dir_name: &str, output_dir: Option<&Path>) -> Result<PathBuf> {
        validate_dir_name(dir_name)?;
        Ok(self.base_dir(output_dir).join(dir_name))
    }

    /// Persist a film: `data.json`, `metadata.txt` and, when enabled, images.
    ///
    /// Failures creating the directory or writing `data.json` are fatal.
    /// `metadata.txt` and image downloads are best effort.
    pub async fn save_film(&self, request: &SaveRequest<'_>) -> Result<SavedFilm> {
        let film = request.film;
        let directory_name = create_film_directory_name(film.id, &film.title);
        let directory = self.base_dir(request.output_dir).join(&directory_name);

        fs_utils::ensure_dir(&directory).await?;
        let directory = tokio::fs::canonicalize(&directory)
            .await
            .map_err(|e| Error::fs(&directory, "canonicalize", e))?;

        fs_utils::write_json_pretty(&directory.join(DATA_FILE), film).await?;

        let metadata_path = directory.join(METADATA_FILE);
        if let Err(e) =
            fs_utils::write_string(&metadata_path, &render_metadata(film, Utc::now())).await
        {
            warn!("Failed to write {:?}: {}", metadata_path, e);
        }

        let images = if self.download_images && !request.images.is_empty() {
            match self.downloader() {
                Ok(downloader) => downloader.download_all(&request.images, &directory).await,
                Err(e) => {
                    warn!("Skipping image downloads: {}", e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        info!("Saved {} to {:?}", film.display_title(), directory);

        Ok(SavedFilm {
            directory,
            directory_name,
            images,
        })
    }

    fn downloader(&self) -> Result<Downloader> {
        match self.downloader {
            Some(ref downloader) => Ok(downloader.clone()),
            None => Downloader::standalone(),
        }
    }

    /// Names of every subdirectory of the base directory containing `data.json`.
    ///
    /// Order follows directory enumeration and carries no meaning. A missing
    /// base directory yields an empty list.
    pub async fn list_saved_films(&self, output_dir: Option<&Path>) -> Result<Vec<String>> {
        let base = self.base_dir(output_dir);
        if !fs_utils::is_dir(&base).await {
            debug!("Base directory {:?} does not exist", base);
            return Ok(Vec::new());
        }

        let mut entries = tokio::fs::read_dir(&base)
            .await
            .map_err(|e| Error::fs(&base, "read_dir", e))?;

        let mut films = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::fs(&base, "read_dir", e))?
        {
            let path = entry.path();
            if !fs_utils::is_dir(&path).await || !fs_utils::exists(&path.join(DATA_FILE)).await {
                continue;
            }

            match entry.file_name().into_string() {
                Ok(name) => films.push(name),
                Err(name) => warn!("Skipping non UTF-8 directory name {:?}", name),
            }
        }

        Ok(films)
    }

    /// Read a saved film. A missing `data.json` yields `None`; malformed JSON is an error.
    pub async fn get_saved_film(
        &self,
        dir_name: &str,
        output_dir: Option<&Path>,
    ) -> Result<Option<Film>> {
        let path = self.film_directory(dir_name, output_dir)?.join(DATA_FILE);

        let content = match fs_utils::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::parse(&path, e))
    }

    /// Every saved film that parses, skipping corrupt entries with a warning
    pub async fn load_all(&self, output_dir: Option<&Path>) -> Result<Vec<(String, Film)>> {
        let mut films = Vec::new();

        for name in self.list_saved_films(output_dir).await? {
            match self.get_saved_film(&name, output_dir).await {
                Ok(Some(film)) => films.push((name, film)),
                Ok(None) => debug!("{} disappeared while loading", name),
                Err(e) => warn!("Skipping unreadable film {}: {}", name, e),
            }
        }

        Ok(films)
    }

    /// Remove a saved film directory; an absent directory is a no-op
    pub async fn delete_film(&self, dir_name: &str, output_dir: Option<&Path>) -> Result<()> {
        let directory = self.film_directory(dir_name, output_dir)?;
        fs_utils::remove_dir_all(&directory).await?;
        info!("Deleted {:?}", directory);
        Ok(())
    }

    /// Totals over the top-level files of every recognised film directory
    pub async fn get_storage_stats(&self, output_dir: Option<&Path>) -> Result<StorageStats> {
        let base = self.base_dir(output_dir);
        let films = self.list_saved_films(output_dir).await?;

        let directories: Vec<PathBuf> = films.iter().map(|name| base.join(name)).collect();
        let total_size = tokio::task::spawn_blocking(move || {
            directories
                .iter()
                .map(|directory| directory_file_size(directory))
                .sum::<u64>()
        })
        .await
        .map_err(|e| Error::fs(&base, "stat", std::io::Error::other(e)))?;

        let total_films = films.len();
        let average_size = if total_films == 0 {
            0
        } else {
            total_size / total_films as u64
        };

        Ok(StorageStats {
            total_films,
            total_size,
            average_size,
        })
    }
}

/// Sum of the sizes of files directly inside `path`
fn directory_file_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| match e.metadata() {
            Ok(metadata) => Some(metadata.len()),
            Err(err) => {
                warn!("Failed to read metadata for {:?}: {}", e.path(), err);
                None
            }
        })
        .sum()
}

/// A film directory name must be a single plain path component
fn validate_dir_name(dir_name: &str) -> Result<()> {
    let mut components = Path::new(dir_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(Error::validation(
            "film directory",
            format!("{dir_name:?} is not a plain directory name"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::tests::fixtures::{POSTER_BYTES, image_server};
    use crate::types::Genre;
    use tempfile::TempDir;

    fn matrix() -> Film {
        let mut film = Film::new(603, "The Matrix");
        film.release_date = "1999-03-30".to_string();
        film.overview = "A hacker learns the truth.".to_string();
        film.vote_average = 8.2;
        film.vote_count = 24_000;
        film.popularity = 81.337;
        film.genres = vec![Genre {
            id: 28,
            name: "Action".to_string(),
        }];
        film
    }

    #[test]
    fn test_directory_name() {
        assert_eq!(create_film_directory_name(603, "The Matrix"), "603-The-Matrix");
        assert_eq!(
            create_film_directory_name(1, "Who/What: <Why>?"),
            "1-WhoWhat-Why"
        );
        assert_ne!(
            create_film_directory_name(1, "Hamlet"),
            create_film_directory_name(2, "Hamlet")
        );
    }

    #[tokio::test]
    async fn test_save_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilmStorage::new(temp_dir.path(), false);

        let saved = storage.save_film(&SaveRequest::new(&matrix())).await.unwrap();

        assert_eq!(saved.directory_name, "603-The-Matrix");
        assert!(saved.directory.is_absolute());
        assert!(saved.directory.ends_with("603-The-Matrix"));
        assert!(saved.images.is_empty());

        let data = std::fs::read_to_string(saved.directory.join(DATA_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert_eq!(json["id"], 603);

        let text = std::fs::read_to_string(saved.directory.join(METADATA_FILE)).unwrap();
        assert!(text.starts_with("Title: The Matrix"));
    }

    #[tokio::test]
    async fn test_save_and_get_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilmStorage::new(temp_dir.path(), false);
        let film = matrix();

        let saved = storage.save_film(&SaveRequest::new(&film)).await.unwrap();
        let loaded = storage
            .get_saved_film(&saved.directory_name, None)
            .await
            .unwrap();

        assert_eq!(loaded, Some(film));
    }

    #[tokio::test]
    async fn test_explicit_output_dir_wins() {
        let default_dir = TempDir::new().unwrap();
        let other_dir = TempDir::new().unwrap();
        let storage = FilmStorage::new(default_dir.path(), false);
        let film = matrix();

        storage
            .save_film(&SaveRequest::new(&film).with_output_dir(Some(other_dir.path())))
            .await
            .unwrap();

        assert!(storage.list_saved_films(None).await.unwrap().is_empty());
        assert_eq!(
            storage.list_saved_films(Some(other_dir.path())).await.unwrap(),
            vec!["603-The-Matrix".to_string()]
        );
    }

    #[tokio::test]
    async fn test_image_download_failure_does_not_fail_save() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilmStorage::new(temp_dir.path(), true);
        let film = matrix();
        let images = ImageUrls {
            poster: Some("http://127.0.0.1:9/w500/poster.jpg".to_string()),
            backdrop: Some("http://127.0.0.1:9/w1280/backdrop.jpg".to_string()),
        };

        let saved = storage
            .save_film(&SaveRequest::new(&film).with_images(images))
            .await
            .unwrap();

        assert_eq!(saved.images.len(), 2);
        assert_eq!(saved.failed_images().count(), 2);
        assert!(saved.directory.join(DATA_FILE).exists());
        assert!(!saved.directory.join("poster.jpg").exists());
        assert!(!saved.directory.join("backdrop.jpg").exists());
    }

    #[tokio::test]
    async fn test_partial_image_success() {
        let temp_dir = TempDir::new().unwrap();
        let base = image_server().await;
        let storage = FilmStorage::new(temp_dir.path(), true);
        let film = matrix();
        let images = ImageUrls {
            poster: Some(format!("{base}/w500/poster.jpg")),
            backdrop: Some(format!("{base}/w1280/backdrop.jpg")),
        };

        let saved = storage
            .save_film(&SaveRequest::new(&film).with_images(images))
            .await
            .unwrap();

        assert_eq!(saved.images.len(), 2);
        assert_eq!(saved.failed_images().count(), 1);
        assert_eq!(
            std::fs::read(saved.directory.join("poster.jpg")).unwrap(),
            POSTER_BYTES
        );
        assert!(!saved.directory.join("backdrop.jpg").exists());
        assert!(saved.directory.join(DATA_FILE).exists());
    }

    #[tokio::test]
    async fn test_images_skipped_when_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilmStorage::new(temp_dir.path(), false);
        let film = matrix();
        let images = ImageUrls {
            poster: Some("http://127.0.0.1:9/poster.jpg".to_string()),
            backdrop: None,
        };

        let saved = storage
            .save_film(&SaveRequest::new(&film).with_images(images))
            .await
            .unwrap();

        assert!(saved.images.is_empty());
    }

    #[tokio::test]
    async fn test_list_missing_base_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilmStorage::new(temp_dir.path().join("does-not-exist"), false);

        assert!(storage.list_saved_films(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_requires_data_json() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilmStorage::new(temp_dir.path(), false);

        storage.save_film(&SaveRequest::new(&matrix())).await.unwrap();
        std::fs::create_dir(temp_dir.path().join("42-Not-A-Film")).unwrap();
        std::fs::write(temp_dir.path().join("42-Not-A-Film").join(METADATA_FILE), "x").unwrap();
        std::fs::write(temp_dir.path().join("stray.json"), "{}").unwrap();

        let films = storage.list_saved_films(None).await.unwrap();
        assert_eq!(films, vec!["603-The-Matrix".to_string()]);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilmStorage::new(temp_dir.path(), false);

        assert!(storage.get_saved_film("1-Nothing", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_corrupt_is_filesystem_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilmStorage::new(temp_dir.path(), false);
        let directory = temp_dir.path().join("7-Broken");
        std::fs::create_dir(&directory).unwrap();
        std::fs::write(directory.join(DATA_FILE), "{ broken").unwrap();

        let err = storage.get_saved_film("7-Broken", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileSystem);

        // The listing still recognises it; loading everything skips it
        assert_eq!(storage.list_saved_films(None).await.unwrap().len(), 1);
        assert!(storage.load_all(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilmStorage::new(temp_dir.path(), false);

        let saved = storage.save_film(&SaveRequest::new(&matrix())).await.unwrap();
        storage.delete_film(&saved.directory_name, None).await.unwrap();

        assert!(!saved.directory.exists());
        storage.delete_film(&saved.directory_name, None).await.unwrap();
        storage.delete_film("0-Never-Existed", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilmStorage::new(temp_dir.path().join("films"), false);

        for name in ["..", "../other", "a/b", "", "/abs"] {
            let err = storage.delete_film(name, None).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{name:?}");
        }
    }

    #[tokio::test]
    async fn test_stats_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilmStorage::new(temp_dir.path(), false);

        let stats = storage.get_storage_stats(None).await.unwrap();
        assert_eq!(stats, StorageStats::default());
        assert_eq!(stats.average_size, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stats_on_worker_runtime_skip_unrecognised_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilmStorage::new(temp_dir.path(), false);
        let saved = storage.save_film(&SaveRequest::new(&matrix())).await.unwrap();
        let stray = temp_dir.path().join("not-a-film");
        std::fs::create_dir(&stray).unwrap();
        std::fs::write(stray.join("notes.txt"), vec![b'x'; 2048]).unwrap();

        let expected: u64 = std::fs::read_dir(&saved.directory)
            .unwrap()
            .map(|e| e.unwrap().metadata().unwrap().len())
            .sum();

        let stats = storage.get_storage_stats(None).await.unwrap();
        assert_eq!(stats.total_films, 1);
        assert_eq!(stats.total_size, expected);
        assert_eq!(stats.average_size, expected);
    }

    #[tokio::test]
    async fn test_stats_counts_top_level_files() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilmStorage::new(temp_dir.path(), false);

        let mut directories = Vec::new();
        for (id, title) in [(1, "First"), (2, "Second")] {
            let saved = storage
                .save_film(&SaveRequest::new(&Film::new(id, title)))
                .await
                .unwrap();
            directories.push(saved.directory);
        }

        // Nested content is not counted
        std::fs::create_dir(directories[0].join("extras")).unwrap();
        std::fs::write(directories[0].join("extras").join("big.bin"), vec![0u8; 4096]).unwrap();

        let expected: u64 = directories
            .iter()
            .flat_map(|d| std::fs::read_dir(d).unwrap())
            .map(|e| e.unwrap().metadata().unwrap())
            .filter(|m| m.is_file())
            .map(|m| m.len())
            .sum();

        let stats = storage.get_storage_stats(None).await.unwrap();
        assert_eq!(stats.total_films, 2);
        assert_eq!(stats.total_size, expected);
        assert_eq!(stats.average_size, expected / 2);
    }
}
