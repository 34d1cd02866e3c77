use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Accepted values for `app.logLevel`
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Image quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl ImageQuality {
    /// TMDB poster size tag for this tier
    #[must_use]
    pub const fn poster_size(self) -> &'static str {
        match self {
            Self::Low => "w185",
            Self::Medium => "w500",
            Self::High => "original",
        }
    }

    /// TMDB backdrop size tag for this tier
    #[must_use]
    pub const fn backdrop_size(self) -> &'static str {
        match self {
            Self::Low => "w780",
            Self::Medium => "w1280",
            Self::High => "original",
        }
    }
}

impl std::fmt::Display for ImageQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for ImageQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown image quality: {s} (expected low, medium or high)")),
        }
    }
}

/// Upper bound on downloaded image width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MaxImageSize {
    #[serde(rename = "w300")]
    W300,
    #[serde(rename = "w500")]
    W500,
    #[serde(rename = "w780")]
    W780,
    #[serde(rename = "w1280")]
    W1280,
    #[default]
    #[serde(rename = "original")]
    Original,
}

impl MaxImageSize {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::W300 => "w300",
            Self::W500 => "w500",
            Self::W780 => "w780",
            Self::W1280 => "w1280",
            Self::Original => "original",
        }
    }

    /// Clamp a TMDB size tag to this cap.
    ///
    /// Tags compare by pixel width; `original` is wider than any `wNNN`.
    #[must_use]
    pub fn clamp(self, size: &'static str) -> &'static str {
        match (tag_width(self.as_str()), tag_width(size)) {
            (Some(cap), Some(width)) if width > cap => self.as_str(),
            (Some(_), None) => self.as_str(),
            _ => size,
        }
    }
}

/// Width in pixels of a `wNNN` tag, `None` for `original`
fn tag_width(tag: &str) -> Option<u32> {
    tag.strip_prefix('w').and_then(|w| w.parse().ok())
}

impl std::fmt::Display for MaxImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MaxImageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "w300" => Ok(Self::W300),
            "w500" => Ok(Self::W500),
            "w780" => Ok(Self::W780),
            "w1280" => Ok(Self::W1280),
            "original" => Ok(Self::Original),
            _ => Err(format!(
                "Unknown image size: {s} (expected w300, w500, w780, w1280 or original)"
            )),
        }
    }
}

/// Mutable user preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    /// Legacy location of the API key, superseded by the credentials file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub default_output_dir: PathBuf,
    pub image_quality: ImageQuality,
    /// Preferred metadata language (e.g. `en-US`)
    pub language: String,
    pub include_adult: bool,
    pub download_images: bool,
    pub max_image_size: MaxImageSize,
}

impl UserConfig {
    /// Defaults for a configuration rooted at `root`
    pub fn with_root(root: &Path) -> Self {
        Self {
            api_key: None,
            default_output_dir: root.join("films"),
            image_quality: ImageQuality::default(),
            language: "en-US".to_string(),
            include_adult: false,
            download_images: true,
            max_image_size: MaxImageSize::default(),
        }
    }
}

/// Fixed-shape application metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub version: String,
    pub config_dir: PathBuf,
    pub output_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    pub fn with_root(root: &Path) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config_dir: root.to_path_buf(),
            output_dir: root.join("films"),
            temp_dir: root.join("tmp"),
            log_level: "warn".to_string(),
        }
    }
}

/// The persisted configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub user: UserConfig,
    pub app: AppConfig,
    pub last_updated: DateTime<Utc>,
}

impl ConfigFile {
    pub fn with_root(root: &Path) -> Self {
        Self {
            user: UserConfig::with_root(root),
            app: AppConfig::with_root(root),
            last_updated: Utc::now(),
        }
    }
}

/// Stored API credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub api_key: String,
    /// Always false: the key is stored in plain text
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default = "Utc::now")]
    pub last_used: DateTime<Utc>,
}

/// Partial update of [`UserConfig`]; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserConfigUpdate {
    pub default_output_dir: Option<PathBuf>,
    pub image_quality: Option<ImageQuality>,
    pub language: Option<String>,
    pub include_adult: Option<bool>,
    pub download_images: Option<bool>,
    pub max_image_size: Option<MaxImageSize>,
}

impl UserConfigUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply every set field to `config`
    pub fn apply(self, config: &mut UserConfig) {
        if let Some(dir) = self.default_output_dir {
            config.default_output_dir = dir;
        }
        if let Some(quality) = self.image_quality {
            config.image_quality = quality;
        }
        if let Some(language) = self.language {
            config.language = language;
        }
        if let Some(include_adult) = self.include_adult {
            config.include_adult = include_adult;
        }
        if let Some(download_images) = self.download_images {
            config.download_images = download_images;
        }
        if let Some(max_image_size) = self.max_image_size {
            config.max_image_size = max_image_size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_quality_parse() {
        assert_eq!("low".parse::<ImageQuality>().unwrap(), ImageQuality::Low);
        assert_eq!("HIGH".parse::<ImageQuality>().unwrap(), ImageQuality::High);
        assert_eq!("med".parse::<ImageQuality>().unwrap(), ImageQuality::Medium);
        assert!("ultra".parse::<ImageQuality>().is_err());
    }

    #[test]
    fn test_max_image_size_clamp() {
        assert_eq!(MaxImageSize::Original.clamp("original"), "original");
        assert_eq!(MaxImageSize::Original.clamp("w500"), "w500");
        assert_eq!(MaxImageSize::W300.clamp("w500"), "w300");
        assert_eq!(MaxImageSize::W300.clamp("original"), "w300");
        assert_eq!(MaxImageSize::W1280.clamp("w780"), "w780");
        assert_eq!(MaxImageSize::W780.clamp("w185"), "w185");
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(
            serde_json::to_string(&ImageQuality::Medium).unwrap(),
            "\"medium\""
        );
        assert_eq!(serde_json::to_string(&MaxImageSize::W780).unwrap(), "\"w780\"");
        assert!(serde_json::from_str::<MaxImageSize>("\"w9000\"").is_err());
    }

    #[test]
    fn test_user_config_camel_case() {
        let config = UserConfig::with_root(Path::new("/home/user/.filmstash"));
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["imageQuality"], "medium");
        assert_eq!(json["downloadImages"], true);
        assert_eq!(json["maxImageSize"], "original");
        assert!(json.get("apiKey").is_none());
    }

    #[test]
    fn test_update_apply() {
        let mut config = UserConfig::with_root(Path::new("/tmp"));
        let update = UserConfigUpdate {
            image_quality: Some(ImageQuality::High),
            download_images: Some(false),
            ..Default::default()
        };
        assert!(!update.is_empty());

        update.apply(&mut config);

        assert_eq!(config.image_quality, ImageQuality::High);
        assert!(!config.download_images);
        assert_eq!(config.language, "en-US");
        assert!(UserConfigUpdate::default().is_empty());
    }
}
