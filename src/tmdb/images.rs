use crate::config::{ImageQuality, MaxImageSize};
use crate::types::Film;

/// Image artefacts stored next to a saved film
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Poster,
    Backdrop,
}

impl ImageKind {
    pub const ALL: [Self; 2] = [Self::Poster, Self::Backdrop];

    /// File name inside the film directory
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Poster => "poster.jpg",
            Self::Backdrop => "backdrop.jpg",
        }
    }
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Poster => write!(f, "poster"),
            Self::Backdrop => write!(f, "backdrop"),
        }
    }
}

/// Resolved download URLs for a film's images
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageUrls {
    pub poster: Option<String>,
    pub backdrop: Option<String>,
}

impl ImageUrls {
    /// Build URLs from the film's image paths.
    ///
    /// `base_url` is the image CDN root (e.g. `https://image.tmdb.org/t/p/`);
    /// the size segment comes from `quality`, clamped to `cap`.
    pub fn for_film(
        film: &Film,
        base_url: &str,
        quality: ImageQuality,
        cap: MaxImageSize,
    ) -> Self {
        let base = base_url.trim_end_matches('/');
        let build = |path: Option<&String>, size: &'static str| {
            path.filter(|p| !p.is_empty()).map(|p| {
                let p = p.trim_start_matches('/');
                format!("{base}/{}/{p}", cap.clamp(size))
            })
        };

        Self {
            poster: build(film.poster_path.as_ref(), quality.poster_size()),
            backdrop: build(film.backdrop_path.as_ref(), quality.backdrop_size()),
        }
    }

    pub fn get(&self, kind: ImageKind) -> Option<&str> {
        match kind {
            ImageKind::Poster => self.poster.as_deref(),
            ImageKind::Backdrop => self.backdrop.as_deref(),
        }
    }

    /// Every (kind, url) pair that is present
    pub fn iter(&self) -> impl Iterator<Item = (ImageKind, &str)> {
        ImageKind::ALL
            .into_iter()
            .filter_map(move |kind| self.get(kind).map(|url| (kind, url)))
    }

    pub fn is_empty(&self) -> bool {
        self.poster.is_none() && self.backdrop.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film() -> Film {
        let mut film = Film::new(603, "The Matrix");
        film.poster_path = Some("/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg".to_string());
        film.backdrop_path = Some("/icmmSD4vTTDKOq2vvdulafOGw93.jpg".to_string());
        film
    }

    #[test]
    fn test_urls_by_quality() {
        let urls = ImageUrls::for_film(
            &film(),
            "https://image.tmdb.org/t/p/",
            ImageQuality::Medium,
            MaxImageSize::Original,
        );

        assert_eq!(
            urls.poster.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg")
        );
        assert_eq!(
            urls.backdrop.as_deref(),
            Some("https://image.tmdb.org/t/p/w1280/icmmSD4vTTDKOq2vvdulafOGw93.jpg")
        );
    }

    #[test]
    fn test_urls_respect_cap() {
        let urls = ImageUrls::for_film(
            &film(),
            "https://image.tmdb.org/t/p",
            ImageQuality::High,
            MaxImageSize::W780,
        );

        assert!(urls.poster.unwrap().contains("/w780/"));
        assert!(urls.backdrop.unwrap().contains("/w780/"));
    }

    #[test]
    fn test_missing_paths() {
        let mut film = film();
        film.backdrop_path = None;
        film.poster_path = Some(String::new());

        let urls = ImageUrls::for_film(
            &film,
            "https://image.tmdb.org/t/p/",
            ImageQuality::Low,
            MaxImageSize::Original,
        );

        assert!(urls.is_empty());
        assert_eq!(urls.iter().count(), 0);
    }
}
