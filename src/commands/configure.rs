use super::prompt::Console;
use crate::Result;
use crate::config::{ConfigFile, ConfigStore, ImageQuality, MaxImageSize, UserConfigUpdate};
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct ConfigureArgs {
    pub api_key: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub image_quality: Option<ImageQuality>,
    pub language: Option<String>,
    pub include_adult: Option<bool>,
    pub download_images: Option<bool>,
    pub max_image_size: Option<MaxImageSize>,
    pub show: bool,
    pub reset: bool,
    pub clear_credentials: bool,
}

impl ConfigureArgs {
    fn update(&self) -> UserConfigUpdate {
        UserConfigUpdate {
            default_output_dir: self.output_dir.clone(),
            image_quality: self.image_quality,
            language: self.language.clone(),
            include_adult: self.include_adult,
            download_images: self.download_images,
            max_image_size: self.max_image_size,
        }
    }

    /// No flag given: fall back to interactive prompts
    pub fn is_interactive(&self) -> bool {
        self.api_key.is_none()
            && self.update().is_empty()
            && !self.show
            && !self.reset
            && !self.clear_credentials
    }
}

/// Apply configuration flags, or walk through every setting interactively
pub fn configure<R: BufRead, W: Write>(
    store: &ConfigStore,
    args: &ConfigureArgs,
    console: &mut Console<R, W>,
) -> Result<()> {
    if args.is_interactive() {
        return configure_interactive(store, console);
    }

    if args.reset {
        store.reset_config()?;
        console.say("Configuration reset to defaults.")?;
    }
    if args.clear_credentials {
        store.clear_credentials()?;
        console.say("Stored API key removed.")?;
    }
    if let Some(ref api_key) = args.api_key {
        store.save_credentials(api_key)?;
        console.say("API key saved.")?;
    }

    let update = args.update();
    if !update.is_empty() {
        store.update_user_config(update)?;
        console.say("Configuration updated.")?;
    }

    if args.show {
        let config = store.load_config()?;
        show_config(store, &config, console)?;
    }

    Ok(())
}

fn configure_interactive<R: BufRead, W: Write>(
    store: &ConfigStore,
    console: &mut Console<R, W>,
) -> Result<()> {
    let config = store.load_config()?;
    let user = &config.user;

    console.say("Configure filmstash (press Enter to keep the current value, q to quit)")?;
    console.blank()?;

    let key_hint = if store.is_configured() {
        "API key (leave empty to keep the current key)"
    } else {
        "TMDB API key"
    };
    let api_key = console.ask(key_hint)?;

    let output_dir = console.ask_or(
        "Default output directory",
        &user.default_output_dir.display().to_string(),
    )?;
    let image_quality =
        console.ask_parsed("Image quality (low, medium, high)", user.image_quality)?;
    let max_image_size = console.ask_parsed(
        "Maximum image size (w300, w500, w780, w1280, original)",
        user.max_image_size,
    )?;
    let language = console.ask_or("Metadata language", &user.language)?;
    let include_adult =
        console.confirm("Include adult titles in searches?", user.include_adult)?;
    let download_images =
        console.confirm("Download poster and backdrop images?", user.download_images)?;

    if !api_key.is_empty() {
        store.save_credentials(&api_key)?;
    }
    let config = store.update_user_config(UserConfigUpdate {
        default_output_dir: Some(PathBuf::from(output_dir)),
        image_quality: Some(image_quality),
        language: Some(language),
        include_adult: Some(include_adult),
        download_images: Some(download_images),
        max_image_size: Some(max_image_size),
    })?;

    console.blank()?;
    console.say("Configuration saved.")?;
    show_config(store, &config, console)
}

fn show_config<R: BufRead, W: Write>(
    store: &ConfigStore,
    config: &ConfigFile,
    console: &mut Console<R, W>,
) -> Result<()> {
    let user = &config.user;
    let api_key = store
        .get_api_key()
        .map_or_else(|| "(not set)".to_string(), |key| mask_key(&key));

    console.say(format!("Configuration file: {}", store.config_path().display()))?;
    console.say(format!("  API key:          {api_key}"))?;
    console.say(format!(
        "  Output directory: {}",
        user.default_output_dir.display()
    ))?;
    console.say(format!("  Image quality:    {}", user.image_quality))?;
    console.say(format!("  Max image size:   {}", user.max_image_size))?;
    console.say(format!("  Language:         {}", user.language))?;
    console.say(format!("  Include adult:    {}", user.include_adult))?;
    console.say(format!("  Download images:  {}", user.download_images))?;
    console.say(format!("  Log level:        {}", config.app.log_level))?;
    console.say(format!(
        "  Last updated:     {}",
        config.last_updated.to_rfc3339()
    ))
}

/// Show only the last four characters of a key
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(chars.len() - 4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> ConfigStore {
        ConfigStore::new(temp_dir.path().join("config")).with_env_api_key(None)
    }

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("abc"), "***");
        assert_eq!(mask_key("0123456789"), "******6789");
    }

    #[test]
    fn test_flags_update_config() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let args = ConfigureArgs {
            api_key: Some(" secret-key ".to_string()),
            image_quality: Some(ImageQuality::High),
            include_adult: Some(true),
            ..Default::default()
        };
        assert!(!args.is_interactive());

        let mut console = console("");
        configure(&store, &args, &mut console).unwrap();

        assert_eq!(store.get_api_key().as_deref(), Some("secret-key"));
        let config = store.load_config().unwrap();
        assert_eq!(config.user.image_quality, ImageQuality::High);
        assert!(config.user.include_adult);
        assert_eq!(config.user.language, "en-US");
    }

    #[test]
    fn test_show_masks_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        store.save_credentials("0123456789").unwrap();

        let mut console = console("");
        let args = ConfigureArgs {
            show: true,
            ..Default::default()
        };
        configure(&store, &args, &mut console).unwrap();

        let output = String::from_utf8(console.into_output()).unwrap();
        assert!(output.contains("******6789"));
        assert!(!output.contains("0123456789"));
    }

    #[test]
    fn test_reset_and_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        store.save_credentials("key").unwrap();
        store
            .update_user_config(UserConfigUpdate {
                language: Some("fr-FR".to_string()),
                ..Default::default()
            })
            .unwrap();

        let args = ConfigureArgs {
            reset: true,
            clear_credentials: true,
            ..Default::default()
        };
        configure(&store, &args, &mut console("")).unwrap();

        assert!(!store.is_configured());
        assert_eq!(store.load_config().unwrap().user.language, "en-US");
    }

    #[test]
    fn test_interactive() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let films_dir = temp_dir.path().join("my-films");

        let input = format!("my-key\n{}\nhigh\nw780\n\ny\nn\n", films_dir.display());
        let mut console = console(&input);
        configure(&store, &ConfigureArgs::default(), &mut console).unwrap();

        assert_eq!(store.get_api_key().as_deref(), Some("my-key"));
        let user = store.load_config().unwrap().user;
        assert_eq!(user.default_output_dir, films_dir);
        assert_eq!(user.image_quality, ImageQuality::High);
        assert_eq!(user.max_image_size, MaxImageSize::W780);
        assert_eq!(user.language, "en-US");
        assert!(user.include_adult);
        assert!(!user.download_images);
    }

    #[test]
    fn test_interactive_abort_saves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        let mut console = console("my-key\nq\n");
        let err = configure(&store, &ConfigureArgs::default(), &mut console).unwrap_err();

        assert_eq!(err.kind(), crate::error::ErrorKind::UserInput);
        assert!(!store.is_configured());
        assert!(!store.config_path().exists());
    }
}
