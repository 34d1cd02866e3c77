use super::prompt::Console;
use crate::Result;
use crate::export::{ExportFormat, ExportOptions, ExportReport, Exporter};
use crate::storage::FilmStorage;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Destination used when `--output` is not given, relative to the working directory
pub const DEFAULT_EXPORT_DIR: &str = "film-exports";

#[derive(Debug, Clone)]
pub struct ExportArgs {
    pub format: String,
    pub output: Option<PathBuf>,
    pub source: Option<PathBuf>,
    pub images: bool,
}

impl Default for ExportArgs {
    fn default() -> Self {
        Self {
            format: ExportFormat::default().to_string(),
            output: None,
            source: None,
            images: false,
        }
    }
}

pub async fn export<R: BufRead, W: Write>(
    storage: &FilmStorage,
    args: &ExportArgs,
    console: &mut Console<R, W>,
) -> Result<ExportReport> {
    let format: ExportFormat = args.format.parse()?;
    let destination = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR));

    if args.images && format != ExportFormat::Json {
        console.say("Note: --images only applies to JSON exports.")?;
    }

    let options = ExportOptions::new(format, destination)
        .with_source(args.source.clone())
        .with_images(args.images);
    let report = Exporter::new(storage).export(&options).await?;

    if report.exported == 0 {
        console.say("No saved films to export.")?;
    } else {
        console.say(format!(
            "Exported {} films as {} to {}",
            report.exported,
            format,
            options.destination.display()
        ))?;
    }
    console.say(format!("Summary: {}", report.summary.display()))?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_unsupported_format_does_no_work() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilmStorage::new(temp_dir.path().join("films"), false);
        let destination = temp_dir.path().join("export");
        let args = ExportArgs {
            format: "xml".to_string(),
            output: Some(destination.clone()),
            ..Default::default()
        };
        let mut console = Console::new(Cursor::new(Vec::new()), Vec::new());

        let err = export(&storage, &args, &mut console).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!destination.exists());
    }
}
