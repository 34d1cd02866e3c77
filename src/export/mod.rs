//! Projection of the saved collection into JSON, CSV or plain text files

mod exporter;
mod formats;

pub use exporter::{ExportOptions, ExportReport, Exporter, SUMMARY_STEM};
pub use formats::{CSV_HEADER, ExportFormat, csv_row, render_text};
