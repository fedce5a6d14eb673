//! Unified writer interface for dashboard views
//!
//! Routes writes to either the console or a JSONL file based on configuration.

use super::console_writer::ConsoleReportWriter;
use super::jsonl_writer::JsonlReportWriter;
use super::sink::{ReportError, ReportSink};
use super::DashboardView;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputBackend {
    Console,
    Jsonl,
}

pub enum ReportWriter {
    Console(ConsoleReportWriter),
    Jsonl(JsonlReportWriter),
}

impl ReportWriter {
    /// `path` is only used by the JSONL backend
    pub fn new(backend: OutputBackend, path: PathBuf) -> Result<Self, ReportError> {
        match backend {
            OutputBackend::Console => Ok(ReportWriter::Console(ConsoleReportWriter::stdout())),
            OutputBackend::Jsonl => Ok(ReportWriter::Jsonl(JsonlReportWriter::new(path)?)),
        }
    }

    pub async fn write_view(&mut self, view: &DashboardView) -> Result<(), ReportError> {
        match self {
            ReportWriter::Console(w) => ReportSink::write_view(w, view).await,
            ReportWriter::Jsonl(w) => ReportSink::write_view(w, view).await,
        }
    }

    pub async fn flush(&mut self) -> Result<(), ReportError> {
        match self {
            ReportWriter::Console(w) => ReportSink::flush(w).await,
            ReportWriter::Jsonl(w) => ReportSink::flush(w).await,
        }
    }

    pub fn backend_type(&self) -> &'static str {
        match self {
            ReportWriter::Console(w) => w.backend_type(),
            ReportWriter::Jsonl(w) => ReportSink::backend_type(w),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator_core::WindowDays;
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_jsonl_backend_routes_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("views.jsonl");

        let mut writer = ReportWriter::new(OutputBackend::Jsonl, path.clone()).unwrap();
        assert_eq!(writer.backend_type(), "JSONL");

        let view = DashboardView::NoData {
            window: WindowDays::new(7).unwrap(),
            generated_at: Utc::now(),
        };
        writer.write_view(&view).await.unwrap();
        writer.flush().await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_console_backend() {
        let writer = ReportWriter::new(OutputBackend::Console, PathBuf::new()).unwrap();
        assert_eq!(writer.backend_type(), "Console");
    }
}
