//! JSONL writer for dashboard views - one rendered view per line

use super::sink::{ReportError, ReportSink};
use super::DashboardView;
use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct JsonlReportWriter {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl JsonlReportWriter {
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        log::info!("📝 Writing dashboard views to: {}", path.display());
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_view(&mut self, view: &DashboardView) -> Result<(), ReportError> {
        let json = serde_json::to_string(view)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl Drop for JsonlReportWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[async_trait]
impl ReportSink for JsonlReportWriter {
    async fn write_view(&mut self, view: &DashboardView) -> Result<(), ReportError> {
        JsonlReportWriter::write_view(self, view)
    }

    async fn flush(&mut self) -> Result<(), ReportError> {
        JsonlReportWriter::flush(self)?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "JSONL"
    }
}
