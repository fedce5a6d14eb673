//! Report sink trait: the boundary between the dashboard and whatever renders it

use super::DashboardView;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Backend trait for publishing rendered dashboard views
#[async_trait]
pub trait ReportSink: Send {
    /// Publish one view (a ready report or the "no data yet" notice)
    async fn write_view(&mut self, view: &DashboardView) -> Result<(), ReportError>;

    /// Flush pending writes to storage
    async fn flush(&mut self) -> Result<(), ReportError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}
