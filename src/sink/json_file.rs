use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Local;
use tracing::{info, warn};

use crate::error::ScraperError;
use crate::jobs::JobRecord;
use crate::traits::{RecordSink, SinkKind};

/// タイムスタンプ付きの JSON スナップショットに書き出す
#[derive(Debug, Clone)]
pub struct JsonSink {
    dir: PathBuf,
}

impl JsonSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl RecordSink for JsonSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Json
    }

    async fn write(&self, records: &[JobRecord]) -> Result<Option<PathBuf>, ScraperError> {
        if records.is_empty() {
            warn!("JSONスナップショットに書き込むデータがありません");
            return Ok(None);
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = self.dir.join(format!("jobs_{}.json", timestamp));
        let json = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&path, json).await?;

        info!("求人 {} 件を保存: {:?}", records.len(), path);
        Ok(Some(path))
    }
}
