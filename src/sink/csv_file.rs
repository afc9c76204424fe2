use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::ScraperError;
use crate::jobs::{JobField, JobRecord};
use crate::traits::{RecordSink, SinkKind};

/// 1レコード1行の CSV に書き出す（ヘッダはスキーマの列名）
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_blocking(path: &Path, records: &[JobRecord]) -> Result<(), ScraperError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
                info!("ディレクトリ作成: {:?}", dir);
            }
        }

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(JobField::headers())?;
        for record in records {
            writer.write_record(record.values().into_iter().map(|v| v.unwrap_or("")))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[async_trait]
impl RecordSink for CsvSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Csv
    }

    async fn write(&self, records: &[JobRecord]) -> Result<Option<PathBuf>, ScraperError> {
        if records.is_empty() {
            warn!("CSVに書き込むデータがありません");
            return Ok(None);
        }

        let path = std::path::absolute(&self.path).unwrap_or_else(|_| self.path.clone());
        info!("CSVに{}行書き込み中: {:?}", records.len(), path);

        let rows = records.to_vec();
        let target = path.clone();
        tokio::task::spawn_blocking(move || Self::write_blocking(&target, &rows))
            .await
            .map_err(|e| ScraperError::Sink(format!("CSV書き込みタスク失敗: {}", e)))??;

        info!("CSV書き込み完了: {:?}", path);
        Ok(Some(path))
    }
}
