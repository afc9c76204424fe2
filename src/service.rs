use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use serde::Serialize;
use tower::Service;
use tracing::{debug, info};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::jobs::{CrawlOutcome, CrawlStatus, JobBoardScraper, JobRecord};
use crate::sink::{CsvSink, JsonSink};
use crate::traits::{RecordSink, Scraper, SinkKind};

/// クロールリクエスト
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub config: ScraperConfig,
}

impl CrawlRequest {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            config: ScraperConfig::new(target_url),
        }
    }

    pub fn with_output_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = self.config.with_output_csv(path);
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.config = self.config.with_headless(headless);
        self
    }

    pub fn with_scrape_wait(mut self, wait: Duration) -> Self {
        self.config = self.config.with_scrape_wait(wait);
        self
    }
}

impl From<ScraperConfig> for CrawlRequest {
    fn from(config: ScraperConfig) -> Self {
        Self { config }
    }
}

/// クロール結果
#[derive(Debug, Serialize)]
pub struct CrawlReport {
    pub status: CrawlStatus,
    pub pages: u32,
    pub summaries_seen: usize,
    pub records_dropped: usize,
    pub records: Vec<JobRecord>,
    pub csv_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
}

impl CrawlReport {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

/// 設定に応じた出力先一覧
pub fn sinks_for(config: &ScraperConfig) -> Vec<Box<dyn RecordSink>> {
    let mut sinks: Vec<Box<dyn RecordSink>> = vec![Box::new(CsvSink::new(&config.output_csv_path))];
    if let Some(dir) = &config.output_json_dir {
        sinks.push(Box::new(JsonSink::new(dir)));
    }
    sinks
}

/// クロール結果を各出力先に書き込み、レポートにまとめる
pub async fn deliver(
    outcome: CrawlOutcome,
    sinks: &[Box<dyn RecordSink>],
) -> Result<CrawlReport, ScraperError> {
    let mut report = CrawlReport {
        status: outcome.status,
        pages: outcome.pages,
        summaries_seen: outcome.summaries_seen,
        records_dropped: outcome.records_dropped,
        records: outcome.records,
        csv_path: None,
        json_path: None,
    };

    if report.records.is_empty() {
        info!("取得できた求人詳細がありません");
    }

    for sink in sinks {
        debug!("出力先 {} に書き込み中", sink.kind());
        let path = sink.write(&report.records).await?;
        match sink.kind() {
            SinkKind::Csv => report.csv_path = path,
            SinkKind::Json => report.json_path = path,
        }
    }

    Ok(report)
}

/// tower::Serviceを実装したクロールサービス
#[derive(Debug, Clone, Default)]
pub struct CrawlService {}

impl CrawlService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<CrawlRequest> for CrawlService {
    type Response = CrawlReport;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: CrawlRequest) -> Self::Future {
        info!("クロールリクエスト受信: target={}", req.config.target_url);

        Box::pin(async move {
            let config = req.config;
            config.validate()?;

            let sinks = sinks_for(&config);
            let mut scraper = JobBoardScraper::new(config);
            let outcome = scraper.execute().await?;

            let report = deliver(outcome, &sinks).await?;
            info!(
                "クロール完了: status={:?}, ページ={}, 求人={}, 破棄={}",
                report.status,
                report.pages,
                report.record_count(),
                report.records_dropped
            );
            Ok(report)
        })
    }
}
