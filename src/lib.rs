//! 求人サイトクローラーライブラリ
//!
//! - Civil Service Jobs の検索結果一覧を辿り、各求人の詳細ページから固定スキーマのレコードを収集
//! - 収集結果を CSV（任意で JSON スナップショット）に書き出す
//!
//! # 使用例
//!
//! ```rust,ignore
//! use jobboard_scraper::{CrawlRequest, CrawlService};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = CrawlService::new();
//!
//!     let request = CrawlRequest::new("https://www.civilservicejobs.service.gov.uk/csr/index.cgi")
//!         .with_output_csv("./civil_service_jobs.csv")
//!         .with_headless(false);
//!
//!     let report = service.call(request).await.unwrap();
//!     println!("Jobs: {} ({:?})", report.record_count(), report.csv_path);
//! }
//! ```
//!
//! # ブラウザを差し替えてクロールする例
//!
//! ```rust,ignore
//! use jobboard_scraper::{jobs::CrawlOrchestrator, ScraperConfig};
//!
//! let config = ScraperConfig::from_env()?;
//! let outcome = CrawlOrchestrator::from_config(&config).run(&my_session).await;
//! println!("pages={} records={}", outcome.pages, outcome.records.len());
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod jobs;
pub mod service;
pub mod sink;
pub mod traits;
pub mod wait;

#[cfg(test)]
mod testing;

// 主要な型をリエクスポート
pub use browser::BrowserSession;
pub use config::ScraperConfig;
pub use error::ScraperError;
pub use jobs::{CrawlOrchestrator, CrawlOutcome, CrawlStatus, JobBoardScraper, JobRecord};
pub use service::{CrawlReport, CrawlRequest, CrawlService};
pub use traits::{Launch, Locator, Lookup, RecordSink, Scraper, Session, SinkKind};
