//! 求人クローラー CLI
//!
//! 実行方法:
//! ```
//! TARGET_URL=... cargo run --bin jobboard-scraper
//! ```

use std::process::ExitCode;

use jobboard_scraper::{CrawlRequest, CrawlService, ScraperConfig};
use tower::Service;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,jobboard_scraper=debug")),
        )
        .init();

    let config = match ScraperConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("設定の読み込みに失敗: {}", e);
            return ExitCode::from(2);
        }
    };
    if let Err(e) = config.validate() {
        error!("設定が不正です: {}", e);
        return ExitCode::from(2);
    }

    info!("--- Civil Service Jobs クローラー開始 ---");
    let mut service = CrawlService::new();
    match service.call(CrawlRequest::from(config)).await {
        Ok(report) => {
            if !report.status.is_finished() {
                warn!("クロールが途中で終了しました: {:?}", report.status);
            }
            info!(
                "クロール完了: ページ={}, 一覧={}, 取得={}, 破棄={}",
                report.pages,
                report.summaries_seen,
                report.record_count(),
                report.records_dropped
            );
            if let Some(path) = &report.csv_path {
                info!("CSV出力: {:?}", path);
            }
            if let Some(path) = &report.json_path {
                info!("JSONスナップショット出力: {:?}", path);
            }
            ExitCode::SUCCESS
        }
        Err(e) if e.is_precondition() => {
            error!("クローラーを開始できません: {}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            error!("クロール中にエラーが発生: {}", e);
            ExitCode::FAILURE
        }
    }
}
