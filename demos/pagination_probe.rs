//! ページング単体の動作確認
//!
//! 検索を実行して「次へ」を一度だけ押し、URL が変わったかを確認する。
//!
//! 実行方法:
//! ```
//! cargo run --example pagination_probe
//! ```

use jobboard_scraper::jobs::{search_jobs, PageAdvance, PaginationController};
use jobboard_scraper::{BrowserSession, Launch, ScraperConfig, Session};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,jobboard_scraper=debug")),
        )
        .init();

    let config = ScraperConfig::from_env()?.with_headless(false);
    config.validate()?;

    println!("=== Pagination Probe ===");
    println!("Target: {}", config.target_url);
    println!();

    let mut session = BrowserSession::launch(&config).await?;
    let result = probe(&session, &config).await;
    session.close().await?;
    result
}

async fn probe(
    session: &BrowserSession,
    config: &ScraperConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    search_jobs(session, config).await?;

    let before = session.current_url().await?;
    info!("ページ送り前のURL: {}", before);

    let controller = PaginationController::new(&config.timeouts, &config.pacing);
    match controller.advance(session).await? {
        PageAdvance::Advanced => {
            let after = session.current_url().await?;
            if after == before {
                warn!("「次へ」をクリックしたがURLが変わりません: {}", after);
            } else {
                info!("移動先: {}", after);
            }
        }
        PageAdvance::NoMorePages => info!("1ページ目に「次へ」リンクがありません"),
    }
    Ok(())
}
