use async_trait::async_trait;
use tokio::time::sleep;
use tracing::info;

use super::crawler::CrawlOrchestrator;
use super::selectors;
use super::types::CrawlOutcome;
use crate::browser::BrowserSession;
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::{Launch, Locator, Scraper, Session};
use crate::wait::pause;

/// 検索ページを開いて検索ボタンを押し、結果が出るまで待つ
pub async fn search_jobs<S: Session>(
    session: &S,
    config: &ScraperConfig,
) -> Result<(), ScraperError> {
    info!("検索ページにアクセス中: {}", config.target_url);
    session.open(&config.target_url).await?;
    pause(config.pacing.after_open).await;

    let button = Locator::css(selectors::SEARCH_BUTTON);
    info!("検索ボタンを探索中: {}", button);
    let button = session
        .wait_until(&button, config.timeouts.search_button)
        .await
        .map_err(|e| match e {
            ScraperError::Timeout(msg) => {
                ScraperError::ElementNotFound(format!("検索ボタン: {}", msg))
            }
            other => other,
        })?;

    session.activate(&button).await?;
    info!("検索ボタンクリック完了");

    if !config.scrape_wait.is_zero() {
        info!(
            "検索結果の読み込みを{}秒待機中...",
            config.scrape_wait.as_secs()
        );
        sleep(config.scrape_wait).await;
    }
    info!("待機完了。クロールを開始します");
    Ok(())
}

/// Civil Service Jobs の求人スクレイパー
///
/// セッションは `initialize` で起動する。起動済みのセッションを
/// `with_session` で渡した場合はそれを使う。
pub struct JobBoardScraper<S = BrowserSession> {
    config: ScraperConfig,
    session: Option<S>,
}

impl JobBoardScraper<BrowserSession> {
    pub fn new(config: ScraperConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }
}

impl<S: Session> JobBoardScraper<S> {
    pub fn with_session(config: ScraperConfig, session: S) -> Self {
        Self {
            config,
            session: Some(session),
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    fn get_session(&self) -> Result<&S, ScraperError> {
        self.session
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("ブラウザが初期化されていません".into()))
    }
}

#[async_trait]
impl<S: Launch> Scraper for JobBoardScraper<S> {
    async fn initialize(&mut self) -> Result<(), ScraperError> {
        self.config.validate()?;
        if self.session.is_none() {
            self.session = Some(S::launch(&self.config).await?);
        }
        Ok(())
    }

    async fn search(&mut self) -> Result<(), ScraperError> {
        let session = self.get_session()?;
        search_jobs(session, &self.config).await
    }

    async fn crawl(&mut self) -> Result<CrawlOutcome, ScraperError> {
        let session = self.get_session()?;
        let orchestrator = CrawlOrchestrator::from_config(&self.config);
        Ok(orchestrator.run(session).await)
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        if let Some(mut session) = self.session.take() {
            session.close().await?;
        }
        Ok(())
    }
}
