//! クロールのステートマシン
//!
//! 一覧ページ → 各詳細ページ → 一覧ページへ戻る → 次ページ、を
//! 「次へ」が無くなるまで繰り返す。詳細ページ単位・一覧ページ単位の
//! 失敗ではクロール全体を止めない。

use std::collections::VecDeque;

use tracing::{error, info, warn};

use super::detail::DetailPageExtractor;
use super::list::{ListPage, ListPageExtractor};
use super::pagination::{PageAdvance, PaginationController};
use super::types::{CrawlOutcome, CrawlStatus, JobRecord, JobSummary};
use crate::config::{PacingConfig, ScraperConfig};
use crate::traits::Session;
use crate::wait::pause;

/// クロールの状態
#[derive(Debug)]
enum CrawlState {
    OnListingPage {
        page: u32,
        listing_url: String,
    },
    ProcessingItems {
        page: u32,
        listing_url: String,
        queue: VecDeque<JobSummary>,
        visited: usize,
    },
    ReturningToListing {
        page: u32,
        listing_url: String,
        navigate: bool,
    },
    Finished,
    Aborted(String),
}

/// 実行中に蓄積する結果
#[derive(Debug, Default)]
struct CrawlProgress {
    records: Vec<JobRecord>,
    pages: u32,
    summaries_seen: usize,
    records_dropped: usize,
}

pub struct CrawlOrchestrator {
    list: ListPageExtractor,
    detail: DetailPageExtractor,
    pagination: PaginationController,
    pacing: PacingConfig,
    max_pages: Option<u32>,
}

impl CrawlOrchestrator {
    pub fn new(
        list: ListPageExtractor,
        detail: DetailPageExtractor,
        pagination: PaginationController,
        pacing: PacingConfig,
    ) -> Self {
        Self {
            list,
            detail,
            pagination,
            pacing,
            max_pages: None,
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        let timeouts = &config.timeouts;
        Self::new(
            ListPageExtractor::new(timeouts.list_container),
            DetailPageExtractor::new(timeouts.detail_main_panel, config.pacing.detail_settle),
            PaginationController::new(timeouts, &config.pacing),
            config.pacing,
        )
        .with_max_pages(config.max_pages)
    }

    /// 処理する一覧ページ数の上限
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// 検索結果の一覧ページ上にいる状態からクロールを実行する
    ///
    /// `Finished` / `Aborted` のどちらでも収集済みレコードは返す。
    pub async fn run<S: Session>(&self, session: &S) -> CrawlOutcome {
        let mut progress = CrawlProgress::default();

        let mut state = match session.current_url().await {
            Ok(listing_url) => CrawlState::OnListingPage {
                page: 1,
                listing_url,
            },
            Err(e) => CrawlState::Aborted(format!("could not read listing URL: {}", e)),
        };

        let status = loop {
            state = match state {
                CrawlState::OnListingPage { page, listing_url } => {
                    self.on_listing_page(session, page, listing_url, &mut progress)
                        .await
                }
                CrawlState::ProcessingItems {
                    page,
                    listing_url,
                    queue,
                    visited,
                } => {
                    self.process_next_item(session, page, listing_url, queue, visited, &mut progress)
                        .await
                }
                CrawlState::ReturningToListing {
                    page,
                    listing_url,
                    navigate,
                } => {
                    self.return_and_advance(session, page, &listing_url, navigate)
                        .await
                }
                CrawlState::Finished => break CrawlStatus::Finished,
                CrawlState::Aborted(reason) => break CrawlStatus::Aborted(reason),
            };
        };

        match &status {
            CrawlStatus::Finished => info!(
                "全ページのクロール完了: 求人 {} 件",
                progress.records.len()
            ),
            CrawlStatus::Aborted(reason) => warn!(
                "クロール中断 ({}): 取得済みの {} 件は保持",
                reason,
                progress.records.len()
            ),
        }

        CrawlOutcome {
            status,
            pages: progress.pages,
            summaries_seen: progress.summaries_seen,
            records_dropped: progress.records_dropped,
            records: progress.records,
        }
    }

    async fn on_listing_page<S: Session>(
        &self,
        session: &S,
        page: u32,
        listing_url: String,
        progress: &mut CrawlProgress,
    ) -> CrawlState {
        info!("--- {}ページ目を処理中 ---", page);
        info!("検索結果ページURL: {}", listing_url);
        progress.pages = page;

        let summaries = match self.list.extract(session).await {
            ListPage::Items(items) => items,
            ListPage::NoListFound => {
                warn!("{}ページ目に求人一覧が見つかりません", page);
                Vec::new()
            }
            ListPage::Failed(e) => {
                warn!("{}ページ目の求人一覧を読み取れません: {}", page, e);
                Vec::new()
            }
        };

        if summaries.is_empty() {
            warn!("{}ページ目に求人リンクなし。「次へ」を確認します", page);
            self.recover_listing(session, &listing_url).await;
        } else {
            info!("求人 {} 件検出 ({}ページ目)", summaries.len(), page);
        }
        progress.summaries_seen += summaries.len();

        CrawlState::ProcessingItems {
            page,
            listing_url,
            queue: summaries.into(),
            visited: 0,
        }
    }

    /// 一覧URLから外れていたら戻る
    async fn recover_listing<S: Session>(&self, session: &S, listing_url: &str) {
        let current = match session.current_url().await {
            Ok(url) => url,
            Err(e) => {
                warn!("現在のURLを取得できません: {}", e);
                return;
            }
        };
        if current == listing_url {
            return;
        }

        info!("検索結果ページに戻ります: {}", listing_url);
        match session.open(listing_url).await {
            Ok(()) => pause(self.pacing.after_recovery).await,
            Err(e) => warn!("検索結果ページに戻れませんでした: {}", e),
        }
    }

    async fn process_next_item<S: Session>(
        &self,
        session: &S,
        page: u32,
        listing_url: String,
        mut queue: VecDeque<JobSummary>,
        visited: usize,
        progress: &mut CrawlProgress,
    ) -> CrawlState {
        let Some(summary) = queue.pop_front() else {
            if visited > 0 {
                info!("求人 {} 件の処理完了 ({}ページ目)", visited, page);
            }
            return CrawlState::ReturningToListing {
                page,
                listing_url,
                navigate: visited > 0,
            };
        };

        let total = visited + 1 + queue.len();
        info!(
            "求人 {}/{} を処理中: '{}' (部署: {})",
            visited + 1,
            total,
            summary.title,
            summary.department
        );

        match self
            .detail
            .extract(session, &summary.link, &summary.title, &summary.department)
            .await
        {
            Ok(record) => {
                info!("詳細取得完了: '{}'", summary.title);
                progress.records.push(record);
            }
            Err(e) => {
                warn!(
                    "詳細を取得できないため破棄: {} ({}): {}",
                    summary.title, summary.link, e
                );
                progress.records_dropped += 1;
            }
        }

        CrawlState::ProcessingItems {
            page,
            listing_url,
            queue,
            visited: visited + 1,
        }
    }

    async fn return_and_advance<S: Session>(
        &self,
        session: &S,
        page: u32,
        listing_url: &str,
        navigate: bool,
    ) -> CrawlState {
        if navigate {
            info!("検索結果ページに戻ります: {}", listing_url);
            match session.open(listing_url).await {
                Ok(()) => {
                    info!("「次へ」確認前に検索結果ページの再読み込みを待機中...");
                    pause(self.pacing.after_return).await;
                }
                Err(e) => warn!("検索結果ページに戻れませんでした: {}", e),
            }
        }

        if self.max_pages.is_some_and(|max| page >= max) {
            info!("ページ上限 ({}) に到達。ページングを終了", page);
            return CrawlState::Finished;
        }

        match self.pagination.advance(session).await {
            Ok(PageAdvance::Advanced) => match session.current_url().await {
                Ok(listing_url) => {
                    info!("{}ページ目に移動", page + 1);
                    CrawlState::OnListingPage {
                        page: page + 1,
                        listing_url,
                    }
                }
                Err(e) => {
                    error!("次ページ移動後のURLを取得できません: {}", e);
                    CrawlState::Aborted(e.to_string())
                }
            },
            Ok(PageAdvance::NoMorePages) => CrawlState::Finished,
            Err(e) => {
                error!("「次へ」リンクの検索・クリックでエラー: {}", e);
                warn!("エラーのためページングを中断");
                CrawlState::Aborted(e.to_string())
            }
        }
    }
}
