//! 一覧ページのページング

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::selectors;
use crate::config::{DelayRange, PacingConfig, Timeouts};
use crate::error::ScraperError;
use crate::traits::{Locator, Session};
use crate::wait::pause;

/// ページ送りの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAdvance {
    Advanced,
    NoMorePages,
}

#[derive(Debug, Clone)]
pub struct PaginationController {
    menu_timeout: Duration,
    next_timeout: Duration,
    before_click: DelayRange,
    after_click: DelayRange,
    scroll_settle: Duration,
}

impl PaginationController {
    pub fn new(timeouts: &Timeouts, pacing: &PacingConfig) -> Self {
        Self {
            menu_timeout: timeouts.pagination_menu,
            next_timeout: timeouts.next_link,
            before_click: pacing.before_next,
            after_click: pacing.after_next,
            scroll_settle: pacing.scroll_settle,
        }
    }

    /// 「次へ」リンクがあればクリックする
    ///
    /// メニューやリンクが見つからないのは正常終了 (`NoMorePages`)。
    /// それ以外の失敗は呼び出し側でクロール中断として扱う。
    pub async fn advance<S: Session>(&self, session: &S) -> Result<PageAdvance, ScraperError> {
        info!("ページングメニューを探索中...");
        let menu = match session
            .wait_until(&Locator::css(selectors::PAGING_MENU), self.menu_timeout)
            .await
        {
            Ok(menu) => menu,
            Err(e) if e.is_absence() => {
                info!("ページングメニューなし。最終ページと判断");
                return Ok(PageAdvance::NoMorePages);
            }
            Err(e) => return Err(e),
        };
        debug!("ページングメニュー検出");

        match session.outer_html(&menu).await {
            Ok(html) => debug!("ページングメニューHTML:\n{}", html),
            Err(e) => warn!("ページングメニューのHTMLを取得できません: {}", e),
        }

        let next = match session
            .wait_until_in(&menu, &Locator::css(selectors::NEXT_PAGE_LINK), self.next_timeout)
            .await
        {
            Ok(next) => next,
            Err(e) if e.is_absence() => {
                info!("「次へ」リンクなし。最終ページと判断");
                return Ok(PageAdvance::NoMorePages);
            }
            Err(e) => return Err(e),
        };
        info!("「次へ」リンク検出");

        pause(self.before_click).await;

        session.scroll_into_view(&next).await?;
        if !self.scroll_settle.is_zero() {
            sleep(self.scroll_settle).await;
        }
        session.activate(&next).await?;
        info!("「次へ」クリック完了");

        pause(self.after_click).await;
        Ok(PageAdvance::Advanced)
    }
}
