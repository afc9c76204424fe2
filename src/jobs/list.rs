//! 一覧ページの抽出

use std::time::Duration;

use tracing::{debug, error, info, warn};
use url::Url;

use super::selectors;
use super::types::{JobSummary, DEPARTMENT_PLACEHOLDER};
use crate::error::ScraperError;
use crate::traits::{Locator, Lookup, Session};

/// 一覧ページの抽出結果
#[derive(Debug)]
pub enum ListPage {
    /// コンテナが見つかった（0件の場合もある）
    Items(Vec<JobSummary>),
    /// コンテナが時間内に現れなかった
    NoListFound,
    /// 想定外のエラーで一覧を読めなかった
    Failed(ScraperError),
}

impl ListPage {
    pub fn into_summaries(self) -> Vec<JobSummary> {
        match self {
            ListPage::Items(items) => items,
            ListPage::NoListFound | ListPage::Failed(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListPageExtractor {
    container_timeout: Duration,
}

impl ListPageExtractor {
    pub fn new(container_timeout: Duration) -> Self {
        Self { container_timeout }
    }

    /// 現在の一覧ページから求人概要を DOM 順に取り出す
    pub async fn extract<S: Session>(&self, session: &S) -> ListPage {
        let container = Locator::css(selectors::JOB_LIST_CONTAINER);
        info!("求人一覧コンテナを待機中: {}", container);

        match session.wait_until(&container, self.container_timeout).await {
            Ok(_) => debug!("求人一覧コンテナ検出"),
            Err(e) if e.is_absence() => {
                error!("求人一覧コンテナが現れません: {}", e);
                return ListPage::NoListFound;
            }
            Err(e) => {
                error!("求人一覧コンテナの待機中にエラー: {}", e);
                return ListPage::Failed(e);
            }
        }

        let items = match session.find_all(&Locator::css(selectors::JOB_ITEM)).await {
            Ok(items) => items,
            Err(e) => {
                error!("求人項目の列挙に失敗: {}", e);
                return ListPage::Failed(e);
            }
        };
        info!("求人項目 {} 件検出", items.len());

        if items.is_empty() {
            warn!("このページに求人項目がありません");
            return ListPage::Items(Vec::new());
        }

        let base = match session.current_url().await {
            Ok(url) => Url::parse(&url).ok(),
            Err(e) => {
                debug!("リンク解決用のURLを取得できません: {}", e);
                None
            }
        };

        let mut summaries = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match self.summarize(session, item, base.as_ref()).await {
                Ok(Some(summary)) => summaries.push(summary),
                Ok(None) => {}
                Err(e) => error!("求人項目 {} の処理でエラー: {}", index + 1, e),
            }
        }

        info!("求人リンク {} 件抽出完了", summaries.len());
        ListPage::Items(summaries)
    }

    /// 1件分の概要。リンクかタイトルが無ければ None
    async fn summarize<S: Session>(
        &self,
        session: &S,
        item: &S::Element,
        base: Option<&Url>,
    ) -> Result<Option<JobSummary>, ScraperError> {
        let link_el = match session.find_in(item, &Locator::css(selectors::JOB_LINK)).await {
            Lookup::Found(el) => el,
            Lookup::NotFound => {
                warn!(
                    "求人項目内にリンク要素 ({}) がないためスキップ",
                    selectors::JOB_LINK
                );
                return Ok(None);
            }
            Lookup::Error(e) => return Err(e),
        };

        let title = session.text(&link_el).await?.trim().to_string();
        let href = session.attribute(&link_el, "href").await?.unwrap_or_default();

        let department = match session
            .find_in(item, &Locator::css(selectors::JOB_DEPARTMENT))
            .await
        {
            Lookup::Found(el) => session.text(&el).await?.trim().to_string(),
            Lookup::NotFound => {
                warn!("部署が見つかりません: {}", title);
                DEPARTMENT_PLACEHOLDER.to_string()
            }
            Lookup::Error(e) => {
                warn!("部署の取得に失敗: {}: {}", title, e);
                DEPARTMENT_PLACEHOLDER.to_string()
            }
        };

        let link = resolve_link(base, href.trim());
        match (title.is_empty(), link) {
            (false, Some(link)) => Ok(Some(JobSummary {
                title,
                link,
                department,
            })),
            _ => {
                warn!("求人項目のタイトルまたはリンクを取得できないためスキップ");
                Ok(None)
            }
        }
    }
}

/// href を絶対URLにする
fn resolve_link(base: Option<&Url>, href: &str) -> Option<Url> {
    if href.is_empty() {
        return None;
    }
    match Url::parse(href) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => base.and_then(|b| b.join(href).ok()),
        Err(_) => None,
    }
}
