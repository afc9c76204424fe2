//! 詳細ページの抽出

use std::time::Duration;

use chrono::Local;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use super::selectors;
use super::types::{JobField, JobRecord};
use crate::error::ScraperError;
use crate::traits::{Locator, Lookup, Session};

#[derive(Debug, Clone)]
pub struct DetailPageExtractor {
    main_panel_timeout: Duration,
    settle: Duration,
    fields: Vec<(JobField, Locator)>,
    department_fallback: Locator,
}

impl DetailPageExtractor {
    pub fn new(main_panel_timeout: Duration, settle: Duration) -> Self {
        let mut fields: Vec<(JobField, Locator)> = selectors::main_panel_fields()
            .into_iter()
            .map(|(field, xpath)| (field, Locator::XPath(xpath)))
            .collect();
        fields.push((JobField::ClosingDate, Locator::css(selectors::CLOSING_DATE)));
        fields.extend(
            selectors::side_panel_fields()
                .into_iter()
                .map(|(field, xpath)| (field, Locator::XPath(xpath))),
        );

        Self {
            main_panel_timeout,
            settle,
            fields,
            department_fallback: Locator::XPath(selectors::side_panel_department()),
        }
    }

    /// 詳細ページを開いてレコードを組み立てる
    ///
    /// メインパネルが読み込めなかった場合のみ Err（レコードごと破棄）。
    /// 個々の項目が無いのは None として扱い、他の項目の抽出は続ける。
    pub async fn extract<S: Session>(
        &self,
        session: &S,
        job_url: &Url,
        title: &str,
        department: &str,
    ) -> Result<JobRecord, ScraperError> {
        info!("詳細ページにアクセス中: {}", job_url);
        session.open(job_url.as_str()).await?;
        session
            .wait_until(&Locator::css(selectors::MAIN_PANEL), self.main_panel_timeout)
            .await?;
        debug!("詳細ページ読み込み完了");

        if !self.settle.is_zero() {
            sleep(self.settle).await;
        }

        let scrape_date = Local::now().format("%Y-%m-%d").to_string();
        let mut record = JobRecord::new(scrape_date, title, department, job_url);

        for (field, locator) in &self.fields {
            let value = lookup_text(session, locator).await;
            record.set(*field, value.as_deref());
        }

        if record.needs_department() {
            if let Some(dept) = lookup_text(session, &self.department_fallback).await {
                record.set(JobField::Department, Some(&dept));
                info!("部署をサイドパネルの値で補完");
            }
        }

        info!("詳細抽出完了: {}", title);
        Ok(record)
    }
}

/// 要素のテキストを取得。見つからない・読めない場合は None
async fn lookup_text<S: Session>(session: &S, locator: &Locator) -> Option<String> {
    match session.find_first(locator).await {
        Lookup::Found(el) => match session.text(&el).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("テキストを取得できません {}: {}", locator, e);
                None
            }
        },
        Lookup::NotFound => {
            debug!("要素なし: {}", locator);
            None
        }
        Lookup::Error(e) => {
            warn!("要素検索に失敗 {}: {}", locator, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockNode, MockPage, MockSession};

    const LISTING: &str = "https://x/search";
    const JOB: &str = "https://x/1";

    fn full_detail_page() -> MockPage {
        let mut page = MockPage::new().element(selectors::MAIN_PANEL, MockNode::new());
        for (field, xpath) in selectors::main_panel_fields()
            .into_iter()
            .chain(selectors::side_panel_fields())
        {
            page = page.element(
                &xpath,
                MockNode::with_text(&format!("  {}\n value  ", field.header())),
            );
        }
        page.element(selectors::CLOSING_DATE, MockNode::with_text("Closes 1 May 2025"))
    }

    fn extractor(session: &MockSession) -> DetailPageExtractor {
        DetailPageExtractor::new(session.short_timeout(), Duration::ZERO)
    }

    fn job_url() -> Url {
        Url::parse(JOB).unwrap()
    }

    #[tokio::test]
    async fn test_full_page_populates_every_field() {
        let session = MockSession::new(LISTING).page(JOB, full_detail_page());

        let record = extractor(&session)
            .extract(&session, &job_url(), "Analyst", "Finance")
            .await
            .unwrap();

        assert_eq!(record.values().len(), JobField::ALL.len());
        for field in JobField::ALL {
            if field == JobField::MatchScore {
                assert_eq!(record.get(field), None);
            } else {
                assert!(record.get(field).is_some(), "{:?} missing", field);
            }
        }
        assert_eq!(record.get(JobField::Salary), Some("Salary value"));
        assert_eq!(record.get(JobField::JobTitle), Some("Analyst"));
        assert_eq!(record.get(JobField::Department), Some("Finance"));
        assert_eq!(record.get(JobField::Link), Some(JOB));
        assert_eq!(record.scrape_date.as_ref().map(|d| d.len()), Some(10));
        assert_eq!(session.opened(), vec![JOB.to_string()]);
    }

    #[tokio::test]
    async fn test_missing_salary_is_absent_only() {
        let salary_xpath = selectors::side_panel_fields()
            .into_iter()
            .find(|(f, _)| *f == JobField::Salary)
            .map(|(_, x)| x)
            .unwrap();
        let session =
            MockSession::new(LISTING).page(JOB, full_detail_page().without(&salary_xpath));

        let record = extractor(&session)
            .extract(&session, &job_url(), "Analyst", "Finance")
            .await
            .unwrap();

        assert_eq!(record.salary, None);
        assert_eq!(record.get(JobField::Location), Some("Location value"));
        assert_eq!(record.get(JobField::ContactEmail), Some("Contact Email value"));
    }

    #[tokio::test]
    async fn test_failing_lookup_degrades_to_absent() {
        let location_xpath = selectors::main_panel_fields()
            .into_iter()
            .find(|(f, _)| *f == JobField::Location)
            .map(|(_, x)| x)
            .unwrap();
        let session =
            MockSession::new(LISTING).page(JOB, full_detail_page().failing(&location_xpath));

        let record = extractor(&session)
            .extract(&session, &job_url(), "Analyst", "Finance")
            .await
            .unwrap();

        assert_eq!(record.location, None);
        assert!(record.benefits.is_some());
    }

    #[tokio::test]
    async fn test_missing_main_panel_drops_record() {
        let session = MockSession::new(LISTING).page(JOB, MockPage::new());

        let result = extractor(&session)
            .extract(&session, &job_url(), "Analyst", "Finance")
            .await;
        assert!(matches!(result, Err(ScraperError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_navigation_failure_drops_record() {
        let session = MockSession::new(LISTING)
            .page(JOB, full_detail_page())
            .fail_open(JOB);

        let result = extractor(&session)
            .extract(&session, &job_url(), "Analyst", "Finance")
            .await;
        assert!(matches!(result, Err(ScraperError::Navigation(_))));
    }

    #[tokio::test]
    async fn test_department_fallback_from_side_panel() {
        let page = full_detail_page().element(
            &selectors::side_panel_department(),
            MockNode::with_text(" Met\nOffice "),
        );
        let session = MockSession::new(LISTING).page(JOB, page);
        let ex = extractor(&session);

        let record = ex
            .extract(&session, &job_url(), "Analyst", "Not specified")
            .await
            .unwrap();
        assert_eq!(record.department.as_deref(), Some("Met Office"));

        let record = ex.extract(&session, &job_url(), "Analyst", "").await.unwrap();
        assert_eq!(record.department.as_deref(), Some("Met Office"));

        let record = ex
            .extract(&session, &job_url(), "Analyst", "Finance")
            .await
            .unwrap();
        assert_eq!(record.department.as_deref(), Some("Finance"));
    }

    #[tokio::test]
    async fn test_placeholder_kept_when_fallback_missing() {
        let session = MockSession::new(LISTING).page(JOB, full_detail_page());

        let record = extractor(&session)
            .extract(&session, &job_url(), "Analyst", "Not specified")
            .await
            .unwrap();
        assert_eq!(record.department.as_deref(), Some("Not specified"));
    }
}
