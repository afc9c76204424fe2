//! 求人サイトのクロール
//!
//! 一覧ページ → 詳細ページ → ページングをブラウザセッション経由で辿り、
//! 固定スキーマの `JobRecord` を集める。

mod crawler;
mod detail;
mod list;
mod pagination;
mod scraper;
pub mod selectors;
mod types;

pub use crawler::CrawlOrchestrator;
pub use detail::DetailPageExtractor;
pub use list::{ListPage, ListPageExtractor};
pub use pagination::{PageAdvance, PaginationController};
pub use scraper::{search_jobs, JobBoardScraper};
pub use types::{
    normalize_text, CrawlOutcome, CrawlStatus, JobField, JobRecord, JobSummary,
    DEPARTMENT_PLACEHOLDER,
};
