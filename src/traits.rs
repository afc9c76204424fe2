use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::jobs::{CrawlOutcome, JobRecord};
use crate::wait;

/// 要素の探索方法
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Locator::Css(s) | Locator::XPath(s) => s,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css={}", s),
            Locator::XPath(s) => write!(f, "xpath={}", s),
        }
    }
}

/// 単発の要素探索結果
///
/// `NotFound` は想定内（呼び出し側は継続する）、`Error` は想定外の失敗。
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Error(ScraperError),
}

impl<T> Lookup<T> {
    pub fn from_first(result: Result<Vec<T>, ScraperError>) -> Self {
        match result {
            Ok(items) => items.into_iter().next().map_or(Lookup::NotFound, Lookup::Found),
            Err(e) => Lookup::Error(e),
        }
    }
}

/// ブラウザセッション
///
/// 上位コンポーネントが触るのはこのトレイトだけ。実装を差し替えても
/// 抽出・ページング・クロール処理は変わらない。
#[async_trait]
pub trait Session: Send + Sync {
    type Element: Send + Sync;

    /// URLを開く
    async fn open(&self, url: &str) -> Result<(), ScraperError>;

    /// 最初に一致した要素
    async fn find_first(&self, locator: &Locator) -> Lookup<Self::Element>;

    /// 一致した全要素（DOM順）
    async fn find_all(&self, locator: &Locator) -> Result<Vec<Self::Element>, ScraperError>;

    /// 親要素内で最初に一致した要素
    async fn find_in(&self, parent: &Self::Element, locator: &Locator) -> Lookup<Self::Element>;

    /// 表示テキスト
    async fn text(&self, element: &Self::Element) -> Result<String, ScraperError>;

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, ScraperError>;

    async fn outer_html(&self, element: &Self::Element) -> Result<String, ScraperError>;

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<(), ScraperError>;

    /// スクリプト経由のクリック（オーバーレイやスクロール位置に影響されない）
    async fn activate(&self, element: &Self::Element) -> Result<(), ScraperError>;

    async fn current_url(&self) -> Result<String, ScraperError>;

    /// wait_until のポーリング間隔
    fn poll_interval(&self) -> Duration;

    /// セッション終了
    async fn close(&mut self) -> Result<(), ScraperError>;

    /// 要素が現れるまで待機（タイムアウトで `ScraperError::Timeout`）
    async fn wait_until(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Self::Element, ScraperError> {
        let what = locator.to_string();
        wait::wait_until(&what, timeout, self.poll_interval(), || {
            self.find_first(locator)
        })
        .await
    }

    /// 親要素内に要素が現れるまで待機
    async fn wait_until_in(
        &self,
        parent: &Self::Element,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Self::Element, ScraperError> {
        let what = locator.to_string();
        wait::wait_until(&what, timeout, self.poll_interval(), || {
            self.find_in(parent, locator)
        })
        .await
    }
}

/// 設定から起動できるセッション
#[async_trait]
pub trait Launch: Session + Sized {
    async fn launch(config: &ScraperConfig) -> Result<Self, ScraperError>;
}

/// 出力先の種類（レポートのどの欄にパスを載せるか）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Csv,
    Json,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkKind::Csv => write!(f, "csv"),
            SinkKind::Json => write!(f, "json"),
        }
    }
}

/// 収集済みレコードの出力先
#[async_trait]
pub trait RecordSink: Send + Sync {
    fn kind(&self) -> SinkKind;

    /// 全レコードを一括で書き込む。書き込んだファイルのパスを返す（0件なら None）
    async fn write(&self, records: &[JobRecord]) -> Result<Option<PathBuf>, ScraperError>;
}

#[async_trait]
pub trait Scraper: Send + Sync {
    /// ブラウザ初期化
    async fn initialize(&mut self) -> Result<(), ScraperError>;

    /// 検索ページを開いて検索を実行
    async fn search(&mut self) -> Result<(), ScraperError>;

    /// 一覧・詳細ページをクロール
    async fn crawl(&mut self) -> Result<CrawlOutcome, ScraperError>;

    /// リソース解放
    async fn close(&mut self) -> Result<(), ScraperError>;

    /// 一括実行（initialize → search → crawl → close）
    ///
    /// close はどの経路でも必ず呼ばれる。
    async fn execute(&mut self) -> Result<CrawlOutcome, ScraperError> {
        let result = async {
            self.initialize().await?;
            self.search().await?;
            self.crawl().await
        }
        .await;

        if let Err(e) = self.close().await {
            warn!("ブラウザセッションの終了に失敗: {}", e);
        }
        result
    }
}
