use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::{Launch, Locator, Lookup, Session};

const WINDOW_WIDTH: u32 = 1920;
const WINDOW_HEIGHT: u32 = 1080;

const JS_SCROLL_INTO_VIEW: &str = "function() { this.scrollIntoView(true); }";
const JS_CLICK: &str = "function() { this.click(); }";

/// chromiumoxide で動く `Session` 実装
pub struct BrowserSession {
    browser: Option<Browser>,
    page: Page,
    handler: Option<JoinHandle<()>>,
    call_timeout: Duration,
    poll_interval: Duration,
}

impl BrowserSession {
    /// CDP 呼び出しをタイムアウト付きで実行
    async fn bounded<T, F>(
        &self,
        what: &str,
        fut: F,
        map_err: fn(String) -> ScraperError,
    ) -> Result<T, ScraperError>
    where
        F: Future<Output = Result<T, CdpError>> + Send,
    {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(map_err(format!("{}: {}", what, e))),
            Err(_) => Err(ScraperError::Timeout(format!(
                "{} が{:?}以内に完了しませんでした",
                what, self.call_timeout
            ))),
        }
    }

    /// XPath に一致する要素があるか（DOM.performSearch 前の存在確認）
    async fn xpath_exists(&self, xpath: &str) -> Result<bool, ScraperError> {
        let quoted = serde_json::to_string(xpath)?;
        let script = format!(
            "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue !== null",
            quoted
        );
        let result = self
            .bounded("XPath存在確認", self.page.evaluate(script), ScraperError::JavaScript)
            .await?;
        Ok(result.into_value::<bool>().unwrap_or(false))
    }

    async fn query_all(&self, locator: &Locator) -> Result<Vec<Element>, ScraperError> {
        match locator {
            Locator::Css(selector) => {
                self.bounded(
                    "要素検索",
                    self.page.find_elements(selector.as_str()),
                    ScraperError::JavaScript,
                )
                .await
            }
            Locator::XPath(xpath) => {
                if !self.xpath_exists(xpath).await? {
                    return Ok(Vec::new());
                }
                self.bounded(
                    "XPath検索",
                    self.page.find_xpaths(xpath.as_str()),
                    ScraperError::JavaScript,
                )
                .await
            }
        }
    }
}

#[async_trait]
impl Launch for BrowserSession {
    /// ブラウザを起動して空ページを開く
    async fn launch(config: &ScraperConfig) -> Result<Self, ScraperError> {
        info!("ブラウザを初期化中...");

        let mut builder = BrowserConfig::builder()
            .window_size(WINDOW_WIDTH, WINDOW_HEIGHT)
            .request_timeout(config.timeouts.navigation)
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");

        if let Some(path) = &config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(format!("ブラウザ設定エラー: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        // ブラウザイベントハンドラをバックグラウンドで実行
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser event error: {:?}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        info!("ブラウザ初期化完了 (headless={})", config.headless);
        Ok(Self {
            browser: Some(browser),
            page,
            handler: Some(handler),
            call_timeout: config.timeouts.navigation,
            poll_interval: config.timeouts.poll_interval,
        })
    }
}

#[async_trait]
impl Session for BrowserSession {
    type Element = Element;

    async fn open(&self, url: &str) -> Result<(), ScraperError> {
        self.bounded("ページ遷移", self.page.goto(url), ScraperError::Navigation)
            .await?;
        Ok(())
    }

    async fn find_first(&self, locator: &Locator) -> Lookup<Self::Element> {
        Lookup::from_first(self.query_all(locator).await)
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Self::Element>, ScraperError> {
        self.query_all(locator).await
    }

    async fn find_in(&self, parent: &Self::Element, locator: &Locator) -> Lookup<Self::Element> {
        match locator {
            Locator::Css(selector) => Lookup::from_first(
                self.bounded(
                    "子要素検索",
                    parent.find_elements(selector.as_str()),
                    ScraperError::JavaScript,
                )
                .await,
            ),
            Locator::XPath(xpath) => Lookup::Error(unsupported_child_xpath(xpath)),
        }
    }

    async fn text(&self, element: &Self::Element) -> Result<String, ScraperError> {
        let text = self
            .bounded("テキスト取得", element.inner_text(), ScraperError::JavaScript)
            .await?;
        Ok(text.unwrap_or_default())
    }

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, ScraperError> {
        self.bounded("属性取得", element.attribute(name), ScraperError::JavaScript)
            .await
    }

    async fn outer_html(&self, element: &Self::Element) -> Result<String, ScraperError> {
        let html = self
            .bounded("HTML取得", element.outer_html(), ScraperError::JavaScript)
            .await?;
        Ok(html.unwrap_or_default())
    }

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<(), ScraperError> {
        self.bounded(
            "scrollIntoView",
            element.call_js_fn(JS_SCROLL_INTO_VIEW, false),
            ScraperError::JavaScript,
        )
        .await?;
        Ok(())
    }

    async fn activate(&self, element: &Self::Element) -> Result<(), ScraperError> {
        self.bounded("クリック", element.call_js_fn(JS_CLICK, false), ScraperError::JavaScript)
            .await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, ScraperError> {
        self.bounded("URL取得", self.page.url(), ScraperError::Navigation)
            .await?
            .ok_or_else(|| ScraperError::Navigation("現在のURLが取得できません".into()))
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        info!("ブラウザを終了中...");

        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                debug!("ブラウザ終了に失敗: {}", e);
            }
            if let Err(e) = browser.wait().await {
                debug!("ブラウザプロセスの終了待ちに失敗: {}", e);
            }
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        info!("ブラウザ終了完了");
        Ok(())
    }
}

/// 親要素内の XPath 検索は未対応。要素が無いのとは区別して失敗扱いにする
fn unsupported_child_xpath(xpath: &str) -> ScraperError {
    ScraperError::JavaScript(format!("子要素の XPath 検索は未対応です: {}", xpath))
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}
