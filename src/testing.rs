//! テスト用のインメモリ DOM セッション

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{PacingConfig, ScraperConfig, Timeouts};
use crate::error::ScraperError;
use crate::traits::{Launch, Locator, Lookup, Session};

#[derive(Debug, Default)]
pub struct MockNode {
    text: String,
    attrs: HashMap<String, String>,
    children: HashMap<String, Vec<Arc<MockNode>>>,
    failing: HashSet<String>,
    navigates_to: Option<String>,
    fail_activation: bool,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn child(mut self, selector: &str, node: MockNode) -> Self {
        self.children
            .entry(selector.to_string())
            .or_default()
            .push(Arc::new(node));
        self
    }

    /// この要素内での `selector` の探索をエラーにする
    pub fn failing(mut self, selector: &str) -> Self {
        self.failing.insert(selector.to_string());
        self
    }

    /// クリックされたら `url` に遷移する
    pub fn navigates_to(mut self, url: &str) -> Self {
        self.navigates_to = Some(url.to_string());
        self
    }

    pub fn failing_activation(mut self) -> Self {
        self.fail_activation = true;
        self
    }
}

#[derive(Debug, Default, Clone)]
pub struct MockPage {
    elements: HashMap<String, Vec<Arc<MockNode>>>,
    failing: HashSet<String>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(mut self, selector: &str, node: MockNode) -> Self {
        self.elements
            .entry(selector.to_string())
            .or_default()
            .push(Arc::new(node));
        self
    }

    pub fn without(mut self, selector: &str) -> Self {
        self.elements.remove(selector);
        self
    }

    pub fn failing(mut self, selector: &str) -> Self {
        self.failing.insert(selector.to_string());
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    current: String,
    opened: Vec<String>,
    scrolls: usize,
    activations: usize,
    url_reads: usize,
    drift: Option<String>,
    closed: bool,
}

/// クローンは状態（現在URL・操作回数・close 済みか）を共有する
#[derive(Clone)]
pub struct MockSession {
    pages: HashMap<String, MockPage>,
    open_failures: HashSet<String>,
    state: Arc<Mutex<MockState>>,
}

impl MockSession {
    pub fn new(start_url: &str) -> Self {
        Self {
            pages: HashMap::new(),
            open_failures: HashSet::new(),
            state: Arc::new(Mutex::new(MockState {
                current: start_url.to_string(),
                ..Default::default()
            })),
        }
    }

    pub fn page(mut self, url: &str, page: MockPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn fail_open(mut self, url: &str) -> Self {
        self.open_failures.insert(url.to_string());
        self
    }

    /// 最初の current_url 読み取りの直後に別URLへ移った状態にする
    pub fn drift_after_first_read(self, url: &str) -> Self {
        self.state.lock().unwrap().drift = Some(url.to_string());
        self
    }

    pub fn opened(&self) -> Vec<String> {
        self.state.lock().unwrap().opened.clone()
    }

    pub fn current(&self) -> String {
        self.state.lock().unwrap().current.clone()
    }

    pub fn scrolls(&self) -> usize {
        self.state.lock().unwrap().scrolls
    }

    pub fn activations(&self) -> usize {
        self.state.lock().unwrap().activations
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    pub fn short_timeout(&self) -> Duration {
        Duration::from_millis(30)
    }

    pub fn fast_timeouts(&self) -> Timeouts {
        let t = self.short_timeout();
        Timeouts {
            search_button: t,
            list_container: t,
            detail_main_panel: t,
            pagination_menu: t,
            next_link: t,
            navigation: t,
            poll_interval: Duration::from_millis(2),
        }
    }

    pub fn fast_config(&self) -> ScraperConfig {
        ScraperConfig::new("https://x/search")
            .with_timeouts(self.fast_timeouts())
            .with_pacing(PacingConfig::none())
            .with_scrape_wait(Duration::ZERO)
    }

    fn current_page(&self) -> Option<&MockPage> {
        let current = self.current();
        self.pages.get(&current)
    }
}

fn lookup_error(locator: &str) -> ScraperError {
    ScraperError::JavaScript(format!("mock lookup failure: {}", locator))
}

#[async_trait]
impl Session for MockSession {
    type Element = Arc<MockNode>;

    async fn open(&self, url: &str) -> Result<(), ScraperError> {
        if self.open_failures.contains(url) {
            return Err(ScraperError::Navigation(format!("mock navigation failure: {}", url)));
        }
        let mut state = self.state.lock().unwrap();
        state.opened.push(url.to_string());
        state.current = url.to_string();
        Ok(())
    }

    async fn find_first(&self, locator: &Locator) -> Lookup<Self::Element> {
        Lookup::from_first(self.find_all(locator).await)
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Self::Element>, ScraperError> {
        let Some(page) = self.current_page() else {
            return Ok(Vec::new());
        };
        if page.failing.contains(locator.as_str()) {
            return Err(lookup_error(locator.as_str()));
        }
        Ok(page.elements.get(locator.as_str()).cloned().unwrap_or_default())
    }

    async fn find_in(&self, parent: &Self::Element, locator: &Locator) -> Lookup<Self::Element> {
        if parent.failing.contains(locator.as_str()) {
            return Lookup::Error(lookup_error(locator.as_str()));
        }
        Lookup::from_first(Ok(parent
            .children
            .get(locator.as_str())
            .cloned()
            .unwrap_or_default()))
    }

    async fn text(&self, element: &Self::Element) -> Result<String, ScraperError> {
        Ok(element.text.clone())
    }

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, ScraperError> {
        Ok(element.attrs.get(name).cloned())
    }

    async fn outer_html(&self, element: &Self::Element) -> Result<String, ScraperError> {
        Ok(format!("<div>{}</div>", element.text))
    }

    async fn scroll_into_view(&self, _element: &Self::Element) -> Result<(), ScraperError> {
        self.state.lock().unwrap().scrolls += 1;
        Ok(())
    }

    async fn activate(&self, element: &Self::Element) -> Result<(), ScraperError> {
        if element.fail_activation {
            return Err(ScraperError::JavaScript("mock click failure".into()));
        }
        let mut state = self.state.lock().unwrap();
        state.activations += 1;
        if let Some(url) = &element.navigates_to {
            state.current = url.clone();
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String, ScraperError> {
        let mut state = self.state.lock().unwrap();
        state.url_reads += 1;
        let url = state.current.clone();
        if state.url_reads == 1 {
            if let Some(drift) = state.drift.take() {
                state.current = drift;
            }
        }
        Ok(url)
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(2)
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

#[async_trait]
impl Launch for MockSession {
    async fn launch(_config: &ScraperConfig) -> Result<Self, ScraperError> {
        Err(ScraperError::BrowserInit("mock session cannot be launched".into()))
    }
}
