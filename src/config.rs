use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ScraperError;

pub const DEFAULT_TARGET_URL: &str = "https://www.civilservicejobs.service.gov.uk/csr/index.cgi";
pub const DEFAULT_OUTPUT_CSV: &str = "matched_jobs.csv";

/// ランダム待機の範囲 (min..=max)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub const fn secs(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_secs(min),
            max: Duration::from_secs(max),
        }
    }

    pub const fn fixed(d: Duration) -> Self {
        Self { min: d, max: d }
    }

    pub const ZERO: DelayRange = DelayRange::fixed(Duration::ZERO);
}

/// ページ遷移間のペーシング設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    /// 検索ページを開いた直後
    pub after_open: DelayRange,
    /// 一覧URLから外れていた場合の再ナビゲーション後
    pub after_recovery: DelayRange,
    /// 全詳細ページ処理後に一覧へ戻った後
    pub after_return: DelayRange,
    /// 「次へ」クリック前
    pub before_next: DelayRange,
    /// 「次へ」クリック後
    pub after_next: DelayRange,
    /// scrollIntoView 後のレイアウト安定待ち
    pub scroll_settle: Duration,
    /// 詳細ページ読み込み後の動的コンテンツ待ち
    pub detail_settle: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            after_open: DelayRange::secs(2, 4),
            after_recovery: DelayRange::secs(5, 8),
            after_return: DelayRange::secs(8, 12),
            before_next: DelayRange::secs(3, 6),
            after_next: DelayRange::secs(5, 8),
            scroll_settle: Duration::from_millis(500),
            detail_settle: Duration::from_secs(1),
        }
    }
}

impl PacingConfig {
    /// 待機なし（テスト・ローカル検証用）
    pub fn none() -> Self {
        Self {
            after_open: DelayRange::ZERO,
            after_recovery: DelayRange::ZERO,
            after_return: DelayRange::ZERO,
            before_next: DelayRange::ZERO,
            after_next: DelayRange::ZERO,
            scroll_settle: Duration::ZERO,
            detail_settle: Duration::ZERO,
        }
    }

    fn ranges(&self) -> [(&'static str, DelayRange); 5] {
        [
            ("after_open", self.after_open),
            ("after_recovery", self.after_recovery),
            ("after_return", self.after_return),
            ("before_next", self.before_next),
            ("after_next", self.after_next),
        ]
    }
}

/// 各待機ポイントのタイムアウト
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub search_button: Duration,
    pub list_container: Duration,
    pub detail_main_panel: Duration,
    pub pagination_menu: Duration,
    pub next_link: Duration,
    /// CDPのページ遷移待ち上限
    pub navigation: Duration,
    /// wait_until のポーリング間隔
    pub poll_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            search_button: Duration::from_secs(20),
            list_container: Duration::from_secs(20),
            detail_main_panel: Duration::from_secs(15),
            pagination_menu: Duration::from_secs(20),
            next_link: Duration::from_secs(20),
            navigation: Duration::from_secs(60),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// 外部ドキュメントDBの接続パラメータ（書き込み自体は外部コンポーネント）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub endpoint: String,
    pub database: String,
    pub container: String,
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub target_url: String,
    pub output_csv_path: PathBuf,
    /// JSONスナップショットの出力先ディレクトリ（None なら出力しない）
    pub output_json_dir: Option<PathBuf>,
    pub headless: bool,
    pub chrome_path: Option<String>,
    /// 検索ボタンクリック後、スクレイピング開始までの待機
    pub scrape_wait: Duration,
    pub timeouts: Timeouts,
    pub pacing: PacingConfig,
    /// 処理する一覧ページ数の上限（None なら「次へ」が無くなるまで）
    pub max_pages: Option<u32>,
    pub storage: Option<StorageConfig>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            output_csv_path: PathBuf::from(DEFAULT_OUTPUT_CSV),
            output_json_dir: None,
            headless: true,
            chrome_path: None,
            scrape_wait: Duration::from_secs(30),
            timeouts: Timeouts::default(),
            pacing: PacingConfig::default(),
            max_pages: None,
            storage: None,
        }
    }
}

impl ScraperConfig {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            ..Default::default()
        }
    }

    /// `.env` と環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ScraperError> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!(".env未読み込み: {}", e);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー参照関数から設定を組み立てる
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScraperError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("TARGET_URL") {
            config.target_url = url;
        }
        if let Some(path) = get("OUTPUT_CSV_FILE") {
            config.output_csv_path = PathBuf::from(path);
        }
        if let Some(dir) = get("OUTPUT_JSON_DIR") {
            config.output_json_dir = Some(PathBuf::from(dir));
        }
        if let Some(secs) = get("LOGIN_WAIT_TIME") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ScraperError::Config(format!("LOGIN_WAIT_TIME は秒数で指定してください: {}", secs))
            })?;
            config.scrape_wait = Duration::from_secs(secs);
        }
        if let Some(flag) = get("HEADLESS") {
            config.headless = parse_bool(&flag).ok_or_else(|| {
                ScraperError::Config(format!("HEADLESS は true/false で指定してください: {}", flag))
            })?;
        }
        if let Some(pages) = get("MAX_PAGES") {
            let pages: u32 = pages.trim().parse().map_err(|_| {
                ScraperError::Config(format!("MAX_PAGES は正の整数で指定してください: {}", pages))
            })?;
            config.max_pages = Some(pages);
        }
        config.chrome_path = get("CHROME_PATH").or_else(|| get("CHROMIUM_PATH"));

        if let Some(endpoint) = get("COSMOS_ENDPOINT") {
            config.storage = Some(StorageConfig {
                endpoint,
                database: get("COSMOS_DATABASE_NAME").unwrap_or_default(),
                container: get("COSMOS_CONTAINER_NAME").unwrap_or_default(),
            });
        }

        Ok(config)
    }

    pub fn with_output_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_csv_path = path.into();
        self
    }

    pub fn with_output_json_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_json_dir = Some(dir.into());
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_scrape_wait(mut self, wait: Duration) -> Self {
        self.scrape_wait = wait;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = Some(storage);
        self
    }

    /// ナビゲーション開始前の前提条件チェック
    pub fn validate(&self) -> Result<(), ScraperError> {
        let url = Url::parse(self.target_url.trim()).map_err(|e| {
            ScraperError::Config(format!("TARGET_URL が不正です ({}): {}", self.target_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScraperError::Config(format!(
                "TARGET_URL は http(s) である必要があります: {}",
                self.target_url
            )));
        }

        if self.output_csv_path.as_os_str().is_empty() {
            return Err(ScraperError::Config("OUTPUT_CSV_FILE が空です".into()));
        }

        if self.max_pages == Some(0) {
            return Err(ScraperError::Config("MAX_PAGES は 1 以上にしてください".into()));
        }

        if self.timeouts.poll_interval.is_zero() {
            return Err(ScraperError::Config("poll_interval は 0 より大きくしてください".into()));
        }

        for (name, range) in self.pacing.ranges() {
            if range.min > range.max {
                return Err(ScraperError::Config(format!(
                    "待機範囲 {} の min が max を超えています",
                    name
                )));
            }
        }

        if let Some(storage) = &self.storage {
            if storage.database.is_empty() || storage.container.is_empty() {
                return Err(ScraperError::Config(
                    "COSMOS_ENDPOINT 指定時は COSMOS_DATABASE_NAME と COSMOS_CONTAINER_NAME が必要です"
                        .into(),
                ));
            }
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
