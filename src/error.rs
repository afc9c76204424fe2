use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("タイムアウト: {0}")]
    Timeout(String),

    #[error("要素が見つかりません: {0}")]
    ElementNotFound(String),

    #[error("JavaScript実行エラー: {0}")]
    JavaScript(String),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("出力エラー: {0}")]
    Sink(String),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),

    #[error("CSV書き込みエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSONエラー: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScraperError {
    /// 「要素が無い」系の想定内の結果かどうか
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            ScraperError::Timeout(_) | ScraperError::ElementNotFound(_)
        )
    }

    /// クロール開始前に検出すべき前提条件エラー
    pub fn is_precondition(&self) -> bool {
        matches!(self, ScraperError::Config(_) | ScraperError::BrowserInit(_))
    }
}
