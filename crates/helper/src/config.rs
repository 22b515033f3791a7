//! # ヘルパー設定・共有状態
//!
//! 環境変数からの設定読み込みと、ハンドラ間で共有する不変状態の定義。
//!
//! ## 環境変数
//! | 変数 | 必須 | デフォルト |
//! |------|------|-----------|
//! | `TSA_URL` | ○ | なし（未設定なら起動失敗） |
//! | `LISTEN_ADDR` | | `0.0.0.0:8080` |
//! | `TSA_TIMEOUT_SECS` | | `120` |

use std::time::Duration;

use reqwest::Url;
use tas_crypto::ArtifactDigest;

/// デフォルトのリッスンアドレス
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// TSA呼び出しのデフォルトタイムアウト（秒）
pub const DEFAULT_TSA_TIMEOUT_SECS: u64 = 120;

/// 設定エラー。いずれも起動時に致命的なオペレーターエラーとして扱う。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TSA_URLが未設定または空
    #[error("TSA_URL環境変数が設定されていません")]
    MissingTsaUrl,
    /// TSA_URLがURLとして解釈できない
    #[error("TSA_URLが不正です: {0}")]
    InvalidTsaUrl(String),
    /// 数値等の値が不正
    #[error("{key}の値が不正です: {value}")]
    InvalidValue { key: &'static str, value: String },
    /// HTTPクライアントの構築に失敗
    #[error("HTTPクライアントの構築に失敗: {0}")]
    HttpClient(String),
}

/// 起動時に一度だけ読み込む設定。
#[derive(Debug, Clone)]
pub struct HelperConfig {
    /// 転送先TSAのエンドポイントURL
    pub tsa_url: Url,
    /// HTTPリッスンアドレス
    pub listen_addr: String,
    /// TSA呼び出しのタイムアウト
    pub tsa_timeout: Duration,
}

impl HelperConfig {
    /// プロセス環境変数から読み込む。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー参照関数から読み込む。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("TSA_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingTsaUrl)?;
        let tsa_url =
            Url::parse(&raw_url).map_err(|e| ConfigError::InvalidTsaUrl(format!("{raw_url}: {e}")))?;
        if !matches!(tsa_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidTsaUrl(format!(
                "{raw_url}: http/httpsのみ対応"
            )));
        }

        let listen_addr =
            lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());

        let tsa_timeout_secs = match lookup("TSA_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: "TSA_TIMEOUT_SECS",
                    value,
                })?,
            None => DEFAULT_TSA_TIMEOUT_SECS,
        };

        Ok(Self {
            tsa_url,
            listen_addr,
            tsa_timeout: Duration::from_secs(tsa_timeout_secs),
        })
    }
}

/// ハンドラ間の共有状態。
///
/// 起動後は一切変更しないためロックは不要。
pub struct HelperState {
    /// 起動時に生成したアーティファクトダイジェスト
    pub artifact_digest: ArtifactDigest,
    /// TSAのエンドポイントURL
    pub tsa_url: Url,
    /// HTTPクライアント
    pub http_client: reqwest::Client,
}

impl HelperState {
    /// 設定と生成済みダイジェストから共有状態を構築する。
    pub fn new(config: &HelperConfig, artifact_digest: ArtifactDigest) -> Result<Self, ConfigError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.tsa_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            artifact_digest,
            tsa_url: config.tsa_url.clone(),
            http_client,
        })
    }
}
