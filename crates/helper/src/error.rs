//! # ヘルパー エラー型
//!
//! 全エンドポイントで共通のエラー型。失敗したステップを名指しするメッセージを
//! プレーンテキストで1回だけ返す。

use axum::http::{header, StatusCode};
use tas_crypto::CryptoError;

/// ヘルパーエラー型。
#[derive(Debug, thiserror::Error)]
pub enum HelperError {
    /// ECDSA鍵ペアの生成に失敗
    #[error("ECDSA鍵ペアの生成に失敗: {0}")]
    KeyGeneration(String),
    /// 公開鍵のマーシャルに失敗
    #[error("公開鍵のマーシャルに失敗: {0}")]
    PublicKeyEncoding(String),
    /// メールアドレス（アイデンティティ）の署名に失敗
    #[error("メールアドレスの署名に失敗: {0}")]
    IdentitySigning(String),
    /// アーティファクトハッシュの署名に失敗
    #[error("アーティファクトハッシュの署名に失敗: {0}")]
    ArtifactSigning(String),
    /// リクエストがキャンセルされた
    #[error("リクエストがキャンセルされました")]
    Cancelled,
    /// 許可されていないHTTPメソッド
    #[error("許可されていないメソッドです（POSTである必要があります）: {0}")]
    MethodNotAllowed(String),
    /// リクエストボディの読み取りに失敗
    #[error("リクエストボディの読み取りに失敗: {0}")]
    BodyRead(String),
    /// TSAリクエストのシリアライズに失敗
    #[error("TSAリクエストのマーシャルに失敗: {0}")]
    Serialization(String),
    /// TSAへの送信に失敗（ネットワークエラー）
    #[error("TSAリクエストに失敗（ネットワークエラー）: {0}")]
    TsaNetwork(String),
    /// TSAが200/201以外を返した
    #[error("TSAが成功以外のステータスを返しました: HTTP {status}, Body: {body}")]
    TsaStatus { status: u16, body: String },
    /// TSAレスポンスボディの読み取りに失敗
    #[error("TSAレスポンスボディの読み取りに失敗: {0}")]
    TsaResponseRead(String),
    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl From<CryptoError> for HelperError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::KeyGeneration(msg) => HelperError::KeyGeneration(msg),
            CryptoError::PublicKeyEncoding(msg) => HelperError::PublicKeyEncoding(msg),
            CryptoError::IdentitySigning(msg) => HelperError::IdentitySigning(msg),
            CryptoError::ArtifactSigning(msg) => HelperError::ArtifactSigning(msg),
            CryptoError::Cancelled => HelperError::Cancelled,
            other @ CryptoError::RandomSource(_) => HelperError::Internal(other.to_string()),
        }
    }
}

impl HelperError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HelperError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            HelperError::TsaStatus { .. } => StatusCode::BAD_GATEWAY,
            HelperError::KeyGeneration(_)
            | HelperError::PublicKeyEncoding(_)
            | HelperError::IdentitySigning(_)
            | HelperError::ArtifactSigning(_)
            | HelperError::Cancelled
            | HelperError::BodyRead(_)
            | HelperError::Serialization(_)
            | HelperError::TsaNetwork(_)
            | HelperError::TsaResponseRead(_)
            | HelperError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for HelperError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = %status, "{}", self);
        } else {
            tracing::warn!(status = %status, "{}", self);
        }
        if matches!(self, HelperError::MethodNotAllowed(_)) {
            return (status, [(header::ALLOW, "POST")], self.to_string()).into_response();
        }
        (status, self.to_string()).into_response()
    }
}
