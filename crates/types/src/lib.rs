//! # TAS crypto helper 共有型定義
//!
//! ヘルパーサービスが返すJSONと、TSAへ送るJSONの構造体を提供する。
//!
//! ## エンコーディング規則
//! - Base64 (Standard): 公開鍵DER、署名、TSAへ渡すハッシュ
//! - Hex (小文字): アーティファクトダイジェスト

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// 定数
// ---------------------------------------------------------------------------

/// Proof of Possessionとして署名する固定のアイデンティティ文字列。
pub const IDENTITY_TO_SIGN: &str = "jdoe@redhat.com";

/// TSAへ申告するハッシュアルゴリズム名。
pub const TSA_HASH_ALGORITHM: &str = "sha256";

/// タイムスタンプ応答のContent-Type。
pub const TIMESTAMP_REPLY_CONTENT_TYPE: &str = "application/timestamp-reply";

// ---------------------------------------------------------------------------
// /generate-payloads レスポンス
// ---------------------------------------------------------------------------

/// 1回の署名生成で作られる暗号素材一式。
///
/// 全ての署名は同梱の公開鍵で検証できる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoComponents {
    /// Base64エンコードされた公開鍵（SubjectPublicKeyInfo DER）
    pub public_key_base64: String,
    /// Base64エンコードされたアイデンティティ署名（ECDSA-SHA256, ASN.1 DER）
    pub signed_email_address: String,
    /// Hexエンコードされたアーティファクトダイジェスト（32バイト）
    pub artifact_hash: String,
    /// Base64エンコードされたアーティファクト署名（ASN.1 DER）
    pub artifact_signature: String,
}

// ---------------------------------------------------------------------------
// TSA リクエスト
// ---------------------------------------------------------------------------

/// TSAへPOSTするタイムスタンプ要求。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TsaRequest {
    /// Base64エンコードされたSHA-256ダイジェスト
    pub artifact_hash: String,
    /// 応答に証明書を含めるよう要求するか
    pub certificates: bool,
    /// ハッシュアルゴリズム名（常に `"sha256"`）
    pub hash_algorithm: String,
    /// リプレイ防止用ノンス（非負の63ビット値）
    pub nonce: i64,
}

impl TsaRequest {
    /// Base64済みのダイジェストとノンスからSHA-256用のリクエストを組み立てる。
    pub fn sha256(artifact_hash_b64: String, nonce: i64) -> Self {
        Self {
            artifact_hash: artifact_hash_b64,
            certificates: true,
            hash_algorithm: TSA_HASH_ALGORITHM.to_string(),
            nonce,
        }
    }
}
