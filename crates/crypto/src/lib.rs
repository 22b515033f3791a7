//! # TAS crypto helper 暗号処理
//!
//! 署名ワークフロー用の暗号素材生成と、TSAへ渡すダイジェスト計算を実装する。
//!
//! ## 暗号アルゴリズム
//! | 用途 | アルゴリズム |
//! |------|------------|
//! | 鍵ペア | ECDSA P-256（リクエストごとに生成） |
//! | アイデンティティ署名 | ECDSA-SHA256, ASN.1 DER |
//! | アーティファクト署名 | ECDSA（ダイジェストを直接署名）, ASN.1 DER |
//! | 公開鍵エンコード | SubjectPublicKeyInfo DER |
//! | ハッシュ | SHA-256 |

pub mod artifact;
pub mod cancel;
pub mod signing;

use base64::Engine;
use sha2::{Digest, Sha256};

pub use artifact::{ArtifactDigest, ARTIFACT_DIGEST_LEN};
pub use cancel::CancelSignal;
pub use signing::generate_components;

/// 暗号処理のエラー型
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// OS乱数源からの読み出しに失敗
    #[error("乱数源からの読み出しに失敗しました: {0}")]
    RandomSource(String),
    /// ECDSA鍵ペア生成エラー
    #[error("ECDSA鍵ペアの生成に失敗しました: {0}")]
    KeyGeneration(String),
    /// 公開鍵のDERエンコードエラー
    #[error("公開鍵のマーシャルに失敗しました: {0}")]
    PublicKeyEncoding(String),
    /// アイデンティティ署名エラー
    #[error("メールアドレスの署名に失敗しました: {0}")]
    IdentitySigning(String),
    /// アーティファクトダイジェスト署名エラー
    #[error("アーティファクトハッシュの署名に失敗しました: {0}")]
    ArtifactSigning(String),
    /// リクエストがキャンセルされた
    #[error("署名処理がキャンセルされました")]
    Cancelled,
}

/// Base64エンジン（Standard）
pub fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

/// SHA-256ハッシュ計算。
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// TSAリクエストの `artifactHash` フィールド値を計算する。
///
/// `base64(SHA-256(data))`
pub fn sha256_base64(data: &[u8]) -> String {
    b64().encode(sha256(data))
}
