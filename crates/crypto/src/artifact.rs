//! # アーティファクトダイジェスト
//!
//! プロセス起動時に一度だけ生成し、全ての署名生成リクエストで共有する32バイト値。
//!
//! 実在するアーティファクトのハッシュではなく、乱数そのものである。
//! 「署名対象の不透明な32バイトペイロード」として扱い、
//! アーティファクトの指紋としての意味は持たせない。

use rand::rngs::OsRng;
use rand::RngCore;

use crate::CryptoError;

/// アーティファクトダイジェストのバイト長
pub const ARTIFACT_DIGEST_LEN: usize = 32;

/// プロセス寿命の間不変なアーティファクトダイジェスト。
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ArtifactDigest([u8; ARTIFACT_DIGEST_LEN]);

impl ArtifactDigest {
    /// OSの暗号論的乱数源から32バイトを取得して生成する。
    ///
    /// 乱数源が利用できない場合はエラーを返す。呼び出し側は起動失敗として扱うこと。
    pub fn generate() -> Result<Self, CryptoError> {
        let mut bytes = [0u8; ARTIFACT_DIGEST_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::RandomSource(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// 既知のバイト列から構築する（テスト・再現用）。
    pub fn from_bytes(bytes: [u8; ARTIFACT_DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ARTIFACT_DIGEST_LEN] {
        &self.0
    }

    /// 小文字Hex表現
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for ArtifactDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ArtifactDigest").field(&self.to_hex()).finish()
    }
}
