//! # ANY /generate-payloads
//!
//! リクエストごとに新しいP-256鍵ペアを生成し、公開鍵・アイデンティティ署名・
//! アーティファクト署名をまとめて返す。呼び出し元は入力を渡さない
//! （負荷試験スクリプトが付ける `?payload=` クエリは無視する）。

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use tas_crypto::{generate_components, CancelSignal};
use tas_types::CryptoComponents;

use crate::config::HelperState;
use crate::error::HelperError;

/// ハンドラのFutureが破棄された（クライアント切断等）ときにキャンセルを通知する。
struct CancelOnDrop(CancelSignal);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        // 署名処理の完了後に通知されても影響はない
        self.0.cancel();
    }
}

/// ログに出す公開鍵の先頭部分（Base64はASCIIのみ）
const PUBLIC_KEY_LOG_PREFIX_LEN: usize = 16;

fn public_key_prefix(public_key_base64: &str) -> &str {
    public_key_base64
        .get(..PUBLIC_KEY_LOG_PREFIX_LEN)
        .unwrap_or(public_key_base64)
}

/// ANY /generate-payloads — 署名素材の生成。
///
/// 鍵生成と署名はブロッキングスレッドで実行する。
pub async fn handle_generate_payloads(
    State(state): State<Arc<HelperState>>,
) -> Result<Json<CryptoComponents>, HelperError> {
    let cancel = CancelSignal::new();
    let _guard = CancelOnDrop(cancel.clone());

    let digest = state.artifact_digest;
    let components = tokio::task::spawn_blocking(move || generate_components(&digest, &cancel))
        .await
        .map_err(|e| HelperError::Internal(format!("署名タスクの実行に失敗: {e}")))??;

    tracing::debug!(
        artifact_hash = %components.artifact_hash,
        public_key_prefix = %public_key_prefix(&components.public_key_base64),
        "署名素材を生成"
    );
    Ok(Json(components))
}
