//! # TSA転送クライアント
//!
//! 呼び出し元から受け取った署名バイト列をSHA-256でハッシュし、
//! JSONのタイムスタンプ要求としてTSAへPOSTする。レスポンスは解析せずそのまま返す。
//!
//! ## TSAへのリクエスト
//! ```text
//! POST {TSA_URL}
//! Content-Type: application/json
//! {"artifactHash": base64(SHA-256(body)), "certificates": true,
//!  "hashAlgorithm": "sha256", "nonce": <i64>}
//! ```
//!
//! 成功は200または201のみ。リトライは行わない。

use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Bytes;
use axum::http::{header, StatusCode};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use reqwest::Url;
use tas_types::TsaRequest;

use crate::error::HelperError;

/// リプレイ防止用のノンスを生成する。
///
/// 現在時刻（ナノ秒）でシードしたリクエストごとのPRNGを使う。
/// 暗号論的な強度は不要で、TSA側で要求を区別できれば足りる。
pub fn generate_nonce() -> i64 {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    nonce_from_seed(seed)
}

/// 63ビットの非負ノンス
fn nonce_from_seed(seed: u64) -> i64 {
    let mut rng = StdRng::seed_from_u64(seed);
    (rng.next_u64() >> 1) as i64
}

/// 署名バイト列からTSAリクエストを組み立てる。
pub fn build_tsa_request(signature: &[u8]) -> TsaRequest {
    TsaRequest::sha256(tas_crypto::sha256_base64(signature), generate_nonce())
}

/// TSAへタイムスタンプ要求を送り、レスポンスボディをそのまま返す。
pub async fn forward_to_tsa(
    client: &reqwest::Client,
    tsa_url: &Url,
    signature: &[u8],
) -> Result<Bytes, HelperError> {
    let tsa_request = build_tsa_request(signature);
    let request_body =
        serde_json::to_vec(&tsa_request).map_err(|e| HelperError::Serialization(e.to_string()))?;

    tracing::info!(
        tsa_url = %tsa_url,
        signature_bytes = signature.len(),
        nonce = tsa_request.nonce,
        "TSAへタイムスタンプ要求を送信"
    );

    let response = client
        .post(tsa_url.clone())
        .header(header::CONTENT_TYPE, "application/json")
        .body(request_body)
        .send()
        .await
        .map_err(|e| HelperError::TsaNetwork(e.to_string()))?;

    let status = response.status();
    if status != StatusCode::OK && status != StatusCode::CREATED {
        let body = match response.text().await {
            Ok(text) => text,
            Err(e) => format!("<レスポンス読み取り失敗: {e}>"),
        };
        return Err(HelperError::TsaStatus {
            status: status.as_u16(),
            body,
        });
    }

    let timestamp_reply = response
        .bytes()
        .await
        .map_err(|e| HelperError::TsaResponseRead(e.to_string()))?;

    tracing::info!(
        status = %status,
        reply_bytes = timestamp_reply.len(),
        "TSAからタイムスタンプ応答を受信"
    );
    Ok(timestamp_reply)
}
