//! # TAS crypto helper
//!
//! 署名ワークフローの負荷試験用に暗号素材を生成し、署名をTSAへ中継する小さなHTTPサービス。
//!
//! ## 起動シーケンス
//! 1. 環境変数の読み込み（`TSA_URL` 未設定なら起動失敗）
//! 2. アーティファクトダイジェストの生成（乱数源が使えなければ起動失敗）
//! 3. HTTPリスナーの起動
//!
//! ## API エンドポイント
//! - `ANY /generate-payloads` — 鍵ペア生成 + Proof of Possession + アーティファクト署名
//! - `POST /get-timestamp` — 署名のSHA-256をTSAへ送り、応答をそのまま返す

mod config;
mod endpoints;
mod error;
mod tsa;

use std::sync::Arc;

use tas_crypto::ArtifactDigest;

use crate::config::{HelperConfig, HelperState};

/// ルーターを構築する。
fn router(state: Arc<HelperState>) -> axum::Router {
    axum::Router::new()
        .route(
            "/generate-payloads",
            axum::routing::any(endpoints::handle_generate_payloads),
        )
        .route(
            "/get-timestamp",
            axum::routing::any(endpoints::handle_get_timestamp),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = HelperConfig::from_env().inspect_err(|e| {
        tracing::error!("設定の読み込みに失敗しました: {}", e);
    })?;

    // Step 1: アーティファクトダイジェストの生成（プロセス内で1回のみ）
    tracing::info!("サービス共通のアーティファクトハッシュを生成中...");
    let artifact_digest = ArtifactDigest::generate().inspect_err(|e| {
        tracing::error!("アーティファクトハッシュを生成できません: {}", e);
    })?;
    tracing::info!(
        artifact_hash = %artifact_digest.to_hex(),
        "アーティファクトハッシュを生成・キャッシュしました"
    );

    let state = Arc::new(HelperState::new(&config, artifact_digest)?);
    tracing::info!(
        tsa_url = %state.tsa_url,
        tsa_timeout_secs = config.tsa_timeout.as_secs(),
        "TSA転送先を設定"
    );

    let app = router(state);

    tracing::info!("crypto helperを {} で起動します", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// テスト
// ---------------------------------------------------------------------------
