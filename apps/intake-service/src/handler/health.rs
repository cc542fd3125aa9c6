//! # ヘルスチェックハンドラ
//!
//! Intake Service の稼働状態を確認するためのエンドポイント。
//!
//! - `/health` — Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready` — Readiness Check（メール送信経路を解決できるかを確認）
//!
//! レスポンス型は [`tradecredit_shared::HealthResponse`] / [`tradecredit_shared::ReadinessResponse`] を参照。

use std::{collections::BTreeMap, sync::Arc};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tradecredit_infra::TransportSlot;
use tradecredit_shared::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};

/// ヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness Check 用の State
pub struct ReadinessState {
    pub transport: Arc<TransportSlot>,
}

/// Readiness Check エンドポイント
///
/// 送信経路が未解決ならここで解決する（結果はキャッシュされる）。
/// `Ready` → 200、`Misconfigured` → 503。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let mail_transport = match state.transport.resolve() {
        Ok(_) => CheckStatus::Ok,
        Err(e) => {
            tracing::warn!(
                error = %e,
                state = %state.transport.state(),
                "Readiness Check: メール送信経路が利用できません"
            );
            CheckStatus::Error
        }
    };

    let mut checks = BTreeMap::new();
    checks.insert("mail_transport".to_string(), mail_transport);

    let response = ReadinessResponse::from_checks(checks);
    let http_status = match response.status {
        ReadinessStatus::Ready => StatusCode::OK,
        ReadinessStatus::NotReady => StatusCode::SERVICE_UNAVAILABLE,
    };

    (http_status, Json(response))
}
