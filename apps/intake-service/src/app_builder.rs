//! # Intake Service アプリケーション構築
//!
//! State の初期化とルーター構築を担当する。
//! `main.rs` は設定読み込みとサーバー起動に集中する。

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tradecredit_infra::TransportSlot;
use tradecredit_shared::observability::{MakeRequestUuidV7, make_request_span};

use crate::{
    error::panic_response,
    handler::{ReadinessState, SubmissionState, fallback, health_check, readiness_check, submit_form},
    usecase::{NotificationDispatcher, SubmissionUseCase, TemplateRenderer},
};

/// 依存の組み立てとルーター定義を行う
///
/// 送信経路は [`TransportSlot`] として受け取り、Readiness Check と
/// ディスパッチャで共有する。
pub fn build_app(
    transport: Arc<TransportSlot>,
    renderer: TemplateRenderer,
    cors_allowed_origins: &[String],
) -> Router {
    let readiness_state = Arc::new(ReadinessState {
        transport: transport.clone(),
    });

    let submission_state = Arc::new(SubmissionState {
        usecase: SubmissionUseCase::new(NotificationDispatcher::new(transport, renderer)),
    });

    // レイヤー順序: 下に書いたものが外側
    // 1. SetRequestIdLayer（最外）: UUID v7 を生成（またはクライアント提供値を使用）
    // 2. TraceLayer: スパンに request_id を含める
    // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
    // 4. CatchPanicLayer（最内）: ハンドラのパニックを 500 Problem Details に変換
    let router = Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .merge(
            Router::new()
                .route("/api/submissions", post(submit_form))
                .with_state(submission_state),
        )
        .fallback(fallback)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));

    match cors_layer(cors_allowed_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// 許可オリジンから CORS レイヤーを作る
///
/// 有効なオリジンが 1 つもなければ `None`（同一オリジンのみ）。
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin, error = %e, "CORS の許可オリジンを無視します");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    )
}
