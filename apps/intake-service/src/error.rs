//! # Intake Service エラー定義
//!
//! Intake Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! フォームの業務結果（検証エラー・送信失敗）はエラーではなく 200 の
//! `{"ok": false, ...}` で返す。ここで扱うのはペイロード自体を受け付けられない場合と
//! 予期しない内部エラーのみ。

use std::any::Any;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tradecredit_domain::DomainError;
use tradecredit_shared::{ErrorResponse, event_log::error as log_error};

/// Intake Service で発生するエラー
#[derive(Debug, Error)]
pub enum IntakeError {
    /// ペイロードを解釈できない
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// 未知のフォーム種別
    #[error("未知のフォーム種別: {0}")]
    UnknownFormType(String),

    /// ルートが存在しない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl From<DomainError> for IntakeError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::UnknownFormType(form_type) => Self::UnknownFormType(form_type),
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let body = match &self {
            IntakeError::BadRequest(msg) => ErrorResponse::bad_request(msg.clone()),
            IntakeError::UnknownFormType(form_type) => {
                ErrorResponse::unknown_form_type(format!("Unknown form type: {form_type}"))
            }
            IntakeError::NotFound(path) => ErrorResponse::not_found(format!("No route for {path}")),
            IntakeError::Internal(msg) => {
                tracing::error!(
                    error.kind = log_error::kind::INTERNAL,
                    error = %msg,
                    "内部エラー"
                );
                ErrorResponse::internal_error()
            }
        };

        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}

/// ハンドラ内のパニックを 500 レスポンスに変換する（`CatchPanicLayer` 用）
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    IntakeError::Internal(detail).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use pretty_assertions::assert_eq;

    use super::*;

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_未知のフォーム種別は400() {
        let response = IntakeError::from(DomainError::UnknownFormType("Newsletter".to_string()))
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert_eq!(body.title, "Unknown Form Type");
        assert_eq!(body.detail, "Unknown form type: Newsletter");
    }

    #[tokio::test]
    async fn test_内部エラーは詳細を返さない() {
        let response = IntakeError::Internal("template engine panicked".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body.detail, "An internal error occurred");
    }

    #[tokio::test]
    async fn test_パニックは詳細を隠した500になる() {
        let response = panic_response(Box::new("index out of bounds"));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body.title, "Internal Server Error");
        assert_eq!(body.detail, "An internal error occurred");
    }
}
