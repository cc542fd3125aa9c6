//! # フォーム送信ハンドラ
//!
//! Web サイトのフォーム送信を受け付けるエンドポイント。
//!
//! ## エンドポイント
//!
//! ```text
//! POST /api/submissions
//! ```
//!
//! JSON（`{"formType": "...", "fields": {...}}`）と
//! フォームエンコード（`formType=...&name=...`）の両方を受け付ける。
//!
//! ## レスポンス
//!
//! | 状況 | ステータス | ボディ |
//! |------|-----------|--------|
//! | 送信完了 | 200 | `{"ok": true}` |
//! | 検証エラー | 200 | `{"ok": false, "errors": {"email": "..."}}` |
//! | 通知の送信失敗 | 200 | `{"ok": false, "error": "Submission failed, please try again"}` |
//! | ペイロード不正・未知のフォーム種別 | 400 | Problem Details |

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Form,
    Json,
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{Uri, header},
};
use serde::{Deserialize, Serialize};
use tradecredit_domain::form::{FieldValue, FormSubmission};

use crate::{
    error::IntakeError,
    usecase::{SubmissionOutcome, SubmissionUseCase},
};

/// 送信失敗時にエンドユーザーへ返す文言（詳細はログのみ）
pub const GENERIC_FAILURE_MESSAGE: &str = "Submission failed, please try again";

/// フォーム送信ハンドラの State
pub struct SubmissionState {
    pub usecase: SubmissionUseCase,
}

/// フォーム送信ペイロード
///
/// フォーム種別は文字列のまま受け取り、解決はハンドラで行う
/// （未知の種別をペイロード不正と区別するため）。
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPayload {
    pub form_type: String,
    pub fields:    BTreeMap<String, FieldValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonPayload {
    form_type: String,
    #[serde(default)]
    fields:    BTreeMap<String, FieldValue>,
}

impl<S> FromRequest<S> for SubmissionPayload
where
    S: Send + Sync,
{
    type Rejection = IntakeError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(|e| IntakeError::BadRequest(e.body_text()))?;
            let payload: JsonPayload = serde_json::from_slice(&bytes)
                .map_err(|e| IntakeError::BadRequest(format!("Malformed JSON payload: {e}")))?;

            Ok(Self {
                form_type: payload.form_type,
                fields:    payload.fields,
            })
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(mut fields) = Form::<BTreeMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| IntakeError::BadRequest(e.body_text()))?;
            let form_type = fields
                .remove("formType")
                .ok_or_else(|| IntakeError::BadRequest("formType is required".to_string()))?;

            Ok(Self {
                form_type,
                fields: fields
                    .into_iter()
                    .map(|(name, value)| (name, FieldValue::Text(value)))
                    .collect(),
            })
        } else {
            Err(IntakeError::BadRequest(
                "Content-Type must be application/json or application/x-www-form-urlencoded"
                    .to_string(),
            ))
        }
    }
}

/// フォーム送信レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub ok:     bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error:  Option<String>,
}

impl SubmissionResponse {
    pub fn accepted() -> Self {
        Self {
            ok:     true,
            errors: None,
            error:  None,
        }
    }

    pub fn rejected(errors: BTreeMap<String, String>) -> Self {
        Self {
            ok:     false,
            errors: Some(errors),
            error:  None,
        }
    }

    pub fn failed() -> Self {
        Self {
            ok:     false,
            errors: None,
            error:  Some(GENERIC_FAILURE_MESSAGE.to_string()),
        }
    }
}

impl From<SubmissionOutcome> for SubmissionResponse {
    fn from(outcome: SubmissionOutcome) -> Self {
        match outcome {
            SubmissionOutcome::Accepted(_) => Self::accepted(),
            SubmissionOutcome::Rejected(errors) => Self::rejected(errors),
            SubmissionOutcome::Failed(_) => Self::failed(),
        }
    }
}

/// フォーム送信エンドポイント
///
/// ## エラー
///
/// - ペイロード不正: 400（抽出時）
/// - 未知のフォーム種別: 400
#[tracing::instrument(skip_all, fields(form_type = %payload.form_type))]
pub async fn submit_form(
    State(state): State<Arc<SubmissionState>>,
    payload: SubmissionPayload,
) -> Result<Json<SubmissionResponse>, IntakeError> {
    let submission = FormSubmission::parse(&payload.form_type, payload.fields)?;

    let outcome = state.usecase.submit(&submission).await;

    Ok(Json(SubmissionResponse::from(outcome)))
}

/// 未定義ルート
pub async fn fallback(uri: Uri) -> IntakeError {
    IntakeError::NotFound(uri.path().to_string())
}
