//! # 通知
//!
//! フォーム送信の通知メールに関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`NotificationMessage`] | 通知メッセージ | テンプレートレンダリングの出力 |
//! | [`MessageId`] | メッセージ ID | 送信経路が払い出す識別子 |
//! | [`DispatchResult`] | 送信結果 | 成功ならメッセージ ID、失敗ならエラーメッセージ |
//! | [`DispatchStage`] | 送信段階 | `Rendering → Sending → Delivered / Failed` |
//!
//! ## 設計方針
//!
//! - **送信結果は値**: ディスパッチャはエラーを返さず、すべての失敗を [`DispatchResult`] に変換する
//! - **不変条件の構築時保証**: [`DispatchResult`] のフィールドは非公開で、
//!   成功時は ID のみ、失敗時はメッセージのみを持つ

use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;
use validator::ValidateEmail;

use crate::form::FormType;

/// 通知送信エラー
///
/// メッセージは送信結果の `errorMessage` としてログ・レスポンスに載るため英語で定義する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// フォーム種別に対応するテンプレートが登録されていない
    #[error("no notification template registered for form type {0}")]
    TemplateNotFound(FormType),

    /// テンプレートレンダリングに失敗
    #[error("failed to render notification template: {0}")]
    TemplateFailed(String),

    /// 送信経路の設定不備（環境変数の欠落など）
    #[error("email transport configuration error: {0}")]
    Configuration(String),

    /// 宛先・差出人アドレスが不正
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// メール送信に失敗
    #[error("failed to send email: {0}")]
    SendFailed(String),

    /// メールサーバーが恒久的に拒否（5xx 応答）
    #[error("email rejected by the mail server: {0}")]
    Rejected(String),

    /// 送信がタイムアウト
    #[error("email transport timed out after {0} seconds")]
    Timeout(u64),
}

impl NotificationError {
    /// 再送で回復し得るエラーかどうか
    ///
    /// 設定不備・テンプレート不備・アドレス不正は何度送っても失敗する。
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::SendFailed(_) | Self::Timeout(_))
    }
}

/// メッセージ ID
///
/// SMTP では `Message-ID` ヘッダの値、開発モードでは `dev-` 始まりの合成値。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 通知メッセージ
///
/// テンプレートレンダリングの出力。`NotificationSender` に渡される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    /// 送信先メールアドレス
    pub recipient: String,
    /// 件名
    pub subject:   String,
    /// HTML 本文
    pub body_html: String,
    /// プレーンテキスト本文
    pub body_text: String,
    /// 返信先（フォーム送信者のメールアドレス）
    pub reply_to:  Option<String>,
}

/// メールアドレスとして妥当な形式か
pub fn is_valid_address(address: &str) -> bool {
    let trimmed = address.trim().to_string();
    !trimmed.is_empty() && trimmed.validate_email()
}

/// 送信段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DispatchStage {
    Rendering,
    Sending,
    Delivered,
    Failed,
}

/// 送信結果
///
/// JSON では `{"success": true, "messageId": "..."}` または
/// `{"success": false, "errorMessage": "..."}` となる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    success:       bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_id:    Option<MessageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
}

impl DispatchResult {
    /// 送信成功
    pub fn delivered(message_id: MessageId) -> Self {
        Self {
            success:       true,
            message_id:    Some(message_id),
            error_message: None,
        }
    }

    /// 送信失敗
    pub fn failed(error_message: impl Into<String>) -> Self {
        Self {
            success:       false,
            message_id:    None,
            error_message: Some(error_message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message_id(&self) -> Option<&MessageId> {
        self.message_id.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// 結果に対応する終端段階
    pub fn stage(&self) -> DispatchStage {
        if self.success {
            DispatchStage::Delivered
        } else {
            DispatchStage::Failed
        }
    }
}

impl From<NotificationError> for DispatchResult {
    fn from(error: NotificationError) -> Self {
        Self::failed(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_成功結果はメッセージidだけを持つ() {
        let result = DispatchResult::delivered(MessageId::new("<abc@example.com>"));

        assert!(result.is_success());
        assert_eq!(result.message_id().map(MessageId::as_str), Some("<abc@example.com>"));
        assert_eq!(result.error_message(), None);
        assert_eq!(result.stage(), DispatchStage::Delivered);
    }

    #[test]
    fn test_失敗結果はエラーメッセージだけを持つ() {
        let result = DispatchResult::failed("boom");

        assert!(!result.is_success());
        assert_eq!(result.message_id(), None);
        assert_eq!(result.error_message(), Some("boom"));
        assert_eq!(result.stage(), DispatchStage::Failed);
    }

    #[test]
    fn test_送信結果はcamel_caseでシリアライズされる() {
        let delivered = serde_json::to_value(DispatchResult::delivered(MessageId::new("m-1"))).unwrap();
        let failed = serde_json::to_value(DispatchResult::failed("boom")).unwrap();

        assert_eq!(delivered, json!({"success": true, "messageId": "m-1"}));
        assert_eq!(failed, json!({"success": false, "errorMessage": "boom"}));
    }

    #[test]
    fn test_設定エラーのメッセージはconfigurationを含む() {
        let result = DispatchResult::from(NotificationError::Configuration(
            "EMAIL_HOST is not set".to_string(),
        ));

        let message = result.error_message().unwrap();
        assert!(message.contains("configuration"), "{message}");
        assert!(message.contains("EMAIL_HOST"), "{message}");
    }

    #[rstest]
    #[case(NotificationError::SendFailed("421".to_string()), true)]
    #[case(NotificationError::Timeout(20), true)]
    #[case(NotificationError::Rejected("550".to_string()), false)]
    #[case(NotificationError::Configuration("x".to_string()), false)]
    #[case(NotificationError::InvalidAddress("x".to_string()), false)]
    #[case(NotificationError::TemplateNotFound(FormType::Contact), false)]
    #[case(NotificationError::TemplateFailed("x".to_string()), false)]
    fn test_再送対象は送信失敗とタイムアウトのみ(
        #[case] error: NotificationError,
        #[case] expected: bool,
    ) {
        assert_eq!(error.is_transient(), expected);
    }

    #[rstest]
    #[case("leads@tradecreditbancorp.com", true)]
    #[case("  leads@tradecreditbancorp.com  ", true)]
    #[case("", false)]
    #[case("   ", false)]
    #[case("leads", false)]
    fn test_アドレス形式の判定(#[case] address: &str, #[case] expected: bool) {
        assert_eq!(is_valid_address(address), expected);
    }

    #[test]
    fn test_送信段階はスネークケースで表示する() {
        assert_eq!(DispatchStage::Rendering.to_string(), "rendering");
        assert_eq!(DispatchStage::Delivered.to_string(), "delivered");
    }
}
