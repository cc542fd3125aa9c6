//! コンソール通知送信実装
//!
//! メールを実際に送信せず、内容をログに出力する。
//! 開発モード（`APP_ENV=development`）で使用する。

use async_trait::async_trait;
use tradecredit_domain::notification::{MessageId, NotificationError, NotificationMessage};
use uuid::Uuid;

use super::NotificationSender;

/// コンソール通知送信（ログ出力のみ）
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotificationSender;

impl ConsoleNotificationSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSender for ConsoleNotificationSender {
    async fn send_email(&self, email: &NotificationMessage) -> Result<MessageId, NotificationError> {
        let message_id = MessageId::new(format!("dev-{}", Uuid::new_v4()));

        tracing::info!(
            message_id = %message_id,
            to = %email.recipient,
            reply_to = email.reply_to.as_deref().unwrap_or("-"),
            subject = %email.subject,
            "開発モード: メール送信をスキップ\n{}",
            email.body_text
        );

        Ok(message_id)
    }
}
