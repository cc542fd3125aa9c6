//! # 通知送信
//!
//! メール通知の送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **2 つの実装**: SMTP（本番）、コンソール（開発）
//! - **再送はデコレータ**: `RetryingNotificationSender` で任意の実装を包む。既定は 1 回送信のみ
//! - **実行モード切替**: `APP_ENV` で実装を選択（[`crate::transport`]）

mod console;
mod retry;
mod smtp;

use async_trait::async_trait;
pub use console::ConsoleNotificationSender;
pub use retry::{RetryPolicy, RetryingNotificationSender};
pub use smtp::{SmtpNotificationSender, SmtpSettings};
use tradecredit_domain::notification::{MessageId, NotificationError, NotificationMessage};

/// メール送信トレイト
///
/// 通知基盤の中核。メール送信の具体的な方法を抽象化する。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信し、送信経路が払い出したメッセージ ID を返す
    async fn send_email(&self, email: &NotificationMessage) -> Result<MessageId, NotificationError>;
}
