//! # テスト用モック送信
//!
//! ユースケーステストや HTTP テストで使用するインメモリの通知送信実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! tradecredit-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tradecredit_domain::notification::{MessageId, NotificationError, NotificationMessage};

use crate::notification::NotificationSender;

// ===== MockNotificationSender =====

/// 送信内容を記録するモック
///
/// `fail_next` で積んだエラーを先に返し、尽きたら成功する。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent:     Arc<Mutex<Vec<NotificationMessage>>>,
    failures: Arc<Mutex<VecDeque<NotificationError>>>,
    attempts: Arc<Mutex<usize>>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次の送信で返すエラーを積む
    pub fn fail_next(&self, error: NotificationError) {
        self.failures.lock().unwrap().push_back(error);
    }

    /// 送信に成功したメール
    pub fn sent_emails(&self) -> Vec<NotificationMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// 成功・失敗を問わない送信試行回数
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &NotificationMessage) -> Result<MessageId, NotificationError> {
        *self.attempts.lock().unwrap() += 1;

        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(email.clone());
        Ok(MessageId::new(format!("mock-{}", sent.len())))
    }
}

// ===== FailingNotificationSender =====

/// 常に同じエラーを返すモック
#[derive(Clone)]
pub struct FailingNotificationSender {
    error:    NotificationError,
    attempts: Arc<Mutex<usize>>,
}

impl FailingNotificationSender {
    pub fn new(error: NotificationError) -> Self {
        Self {
            error,
            attempts: Arc::new(Mutex::new(0)),
        }
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl NotificationSender for FailingNotificationSender {
    async fn send_email(&self, _email: &NotificationMessage) -> Result<MessageId, NotificationError> {
        *self.attempts.lock().unwrap() += 1;
        Err(self.error.clone())
    }
}
