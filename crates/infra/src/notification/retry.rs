//! 再送デコレータ
//!
//! 任意の [`NotificationSender`] を包み、一時的な失敗（送信失敗・タイムアウト）だけを
//! 指数バックオフで再送する。設定不備・アドレス不正・恒久拒否は即座に返す。

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tradecredit_domain::notification::{MessageId, NotificationError, NotificationMessage};

use super::NotificationSender;

const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

/// 再送ポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 初回を含む最大試行回数（1 以上）
    pub max_attempts: u32,
    pub base_delay:   Duration,
    pub max_delay:    Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay:   DEFAULT_BASE_DELAY,
            max_delay:    DEFAULT_MAX_DELAY,
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// `attempt` 回目（0 始まり）の失敗後に待つ時間: `base * 2^attempt`、上限 `max_delay`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_delay
            .checked_mul(2u32.saturating_pow(attempt))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}

/// 再送付き通知送信
pub struct RetryingNotificationSender {
    inner:  Arc<dyn NotificationSender>,
    policy: RetryPolicy,
}

impl RetryingNotificationSender {
    pub fn new(inner: Arc<dyn NotificationSender>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl NotificationSender for RetryingNotificationSender {
    async fn send_email(&self, email: &NotificationMessage) -> Result<MessageId, NotificationError> {
        let mut attempt = 0;
        loop {
            match self.inner.send_email(email).await {
                Ok(message_id) => return Ok(message_id),
                Err(e) if e.is_transient() && attempt + 1 < self.policy.max_attempts => {
                    let delay = self.policy.backoff_delay(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "メール送信に失敗、再送します"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
