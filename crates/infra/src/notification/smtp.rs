//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! 本番モードで使用する。接続情報は [`SmtpSettings`] で受け取る。

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Mailbox, Message, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use tradecredit_domain::notification::{MessageId, NotificationError, NotificationMessage};
use uuid::Uuid;

use super::NotificationSender;

/// SMTP 接続設定
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// SMTP サーバーのホスト名
    pub host:     String,
    pub port:     u16,
    /// `true` なら接続時から TLS（SMTPS）、`false` なら STARTTLS を試みる
    pub secure:   bool,
    pub username: String,
    pub password: String,
    /// 送信元メールアドレス
    pub from:     String,
    /// 1 通あたりの送信タイムアウト
    pub timeout:  Duration,
}

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
pub struct SmtpNotificationSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from:      Mailbox,
    timeout:   Duration,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// 接続はまだ張らない（最初の送信時に接続する）。
    ///
    /// # エラー
    ///
    /// - 送信元アドレスが不正: [`NotificationError::InvalidAddress`]
    /// - TLS パラメータが構築できない: [`NotificationError::Configuration`]
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotificationError> {
        let from: Mailbox = settings.from.parse().map_err(|e| {
            NotificationError::InvalidAddress(format!("EMAIL_FROM {:?}: {e}", settings.from))
        })?;

        let builder = if settings.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
                .map_err(|e| NotificationError::Configuration(format!("TLS setup failed: {e}")))?
        } else {
            let tls = TlsParameters::new(settings.host.clone())
                .map_err(|e| NotificationError::Configuration(format!("TLS setup failed: {e}")))?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
                .tls(Tls::Opportunistic(tls))
        };

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(settings.timeout))
            .build();

        Ok(Self {
            transport,
            from,
            timeout: settings.timeout,
        })
    }

    /// 送信元ドメインで Message-ID を生成する
    fn next_message_id(&self) -> String {
        format!("<{}@{}>", Uuid::now_v7(), self.from.email.domain())
    }

    fn build_message(
        &self,
        email: &NotificationMessage,
        message_id: &str,
    ) -> Result<Message, NotificationError> {
        let to: Mailbox = email
            .recipient
            .parse()
            .map_err(|e| NotificationError::InvalidAddress(format!("recipient: {e}")))?;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .message_id(Some(message_id.to_string()))
            .subject(&email.subject);

        // 返信先が壊れていても通知自体は送る
        if let Some(reply_to) = &email.reply_to {
            match reply_to.parse::<Mailbox>() {
                Ok(mailbox) => builder = builder.reply_to(mailbox),
                Err(e) => tracing::warn!(error = %e, "reply-to を解釈できないため省略"),
            }
        }

        builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.body_text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.body_html.clone()),
                    ),
            )
            .map_err(|e| NotificationError::TemplateFailed(format!("message build failed: {e}")))
    }
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_email(&self, email: &NotificationMessage) -> Result<MessageId, NotificationError> {
        let message_id = self.next_message_id();
        let message = self.build_message(email, &message_id)?;

        match tokio::time::timeout(self.timeout, self.transport.send(message)).await {
            Ok(Ok(_response)) => Ok(MessageId::new(message_id)),
            Ok(Err(e)) if e.is_timeout() => Err(NotificationError::Timeout(self.timeout.as_secs())),
            Ok(Err(e)) if e.is_permanent() => Err(NotificationError::Rejected(e.to_string())),
            Ok(Err(e)) => Err(NotificationError::SendFailed(e.to_string())),
            Err(_elapsed) => Err(NotificationError::Timeout(self.timeout.as_secs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SmtpSettings {
        SmtpSettings {
            host:     "smtp.tradecreditbancorp.test".to_string(),
            port:     587,
            secure:   false,
            username: "mailer".to_string(),
            password: "secret".to_string(),
            from:     "Trade Credit Bancorp <no-reply@tradecreditbancorp.test>".to_string(),
            timeout:  Duration::from_secs(20),
        }
    }

    fn message() -> NotificationMessage {
        NotificationMessage {
            recipient: "leads@tradecreditbancorp.test".to_string(),
            subject:   "[Trade Credit Bancorp] Contact Request: Jane Doe".to_string(),
            body_html: "<p>Hello</p>".to_string(),
            body_text: "Hello".to_string(),
            reply_to:  Some("jane@example.com".to_string()),
        }
    }

    #[test]
    fn test_トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SmtpNotificationSender>();
    }

    #[tokio::test]
    async fn test_正しい設定から送信インスタンスを作成できる() {
        assert!(SmtpNotificationSender::new(&settings()).is_ok());
        assert!(
            SmtpNotificationSender::new(&SmtpSettings {
                secure: true,
                port: 465,
                ..settings()
            })
            .is_ok()
        );
    }

    #[test]
    fn test_送信元アドレスが不正ならエラー() {
        let result = SmtpNotificationSender::new(&SmtpSettings {
            from: "not an address".to_string(),
            ..settings()
        });

        assert!(matches!(result, Err(NotificationError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_message_idは送信元ドメインを持つ() {
        let sender = SmtpNotificationSender::new(&settings()).unwrap();

        let id = sender.next_message_id();

        assert!(id.starts_with('<'), "{id}");
        assert!(id.ends_with("@tradecreditbancorp.test>"), "{id}");
    }

    #[tokio::test]
    async fn test_宛先が不正ならメッセージを構築しない() {
        let sender = SmtpNotificationSender::new(&settings()).unwrap();
        let email = NotificationMessage {
            recipient: "nobody".to_string(),
            ..message()
        };

        let result = sender.build_message(&email, "<id@tradecreditbancorp.test>");

        assert!(matches!(result, Err(NotificationError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_返信先が不正でもメッセージは構築できる() {
        let sender = SmtpNotificationSender::new(&settings()).unwrap();
        let email = NotificationMessage {
            reply_to: Some("???".to_string()),
            ..message()
        };

        assert!(sender.build_message(&email, "<id@tradecreditbancorp.test>").is_ok());
    }
}
