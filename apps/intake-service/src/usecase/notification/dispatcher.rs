//! # 通知ディスパッチャ
//!
//! テンプレートレンダリング → 送信経路の解決 → メール送信を統合する。
//!
//! ## 設計方針
//!
//! - **エラーを返さない**: `dispatch()` はすべての失敗を [`DispatchResult::failed`] に変換する
//! - **失敗ログは 1 回**: 送信 1 回につき失敗は ERROR で 1 度だけ記録する
//! - **冪等性なし**: 同じ送信内容で 2 回呼べば 2 通送る
//! - **依存性注入**: 送信経路は [`TransportSlot`] として構築時に受け取る

use std::sync::Arc;

use tradecredit_domain::{
    form::FormSubmission,
    notification::{DispatchResult, DispatchStage, MessageId, NotificationError},
};
use tradecredit_infra::TransportSlot;
use tradecredit_shared::{
    event_log::{error as log_error, event},
    log_business_event,
};

use super::TemplateRenderer;

/// 通知ディスパッチャ
pub struct NotificationDispatcher {
    transport: Arc<TransportSlot>,
    renderer:  TemplateRenderer,
}

impl NotificationDispatcher {
    pub fn new(transport: Arc<TransportSlot>, renderer: TemplateRenderer) -> Self {
        Self {
            transport,
            renderer,
        }
    }

    /// 検証済みの送信内容を通知メールとして送る
    pub async fn dispatch(&self, submission: &FormSubmission) -> DispatchResult {
        let form_type: &'static str = submission.form_type.into();

        match self.try_dispatch(submission).await {
            Ok(message_id) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.entity_type = event::entity_type::NOTIFICATION,
                    event.entity_id = %message_id,
                    event.result = event::result::SUCCESS,
                    form_type,
                    "通知メール送信成功"
                );
                DispatchResult::delivered(message_id)
            }
            Err((stage, e)) => {
                let (category, kind) = classify(&e);
                tracing::error!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_FAILED,
                    event.result = event::result::FAILURE,
                    form_type,
                    dispatch.stage = %stage,
                    error.category = category,
                    error.kind = kind,
                    error = %e,
                    "通知メール送信失敗"
                );
                DispatchResult::from(e)
            }
        }
    }

    async fn try_dispatch(
        &self,
        submission: &FormSubmission,
    ) -> Result<MessageId, (DispatchStage, NotificationError)> {
        tracing::debug!(stage = %DispatchStage::Rendering, "通知メールを生成");
        let rendered = self
            .renderer
            .render(submission)
            .map_err(|e| (DispatchStage::Rendering, e))?;

        tracing::debug!(stage = %DispatchStage::Sending, "通知メールを送信");
        let transport = self
            .transport
            .resolve()
            .map_err(|e| (DispatchStage::Sending, e))?;

        let message = rendered.into_message(transport.recipient());
        transport
            .sender()
            .send_email(&message)
            .await
            .map_err(|e| (DispatchStage::Sending, e))
    }
}

/// ログ用のエラーカテゴリと種別
fn classify(error: &NotificationError) -> (&'static str, &'static str) {
    match error {
        NotificationError::TemplateNotFound(_) => {
            (log_error::category::TEMPLATE, log_error::kind::TEMPLATE_NOT_FOUND)
        }
        NotificationError::TemplateFailed(_) => {
            (log_error::category::TEMPLATE, log_error::kind::TEMPLATE_FAILED)
        }
        NotificationError::Configuration(_) => (
            log_error::category::CONFIGURATION,
            log_error::kind::TRANSPORT_NOT_CONFIGURED,
        ),
        NotificationError::InvalidAddress(_) => {
            (log_error::category::CONFIGURATION, log_error::kind::INVALID_ADDRESS)
        }
        NotificationError::SendFailed(_) => {
            (log_error::category::EXTERNAL_SERVICE, log_error::kind::SEND_FAILED)
        }
        NotificationError::Rejected(_) => {
            (log_error::category::EXTERNAL_SERVICE, log_error::kind::REJECTED)
        }
        NotificationError::Timeout(_) => {
            (log_error::category::EXTERNAL_SERVICE, log_error::kind::TIMEOUT)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeMap,
        fmt,
        sync::{
            Arc,
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use maplit::btreemap;
    use pretty_assertions::assert_eq;
    use tracing::{
        Event,
        Level,
        Subscriber,
        field::{Field, Visit},
    };
    use tracing_subscriber::{Layer, layer::Context, prelude::*};
    use tradecredit_domain::form::{FieldValue, FormType};
    use tradecredit_infra::{
        EmailSettings,
        Transport,
        mock::{FailingNotificationSender, MockNotificationSender},
    };

    use super::*;
    use crate::usecase::notification::template_renderer::TemplateSource;

    /// ERROR レベルのイベント数を数えるレイヤー
    #[derive(Clone, Default)]
    struct ErrorCounter(Arc<AtomicUsize>);

    impl ErrorCounter {
        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    impl<S: Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    /// イベントのフィールドをテキストとして蓄積するレイヤー
    #[derive(Clone, Default)]
    struct LogCapture(Arc<Mutex<String>>);

    impl LogCapture {
        fn text(&self) -> String {
            self.0.lock().unwrap().clone()
        }
    }

    struct FieldWriter<'a>(&'a mut String);

    impl Visit for FieldWriter<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.push_str(&format!(" {}={}", field.name(), value));
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.push_str(&format!(" {}={:?}", field.name(), value));
        }
    }

    impl<S: Subscriber> Layer<S> for LogCapture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut text = self.0.lock().unwrap();
            event.record(&mut FieldWriter(&mut text));
            text.push('\n');
        }
    }

    fn jane() -> FormSubmission {
        FormSubmission::new(
            FormType::Contact,
            btreemap! {
                "name".to_string() => FieldValue::from("Jane Doe"),
                "email".to_string() => FieldValue::from("jane@example.com"),
                "message".to_string() => FieldValue::from("Hello"),
            },
        )
    }

    fn production_without_host() -> EmailSettings {
        let env: BTreeMap<&str, &str> = btreemap! {
            "APP_ENV" => "production",
            "EMAIL_PORT" => "587",
            "EMAIL_USER" => "mailer",
            "EMAIL_PASS" => "secret",
            "EMAIL_FROM" => "no-reply@tradecreditbancorp.test",
        };
        EmailSettings::from_lookup(|key| env.get(key).map(|v| (*v).to_string()))
    }

    fn dispatcher_with(sender: Arc<dyn tradecredit_infra::NotificationSender>) -> NotificationDispatcher {
        let transport = Transport::new(sender, "leads@tradecreditbancorp.test").unwrap();
        NotificationDispatcher::new(
            Arc::new(TransportSlot::with_transport(transport)),
            TemplateRenderer::new().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_送信成功でメッセージidを返す() {
        let sender = MockNotificationSender::new();
        let dispatcher = dispatcher_with(Arc::new(sender.clone()));

        let result = dispatcher.dispatch(&jane()).await;

        assert!(result.is_success());
        assert_eq!(result.message_id().map(MessageId::as_str), Some("mock-1"));
        let sent = sender.sent_emails();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "leads@tradecreditbancorp.test");
        assert_eq!(sent[0].reply_to.as_deref(), Some("jane@example.com"));
        assert!(sent[0].body_text.contains("Jane Doe"));
    }

    #[tokio::test]
    async fn test_同じ送信内容を2回送ると2通届く() {
        let sender = MockNotificationSender::new();
        let dispatcher = dispatcher_with(Arc::new(sender.clone()));

        dispatcher.dispatch(&jane()).await;
        dispatcher.dispatch(&jane()).await;

        assert_eq!(sender.sent_emails().len(), 2);
    }

    #[tokio::test]
    async fn test_送信失敗はエラーメッセージ付きの失敗結果になる() {
        let sender = FailingNotificationSender::new(NotificationError::SendFailed(
            "421 service not available".to_string(),
        ));
        let dispatcher = dispatcher_with(Arc::new(sender.clone()));

        let result = dispatcher.dispatch(&jane()).await;

        assert!(!result.is_success());
        assert_eq!(result.message_id(), None);
        assert_eq!(
            result.error_message(),
            Some("failed to send email: 421 service not available")
        );
        assert_eq!(sender.attempts(), 1);
    }

    #[tokio::test]
    async fn test_タイムアウトは専用のメッセージになる() {
        let sender = FailingNotificationSender::new(NotificationError::Timeout(20));
        let dispatcher = dispatcher_with(Arc::new(sender));

        let result = dispatcher.dispatch(&jane()).await;

        assert_eq!(
            result.error_message(),
            Some("email transport timed out after 20 seconds")
        );
    }

    #[tokio::test]
    async fn test_テンプレート未登録なら送信しない() {
        let sender = MockNotificationSender::new();
        let transport =
            Transport::new(Arc::new(sender.clone()), "leads@tradecreditbancorp.test").unwrap();
        let renderer = TemplateRenderer::with_templates(vec![(
            FormType::LetterOfCreditApplication,
            TemplateSource {
                html: "<p>{{ name }}</p>",
                text: "{{ name }}",
            },
        )])
        .unwrap();
        let dispatcher =
            NotificationDispatcher::new(Arc::new(TransportSlot::with_transport(transport)), renderer);

        let result = dispatcher.dispatch(&jane()).await;

        assert!(!result.is_success());
        assert!(result.error_message().unwrap().contains("Contact"));
        assert_eq!(sender.attempts(), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_設定不備は失敗結果になりerrorログは1回だけ() {
        let counter = ErrorCounter::default();
        let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(counter.clone()));
        let dispatcher = NotificationDispatcher::new(
            Arc::new(TransportSlot::new(production_without_host())),
            TemplateRenderer::new().unwrap(),
        );

        let first = dispatcher.dispatch(&jane()).await;

        assert!(!first.is_success());
        let message = first.error_message().unwrap();
        assert!(message.contains("configuration"), "{message}");
        assert!(message.contains("EMAIL_HOST"), "{message}");
        assert_eq!(counter.count(), 1);

        // 2 回目の試行でも ERROR は 1 回だけ増える
        let second = dispatcher.dispatch(&jane()).await;

        assert_eq!(second, first);
        assert_eq!(counter.count(), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_開発モードでは送信内容をログに出力する() {
        let capture = LogCapture::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));
        let dispatcher = NotificationDispatcher::new(
            Arc::new(TransportSlot::new(EmailSettings::from_lookup(|_| None))),
            TemplateRenderer::new().unwrap(),
        );

        let result = dispatcher.dispatch(&jane()).await;

        assert!(result.is_success());
        let logs = capture.text();
        assert!(logs.contains("開発モード: メール送信をスキップ"), "{logs}");
        assert!(logs.contains("Name: Jane Doe"), "{logs}");
        assert!(logs.contains("jane@example.com"), "{logs}");
    }

    #[tokio::test]
    async fn test_開発モードでは100回送ってすべて成功する() {
        let dispatcher = NotificationDispatcher::new(
            Arc::new(TransportSlot::new(EmailSettings::from_lookup(|_| None))),
            TemplateRenderer::new().unwrap(),
        );

        for _ in 0..100 {
            let result = dispatcher.dispatch(&jane()).await;
            assert!(result.is_success());
            assert!(result.message_id().unwrap().as_str().starts_with("dev-"));
        }
    }
}
