//! # フォーム送信受付ユースケース
//!
//! 検証 → 通知の順に処理し、結果を [`SubmissionOutcome`] で返す。
//! 検証に失敗した送信は通知しない。

use std::collections::BTreeMap;

use tradecredit_domain::{
    form::FormSubmission,
    notification::MessageId,
    validation::validate,
};
use tradecredit_shared::{event_log::event, log_business_event};

use super::NotificationDispatcher;

/// フォーム送信の処理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// 検証を通過し、通知を送信した
    Accepted(MessageId),
    /// 検証エラー（フィールド名 → メッセージ）
    Rejected(BTreeMap<String, String>),
    /// 検証は通過したが通知の送信に失敗した（詳細はログのみ）
    Failed(String),
}

/// フォーム送信受付ユースケース
pub struct SubmissionUseCase {
    dispatcher: NotificationDispatcher,
}

impl SubmissionUseCase {
    pub fn new(dispatcher: NotificationDispatcher) -> Self {
        Self { dispatcher }
    }

    pub async fn submit(&self, submission: &FormSubmission) -> SubmissionOutcome {
        let form_type: &'static str = submission.form_type.into();

        let validation = validate(submission);
        if !validation.is_valid() {
            let errors = validation.into_errors();
            let invalid_fields: Vec<&str> = errors.keys().map(String::as_str).collect();
            log_business_event!(
                event.category = event::category::SUBMISSION,
                event.action = event::action::SUBMISSION_REJECTED,
                event.entity_type = event::entity_type::FORM_SUBMISSION,
                event.result = event::result::FAILURE,
                form_type,
                invalid_fields = ?invalid_fields,
                "フォーム送信を検証エラーで却下"
            );
            return SubmissionOutcome::Rejected(errors);
        }

        let result = self.dispatcher.dispatch(submission).await;
        match (result.message_id(), result.error_message()) {
            (Some(message_id), _) => {
                log_business_event!(
                    event.category = event::category::SUBMISSION,
                    event.action = event::action::SUBMISSION_ACCEPTED,
                    event.entity_type = event::entity_type::FORM_SUBMISSION,
                    event.result = event::result::SUCCESS,
                    form_type,
                    "フォーム送信を受け付けました"
                );
                SubmissionOutcome::Accepted(message_id.clone())
            }
            (None, message) => {
                SubmissionOutcome::Failed(message.unwrap_or_default().to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use maplit::btreemap;
    use pretty_assertions::assert_eq;
    use tradecredit_domain::{
        form::{FieldValue, FormType},
        notification::NotificationError,
    };
    use tradecredit_infra::{
        Transport,
        TransportSlot,
        mock::{FailingNotificationSender, MockNotificationSender},
    };

    use super::*;
    use crate::usecase::TemplateRenderer;

    fn usecase_with(sender: Arc<dyn tradecredit_infra::NotificationSender>) -> SubmissionUseCase {
        let transport = Transport::new(sender, "leads@tradecreditbancorp.test").unwrap();
        SubmissionUseCase::new(NotificationDispatcher::new(
            Arc::new(TransportSlot::with_transport(transport)),
            TemplateRenderer::new().unwrap(),
        ))
    }

    fn contact(email: &str) -> FormSubmission {
        FormSubmission::new(
            FormType::Contact,
            btreemap! {
                "name".to_string() => FieldValue::from("X"),
                "email".to_string() => FieldValue::from(email),
                "message".to_string() => FieldValue::from("hi"),
            },
        )
    }

    #[tokio::test]
    async fn test_有効な送信は通知して受け付ける() {
        let sender = MockNotificationSender::new();
        let usecase = usecase_with(Arc::new(sender.clone()));

        let outcome = usecase.submit(&contact("x@example.com")).await;

        assert_eq!(outcome, SubmissionOutcome::Accepted(MessageId::new("mock-1")));
        assert_eq!(sender.sent_emails().len(), 1);
    }

    #[tokio::test]
    async fn test_検証エラーなら通知しない() {
        let sender = MockNotificationSender::new();
        let usecase = usecase_with(Arc::new(sender.clone()));

        let outcome = usecase.submit(&contact("not-an-email")).await;

        assert_eq!(
            outcome,
            SubmissionOutcome::Rejected(btreemap! {
                "email".to_string() => "Please enter a valid email address".to_string(),
            })
        );
        assert_eq!(sender.attempts(), 0);
    }

    #[tokio::test]
    async fn test_送信失敗は失敗結果になる() {
        let usecase = usecase_with(Arc::new(FailingNotificationSender::new(
            NotificationError::SendFailed("connection refused".to_string()),
        )));

        let outcome = usecase.submit(&contact("x@example.com")).await;

        assert_eq!(
            outcome,
            SubmissionOutcome::Failed("failed to send email: connection refused".to_string())
        );
    }
}
