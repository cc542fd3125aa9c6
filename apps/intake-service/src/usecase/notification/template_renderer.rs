//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで通知メールを HTML/plaintext 両形式で生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **自動エスケープ**: `.html` テンプレートは tera の autoescape で全値を HTML エスケープする。
//!   `safe` フィルタは使わない
//! - **件名パターン**: `[Trade Credit Bancorp] {フォーム表示名}: {送信者名}`
//! - **行の組み立て**: スキーマにあるフィールドはスキーマ順・表示ラベル付き、
//!   それ以外のフィールドは「Additional fields」にキー順で並べる

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use tera::{Context, Tera};
use tradecredit_domain::{
    form::{FormSubmission, FormType},
    notification::{NotificationError, NotificationMessage, is_valid_address},
};

const SUBJECT_PREFIX: &str = "[Trade Credit Bancorp]";

/// テンプレートの組（HTML + plaintext）
#[derive(Debug, Clone, Copy)]
pub struct TemplateSource {
    pub html: &'static str,
    pub text: &'static str,
}

/// 本文の 1 行（ラベル + 値）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub label: String,
    pub value: String,
}

/// 宛先が決まる前のレンダリング結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNotification {
    pub subject:   String,
    pub body_html: String,
    pub body_text: String,
    pub reply_to:  Option<String>,
}

impl RenderedNotification {
    /// 宛先を付けて送信可能なメッセージにする
    pub fn into_message(self, recipient: impl Into<String>) -> NotificationMessage {
        NotificationMessage {
            recipient: recipient.into(),
            subject:   self.subject,
            body_html: self.body_html,
            body_text: self.body_text,
            reply_to:  self.reply_to,
        }
    }
}

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、`FormSubmission` から通知メールを生成する。
pub struct TemplateRenderer {
    engine:     Tera,
    registered: HashMap<FormType, &'static str>,
}

impl TemplateRenderer {
    /// 全フォーム種別のテンプレートを登録したレンダラーを作成
    pub fn new() -> Result<Self, NotificationError> {
        Self::with_templates(vec![
            (
                FormType::Contact,
                TemplateSource {
                    html: include_str!("../../../templates/notifications/contact.html"),
                    text: include_str!("../../../templates/notifications/contact.txt"),
                },
            ),
            (
                FormType::LetterOfCreditApplication,
                TemplateSource {
                    html: include_str!(
                        "../../../templates/notifications/letter_of_credit_application.html"
                    ),
                    text: include_str!(
                        "../../../templates/notifications/letter_of_credit_application.txt"
                    ),
                },
            ),
            (
                FormType::StandbyLetterOfCreditApplication,
                TemplateSource {
                    html: include_str!(
                        "../../../templates/notifications/standby_letter_of_credit_application.html"
                    ),
                    text: include_str!(
                        "../../../templates/notifications/standby_letter_of_credit_application.txt"
                    ),
                },
            ),
        ])
    }

    /// 指定したテンプレートだけを登録したレンダラーを作成
    pub fn with_templates(
        templates: Vec<(FormType, TemplateSource)>,
    ) -> Result<Self, NotificationError> {
        let mut engine = Tera::default();
        let mut registered = HashMap::new();
        let mut raw = Vec::new();

        for (form_type, source) in templates {
            let name: &'static str = form_type.into();
            raw.push((format!("{name}.html"), source.html));
            raw.push((format!("{name}.txt"), source.text));
            registered.insert(form_type, name);
        }

        engine
            .add_raw_templates(raw)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine, registered })
    }

    /// フォーム送信内容から通知メールを生成する
    ///
    /// # エラー
    ///
    /// - テンプレート未登録: [`NotificationError::TemplateNotFound`]
    /// - レンダリング失敗: [`NotificationError::TemplateFailed`]
    pub fn render(
        &self,
        submission: &FormSubmission,
    ) -> Result<RenderedNotification, NotificationError> {
        let template_name = self
            .registered
            .get(&submission.form_type)
            .ok_or(NotificationError::TemplateNotFound(submission.form_type))?;

        let context = build_context(submission);

        let body_html = self
            .engine
            .render(&format!("{template_name}.html"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        let body_text = self
            .engine
            .render(&format!("{template_name}.txt"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(RenderedNotification {
            subject: subject_for(submission),
            body_html,
            body_text,
            reply_to: submission
                .text("email")
                .filter(|email| is_valid_address(email)),
        })
    }
}

/// 件名を組み立てる（改行などの制御文字は空白に畳む）
fn subject_for(submission: &FormSubmission) -> String {
    let name = submission
        .text("name")
        .map(|name| name.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_else(|| "(no name)".to_string());

    format!("{SUBJECT_PREFIX} {}: {name}", submission.form_type.label())
}

fn build_context(submission: &FormSubmission) -> Context {
    let schema = submission.form_type.schema();

    let rows: Vec<Row> = schema
        .iter()
        .filter_map(|spec| {
            submission.value(spec.name).map(|value| Row {
                label: spec.label.to_string(),
                value: value.to_string(),
            })
        })
        .collect();

    let extra_rows: Vec<Row> = submission
        .fields
        .iter()
        .filter(|(name, value)| {
            !value.is_blank() && !schema.iter().any(|spec| spec.name == name.as_str())
        })
        .map(|(name, value)| Row {
            label: name.clone(),
            value: value.to_string(),
        })
        .collect();

    let mut context = Context::new();
    context.insert("form_label", submission.form_type.label());
    context.insert("name", &submission.text("name").unwrap_or_default());
    context.insert("email", &submission.text("email").unwrap_or_default());
    context.insert("company", &submission.text("companyName").unwrap_or_default());
    context.insert("rows", &rows);
    context.insert("extra_rows", &extra_rows);
    context.insert(
        "submitted_at",
        &Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );
    context
}
