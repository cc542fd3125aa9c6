//! # フォーム送信バリデーション
//!
//! フォーム種別のスキーマ（[`crate::schema`]）に従って送信内容を検証する。
//!
//! - 短絡しない: 失敗したフィールドはすべて報告する
//! - 1 フィールドにつきエラーは 1 件（未入力か制約違反のどちらか）
//! - 純粋関数: I/O もグローバル状態も持たない
//!
//! 金額・日付・列挙値など解釈できない値は常に「不正」として扱う。

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use validator::ValidateEmail;

use crate::{
    DomainError,
    form::{FieldValue, FormSubmission, FormType},
    schema::{FieldKind, FieldSpec, Requirement},
};

/// バリデーション結果
///
/// `is_valid` は保持せず、エラーマップが空かどうかから導出する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    errors: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// フィールド名 → エラーメッセージ
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn into_errors(self) -> BTreeMap<String, String> {
        self.errors
    }

    fn reject(&mut self, spec: &FieldSpec, message: &str) {
        self.errors
            .entry(spec.name.to_string())
            .or_insert_with(|| message.to_string());
    }
}

/// フォーム送信内容をバリデーションする
///
/// スキーマのフィールドを順に検証し、すべてのエラーを収集して返す。
/// スキーマにないフィールドは検証しない（通知にはそのまま載る）。
pub fn validate(submission: &FormSubmission) -> ValidationResult {
    let mut result = ValidationResult::default();

    for spec in submission.form_type.schema() {
        if let Some(message) = check_field(submission, spec) {
            result.reject(spec, message);
        }
    }

    result
}

/// 文字列のフォーム種別とフィールドマップを直接バリデーションする
///
/// # エラー
///
/// フォーム種別が未知の場合は検証失敗ではなく [`DomainError::UnknownFormType`] を返す。
pub fn validate_fields(
    form_type: &str,
    fields: &BTreeMap<String, FieldValue>,
) -> Result<ValidationResult, DomainError> {
    let form_type = FormType::parse(form_type)?;
    Ok(validate(&FormSubmission::new(form_type, fields.clone())))
}

/// 1 フィールドを検証し、失敗時はメッセージを返す
fn check_field(submission: &FormSubmission, spec: &FieldSpec) -> Option<&'static str> {
    let required = is_required(submission, spec.requirement);
    let Some(value) = submission.value(spec.name) else {
        return required.then_some(spec.required_message);
    };

    // 真偽値はテキスト・数値のどちらとしても受け付けない
    if matches!(value, FieldValue::Flag(_)) {
        return Some(if required {
            spec.required_message
        } else {
            spec.invalid_message
        });
    }

    (!satisfies(spec.kind, value)).then_some(spec.invalid_message)
}

fn is_required(submission: &FormSubmission, requirement: Requirement) -> bool {
    match requirement {
        Requirement::Required => true,
        Requirement::Optional => false,
        Requirement::RequiredWhen { field, equals } => {
            submission.text(field).as_deref() == Some(equals)
        }
    }
}

// --- 値の種類ごとのルール ---

fn satisfies(kind: FieldKind, value: &FieldValue) -> bool {
    match kind {
        FieldKind::Text { max_chars } => {
            value.as_text().is_some_and(|s| s.chars().count() <= max_chars)
        }
        FieldKind::Email => match value {
            FieldValue::Text(s) => s.trim().to_string().validate_email(),
            _ => false,
        },
        FieldKind::Phone => value.as_text().is_some_and(|s| is_phone_number(&s)),
        FieldKind::Amount => parse_amount(value).is_some_and(|amount| amount > 0.0),
        FieldKind::Currency => value
            .as_text()
            .is_some_and(|s| s.len() == 3 && s.chars().all(|c| c.is_ascii_alphabetic())),
        FieldKind::Date => match value {
            FieldValue::Text(s) => is_calendar_date(s.trim()),
            _ => false,
        },
        FieldKind::Choice(options) => match value {
            FieldValue::Text(s) => options.contains(&s.trim()),
            _ => false,
        },
        FieldKind::PositiveInteger => parse_positive_integer(value).is_some(),
        FieldKind::Percentage => {
            parse_percentage(value).is_some_and(|p| (0.0..=100.0).contains(&p))
        }
    }
}

/// `YYYY-MM-DD`（ゼロ埋め、符号なし）かつ実在する日付
fn is_calendar_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    shaped && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// 数字・空白・`+-()` のみで 7〜20 文字、かつ数字を含む
fn is_phone_number(s: &str) -> bool {
    let len = s.chars().count();
    (7..=20).contains(&len)
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
        && s.chars().any(|c| c.is_ascii_digit())
}

/// 金額を数値として解釈する
///
/// 文字列の場合は `,` を桁区切りとして除去する。
/// NaN・無限大は解釈不能として `None`。
pub fn parse_amount(value: &FieldValue) -> Option<f64> {
    let amount = match value {
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => s.trim().replace(',', "").parse::<f64>().ok()?,
        FieldValue::Flag(_) | FieldValue::Null => return None,
    };
    amount.is_finite().then_some(amount)
}

fn parse_positive_integer(value: &FieldValue) -> Option<u64> {
    let n = match value {
        // 小数部なし・1 以上を確認済み
        FieldValue::Number(n) if n.is_finite() && n.fract() == 0.0 && *n >= 1.0 => *n as u64,
        FieldValue::Text(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    (n > 0).then_some(n)
}

fn parse_percentage(value: &FieldValue) -> Option<f64> {
    let p = match value {
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        FieldValue::Flag(_) | FieldValue::Null => return None,
    };
    p.is_finite().then_some(p)
}
