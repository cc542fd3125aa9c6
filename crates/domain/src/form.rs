//! # フォーム送信
//!
//! Web サイトのフォームから送信された 1 件分の入力を表現する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`FormType`] | フォーム種別 | 検証ルールとテンプレートを決める判別子 |
//! | [`FieldValue`] | フィールド値 | 文字列・真偽値・数値のいずれか |
//! | [`FormSubmission`] | フォーム送信 | フォーム種別 + フィールド名→値のマップ |
//!
//! 送信内容は 1 回の「検証 → 通知」の間だけ存在し、永続化しない。

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::DomainError;

/// フォーム種別
///
/// ワイヤ上の表記（`"Contact"` など）は PascalCase のバリアント名そのまま。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum FormType {
    /// 問い合わせフォーム
    Contact,
    /// 信用状（L/C）申込フォーム
    LetterOfCreditApplication,
    /// スタンドバイ信用状（SBLC）申込フォーム
    StandbyLetterOfCreditApplication,
}

impl FormType {
    /// 通知メールの件名などに使う表示名
    pub fn label(&self) -> &'static str {
        match self {
            Self::Contact => "Contact Request",
            Self::LetterOfCreditApplication => "Letter of Credit Application",
            Self::StandbyLetterOfCreditApplication => "Standby Letter of Credit Application",
        }
    }

    /// 文字列からフォーム種別を解決する
    ///
    /// # エラー
    ///
    /// 未知の値は [`DomainError::UnknownFormType`] を返す。
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        Self::from_str(value.trim()).map_err(|_| DomainError::UnknownFormType(value.to_string()))
    }
}

/// フィールド値
///
/// JSON の文字列・真偽値・数値・null をそのまま受け取る。
/// `null` と空白のみの文字列は「未入力」として扱う。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Number(f64),
    Null,
}

impl FieldValue {
    /// 未入力かどうか
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Null => true,
            Self::Flag(_) | Self::Number(_) => false,
        }
    }

    /// テキストとして解釈した値（前後の空白を除去）
    ///
    /// 数値は文字列表現に変換する。真偽値と未入力は `None`。
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Self::Number(n) => Some(n.to_string()),
            Self::Flag(_) | Self::Null => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s.trim()),
            Self::Flag(true) => write!(f, "Yes"),
            Self::Flag(false) => write!(f, "No"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Null => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// フォーム送信内容
///
/// フィールドのキーは一意で、順序に意味はない（`BTreeMap` で保持し、
/// 検証結果やログの出力順を決定的にする）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    pub form_type: FormType,
    pub fields:    BTreeMap<String, FieldValue>,
}

impl FormSubmission {
    pub fn new(form_type: FormType, fields: BTreeMap<String, FieldValue>) -> Self {
        Self { form_type, fields }
    }

    /// 文字列のフォーム種別から送信内容を作成する
    ///
    /// # エラー
    ///
    /// フォーム種別が未知の場合は [`DomainError::UnknownFormType`] を返す。
    pub fn parse(
        form_type: &str,
        fields: BTreeMap<String, FieldValue>,
    ) -> Result<Self, DomainError> {
        Ok(Self::new(FormType::parse(form_type)?, fields))
    }

    /// 入力済みのフィールド値を取得する（未入力は `None`）
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name).filter(|v| !v.is_blank())
    }

    /// フィールドをテキストとして取得する
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).and_then(FieldValue::as_text)
    }
}
