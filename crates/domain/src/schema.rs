//! # フォームスキーマ
//!
//! フォーム種別ごとのフィールド定義（必須条件・値の種類・エラーメッセージ・表示ラベル）。
//!
//! スキーマは静的に定義し、[`FormType::schema`] で引く。
//! バリデーション（[`crate::validation`]）と通知テンプレートの行組み立ての両方がこの定義を参照する。
//!
//! エラーメッセージはフォーム画面にそのまま表示されるため英語で定義する。

use crate::form::FormType;

/// 必須条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
    /// 別フィールドが特定の値のときだけ必須（例: `lcType == "Usance"` のとき `tenorDays`）
    RequiredWhen {
        field:  &'static str,
        equals: &'static str,
    },
}

/// フィールド値の種類と制約
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 自由入力テキスト（最大文字数）
    Text { max_chars: usize },
    /// メールアドレス
    Email,
    /// 電話番号（数字・空白・`+-()` で 7〜20 文字）
    Phone,
    /// 正の金額
    Amount,
    /// ISO 4217 形式の 3 文字通貨コード
    Currency,
    /// `YYYY-MM-DD` 形式の暦日
    Date,
    /// 列挙値のいずれか
    Choice(&'static [&'static str]),
    /// 正の整数
    PositiveInteger,
    /// 0〜100 のパーセンテージ
    Percentage,
}

/// フィールド定義
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// フィールド名（フォームの name 属性）
    pub name:             &'static str,
    /// 通知メールでの表示ラベル
    pub label:            &'static str,
    pub kind:             FieldKind,
    pub requirement:      Requirement,
    /// 未入力時のメッセージ
    pub required_message: &'static str,
    /// 制約違反時のメッセージ
    pub invalid_message:  &'static str,
}

/// 信用状の種類
pub const LC_TYPES: &[&str] = &["Sight", "Usance", "Deferred", "Revolving"];

/// スタンドバイ信用状の用途
pub const SBLC_PURPOSES: &[&str] = &["Performance", "Financial", "AdvancePayment", "BidBond"];

// --- 共通フィールド ---

const NAME: FieldSpec = FieldSpec {
    name:             "name",
    label:            "Name",
    kind:             FieldKind::Text { max_chars: 100 },
    requirement:      Requirement::Required,
    required_message: "Name is required",
    invalid_message:  "Name must be at most 100 characters",
};

const EMAIL: FieldSpec = FieldSpec {
    name:             "email",
    label:            "Email",
    kind:             FieldKind::Email,
    requirement:      Requirement::Required,
    required_message: "Email is required",
    invalid_message:  "Please enter a valid email address",
};

const PHONE: FieldSpec = FieldSpec {
    name:             "phone",
    label:            "Phone",
    kind:             FieldKind::Phone,
    requirement:      Requirement::Optional,
    required_message: "Phone is required",
    invalid_message:  "Please enter a valid phone number",
};

const MESSAGE: FieldSpec = FieldSpec {
    name:             "message",
    label:            "Message",
    kind:             FieldKind::Text { max_chars: 5000 },
    requirement:      Requirement::Required,
    required_message: "Message is required",
    invalid_message:  "Message must be at most 5000 characters",
};

// --- 信用状系フィールド ---

const COMPANY_NAME: FieldSpec = FieldSpec {
    name:             "companyName",
    label:            "Company",
    kind:             FieldKind::Text { max_chars: 200 },
    requirement:      Requirement::Required,
    required_message: "Company name is required",
    invalid_message:  "Company name must be at most 200 characters",
};

const AMOUNT: FieldSpec = FieldSpec {
    name:             "amount",
    label:            "Amount",
    kind:             FieldKind::Amount,
    requirement:      Requirement::Required,
    required_message: "Amount is required",
    invalid_message:  "Amount must be a positive number",
};

const CURRENCY: FieldSpec = FieldSpec {
    name:             "currency",
    label:            "Currency",
    kind:             FieldKind::Currency,
    requirement:      Requirement::Optional,
    required_message: "Currency is required",
    invalid_message:  "Currency must be a 3-letter ISO code",
};

const EXPIRY_DATE: FieldSpec = FieldSpec {
    name:             "expiryDate",
    label:            "Expiry date",
    kind:             FieldKind::Date,
    requirement:      Requirement::Required,
    required_message: "Expiry date is required",
    invalid_message:  "Expiry date must be a valid date (YYYY-MM-DD)",
};

const LC_TYPE: FieldSpec = FieldSpec {
    name:             "lcType",
    label:            "LC type",
    kind:             FieldKind::Choice(LC_TYPES),
    requirement:      Requirement::Required,
    required_message: "LC type is required",
    invalid_message:  "LC type must be one of Sight, Usance, Deferred, Revolving",
};

const TENOR_DAYS: FieldSpec = FieldSpec {
    name:             "tenorDays",
    label:            "Tenor (days)",
    kind:             FieldKind::PositiveInteger,
    requirement:      Requirement::RequiredWhen {
        field:  "lcType",
        equals: "Usance",
    },
    required_message: "Tenor is required for Usance",
    invalid_message:  "Tenor must be a positive whole number of days",
};

const BENEFICIARY_NAME: FieldSpec = FieldSpec {
    name:             "beneficiaryName",
    label:            "Beneficiary",
    kind:             FieldKind::Text { max_chars: 200 },
    requirement:      Requirement::Required,
    required_message: "Beneficiary name is required",
    invalid_message:  "Beneficiary name must be at most 200 characters",
};

const SBLC_PURPOSE: FieldSpec = FieldSpec {
    name:             "sblcPurpose",
    label:            "SBLC purpose",
    kind:             FieldKind::Choice(SBLC_PURPOSES),
    requirement:      Requirement::Required,
    required_message: "SBLC purpose is required",
    invalid_message:  "SBLC purpose must be one of Performance, Financial, AdvancePayment, BidBond",
};

const TOLERANCE: FieldSpec = FieldSpec {
    name:             "tolerance",
    label:            "Tolerance (%)",
    kind:             FieldKind::Percentage,
    requirement:      Requirement::Optional,
    required_message: "Tolerance is required",
    invalid_message:  "Tolerance must be between 0 and 100",
};

const CONTACT_SCHEMA: &[FieldSpec] = &[NAME, EMAIL, PHONE, MESSAGE];

const LETTER_OF_CREDIT_SCHEMA: &[FieldSpec] = &[
    NAME,
    EMAIL,
    PHONE,
    COMPANY_NAME,
    LC_TYPE,
    AMOUNT,
    CURRENCY,
    TENOR_DAYS,
    EXPIRY_DATE,
    BENEFICIARY_NAME,
    TOLERANCE,
    MESSAGE,
];

const STANDBY_LETTER_OF_CREDIT_SCHEMA: &[FieldSpec] = &[
    NAME,
    EMAIL,
    PHONE,
    COMPANY_NAME,
    SBLC_PURPOSE,
    AMOUNT,
    CURRENCY,
    EXPIRY_DATE,
    BENEFICIARY_NAME,
    TOLERANCE,
    MESSAGE,
];

impl FormType {
    /// フォーム種別のフィールド定義（表示順）
    pub fn schema(&self) -> &'static [FieldSpec] {
        match self {
            Self::Contact => CONTACT_SCHEMA,
            Self::LetterOfCreditApplication => LETTER_OF_CREDIT_SCHEMA,
            Self::StandbyLetterOfCreditApplication => STANDBY_LETTER_OF_CREDIT_SCHEMA,
        }
    }

    /// フィールド名から定義を引く
    pub fn field_spec(&self, name: &str) -> Option<&'static FieldSpec> {
        self.schema().iter().find(|spec| spec.name == name)
    }
}
