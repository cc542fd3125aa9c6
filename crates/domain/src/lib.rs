//! # Trade Credit Bancorp ドメイン層
//!
//! Web サイトのリード獲得フォーム（問い合わせ・信用状申込・スタンドバイ信用状申込）の
//! 受付と通知に関するドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **フォーム種別による分岐**: フォームごとの専用型を作らず、
//!   `FormSubmission { form_type, fields }` の単一形状に集約し、
//!   検証ルール・テンプレートは [`FormType`](form::FormType) をキーに引く
//! - **純粋性**: バリデーションは I/O を持たない純粋関数
//! - **値オブジェクト**: すべての型は 1 リクエストの中で生成・破棄される
//!
//! ## 依存関係の方向
//!
//! ```text
//! intake-service → infra → domain
//!        ↘                   ↑
//!          ─────────────────
//! ```
//!
//! ## モジュール構成
//!
//! - [`error`] - ドメイン層エラー（未知のフォーム種別）
//! - [`form`] - フォーム種別、フィールド値、送信内容
//! - [`schema`] - フォーム種別ごとのフィールド定義
//! - [`validation`] - フォーム送信内容の検証
//! - [`notification`] - 通知メッセージと送信結果
//!
//! ## 使用例
//!
//! ```rust
//! use std::collections::BTreeMap;
//!
//! use tradecredit_domain::{
//!     form::{FieldValue, FormSubmission},
//!     validation::validate,
//! };
//!
//! let mut fields = BTreeMap::new();
//! fields.insert("name".to_string(), FieldValue::from("Jane Doe"));
//! fields.insert("email".to_string(), FieldValue::from("jane@example.com"));
//! fields.insert("message".to_string(), FieldValue::from("Hello"));
//!
//! let submission = FormSubmission::parse("Contact", fields).unwrap();
//! assert!(validate(&submission).is_valid());
//! ```

pub mod error;
pub mod form;
pub mod notification;
pub mod schema;
pub mod validation;

pub use error::DomainError;
