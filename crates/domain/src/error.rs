//! # ドメイン層エラー定義
//!
//! ## 設計方針
//!
//! - **検証エラーはエラー型にしない**: フィールド単位の検証失敗は頻繁に起こる
//!   想定内の結果なので [`ValidationResult`](crate::validation::ValidationResult)
//!   としてデータで返す
//! - **未知のフォーム種別は専用エラー**: 一般的な検証失敗とは区別し、
//!   クライアントエラーとして扱う（リトライしない）

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// 未知のフォーム種別
    ///
    /// 受付対象の 3 種類（Contact / LetterOfCreditApplication /
    /// StandbyLetterOfCreditApplication）以外が指定された場合に使用する。
    #[error("unknown form type: {0}")]
    UnknownFormType(String),
}
