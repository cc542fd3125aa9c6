//! # ユースケース層
//!
//! ハンドラから呼ばれるアプリケーションロジック。
//!
//! - [`submission`] - フォーム送信の受付（検証 → 通知）
//! - [`notification`] - 通知メールの生成と送信

pub mod notification;
pub mod submission;

pub use notification::{NotificationDispatcher, TemplateRenderer};
pub use submission::{SubmissionOutcome, SubmissionUseCase};
