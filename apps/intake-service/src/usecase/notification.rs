//! # 通知ユースケース
//!
//! フォーム送信に伴う通知メールの生成・送信を統合する。
//!
//! ## モジュール構成
//!
//! - [`template_renderer`] - tera テンプレートエンジンによるメール生成
//! - [`dispatcher`] - テンプレートレンダリング + 送信経路の解決 + 送信の統合

pub mod dispatcher;
pub mod template_renderer;

pub use dispatcher::NotificationDispatcher;
pub use template_renderer::TemplateRenderer;
