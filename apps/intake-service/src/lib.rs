//! # Trade Credit Bancorp Intake Service
//!
//! Web サイトのフォーム送信（問い合わせ・信用状申込・スタンドバイ信用状申込）を
//! 受け付け、検証し、社内の担当者へ通知メールを送るサービス。
//!
//! ## 処理の流れ
//!
//! ```text
//! ┌──────────┐  POST /api/submissions  ┌──────────────────┐   SMTP   ┌─────────────┐
//! │ Web Site │────────────────────────▶│  Intake Service  │─────────▶│ Mail Server │
//! └──────────┘                         └──────────────────┘          └─────────────┘
//!                                        検証 → 描画 → 送信
//! ```
//!
//! ## モジュール構成
//!
//! - [`app_builder`] - State の組み立てとルーター定義
//! - [`config`] - アプリケーション設定（環境変数からの読み込み）
//! - [`error`] - エラー定義と HTTP レスポンスへの変換
//! - [`handler`] - HTTP リクエストハンドラ
//! - [`usecase`] - 送信受付と通知のユースケース
//!
//! ## 依存関係
//!
//! - `tradecredit_domain`: フォーム・スキーマ・検証・通知モデル
//! - `tradecredit_infra`: メール送信経路（SMTP / コンソール）
//! - `tradecredit_shared`: ログ・ヘルスチェック・エラーレスポンス

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
