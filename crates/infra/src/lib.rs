//! # Trade Credit Bancorp インフラ層
//!
//! 外部システム（メール送信経路）との接続・通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! このクレートはドメイン層で定義された通知メッセージを実際に届ける実装を提供する。
//! 送信経路の詳細（SMTP、開発用コンソール出力、再送）をカプセル化し、
//! ユースケース層からは [`NotificationSender`] トレイトと [`TransportSlot`] だけが見える。
//!
//! ## 依存関係
//!
//! ```text
//! intake-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`notification`] - 通知送信トレイトと実装（SMTP / コンソール / 再送デコレータ）
//! - [`transport`] - 実行モード・送信設定・一度だけ解決される送信経路スロット
//! - `mock` - テスト用モック（`test-utils` feature）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use tradecredit_infra::{EmailSettings, TransportSlot};
//!
//! let slot = TransportSlot::new(EmailSettings::from_env());
//! let transport = slot.resolve()?;
//! transport.sender().send_email(&message).await?;
//! ```

#[cfg(feature = "test-utils")]
pub mod mock;
pub mod notification;
pub mod transport;

pub use notification::NotificationSender;
pub use transport::{EmailSettings, RuntimeMode, Transport, TransportSlot, TransportState};
