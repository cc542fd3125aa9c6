//! # Trade Credit Bancorp 共有ユーティリティ
//!
//! フォーム受付サービスで共通に使用するユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - intake-service から依存される（domain / infra は依存しない）
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - 外部クレートへの依存は最小限に抑える（tracing 系は `observability` feature で有効化）

pub mod error_response;
pub mod event_log;
pub mod health;
pub mod observability;

pub use error_response::ErrorResponse;
pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
