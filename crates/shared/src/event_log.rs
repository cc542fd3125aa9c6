//! # ビジネスイベントログの構造化ヘルパー
//!
//! フォーム受付・通知送信の結果を `jq` で効率的に調査できるよう、
//! ログフィールドの命名規約とヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const SUBMISSION: &str = "submission";
        pub const NOTIFICATION: &str = "notification";
    }

    /// イベントアクション
    pub mod action {
        // フォーム受付
        pub const SUBMISSION_ACCEPTED: &str = "submission.accepted";
        pub const SUBMISSION_REJECTED: &str = "submission.rejected";

        // 通知
        pub const NOTIFICATION_SENT: &str = "notification.sent";
        pub const NOTIFICATION_FAILED: &str = "notification.failed";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const FORM_SUBMISSION: &str = "form_submission";
        pub const NOTIFICATION: &str = "notification";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// 設定不備（デプロイ時の問題。エンドユーザーには修正できない）
        pub const CONFIGURATION: &str = "configuration";
        /// 外部サービス呼び出し（SMTP リレー）
        pub const EXTERNAL_SERVICE: &str = "external_service";
        /// テンプレート
        pub const TEMPLATE: &str = "template";
    }

    /// エラー種別
    pub mod kind {
        pub const TRANSPORT_NOT_CONFIGURED: &str = "transport_not_configured";
        pub const INVALID_ADDRESS: &str = "invalid_address";
        pub const SEND_FAILED: &str = "send_failed";
        pub const REJECTED: &str = "rejected";
        pub const TIMEOUT: &str = "timeout";
        pub const TEMPLATE_NOT_FOUND: &str = "template_not_found";
        pub const TEMPLATE_FAILED: &str = "template_failed";
        pub const INTERNAL: &str = "internal";
    }
}
