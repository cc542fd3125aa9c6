//! # 送信経路
//!
//! 実行モードと環境変数から通知の送信経路（送信実装 + 宛先）を組み立てる。
//!
//! ## 状態遷移
//!
//! ```text
//! NotConfigured ──resolve()──→ Ready
//!                         └──→ Misconfigured
//! ```
//!
//! 解決はプロセスで一度だけ行い（`OnceLock`）、以後は環境変数を読み直さない。
//! 起動時に [`TransportSlot::resolve`] を呼んで先に解決しておくのが基本で、
//! 呼ばれていなければ最初の送信時に解決される。
//!
//! ## 実行モード
//!
//! - `development`（既定）: 常にコンソール出力。SMTP 設定は不要
//! - `production`: SMTP 送信。`EMAIL_HOST` / `EMAIL_PORT` / `EMAIL_USER` /
//!   `EMAIL_PASS` / `EMAIL_FROM` のいずれかが欠けていれば `Misconfigured`

use std::{
    env,
    sync::{Arc, OnceLock},
    time::Duration,
};

use lettre::message::Mailbox;
use tradecredit_domain::notification::{NotificationError, is_valid_address};

use crate::notification::{
    ConsoleNotificationSender,
    NotificationSender,
    RetryPolicy,
    RetryingNotificationSender,
    SmtpNotificationSender,
    SmtpSettings,
};

/// 開発モードで宛先が未設定の場合の既定値
pub const DEV_RECIPIENT: &str = "leads@tradecreditbancorp.test";

const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// 実行モード
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString, strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RuntimeMode {
    #[default]
    Development,
    Production,
}

impl RuntimeMode {
    /// `APP_ENV` の値から実行モードを決める
    ///
    /// 未設定は `development`。未知の値も `development` として扱い、警告を出す。
    pub fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Self::Development,
            Some(v) => v.parse().unwrap_or_else(|_| {
                tracing::warn!(app_env = v, "未知の APP_ENV のため development として扱います");
                Self::Development
            }),
        }
    }
}

/// メール送信設定（環境変数の生の値）
///
/// 値の検証は送信経路の解決時に行う。
#[derive(Debug, Clone, Default)]
pub struct EmailSettings {
    pub mode:         RuntimeMode,
    pub host:         Option<String>,
    pub port:         Option<String>,
    pub secure:       Option<String>,
    pub user:         Option<String>,
    pub pass:         Option<String>,
    pub from:         Option<String>,
    /// 通知の宛先。未設定なら `from` と同じ
    pub to:           Option<String>,
    pub timeout_secs: Option<String>,
    pub max_attempts: Option<String>,
}

impl EmailSettings {
    /// 環境変数から読み込む
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のキー参照関数から読み込む（空文字列は未設定扱い）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            mode:         RuntimeMode::from_value(get("APP_ENV").as_deref()),
            host:         get("EMAIL_HOST"),
            port:         get("EMAIL_PORT"),
            secure:       get("EMAIL_SECURE"),
            user:         get("EMAIL_USER"),
            pass:         get("EMAIL_PASS"),
            from:         get("EMAIL_FROM"),
            to:           get("EMAIL_TO"),
            timeout_secs: get("EMAIL_TIMEOUT_SECS"),
            max_attempts: get("EMAIL_MAX_ATTEMPTS"),
        }
    }

    /// 通知の宛先を決める
    ///
    /// # エラー
    ///
    /// 宛先が決まらない、または形式が不正な場合は [`NotificationError::Configuration`]。
    pub fn recipient(&self) -> Result<String, NotificationError> {
        let recipient = match (self.to.as_deref(), self.from.as_deref(), self.mode) {
            (Some(to), _, _) => to,
            (None, Some(from), _) => from,
            (None, None, RuntimeMode::Development) => DEV_RECIPIENT,
            (None, None, RuntimeMode::Production) => {
                return Err(NotificationError::Configuration(
                    "EMAIL_TO or EMAIL_FROM must be set".to_string(),
                ));
            }
        };
        // `Name <addr>` 形式（EMAIL_FROM と同じ書式）も受け付け、アドレス部分だけを使う
        let recipient = recipient.trim();
        recipient
            .parse::<Mailbox>()
            .ok()
            .map(|mailbox| mailbox.email.to_string())
            .filter(|address| is_valid_address(address))
            .ok_or_else(|| {
                NotificationError::Configuration(format!(
                    "recipient {recipient:?} is not a valid email address"
                ))
            })
    }

    pub fn timeout(&self) -> Result<Duration, NotificationError> {
        match self.timeout_secs.as_deref() {
            None => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            Some(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    NotificationError::Configuration(
                        "EMAIL_TIMEOUT_SECS must be a positive number of seconds".to_string(),
                    )
                }),
        }
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy, NotificationError> {
        match self.max_attempts.as_deref() {
            None => Ok(RetryPolicy::default()),
            Some(v) => v
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| (1..=10).contains(n))
                .map(RetryPolicy::new)
                .ok_or_else(|| {
                    NotificationError::Configuration(
                        "EMAIL_MAX_ATTEMPTS must be between 1 and 10".to_string(),
                    )
                }),
        }
    }

    /// 本番モードの SMTP 設定を組み立てる
    ///
    /// # エラー
    ///
    /// 必須の環境変数が欠けている場合は、その変数名を含む [`NotificationError::Configuration`]。
    pub fn smtp_settings(&self) -> Result<SmtpSettings, NotificationError> {
        let required = |value: &Option<String>, key: &str| {
            value
                .clone()
                .ok_or_else(|| NotificationError::Configuration(format!("{key} is not set")))
        };

        let host = required(&self.host, "EMAIL_HOST")?;
        let port = required(&self.port, "EMAIL_PORT")?
            .trim()
            .parse::<u16>()
            .map_err(|_| {
                NotificationError::Configuration("EMAIL_PORT must be a valid port number".to_string())
            })?;
        let username = required(&self.user, "EMAIL_USER")?;
        let password = required(&self.pass, "EMAIL_PASS")?;
        let from = required(&self.from, "EMAIL_FROM")?;

        Ok(SmtpSettings {
            host,
            port,
            secure: self.secure.as_deref().is_some_and(parse_flag),
            username,
            password,
            from,
            timeout: self.timeout()?,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// 解決済みの送信経路
#[derive(Clone)]
pub struct Transport {
    sender:    Arc<dyn NotificationSender>,
    recipient: String,
}

impl Transport {
    /// 送信実装と宛先から送信経路を作る
    ///
    /// # エラー
    ///
    /// 宛先が空・不正な形式の場合は [`NotificationError::Configuration`]。
    pub fn new(
        sender: Arc<dyn NotificationSender>,
        recipient: impl Into<String>,
    ) -> Result<Self, NotificationError> {
        let recipient = recipient.into().trim().to_string();
        if !is_valid_address(&recipient) {
            return Err(NotificationError::Configuration(format!(
                "recipient {recipient:?} is not a valid email address"
            )));
        }
        Ok(Self { sender, recipient })
    }

    /// 設定から送信経路を組み立てる
    pub fn from_settings(settings: &EmailSettings) -> Result<Self, NotificationError> {
        let sender: Arc<dyn NotificationSender> = match settings.mode {
            RuntimeMode::Development => {
                if settings.max_attempts.is_some() {
                    tracing::warn!("開発モードでは EMAIL_MAX_ATTEMPTS を無視します");
                }
                Arc::new(ConsoleNotificationSender::new())
            }
            RuntimeMode::Production => {
                let smtp: Arc<dyn NotificationSender> =
                    Arc::new(SmtpNotificationSender::new(&settings.smtp_settings()?)?);
                let policy = settings.retry_policy()?;
                if policy.max_attempts > 1 {
                    Arc::new(RetryingNotificationSender::new(smtp, policy))
                } else {
                    smtp
                }
            }
        };

        Self::new(sender, settings.recipient()?)
    }

    pub fn sender(&self) -> &dyn NotificationSender {
        self.sender.as_ref()
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("recipient", &self.recipient)
            .finish_non_exhaustive()
    }
}

/// 送信経路スロットの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum TransportState {
    NotConfigured,
    Ready,
    Misconfigured,
}

/// 一度だけ解決される送信経路スロット
///
/// 解決結果（成功・失敗とも）はキャッシュされ、以後変わらない。
pub struct TransportSlot {
    settings: EmailSettings,
    resolved: OnceLock<Result<Transport, NotificationError>>,
}

impl TransportSlot {
    /// 未解決のスロットを作る
    pub fn new(settings: EmailSettings) -> Self {
        Self {
            settings,
            resolved: OnceLock::new(),
        }
    }

    /// 解決済みの送信経路でスロットを作る（独自の送信実装を差し込む場合）
    pub fn with_transport(transport: Transport) -> Self {
        let resolved = OnceLock::new();
        let _ = resolved.set(Ok(transport));
        Self {
            settings: EmailSettings::default(),
            resolved,
        }
    }

    /// 送信経路を解決する（初回のみ組み立て、以後はキャッシュを返す）
    ///
    /// 解決の失敗は初回に一度だけ WARN で記録する。
    /// 送信ごとの失敗記録は呼び出し側の責務。
    pub fn resolve(&self) -> Result<&Transport, NotificationError> {
        self.resolved
            .get_or_init(|| {
                let result = Transport::from_settings(&self.settings);
                match &result {
                    Ok(transport) => tracing::info!(
                        mode = %self.settings.mode,
                        recipient = %transport.recipient(),
                        "通知の送信経路を解決しました"
                    ),
                    Err(e) => tracing::warn!(
                        mode = %self.settings.mode,
                        error = %e,
                        "通知の送信経路を解決できません"
                    ),
                }
                result
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn state(&self) -> TransportState {
        match self.resolved.get() {
            None => TransportState::NotConfigured,
            Some(Ok(_)) => TransportState::Ready,
            Some(Err(_)) => TransportState::Misconfigured,
        }
    }

    pub fn mode(&self) -> RuntimeMode {
        self.settings.mode
    }
}
