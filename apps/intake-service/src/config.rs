//! # Intake Service 設定
//!
//! 環境変数から Intake Service サーバーの設定を読み込む。
//!
//! メール送信経路の設定（`APP_ENV`、`EMAIL_*`）は生の値のまま保持し、
//! 検証は送信経路の解決時（[`tradecredit_infra::TransportSlot`]）に行う。
//! 設定不備でもサーバー自体は起動し、フォーム送信は失敗結果を返す。

use std::env;

use anyhow::Context;
use tradecredit_infra::EmailSettings;

/// 既定のポート番号
const DEFAULT_PORT: u16 = 3100;

/// Intake Service サーバーの設定
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// バインドアドレス
    pub host:                 String,
    /// ポート番号
    pub port:                 u16,
    /// CORS で許可するオリジン（空なら CORS ヘッダを付けない）
    pub cors_allowed_origins: Vec<String>,
    /// メール送信設定
    pub email:                EmailSettings,
}

impl IntakeConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match env::var("INTAKE_PORT") {
            Ok(value) => value
                .trim()
                .parse()
                .with_context(|| format!("INTAKE_PORT は有効なポート番号である必要があります: {value}"))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            host: env::var("INTAKE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            cors_allowed_origins: parse_origins(
                &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
            ),
            email: EmailSettings::from_env(),
        })
    }
}

/// カンマ区切りのオリジン一覧を分解する
fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_オリジン一覧をカンマで分解する() {
        assert_eq!(
            parse_origins("https://tradecreditbancorp.com, https://www.tradecreditbancorp.com,"),
            vec![
                "https://tradecreditbancorp.com".to_string(),
                "https://www.tradecreditbancorp.com".to_string(),
            ]
        );
    }

    #[test]
    fn test_空文字列なら許可オリジンなし() {
        assert!(parse_origins("").is_empty());
        assert!(parse_origins(" , ").is_empty());
    }
}
