//! # Intake Service サーバー
//!
//! Web サイトのフォーム送信を受け付ける API サーバー。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `INTAKE_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `INTAKE_PORT` | No | ポート番号（デフォルト: `3100`） |
//! | `CORS_ALLOWED_ORIGINS` | No | 許可オリジン（カンマ区切り） |
//! | `APP_ENV` | No | `development`（デフォルト）/ `production` |
//! | `EMAIL_HOST` | production | SMTP ホスト |
//! | `EMAIL_PORT` | production | SMTP ポート |
//! | `EMAIL_SECURE` | No | `true` なら暗黙的 TLS |
//! | `EMAIL_USER` / `EMAIL_PASS` | production | SMTP 認証情報 |
//! | `EMAIL_FROM` | production | 送信元アドレス |
//! | `EMAIL_TO` | No | 通知先（デフォルト: `EMAIL_FROM`） |
//! | `EMAIL_TIMEOUT_SECS` | No | 送信タイムアウト秒数（デフォルト: 20） |
//! | `EMAIL_MAX_ATTEMPTS` | No | 一時的な失敗時の最大試行回数（デフォルト: 1） |
//! | `LOG_FORMAT` | No | `json` で JSON ログ |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（メールはコンソールに出力される）
//! cargo run -p tradecredit-intake-service
//!
//! # 本番環境
//! APP_ENV=production EMAIL_HOST=smtp.example.com ... cargo run -p tradecredit-intake-service --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tradecredit_infra::TransportSlot;
use tradecredit_intake_service::{app_builder::build_app, config::IntakeConfig, usecase::TemplateRenderer};
use tradecredit_shared::observability::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    init_tracing(TracingConfig::from_env("intake-service"));
    let _tracing_guard = tracing::info_span!("app", service = "intake-service").entered();

    let config = IntakeConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Intake Service を起動します: {}:{}",
        config.host,
        config.port
    );

    // 送信経路は起動時に一度解決しておく（結果はスロットが記録する）
    // 設定不備でも起動は続け、フォーム送信は失敗結果を返す
    let transport = Arc::new(TransportSlot::new(config.email.clone()));
    if transport.resolve().is_err() {
        tracing::warn!("メール送信経路が使えないため、フォーム送信はすべて失敗します");
    }

    let renderer = TemplateRenderer::new().context("通知テンプレートの読み込みに失敗しました")?;

    let app = build_app(transport, renderer, &config.cors_allowed_origins);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Intake Service が起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
