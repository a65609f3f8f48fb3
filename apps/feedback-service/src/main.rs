//! # フィードバック受付サーバー
//!
//! パートナー満足度フォームの送信を受け付け、通知メールとして担当者へ転送する。
//!
//! ## アーキテクチャ
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌──────────────┐
//! │ Feedback     │────▶│ Feedback Service │────▶│ SMTP サーバー │
//! │ Form         │     │  POST /feedback  │     │ (Mailpit 等) │
//! └──────────────┘     └──────────────────┘     └──────────────┘
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `FEEDBACK_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `FEEDBACK_PORT` | **Yes** | ポート番号 |
//! | `FEEDBACK_PATH` | No | 受付パス（デフォルト: `/feedback`） |
//! | `NOTIFICATION_BACKEND` | No | `smtp` / `noop`（デフォルト: `smtp`。`noop` は送信しない） |
//! | `SMTP_HOST` / `SMTP_PORT` | No | SMTP サーバー（デフォルト: `localhost:1025`） |
//! | `SMTP_USERNAME` / `SMTP_PASSWORD` | No | SMTP 認証情報 |
//! | `SMTP_USE_ENCRYPTION` | No | `true` で STARTTLS |
//! | `SMTP_TIMEOUT_SECS` | No | 送信の待ち時間上限（デフォルト: 30） |
//! | `NOTIFICATION_FROM_ADDRESS` | **Yes** | 送信元アドレス |
//! | `NOTIFICATION_TO_ADDRESS` | **Yes** | 宛先アドレス |
//! | `NOTIFICATION_FROM_NAME` / `NOTIFICATION_TO_NAME` | No | 表示名 |
//! | `NOTIFICATION_SUBJECT` | No | 件名 |
//! | `NOTIFICATION_UTC_OFFSET` | No | 受信日時のタイムゾーン（デフォルト: `-03:00`） |
//! | `IDEMPOTENCY_TTL_SECS` | No | 冪等キーの保持期間（デフォルト: 86400） |
//! | `IDEMPOTENCY_MAX_KEYS` | No | 冪等キーの最大保持件数（デフォルト: 10000） |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（.env ファイルを使用）
//! cargo run -p parceria-feedback-service
//!
//! # 本番環境（環境変数を直接指定）
//! FEEDBACK_PORT=8000 SMTP_HOST=smtp.example.com ... cargo run -p parceria-feedback-service --release
//! ```

use std::net::SocketAddr;

use anyhow::Context as _;
use parceria_feedback_service::{
    app_builder::{build_app, build_sender, build_usecase},
    config::FeedbackConfig,
};
use parceria_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing(TracingConfig::from_env("feedback-service"));
    let _tracing_guard = tracing::info_span!("app", service = "feedback-service").entered();

    let config = FeedbackConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "フィードバック受付サーバーを起動します: {}:{}{}",
        config.host,
        config.port,
        config.path
    );

    let sender = build_sender(&config).context("通知送信の初期化に失敗しました")?;
    let usecase = build_usecase(&config, sender);
    let app = build_app(&config.path, usecase);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("バインドアドレスが不正です")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("{addr} にバインドできません"))?;
    tracing::info!("サーバーが起動しました: {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("サーバーが異常終了しました")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("シグナルの待ち受けに失敗しました: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("シャットダウンします");
}
