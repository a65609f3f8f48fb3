//! # フィードバックフォーム（コマンドライン版）
//!
//! 引数で受け取った項目を下書きに設定し、フィードバック受付サービスへ送信する。
//!
//! ```bash
//! cargo run -p parceria-feedback-form -- companyName="ACME Ltda" productQuality=5 recommendation=9
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `FEEDBACK_URL` | No | 受付エンドポイント（デフォルト: `http://localhost:8000/feedback`） |

use std::str::FromStr;

use anyhow::{Context as _, bail};
use parceria_domain::feedback::DraftField;
use parceria_feedback_form::{FeedbackClientImpl, FormController, FormState};
use parceria_shared::observability::{TracingConfig, init_tracing};

const DEFAULT_FEEDBACK_URL: &str = "http://localhost:8000/feedback";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing(TracingConfig::from_env("feedback-form"));

    let url = std::env::var("FEEDBACK_URL")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_FEEDBACK_URL.to_string());

    let mut form = FormController::new(FeedbackClientImpl::new(&url));
    for arg in std::env::args().skip(1) {
        let (name, value) = parse_arg(&arg)?;
        form.update_field(name, value);
    }

    match form.submit().await {
        FormState::Submitted => {
            println!("Feedback enviado com sucesso!");
            Ok(())
        }
        FormState::Editing { error: Some(message) } => bail!("{message}"),
        state => bail!("送信が完了しませんでした: {state:?}"),
    }
}

/// `項目名=値` を分解する
fn parse_arg(arg: &str) -> anyhow::Result<(DraftField, &str)> {
    let (name, value) = arg
        .split_once('=')
        .with_context(|| format!("`項目名=値` の形式で指定してください: {arg}"))?;
    let field = DraftField::from_str(name).with_context(|| format!("未知の項目です: {name}"))?;
    Ok((field, value))
}
