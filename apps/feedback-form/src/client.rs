//! # フィードバック受付サービス クライアント
//!
//! フォームからフィードバック受付サービスへの通信を担当する。
//!
//! ## 送信内容
//!
//! - ボディ: 下書き全体を camelCase キーの JSON で送る
//! - `Idempotency-Key`: 下書きごとにフォームが生成したキー（再試行で二重送信しないため）
//! - `X-Request-Id`: 送信ごとに生成する UUID v7（サーバーログとの突き合わせ用）
//!
//! ステータスコードの解釈はしない。ボディが JSON として読めればステータスと共に返し、
//! 読めなければ [`FeedbackClientError::InvalidResponse`] とする。

use std::time::Duration;

use async_trait::async_trait;
use parceria_domain::feedback::FeedbackDraft;
use parceria_shared::observability::REQUEST_ID_HEADER;
use thiserror::Error;

/// 冪等キーを運ぶヘッダー名
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// リクエスト全体の待ち時間上限
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// クライアントエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackClientError {
    /// 接続できない、または応答を受け取れない
    #[error("Erro na rede: {0}")]
    Network(String),

    /// 応答ボディが JSON として読めない
    #[error("Resposta inválida do servidor: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for FeedbackClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FeedbackClientError::InvalidResponse(err.to_string())
        } else {
            FeedbackClientError::Network(err.to_string())
        }
    }
}

/// サーバーからの応答
///
/// ボディの `status` / `message` はどちらも欠けていてよい。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackResponse {
    /// HTTP ステータスコード
    pub http_status: u16,
    /// ステータスの理由句（例: `"Internal Server Error"`）
    pub reason:      String,
    /// ボディの `status`
    pub status:      Option<String>,
    /// ボディの `message`（空文字は `None`）
    pub message:     Option<String>,
}

impl FeedbackResponse {
    /// 2xx かどうか
    pub fn is_http_success(&self) -> bool {
        (200..300).contains(&self.http_status)
    }

    /// ボディの `status` が `"success"` かどうか
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }

    /// 応答ボディを読み取る
    pub fn from_body(
        http_status: u16,
        reason: impl Into<String>,
        body: &[u8],
    ) -> Result<Self, FeedbackClientError> {
        let json: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| FeedbackClientError::InvalidResponse(e.to_string()))?;

        let field = |name: &str| {
            json.get(name)
                .and_then(serde_json::Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            http_status,
            reason: reason.into(),
            status: field("status"),
            message: field("message"),
        })
    }
}

/// フィードバック送信クライアントトレイト
///
/// テスト時にスタブを使用できるようトレイトで定義。
#[async_trait]
pub trait FeedbackClient: Send + Sync {
    /// 下書きを送信する
    async fn submit(
        &self,
        draft: &FeedbackDraft,
        idempotency_key: &str,
    ) -> Result<FeedbackResponse, FeedbackClientError>;
}

/// フィードバック送信クライアント実装
pub struct FeedbackClientImpl {
    endpoint_url: String,
    client:       reqwest::Client,
}

impl FeedbackClientImpl {
    /// 新しいクライアントを作成する
    ///
    /// # 引数
    ///
    /// - `endpoint_url`: 受付エンドポイントの URL（例: `http://localhost:8000/feedback`）
    pub fn new(endpoint_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "HTTP クライアントの設定に失敗したため既定の設定を使用します");
                reqwest::Client::new()
            });

        Self {
            endpoint_url: endpoint_url.to_string(),
            client,
        }
    }
}

#[async_trait]
impl FeedbackClient for FeedbackClientImpl {
    async fn submit(
        &self,
        draft: &FeedbackDraft,
        idempotency_key: &str,
    ) -> Result<FeedbackResponse, FeedbackClientError> {
        let request_id = uuid::Uuid::now_v7().to_string();
        tracing::debug!(
            request_id = %request_id,
            idempotency_key = %idempotency_key,
            url = %self.endpoint_url,
            "フィードバックを送信します"
        );

        let response = self
            .client
            .post(&self.endpoint_url)
            .header(IDEMPOTENCY_KEY_HEADER, idempotency_key)
            .header(REQUEST_ID_HEADER, &request_id)
            .json(draft)
            .send()
            .await?;

        let status = response.status();
        let reason = status
            .canonical_reason()
            .map_or_else(|| status.as_u16().to_string(), str::to_string);
        let body = response.bytes().await?;

        let parsed = FeedbackResponse::from_body(status.as_u16(), reason, &body);
        if let Err(e) = &parsed {
            tracing::warn!(
                request_id = %request_id,
                http_status = status.as_u16(),
                error = %e,
                "応答ボディを読み取れません"
            );
        }
        parsed
    }
}
