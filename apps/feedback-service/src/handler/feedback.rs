//! # フィードバック受付ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST {FEEDBACK_PATH}` - フィードバック送信
//! - `OPTIONS {FEEDBACK_PATH}` - 空の 200（CORS プリフライトは CorsLayer が先に応答する）
//!
//! それ以外のメソッドは 405 を返す。検証は次の順で行い、最初の失敗で打ち切る:
//!
//! 1. メソッド
//! 2. ボディを読み取れるか（上限超過は 413）
//! 3. ボディの有無
//! 4. JSON として正しいか
//!
//! ボディの読み取り失敗もハンドラ内でエラーに変換し、常に JSON で応答する。
//!
//! 正規化は [`FeedbackSubmission::from_json`] が行い、失敗しない。

use std::sync::Arc;

use axum::{
    Json,
    body::{Body, Bytes},
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use parceria_domain::feedback::FeedbackSubmission;
use parceria_infra::IdempotencyKey;
use parceria_shared::SubmissionResult;

use crate::{
    error::FeedbackError,
    usecase::{FeedbackUseCase, SubmitOutcome},
};

/// 成功時のメッセージ
pub const SUCCESS_MESSAGE: &str = "Feedback enviado com sucesso!";

/// 冪等キーを運ぶヘッダー名
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// フィードバックハンドラの共有状態
pub struct FeedbackState {
    pub usecase: Arc<dyn FeedbackUseCase>,
}

/// ANY {FEEDBACK_PATH}
pub async fn submit_feedback(
    State(state): State<Arc<FeedbackState>>,
    method: Method,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, FeedbackError> {
    if method == Method::OPTIONS {
        return Ok(options_response());
    }
    if method != Method::POST {
        return Err(FeedbackError::MethodNotAllowed);
    }
    let body = body.map_err(body_error)?;
    if body.is_empty() {
        return Err(FeedbackError::EmptyBody);
    }

    let json: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "リクエストボディの JSON パースに失敗");
        FeedbackError::InvalidJson
    })?;
    let submission = FeedbackSubmission::from_json(&json);

    let outcome = state
        .usecase
        .submit(submission, idempotency_key(&headers))
        .await?;
    if outcome == SubmitOutcome::Replayed {
        tracing::debug!("送信済みの冪等キーのため成功を再応答");
    }

    Ok((
        StatusCode::OK,
        Json(SubmissionResult::success(SUCCESS_MESSAGE)),
    )
        .into_response())
}

fn options_response() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Body::empty(),
    )
        .into_response()
}

/// ボディの読み取り失敗をエラーに変換する
fn body_error(rejection: BytesRejection) -> FeedbackError {
    tracing::debug!(error = %rejection.body_text(), "リクエストボディを読み取れません");
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        FeedbackError::PayloadTooLarge
    } else {
        FeedbackError::InvalidJson
    }
}

/// `Idempotency-Key` ヘッダーを読み取る
///
/// 不正な値は警告を出して無視する（冪等性なしで処理する）。
fn idempotency_key(headers: &HeaderMap) -> Option<IdempotencyKey> {
    let value = headers.get(IDEMPOTENCY_KEY_HEADER)?;

    let parsed = value
        .to_str()
        .map_err(|e| e.to_string())
        .and_then(|s| IdempotencyKey::parse(s).map_err(|e| e.to_string()));

    match parsed {
        Ok(key) => Some(key),
        Err(reason) => {
            tracing::warn!(reason = %reason, "不正な Idempotency-Key を無視します");
            None
        }
    }
}
