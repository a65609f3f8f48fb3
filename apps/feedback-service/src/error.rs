//! # フィードバック受付サービス エラー定義
//!
//! リクエスト処理中に発生するエラーと、HTTP レスポンスへの変換を定義する。
//!
//! レスポンスボディは常に [`SubmissionResult`] 形式
//! （`{"status":"error","message":"..."}`）で、4xx はメッセージをそのまま、
//! 5xx は `"Erro no servidor: "` を前置して返す。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use parceria_domain::notification::NotificationError;
use parceria_shared::{SubmissionResult, event_log::error as log_error};
use thiserror::Error;

/// 5xx レスポンスのメッセージに前置する文字列
pub const SERVER_ERROR_PREFIX: &str = "Erro no servidor: ";

/// フィードバック受付で発生するエラー
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// POST / OPTIONS 以外のメソッド
    #[error("Método não permitido. Utilize POST.")]
    MethodNotAllowed,

    /// リクエストボディが空
    #[error("Nenhum dado recebido.")]
    EmptyBody,

    /// リクエストボディが JSON として不正
    #[error("O JSON enviado é inválido.")]
    InvalidJson,

    /// リクエストボディが上限を超えている
    #[error("O feedback enviado excede o tamanho máximo permitido.")]
    PayloadTooLarge,

    /// 同じ冪等キーの送信が進行中
    #[error("Este feedback já está sendo enviado.")]
    DuplicateInFlight,

    /// 冪等キーが別の内容で再利用された
    #[error("Esta chave de idempotência já foi usada com outro conteúdo.")]
    IdempotencyKeyReused,

    /// 通知メールの送信失敗（タイムアウトを含む）
    #[error(transparent)]
    Delivery(#[from] NotificationError),

    /// 想定外の内部エラー
    #[error("{0}")]
    Unexpected(String),
}

impl FeedbackError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::EmptyBody | Self::InvalidJson => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::DuplicateInFlight => StatusCode::CONFLICT,
            Self::IdempotencyKeyReused => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Delivery(_) | Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// クライアントに返すメッセージ
    pub fn client_message(&self) -> String {
        if self.status_code().is_server_error() {
            format!("{SERVER_ERROR_PREFIX}{self}")
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for FeedbackError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            Self::Delivery(NotificationError::Timeout(_)) => {
                tracing::error!(
                    error.category = log_error::category::EXTERNAL_SERVICE,
                    error.kind = log_error::kind::MAIL_TIMEOUT,
                    "通知メールの送信がタイムアウトしました: {}",
                    self
                );
            }
            Self::Delivery(_) => {
                tracing::error!(
                    error.category = log_error::category::EXTERNAL_SERVICE,
                    error.kind = log_error::kind::MAIL_DELIVERY,
                    "通知メールの送信に失敗しました: {}",
                    self
                );
            }
            Self::Unexpected(_) => {
                tracing::error!(
                    error.category = log_error::category::INTERNAL,
                    error.kind = log_error::kind::UNEXPECTED,
                    "内部エラー: {}",
                    self
                );
            }
            _ => {}
        }

        (status, Json(SubmissionResult::error(self.client_message()))).into_response()
    }
}
