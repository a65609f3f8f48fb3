//! # アプリケーション構築
//!
//! DI（送信実装・ユースケース・State）の初期化とルーター構築を担当する。
//! `main.rs` は設定読み込みとサーバー起動に集中する。
//!
//! ## レイヤー構成（外側から）
//!
//! ```text
//! SetRequestIdLayer → TraceLayer → CanonicalLogLineLayer
//!   → PropagateRequestIdLayer → SetResponseHeaderLayer → CorsLayer → handler
//! ```
//!
//! CorsLayer が直接返す OPTIONS の応答にも `Content-Type: application/json` を付けるため、
//! SetResponseHeaderLayer は CorsLayer の外側に置く。

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    routing::{any, get},
};
use parceria_domain::clock::{Clock, SystemClock};
use parceria_infra::{
    InMemoryIdempotencyStore,
    NoopNotificationSender,
    NotificationSender,
    SmtpNotificationSender,
};
use parceria_shared::{
    canonical_log::CanonicalLogLineLayer,
    observability::{MakeRequestUuidV7, make_request_span},
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::{
    config::{FeedbackConfig, NotificationBackend},
    handler::{FeedbackState, IDEMPOTENCY_KEY_HEADER, health_check, submit_feedback},
    usecase::{FeedbackUseCase, FeedbackUseCaseImpl, NotificationComposer},
};

/// 設定に従って通知送信の実装を選ぶ
pub fn build_sender(
    config: &FeedbackConfig,
) -> Result<Arc<dyn NotificationSender>, parceria_domain::notification::NotificationError> {
    match config.mail.backend {
        NotificationBackend::Smtp => {
            tracing::info!(
                host = %config.mail.smtp.host,
                port = config.mail.smtp.port,
                encryption = config.mail.smtp.use_encryption,
                "SMTP で通知メールを送信します"
            );
            Ok(Arc::new(SmtpNotificationSender::new(&config.mail.smtp)?))
        }
        NotificationBackend::Noop => {
            tracing::warn!("NOTIFICATION_BACKEND=noop: 通知メールは送信されません");
            Ok(Arc::new(NoopNotificationSender))
        }
    }
}

/// ユースケースを組み立てる
///
/// 時刻はシステム時刻、冪等性ストアはインメモリ。
pub fn build_usecase(
    config: &FeedbackConfig,
    sender: Arc<dyn NotificationSender>,
) -> Arc<dyn FeedbackUseCase> {
    build_usecase_with_clock(config, sender, Arc::new(SystemClock))
}

/// 時刻プロバイダを指定してユースケースを組み立てる
pub fn build_usecase_with_clock(
    config: &FeedbackConfig,
    sender: Arc<dyn NotificationSender>,
    clock: Arc<dyn Clock>,
) -> Arc<dyn FeedbackUseCase> {
    let composer = NotificationComposer::new(
        config.mail.subject.clone(),
        config.mail.from.clone(),
        config.mail.to.clone(),
        config.mail.utc_offset,
    );
    let idempotency_store = Arc::new(InMemoryIdempotencyStore::new(
        config.idempotency_ttl,
        config.idempotency_max_keys,
    ));

    Arc::new(FeedbackUseCaseImpl::new(
        sender,
        composer,
        clock,
        idempotency_store,
        config.mail.timeout,
    ))
}

/// ルーターを構築する
pub fn build_app(feedback_path: &str, usecase: Arc<dyn FeedbackUseCase>) -> Router {
    let feedback_state = Arc::new(FeedbackState { usecase });

    Router::new()
        .route("/health", get(health_check))
        .route(feedback_path, any(submit_feedback))
        .with_state(feedback_state)
        .layer(cors_layer())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CanonicalLogLineLayer)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}

/// どのオリジンからも POST / OPTIONS を許可する
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(IDEMPOTENCY_KEY_HEADER),
        ])
}
