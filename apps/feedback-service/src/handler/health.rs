//! # ヘルスチェックハンドラ
//!
//! フィードバック受付サービスの稼働状態を確認するためのエンドポイント。
//!
//! レスポンス型は [`parceria_shared::HealthResponse`] を参照。

use axum::Json;
use parceria_shared::HealthResponse;

/// ヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}
