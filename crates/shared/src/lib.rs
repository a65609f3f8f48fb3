//! # Parceria 共有ユーティリティ
//!
//! フィードバックサービスとフォームクライアントの両方で使用される
//! 共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - サーバー（feedback-service）とクライアント（feedback-form）の両方から依存される
//! - ワイヤ上の契約（レスポンス形式）はここで一元管理し、両者のずれを防ぐ
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - tracing / tower 依存は `observability` feature の背後に置く

#[cfg(feature = "observability")]
pub mod canonical_log;
pub mod event_log;
pub mod health;
pub mod observability;
pub mod submission_result;

pub use health::HealthResponse;
pub use submission_result::{SubmissionResult, SubmissionStatus};
