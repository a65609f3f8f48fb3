//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュールで re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、送信処理は usecase 層に委譲
//!
//! ## ハンドラ一覧
//!
//! - `health`: ヘルスチェック
//! - `feedback`: フィードバック受付

pub mod feedback;
pub mod health;

pub use feedback::{FeedbackState, IDEMPOTENCY_KEY_HEADER, SUCCESS_MESSAGE, submit_feedback};
pub use health::health_check;
