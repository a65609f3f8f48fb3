//! # Parceria インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **メール送信**: ドメイン層の `NotificationMessage` を SMTP で配送する
//! - **冪等性ストア**: 同じ冪等キーのフィードバックを二重送信しないための記録
//!
//! ## 依存関係
//!
//! ```text
//! apps → infra → domain
//! ```
//!
//! ドメイン層はインフラ層に依存しない（依存性逆転の原則）。
//!
//! ## モジュール構成
//!
//! - [`notification`] - `NotificationSender` トレイトと SMTP / Noop 実装
//! - [`idempotency`] - `IdempotencyStore` トレイトとインメモリ実装
//! - `mock` - テスト用モック（`test-utils` feature）

pub mod idempotency;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;

pub use idempotency::{
    ClaimOutcome,
    IdempotencyKey,
    IdempotencyKeyError,
    IdempotencyStore,
    InMemoryIdempotencyStore,
};
pub use notification::{
    NoopNotificationSender,
    NotificationSender,
    SmtpNotificationSender,
    SmtpSettings,
};
