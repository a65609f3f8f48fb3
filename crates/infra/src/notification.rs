//! # 通知送信
//!
//! 通知メールの送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **2 つの実装**: SMTP（本番・Mailpit）、Noop（ログ出力のみ）
//! - **環境変数切替**: `NOTIFICATION_BACKEND` でランタイム選択
//! - **タイムアウトは呼び出し側**: 送信の待ち時間上限はユースケース層で `tokio::time::timeout` を掛ける

mod noop;
mod smtp;

use async_trait::async_trait;
pub use noop::NoopNotificationSender;
use parceria_domain::notification::{NotificationError, NotificationMessage};
pub use smtp::{SmtpNotificationSender, SmtpSettings};

/// メール送信トレイト
///
/// 送信の具体的な方法を抽象化する。失敗の原因は区別せず
/// `NotificationError::SendFailed` として返す。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    async fn send_email(&self, message: &NotificationMessage) -> Result<(), NotificationError>;
}
