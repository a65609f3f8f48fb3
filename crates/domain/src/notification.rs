//! # 通知
//!
//! フィードバック受信時に送る通知メールのドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **送信手段から独立**: [`NotificationMessage`] は SMTP の型に依存しない
//! - **エラーは不透明**: 送信失敗の原因（認証・接続など）は区別せず
//!   [`NotificationError::SendFailed`] に理由文字列として載せる
//! - **タイムアウトを明示**: 送信の待ち時間超過は [`NotificationError::Timeout`] で表す

use std::time::Duration;

use derive_more::Display;
use thiserror::Error;

/// 通知送信エラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// メール送信に失敗
    #[error("falha ao enviar e-mail: {0}")]
    SendFailed(String),

    /// メール送信が制限時間内に完了しなかった
    #[error("tempo limite de envio de e-mail excedido ({}s)", .0.as_secs())]
    Timeout(Duration),
}

/// メールボックス（表示名付きアドレス）
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{name} <{address}>")]
pub struct Mailbox {
    /// 表示名
    pub name:    String,
    /// メールアドレス
    pub address: String,
}

impl Mailbox {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name:    name.into(),
            address: address.into(),
        }
    }
}

/// 通知メッセージ
///
/// 正規化済みフィードバックから組み立てられ、`NotificationSender` に渡される。
/// 本文はプレーンテキストのみ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    /// 件名
    pub subject:  String,
    /// プレーンテキスト本文
    pub body:     String,
    /// 送信元
    pub from:     Mailbox,
    /// 宛先
    pub to:       Mailbox,
    /// 返信先（フィードバックのメールアドレスが有効な場合のみ）
    pub reply_to: Option<Mailbox>,
}
