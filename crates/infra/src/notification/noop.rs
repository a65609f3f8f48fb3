//! Noop 通知送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! 開発環境や通知無効化時に使用する。

use async_trait::async_trait;
use parceria_domain::notification::{NotificationError, NotificationMessage};

use super::NotificationSender;

/// Noop 通知送信（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(&self, message: &NotificationMessage) -> Result<(), NotificationError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            has_reply_to = message.reply_to.is_some(),
            "Noop: メール送信をスキップ"
        );
        tracing::debug!(body = %message.body, "Noop: メール本文");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use parceria_domain::notification::Mailbox;

    use super::*;

    #[tokio::test]
    async fn send_emailがエラーを返さない() {
        let sender = NoopNotificationSender;
        let message = NotificationMessage {
            subject:  "Assunto".to_string(),
            body:     "Corpo".to_string(),
            from:     Mailbox::new("Formulário", "formulario@example.com"),
            to:       Mailbox::new("Destinatário", "comercial@example.com"),
            reply_to: None,
        };

        let result = sender.send_email(&message).await;
        assert!(result.is_ok());
    }
}
