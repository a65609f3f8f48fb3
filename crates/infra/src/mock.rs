//! # テスト用モック
//!
//! ユースケース・ハンドラのテストで使用するモック通知送信。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! parceria-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use parceria_domain::notification::{NotificationError, NotificationMessage};

use crate::notification::NotificationSender;

/// モックの振る舞い
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    /// 送信に成功する
    Succeed,
    /// 指定した理由で送信に失敗する
    Fail(String),
    /// 指定時間待ってから成功する（タイムアウトの検証用）
    Stall(Duration),
}

// ===== MockNotificationSender =====

/// 送信されたメッセージを記録するモック
///
/// `Clone` したインスタンス同士は記録を共有する。
#[derive(Clone)]
pub struct MockNotificationSender {
    behavior: Arc<Mutex<MockBehavior>>,
    sent:     Arc<Mutex<Vec<NotificationMessage>>>,
}

impl Default for MockNotificationSender {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::Succeed)
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with_behavior(MockBehavior::Fail(reason.into()))
    }

    pub fn stalling(duration: Duration) -> Self {
        Self::with_behavior(MockBehavior::Stall(duration))
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            sent:     Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 振る舞いを切り替える（失敗後の再試行の検証用）
    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// 送信に成功したメッセージ
    pub fn sent_messages(&self) -> Vec<NotificationMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, message: &NotificationMessage) -> Result<(), NotificationError> {
        let behavior = self.behavior.lock().unwrap().clone();
        match behavior {
            MockBehavior::Succeed => {}
            MockBehavior::Fail(reason) => return Err(NotificationError::SendFailed(reason)),
            MockBehavior::Stall(duration) => tokio::time::sleep(duration).await,
        }

        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use parceria_domain::notification::Mailbox;
    use pretty_assertions::assert_eq;

    use super::*;

    fn message() -> NotificationMessage {
        NotificationMessage {
            subject:  "Assunto".to_string(),
            body:     "Corpo".to_string(),
            from:     Mailbox::new("Formulário", "formulario@example.com"),
            to:       Mailbox::new("Destinatário", "comercial@example.com"),
            reply_to: None,
        }
    }

    #[tokio::test]
    async fn test_成功時はメッセージが記録される() {
        let sut = MockNotificationSender::new();

        sut.send_email(&message()).await.unwrap();

        assert_eq!(sut.sent_messages(), vec![message()]);
    }

    #[tokio::test]
    async fn test_失敗時はsend_failedを返し記録しない() {
        let sut = MockNotificationSender::failing("conexão recusada");

        let result = sut.send_email(&message()).await;

        assert_eq!(
            result,
            Err(NotificationError::SendFailed("conexão recusada".to_string()))
        );
        assert_eq!(sut.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_振る舞いを切り替えると次の送信から反映される() {
        let sut = MockNotificationSender::failing("falha");
        assert!(sut.send_email(&message()).await.is_err());

        sut.set_behavior(MockBehavior::Succeed);

        assert!(sut.send_email(&message()).await.is_ok());
        assert_eq!(sut.sent_count(), 1);
    }
}
