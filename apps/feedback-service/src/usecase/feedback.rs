//! # フィードバック送信ユースケース
//!
//! 正規化済みフィードバック → 通知メール組み立て → 送信 の流れを統合する。
//!
//! ## 送信の扱い
//!
//! - 送信は `tokio::spawn` したタスクで行い、`send_timeout` を超えたら
//!   [`NotificationError::Timeout`] として失敗させる
//! - 冪等キーの確保はタスクが所有する。クライアントが切断してもタスクは最後まで走り、
//!   送信できなかった場合のみキーを解放する
//! - 送信タスクのパニックは [`FeedbackError::Unexpected`] になる
//! - 冪等キーは正規化後の内容のフィンガープリントと結び付け、
//!   別の内容での再利用は [`FeedbackError::IdempotencyKeyReused`] として拒否する

use std::{sync::Arc, time::Duration};

use parceria_domain::{
    clock::Clock,
    feedback::{FeedbackSubmission, SubmissionFingerprint},
    notification::{NotificationError, NotificationMessage},
};
use parceria_infra::{ClaimOutcome, IdempotencyKey, IdempotencyStore, NotificationSender};
use parceria_shared::{event_log::event, log_business_event};

use super::NotificationComposer;
use crate::error::FeedbackError;

/// 送信結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 通知メールを送信した
    Sent,
    /// 同じ冪等キーで送信済みのため、送信せずに成功とした
    Replayed,
}

/// フィードバック送信ユースケースの実装
pub struct FeedbackUseCaseImpl {
    sender:            Arc<dyn NotificationSender>,
    composer:          NotificationComposer,
    clock:             Arc<dyn Clock>,
    idempotency_store: Arc<dyn IdempotencyStore>,
    send_timeout:      Duration,
}

impl FeedbackUseCaseImpl {
    pub fn new(
        sender: Arc<dyn NotificationSender>,
        composer: NotificationComposer,
        clock: Arc<dyn Clock>,
        idempotency_store: Arc<dyn IdempotencyStore>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            sender,
            composer,
            clock,
            idempotency_store,
            send_timeout,
        }
    }

    /// フィードバックを通知メールとして送信する
    pub async fn submit(
        &self,
        submission: FeedbackSubmission,
        idempotency_key: Option<IdempotencyKey>,
    ) -> Result<SubmitOutcome, FeedbackError> {
        let claim = match idempotency_key {
            Some(key) => match self.idempotency_store.claim(&key, submission.fingerprint()) {
                ClaimOutcome::Claimed => Some(ClaimGuard::new(
                    Arc::clone(&self.idempotency_store),
                    key,
                    submission.fingerprint(),
                )),
                ClaimOutcome::InFlight => {
                    tracing::info!(
                        idempotency_key = key.as_str(),
                        "同じ冪等キーの送信が進行中のため受け付けません"
                    );
                    return Err(FeedbackError::DuplicateInFlight);
                }
                ClaimOutcome::Reused => {
                    tracing::warn!(
                        idempotency_key = key.as_str(),
                        "冪等キーが別の内容で再利用されたため受け付けません"
                    );
                    return Err(FeedbackError::IdempotencyKeyReused);
                }
                ClaimOutcome::Delivered => {
                    log_business_event!(
                        event.category = event::category::FEEDBACK,
                        event.action = event::action::FEEDBACK_REPLAYED,
                        event.result = event::result::SUCCESS,
                        idempotency_key = key.as_str(),
                        "送信済みのフィードバックを再送せずに応答"
                    );
                    return Ok(SubmitOutcome::Replayed);
                }
            },
            None => None,
        };

        let out_of_range = submission.out_of_range_ratings();
        if !out_of_range.is_empty() {
            let fields: Vec<String> = out_of_range.iter().map(ToString::to_string).collect();
            tracing::warn!(fields = ?fields, "評価値が選択範囲外です（そのまま送信します）");
        }

        let message = self.composer.compose(&submission, self.clock.now());
        let has_reply_to = message.reply_to.is_some();

        let sender = Arc::clone(&self.sender);
        let send_timeout = self.send_timeout;
        let task = tokio::spawn(async move {
            let result = deliver(sender.as_ref(), &message, send_timeout).await;
            if result.is_ok()
                && let Some(claim) = claim
            {
                claim.complete();
            }
            result
        });

        let result = match task.await {
            Ok(result) => result.map_err(FeedbackError::from),
            Err(e) => Err(FeedbackError::Unexpected(format!(
                "a tarefa de envio foi interrompida: {e}"
            ))),
        };

        match &result {
            Ok(()) => {
                log_business_event!(
                    event.category = event::category::FEEDBACK,
                    event.action = event::action::FEEDBACK_SENT,
                    event.result = event::result::SUCCESS,
                    feedback.has_reply_to = has_reply_to,
                    "フィードバック通知メール送信成功"
                );
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::FEEDBACK,
                    event.action = event::action::FEEDBACK_FAILED,
                    event.result = event::result::FAILURE,
                    feedback.has_reply_to = has_reply_to,
                    error = %e,
                    "フィードバック通知メール送信失敗"
                );
            }
        }

        result.map(|()| SubmitOutcome::Sent)
    }
}

async fn deliver(
    sender: &dyn NotificationSender,
    message: &NotificationMessage,
    send_timeout: Duration,
) -> Result<(), NotificationError> {
    tokio::time::timeout(send_timeout, sender.send_email(message))
        .await
        .map_err(|_| NotificationError::Timeout(send_timeout))?
}

/// 確保した冪等キー
///
/// `complete` されずに drop された場合はキーを解放する。
struct ClaimGuard {
    store:       Arc<dyn IdempotencyStore>,
    key:         IdempotencyKey,
    fingerprint: SubmissionFingerprint,
    completed:   bool,
}

impl ClaimGuard {
    fn new(
        store: Arc<dyn IdempotencyStore>,
        key: IdempotencyKey,
        fingerprint: SubmissionFingerprint,
    ) -> Self {
        Self {
            store,
            key,
            fingerprint,
            completed: false,
        }
    }

    fn complete(mut self) {
        self.store.mark_delivered(&self.key, self.fingerprint);
        self.completed = true;
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        if !self.completed {
            self.store.release(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{FixedOffset, TimeZone, Utc};
    use parceria_domain::{clock::FixedClock, notification::Mailbox};
    use parceria_infra::{
        InMemoryIdempotencyStore,
        mock::{MockBehavior, MockNotificationSender},
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    struct PanickingSender;

    #[async_trait]
    impl NotificationSender for PanickingSender {
        async fn send_email(&self, _message: &NotificationMessage) -> Result<(), NotificationError> {
            panic!("transporte quebrado");
        }
    }

    fn composer() -> NotificationComposer {
        NotificationComposer::new(
            "📩 Novo Feedback - Valença Química",
            Mailbox::new("Formulário Valença Química", "formulario@example.com"),
            Mailbox::new("Destinatário", "comercial@example.com"),
            FixedOffset::west_opt(3 * 3600).unwrap(),
        )
    }

    fn sut_with(
        sender: Arc<dyn NotificationSender>,
        store: Arc<InMemoryIdempotencyStore>,
        send_timeout: Duration,
    ) -> FeedbackUseCaseImpl {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 19, 17, 30, 0).unwrap());
        FeedbackUseCaseImpl::new(sender, composer(), Arc::new(clock), store, send_timeout)
    }

    fn store() -> Arc<InMemoryIdempotencyStore> {
        Arc::new(InMemoryIdempotencyStore::new(Duration::from_secs(60), 1_000))
    }

    fn key(value: &str) -> Option<IdempotencyKey> {
        Some(IdempotencyKey::parse(value).unwrap())
    }

    fn submission() -> FeedbackSubmission {
        FeedbackSubmission::from_json(&json!({
            "companyName": "ACME Ltda",
            "contactName": "Maria",
            "email": "maria@acme.com.br",
            "productQuality": 5
        }))
    }

    #[tokio::test]
    async fn test_送信に成功するとsentを返しメールが1通送られる() {
        let sender = MockNotificationSender::new();
        let sut = sut_with(Arc::new(sender.clone()), store(), Duration::from_secs(5));

        let outcome = sut.submit(submission(), None).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Sent);
        let sent = sender.sent_messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.starts_with("Novo feedback recebido em 19/10/2026 14:30:00:\n"));
        assert_eq!(
            sent[0].reply_to,
            Some(Mailbox::new("Maria", "maria@acme.com.br"))
        );
    }

    #[tokio::test]
    async fn test_送信失敗はdeliveryエラーになる() {
        let sender = MockNotificationSender::failing("535 autenticação falhou");
        let sut = sut_with(Arc::new(sender), store(), Duration::from_secs(5));

        let result = sut.submit(submission(), None).await;

        assert!(matches!(
            result,
            Err(FeedbackError::Delivery(NotificationError::SendFailed(reason))) if reason == "535 autenticação falhou"
        ));
    }

    #[tokio::test]
    async fn test_送信が制限時間を超えるとtimeoutになる() {
        let sender = MockNotificationSender::stalling(Duration::from_secs(5));
        let sut = sut_with(Arc::new(sender.clone()), store(), Duration::from_millis(50));

        let result = sut.submit(submission(), None).await;

        assert!(matches!(
            result,
            Err(FeedbackError::Delivery(NotificationError::Timeout(d))) if d == Duration::from_millis(50)
        ));
        assert_eq!(sender.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_送信タスクのパニックはunexpectedになりキーは解放される() {
        let store = store();
        let sut = sut_with(Arc::new(PanickingSender), store.clone(), Duration::from_secs(5));

        let result = sut.submit(submission(), key("k1")).await;

        assert!(matches!(result, Err(FeedbackError::Unexpected(_))));
        assert_eq!(
            store.claim(&IdempotencyKey::parse("k1").unwrap(), submission().fingerprint()),
            ClaimOutcome::Claimed
        );
    }

    #[tokio::test]
    async fn test_送信済みの冪等キーは再送せずreplayedを返す() {
        let sender = MockNotificationSender::new();
        let sut = sut_with(Arc::new(sender.clone()), store(), Duration::from_secs(5));

        let first = sut.submit(submission(), key("k1")).await.unwrap();
        let second = sut.submit(submission(), key("k1")).await.unwrap();

        assert_eq!(first, SubmitOutcome::Sent);
        assert_eq!(second, SubmitOutcome::Replayed);
        assert_eq!(sender.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_送信済みの冪等キーを別の内容で使うと拒否され送信されない() {
        let sender = MockNotificationSender::new();
        let sut = sut_with(Arc::new(sender.clone()), store(), Duration::from_secs(5));
        let edited = FeedbackSubmission::from_json(&json!({ "companyName": "Outra Empresa" }));

        sut.submit(submission(), key("k1")).await.unwrap();
        let result = sut.submit(edited, key("k1")).await;

        assert!(matches!(result, Err(FeedbackError::IdempotencyKeyReused)));
        assert_eq!(sender.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_進行中の冪等キーはduplicate_in_flightになる() {
        let store = store();
        store.claim(&IdempotencyKey::parse("k1").unwrap(), submission().fingerprint());
        let sender = MockNotificationSender::new();
        let sut = sut_with(Arc::new(sender.clone()), store, Duration::from_secs(5));

        let result = sut.submit(submission(), key("k1")).await;

        assert!(matches!(result, Err(FeedbackError::DuplicateInFlight)));
        assert_eq!(sender.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_送信失敗した冪等キーは再試行で送信できる() {
        let sender = MockNotificationSender::failing("conexão recusada");
        let sut = sut_with(Arc::new(sender.clone()), store(), Duration::from_secs(5));

        assert!(sut.submit(submission(), key("k1")).await.is_err());

        sender.set_behavior(MockBehavior::Succeed);
        let outcome = sut.submit(submission(), key("k1")).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Sent);
        assert_eq!(sender.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_冪等キーなしでは毎回送信される() {
        let sender = MockNotificationSender::new();
        let sut = sut_with(Arc::new(sender.clone()), store(), Duration::from_secs(5));

        sut.submit(submission(), None).await.unwrap();
        sut.submit(submission(), None).await.unwrap();

        assert_eq!(sender.sent_count(), 2);
    }

    #[tokio::test]
    async fn test_範囲外の評価値でも送信される() {
        let sender = MockNotificationSender::new();
        let sut = sut_with(Arc::new(sender.clone()), store(), Duration::from_secs(5));
        let submission = FeedbackSubmission::from_json(&json!({ "productQuality": 9 }));

        let outcome = sut.submit(submission, None).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Sent);
        assert!(sender.sent_messages()[0]
            .body
            .contains("- Qualidade dos produtos: 9 / 5\n"));
    }
}
