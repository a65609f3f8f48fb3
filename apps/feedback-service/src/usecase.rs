//! # ユースケース層
//!
//! フィードバック受付サービスのビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **トレイトベースの設計**: ハンドラのテストでスタブに差し替えられるようトレイトを定義
//! - **依存性注入**: メール送信・時刻・冪等性ストアを外部から注入
//! - **薄いハンドラ**: ハンドラはリクエストの検証のみ行い、送信処理はユースケースに集約

pub mod composer;
pub mod feedback;

use async_trait::async_trait;
pub use composer::NotificationComposer;
pub use feedback::{FeedbackUseCaseImpl, SubmitOutcome};
use parceria_domain::feedback::FeedbackSubmission;
use parceria_infra::IdempotencyKey;

use crate::error::FeedbackError;

/// フィードバック送信ユースケーストレイト
#[async_trait]
pub trait FeedbackUseCase: Send + Sync {
    /// 正規化済みフィードバックを通知メールとして送信する
    ///
    /// 冪等キーが指定された場合、同じキーでの二重送信を防ぐ。
    async fn submit(
        &self,
        submission: FeedbackSubmission,
        idempotency_key: Option<IdempotencyKey>,
    ) -> Result<SubmitOutcome, FeedbackError>;
}

#[async_trait]
impl FeedbackUseCase for FeedbackUseCaseImpl {
    async fn submit(
        &self,
        submission: FeedbackSubmission,
        idempotency_key: Option<IdempotencyKey>,
    ) -> Result<SubmitOutcome, FeedbackError> {
        self.submit(submission, idempotency_key).await
    }
}
