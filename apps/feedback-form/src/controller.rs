//! # フォームコントローラ
//!
//! 下書きの編集と送信状態を管理する。
//!
//! ## 状態遷移
//!
//! ```text
//! Editing --submit--> Submitting --成功--> Submitted（終端）
//!                         |
//!                         +--失敗--> Editing（エラーメッセージ付き）
//! ```
//!
//! - 自動再試行はしない。再試行は利用者が再度 `submit` する
//! - `Submitting` / `Submitted` での `submit` は何もしない
//! - 送信に失敗しても下書きは保持し、成功しても消さない
//! - `Submitting` は `submit` の future の中でのみ現れる。future が完了前に
//!   破棄された場合（タイムアウトや画面遷移など）はエラーなしの `Editing` に戻る
//!
//! ## 冪等キー
//!
//! 下書きに対して 1 つの冪等キーを持ち、内容が変わらない限り再試行でも同じキーを送る。
//! 項目を変更するとキーを作り直す。

use parceria_domain::feedback::{DraftField, FeedbackDraft, RatingField};
use uuid::Uuid;

use crate::client::{FeedbackClient, FeedbackResponse};

/// 2xx だが成功でなく、メッセージもない場合の表示
pub const UNKNOWN_SERVER_ERROR: &str = "Ocorreu um erro desconhecido no servidor.";

/// フォームの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    /// 編集中。直前の送信が失敗していればそのメッセージを持つ
    Editing { error: Option<String> },
    /// 送信中（送信ボタンは無効）
    Submitting,
    /// 送信完了
    Submitted,
}

/// フォームコントローラ
pub struct FormController<C> {
    client:          C,
    draft:           FeedbackDraft,
    state:           FormState,
    idempotency_key: Uuid,
}

impl<C: FeedbackClient> FormController<C> {
    /// 空の下書きで作成する
    pub fn new(client: C) -> Self {
        Self::with_draft(client, FeedbackDraft::default())
    }

    /// 既存の下書きから作成する
    pub fn with_draft(client: C, draft: FeedbackDraft) -> Self {
        Self {
            client,
            draft,
            state: FormState::Editing { error: None },
            idempotency_key: Uuid::new_v4(),
        }
    }

    pub fn draft(&self) -> &FeedbackDraft {
        &self.draft
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// 表示中のエラーメッセージ
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FormState::Editing { error } => error.as_deref(),
            FormState::Submitting | FormState::Submitted => None,
        }
    }

    /// 送信ボタンを押せるか
    pub fn can_submit(&self) -> bool {
        matches!(self.state, FormState::Editing { .. })
    }

    /// 現在の冪等キー
    pub fn idempotency_key(&self) -> String {
        self.idempotency_key.to_string()
    }

    /// 項目を更新する
    ///
    /// テキスト項目はそのまま、評価項目は整数として解釈する（解釈できなければ 0）。
    pub fn update_field(&mut self, field: DraftField, value: &str) {
        let before = self.draft.clone();
        self.draft.set(field, value);
        self.renew_key_if_changed(&before);
    }

    /// 評価項目を更新する
    pub fn set_rating(&mut self, field: RatingField, value: i64) {
        let before = self.draft.clone();
        self.draft.set_rating(field, value);
        self.renew_key_if_changed(&before);
    }

    /// 下書きを送信する
    ///
    /// 1 回の呼び出しで 1 回だけ POST する。戻り値は送信後の状態。
    pub async fn submit(&mut self) -> &FormState {
        if !self.can_submit() {
            tracing::debug!(state = ?self.state, "送信中または送信済みのため無視します");
            return &self.state;
        }

        let key = self.idempotency_key();
        let Self {
            client,
            draft,
            state,
            ..
        } = &mut *self;
        let submitting = SubmittingGuard::enter(state);

        let next = match client.submit(draft, &key).await {
            Ok(response) => next_state(&response),
            Err(e) => {
                tracing::warn!(error = %e, "フィードバックを送信できませんでした");
                FormState::Editing {
                    error: Some(e.to_string()),
                }
            }
        };
        submitting.finish(next);

        &self.state
    }

    fn renew_key_if_changed(&mut self, before: &FeedbackDraft) {
        if self.draft != *before {
            self.idempotency_key = Uuid::new_v4();
        }
    }
}

/// 送信中の状態
///
/// `finish` されないまま破棄されたら `Editing` に戻す。
struct SubmittingGuard<'a> {
    state: &'a mut FormState,
}

impl<'a> SubmittingGuard<'a> {
    fn enter(state: &'a mut FormState) -> Self {
        *state = FormState::Submitting;
        Self { state }
    }

    fn finish(self, next: FormState) {
        *self.state = next;
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if *self.state == FormState::Submitting {
            tracing::debug!("送信が中断されたため編集中に戻します");
            *self.state = FormState::Editing { error: None };
        }
    }
}

/// 応答から次の状態を決める
fn next_state(response: &FeedbackResponse) -> FormState {
    if !response.is_http_success() {
        let message = response
            .message
            .clone()
            .unwrap_or_else(|| format!("Erro na rede: {}", response.reason));
        return FormState::Editing {
            error: Some(message),
        };
    }

    if response.is_success() {
        FormState::Submitted
    } else {
        FormState::Editing {
            error: Some(
                response
                    .message
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_SERVER_ERROR.to_string()),
            ),
        }
    }
}
