//! # 送信結果レスポンス
//!
//! フィードバック送信エンドポイントの統一レスポンス形式
//! `{ "status": "success" | "error", "message": "..." }` を提供する。
//!
//! この型は以下の場所で使用される:
//! - feedback-service ハンドラ（Serialize でレスポンスを返す）
//! - feedback-service のテスト（Deserialize でレスポンスを検証する）
//!
//! feedback-form クライアントはこの型を使わない。項目の欠落や型違いを
//! 許容するため、同じキー名で `serde_json::Value` から読み取る。

use serde::{Deserialize, Serialize};

/// 送信結果の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Success,
    Error,
}

/// 送信結果
///
/// ## 使用例
///
/// ```
/// use parceria_shared::{SubmissionResult, SubmissionStatus};
///
/// let result = SubmissionResult::success("Feedback enviado com sucesso!");
/// assert_eq!(result.status, SubmissionStatus::Success);
/// assert!(result.is_success());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub status:  SubmissionStatus,
    pub message: String,
}

impl SubmissionResult {
    /// 成功レスポンスを作成する
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status:  SubmissionStatus::Success,
            message: message.into(),
        }
    }

    /// エラーレスポンスを作成する
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status:  SubmissionStatus::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SubmissionStatus::Success
    }
}
