//! # フィードバックフォーム クライアント
//!
//! パートナー満足度フォームの入力状態を保持し、フィードバック受付サービスへ送信する。
//! 画面描画は扱わず、画面側は [`FormController`] の状態を表示するだけにする。
//!
//! ## モジュール構成
//!
//! - `client`: フィードバック受付サービスへの HTTP クライアント
//! - `controller`: 下書きと送信状態（編集中 → 送信中 → 送信完了）の管理
//!
//! ## 使用例
//!
//! ```no_run
//! use parceria_domain::feedback::{DraftField, RatingField};
//! use parceria_feedback_form::{FeedbackClientImpl, FormController, FormState};
//!
//! # async fn run() {
//! let client = FeedbackClientImpl::new("http://localhost:8000/feedback");
//! let mut form = FormController::new(client);
//!
//! form.update_field(DraftField::CompanyName, "ACME Ltda");
//! form.set_rating(RatingField::ProductQuality, 5);
//!
//! match form.submit().await {
//!     FormState::Submitted => println!("Obrigado!"),
//!     FormState::Editing { error: Some(message) } => eprintln!("{message}"),
//!     _ => {}
//! }
//! # }
//! ```

pub mod client;
pub mod controller;

pub use client::{FeedbackClient, FeedbackClientError, FeedbackClientImpl, FeedbackResponse};
pub use controller::{FormController, FormState};
