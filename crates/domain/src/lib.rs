//! # Parceria ドメイン層
//!
//! パートナー満足度フィードバックの中核となるドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **入力は寛容に受け取る**: ワイヤ上の欠損・型不一致はエラーにせず既定値へ正規化する
//! - **値オブジェクト**: メールアドレスや評価値は Newtype で表現する
//! - **インフラ非依存**: SMTP や HTTP の詳細はこのクレートに持ち込まない
//!
//! ## 依存関係の方向
//!
//! ```text
//! apps → infra → domain
//!    ↘           ↗
//!       shared
//! ```
//!
//! ## モジュール構成
//!
//! - [`clock`] - 時刻プロバイダ（テストで固定時刻を注入する）
//! - [`error`] - ドメイン層エラー
//! - [`feedback`] - フォームの下書きと正規化済みフィードバック
//! - [`notification`] - 通知メールのメッセージと送信エラー
//! - [`value_objects`] - メールアドレス・評価値
//!
//! ## 使用例
//!
//! ```rust
//! use parceria_domain::feedback::FeedbackSubmission;
//!
//! let json = serde_json::json!({ "companyName": "Acme", "productQuality": 5 });
//! let submission = FeedbackSubmission::from_json(&json);
//!
//! assert_eq!(submission.company_name, "Acme");
//! assert_eq!(submission.contact_name, "Não informado");
//! assert_eq!(submission.product_quality.to_string(), "5 / 5");
//! ```

pub mod clock;
pub mod error;
pub mod feedback;
pub mod notification;
pub mod value_objects;

pub use error::DomainError;
