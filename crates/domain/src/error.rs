//! # ドメイン層エラー定義
//!
//! 値オブジェクトの生成時に発生するエラーを表現する。
//!
//! フィードバックの正規化自体は失敗しない（欠損は既定値で埋める）ため、
//! このエラーが HTTP レスポンスに直接現れることはない。
//! 主に返信先アドレスの判定で使用される。

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がドメインの形式要件を満たさない場合に使用する。
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}
