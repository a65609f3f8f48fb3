//! # 値オブジェクト
//!
//! フィードバックで扱う小さな値型を定義する。
//!
//! | 型 | 用途 | 範囲 |
//! |---|------|------|
//! | [`Email`] | 返信先（Reply-To）に使えるメールアドレス | RFC 5322 の一般的な形式 |
//! | [`StarRating`] | 星評価 | 画面上は 0〜5 |
//! | [`NpsScore`] | 推奨度（NPS） | 画面上は 0〜10 |
//!
//! 評価値はサーバー側で範囲を強制しない。範囲外の値もそのまま通知に載せ、
//! 判定は [`StarRating::is_in_range`] / [`NpsScore::is_in_range`] で呼び出し側が行う。

use std::sync::LazyLock;

use derive_more::Display;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// メールアドレスの形式
///
/// ローカル部はドット区切りの atext、ドメイン部は 2 つ以上のラベルを要求する。
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?$",
    )
    .expect("メールアドレスの正規表現が不正です")
});

/// ローカル部の最大長
const MAX_LOCAL_PART_LENGTH: usize = 64;

/// アドレス全体の最大長
const MAX_EMAIL_LENGTH: usize = 254;

/// メールアドレス（値オブジェクト）
///
/// 生成時に形式を検証するため、この型の値は常に Reply-To に設定できる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - 全体 254 文字以内、ローカル部 64 文字以内
    /// - `local@domain.tld` の形式
    ///
    /// 前後の空白は許容しない（フォーム入力をそのまま判定する）。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスは必須です".to_string(),
            ));
        }

        if value.len() > MAX_EMAIL_LENGTH {
            return Err(DomainError::Validation(format!(
                "メールアドレスは {MAX_EMAIL_LENGTH} 文字以内である必要があります"
            )));
        }

        let Some((local, _)) = value.rsplit_once('@') else {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        };

        if local.len() > MAX_LOCAL_PART_LENGTH || !EMAIL_PATTERN.is_match(&value) {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 星評価（0〜5 を想定）
///
/// 表示形式は `"{値} / 5"`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[display("{_0} / 5")]
pub struct StarRating(i64);

impl StarRating {
    pub const MAX: i64 = 5;

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// 画面で選択可能な範囲（0〜5）に収まっているか
    pub fn is_in_range(&self) -> bool {
        (0..=Self::MAX).contains(&self.0)
    }
}

/// 推奨度スコア（NPS、0〜10 を想定）
///
/// 表示形式は `"{値} / 10"`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[display("{_0} / 10")]
pub struct NpsScore(i64);

impl NpsScore {
    pub const MAX: i64 = 10;

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// 画面で選択可能な範囲（0〜10）に収まっているか
    pub fn is_in_range(&self) -> bool {
        (0..=Self::MAX).contains(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("user@example.com")]
    #[case("joao.silva@empresa.com.br")]
    #[case("compras+feedback@valenca-quimica.com.br")]
    fn test_メールアドレスは正常な形式を受け入れる(#[case] input: &str) {
        let email = Email::new(input).unwrap();
        assert_eq!(email.as_str(), input);
    }

    #[rstest]
    #[case("", "空文字列")]
    #[case("Não informado", "既定値の文字列")]
    #[case("no-at-sign", "@記号なし")]
    #[case("@example.com", "ローカル部分が空")]
    #[case("user@", "ドメイン部分が空")]
    #[case("user@localhost", "ドメインにドットがない")]
    #[case("user..name@example.com", "連続したドット")]
    #[case(".user@example.com", "先頭のドット")]
    #[case("user@exa mple.com", "空白を含む")]
    #[case(" user@example.com", "前方の空白")]
    #[case("user@-example.com", "ハイフンで始まるラベル")]
    fn test_メールアドレスは不正な形式を拒否する(#[case] input: &str, #[case] _reason: &str) {
        assert!(Email::new(input).is_err());
    }

    #[test]
    fn test_メールアドレスは長すぎるローカル部を拒否する() {
        let input = format!("{}@example.com", "a".repeat(65));
        assert!(Email::new(input).is_err());
    }

    #[test]
    fn test_星評価の表示形式() {
        assert_eq!(StarRating::new(5).to_string(), "5 / 5");
        assert_eq!(StarRating::default().to_string(), "0 / 5");
    }

    #[test]
    fn test_npsの表示形式() {
        assert_eq!(NpsScore::new(10).to_string(), "10 / 10");
        assert_eq!(NpsScore::new(7).to_string(), "7 / 10");
    }

    #[rstest]
    #[case(0, true)]
    #[case(5, true)]
    #[case(6, false)]
    #[case(-1, false)]
    fn test_星評価の範囲判定(#[case] value: i64, #[case] expected: bool) {
        assert_eq!(StarRating::new(value).is_in_range(), expected);
    }

    #[rstest]
    #[case(0, true)]
    #[case(10, true)]
    #[case(11, false)]
    #[case(-3, false)]
    fn test_npsの範囲判定(#[case] value: i64, #[case] expected: bool) {
        assert_eq!(NpsScore::new(value).is_in_range(), expected);
    }
}
