//! # フィードバック
//!
//! パートナー満足度フォームの入力値を表現する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 生成元 |
//! |---|------------|--------|
//! | [`FeedbackDraft`] | 下書き（フォームの入力途中の状態） | フォームコントローラ |
//! | [`FeedbackSubmission`] | 正規化済みフィードバック | フィードバックエンドポイント |
//! | [`DraftField`] | フォーム項目（ワイヤ上のキー） | - |
//! | [`RatingField`] | 評価項目 | - |
//!
//! ## 正規化ルール
//!
//! - すべての項目はワイヤ上で任意。欠損・`null`・空文字（空白のみを含む）は既定値に置き換える
//! - 空でないテキストは加工せずそのまま保持する
//! - テキスト項目の数値・真偽値は JSON 表記の文字列として扱う
//! - 評価項目は整数・小数（0 方向へ切り捨て）・数値文字列を受け付け、それ以外は 0
//! - 評価値の範囲は強制しない
//! - オブジェクト以外の JSON はすべて既定値として扱い、未知のキーは無視する

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

use crate::value_objects::{Email, NpsScore, StarRating};

/// 未入力のテキスト項目（会社名・担当者・メール・電話）の既定値
pub const NOT_INFORMED: &str = "Não informado";

/// 未入力の「製品・供給に関する所見」の既定値
pub const NO_OBSERVATIONS: &str = "Nenhuma";

/// 未入力の「パートナーシップ全般へのフィードバック」の既定値
pub const NO_GENERAL_FEEDBACK: &str = "Nenhum";

/// フォーム項目
///
/// 文字列表現はワイヤ上の JSON キー（camelCase）と一致する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumString, EnumIter, strum::Display)]
#[strum(serialize_all = "camelCase")]
pub enum DraftField {
    CompanyName,
    ContactName,
    Email,
    Phone,
    ProductQuality,
    ProductVariety,
    DeliveryEfficiency,
    Packaging,
    Recommendation,
    CommercialSupport,
    Observations,
    GeneralFeedback,
}

impl DraftField {
    /// 評価項目であれば対応する [`RatingField`] を返す
    pub fn as_rating(self) -> Option<RatingField> {
        match self {
            Self::ProductQuality => Some(RatingField::ProductQuality),
            Self::ProductVariety => Some(RatingField::ProductVariety),
            Self::DeliveryEfficiency => Some(RatingField::DeliveryEfficiency),
            Self::Packaging => Some(RatingField::Packaging),
            Self::CommercialSupport => Some(RatingField::CommercialSupport),
            Self::Recommendation => Some(RatingField::Recommendation),
            Self::CompanyName
            | Self::ContactName
            | Self::Email
            | Self::Phone
            | Self::Observations
            | Self::GeneralFeedback => None,
        }
    }
}

/// 評価項目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter, strum::Display)]
#[strum(serialize_all = "camelCase")]
pub enum RatingField {
    ProductQuality,
    ProductVariety,
    DeliveryEfficiency,
    Packaging,
    CommercialSupport,
    Recommendation,
}

/// フォームの下書き
///
/// フォームコントローラがメモリ上に保持する入力状態。
/// 送信時はこの構造体がそのまま JSON ボディになる。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackDraft {
    pub company_name:        String,
    pub contact_name:        String,
    pub email:               String,
    pub phone:               String,
    pub product_quality:     i64,
    pub product_variety:     i64,
    pub delivery_efficiency: i64,
    pub packaging:           i64,
    pub recommendation:      i64,
    pub commercial_support:  i64,
    pub observations:        String,
    pub general_feedback:    String,
}

impl FeedbackDraft {
    /// 1 項目を更新する
    ///
    /// テキスト項目は値をそのまま保持する。評価項目は整数へ変換し、
    /// 変換できない値は 0 とする。失敗することはない。
    pub fn set(&mut self, field: DraftField, value: &str) {
        if let Some(rating) = field.as_rating() {
            self.set_rating(rating, value.trim().parse().unwrap_or(0));
            return;
        }

        let slot = match field {
            DraftField::CompanyName => &mut self.company_name,
            DraftField::ContactName => &mut self.contact_name,
            DraftField::Email => &mut self.email,
            DraftField::Phone => &mut self.phone,
            DraftField::Observations => &mut self.observations,
            DraftField::GeneralFeedback => &mut self.general_feedback,
            _ => return,
        };
        *slot = value.to_string();
    }

    /// 評価項目を更新する
    pub fn set_rating(&mut self, field: RatingField, value: i64) {
        let slot = match field {
            RatingField::ProductQuality => &mut self.product_quality,
            RatingField::ProductVariety => &mut self.product_variety,
            RatingField::DeliveryEfficiency => &mut self.delivery_efficiency,
            RatingField::Packaging => &mut self.packaging,
            RatingField::CommercialSupport => &mut self.commercial_support,
            RatingField::Recommendation => &mut self.recommendation,
        };
        *slot = value;
    }

    /// 評価項目の現在値を返す
    pub fn rating(&self, field: RatingField) -> i64 {
        match field {
            RatingField::ProductQuality => self.product_quality,
            RatingField::ProductVariety => self.product_variety,
            RatingField::DeliveryEfficiency => self.delivery_efficiency,
            RatingField::Packaging => self.packaging,
            RatingField::CommercialSupport => self.commercial_support,
            RatingField::Recommendation => self.recommendation,
        }
    }
}

/// 正規化済みフィードバック
///
/// すべての項目が値を持つ（欠損は既定値で埋められている）。
/// リクエストごとに 1 つ生成され、通知メールの組み立てに一度だけ使われる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSubmission {
    pub company_name:        String,
    pub contact_name:        String,
    pub email:               String,
    pub phone:               String,
    pub product_quality:     StarRating,
    pub product_variety:     StarRating,
    pub delivery_efficiency: StarRating,
    pub packaging:           StarRating,
    pub commercial_support:  StarRating,
    pub recommendation:      NpsScore,
    pub observations:        String,
    pub general_feedback:    String,
}

impl FeedbackSubmission {
    /// 受信した JSON を正規化する
    ///
    /// 失敗しない。オブジェクト以外の JSON は全項目既定値になる。
    pub fn from_json(value: &Value) -> Self {
        let object = value.as_object();

        Self {
            company_name:        text_field(object, DraftField::CompanyName, NOT_INFORMED),
            contact_name:        text_field(object, DraftField::ContactName, NOT_INFORMED),
            email:               text_field(object, DraftField::Email, NOT_INFORMED),
            phone:               text_field(object, DraftField::Phone, NOT_INFORMED),
            product_quality:     StarRating::new(integer_field(object, DraftField::ProductQuality)),
            product_variety:     StarRating::new(integer_field(object, DraftField::ProductVariety)),
            delivery_efficiency: StarRating::new(integer_field(
                object,
                DraftField::DeliveryEfficiency,
            )),
            packaging:           StarRating::new(integer_field(object, DraftField::Packaging)),
            commercial_support:  StarRating::new(integer_field(
                object,
                DraftField::CommercialSupport,
            )),
            recommendation:      NpsScore::new(integer_field(object, DraftField::Recommendation)),
            observations:        text_field(object, DraftField::Observations, NO_OBSERVATIONS),
            general_feedback:    text_field(
                object,
                DraftField::GeneralFeedback,
                NO_GENERAL_FEEDBACK,
            ),
        }
    }

    /// 返信先として使えるメールアドレス
    ///
    /// 入力されたメールアドレスが形式チェックを通過した場合のみ `Some`。
    pub fn reply_to_email(&self) -> Option<Email> {
        Email::new(self.email.as_str()).ok()
    }

    /// 評価項目の値を返す
    pub fn rating(&self, field: RatingField) -> i64 {
        match field {
            RatingField::ProductQuality => self.product_quality.value(),
            RatingField::ProductVariety => self.product_variety.value(),
            RatingField::DeliveryEfficiency => self.delivery_efficiency.value(),
            RatingField::Packaging => self.packaging.value(),
            RatingField::CommercialSupport => self.commercial_support.value(),
            RatingField::Recommendation => self.recommendation.value(),
        }
    }

    /// 評価項目が画面上の選択範囲に収まっているか
    pub fn is_rating_in_range(&self, field: RatingField) -> bool {
        match field {
            RatingField::ProductQuality => self.product_quality.is_in_range(),
            RatingField::ProductVariety => self.product_variety.is_in_range(),
            RatingField::DeliveryEfficiency => self.delivery_efficiency.is_in_range(),
            RatingField::Packaging => self.packaging.is_in_range(),
            RatingField::CommercialSupport => self.commercial_support.is_in_range(),
            RatingField::Recommendation => self.recommendation.is_in_range(),
        }
    }

    /// 画面上の選択範囲を外れた評価項目
    pub fn out_of_range_ratings(&self) -> Vec<RatingField> {
        RatingField::iter()
            .filter(|field| !self.is_rating_in_range(*field))
            .collect()
    }

    /// 内容のフィンガープリント
    ///
    /// 正規化後の全項目から SHA-256 を計算する。同じ内容なら同じ値になる。
    pub fn fingerprint(&self) -> SubmissionFingerprint {
        let mut hasher = Sha256::new();
        for text in [
            &self.company_name,
            &self.contact_name,
            &self.email,
            &self.phone,
            &self.observations,
            &self.general_feedback,
        ] {
            hasher.update((text.len() as u64).to_le_bytes());
            hasher.update(text.as_bytes());
        }
        for field in RatingField::iter() {
            hasher.update(self.rating(field).to_le_bytes());
        }
        SubmissionFingerprint(hasher.finalize().into())
    }
}

/// 正規化済みフィードバックのフィンガープリント（SHA-256）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionFingerprint([u8; 32]);

impl Default for FeedbackSubmission {
    fn default() -> Self {
        Self::from_json(&Value::Null)
    }
}

fn text_field(object: Option<&Map<String, Value>>, field: DraftField, default: &str) -> String {
    match object.and_then(|o| o.get(field.as_ref())) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => default.to_string(),
    }
}

fn integer_field(object: Option<&Map<String, Value>>, field: DraftField) -> i64 {
    match object.and_then(|o| o.get(field.as_ref())) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
