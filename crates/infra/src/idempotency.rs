//! # 冪等性ストア
//!
//! `Idempotency-Key` ヘッダー付きのフィードバック送信を記録し、
//! 同じキーでの再送信がメールを二重に送らないようにする。
//!
//! ## キーの状態遷移
//!
//! ```text
//! (なし) --claim--> InFlight --mark_delivered--> Delivered --TTL 経過--> (なし)
//!                      |
//!                      +--release--> (なし)
//! ```
//!
//! 送信失敗時は `release` でキーを解放し、クライアントの再試行で再送できるようにする。
//! キーには内容のフィンガープリントを結び付け、別の内容での再利用は
//! [`ClaimOutcome::Reused`] として拒否する。

use std::time::Duration;

use moka::{ops::compute::Op, sync::Cache};
use parceria_domain::feedback::SubmissionFingerprint;
use thiserror::Error;

/// 冪等キーの最大長
const MAX_KEY_LENGTH: usize = 255;

/// 冪等キーのパースエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdempotencyKeyError {
    #[error("冪等キーが空です")]
    Empty,

    #[error("冪等キーは{MAX_KEY_LENGTH}文字以内である必要があります")]
    TooLong,

    #[error("冪等キーに使用できない文字が含まれています")]
    InvalidCharacter,
}

/// 冪等キー
///
/// クライアントが生成する任意の識別子（通常は UUID）。
/// 空でない、255 文字以内の可視 ASCII 文字列のみ受け付ける。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn parse(value: &str) -> Result<Self, IdempotencyKeyError> {
        if value.is_empty() {
            return Err(IdempotencyKeyError::Empty);
        }
        if value.len() > MAX_KEY_LENGTH {
            return Err(IdempotencyKeyError::TooLong);
        }
        if !value.chars().all(|c| c.is_ascii_graphic()) {
            return Err(IdempotencyKeyError::InvalidCharacter);
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `claim` の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// 新規に確保した。呼び出し側が送信を行う
    Claimed,
    /// 同じキーの送信が進行中
    InFlight,
    /// 同じキーの送信が完了済み
    Delivered,
    /// 同じキーが別の内容で使用されている
    Reused,
}

/// 冪等性ストアトレイト
pub trait IdempotencyStore: Send + Sync {
    /// キーを確保する
    ///
    /// 未使用（または期限切れ）のキーなら `InFlight` として記録し `Claimed` を返す。
    /// 記録済みのキーでフィンガープリントが異なる場合は `Reused` を返す。
    fn claim(&self, key: &IdempotencyKey, fingerprint: SubmissionFingerprint) -> ClaimOutcome;

    /// 送信完了を記録する。以後 TTL の間、同じキーは `Delivered` になる
    fn mark_delivered(&self, key: &IdempotencyKey, fingerprint: SubmissionFingerprint);

    /// 進行中のキーを解放する。完了済みのキーには影響しない
    fn release(&self, key: &IdempotencyKey);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryState {
    InFlight,
    Delivered,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    state:       EntryState,
    fingerprint: SubmissionFingerprint,
}

/// インメモリ冪等性ストア
///
/// moka のキャッシュに保持する。エントリは最後の書き込みから TTL で失効し、
/// 件数が `max_keys` を超えると使用頻度の低いものから追い出される。
/// 追い出されたキーは未使用として扱う。
pub struct InMemoryIdempotencyStore {
    entries: Cache<IdempotencyKey, Entry>,
}

impl InMemoryIdempotencyStore {
    pub fn new(ttl: Duration, max_keys: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_keys)
            .time_to_live(ttl)
            .build();

        Self { entries }
    }

    /// 保持しているエントリ数
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdempotencyStore for InMemoryIdempotencyStore {
    fn claim(&self, key: &IdempotencyKey, fingerprint: SubmissionFingerprint) -> ClaimOutcome {
        let entry = self.entries.entry(key.clone()).or_insert_with(|| Entry {
            state: EntryState::InFlight,
            fingerprint,
        });
        if entry.is_fresh() {
            return ClaimOutcome::Claimed;
        }

        let existing = entry.into_value();
        if existing.fingerprint != fingerprint {
            return ClaimOutcome::Reused;
        }
        match existing.state {
            EntryState::InFlight => ClaimOutcome::InFlight,
            EntryState::Delivered => ClaimOutcome::Delivered,
        }
    }

    fn mark_delivered(&self, key: &IdempotencyKey, fingerprint: SubmissionFingerprint) {
        self.entries.insert(
            key.clone(),
            Entry {
                state: EntryState::Delivered,
                fingerprint,
            },
        );
    }

    fn release(&self, key: &IdempotencyKey) {
        self.entries
            .entry(key.clone())
            .and_compute_with(|current| match current {
                Some(entry) if entry.value().state == EntryState::InFlight => Op::Remove,
                _ => Op::Nop,
            });
    }
}

#[cfg(test)]
mod tests {
    use parceria_domain::feedback::FeedbackSubmission;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn key(value: &str) -> IdempotencyKey {
        IdempotencyKey::parse(value).unwrap()
    }

    fn store() -> InMemoryIdempotencyStore {
        InMemoryIdempotencyStore::new(Duration::from_secs(60), 1_000)
    }

    fn fingerprint(company: &str) -> SubmissionFingerprint {
        FeedbackSubmission::from_json(&json!({ "companyName": company })).fingerprint()
    }

    #[test]
    fn test_uuid形式のキーを受け付ける() {
        let key = IdempotencyKey::parse("0192f3a4-7b1c-7d2e-8f90-123456789abc").unwrap();
        assert_eq!(key.as_str(), "0192f3a4-7b1c-7d2e-8f90-123456789abc");
    }

    #[rstest]
    #[case("", IdempotencyKeyError::Empty)]
    #[case("chave com espaço", IdempotencyKeyError::InvalidCharacter)]
    #[case("chave-ç", IdempotencyKeyError::InvalidCharacter)]
    fn test_不正なキーは拒否される(#[case] input: &str, #[case] expected: IdempotencyKeyError) {
        assert_eq!(IdempotencyKey::parse(input), Err(expected));
    }

    #[test]
    fn test_256文字のキーは拒否される() {
        let input = "a".repeat(256);
        assert_eq!(IdempotencyKey::parse(&input), Err(IdempotencyKeyError::TooLong));
        assert!(IdempotencyKey::parse(&"a".repeat(255)).is_ok());
    }

    #[test]
    fn test_未使用のキーはclaimedになる() {
        let sut = store();
        assert_eq!(sut.claim(&key("k1"), fingerprint("Acme")), ClaimOutcome::Claimed);
    }

    #[test]
    fn test_進行中のキーはin_flightになる() {
        let sut = store();
        sut.claim(&key("k1"), fingerprint("Acme"));

        assert_eq!(sut.claim(&key("k1"), fingerprint("Acme")), ClaimOutcome::InFlight);
    }

    #[test]
    fn test_送信完了したキーはdeliveredになる() {
        let sut = store();
        sut.claim(&key("k1"), fingerprint("Acme"));
        sut.mark_delivered(&key("k1"), fingerprint("Acme"));

        assert_eq!(sut.claim(&key("k1"), fingerprint("Acme")), ClaimOutcome::Delivered);
    }

    #[rstest]
    #[case::進行中(false)]
    #[case::送信済み(true)]
    fn test_別の内容で使われたキーはreusedになる(#[case] delivered: bool) {
        let sut = store();
        sut.claim(&key("k1"), fingerprint("Acme"));
        if delivered {
            sut.mark_delivered(&key("k1"), fingerprint("Acme"));
        }

        assert_eq!(sut.claim(&key("k1"), fingerprint("Outra")), ClaimOutcome::Reused);
        assert_eq!(
            sut.claim(&key("k1"), fingerprint("Acme")),
            if delivered { ClaimOutcome::Delivered } else { ClaimOutcome::InFlight }
        );
    }

    #[test]
    fn test_解放したキーは再度claimできる() {
        let sut = store();
        sut.claim(&key("k1"), fingerprint("Acme"));
        sut.release(&key("k1"));

        assert_eq!(sut.claim(&key("k1"), fingerprint("Outra")), ClaimOutcome::Claimed);
    }

    #[test]
    fn test_送信完了したキーはreleaseしても残る() {
        let sut = store();
        sut.claim(&key("k1"), fingerprint("Acme"));
        sut.mark_delivered(&key("k1"), fingerprint("Acme"));
        sut.release(&key("k1"));

        assert_eq!(sut.claim(&key("k1"), fingerprint("Acme")), ClaimOutcome::Delivered);
    }

    #[test]
    fn test_異なるキーは互いに影響しない() {
        let sut = store();
        sut.claim(&key("k1"), fingerprint("Acme"));

        assert_eq!(sut.claim(&key("k2"), fingerprint("Acme")), ClaimOutcome::Claimed);
        assert_eq!(sut.len(), 2);
    }

    #[test]
    fn test_期限切れのキーは再度claimできる() {
        let sut = InMemoryIdempotencyStore::new(Duration::from_millis(50), 1_000);
        sut.claim(&key("k1"), fingerprint("Acme"));
        sut.mark_delivered(&key("k1"), fingerprint("Acme"));

        std::thread::sleep(Duration::from_millis(120));

        assert_eq!(sut.claim(&key("k1"), fingerprint("Acme")), ClaimOutcome::Claimed);
    }

    #[test]
    fn test_保持件数は上限を超えない() {
        let sut = InMemoryIdempotencyStore::new(Duration::from_secs(60), 10);

        for i in 0..100 {
            sut.claim(&key(&format!("k{i}")), fingerprint("Acme"));
        }

        assert!(sut.len() <= 10, "len = {}", sut.len());
    }
}
