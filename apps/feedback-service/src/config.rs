//! # フィードバック受付サービス設定
//!
//! 環境変数からサーバー・メール送信・冪等性ストアの設定を読み込む。
//! 値の取得元を関数で差し替えられるようにし、テストではプロセスの環境変数を触らない。

use std::{env, str::FromStr, time::Duration};

use chrono::{FixedOffset, Offset, Utc};
use parceria_domain::notification::Mailbox;
use parceria_infra::SmtpSettings;
use thiserror::Error;

/// 件名の既定値
pub const DEFAULT_SUBJECT: &str = "📩 Novo Feedback - Valença Química";
/// 送信元表示名の既定値
pub const DEFAULT_FROM_NAME: &str = "Formulário Valença Química";
/// 宛先表示名の既定値
pub const DEFAULT_TO_NAME: &str = "Destinatário";

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません（.env を確認してください）")]
    Missing(&'static str),

    /// 値の形式が不正
    #[error("{name} の値が不正です（{value:?}）: {reason}")]
    Invalid {
        name:   &'static str,
        value:  String,
        reason: String,
    },
}

/// 通知送信のバックエンド
///
/// 既定は SMTP。`noop` は明示した場合のみ使う（開発用）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationBackend {
    /// SMTP で実際に送信する
    #[default]
    Smtp,
    /// ログ出力のみ
    Noop,
}

impl FromStr for NotificationBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smtp" => Ok(Self::Smtp),
            "noop" => Ok(Self::Noop),
            other => Err(format!("未知のバックエンドです: {other}（smtp / noop）")),
        }
    }
}

/// メール送信の設定
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub backend:    NotificationBackend,
    pub smtp:       SmtpSettings,
    /// 送信の待ち時間上限
    pub timeout:    Duration,
    pub from:       Mailbox,
    pub to:         Mailbox,
    pub subject:    String,
    /// 受信日時を表示するタイムゾーン
    pub utc_offset: FixedOffset,
}

/// フィードバック受付サービスの設定
#[derive(Debug, Clone)]
pub struct FeedbackConfig {
    /// バインドアドレス
    pub host:                 String,
    /// ポート番号
    pub port:                 u16,
    /// フィードバック受付パス
    pub path:                 String,
    pub mail:                 MailConfig,
    /// 冪等キーの保持期間
    pub idempotency_ttl:      Duration,
    /// 冪等キーの最大保持件数
    pub idempotency_max_keys: u64,
}

impl FeedbackConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の取得関数から設定を読み込む
    ///
    /// 空文字の値は未設定として扱う。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let path = vars.or_default("FEEDBACK_PATH", "/feedback");
        if !path.starts_with('/') {
            return Err(ConfigError::Invalid {
                name:   "FEEDBACK_PATH",
                value:  path,
                reason: "'/' で始まる必要があります".to_string(),
            });
        }

        let smtp = SmtpSettings {
            host:           vars.or_default("SMTP_HOST", "localhost"),
            port:           vars.parse_or("SMTP_PORT", 1025)?,
            username:       vars.optional("SMTP_USERNAME"),
            secret:         vars.optional("SMTP_PASSWORD"),
            use_encryption: vars.flag("SMTP_USE_ENCRYPTION")?,
        };

        let mail = MailConfig {
            backend: vars.parse_or("NOTIFICATION_BACKEND", NotificationBackend::default())?,
            smtp,
            timeout: Duration::from_secs(vars.parse_or("SMTP_TIMEOUT_SECS", 30)?),
            from: Mailbox::new(
                vars.or_default("NOTIFICATION_FROM_NAME", DEFAULT_FROM_NAME),
                vars.required("NOTIFICATION_FROM_ADDRESS")?,
            ),
            to: Mailbox::new(
                vars.or_default("NOTIFICATION_TO_NAME", DEFAULT_TO_NAME),
                vars.required("NOTIFICATION_TO_ADDRESS")?,
            ),
            subject: vars.or_default("NOTIFICATION_SUBJECT", DEFAULT_SUBJECT),
            utc_offset: vars.parse_or("NOTIFICATION_UTC_OFFSET", default_utc_offset())?,
        };

        Ok(Self {
            host: vars.or_default("FEEDBACK_HOST", "0.0.0.0"),
            port: vars.parse_required("FEEDBACK_PORT")?,
            path,
            mail,
            idempotency_ttl: Duration::from_secs(vars.parse_or("IDEMPOTENCY_TTL_SECS", 86_400)?),
            idempotency_max_keys: vars.parse_or("IDEMPOTENCY_MAX_KEYS", 10_000)?,
        })
    }
}

/// ブラジリア時間（UTC-03:00）
fn default_utc_offset() -> FixedOffset {
    FixedOffset::west_opt(3 * 3600).unwrap_or(Utc.fix())
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn parse_required<T>(&self, name: &'static str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: ToString,
    {
        let value = self.required(name)?;
        parse_value(name, value)
    }

    fn parse_or<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: ToString,
    {
        match self.optional(name) {
            Some(value) => parse_value(name, value),
            None => Ok(default),
        }
    }

    fn flag(&self, name: &'static str) -> Result<bool, ConfigError> {
        match self.optional(name) {
            None => Ok(false),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(ConfigError::Invalid {
                    name,
                    value,
                    reason: "true または false を指定してください".to_string(),
                }),
            },
        }
    }
}

fn parse_value<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    match value.trim().parse() {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<FeedbackConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        FeedbackConfig::from_lookup(|name| vars.get(name).cloned())
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("FEEDBACK_PORT", "8000"),
        ("NOTIFICATION_FROM_ADDRESS", "formulario@example.com"),
        ("NOTIFICATION_TO_ADDRESS", "comercial@example.com"),
    ];

    #[test]
    fn test_必須項目のみで既定値が適用される() {
        let config = load(&REQUIRED).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.path, "/feedback");
        assert_eq!(config.idempotency_ttl, Duration::from_secs(86_400));
        assert_eq!(config.idempotency_max_keys, 10_000);
        assert_eq!(config.mail.backend, NotificationBackend::Smtp);
        assert_eq!(config.mail.smtp.host, "localhost");
        assert_eq!(config.mail.smtp.port, 1025);
        assert!(!config.mail.smtp.use_encryption);
        assert_eq!(config.mail.smtp.username, None);
        assert_eq!(config.mail.timeout, Duration::from_secs(30));
        assert_eq!(
            config.mail.from,
            Mailbox::new(DEFAULT_FROM_NAME, "formulario@example.com")
        );
        assert_eq!(config.mail.to, Mailbox::new(DEFAULT_TO_NAME, "comercial@example.com"));
        assert_eq!(config.mail.subject, DEFAULT_SUBJECT);
        assert_eq!(config.mail.utc_offset.local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn test_smtp設定を上書きできる() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("NOTIFICATION_BACKEND", "smtp"),
            ("SMTP_HOST", "smtp.gmail.com"),
            ("SMTP_PORT", "587"),
            ("SMTP_USERNAME", "formulario@example.com"),
            ("SMTP_PASSWORD", "app-password"),
            ("SMTP_USE_ENCRYPTION", "true"),
            ("SMTP_TIMEOUT_SECS", "10"),
            ("NOTIFICATION_UTC_OFFSET", "+09:00"),
        ]);

        let config = load(&pairs).unwrap();

        assert_eq!(config.mail.backend, NotificationBackend::Smtp);
        assert_eq!(config.mail.smtp.host, "smtp.gmail.com");
        assert_eq!(config.mail.smtp.port, 587);
        assert_eq!(
            config.mail.smtp.username.as_deref(),
            Some("formulario@example.com")
        );
        assert_eq!(config.mail.smtp.secret.as_deref(), Some("app-password"));
        assert!(config.mail.smtp.use_encryption);
        assert_eq!(config.mail.timeout, Duration::from_secs(10));
        assert_eq!(config.mail.utc_offset.local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn test_noopバックエンドは明示した場合のみ使われる() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("NOTIFICATION_BACKEND", "noop"));

        assert_eq!(load(&pairs).unwrap().mail.backend, NotificationBackend::Noop);
        assert_eq!(load(&REQUIRED).unwrap().mail.backend, NotificationBackend::Smtp);
    }

    #[rstest]
    #[case("FEEDBACK_PORT")]
    #[case("NOTIFICATION_FROM_ADDRESS")]
    #[case("NOTIFICATION_TO_ADDRESS")]
    fn test_必須項目が欠けるとmissingになる(#[case] missing: &str) {
        let pairs: Vec<_> = REQUIRED
            .iter()
            .copied()
            .filter(|(k, _)| *k != missing)
            .collect();

        let result = load(&pairs);

        assert!(matches!(result, Err(ConfigError::Missing(name)) if name == missing));
    }

    #[rstest]
    #[case("FEEDBACK_PORT", "abc")]
    #[case("SMTP_PORT", "70000")]
    #[case("SMTP_USE_ENCRYPTION", "talvez")]
    #[case("NOTIFICATION_BACKEND", "sendgrid")]
    #[case("NOTIFICATION_UTC_OFFSET", "Brasília")]
    #[case("FEEDBACK_PATH", "feedback")]
    fn test_不正な値はinvalidになる(#[case] key: &str, #[case] value: &str) {
        let mut pairs: Vec<_> = REQUIRED.iter().copied().filter(|(k, _)| *k != key).collect();
        pairs.push((key, value));

        let result = load(&pairs);

        assert!(matches!(result, Err(ConfigError::Invalid { name, .. }) if name == key));
    }

    #[test]
    fn test_空文字の値は未設定として扱う() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("NOTIFICATION_SUBJECT", ""));

        let config = load(&pairs).unwrap();

        assert_eq!(config.mail.subject, DEFAULT_SUBJECT);
    }
}
