//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! `use_encryption` が有効なら STARTTLS で接続し、無効なら平文で接続する
//! （開発環境の Mailpit 向け）。

use async_trait::async_trait;
use lettre::{
    Address,
    AsyncSmtpTransport,
    AsyncTransport,
    Message,
    Tokio1Executor,
    message::{Mailbox as LettreMailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use parceria_domain::notification::{Mailbox, NotificationError, NotificationMessage};

use super::NotificationSender;

/// SMTP 接続設定
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// SMTP サーバーのホスト名
    pub host:           String,
    /// SMTP サーバーのポート番号
    pub port:           u16,
    /// 認証ユーザー名
    pub username:       Option<String>,
    /// 認証パスワード（アプリパスワード等）
    pub secret:         Option<String>,
    /// STARTTLS を使用するか
    pub use_encryption: bool,
}

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
pub struct SmtpNotificationSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// 接続はまだ行わない（最初の送信時に接続する）。
    /// ユーザー名とパスワードが両方設定されている場合のみ認証する。
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotificationError> {
        let builder = if settings.use_encryption {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host).map_err(|e| {
                NotificationError::SendFailed(format!("configuração TLS inválida: {e}"))
            })?
        } else {
            // builder_dangerous: TLS なしで接続（Mailpit 等のローカル SMTP 向け）
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        };

        let builder = builder.port(settings.port);
        let builder = match (&settings.username, &settings.secret) {
            (Some(username), Some(secret)) => {
                builder.credentials(Credentials::new(username.clone(), secret.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_email(&self, message: &NotificationMessage) -> Result<(), NotificationError> {
        let email = build_message(message)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("falha SMTP: {e}")))?;

        Ok(())
    }
}

/// ドメインのメッセージを lettre のメッセージへ変換する
///
/// 本文は UTF-8 のプレーンテキスト。
fn build_message(message: &NotificationMessage) -> Result<Message, NotificationError> {
    let mut builder = Message::builder()
        .from(to_lettre_mailbox(&message.from, "remetente")?)
        .to(to_lettre_mailbox(&message.to, "destinatário")?)
        .subject(message.subject.as_str());

    if let Some(reply_to) = &message.reply_to {
        builder = builder.reply_to(to_lettre_mailbox(reply_to, "responder para")?);
    }

    builder
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone())
        .map_err(|e| NotificationError::SendFailed(format!("falha ao montar a mensagem: {e}")))
}

fn to_lettre_mailbox(mailbox: &Mailbox, role: &str) -> Result<LettreMailbox, NotificationError> {
    let address: Address = mailbox.address.parse().map_err(|e| {
        NotificationError::SendFailed(format!(
            "endereço de {role} inválido ({}): {e}",
            mailbox.address
        ))
    })?;

    Ok(LettreMailbox::new(Some(mailbox.name.clone()), address))
}
