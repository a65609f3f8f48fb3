//! # 通知メール組み立て
//!
//! 正規化済みフィードバックからプレーンテキストの通知メールを組み立てる。
//! 本文は受信日時以外は入力だけで決まる。

use chrono::{DateTime, FixedOffset, Utc};
use parceria_domain::{
    feedback::FeedbackSubmission,
    notification::{Mailbox, NotificationMessage},
};

/// 受信日時の表示形式（dd/mm/YYYY HH:MM:SS）
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// 通知メールの組み立て
///
/// 件名・送信元・宛先・タイムゾーンは起動時の設定で固定される。
#[derive(Debug, Clone)]
pub struct NotificationComposer {
    subject:    String,
    from:       Mailbox,
    to:         Mailbox,
    utc_offset: FixedOffset,
}

impl NotificationComposer {
    pub fn new(
        subject: impl Into<String>,
        from: Mailbox,
        to: Mailbox,
        utc_offset: FixedOffset,
    ) -> Self {
        Self {
            subject: subject.into(),
            from,
            to,
            utc_offset,
        }
    }

    /// 通知メールを組み立てる
    ///
    /// メールアドレスが有効な形式の場合のみ、担当者名付きで返信先に設定する。
    pub fn compose(
        &self,
        submission: &FeedbackSubmission,
        received_at: DateTime<Utc>,
    ) -> NotificationMessage {
        let reply_to = submission
            .reply_to_email()
            .map(|email| Mailbox::new(submission.contact_name.clone(), email.as_str()));

        NotificationMessage {
            subject: self.subject.clone(),
            body: self.render_body(submission, received_at),
            from: self.from.clone(),
            to: self.to.clone(),
            reply_to,
        }
    }

    fn render_body(&self, s: &FeedbackSubmission, received_at: DateTime<Utc>) -> String {
        let timestamp = received_at
            .with_timezone(&self.utc_offset)
            .format(TIMESTAMP_FORMAT);

        let lines = [
            format!("Novo feedback recebido em {timestamp}:"),
            String::new(),
            "Informações da Empresa:".to_string(),
            format!("- Empresa: {}", s.company_name),
            format!("- Contato: {}", s.contact_name),
            format!("- Email: {}", s.email),
            format!("- Telefone: {}", s.phone),
            String::new(),
            "Avaliações:".to_string(),
            format!("- Qualidade dos produtos: {}", s.product_quality),
            format!("- Variedade de produtos: {}", s.product_variety),
            format!("- Pontualidade nas entregas: {}", s.delivery_efficiency),
            format!("- Embalagem: {}", s.packaging),
            format!("- Suporte comercial: {}", s.commercial_support),
            format!("- Recomendação (NPS): {}", s.recommendation),
            String::new(),
            "Comentários:".to_string(),
            "- Observações sobre produtos/fornecimento:".to_string(),
            s.observations.clone(),
            String::new(),
            "- Feedback geral sobre a parceria:".to_string(),
            s.general_feedback.clone(),
        ];

        let mut body = lines.join("\n");
        body.push('\n');
        body
    }
}
