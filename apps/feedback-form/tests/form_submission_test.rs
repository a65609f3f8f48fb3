//! # フォームから受付サービスまでの結合テスト
//!
//! 実際の TCP ポートで受付サービスを起動し、フォームコントローラを
//! HTTP クライアント経由で動かす。送信先はモック。

use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use chrono::{TimeZone, Utc};
use parceria_domain::{
    clock::FixedClock,
    feedback::{DraftField, RatingField},
};
use parceria_feedback_form::{FeedbackClientImpl, FormController, FormState};
use parceria_feedback_service::{
    app_builder::{build_app, build_usecase_with_clock},
    config::FeedbackConfig,
};
use parceria_infra::mock::{MockBehavior, MockNotificationSender};
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;

async fn spawn_server(sender: &MockNotificationSender) -> SocketAddr {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("FEEDBACK_PORT", "0"),
        ("NOTIFICATION_FROM_ADDRESS", "formulario@example.com"),
        ("NOTIFICATION_TO_ADDRESS", "comercial@example.com"),
    ]);
    let config =
        FeedbackConfig::from_lookup(|name| vars.get(name).map(|v| (*v).to_string())).unwrap();
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 19, 17, 30, 0).unwrap());
    let usecase = build_usecase_with_clock(&config, Arc::new(sender.clone()), Arc::new(clock));
    let app = build_app(&config.path, usecase);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn form_for(addr: SocketAddr) -> FormController<FeedbackClientImpl> {
    FormController::new(FeedbackClientImpl::new(&format!("http://{addr}/feedback")))
}

#[tokio::test]
async fn test_入力した内容が通知メールとして届く() {
    let sender = MockNotificationSender::new();
    let addr = spawn_server(&sender).await;
    let mut form = form_for(addr);

    form.update_field(DraftField::CompanyName, "ACME Ltda");
    form.update_field(DraftField::Email, "maria@acme.com.br");
    form.set_rating(RatingField::ProductQuality, 5);
    form.update_field(DraftField::Recommendation, "9");

    let state = form.submit().await.clone();

    assert_eq!(state, FormState::Submitted);
    let sent = sender.sent_messages();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains("- Empresa: ACME Ltda\n"));
    assert!(sent[0].body.contains("- Qualidade dos produtos: 5 / 5\n"));
    assert!(sent[0].body.contains("- Recomendação (NPS): 9 / 10\n"));
    assert_eq!(
        sent[0].reply_to.as_ref().map(|m| m.address.as_str()),
        Some("maria@acme.com.br")
    );
}

#[tokio::test]
async fn test_送信失敗でエラーを表示し再試行で成功する() {
    let sender = MockNotificationSender::failing("connection refused");
    let addr = spawn_server(&sender).await;
    let mut form = form_for(addr);
    form.update_field(DraftField::CompanyName, "ACME Ltda");

    form.submit().await;

    assert_eq!(
        form.error(),
        Some("Erro no servidor: falha ao enviar e-mail: connection refused")
    );
    assert_eq!(form.draft().company_name, "ACME Ltda");

    sender.set_behavior(MockBehavior::Succeed);
    let state = form.submit().await.clone();

    assert_eq!(state, FormState::Submitted);
    assert_eq!(sender.sent_count(), 1);
}

#[tokio::test]
async fn test_送信完了後に再度送信してもメールは1通() {
    let sender = MockNotificationSender::new();
    let addr = spawn_server(&sender).await;
    let mut form = form_for(addr);

    form.submit().await;
    form.submit().await;

    assert_eq!(form.state(), &FormState::Submitted);
    assert_eq!(sender.sent_count(), 1);
}

#[tokio::test]
async fn test_サーバーに接続できなければネットワークエラーを表示する() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let mut form = form_for(addr);

    form.submit().await;

    let error = form.error().unwrap_or_default();
    assert!(error.starts_with("Erro na rede: "), "{error}");
    assert!(form.can_submit());
}
