//! Integration tests for the Resend and SMTP transports and the fallback
//! chain, run against in-process mock servers.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod support;

use std::time::Duration;

use axum::http::StatusCode;
use missive_delivery::{
    DeliveryChain, OutboundMessage, ResendConfig, ResendTransport, SmtpConfig, SmtpTimeouts,
    SmtpTransport, Transport, TransportError,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use support::{
    mock_resend::MockResendServer,
    mock_smtp::{MockSmtpServer, SmtpCommand},
};

fn message() -> OutboundMessage {
    OutboundMessage {
        from: "site@example.com".to_string(),
        to: "owner@example.com".to_string(),
        reply_to: "visitor@example.org".to_string(),
        subject: "Richiesta info".to_string(),
        text: "Nuova richiesta dal sito\n.hidden line\nfine".to_string(),
    }
}

fn resend_config(url: &str) -> ResendConfig {
    ResendConfig {
        api_key: Some("re_test_key".to_string()),
        api_url: url.to_string(),
        timeout_secs: 5,
    }
}

fn smtp_config(server: &MockSmtpServer) -> SmtpConfig {
    SmtpConfig {
        host: Some("127.0.0.1".to_string()),
        port: Some(server.addr().port()),
        username: Some("user".to_string()),
        password: Some("secret".to_string()),
        timeouts: SmtpTimeouts {
            connect_secs: 5,
            command_secs: 5,
            data_secs: 5,
        },
        ..SmtpConfig::default()
    }
}

#[tokio::test]
async fn test_resend_posts_json_with_bearer_token() {
    let server = MockResendServer::accepting().await.unwrap();
    let transport = ResendTransport::new(resend_config(&server.url())).unwrap();

    transport.deliver(&message()).await.unwrap();

    let received = server.received().await;
    assert_eq!(received.len(), 1);
    assert_eq!(
        received[0].authorization.as_deref(),
        Some("Bearer re_test_key")
    );
    assert_eq!(
        received[0].body,
        json!({
            "from": "site@example.com",
            "to": "owner@example.com",
            "subject": "Richiesta info",
            "text": "Nuova richiesta dal sito\n.hidden line\nfine",
            "reply_to": "visitor@example.org",
        })
    );
}

#[tokio::test]
async fn test_resend_non_success_status_is_rejected() {
    let server = MockResendServer::with_status(StatusCode::UNPROCESSABLE_ENTITY)
        .await
        .unwrap();
    let transport = ResendTransport::new(resend_config(&server.url())).unwrap();

    let error = transport.deliver(&message()).await.unwrap_err();

    match error {
        TransportError::Rejected { status, body } => {
            assert_eq!(status, 422);
            assert!(body.contains("rejected by mock"));
        }
        other => panic!("Expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_resend_unreachable_is_network_error() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = ResendTransport::new(resend_config(&format!("http://{addr}"))).unwrap();
    let error = transport.deliver(&message()).await.unwrap_err();

    assert!(matches!(error, TransportError::Http(_)), "{error:?}");
}

#[tokio::test]
async fn test_smtp_full_transaction() {
    let server = MockSmtpServer::builder().build().await.unwrap();
    let transport = SmtpTransport::new(smtp_config(&server));

    transport.deliver(&message()).await.unwrap();

    let commands = server.commands().await;
    assert_eq!(commands[0], SmtpCommand::Ehlo("localhost".to_string()));
    assert_eq!(
        commands[1],
        SmtpCommand::Auth("PLAIN AHVzZXIAc2VjcmV0".to_string())
    );
    assert_eq!(
        commands[2],
        SmtpCommand::MailFrom("FROM:<site@example.com>".to_string())
    );
    assert_eq!(
        commands[3],
        SmtpCommand::RcptTo("TO:<owner@example.com>".to_string())
    );
    assert_eq!(commands[4], SmtpCommand::Data);
    assert!(commands.contains(&SmtpCommand::Quit));

    let content = server.message().await.unwrap();
    assert!(content.contains("From: site@example.com\r\n"));
    assert!(content.contains("To: owner@example.com\r\n"));
    assert!(content.contains("Reply-To: visitor@example.org\r\n"));
    assert!(content.contains("Subject: Richiesta info\r\n"));
    assert!(content.contains("Message-ID: <"));
    // Leading dots are stuffed on the wire
    assert!(content.contains("\r\n..hidden line\r\n"));

    server.shutdown();
}

#[tokio::test]
async fn test_smtp_auth_failure_is_rejected() {
    let server = MockSmtpServer::builder()
        .with_auth_response(535, "5.7.8 Authentication failed")
        .build()
        .await
        .unwrap();
    let transport = SmtpTransport::new(smtp_config(&server));

    let error = transport.deliver(&message()).await.unwrap_err();

    match error {
        TransportError::SmtpRejected { stage, code, .. } => {
            assert_eq!(stage, "AUTH");
            assert_eq!(code, 535);
        }
        other => panic!("Expected SmtpRejected, got {other:?}"),
    }

    let commands = server.commands().await;
    assert!(
        !commands
            .iter()
            .any(|c| matches!(c, SmtpCommand::MailFrom(_)))
    );

    server.shutdown();
}

#[tokio::test]
async fn test_smtp_require_tls_without_starttls_fails() {
    let server = MockSmtpServer::builder().build().await.unwrap();
    let transport = SmtpTransport::new(SmtpConfig {
        require_tls: true,
        ..smtp_config(&server)
    });

    let error = transport.deliver(&message()).await.unwrap_err();
    assert!(matches!(error, TransportError::NotConfigured(_)), "{error:?}");

    let commands = server.commands().await;
    assert!(!commands.iter().any(|c| matches!(c, SmtpCommand::Auth(_))));

    server.shutdown();
}

#[tokio::test]
async fn test_smtp_command_timeout() {
    // EHLO, AUTH, then silence on MAIL FROM
    let server = MockSmtpServer::builder()
        .with_hang_on_command(2)
        .build()
        .await
        .unwrap();
    let transport = SmtpTransport::new(SmtpConfig {
        timeouts: SmtpTimeouts {
            connect_secs: 5,
            command_secs: 1,
            data_secs: 5,
        },
        ..smtp_config(&server)
    });

    let error = tokio::time::timeout(Duration::from_secs(10), transport.deliver(&message()))
        .await
        .expect("Transport should give up on its own")
        .unwrap_err();

    match error {
        TransportError::Timeout { stage, timeout } => {
            assert_eq!(stage, "MAIL FROM");
            assert_eq!(timeout, Duration::from_secs(1));
        }
        other => panic!("Expected Timeout, got {other:?}"),
    }

    server.shutdown();
}

#[tokio::test]
async fn test_chain_falls_back_to_smtp_when_resend_rejects() {
    let resend = MockResendServer::with_status(StatusCode::INTERNAL_SERVER_ERROR)
        .await
        .unwrap();
    let smtp = MockSmtpServer::builder().build().await.unwrap();

    let chain = DeliveryChain::new()
        .with(ResendTransport::new(resend_config(&resend.url())).unwrap())
        .with(SmtpTransport::new(smtp_config(&smtp)));

    let accepted_by = chain.deliver(&message()).await.unwrap();

    assert_eq!(accepted_by, "smtp");
    assert_eq!(resend.received().await.len(), 1);
    assert!(smtp.message().await.is_some());

    smtp.shutdown();
}

#[tokio::test]
async fn test_chain_skips_unconfigured_resend() {
    let smtp = MockSmtpServer::builder().build().await.unwrap();

    let chain = DeliveryChain::new()
        .with(ResendTransport::new(ResendConfig::default()).unwrap())
        .with(SmtpTransport::new(smtp_config(&smtp)));

    assert_eq!(chain.deliver(&message()).await.unwrap(), "smtp");

    smtp.shutdown();
}

#[tokio::test]
async fn test_chain_exhausted_when_both_fail() {
    let resend = MockResendServer::with_status(StatusCode::UNAUTHORIZED)
        .await
        .unwrap();
    let smtp = MockSmtpServer::builder()
        .with_rcpt_to_response(550, "5.1.1 No such user")
        .build()
        .await
        .unwrap();

    let chain = DeliveryChain::new()
        .with(ResendTransport::new(resend_config(&resend.url())).unwrap())
        .with(SmtpTransport::new(smtp_config(&smtp)));

    let error = chain.deliver(&message()).await.unwrap_err();
    let attempts = error.attempts();

    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].transport, "resend");
    assert!(matches!(
        attempts[0].error,
        TransportError::Rejected { status: 401, .. }
    ));
    assert_eq!(attempts[1].transport, "smtp");
    assert!(matches!(
        attempts[1].error,
        TransportError::SmtpRejected { code: 550, .. }
    ));

    smtp.shutdown();
}
