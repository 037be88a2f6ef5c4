//! Relay gateway against a mocked provider.
//!
//! Each test starts a wiremock server standing in for the Clearout API and checks
//! the outcome and local status the gateway produces, plus how many calls were made.

use anyhow::{Result, bail};
use mailprobe::relay::{
    FileCredential, FinderQuery, Outcome, Payload, ProviderEndpoints, RelayGateway,
    StaticCredential, VerifyQuery,
    outcome::{CONFIG_ERROR, NETWORK_ERROR, UNEXPECTED_RESPONSE, VALIDATION_ERROR},
};
use reqwest::StatusCode;
use serde_json::json;
use std::{io::Write, net::TcpListener, sync::Arc};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

const FINDER: &str = "/v2/email_finder/instant";
const VERIFY: &str = "/v2/email_verify/instant";

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn gateway(base: &str, token: Option<&str>) -> Result<RelayGateway> {
    let credential = token.map_or_else(StaticCredential::missing, StaticCredential::new);
    RelayGateway::new(ProviderEndpoints::from_base(base)?, Arc::new(credential))
}

#[tokio::test]
async fn blank_finder_fields_never_reach_provider() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = gateway(&server.uri(), Some("token"))?;
    let relayed = gateway
        .relay_finder(&FinderQuery::new("   ", "apple.com"))
        .await;

    assert_eq!(relayed.status, StatusCode::BAD_REQUEST);
    assert_eq!(relayed.outcome.error_code(), Some(VALIDATION_ERROR));
    assert_eq!(
        relayed.outcome,
        Outcome::error(VALIDATION_ERROR, "Name and domain are required fields")
    );
    Ok(())
}

#[tokio::test]
async fn missing_token_is_config_error() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = gateway(&server.uri(), None)?;
    let relayed = gateway
        .relay_verify(&VerifyQuery::new("steven@apple.com"))
        .await;

    assert_eq!(relayed.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(relayed.outcome.error_code(), Some(CONFIG_ERROR));
    assert!(!gateway.has_credential().await);
    Ok(())
}

#[tokio::test]
async fn blank_email_never_reaches_provider() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let relayed = gateway(&server.uri(), Some("token"))?
        .relay_verify(&VerifyQuery::new(" \t "))
        .await;

    assert_eq!(relayed.status, StatusCode::BAD_REQUEST);
    assert_eq!(relayed.outcome.error_code(), Some(VALIDATION_ERROR));
    Ok(())
}

#[tokio::test]
async fn missing_token_blocks_finder_lookup() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let relayed = gateway(&server.uri(), None)?
        .relay_finder(&FinderQuery::new("Steven Morris", "apple.com"))
        .await;

    assert_eq!(relayed.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(relayed.outcome.error_code(), Some(CONFIG_ERROR));
    Ok(())
}

#[tokio::test]
async fn finder_sends_token_and_trimmed_body() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FINDER))
        .and(header("Authorization", "secret-token"))
        .and(body_json(json!({
            "name": "Steven Morris",
            "domain": "apple.com",
            "timeout": 45000,
            "queue": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {
                "emails": [
                    { "email_address": "steven@apple.com", "role": "no", "business": "yes" },
                    { "email_address": "smorris@apple.com", "role": "no", "business": "yes" }
                ],
                "full_name": "Steven Morris",
                "domain": "apple.com",
                "confidence_score": 87,
                "total": 2,
                "company": { "name": "Apple" },
                "found_on": "2024-03-01T10:00:00.000Z"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server.uri(), Some("secret-token"))?;
    let query = FinderQuery::new("  Steven Morris ", " apple.com").with_timeout_ms(45_000);
    let relayed = gateway.relay_finder(&query).await;

    assert_eq!(relayed.status, StatusCode::OK);
    let result = match relayed.outcome {
        Outcome::Success {
            payload: Payload::Finder(result),
        } => result,
        other => bail!("expected finder success, got {other:?}"),
    };
    assert_eq!(result.emails.len(), 2);
    assert_eq!(result.emails[0].address, "steven@apple.com");
    assert!(result.emails[0].is_business_account);
    assert!(!result.emails[0].is_role_account);
    assert_eq!(result.company_name, "Apple");
    assert_eq!(result.total_found, 2);
    assert!((result.confidence_score - 87.0).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn failed_body_on_200_is_failed_outcome() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FINDER))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "failed",
            "error": { "code": 1000, "message": "Invalid domain" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let relayed = gateway(&server.uri(), Some("token"))?
        .relay_finder(&FinderQuery::new("Steven Morris", "not-a-domain"))
        .await;

    assert_eq!(relayed.status, StatusCode::OK);
    let failure = match relayed.outcome {
        Outcome::Failed(failure) => failure,
        other => bail!("expected failed outcome, got {other:?}"),
    };
    assert_eq!(failure.message, "Invalid domain");
    assert_eq!(failure.error_code, Some(1000));
    Ok(())
}

#[tokio::test]
async fn rate_limit_is_reemitted_as_200() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(VERIFY))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "status": "failed",
            "error": { "code": 1029, "message": "Rate limit exceeded, retry later" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let relayed = gateway(&server.uri(), Some("token"))?
        .relay_verify(&VerifyQuery::new("steven@apple.com"))
        .await;

    assert_eq!(relayed.status, StatusCode::OK);
    assert_eq!(relayed.outcome.kind(), "failed");
    Ok(())
}

#[tokio::test]
async fn queued_lookup_carries_queue_id() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FINDER))
        .respond_with(ResponseTemplate::new(524).set_body_json(json!({
            "status": "failed",
            "error": {
                "code": 1524,
                "message": "Request timed out, lookup queued",
                "additional_info": {
                    "resource_name": "email_finder",
                    "queue_id": "65f0c2a1d3"
                }
            }
        })))
        .mount(&server)
        .await;

    let relayed = gateway(&server.uri(), Some("token"))?
        .relay_finder(&FinderQuery::new("Steven Morris", "apple.com"))
        .await;

    assert_eq!(relayed.status, StatusCode::OK);
    let failure = match relayed.outcome {
        Outcome::Failed(failure) => failure,
        other => bail!("expected failed outcome, got {other:?}"),
    };
    let queue = failure.queue_info.map(|queue| queue.queue_id);
    assert_eq!(queue.as_deref(), Some("65f0c2a1d3"));
    Ok(())
}

#[tokio::test]
async fn verify_success_decodes_result() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(VERIFY))
        .and(body_json(json!({ "email": "steven@apple.com", "timeout": 130000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {
                "email_address": "steven@apple.com",
                "safe_to_send": "yes",
                "status": "valid",
                "verified_on": "2024-03-01T10:00:00.000Z",
                "time_taken": 812,
                "sub_status": { "code": 200, "desc": "Success" },
                "detail_info": {
                    "account": "steven",
                    "domain": "apple.com",
                    "mx_record": "mx-in.g.apple.com",
                    "smtp_provider": "apple"
                },
                "disposable": "no",
                "free": "no",
                "role": "no",
                "gibberish": "no",
                "suggested_email_address": ""
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = gateway(&server.uri(), Some("token"))?
        .submit_verify_query(&VerifyQuery::new("steven@apple.com"))
        .await;

    let result = match outcome {
        Outcome::Success {
            payload: Payload::Verify(result),
        } => result,
        other => bail!("expected verify success, got {other:?}"),
    };
    assert!(result.safe_to_send);
    assert_eq!(result.status_label, "valid");
    assert_eq!(result.time_taken_ms, 812);
    assert_eq!(result.mx_record, "mx-in.g.apple.com");
    assert_eq!(result.suggested_address, None);
    Ok(())
}

#[tokio::test]
async fn server_error_passes_through() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let relayed = gateway(&server.uri(), Some("token"))?
        .relay_verify(&VerifyQuery::new("steven@apple.com"))
        .await;

    assert_eq!(relayed.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(relayed.outcome.error_code(), Some("503"));
    Ok(())
}

#[tokio::test]
async fn unknown_body_status_is_unexpected() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "pending" })))
        .mount(&server)
        .await;

    let relayed = gateway(&server.uri(), Some("token"))?
        .relay_verify(&VerifyQuery::new("steven@apple.com"))
        .await;

    assert_eq!(relayed.status, StatusCode::BAD_GATEWAY);
    assert_eq!(relayed.outcome.error_code(), Some(UNEXPECTED_RESPONSE));
    Ok(())
}

#[tokio::test]
async fn refused_connection_is_network_error() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        listener.local_addr()?.port()
    };

    let relayed = gateway(&format!("http://127.0.0.1:{port}"), Some("token"))?
        .relay_finder(&FinderQuery::new("Steven Morris", "apple.com"))
        .await;

    assert_eq!(relayed.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(relayed.outcome.error_code(), Some(NETWORK_ERROR));
    let Outcome::Error(error) = &relayed.outcome else {
        bail!("expected error outcome");
    };
    assert!(!error.message.is_empty());
    Ok(())
}

#[tokio::test]
async fn rotated_token_file_is_picked_up() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    for token in ["first-token", "second-token"] {
        Mock::given(method("POST"))
            .and(path(VERIFY))
            .and(header("Authorization", token))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "failed",
                "error": { "message": "Invalid email" }
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "first-token")?;

    let gateway = RelayGateway::new(
        ProviderEndpoints::from_base(&server.uri())?,
        Arc::new(FileCredential::new(file.path())),
    )?;
    let query = VerifyQuery::new("nobody@apple.com");
    assert_eq!(gateway.relay_verify(&query).await.status, StatusCode::OK);

    std::fs::write(file.path(), "second-token\n")?;
    assert_eq!(gateway.relay_verify(&query).await.status, StatusCode::OK);
    Ok(())
}
