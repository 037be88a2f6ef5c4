//! Canonical result shapes produced by the relay gateway.
//!
//! Every provider call (or local refusal to make one) ends in exactly one [`Outcome`].
//! `Success` always carries a [`Payload`]; `Failed` and `Error` never do.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Bad local input; no network call was attempted.
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
/// Provider credential is not configured.
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
/// Transport failure or unreadable provider body.
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
/// The relay entry point received an unknown `actionType`.
pub const INVALID_ACTION: &str = "INVALID_ACTION";
/// The provider answered 2xx with a body that is neither success, failed nor error.
pub const UNEXPECTED_RESPONSE: &str = "UNEXPECTED_RESPONSE";

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Success { payload: Payload },
    Failed(Failure),
    Error(ErrorOutcome),
}

/// Success payload, tagged at construction by the endpoint that was called.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    Finder(FinderResult),
    Verify(VerifyResult),
}

/// A well-formed provider answer saying the lookup could not be completed.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_reasons: Vec<ValidationReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_info: Option<QueueInfo>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReason {
    pub field: Vec<String>,
    pub messages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Handle for a lookup the provider queued after the requested timeout elapsed.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueueInfo {
    pub queue_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_value: Option<String>,
}

/// Local or transport failure; no usable provider answer exists.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorOutcome {
    pub code: String,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FinderResult {
    pub emails: Vec<EmailCandidate>,
    pub full_name: String,
    pub domain: String,
    pub confidence_score: f64,
    pub total_found: u64,
    pub company_name: String,
    pub found_at_timestamp: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmailCandidate {
    pub address: String,
    pub is_role_account: bool,
    pub is_business_account: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResult {
    pub email_address: String,
    pub safe_to_send: bool,
    pub status_label: String,
    pub verified_at_timestamp: String,
    pub time_taken_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_verdict: Option<String>,
    pub account_part: String,
    pub domain_part: String,
    pub mx_record: String,
    pub smtp_provider: String,
    pub is_disposable: bool,
    pub is_free_provider: bool,
    pub is_role_account: bool,
    pub is_gibberish: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_status: Option<SubStatus>,
    #[serde(default)]
    pub blacklist_info: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounce_type: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SubStatus {
    pub code: i64,
    pub description: String,
}

impl Outcome {
    #[must_use]
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error(ErrorOutcome {
            code: code.into(),
            message: message.into(),
        })
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::error(VALIDATION_ERROR, message)
    }

    #[must_use]
    pub fn finder(result: FinderResult) -> Self {
        Self::Success {
            payload: Payload::Finder(result),
        }
    }

    #[must_use]
    pub fn verify(result: VerifyResult) -> Self {
        Self::Success {
            payload: Payload::Verify(result),
        }
    }

    /// Tag name as serialized in the `kind` field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Failed(_) => "failed",
            Self::Error(_) => "error",
        }
    }

    /// Error code for `Error` outcomes, `None` otherwise.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Error(error) => Some(error.code.as_str()),
            _ => None,
        }
    }
}

/// An [`Outcome`] together with the HTTP status the local entry point emits for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Relayed {
    pub outcome: Outcome,
    pub status: StatusCode,
}

impl Relayed {
    #[must_use]
    pub fn new(outcome: Outcome, status: StatusCode) -> Self {
        Self { outcome, status }
    }

    #[must_use]
    pub fn ok(outcome: Outcome) -> Self {
        Self::new(outcome, StatusCode::OK)
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(Outcome::validation(message), StatusCode::BAD_REQUEST)
    }

    #[must_use]
    pub fn invalid_action(message: impl Into<String>) -> Self {
        Self::new(
            Outcome::error(INVALID_ACTION, message),
            StatusCode::BAD_REQUEST,
        )
    }

    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(
            Outcome::error(CONFIG_ERROR, message),
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    }

    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(
            Outcome::error(NETWORK_ERROR, message),
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    }

    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(
            Outcome::error(UNEXPECTED_RESPONSE, message),
            StatusCode::BAD_GATEWAY,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn error_serializes_with_kind_tag() -> Result<()> {
        let value = serde_json::to_value(Outcome::validation("Name and domain are required"))?;
        assert_eq!(
            value,
            json!({
                "kind": "error",
                "code": "VALIDATION_ERROR",
                "message": "Name and domain are required"
            })
        );
        Ok(())
    }

    #[test]
    fn failed_omits_absent_fields() -> Result<()> {
        let outcome = Outcome::Failed(Failure {
            message: "Invalid domain".to_string(),
            ..Failure::default()
        });
        let value = serde_json::to_value(&outcome)?;
        assert_eq!(value, json!({ "kind": "failed", "message": "Invalid domain" }));
        Ok(())
    }

    #[test]
    fn success_carries_explicit_payload_tag() -> Result<()> {
        let outcome = Outcome::verify(VerifyResult {
            email_address: "steven@apple.com".to_string(),
            safe_to_send: true,
            ..VerifyResult::default()
        });
        let value = serde_json::to_value(&outcome)?;
        assert_eq!(value["kind"], "success");
        assert_eq!(value["payload"]["type"], "verify");
        assert_eq!(value["payload"]["emailAddress"], "steven@apple.com");
        assert_eq!(value["payload"]["safeToSend"], true);

        let back: Outcome = serde_json::from_value(value)?;
        assert_eq!(back, outcome);
        Ok(())
    }

    #[test]
    fn relayed_statuses() {
        assert_eq!(Relayed::validation("x").status, StatusCode::BAD_REQUEST);
        assert_eq!(Relayed::invalid_action("x").status, StatusCode::BAD_REQUEST);
        assert_eq!(
            Relayed::config("x").status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Relayed::network("x").status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(Relayed::unexpected("x").status, StatusCode::BAD_GATEWAY);
        assert_eq!(Relayed::network("x").outcome.error_code(), Some(NETWORK_ERROR));
        assert_eq!(Relayed::network("x").outcome.kind(), "error");
    }
}
