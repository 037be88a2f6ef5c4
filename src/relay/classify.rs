use super::{
    QueryKind,
    outcome::{Outcome, Relayed},
    wire::{Envelope, FinderData, VerifyData},
};
use axum::http::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

/// Upstream statuses whose JSON body is authoritative and which are re-emitted as 200.
pub const REEMITTED_STATUSES: [u16; 5] = [400, 401, 402, 429, 524];

const FAILED_FALLBACK: &str = "The provider could not complete the request";

#[must_use]
pub fn is_reemitted(status: StatusCode) -> bool {
    REEMITTED_STATUSES.contains(&status.as_u16())
}

/// Classify a provider response that was received in full.
///
/// Transport failures never reach this function; the gateway maps them first.
#[must_use]
pub fn classify(kind: QueryKind, status: StatusCode, body: &[u8]) -> Relayed {
    if !status.is_success() && !is_reemitted(status) {
        return passthrough(status, body);
    }

    let envelope: Envelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!(%status, "Provider body is not valid JSON: {err}");
            return Relayed::network(format!("Invalid JSON from provider: {err}"));
        }
    };

    if is_reemitted(status) {
        debug!(%status, "Re-emitting provider status as 200");
        return Relayed::ok(refusal(status, envelope));
    }

    let body_status = envelope.status.clone();
    match body_status.as_deref() {
        Some("failed") => Relayed::ok(Outcome::Failed(envelope.into_failure(FAILED_FALLBACK))),
        Some("success") => success(kind, envelope.data),
        Some("error") => Relayed::ok(refusal(status, envelope)),
        other => Relayed::unexpected(format!(
            "Provider returned {status} with unrecognised status {:?}",
            other.unwrap_or("<missing>")
        )),
    }
}

fn success(kind: QueryKind, data: Option<Value>) -> Relayed {
    let Some(data) = data else {
        return Relayed::unexpected("Provider reported success without data");
    };

    let outcome = match kind {
        QueryKind::Finder => serde_json::from_value::<FinderData>(data)
            .map(|data| Outcome::finder(data.into())),
        QueryKind::Verify => serde_json::from_value::<VerifyData>(data)
            .map(|data| Outcome::verify(data.into())),
    };

    match outcome {
        Ok(outcome) => Relayed::ok(outcome),
        Err(err) => {
            warn!(kind = kind.as_str(), "Provider success data did not decode: {err}");
            Relayed::unexpected(format!("Unreadable {} data: {err}", kind.as_str()))
        }
    }
}

// A body the provider stands behind: either a business failure or its own error.
fn refusal(status: StatusCode, envelope: Envelope) -> Outcome {
    if envelope.status.as_deref() == Some("failed") {
        return Outcome::Failed(envelope.into_failure(FAILED_FALLBACK));
    }

    let code = envelope
        .error_code()
        .unwrap_or_else(|| format!("HTTP_{}", status.as_u16()));
    let message = envelope
        .message()
        .map_or_else(|| reason(status), str::to_string);
    Outcome::error(code, message)
}

// Unexpected status: keep the raw code, borrow a message from the body if it has one.
fn passthrough(status: StatusCode, body: &[u8]) -> Relayed {
    let message = serde_json::from_slice::<Envelope>(body)
        .ok()
        .and_then(|envelope| envelope.message().map(str::to_string))
        .unwrap_or_else(|| reason(status));
    warn!(%status, "Unexpected provider status: {message}");
    Relayed::new(Outcome::error(status.as_u16().to_string(), message), status)
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
}
