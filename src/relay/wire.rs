//! Clearout response bodies as they arrive on the wire.
//!
//! Everything is optional and lenient here, and an explicit `null` reads like a missing
//! key; the classifier decides what a missing field means. Conversion into the canonical result types lives next to the shapes.

use super::outcome::{
    EmailCandidate, Failure, FinderResult, QueueInfo, SubStatus, ValidationReason, VerifyResult,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Deserialize, Debug, Default)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<ErrorBody>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub reasons: Option<Vec<ReasonBody>>,
    #[serde(default)]
    pub additional_info: Option<AdditionalInfoBody>,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct ReasonBody {
    #[serde(default, deserialize_with = "one_or_many")]
    pub field: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub messages: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct AdditionalInfoBody {
    #[serde(default)]
    pub resource_name: Option<String>,
    #[serde(default)]
    pub resource_value: Option<String>,
    #[serde(default)]
    pub queue_id: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct FinderData {
    #[serde(default, deserialize_with = "null_default")]
    emails: Vec<FinderEmail>,
    #[serde(default, deserialize_with = "null_default")]
    full_name: String,
    #[serde(default, deserialize_with = "null_default")]
    domain: String,
    #[serde(default, deserialize_with = "null_default")]
    confidence_score: f64,
    #[serde(default, deserialize_with = "null_default")]
    total: u64,
    #[serde(default, deserialize_with = "null_default")]
    company: Company,
    #[serde(default, deserialize_with = "null_default")]
    found_on: String,
}

#[derive(Deserialize, Debug, Default)]
struct FinderEmail {
    #[serde(default, deserialize_with = "null_default")]
    email_address: String,
    #[serde(default, deserialize_with = "yes_no")]
    role: bool,
    #[serde(default, deserialize_with = "yes_no")]
    business: bool,
}

#[derive(Deserialize, Debug, Default)]
struct Company {
    #[serde(default, deserialize_with = "null_default")]
    name: String,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct VerifyData {
    #[serde(default)]
    ai_verdict: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    email_address: String,
    #[serde(default, deserialize_with = "yes_no")]
    safe_to_send: bool,
    #[serde(default, deserialize_with = "null_default")]
    status: String,
    #[serde(default, deserialize_with = "null_default")]
    verified_on: String,
    #[serde(default, deserialize_with = "null_default")]
    time_taken: u64,
    #[serde(default)]
    sub_status: Option<SubStatusBody>,
    #[serde(default, deserialize_with = "null_default")]
    detail_info: DetailInfo,
    #[serde(default, deserialize_with = "null_default")]
    blacklist_info: Vec<String>,
    #[serde(default, deserialize_with = "yes_no")]
    disposable: bool,
    #[serde(default, deserialize_with = "yes_no")]
    free: bool,
    #[serde(default, deserialize_with = "yes_no")]
    role: bool,
    #[serde(default, deserialize_with = "yes_no")]
    gibberish: bool,
    #[serde(default)]
    suggested_email_address: Option<String>,
    #[serde(default)]
    bounce_type: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct SubStatusBody {
    #[serde(default, deserialize_with = "null_default")]
    code: i64,
    #[serde(default, deserialize_with = "null_default")]
    desc: String,
}

#[derive(Deserialize, Debug, Default)]
struct DetailInfo {
    #[serde(default, deserialize_with = "null_default")]
    account: String,
    #[serde(default, deserialize_with = "null_default")]
    domain: String,
    #[serde(default, deserialize_with = "null_default")]
    mx_record: String,
    #[serde(default, deserialize_with = "null_default")]
    smtp_provider: String,
}

impl Envelope {
    /// Most specific human message the body offers.
    pub fn message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(|error| error.message.as_deref())
            .or(self.message.as_deref())
            .filter(|message| !message.trim().is_empty())
    }

    /// Provider error code rendered as a string (numbers and strings both occur).
    pub fn error_code(&self) -> Option<String> {
        match self.error.as_ref()?.code.as_ref()? {
            Value::String(code) if !code.trim().is_empty() => Some(code.clone()),
            Value::Number(code) => Some(code.to_string()),
            _ => None,
        }
    }

    /// Map a `status: "failed"` body into a [`Failure`].
    pub fn into_failure(self, fallback_message: &str) -> Failure {
        let message = self.message().unwrap_or(fallback_message).to_string();
        let Some(error) = self.error else {
            return Failure {
                message,
                ..Failure::default()
            };
        };

        let error_code = error.code.as_ref().and_then(numeric_code);
        let validation_reasons = error
            .reasons
            .unwrap_or_default()
            .into_iter()
            .map(|reason| ValidationReason {
                field: reason.field,
                messages: reason.messages,
                location: reason.location,
            })
            .collect();
        let queue_info = error.additional_info.and_then(|info| {
            let queue_id = info.queue_id.filter(|id| !id.trim().is_empty())?;
            Some(QueueInfo {
                queue_id,
                resource_name: info.resource_name,
                resource_value: info.resource_value,
            })
        });

        Failure {
            error_code,
            message,
            validation_reasons,
            queue_info,
        }
    }
}

impl From<FinderData> for FinderResult {
    fn from(data: FinderData) -> Self {
        Self {
            emails: data
                .emails
                .into_iter()
                .map(|email| EmailCandidate {
                    address: email.email_address,
                    is_role_account: email.role,
                    is_business_account: email.business,
                })
                .collect(),
            full_name: data.full_name,
            domain: data.domain,
            confidence_score: data.confidence_score.clamp(0.0, 100.0),
            total_found: data.total,
            company_name: data.company.name,
            found_at_timestamp: data.found_on,
        }
    }
}

impl From<VerifyData> for VerifyResult {
    fn from(data: VerifyData) -> Self {
        Self {
            email_address: data.email_address,
            safe_to_send: data.safe_to_send,
            status_label: data.status,
            verified_at_timestamp: data.verified_on,
            time_taken_ms: data.time_taken,
            ai_verdict: non_empty(data.ai_verdict),
            account_part: data.detail_info.account,
            domain_part: data.detail_info.domain,
            mx_record: data.detail_info.mx_record,
            smtp_provider: data.detail_info.smtp_provider,
            is_disposable: data.disposable,
            is_free_provider: data.free,
            is_role_account: data.role,
            is_gibberish: data.gibberish,
            suggested_address: non_empty(data.suggested_email_address),
            sub_status: data.sub_status.map(|sub| SubStatus {
                code: sub.code,
                description: sub.desc,
            }),
            blacklist_info: data.blacklist_info,
            bounce_type: non_empty(data.bounce_type),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn numeric_code(code: &Value) -> Option<i64> {
    match code {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

// Explicit `null` decodes like a missing key.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// Clearout flags are "yes"/"no"; tolerate real booleans too.
fn yes_no<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => flag,
        Value::String(text) => text.eq_ignore_ascii_case("yes") || text == "true",
        _ => false,
    })
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => vec![text],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    })
}
