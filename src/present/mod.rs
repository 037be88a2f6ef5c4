//! Result presenter.
//!
//! [`render`] is a pure function of the outcome tag and, for successes, the explicit
//! payload tag. It does no I/O and never inspects payload fields to guess the shape.

mod html;

pub use self::html::{FormState, render_page};

use crate::relay::{Failure, FinderResult, Outcome, Payload, VerifyResult};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderTree {
    Placeholder,
    Error(ErrorView),
    Failed(FailedView),
    Finder(FinderView),
    Verify(VerifyView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedView {
    pub message: String,
    pub error_code: Option<i64>,
    pub validation: Vec<ValidationLine>,
    pub queue_notice: Option<QueueNotice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationLine {
    pub field: String,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueNotice {
    pub queue_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinderView {
    pub headline: String,
    pub full_name: String,
    pub company_name: String,
    pub domain: String,
    pub confidence_score: f64,
    pub found_at: String,
    pub rows: Vec<EmailRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRow {
    pub address: String,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyView {
    pub email_address: String,
    pub safe_to_send: bool,
    pub verdict: &'static str,
    pub status_label: String,
    pub ai_verdict: Option<String>,
    pub details: Vec<Detail>,
    pub checks: Vec<Badge>,
    pub blacklist: Vec<String>,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    pub label: &'static str,
    pub value: String,
}

/// Map an optional outcome to the tree the page renders.
#[must_use]
pub fn render(outcome: Option<&Outcome>) -> RenderTree {
    match outcome {
        None => RenderTree::Placeholder,
        Some(Outcome::Error(error)) => RenderTree::Error(ErrorView {
            code: error.code.clone(),
            message: error.message.clone(),
        }),
        Some(Outcome::Failed(failure)) => RenderTree::Failed(failed_view(failure)),
        Some(Outcome::Success {
            payload: Payload::Finder(result),
        }) => RenderTree::Finder(finder_view(result)),
        Some(Outcome::Success {
            payload: Payload::Verify(result),
        }) => RenderTree::Verify(verify_view(result)),
    }
}

fn failed_view(failure: &Failure) -> FailedView {
    let validation = failure
        .validation_reasons
        .iter()
        .map(|reason| ValidationLine {
            field: if reason.field.is_empty() {
                "request".to_string()
            } else {
                reason.field.join(".")
            },
            messages: reason.messages.clone(),
        })
        .collect();

    let queue_notice = failure
        .queue_info
        .as_ref()
        .filter(|queue| !queue.queue_id.trim().is_empty())
        .map(|queue| QueueNotice {
            queue_id: queue.queue_id.clone(),
            text: format!(
                "The lookup did not finish in time and continues in the background. \
                 Retrieve the result later with queue id {}.",
                queue.queue_id
            ),
        });

    FailedView {
        message: failure.message.clone(),
        error_code: failure.error_code,
        validation,
        queue_notice,
    }
}

fn finder_view(result: &FinderResult) -> FinderView {
    let rows = result
        .emails
        .iter()
        .map(|email| EmailRow {
            address: email.address.clone(),
            badges: vec![
                Badge {
                    label: if email.is_role_account {
                        "Role Email"
                    } else {
                        "Personal Email"
                    },
                    active: email.is_role_account,
                },
                Badge {
                    label: if email.is_business_account {
                        "Business"
                    } else {
                        "Non-Business"
                    },
                    active: email.is_business_account,
                },
            ],
        })
        .collect();

    FinderView {
        headline: format!(
            "Found {} email(s) with {}% confidence",
            result.total_found, result.confidence_score
        ),
        full_name: result.full_name.clone(),
        company_name: result.company_name.clone(),
        domain: result.domain.clone(),
        confidence_score: result.confidence_score,
        found_at: result.found_at_timestamp.clone(),
        rows,
    }
}

fn verify_view(result: &VerifyResult) -> VerifyView {
    let mut details = vec![
        Detail {
            label: "Account",
            value: result.account_part.clone(),
        },
        Detail {
            label: "Domain",
            value: result.domain_part.clone(),
        },
        Detail {
            label: "MX record",
            value: result.mx_record.clone(),
        },
        Detail {
            label: "SMTP provider",
            value: result.smtp_provider.clone(),
        },
        Detail {
            label: "Verified on",
            value: result.verified_at_timestamp.clone(),
        },
        Detail {
            label: "Time taken",
            value: format!("{} ms", result.time_taken_ms),
        },
    ];
    if let Some(sub_status) = &result.sub_status {
        details.push(Detail {
            label: "Sub status",
            value: format!("{} ({})", sub_status.description, sub_status.code),
        });
    }
    if let Some(bounce_type) = &result.bounce_type {
        details.push(Detail {
            label: "Bounce type",
            value: bounce_type.clone(),
        });
    }

    VerifyView {
        email_address: result.email_address.clone(),
        safe_to_send: result.safe_to_send,
        verdict: if result.safe_to_send {
            "Safe to send"
        } else {
            "Not safe to send"
        },
        status_label: result.status_label.clone(),
        ai_verdict: result.ai_verdict.clone(),
        details,
        checks: vec![
            Badge {
                label: "Disposable",
                active: result.is_disposable,
            },
            Badge {
                label: "Free provider",
                active: result.is_free_provider,
            },
            Badge {
                label: "Role account",
                active: result.is_role_account,
            },
            Badge {
                label: "Gibberish",
                active: result.is_gibberish,
            },
        ],
        blacklist: result.blacklist_info.clone(),
        suggestion: result.suggested_address.clone(),
    }
}
