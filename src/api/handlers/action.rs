use crate::relay::{
    FinderQuery, Outcome, RelayGateway, Relayed, VerifyQuery, query::parse_timeout_field,
};
use axum::{
    Json,
    extract::{Extension, Form, rejection::FormRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header::CACHE_CONTROL},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use utoipa::ToSchema;

pub const FIND_EMAIL: &str = "findEmail";
pub const VERIFY_EMAIL: &str = "verifyEmail";

/// Form fields posted by the finder and verifier forms.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ActionForm {
    /// `findEmail` or `verifyEmail`
    #[serde(default)]
    pub action_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Provider-side wait time in milliseconds (10000-180000)
    #[serde(default)]
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayAction {
    Find(FinderQuery),
    Verify(VerifyQuery),
}

impl RelayAction {
    /// Build the query named by `actionType`. Blank fields are left for the gateway to reject.
    ///
    /// # Errors
    /// Returns a ready-made `Relayed` for an unknown action or an unparsable timeout.
    pub fn from_form(form: &ActionForm) -> Result<Self, Relayed> {
        let timeout = parse_timeout_field(form.timeout.as_deref())
            .map_err(|err| Relayed::validation(err.to_string()));
        let field = |value: &Option<String>| value.clone().unwrap_or_default();

        match form.action_type.as_deref().map(str::trim) {
            Some(FIND_EMAIL) => {
                let query = FinderQuery::new(field(&form.name), field(&form.domain));
                Ok(Self::Find(match timeout? {
                    Some(ms) => query.with_timeout_ms(ms),
                    None => query,
                }))
            }
            Some(VERIFY_EMAIL) => {
                let query = VerifyQuery::new(field(&form.email));
                Ok(Self::Verify(match timeout? {
                    Some(ms) => query.with_timeout_ms(ms),
                    None => query,
                }))
            }
            other => {
                debug!("Unknown action type: {:?}", other);
                Err(Relayed::invalid_action("Invalid action type"))
            }
        }
    }

    pub async fn run(&self, gateway: &RelayGateway) -> Relayed {
        match self {
            Self::Find(query) => gateway.relay_finder(query).await,
            Self::Verify(query) => gateway.relay_verify(query).await,
        }
    }
}

/// Parse and relay a submitted form, folding every failure into a `Relayed`.
pub async fn relay_form(
    gateway: &RelayGateway,
    form: Result<Form<ActionForm>, FormRejection>,
) -> (ActionForm, Relayed) {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            warn!("Failed to parse form body: {}", rejection);
            return (
                ActionForm::default(),
                Relayed::validation(format!("Invalid form submission: {}", rejection.body_text())),
            );
        }
    };

    let relayed = match RelayAction::from_form(&form) {
        Ok(action) => action.run(gateway).await,
        Err(relayed) => relayed,
    };
    (form, relayed)
}

#[utoipa::path(
    post,
    path = "/action",
    request_body(content = ActionForm, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 200, description = "Success, failed lookup, or provider refusal (400/401/402/429/524 re-emitted)", body = Outcome),
        (status = 400, description = "VALIDATION_ERROR or INVALID_ACTION", body = Outcome),
        (status = 500, description = "CONFIG_ERROR or NETWORK_ERROR", body = Outcome),
        (status = 502, description = "UNEXPECTED_RESPONSE", body = Outcome),
    ),
    tag = "relay",
)]
// axum handler for the relay action
#[instrument(skip(gateway, form))]
pub async fn action(
    Extension(gateway): Extension<Arc<RelayGateway>>,
    form: Result<Form<ActionForm>, FormRejection>,
) -> (StatusCode, HeaderMap, Json<Outcome>) {
    let (_form, relayed) = relay_form(&gateway, form).await;

    debug!(
        kind = relayed.outcome.kind(),
        status = %relayed.status,
        "Relay action completed"
    );

    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    (relayed.status, headers, Json(relayed.outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::outcome::{INVALID_ACTION, VALIDATION_ERROR};
    use crate::relay::query::FINDER_DEFAULT_TIMEOUT_MS;

    fn form(action: &str) -> ActionForm {
        ActionForm {
            action_type: Some(action.to_string()),
            ..ActionForm::default()
        }
    }

    #[test]
    fn find_action_builds_finder_query() {
        let mut input = form(FIND_EMAIL);
        input.name = Some("Steven Morris".to_string());
        input.domain = Some("apple.com".to_string());
        input.timeout = Some("60000".to_string());
        assert_eq!(
            RelayAction::from_form(&input),
            Ok(RelayAction::Find(
                FinderQuery::new("Steven Morris", "apple.com").with_timeout_ms(60_000)
            ))
        );
    }

    #[test]
    fn find_action_without_timeout_uses_default() {
        let input = form(FIND_EMAIL);
        let Ok(RelayAction::Find(query)) = RelayAction::from_form(&input) else {
            panic!("expected finder action");
        };
        assert_eq!(query.timeout_ms(), FINDER_DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn verify_action_builds_verify_query() {
        let mut input = form(VERIFY_EMAIL);
        input.email = Some("steven@apple.com".to_string());
        assert_eq!(
            RelayAction::from_form(&input),
            Ok(RelayAction::Verify(VerifyQuery::new("steven@apple.com")))
        );
    }

    #[test]
    fn unknown_action_is_invalid() {
        let Err(relayed) = RelayAction::from_form(&form("deleteEmail")) else {
            panic!("expected rejection");
        };
        assert_eq!(relayed.outcome.error_code(), Some(INVALID_ACTION));
        assert_eq!(relayed.status, StatusCode::BAD_REQUEST);

        let Err(relayed) = RelayAction::from_form(&ActionForm::default()) else {
            panic!("expected rejection");
        };
        assert_eq!(relayed.outcome.error_code(), Some(INVALID_ACTION));
    }

    #[test]
    fn bad_timeout_is_validation_error() {
        let mut input = form(VERIFY_EMAIL);
        input.email = Some("a@b.com".to_string());
        input.timeout = Some("fast".to_string());
        let Err(relayed) = RelayAction::from_form(&input) else {
            panic!("expected rejection");
        };
        assert_eq!(relayed.outcome.error_code(), Some(VALIDATION_ERROR));
    }
}
