use super::action::{ActionForm, VERIFY_EMAIL, relay_form};
use crate::{
    present::{FormState, render, render_page},
    relay::RelayGateway,
};
use axum::{
    extract::{Extension, Form, rejection::FormRejection},
    response::Html,
};
use std::sync::Arc;
use tracing::{debug, instrument};

// GET /: empty forms and the placeholder.
pub async fn index() -> Html<String> {
    Html(render_page(&FormState::default(), &render(None)))
}

// POST /: relay the submitted form and render the outcome server-side.
#[instrument(skip(gateway, form))]
pub async fn submit(
    Extension(gateway): Extension<Arc<RelayGateway>>,
    form: Result<Form<ActionForm>, FormRejection>,
) -> Html<String> {
    let (form, relayed) = relay_form(&gateway, form).await;
    debug!(kind = relayed.outcome.kind(), "Rendering relay outcome");

    let tree = render(Some(&relayed.outcome));
    Html(render_page(&form_state(&form), &tree))
}

fn form_state(form: &ActionForm) -> FormState {
    let value = |field: &Option<String>| field.clone().unwrap_or_default();
    let timeout = value(&form.timeout);
    let is_verify = form.action_type.as_deref() == Some(VERIFY_EMAIL);

    FormState {
        name: value(&form.name),
        domain: value(&form.domain),
        email: value(&form.email),
        finder_timeout: if is_verify {
            String::new()
        } else {
            timeout.clone()
        },
        verify_timeout: if is_verify { timeout } else { String::new() },
    }
}
