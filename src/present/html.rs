use super::{Badge, FailedView, FinderView, RenderTree, VerifyView};
use std::fmt::{self, Write};

/// Values echoed back into the forms after a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub name: String,
    pub domain: String,
    pub email: String,
    pub finder_timeout: String,
    pub verify_timeout: String,
}

impl fmt::Display for RenderTree {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placeholder => out.write_str(
                r#"<section class="results placeholder"><p>Submit a lookup to see results here.</p></section>"#,
            ),
            Self::Error(view) => write!(
                out,
                r#"<section class="results error"><h3>Error</h3><p><strong>{}</strong>: {}</p></section>"#,
                escape(&view.code),
                escape(&view.message)
            ),
            Self::Failed(view) => write_failed(out, view),
            Self::Finder(view) => write_finder(out, view),
            Self::Verify(view) => write_verify(out, view),
        }
    }
}

impl RenderTree {
    /// HTML fragment for the results area. All provider text is escaped.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.to_string()
    }
}

fn write_failed(out: &mut impl Write, view: &FailedView) -> fmt::Result {
    out.write_str(r#"<section class="results failed"><h3>Request failed</h3>"#)?;
    match view.error_code {
        Some(code) => write!(out, "<p><strong>{code}</strong>: {}</p>", escape(&view.message))?,
        None => write!(out, "<p>{}</p>", escape(&view.message))?,
    }

    if !view.validation.is_empty() {
        out.write_str(r#"<div class="validation"><h4>Validation errors</h4><ul>"#)?;
        for line in &view.validation {
            write!(
                out,
                "<li><strong>{}</strong>: {}</li>",
                escape(&line.field),
                escape(&line.messages.join(", "))
            )?;
        }
        out.write_str("</ul></div>")?;
    }

    if let Some(notice) = &view.queue_notice {
        write!(
            out,
            r#"<div class="queued" data-queue-id="{}"><h4>Lookup queued</h4><p>{}</p></div>"#,
            escape(&notice.queue_id),
            escape(&notice.text)
        )?;
    }

    out.write_str("</section>")?;
    Ok(())
}

fn write_finder(out: &mut impl Write, view: &FinderView) -> fmt::Result {
    write!(
        out,
        r#"<section class="results success"><h3>Results</h3><p>{}</p><dl>"#,
        escape(&view.headline)
    )?;
    for (label, value) in [
        ("Name", &view.full_name),
        ("Company", &view.company_name),
        ("Domain", &view.domain),
        ("Found on", &view.found_at),
    ] {
        write!(out, "<dt>{label}</dt><dd>{}</dd>", escape(value))?;
    }
    out.write_str("</dl><h4>Email addresses</h4>")?;

    if view.rows.is_empty() {
        out.write_str("<p>No email addresses returned.</p>")?;
    }
    for row in &view.rows {
        let address = escape(&row.address);
        write!(
            out,
            r#"<div class="email"><a href="mailto:{address}">{address}</a>"#
        )?;
        write_badges(out, &row.badges)?;
        out.write_str("</div>")?;
    }

    out.write_str("</section>")?;
    Ok(())
}

fn write_verify(out: &mut impl Write, view: &VerifyView) -> fmt::Result {
    let class = if view.safe_to_send { "safe" } else { "unsafe" };
    write!(
        out,
        r#"<section class="results success"><h3>Verification</h3><p class="verdict {class}"><strong>{}</strong>: {} ({})</p>"#,
        escape(view.verdict),
        escape(&view.email_address),
        escape(&view.status_label)
    )?;

    if let Some(ai_verdict) = &view.ai_verdict {
        write!(out, r#"<p class="ai-verdict">{}</p>"#, escape(ai_verdict))?;
    }

    out.write_str("<dl>")?;
    for detail in &view.details {
        write!(
            out,
            "<dt>{}</dt><dd>{}</dd>",
            escape(detail.label),
            escape(&detail.value)
        )?;
    }
    out.write_str("</dl>")?;

    write_badges(out, &view.checks)?;

    if !view.blacklist.is_empty() {
        out.write_str(r#"<div class="blacklist"><h4>Blacklisted on</h4><ul>"#)?;
        for entry in &view.blacklist {
            write!(out, "<li>{}</li>", escape(entry))?;
        }
        out.write_str("</ul></div>")?;
    }

    if let Some(suggestion) = &view.suggestion {
        write!(
            out,
            r#"<p class="suggestion">Did you mean <strong>{}</strong>?</p>"#,
            escape(suggestion)
        )?;
    }

    out.write_str("</section>")?;
    Ok(())
}

fn write_badges(out: &mut impl Write, badges: &[Badge]) -> fmt::Result {
    out.write_str(r#"<div class="badges">"#)?;
    for badge in badges {
        let state = if badge.active { "on" } else { "off" };
        write!(
            out,
            r#"<span class="badge {state}">{}</span>"#,
            escape(badge.label)
        )?;
    }
    out.write_str("</div>")?;
    Ok(())
}

/// Full page: both forms followed by the rendered result.
#[must_use]
pub fn render_page(form: &FormState, tree: &RenderTree) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<main>
<h1>Email Finder - Discover Email Addresses</h1>
<form method="post" action="/">
<h2>Find Email Address</h2>
<input type="hidden" name="actionType" value="findEmail">
<label>Name <input type="text" name="name" value="{name}" placeholder="e.g., Steven Morris"></label>
<label>Domain or Company Name <input type="text" name="domain" value="{domain}" placeholder="e.g., apple.com"></label>
<label>Timeout (milliseconds) <input type="number" name="timeout" value="{finder_timeout}" placeholder="30000" min="10000" max="180000"></label>
<button type="submit">Find Email</button>
</form>
<form method="post" action="/">
<h2>Verify Email Address</h2>
<input type="hidden" name="actionType" value="verifyEmail">
<label>Email <input type="email" name="email" value="{email}" placeholder="e.g., steven@apple.com"></label>
<label>Timeout (milliseconds) <input type="number" name="timeout" value="{verify_timeout}" placeholder="130000" min="10000" max="180000"></label>
<button type="submit">Verify Email</button>
</form>
{results}
</main>
</body>
</html>
"#,
        title = env!("CARGO_PKG_NAME"),
        name = escape(&form.name),
        domain = escape(&form.domain),
        email = escape(&form.email),
        finder_timeout = escape(&form.finder_timeout),
        verify_timeout = escape(&form.verify_timeout),
        results = tree,
    )
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
