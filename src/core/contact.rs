use crate::core::submission::{build_request, describe_failure, send, BusyButton, FlowContext, SubmissionHandle};
use crate::core::validator::FieldValidator;
use crate::core::{BannerKind, ButtonContent, HttpReply, NodeId, Page, Query, SubmissionOutcome, Transport};
use crate::utils::error::Result;
use std::sync::Arc;
use url::Url;

/// How a contact form reply is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactVerdict {
    Redirect(Url),
    Sent,
    Failed(String),
}

/// Redirects win; any other reply counts as sent unless `http_errors_are_failures` is set.
/// A JSON body that fails to parse still counts as sent.
pub fn interpret(reply: Result<HttpReply>, http_errors_are_failures: bool) -> ContactVerdict {
    let reply = match reply {
        Ok(reply) => reply,
        Err(e) => return ContactVerdict::Failed(describe_failure(&e)),
    };

    if reply.redirected {
        return ContactVerdict::Redirect(reply.url);
    }

    if http_errors_are_failures && !reply.is_success() {
        return ContactVerdict::Failed(format!("server answered with status {}", reply.status));
    }

    if reply.is_json() {
        if let Err(e) = reply.json() {
            tracing::debug!("Ignoring malformed JSON in contact reply: {}", e);
        }
    }

    ContactVerdict::Sent
}

/// Submit listener for general contact forms.
pub fn handle_submit<P: Page, T: Transport>(
    ctx: &Arc<FlowContext<P, T>>,
    form: NodeId,
) -> SubmissionHandle {
    let validator = FieldValidator::new(ctx.page.as_ref(), &ctx.settings);
    if !validator.validate_all(form) {
        return SubmissionHandle::Ready(SubmissionOutcome::Invalid);
    }

    let Some(guard) = ctx.in_flight.begin(form) else {
        tracing::warn!("Contact form {:?} already has a submission in flight", form);
        return SubmissionHandle::Ready(SubmissionOutcome::AlreadyInFlight);
    };

    let button = BusyButton::engage(
        Arc::clone(&ctx.page),
        form,
        ButtonContent::Loading(Some(ctx.settings.messages.submitting.clone())),
    );
    let request = build_request(ctx.page.as_ref(), form, &ctx.settings);
    let ctx = Arc::clone(ctx);

    SubmissionHandle::Pending(tokio::spawn(async move {
        let _button = button;
        let Some(reply) = send(ctx.transport.as_ref(), request, guard.token()).await else {
            tracing::info!("Contact submission for {:?} cancelled", form);
            return SubmissionOutcome::Cancelled;
        };

        match interpret(reply, ctx.settings.contact.http_errors_are_failures) {
            ContactVerdict::Redirect(url) => {
                tracing::info!("Contact form redirected to {}", url);
                ctx.page.navigate(&url);
                SubmissionOutcome::Redirected(url)
            }
            ContactVerdict::Sent => {
                ctx.banners.show_after_form(
                    form,
                    BannerKind::Success,
                    &ctx.settings.messages.contact_success,
                );
                ctx.page.reset_form(form);
                let valid = &ctx.settings.classes.valid;
                for element in ctx.page.query_all(form, Query::Class(valid)) {
                    ctx.page.remove_class(element, valid);
                }
                SubmissionOutcome::Succeeded
            }
            ContactVerdict::Failed(reason) => {
                tracing::error!("Contact form submission failed: {}", reason);
                ctx.banners.show_after_form(
                    form,
                    BannerKind::Danger,
                    &ctx.settings.messages.contact_failure,
                );
                SubmissionOutcome::Failed(reason)
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::FormsError;

    fn reply(status: u16, redirected: bool, content_type: &str, body: &str) -> HttpReply {
        HttpReply {
            status,
            redirected,
            url: Url::parse("https://example.test/thanks").unwrap(),
            content_type: Some(content_type.to_string()),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_redirect_takes_precedence() {
        let verdict = interpret(Ok(reply(200, true, "text/html", "")), false);
        assert_eq!(
            verdict,
            ContactVerdict::Redirect(Url::parse("https://example.test/thanks").unwrap())
        );
    }

    #[test]
    fn test_http_errors_count_as_sent_by_default() {
        assert_eq!(
            interpret(Ok(reply(500, false, "text/html", "oops")), false),
            ContactVerdict::Sent
        );
        assert!(matches!(
            interpret(Ok(reply(500, false, "text/html", "oops")), true),
            ContactVerdict::Failed(_)
        ));
    }

    #[test]
    fn test_malformed_json_counts_as_sent() {
        assert_eq!(
            interpret(Ok(reply(200, false, "application/json", "{not json")), false),
            ContactVerdict::Sent
        );
    }

    #[test]
    fn test_transport_error_fails() {
        let verdict = interpret(
            Err(FormsError::TransportFailure {
                message: "connection refused".to_string(),
            }),
            false,
        );
        assert!(matches!(verdict, ContactVerdict::Failed(reason) if reason.contains("connection refused")));
    }
}
