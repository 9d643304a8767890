use crate::core::submission::{build_request, describe_failure, send, BusyButton, FlowContext, SubmissionHandle};
use crate::core::validator::FieldValidator;
use crate::core::{BannerKind, ButtonContent, HttpReply, NodeId, Page, Query, SubmissionOutcome, Transport};
use crate::utils::error::Result;
use std::sync::Arc;

/// The newsletter flow only accepts a 2xx reply carrying a JSON body.
pub fn interpret(reply: Result<HttpReply>) -> std::result::Result<serde_json::Value, String> {
    let reply = reply.map_err(|e| describe_failure(&e))?;

    if !reply.is_success() {
        return Err(format!("Network response was not ok (status {})", reply.status));
    }

    reply
        .json()
        .map_err(|e| format!("response body is not JSON: {}", e))
}

/// Submit listener for the newsletter form.
pub fn handle_submit<P: Page, T: Transport>(
    ctx: &Arc<FlowContext<P, T>>,
    form: NodeId,
) -> SubmissionHandle {
    let Some(email_input) = ctx.page.query_first(form, Query::EmailInput) else {
        tracing::warn!("Newsletter form {:?} has no email input", form);
        return SubmissionHandle::Ready(SubmissionOutcome::Invalid);
    };

    let validator = FieldValidator::new(ctx.page.as_ref(), &ctx.settings);
    if !validator.validate(email_input) {
        return SubmissionHandle::Ready(SubmissionOutcome::Invalid);
    }

    let Some(guard) = ctx.in_flight.begin(form) else {
        tracing::warn!("Newsletter form {:?} already has a submission in flight", form);
        return SubmissionHandle::Ready(SubmissionOutcome::AlreadyInFlight);
    };

    let button = BusyButton::engage(Arc::clone(&ctx.page), form, ButtonContent::Loading(None));
    let request = build_request(ctx.page.as_ref(), form, &ctx.settings);
    let ctx = Arc::clone(ctx);

    SubmissionHandle::Pending(tokio::spawn(async move {
        let _button = button;
        let Some(reply) = send(ctx.transport.as_ref(), request, guard.token()).await else {
            tracing::info!("Newsletter submission for {:?} cancelled", form);
            return SubmissionOutcome::Cancelled;
        };

        match interpret(reply) {
            Ok(data) => {
                tracing::debug!("Newsletter reply: {}", data);
                ctx.banners
                    .show_before_footer(BannerKind::Success, &ctx.settings.messages.newsletter_success);
                ctx.page.reset_form(form);
                ctx.page.remove_class(email_input, &ctx.settings.classes.valid);
                SubmissionOutcome::Succeeded
            }
            Err(reason) => {
                tracing::error!("Newsletter subscription failed: {}", reason);
                ctx.banners
                    .show_before_footer(BannerKind::Danger, &ctx.settings.messages.newsletter_failure);
                SubmissionOutcome::Failed(reason)
            }
        }
    }))
}
