use crate::config::settings::FormSettings;
use crate::core::banner::Banners;
use crate::core::submission::{FlowContext, InFlight, SubmissionHandle};
use crate::core::validator::FieldValidator;
use crate::core::{anchor, contact, native_validation, newsletter};
use crate::core::{NodeId, Page, Query, SubmissionOutcome, Transport};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Submit,
    Blur,
    Click,
}

/// An event delivered to a node on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    Submit(NodeId),
    Blur(NodeId),
    Click(NodeId),
}

impl PageEvent {
    pub fn target(&self) -> NodeId {
        match self {
            PageEvent::Submit(node) | PageEvent::Blur(node) | PageEvent::Click(node) => *node,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            PageEvent::Submit(_) => EventKind::Submit,
            PageEvent::Blur(_) => EventKind::Blur,
            PageEvent::Click(_) => EventKind::Click,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listener {
    ContactSubmit,
    NewsletterSubmit,
    NativeValidation,
    FieldBlur,
    FragmentScroll,
}

#[derive(Debug, Clone, Copy)]
struct Registration {
    target: NodeId,
    kind: EventKind,
    listener: Listener,
}

/// What the listeners did with one event.
#[derive(Debug, Default)]
pub struct Dispatch {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
    pub submissions: Vec<SubmissionHandle>,
}

impl Dispatch {
    /// Waits for every submission started by this event.
    pub async fn settle(self) -> Vec<SubmissionOutcome> {
        let mut outcomes = Vec::with_capacity(self.submissions.len());
        for submission in self.submissions {
            outcomes.push(submission.outcome().await);
        }
        outcomes
    }
}

/// Wires the page's forms, fields and fragment links to the validation, submission and
/// scrolling behaviour. Listeners on the same target run in registration order.
pub struct FormController<P: Page, T: Transport> {
    ctx: Arc<FlowContext<P, T>>,
    registrations: Vec<Registration>,
    shutdown: CancellationToken,
    attached: bool,
}

impl<P: Page, T: Transport> FormController<P, T> {
    pub fn new(page: Arc<P>, transport: Arc<T>, settings: FormSettings) -> Self {
        let shutdown = CancellationToken::new();
        let settings = Arc::new(settings);
        let banners = Banners::new(Arc::clone(&page), Arc::clone(&settings), shutdown.clone());
        let in_flight = Arc::new(InFlight::new(shutdown.clone()));

        Self {
            ctx: Arc::new(FlowContext {
                page,
                transport,
                settings,
                banners,
                in_flight,
            }),
            registrations: Vec::new(),
            shutdown,
            attached: false,
        }
    }

    pub fn page(&self) -> &Arc<P> {
        &self.ctx.page
    }

    pub fn settings(&self) -> &FormSettings {
        &self.ctx.settings
    }

    /// Document-ready hook: registers the submission, blur and scroll listeners, then the
    /// native validation overlay. Calling it twice has no effect.
    pub fn attach(&mut self) {
        if self.attached {
            tracing::warn!("Form controller already attached");
            return;
        }
        self.attached = true;

        self.attach_submission_listeners();
        self.attach_native_validation();
    }

    fn attach_submission_listeners(&mut self) {
        let page = Arc::clone(&self.ctx.page);
        let document = page.document();
        let newsletter = self.newsletter_form();

        let forms = page.query_all(document, Query::Forms);
        for &form in &forms {
            if Some(form) != newsletter {
                self.register(form, EventKind::Submit, Listener::ContactSubmit);
            }
        }
        if let Some(form) = newsletter {
            self.register(form, EventKind::Submit, Listener::NewsletterSubmit);
        }

        for &form in &forms {
            for field in page.query_all(form, Query::FormControls) {
                self.register(field, EventKind::Blur, Listener::FieldBlur);
            }
        }

        for link in page.query_all(document, Query::FragmentLinks) {
            self.register(link, EventKind::Click, Listener::FragmentScroll);
        }

        tracing::info!(
            "Attached to {} form(s){}",
            forms.len(),
            if newsletter.is_some() { " including the newsletter form" } else { "" }
        );
    }

    fn attach_native_validation(&mut self) {
        let page = Arc::clone(&self.ctx.page);
        let class = self.ctx.settings.forms.native_validation_class.clone();
        let newsletter = self.newsletter_form();

        for form in page.query_all(page.document(), Query::Forms) {
            if page.has_class(form, &class) || Some(form) == newsletter {
                self.register(form, EventKind::Submit, Listener::NativeValidation);
            }
        }
    }

    fn newsletter_form(&self) -> Option<NodeId> {
        let page = &self.ctx.page;
        let id = &self.ctx.settings.forms.newsletter_form_id;
        page.query_all(page.document(), Query::Forms)
            .into_iter()
            .find(|&form| page.attribute(form, "id").as_deref() == Some(id.as_str()))
    }

    fn register(&mut self, target: NodeId, kind: EventKind, listener: Listener) {
        self.registrations.push(Registration {
            target,
            kind,
            listener,
        });
    }

    /// Listeners registered for the target, in the order they run.
    pub fn listeners(&self, target: NodeId, kind: EventKind) -> Vec<Listener> {
        self.registrations
            .iter()
            .filter(|r| r.target == target && r.kind == kind)
            .map(|r| r.listener)
            .collect()
    }

    /// Runs every listener registered for the event's target. Stopping propagation does
    /// not skip listeners on the same target.
    pub fn dispatch(&self, event: PageEvent) -> Dispatch {
        let mut dispatch = Dispatch::default();
        let target = event.target();

        for listener in self.listeners(target, event.kind()) {
            match listener {
                Listener::ContactSubmit => {
                    dispatch.default_prevented = true;
                    dispatch
                        .submissions
                        .push(contact::handle_submit(&self.ctx, target));
                }
                Listener::NewsletterSubmit => {
                    dispatch.default_prevented = true;
                    dispatch
                        .submissions
                        .push(newsletter::handle_submit(&self.ctx, target));
                }
                Listener::NativeValidation => {
                    let effect = native_validation::handle_submit(
                        self.ctx.page.as_ref(),
                        target,
                        &self.ctx.settings.classes.validated,
                    );
                    dispatch.default_prevented |= effect.prevent_default;
                    dispatch.propagation_stopped |= effect.stop_propagation;
                }
                Listener::FieldBlur => {
                    FieldValidator::new(self.ctx.page.as_ref(), &self.ctx.settings)
                        .validate(target);
                }
                Listener::FragmentScroll => {
                    dispatch.default_prevented |= anchor::handle_click(self.ctx.page.as_ref(), target);
                }
            }
        }

        dispatch
    }

    /// Number of forms with a request in flight.
    pub fn in_flight(&self) -> usize {
        self.ctx.in_flight.len()
    }

    /// Cancels the in-flight submission of one form. Its button is still restored.
    pub fn cancel(&self, form: NodeId) -> bool {
        self.ctx.in_flight.cancel(form)
    }

    /// Cancels every in-flight submission and pending banner timer.
    pub fn shutdown(&self) {
        tracing::info!("Shutting down form controller");
        self.shutdown.cancel();
    }
}

impl<P: Page, T: Transport> Drop for FormController<P, T> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
