use crate::config::settings::FormSettings;
use crate::core::banner::Banners;
use crate::core::{ButtonContent, FormRequest, HttpReply, NodeId, Page, Query, SubmissionOutcome, Transport};
use crate::utils::error::{FormsError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::form_urlencoded;

/// Shared collaborators for the submission flows.
pub struct FlowContext<P: Page, T: Transport> {
    pub page: Arc<P>,
    pub transport: Arc<T>,
    pub settings: Arc<FormSettings>,
    pub banners: Banners<P>,
    pub in_flight: Arc<InFlight>,
}

/// Builds the background POST for a form: urlencoded entries sent to its resolved action.
pub fn build_request<P: Page>(page: &P, form: NodeId, settings: &FormSettings) -> Result<FormRequest> {
    let base = page.base_url();
    let url = match page.attribute(form, "action") {
        Some(action) if !action.trim().is_empty() => base.join(action.trim())?,
        _ => base,
    };

    let body = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(page.form_entries(form))
        .finish();

    Ok(FormRequest {
        url,
        body,
        headers: vec![
            (
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            ),
            (
                "X-Requested-With".to_string(),
                settings.http.requested_with.clone(),
            ),
        ],
    })
}

/// Sends the request unless the submission is cancelled first.
pub(crate) async fn send<T: Transport>(
    transport: &T,
    request: Result<FormRequest>,
    token: &CancellationToken,
) -> Option<Result<HttpReply>> {
    let request = match request {
        Ok(request) => request,
        Err(e) => return Some(Err(e)),
    };

    tracing::debug!("POST {} ({} bytes)", request.url, request.body.len());
    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        reply = transport.post_form(request) => Some(reply),
    }
}

/// Tracks which forms have a request in flight. Each submission gets a child of the
/// controller's shutdown token.
#[derive(Debug)]
pub struct InFlight {
    active: Mutex<HashMap<NodeId, CancellationToken>>,
    shutdown: CancellationToken,
}

impl InFlight {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            active: Mutex::new(HashMap::new()),
            shutdown,
        }
    }

    /// Claims the form for a new submission; `None` if one is already running.
    pub fn begin(self: &Arc<Self>, form: NodeId) -> Option<SubmissionGuard> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.contains_key(&form) {
            return None;
        }

        let token = self.shutdown.child_token();
        active.insert(form, token.clone());
        Some(SubmissionGuard {
            registry: Arc::clone(self),
            form,
            token,
        })
    }

    pub fn is_active(&self, form: NodeId) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&form)
    }

    /// Cancels the in-flight submission of one form, if any.
    pub fn cancel(&self, form: NodeId) -> bool {
        match self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&form)
        {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.active.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Releases the form's in-flight slot when the submission ends, however it ends.
#[derive(Debug)]
pub struct SubmissionGuard {
    registry: Arc<InFlight>,
    form: NodeId,
    token: CancellationToken,
}

impl SubmissionGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        self.registry
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.form);
    }
}

/// Puts a submit button into its loading state and restores the original content and
/// enabled state on drop.
pub struct BusyButton<P: Page> {
    page: Arc<P>,
    button: Option<NodeId>,
    original: Option<ButtonContent>,
}

impl<P: Page> BusyButton<P> {
    pub fn engage(page: Arc<P>, form: NodeId, loading: ButtonContent) -> Self {
        let button = page.query_first(form, Query::SubmitButton);
        let original = button.map(|button| {
            let original = page.button_content(button);
            page.set_button_content(button, loading);
            page.set_disabled(button, true);
            original
        });

        Self {
            page,
            button,
            original,
        }
    }
}

impl<P: Page> Drop for BusyButton<P> {
    fn drop(&mut self) {
        if let (Some(button), Some(original)) = (self.button, self.original.take()) {
            self.page.set_button_content(button, original);
            self.page.set_disabled(button, false);
        }
    }
}

/// Result of dispatching a submit. Halted submissions resolve immediately.
#[derive(Debug)]
pub enum SubmissionHandle {
    Ready(SubmissionOutcome),
    Pending(JoinHandle<SubmissionOutcome>),
}

impl SubmissionHandle {
    pub async fn outcome(self) -> SubmissionOutcome {
        match self {
            SubmissionHandle::Ready(outcome) => outcome,
            SubmissionHandle::Pending(handle) => match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Submission task failed: {}", e);
                    SubmissionOutcome::Failed(e.to_string())
                }
            },
        }
    }
}

pub(crate) fn describe_failure(error: &FormsError) -> String {
    match error {
        FormsError::Http(e) => format!("transport error: {}", e),
        other => other.to_string(),
    }
}
