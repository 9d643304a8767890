#![allow(dead_code)]

use async_trait::async_trait;
use site_forms::core::{FormRequest, HttpReply, NodeId, Page, Query};
use site_forms::{FormsError, MemoryPage, PageFixture, Result, Transport};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use url::Url;

pub const PAGE: &str = r##"
base_url = "https://example.test/"

[[links]]
href = "#about"
text = "About"

[[links]]
href = "#missing"
text = "Nowhere"

[[links]]
href = "#"
text = "Top"

[[sections]]
id = "about"
text = "About us"

[[forms]]
id = "contact-form"
action = "/contact"
classes = ["needs-validation"]
submit_label = "Submit Your Information"

[[forms.fields]]
name = "first_name"
required = true

[[forms.fields]]
name = "last_name"
required = true

[[forms.fields]]
name = "email"
type = "email"
required = true

[[forms.fields]]
name = "message"
type = "textarea"
required = true

[[forms]]
id = "quote-form"
action = "/quote"

[[forms.fields]]
name = "company"

[[forms]]
id = "newsletter-form"
action = "/"
submit_label = "Subscribe"

[[forms.fields]]
name = "email"
type = "email"
required = true
"##;

pub fn page() -> MemoryPage {
    PageFixture::from_toml_str(PAGE).unwrap().build().unwrap()
}

pub fn page_without_footer() -> MemoryPage {
    let mut fixture = PageFixture::from_toml_str(PAGE).unwrap();
    fixture.footer = false;
    fixture.build().unwrap()
}

pub fn form(page: &MemoryPage, id: &str) -> NodeId {
    page.element_by_id(id).unwrap()
}

pub fn submit_button(page: &MemoryPage, form: NodeId) -> NodeId {
    page.query_first(form, Query::SubmitButton).unwrap()
}

pub fn banners(page: &MemoryPage) -> Vec<NodeId> {
    page.query_all(page.document(), Query::Class("alert"))
}

pub fn fill_contact(page: &MemoryPage) {
    page.set_value(page.field("contact-form", "first_name").unwrap(), "Ada");
    page.set_value(page.field("contact-form", "last_name").unwrap(), "Lovelace");
    page.set_value(page.field("contact-form", "email").unwrap(), "ada@example.com");
    page.set_value(page.field("contact-form", "message").unwrap(), "Hello there");
}

pub fn reply(status: u16, content_type: &str, body: &str) -> HttpReply {
    HttpReply {
        status,
        redirected: false,
        url: Url::parse("https://example.test/contact").unwrap(),
        content_type: Some(content_type.to_string()),
        body: body.as_bytes().to_vec(),
    }
}

pub fn json_ok() -> HttpReply {
    reply(200, "application/json", r#"{"success": true}"#)
}

pub enum Scripted {
    Reply(HttpReply),
    Fail(String),
}

/// Transport double: records every request and answers from a script. With a gate,
/// each request waits for `release()` before answering.
#[derive(Clone, Default)]
pub struct StubTransport {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<FormRequest>>>,
    gate: Option<Arc<Notify>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(reply: HttpReply) -> Self {
        let transport = Self::new();
        transport
            .script
            .try_lock()
            .unwrap()
            .push_back(Scripted::Reply(reply));
        transport
    }

    pub fn failing(message: &str) -> Self {
        let transport = Self::new();
        transport
            .script
            .try_lock()
            .unwrap()
            .push_back(Scripted::Fail(message.to_string()));
        transport
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub async fn push(&self, scripted: Scripted) {
        self.script.lock().await.push_back(scripted);
    }

    pub async fn requests(&self) -> Vec<FormRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn post_form(&self, request: FormRequest) -> Result<HttpReply> {
        self.requests.lock().await.push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match self.script.lock().await.pop_front() {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Fail(message)) => Err(FormsError::TransportFailure { message }),
            None => Ok(json_ok()),
        }
    }
}
