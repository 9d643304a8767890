use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Opaque handle to a node owned by a [`Page`](crate::domain::ports::Page).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// What a field's `type` attribute asks the validator to check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Email,
    Other(String),
}

impl FieldKind {
    pub fn from_type_attr(value: Option<&str>) -> Self {
        match value {
            Some(t) if t.eq_ignore_ascii_case("email") => FieldKind::Email,
            Some(t) => FieldKind::Other(t.to_ascii_lowercase()),
            None => FieldKind::Other("text".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field is required but empty")]
    RequiredFieldMissing,
    #[error("value is not a valid email address")]
    InvalidEmailFormat,
}

/// Content of a submit button. `Loading` renders a spinner, optionally followed by a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum ButtonContent {
    Text(String),
    Loading(Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerKind {
    Success,
    Danger,
}

impl BannerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BannerKind::Success => "success",
            BannerKind::Danger => "danger",
        }
    }
}

/// Where `insert_adjacent` places a node relative to its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacent {
    BeforeBegin,
    AfterEnd,
}

/// Element to be created by the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewElement {
    pub tag: String,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
    pub text: String,
}

impl NewElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBlock {
    Start,
    Center,
    End,
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollOptions {
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

impl ScrollOptions {
    pub const SMOOTH_TO_START: ScrollOptions = ScrollOptions {
        behavior: ScrollBehavior::Smooth,
        block: ScrollBlock::Start,
    };
}

/// A background form POST, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRequest {
    pub url: Url,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

/// The parts of an HTTP response the submission flows look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub redirected: bool,
    pub url: Url,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }

    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}

/// How a single submit attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// At least one field failed validation; nothing was sent.
    Invalid,
    /// The same form already has a request in flight; nothing was sent.
    AlreadyInFlight,
    /// The server redirected; the page navigated to the final URL.
    Redirected(Url),
    Succeeded,
    Failed(String),
    Cancelled,
}

impl SubmissionOutcome {
    pub fn sent_request(&self) -> bool {
        !matches!(self, SubmissionOutcome::Invalid | SubmissionOutcome::AlreadyInFlight)
    }
}
