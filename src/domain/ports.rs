use crate::domain::model::{
    Adjacent, ButtonContent, FormRequest, HttpReply, NewElement, NodeId, ScrollOptions,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use url::Url;

/// Typed stand-ins for the handful of selectors the controller needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query<'a> {
    /// `form`
    Forms,
    /// `input, textarea`
    FormControls,
    /// `button[type="submit"]`
    SubmitButton,
    /// `input[type="email"]`
    EmailInput,
    /// `.{class}`
    Class(&'a str),
    /// `footer`
    Footer,
    /// `a[href^="#"]`
    FragmentLinks,
}

/// The page the controller works against. Handles stay valid until the node is removed;
/// operations on a removed node are no-ops.
pub trait Page: Send + Sync + 'static {
    fn base_url(&self) -> Url;
    fn document(&self) -> NodeId;

    /// Descendants of `root` matching `query`, in document order.
    fn query_all(&self, root: NodeId, query: Query<'_>) -> Vec<NodeId>;

    fn query_first(&self, root: NodeId, query: Query<'_>) -> Option<NodeId> {
        self.query_all(root, query).into_iter().next()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn add_class(&self, node: NodeId, class: &str);
    fn remove_class(&self, node: NodeId, class: &str);

    /// Current value of an input or textarea.
    fn value(&self, node: NodeId) -> String;

    fn button_content(&self, button: NodeId) -> ButtonContent;
    fn set_button_content(&self, button: NodeId, content: ButtonContent);
    fn is_disabled(&self, node: NodeId) -> bool;
    fn set_disabled(&self, node: NodeId, disabled: bool);

    /// Creates a detached element.
    fn create_element(&self, element: NewElement) -> NodeId;
    fn append_child(&self, parent: NodeId, child: NodeId);
    fn insert_adjacent(&self, reference: NodeId, position: Adjacent, node: NodeId);
    fn remove(&self, node: NodeId);

    /// Successful controls of the form as name/value pairs, in document order.
    fn form_entries(&self, form: NodeId) -> Vec<(String, String)>;
    /// Built-in constraint validation.
    fn check_validity(&self, form: NodeId) -> bool;
    /// Restores every control of the form to its default value.
    fn reset_form(&self, form: NodeId);

    fn scroll_into_view(&self, node: NodeId, options: ScrollOptions);
    fn push_history(&self, url: &str);
    fn navigate(&self, url: &Url);
}

/// Issues background form posts. Only transport-level problems are errors; any HTTP
/// status comes back as a reply.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn post_form(&self, request: FormRequest) -> Result<HttpReply>;
}
