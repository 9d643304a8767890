use crate::domain::model::{Adjacent, ButtonContent, NewElement, NodeId, ScrollOptions};
use crate::domain::ports::{Page, Query};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};
use url::Url;

/// The HTML "valid email address" production used by built-in constraint validation.
static HTML_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("HTML email pattern is a valid regex")
});

const DOCUMENT: NodeId = NodeId(0);

#[derive(Debug, Clone)]
struct MemoryNode {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    text: String,
    value: String,
    default_value: String,
    disabled: bool,
    button: Option<ButtonContent>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl MemoryNode {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            text: String::new(),
            value: String::new(),
            default_value: String::new(),
            disabled: false,
            button: None,
            parent: None,
            children: Vec::new(),
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn is_control(&self) -> bool {
        self.tag == "input" || self.tag == "textarea"
    }

    fn input_type(&self) -> String {
        self.attr("type").unwrap_or("text").to_ascii_lowercase()
    }

    fn matches(&self, query: Query<'_>) -> bool {
        match query {
            Query::Forms => self.tag == "form",
            Query::FormControls => self.is_control(),
            Query::SubmitButton => {
                self.tag == "button" && self.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("submit"))
            }
            Query::EmailInput => self.tag == "input" && self.input_type() == "email",
            Query::Class(class) => self.classes.iter().any(|c| c == class),
            Query::Footer => self.tag == "footer",
            Query::FragmentLinks => self.tag == "a" && self.attr("href").is_some_and(|h| h.starts_with('#')),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrollRecord {
    pub node: NodeId,
    pub options: ScrollOptions,
}

#[derive(Debug, Default)]
struct PageTree {
    nodes: Vec<MemoryNode>,
    history: Vec<String>,
    navigations: Vec<String>,
    scrolls: Vec<ScrollRecord>,
}

impl PageTree {
    fn node(&self, id: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut MemoryNode> {
        self.nodes.get_mut(id.0)
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.node(root) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.node(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent) = self.node_mut(parent) {
            parent.children.retain(|&child| child != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    fn is_connected(&self, mut id: NodeId) -> bool {
        loop {
            if id == DOCUMENT {
                return true;
            }
            match self.node(id).and_then(|n| n.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    fn controls(&self, form: NodeId) -> Vec<NodeId> {
        self.descendants(form)
            .into_iter()
            .filter(|&id| self.node(id).is_some_and(MemoryNode::is_control))
            .collect()
    }
}

/// In-memory page tree implementing [`Page`]. Records scrolls, history pushes and
/// navigations instead of performing them.
///
/// Removed nodes are detached but stay in the arena for the life of the page, so every
/// banner and feedback message grows it by one node. Fine for tests and one-shot driver
/// runs; not meant for long-lived pages.
#[derive(Debug)]
pub struct MemoryPage {
    base_url: Url,
    tree: Mutex<PageTree>,
}

impl MemoryPage {
    pub fn new(base_url: Url) -> Self {
        let tree = PageTree {
            nodes: vec![MemoryNode::new("#document")],
            ..Default::default()
        };
        Self {
            base_url,
            tree: Mutex::new(tree),
        }
    }

    fn tree(&self) -> MutexGuard<'_, PageTree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates an element and appends it to `parent`.
    pub fn append(&self, parent: NodeId, element: NewElement) -> NodeId {
        let id = self.create_element(element);
        self.append_child(parent, id);
        id
    }

    /// Simulates the user typing into a control.
    pub fn set_value(&self, node: NodeId, value: &str) {
        if let Some(node) = self.tree().node_mut(node) {
            node.value = value.to_string();
        }
    }

    pub fn text(&self, node: NodeId) -> String {
        self.tree().node(node).map(|n| n.text.clone()).unwrap_or_default()
    }

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.tree().node(node).map(|n| n.classes.clone()).unwrap_or_default()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree().node(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.tree().is_connected(node)
    }

    /// First control named `name` inside the form with the given id.
    pub fn field(&self, form_id: &str, name: &str) -> Option<NodeId> {
        let form = self.element_by_id(form_id)?;
        let tree = self.tree();
        tree.controls(form)
            .into_iter()
            .find(|&id| tree.node(id).and_then(|n| n.attr("name")) == Some(name))
    }

    pub fn history(&self) -> Vec<String> {
        self.tree().history.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.tree().navigations.clone()
    }

    pub fn scrolls(&self) -> Vec<ScrollRecord> {
        self.tree().scrolls.clone()
    }

    pub fn snapshot(&self) -> PageSnapshot {
        let tree = self.tree();
        PageSnapshot {
            url: self.base_url.to_string(),
            document: snapshot_node(&tree, DOCUMENT),
            history: tree.history.clone(),
            navigations: tree.navigations.clone(),
            scrolls: tree.scrolls.clone(),
        }
    }
}

/// Serializable view of the page, used by the headless driver's output.
#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot {
    pub url: String,
    pub document: SnapshotNode,
    pub history: Vec<String>,
    pub navigations: Vec<String>,
    pub scrolls: Vec<ScrollRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotNode {
    pub node: NodeId,
    pub tag: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
}

fn snapshot_node(tree: &PageTree, id: NodeId) -> SnapshotNode {
    let node = &tree.nodes[id.0];
    SnapshotNode {
        node: id,
        tag: node.tag.clone(),
        attributes: node.attributes.clone(),
        classes: node.classes.clone(),
        text: node.text.clone(),
        value: node.is_control().then(|| node.value.clone()),
        disabled: node.disabled,
        children: node
            .children
            .iter()
            .map(|&child| snapshot_node(tree, child))
            .collect(),
    }
}

impl Page for MemoryPage {
    fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    fn document(&self) -> NodeId {
        DOCUMENT
    }

    fn query_all(&self, root: NodeId, query: Query<'_>) -> Vec<NodeId> {
        let tree = self.tree();
        tree.descendants(root)
            .into_iter()
            .filter(|&id| tree.node(id).is_some_and(|n| n.matches(query)))
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let tree = self.tree();
        tree.descendants(DOCUMENT)
            .into_iter()
            .find(|&node| tree.node(node).and_then(|n| n.attr("id")) == Some(id))
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree().node(node).and_then(|n| n.parent)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree()
            .node(node)
            .and_then(|n| n.attr(name).map(str::to_string))
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.tree()
            .node(node)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn add_class(&self, node: NodeId, class: &str) {
        if let Some(node) = self.tree().node_mut(node) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        if let Some(node) = self.tree().node_mut(node) {
            node.classes.retain(|c| c != class);
        }
    }

    fn value(&self, node: NodeId) -> String {
        self.tree().node(node).map(|n| n.value.clone()).unwrap_or_default()
    }

    fn button_content(&self, button: NodeId) -> ButtonContent {
        match self.tree().node(button) {
            Some(node) => node
                .button
                .clone()
                .unwrap_or_else(|| ButtonContent::Text(node.text.clone())),
            None => ButtonContent::Text(String::new()),
        }
    }

    fn set_button_content(&self, button: NodeId, content: ButtonContent) {
        if let Some(node) = self.tree().node_mut(button) {
            node.text = match &content {
                ButtonContent::Text(text) => text.clone(),
                ButtonContent::Loading(label) => label.clone().unwrap_or_default(),
            };
            node.button = Some(content);
        }
    }

    fn is_disabled(&self, node: NodeId) -> bool {
        self.tree().node(node).is_some_and(|n| n.disabled)
    }

    fn set_disabled(&self, node: NodeId, disabled: bool) {
        if let Some(node) = self.tree().node_mut(node) {
            node.disabled = disabled;
        }
    }

    fn create_element(&self, element: NewElement) -> NodeId {
        let mut node = MemoryNode::new(&element.tag);
        for (name, value) in element.attributes {
            if name == "class" {
                node.classes
                    .extend(value.split_whitespace().map(str::to_string));
            } else {
                node.attributes.insert(name, value);
            }
        }
        for class in element.classes {
            if !node.classes.contains(&class) {
                node.classes.push(class);
            }
        }
        if node.is_control() {
            let initial = node.attr("value").unwrap_or(&element.text).to_string();
            node.value = initial.clone();
            node.default_value = initial;
        } else {
            node.text = element.text;
        }
        node.disabled = node.attributes.contains_key("disabled");

        let mut tree = self.tree();
        tree.nodes.push(node);
        NodeId(tree.nodes.len() - 1)
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        let mut tree = self.tree();
        if parent == child || tree.node(parent).is_none() || tree.node(child).is_none() {
            return;
        }
        tree.detach(child);
        if let Some(node) = tree.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = tree.node_mut(parent) {
            node.children.push(child);
        }
    }

    fn insert_adjacent(&self, reference: NodeId, position: Adjacent, node: NodeId) {
        let mut tree = self.tree();
        let Some(parent) = tree.node(reference).and_then(|n| n.parent) else {
            return;
        };
        if tree.node(node).is_none() || node == reference {
            return;
        }
        tree.detach(node);

        let Some(parent_node) = tree.node_mut(parent) else {
            return;
        };
        let Some(index) = parent_node.children.iter().position(|&c| c == reference) else {
            return;
        };
        let index = match position {
            Adjacent::BeforeBegin => index,
            Adjacent::AfterEnd => index + 1,
        };
        parent_node.children.insert(index, node);
        if let Some(inserted) = tree.node_mut(node) {
            inserted.parent = Some(parent);
        }
    }

    fn remove(&self, node: NodeId) {
        if node != DOCUMENT {
            self.tree().detach(node);
        }
    }

    fn form_entries(&self, form: NodeId) -> Vec<(String, String)> {
        let tree = self.tree();
        tree.controls(form)
            .into_iter()
            .filter_map(|id| tree.node(id))
            .filter(|node| !node.disabled)
            .filter_map(|node| {
                let name = node.attr("name")?;
                match node.input_type().as_str() {
                    "submit" | "button" | "reset" | "image" | "file" => None,
                    "checkbox" | "radio" if !node.attributes.contains_key("checked") => None,
                    "checkbox" | "radio" if node.value.is_empty() => {
                        Some((name.to_string(), "on".to_string()))
                    }
                    _ => Some((name.to_string(), node.value.clone())),
                }
            })
            .collect()
    }

    fn check_validity(&self, form: NodeId) -> bool {
        let tree = self.tree();
        tree.controls(form)
            .into_iter()
            .filter_map(|id| tree.node(id))
            .filter(|node| !node.disabled && node.input_type() != "hidden")
            .all(|node| {
                let is_email = node.tag == "input" && node.input_type() == "email";
                // email inputs sanitize away surrounding ASCII whitespace
                let value = if is_email {
                    node.value.trim_matches(|c: char| c.is_ascii_whitespace())
                } else {
                    node.value.as_str()
                };
                if node.attributes.contains_key("required") && value.is_empty() {
                    return false;
                }
                !(is_email && !value.is_empty() && !HTML_EMAIL.is_match(value))
            })
    }

    fn reset_form(&self, form: NodeId) {
        let mut tree = self.tree();
        for id in tree.controls(form) {
            if let Some(node) = tree.node_mut(id) {
                node.value = node.default_value.clone();
            }
        }
    }

    fn scroll_into_view(&self, node: NodeId, options: ScrollOptions) {
        self.tree().scrolls.push(ScrollRecord { node, options });
    }

    fn push_history(&self, url: &str) {
        self.tree().history.push(url.to_string());
    }

    fn navigate(&self, url: &Url) {
        self.tree().navigations.push(url.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> MemoryPage {
        MemoryPage::new(Url::parse("https://example.test/").unwrap())
    }

    #[test]
    fn test_insert_adjacent_and_remove() {
        let page = page();
        let container = page.append(page.document(), NewElement::new("div"));
        let form = page.append(container, NewElement::new("form").attr("id", "f"));

        let after = page.create_element(NewElement::new("div").class("alert"));
        page.insert_adjacent(form, Adjacent::AfterEnd, after);
        let before = page.create_element(NewElement::new("p"));
        page.insert_adjacent(form, Adjacent::BeforeBegin, before);

        assert_eq!(page.children(container), vec![before, form, after]);
        assert_eq!(page.query_first(container, Query::Class("alert")), Some(after));

        page.remove(after);
        assert!(!page.is_connected(after));
        assert_eq!(page.query_first(container, Query::Class("alert")), None);
    }

    #[test]
    fn test_form_entries_and_reset() {
        let page = page();
        let form = page.append(page.document(), NewElement::new("form"));
        let name = page.append(form, NewElement::new("input").attr("name", "name").attr("value", "Ada"));
        page.append(form, NewElement::new("input").attr("type", "hidden").attr("name", "csrf_token").attr("value", "t0k"));
        page.append(form, NewElement::new("input").attr("type", "checkbox").attr("name", "optin"));
        page.append(form, NewElement::new("textarea").attr("name", "message"));
        page.append(form, NewElement::new("button").attr("type", "submit").text("Send"));

        page.set_value(name, "Grace");
        assert_eq!(
            page.form_entries(form),
            vec![
                ("name".to_string(), "Grace".to_string()),
                ("csrf_token".to_string(), "t0k".to_string()),
                ("message".to_string(), String::new()),
            ]
        );

        page.reset_form(form);
        assert_eq!(page.value(name), "Ada");
    }

    #[test]
    fn test_builtin_validity() {
        let page = page();
        let form = page.append(page.document(), NewElement::new("form"));
        let email = page.append(
            form,
            NewElement::new("input").attr("type", "email").attr("name", "email").attr("required", ""),
        );

        assert!(!page.check_validity(form));
        page.set_value(email, "user@localhost");
        assert!(page.check_validity(form));
        page.set_value(email, "not an email");
        assert!(!page.check_validity(form));
        page.set_value(email, "  user@example.com\n");
        assert!(page.check_validity(form));
        page.set_value(email, "   ");
        assert!(!page.check_validity(form));
    }

    #[test]
    fn test_button_content_roundtrip() {
        let page = page();
        let button = page.append(page.document(), NewElement::new("button").text("Subscribe"));
        assert_eq!(page.button_content(button), ButtonContent::Text("Subscribe".to_string()));

        page.set_button_content(button, ButtonContent::Loading(None));
        assert_eq!(page.text(button), "");
        assert_eq!(page.button_content(button), ButtonContent::Loading(None));
    }
}
