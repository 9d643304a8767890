use crate::adapters::memory_page::MemoryPage;
use crate::domain::model::NewElement;
use crate::domain::ports::Page;
use crate::utils::error::{FormsError, Result};
use crate::utils::validation::{validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// Declarative description of a page, used to build a [`MemoryPage`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFixture {
    pub base_url: String,
    #[serde(default)]
    pub links: Vec<LinkFixture>,
    #[serde(default)]
    pub sections: Vec<SectionFixture>,
    #[serde(default)]
    pub forms: Vec<FormFixture>,
    #[serde(default = "default_footer")]
    pub footer: bool,
}

fn default_footer() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkFixture {
    pub href: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionFixture {
    pub id: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormFixture {
    pub id: String,
    pub action: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default = "default_submit_label")]
    pub submit_label: String,
    #[serde(default)]
    pub fields: Vec<FieldFixture>,
}

fn default_submit_label() -> String {
    "Submit".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldFixture {
    pub name: String,
    /// Input type; `textarea` produces a textarea element.
    #[serde(rename = "type", default = "default_field_type")]
    pub kind: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub value: String,
}

fn default_field_type() -> String {
    "text".to_string()
}

impl PageFixture {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = crate::config::settings::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed)?)
    }

    /// Lays the page out as header links, sections, one container per form, then the footer.
    pub fn build(&self) -> Result<MemoryPage> {
        self.validate()?;
        let page = MemoryPage::new(Url::parse(&self.base_url)?);
        let document = page.document();

        if !self.links.is_empty() {
            let nav = page.append(document, NewElement::new("nav"));
            for link in &self.links {
                page.append(
                    nav,
                    NewElement::new("a")
                        .attr("href", link.href.as_str())
                        .text(link.text.as_str()),
                );
            }
        }

        for section in &self.sections {
            page.append(
                document,
                NewElement::new("section")
                    .attr("id", section.id.as_str())
                    .text(section.text.as_str()),
            );
        }

        for form in &self.forms {
            let container = page.append(document, NewElement::new("div").class("container"));
            let mut element = NewElement::new("form").attr("id", form.id.as_str());
            if let Some(action) = &form.action {
                element = element.attr("action", action.as_str());
            }
            for class in &form.classes {
                element = element.class(class.as_str());
            }
            let form_node = page.append(container, element);

            for field in &form.fields {
                let group = page.append(form_node, NewElement::new("div").class("mb-3"));
                let mut control = if field.kind.eq_ignore_ascii_case("textarea") {
                    NewElement::new("textarea").text(field.value.as_str())
                } else {
                    NewElement::new("input")
                        .attr("type", field.kind.as_str())
                        .attr("value", field.value.as_str())
                };
                control = control
                    .attr("name", field.name.as_str())
                    .attr("id", format!("{}-{}", form.id, field.name))
                    .class("form-control");
                if field.required {
                    control = control.attr("required", "");
                }
                page.append(group, control);
            }

            page.append(
                form_node,
                NewElement::new("button")
                    .attr("type", "submit")
                    .class("btn")
                    .text(form.submit_label.as_str()),
            );
        }

        if self.footer {
            page.append(document, NewElement::new("footer"));
        }

        Ok(page)
    }
}

impl Validate for PageFixture {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;

        let mut ids = HashSet::new();
        let all_ids = self
            .sections
            .iter()
            .map(|s| s.id.as_str())
            .chain(self.forms.iter().map(|f| f.id.as_str()));
        for id in all_ids {
            if id.trim().is_empty() {
                return Err(FormsError::FixtureError {
                    message: "element ids cannot be empty".to_string(),
                });
            }
            if !ids.insert(id) {
                return Err(FormsError::FixtureError {
                    message: format!("duplicate element id '{}'", id),
                });
            }
        }

        for form in &self.forms {
            let mut names = HashSet::new();
            for field in &form.fields {
                if !names.insert(field.name.as_str()) {
                    return Err(FormsError::FixtureError {
                        message: format!("form '{}' declares field '{}' twice", form.id, field.name),
                    });
                }
            }
        }

        Ok(())
    }
}
