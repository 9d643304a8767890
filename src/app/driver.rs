use crate::adapters::memory_page::MemoryPage;
use crate::config::settings::FormSettings;
use crate::core::controller::{FormController, PageEvent};
use crate::core::submission::SubmissionHandle;
use crate::core::{Page, Query, SubmissionOutcome, Transport};
use crate::utils::error::{FormsError, Result};
use std::str::FromStr;
use std::sync::Arc;

/// One scripted user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Fill {
        form: String,
        field: String,
        value: String,
    },
    Blur {
        form: String,
        field: String,
    },
    Submit {
        form: String,
    },
    Click {
        href: String,
    },
}

fn field_path(step: &str, path: &str) -> Result<(String, String)> {
    match path.split_once('.') {
        Some((form, field)) if !form.is_empty() && !field.is_empty() => {
            Ok((form.to_string(), field.to_string()))
        }
        _ => Err(FormsError::FixtureError {
            message: format!("step '{}' needs <form>.<field>, got '{}'", step, path),
        }),
    }
}

impl FromStr for Step {
    type Err = FormsError;

    fn from_str(s: &str) -> Result<Self> {
        let (action, rest) = s.split_once(':').ok_or_else(|| FormsError::FixtureError {
            message: format!("step '{}' is missing an action prefix", s),
        })?;

        match action {
            "fill" => {
                let (path, value) = rest.split_once('=').ok_or_else(|| FormsError::FixtureError {
                    message: format!("fill step '{}' needs '=<value>'", s),
                })?;
                let (form, field) = field_path(action, path)?;
                Ok(Step::Fill {
                    form,
                    field,
                    value: value.to_string(),
                })
            }
            "blur" => {
                let (form, field) = field_path(action, rest)?;
                Ok(Step::Blur { form, field })
            }
            "submit" if !rest.is_empty() => Ok(Step::Submit {
                form: rest.to_string(),
            }),
            "click" => Ok(Step::Click {
                href: rest.to_string(),
            }),
            _ => Err(FormsError::FixtureError {
                message: format!("unknown step '{}'", s),
            }),
        }
    }
}

/// Runs scripted steps against a [`MemoryPage`] through a real controller. Submissions
/// are not awaited between steps, so two quick submits of one form overlap the way they
/// would in a browser.
pub struct HeadlessDriver<T: Transport> {
    controller: FormController<MemoryPage, T>,
    pending: Vec<SubmissionHandle>,
}

impl<T: Transport> HeadlessDriver<T> {
    pub fn new(page: MemoryPage, transport: T, settings: FormSettings) -> Self {
        let mut controller = FormController::new(Arc::new(page), Arc::new(transport), settings);
        controller.attach();
        Self {
            controller,
            pending: Vec::new(),
        }
    }

    pub fn page(&self) -> &Arc<MemoryPage> {
        self.controller.page()
    }

    pub fn controller(&self) -> &FormController<MemoryPage, T> {
        &self.controller
    }

    pub fn apply(&mut self, step: &Step) -> Result<()> {
        let page = Arc::clone(self.controller.page());
        tracing::debug!("Applying step {:?}", step);

        match step {
            Step::Fill { form, field, value } => {
                let node = Self::field(&page, form, field)?;
                page.set_value(node, value);
            }
            Step::Blur { form, field } => {
                let node = Self::field(&page, form, field)?;
                self.controller.dispatch(PageEvent::Blur(node));
            }
            Step::Submit { form } => {
                let node = page
                    .element_by_id(form)
                    .filter(|&node| page.query_all(page.document(), Query::Forms).contains(&node))
                    .ok_or_else(|| FormsError::FixtureError {
                        message: format!("no form with id '{}'", form),
                    })?;
                let dispatch = self.controller.dispatch(PageEvent::Submit(node));
                if !dispatch.default_prevented {
                    tracing::debug!("Submit of '{}' was not intercepted", form);
                }
                self.pending.extend(dispatch.submissions);
            }
            Step::Click { href } => {
                let link = page
                    .query_all(page.document(), Query::FragmentLinks)
                    .into_iter()
                    .find(|&link| page.attribute(link, "href").as_deref() == Some(href.as_str()))
                    .ok_or_else(|| FormsError::FixtureError {
                        message: format!("no fragment link with href '{}'", href),
                    })?;
                let dispatch = self.controller.dispatch(PageEvent::Click(link));
                if !dispatch.default_prevented {
                    let target = page.base_url().join(href)?;
                    page.navigate(&target);
                }
            }
        }

        Ok(())
    }

    /// Applies every step, then waits for the submissions they started.
    pub async fn run(&mut self, steps: &[Step]) -> Result<Vec<SubmissionOutcome>> {
        for step in steps {
            self.apply(step)?;
        }
        Ok(self.settle().await)
    }

    pub async fn settle(&mut self) -> Vec<SubmissionOutcome> {
        let mut outcomes = Vec::with_capacity(self.pending.len());
        for submission in self.pending.drain(..) {
            outcomes.push(submission.outcome().await);
        }
        outcomes
    }

    fn field(page: &MemoryPage, form: &str, field: &str) -> Result<crate::core::NodeId> {
        page.field(form, field).ok_or_else(|| FormsError::FixtureError {
            message: format!("form '{}' has no field '{}'", form, field),
        })
    }
}
