pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{http::ReqwestTransport, memory_page::MemoryPage};
pub use app::driver::{HeadlessDriver, Step};
pub use config::{FormSettings, PageFixture};
pub use self::core::controller::{Dispatch, EventKind, FormController, Listener, PageEvent};
pub use domain::model::{FieldError, SubmissionOutcome};
pub use domain::ports::{Page, Query, Transport};
pub use utils::error::{FormsError, Result};
