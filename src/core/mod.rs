pub mod anchor;
pub mod banner;
pub mod contact;
pub mod controller;
pub mod native_validation;
pub mod newsletter;
pub mod submission;
pub mod validator;

pub use crate::domain::model::{
    Adjacent, BannerKind, ButtonContent, FieldError, FieldKind, FormRequest, HttpReply,
    NewElement, NodeId, ScrollBehavior, ScrollBlock, ScrollOptions, SubmissionOutcome,
};
pub use crate::domain::ports::{Page, Query, Transport};
pub use crate::utils::error::Result;
