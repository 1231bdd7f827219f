//! Anthropic model component for the workflow builder: form definition,
//! capability-filtered model catalog and the configuration refresh that keeps
//! the model picker in sync with the caller's credentials.

pub mod catalog;
pub mod component;
pub mod error;
pub mod form;
pub mod refresh;
pub mod session;

pub use {
    catalog::CatalogResolver,
    component::{ComponentInputs, METADATA, build_model, default_form, form_from_config},
    error::{Error, Result},
    form::{FieldDescriptor, FieldType, FieldUpdate, FormConfiguration},
    refresh::{ConfigurationRefresh, REFRESH_FIELDS, RefreshState, RefreshTrigger},
    session::ComponentSession,
};
