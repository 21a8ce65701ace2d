#[macro_use]
mod macros;

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod list;
pub mod notify;
pub mod remote;
pub mod resources;

pub use auth::{CredentialProvider, StaticCredentials};
pub use config::Config;
pub use error::{DeskError, Result};
pub use list::{ListController, ListEvent, ListSnapshot, LoadState};
pub use notify::{Notifier, Toast, ToastLevel, ToastQueue};
pub use remote::{CollectionEndpoint, HttpCollection, ListQuery, Page, Transition};
pub use resources::{FilterSet, Identified, Resource, ResourceKind, Sort, SortDirection};
