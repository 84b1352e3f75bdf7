// folio-api library.
// GitHub portfolio data and contact form handling behind a JSON API.

pub mod cache;
pub mod config;
pub mod contact;
pub mod error;
pub mod github;
pub mod http;
pub mod service;

pub use config::Config;
pub use error::{FolioError, Result};
pub use http::{AppState, router};
