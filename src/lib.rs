//! Terminal client for a product-manual question answering backend.
//!
//! Ask free-form questions about one product's manual and compare two
//! products specification by specification.

pub mod api;
pub mod app;
pub mod catalog;
pub mod chat;
pub mod compare;
pub mod config;
pub mod error;
pub mod handler;
pub mod input;
pub mod logging;
pub mod markup;
pub mod tui;
pub mod ui;

pub use api::ManualsClient;
pub use app::{App, Focus};
pub use config::Config;
pub use error::{ClientError, ValidationError};
pub use tui::{AppEvent, EventHandler};
