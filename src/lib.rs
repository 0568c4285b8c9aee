//! Home screen menu and widget editor for a media-center skin.
//!
//! The user-editable menu tree and widget list live in JSON stores; every
//! commit regenerates the skin include files the host renders from. The host
//! itself is only reached through the [`host`] traits.

pub mod catalog;
pub mod config;
pub mod editor;
pub mod error;
pub mod host;
pub mod label;
pub mod logging;
pub mod markup;
pub mod store;

pub use config::{ConfigContext, Settings, StringTable};
pub use editor::{MenuEditor, Row, WidgetEditor};
pub use error::{LogInitError, MarkupError, QueryError, StoreError};
pub use label::Label;
