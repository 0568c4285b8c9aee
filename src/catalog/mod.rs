//! Read-only registries the stores and projectors look things up in.

pub mod actions;
pub mod playlists;
pub mod widgets;

pub use actions::{ActionCatalog, ActionEntry, ActionType, InstalledAddon};
pub use playlists::{list_playlists, PlaylistFile};
pub use widgets::{SourceKind, WidgetCatalog, WidgetChoice};
