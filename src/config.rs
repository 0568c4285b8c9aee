//! Configuration context threaded through the stores, projectors and editors.
//!
//! Replaces the host's global addon handle: every path the editor touches and
//! the active string table hang off one `ConfigContext`.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_ADDON_ID: &str = "script.homemenu.helper";

const ENV_RESOURCES: &str = "HOME_MENU_RESOURCES";
const ENV_PROFILE: &str = "HOME_MENU_PROFILE";
const ENV_SKIN: &str = "HOME_MENU_SKIN";

const MENU_DEFAULT_FILE: &str = "menu_default.json";
const MENU_USER_FILE: &str = "menu.json";
const MENU_MARKUP_FILE: &str = "Includes_Home_Menucontent.xml";
const WIDGETS_DEFAULT_FILE: &str = "widgets_default.json";
const WIDGETS_USER_FILE: &str = "widgets.json";
const WIDGETS_MARKUP_FILE: &str = "Includes_Home_Widgetcontent.xml";
const ADDON_PATHS_FILE: &str = "widget_addon_pathes.json";
const SETTINGS_FILE: &str = "settings.json";
const LOG_FILE: &str = "home-menu-maker.log";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub addon_id: String,
    pub language: String,
    pub log: bool,
    pub debug_log: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addon_id: DEFAULT_ADDON_ID.to_string(),
            language: "English".to_string(),
            log: false,
            debug_log: false,
        }
    }
}

impl Settings {
    /// Missing file means defaults; a malformed one is reported and ignored.
    pub fn load(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&data) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(
                    target: "home_menu_maker::config",
                    path = %path.display(),
                    error = %err,
                    "ignoring malformed settings file"
                );
                Self::default()
            }
        }
    }
}

/// Numeric string id to display text.
#[derive(Clone, Debug, Default)]
pub struct StringTable {
    strings: HashMap<u32, String>,
}

impl StringTable {
    pub fn load(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => {
                debug!(
                    target: "home_menu_maker::config",
                    path = %path.display(),
                    error = %err,
                    "no string table"
                );
                return Self::default();
            }
        };
        match serde_json::from_str::<HashMap<u32, String>>(&data) {
            Ok(strings) => Self { strings },
            Err(err) => {
                warn!(
                    target: "home_menu_maker::config",
                    path = %path.display(),
                    error = %err,
                    "malformed string table"
                );
                Self::default()
            }
        }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (u32, &'a str)>) -> Self {
        Self {
            strings: pairs
                .into_iter()
                .map(|(id, text)| (id, text.to_string()))
                .collect(),
        }
    }

    /// Unknown ids resolve to an empty string.
    pub fn get(&self, id: u32) -> &str {
        self.strings.get(&id).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaylistKind {
    Video,
    Music,
}

impl PlaylistKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Music => "music",
        }
    }

    /// Host window that browses this playlist kind.
    pub fn window(self) -> &'static str {
        match self {
            Self::Video => "Videos",
            Self::Music => "Music",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ConfigContext {
    pub resources_dir: PathBuf,
    pub profile_dir: PathBuf,
    pub skin_xml_dir: PathBuf,
    pub settings: Settings,
    pub strings: StringTable,
}

impl ConfigContext {
    /// Build a context rooted at explicit directories, loading settings from
    /// the profile and the string table for the configured language.
    pub fn new(
        resources_dir: impl Into<PathBuf>,
        profile_dir: impl Into<PathBuf>,
        skin_xml_dir: impl Into<PathBuf>,
    ) -> Self {
        let resources_dir = resources_dir.into();
        let profile_dir = profile_dir.into();
        let settings = Settings::load(&profile_dir.join(SETTINGS_FILE));
        let strings = StringTable::load(
            &resources_dir
                .join("language")
                .join(&settings.language)
                .join("strings.json"),
        );
        Self {
            resources_dir,
            profile_dir,
            skin_xml_dir: skin_xml_dir.into(),
            settings,
            strings,
        }
    }

    /// Resolve directories from the environment, falling back to the user's
    /// data directory for the profile and `./resources` for bundled data.
    pub fn from_env() -> Self {
        let profile_dir = env::var_os(ENV_PROFILE)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("home-menu-maker")
            });
        let resources_dir = env::var_os(ENV_RESOURCES)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("resources"));
        let skin_xml_dir = env::var_os(ENV_SKIN)
            .map(PathBuf::from)
            .unwrap_or_else(|| profile_dir.join("skin").join("xml"));
        Self::new(resources_dir, profile_dir, skin_xml_dir)
    }

    pub fn with_strings(mut self, strings: StringTable) -> Self {
        self.strings = strings;
        self
    }

    pub fn menu_default_path(&self) -> PathBuf {
        self.resources_dir.join(MENU_DEFAULT_FILE)
    }

    pub fn menu_user_path(&self) -> PathBuf {
        self.addon_data_dir().join(MENU_USER_FILE)
    }

    pub fn menu_markup_path(&self) -> PathBuf {
        self.skin_xml_dir.join(MENU_MARKUP_FILE)
    }

    pub fn widgets_default_path(&self) -> PathBuf {
        self.resources_dir.join(WIDGETS_DEFAULT_FILE)
    }

    pub fn widgets_user_path(&self) -> PathBuf {
        self.addon_data_dir().join(WIDGETS_USER_FILE)
    }

    pub fn widgets_markup_path(&self) -> PathBuf {
        self.skin_xml_dir.join(WIDGETS_MARKUP_FILE)
    }

    pub fn addon_paths_path(&self) -> PathBuf {
        self.addon_data_dir().join(ADDON_PATHS_FILE)
    }

    pub fn playlists_dir(&self, kind: PlaylistKind) -> PathBuf {
        self.profile_dir.join("playlists").join(kind.as_str())
    }

    pub fn rpc_dir(&self) -> PathBuf {
        self.profile_dir.join("rpc")
    }

    pub fn log_path(&self) -> PathBuf {
        self.profile_dir.join(LOG_FILE)
    }

    fn addon_data_dir(&self) -> PathBuf {
        self.profile_dir
            .join("addon_data")
            .join(&self.settings.addon_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_and_strings_load_from_directories() {
        let resources = tempfile::tempdir().expect("tempdir creation should succeed");
        let profile = tempfile::tempdir().expect("tempdir creation should succeed");
        let lang_dir = resources.path().join("language").join("German");
        fs::create_dir_all(&lang_dir).expect("language dir should be created");
        fs::write(lang_dir.join("strings.json"), r#"{"30022": "Neuer Eintrag"}"#)
            .expect("strings should be written");
        fs::write(
            profile.path().join(SETTINGS_FILE),
            r#"{"language": "German", "log": true}"#,
        )
        .expect("settings should be written");

        let ctx = ConfigContext::new(resources.path(), profile.path(), profile.path());
        assert_eq!(ctx.settings.language, "German");
        assert!(ctx.settings.log);
        assert_eq!(ctx.settings.addon_id, DEFAULT_ADDON_ID);
        assert_eq!(ctx.strings.get(30022), "Neuer Eintrag");
        assert_eq!(ctx.strings.get(1), "");
        assert!(ctx
            .menu_user_path()
            .ends_with("addon_data/script.homemenu.helper/menu.json"));
    }

    #[test]
    fn malformed_settings_fall_back_to_defaults() {
        let profile = tempfile::tempdir().expect("tempdir creation should succeed");
        fs::write(profile.path().join(SETTINGS_FILE), "{ not json")
            .expect("settings should be written");
        assert_eq!(
            Settings::load(&profile.path().join(SETTINGS_FILE)),
            Settings::default()
        );
    }
}
