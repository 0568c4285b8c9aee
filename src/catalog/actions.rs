//! Registry of menu actions: what a main-menu or submenu entry can open.
//!
//! Static tables cover library nodes, windows and fixed commands. Playlists and
//! installed add-ons are listed on first use and memoised until `reload`.

use std::cell::OnceCell;
use std::path::PathBuf;
use std::rc::Rc;

use serde::Deserialize;
use tracing::warn;

use crate::catalog::playlists::{list_playlists, PlaylistFile};
use crate::config::{ConfigContext, PlaylistKind, StringTable};
use crate::host::{QueryRequest, QueryService};
use crate::label::Label;

/// Label id for an unset action type.
const UNSET_TYPE_LABEL: u32 = 30116;
const TYPE_LABEL_BASE: u32 = 30100;
const THUMB_SIZE_LABELS: [u32; 3] = [30294, 30293, 30292];
const PLAYLIST_THUMB: &str = "DefaultPlaylist.png";

type StaticAction = (u32, &'static str, &'static str);

const MOVIE_ACTIONS: &[StaticAction] = &[
    (342, "titles", "DefaultMovies.png"),
    (20382, "recentlyaddedmovies", "DefaultRecentlyAddedMovies.png"),
    (135, "genres", "DefaultGenre.png"),
    (652, "years", "DefaultYear.png"),
    (344, "actors", "DefaultActor.png"),
    (20348, "directors", "DefaultDirector.png"),
    (20388, "studios", "DefaultStudios.png"),
    (20434, "sets", "DefaultSets.png"),
    (20451, "countries", "DefaultCountry.png"),
    (20459, "tags", "DefaultTags.png"),
];

const TVSHOW_ACTIONS: &[StaticAction] = &[
    (20343, "titles", "DefaultTVShows.png"),
    (20382, "recentlyaddedepisodes", "DefaultRecentlyAddedEpisodes.png"),
    (575, "inprogresstvshows", "DefaultInProgressShows.png"),
    (135, "genres", "DefaultGenre.png"),
    (652, "years", "DefaultYear.png"),
    (344, "actors", "DefaultActor.png"),
    (20348, "directors", "DefaultDirector.png"),
    (20388, "studios", "DefaultStudios.png"),
    (20459, "tags", "DefaultTags.png"),
];

const MUSIC_ACTIONS: &[StaticAction] = &[
    (133, "artists", "DefaultMusicArtists.png"),
    (135, "genres", "DefaultMusicGenres.png"),
    (132, "albums", "DefaultMusicAlbums.png"),
    (1050, "singles", "DefaultMusicSongs.png"),
    (134, "songs", "DefaultMusicSongs.png"),
    (652, "years", "DefaultMusicYears.png"),
    (517, "recentlyplayedalbums", "DefaultMusicRecentlyPlayed.png"),
    (359, "recentlyaddedalbums", "DefaultMusicRecentlyAdded.png"),
    (521, "compilations", "DefaultMusicCompilations.png"),
];

const MUSICVIDEO_ACTIONS: &[StaticAction] = &[
    (20389, "titles", "DefaultMusicVideos.png"),
    (20382, "recentlyaddedmusicvideos", "DefaultRecentlyAddedMusicVideos.png"),
    (135, "genres", "DefaultGenre.png"),
    (652, "years", "DefaultYear.png"),
    (133, "artists", "DefaultMusicArtists.png"),
    (20348, "directors", "DefaultDirector.png"),
    (132, "albums", "DefaultMusicAlbums.png"),
    (20388, "studios", "DefaultStudios.png"),
    (20459, "tags", "DefaultTags.png"),
];

const TV_WINDOWS: &[StaticAction] = &[
    (19019, "TVChannels", "DefaultAddonPeripheral.png"),
    (19069, "TVGuide", "icons/pvr/epg.png"),
    (19017, "TVRecordings", "icons/pvr/recording_small.png"),
    (19040, "TVTimers", "icons/pvr/timer_small.png"),
    (19138, "TVTimerRules", "icons/pvr/timer-rule.png"),
    (137, "TVSearch", "DefaultAddonsSearch.png"),
];

const RADIO_WINDOWS: &[StaticAction] = &[
    (19019, "RadioChannels", "DefaultAddonPeripheral.png"),
    (19069, "RadioGuide", "icons/pvr/epg.png"),
    (19017, "RadioRecordings", "icons/pvr/recording_small.png"),
    (19040, "RadioTimers", "icons/pvr/timer_small.png"),
    (19138, "RadioTimerRules", "icons/pvr/timer-rule.png"),
    (137, "RadioSearch", "DefaultAddonsSearch.png"),
];

const VIDEO_PLAYLIST_DIR: &str = "special://profile/playlists/video/";
const MUSIC_PLAYLIST_DIR: &str = "special://profile/playlists/music/";

const COMMON_WINDOWS: &[StaticAction] = &[
    (24001, "addonbrowser", "icons/mainmenu/addons.png"),
    (1, "Pictures", "icons/mainmenu/pictures.png"),
    (3, "Videos", "icons/mainmenu/videos.png"),
    (10134, "favourites", "icons/mainmenu/favourites.png"),
    (8, "Weather", "icons/mainmenu/weather.png"),
    (30289, VIDEO_PLAYLIST_DIR, "defaultplaylist.png"),
    (30290, MUSIC_PLAYLIST_DIR, "defaultplaylist.png"),
];

const COMMANDS: &[StaticAction] = &[
    (30242, "PlayPvrTV", "icons/mainmenu/tv.png"),
    (30243, "PlayPvrRadio", "icons/mainmenu/radio.png"),
    (30244, "PlayDVD", "DefaultCdda.png"),
];

/// The eleven action families a menu entry can use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionType {
    MovieLibrary,
    TvShowLibrary,
    MusicLibrary,
    MusicVideoLibrary,
    TvWindows,
    RadioWindows,
    CommonWindows,
    Command,
    VideoPlaylist,
    MusicPlaylist,
    VideoAddon,
}

impl ActionType {
    pub const ALL: [ActionType; 11] = [
        Self::MovieLibrary,
        Self::TvShowLibrary,
        Self::MusicLibrary,
        Self::MusicVideoLibrary,
        Self::TvWindows,
        Self::RadioWindows,
        Self::CommonWindows,
        Self::Command,
        Self::VideoPlaylist,
        Self::MusicPlaylist,
        Self::VideoAddon,
    ];

    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(self) -> i32 {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0) as i32
    }

    fn static_actions(self) -> &'static [StaticAction] {
        match self {
            Self::MovieLibrary => MOVIE_ACTIONS,
            Self::TvShowLibrary => TVSHOW_ACTIONS,
            Self::MusicLibrary => MUSIC_ACTIONS,
            Self::MusicVideoLibrary => MUSICVIDEO_ACTIONS,
            Self::TvWindows => TV_WINDOWS,
            Self::RadioWindows => RADIO_WINDOWS,
            Self::CommonWindows => COMMON_WINDOWS,
            Self::Command => COMMANDS,
            Self::VideoPlaylist | Self::MusicPlaylist | Self::VideoAddon => &[],
        }
    }

    /// Library node base and the window browsing it.
    fn library(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::MovieLibrary => Some(("Videos", "videodb://movies/")),
            Self::TvShowLibrary => Some(("Videos", "videodb://tvshows/")),
            Self::MusicLibrary => Some(("Music", "musicdb://")),
            Self::MusicVideoLibrary => Some(("Videos", "videodb://musicvideos/")),
            _ => None,
        }
    }

    /// Condition under which the library link works, and what to open instead.
    fn availability(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::MovieLibrary => Some((
                "Library.HasContent(movies)",
                "ActivateWindow(Videos,sources://video/,return)",
            )),
            Self::TvShowLibrary => Some((
                "Library.HasContent(tvshows)",
                "ActivateWindow(Videos,sources://video/,return)",
            )),
            Self::MusicLibrary => Some((
                "Library.HasContent(music)",
                "ActivateWindow(Music,sources://music/,return)",
            )),
            Self::MusicVideoLibrary => Some((
                "Library.HasContent(musicvideos)",
                "ActivateWindow(Videos,sources://video/,return)",
            )),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionEntry {
    pub label: Label,
    pub path: String,
    pub thumb: String,
}

impl ActionEntry {
    fn from_static(&(label, path, thumb): &StaticAction) -> Self {
        Self {
            label: Label::Localized(label),
            path: path.to_string(),
            thumb: thumb.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct InstalledAddon {
    #[serde(default)]
    pub addonid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub path: String,
}

pub struct ActionCatalog {
    strings: StringTable,
    playlist_dirs: [PathBuf; 2],
    query: Rc<dyn QueryService>,
    playlists: [OnceCell<Vec<PlaylistFile>>; 2],
    addons: OnceCell<Vec<InstalledAddon>>,
}

impl ActionCatalog {
    pub fn new(ctx: &ConfigContext, query: Rc<dyn QueryService>) -> Self {
        Self {
            strings: ctx.strings.clone(),
            playlist_dirs: [
                ctx.playlists_dir(PlaylistKind::Video),
                ctx.playlists_dir(PlaylistKind::Music),
            ],
            query,
            playlists: [OnceCell::new(), OnceCell::new()],
            addons: OnceCell::new(),
        }
    }

    pub fn reload(&mut self) {
        self.playlists = [OnceCell::new(), OnceCell::new()];
        self.addons = OnceCell::new();
    }

    pub fn type_count(&self) -> usize {
        ActionType::ALL.len()
    }

    /// Display name of an action type; `-1` is the "unset" label.
    pub fn type_name(&self, action_type: i32, with_index: bool) -> String {
        if action_type == -1 {
            return self.strings.get(UNSET_TYPE_LABEL).to_string();
        }
        let Some(kind) = ActionType::from_index(action_type) else {
            return String::new();
        };
        let name = self.strings.get(TYPE_LABEL_BASE + kind.index() as u32);
        if with_index {
            format!("{}. {name}", action_type + 1)
        } else {
            name.to_string()
        }
    }

    pub fn thumb_sizes(&self) -> Vec<String> {
        THUMB_SIZE_LABELS
            .iter()
            .map(|id| self.strings.get(*id).to_string())
            .collect()
    }

    /// Every selectable action of a type, listing playlists and add-ons on
    /// demand.
    pub fn actions(&self, action_type: i32) -> Vec<ActionEntry> {
        let Some(kind) = ActionType::from_index(action_type) else {
            return Vec::new();
        };
        match kind {
            ActionType::VideoPlaylist => self.playlist_entries(PlaylistKind::Video),
            ActionType::MusicPlaylist => self.playlist_entries(PlaylistKind::Music),
            ActionType::VideoAddon => self
                .addons()
                .iter()
                .map(|addon| ActionEntry {
                    label: Label::literal(addon.name.clone()),
                    path: addon.addonid.clone(),
                    thumb: addon.thumbnail.clone(),
                })
                .collect(),
            _ => kind
                .static_actions()
                .iter()
                .map(ActionEntry::from_static)
                .collect(),
        }
    }

    pub fn action_count(&self, action_type: i32) -> usize {
        match ActionType::from_index(action_type) {
            Some(ActionType::VideoPlaylist) => self.playlists(PlaylistKind::Video).len(),
            Some(ActionType::MusicPlaylist) => self.playlists(PlaylistKind::Music).len(),
            Some(ActionType::VideoAddon) => self.addons().len(),
            Some(kind) => kind.static_actions().len(),
            None => 0,
        }
    }

    pub fn action(&self, action_type: i32, action_index: i32) -> Option<ActionEntry> {
        let index = usize::try_from(action_index).ok()?;
        let kind = ActionType::from_index(action_type)?;
        match kind {
            ActionType::VideoPlaylist | ActionType::MusicPlaylist | ActionType::VideoAddon => {
                self.actions(action_type).into_iter().nth(index)
            }
            _ => kind.static_actions().get(index).map(ActionEntry::from_static),
        }
    }

    /// Playlist and add-on types, whose listing can change between sessions.
    pub fn is_dynamic(&self, action_type: i32) -> bool {
        matches!(
            ActionType::from_index(action_type),
            Some(ActionType::VideoPlaylist | ActionType::MusicPlaylist | ActionType::VideoAddon)
        )
    }

    /// Current index of an item's action. Playlist and add-on actions follow
    /// `target` through the live listing; `-1` when it is gone.
    pub fn locate(&self, action_type: i32, action_index: i32, target: Option<&str>) -> i32 {
        match target {
            Some(target) if self.is_dynamic(action_type) => self
                .actions(action_type)
                .iter()
                .position(|entry| entry.path == target)
                .map_or(-1, |i| i as i32),
            _ => action_index,
        }
    }

    /// Resolved display label; empty when the index is out of range.
    pub fn action_label(&self, action_type: i32, action_index: i32) -> String {
        self.action(action_type, action_index)
            .map(|entry| entry.label.resolve(&self.strings))
            .unwrap_or_default()
    }

    /// Thumb path; empty when the index is out of range.
    pub fn action_thumb(&self, action_type: i32, action_index: i32) -> String {
        self.action(action_type, action_index)
            .map(|entry| entry.thumb)
            .unwrap_or_default()
    }

    /// Host command for an action. `context_index` picks the playlist when a
    /// common-windows entry points at a playlist directory.
    pub fn build_command(&self, action_type: i32, action_index: i32, context_index: usize) -> String {
        let Some(kind) = ActionType::from_index(action_type) else {
            return String::new();
        };
        let Some(entry) = self.action(action_type, action_index) else {
            return String::new();
        };
        let path = entry.path.as_str();

        if let Some((window, base)) = kind.library() {
            return format!("ActivateWindow({window},{base}{path}/,return)");
        }
        match kind {
            ActionType::TvWindows | ActionType::RadioWindows => format!("ActivateWindow({path})"),
            ActionType::CommonWindows => match path {
                "addonbrowser" => "ActivateWindow(AddonBrowser,addons://sources/,return)".into(),
                VIDEO_PLAYLIST_DIR => self.play_playlist(PlaylistKind::Video, context_index),
                MUSIC_PLAYLIST_DIR => self.play_playlist(PlaylistKind::Music, context_index),
                _ => format!("ActivateWindow({path})"),
            },
            ActionType::Command => match path {
                "PlayPvrTV" => "Action(10128)".into(),
                "PlayPvrRadio" => "Action(10130)".into(),
                "PlayDVD" => "Action(10000)".into(),
                _ => String::new(),
            },
            ActionType::VideoPlaylist | ActionType::MusicPlaylist => format!("PlayMedia({path})"),
            ActionType::VideoAddon => format!("RunAddon({path})"),
            _ => String::new(),
        }
    }

    /// Visibility condition gating the primary command; library types only.
    pub fn availability_condition(&self, action_type: i32) -> Option<&'static str> {
        ActionType::from_index(action_type)
            .and_then(ActionType::availability)
            .map(|(cond, _)| cond)
    }

    /// Command used when the availability condition is false.
    pub fn fallback_command(&self, action_type: i32) -> Option<&'static str> {
        ActionType::from_index(action_type)
            .and_then(ActionType::availability)
            .map(|(_, alt)| alt)
    }

    pub fn playlists(&self, kind: PlaylistKind) -> &[PlaylistFile] {
        let slot = match kind {
            PlaylistKind::Video => 0,
            PlaylistKind::Music => 1,
        };
        self.playlists[slot].get_or_init(|| list_playlists(&self.playlist_dirs[slot]))
    }

    pub fn addons(&self) -> &[InstalledAddon] {
        self.addons.get_or_init(|| {
            let result = QueryRequest::new("Addons.GetAddons")
                .properties(&["name", "thumbnail", "path", "enabled"])
                .param("type", "xbmc.addon.video")
                .send_list(self.query.as_ref(), "addons");
            match result {
                Ok(addons) => addons
                    .into_iter()
                    .filter_map(|value| serde_json::from_value(value).ok())
                    .collect(),
                Err(err) => {
                    warn!(
                        target: "home_menu_maker::catalog",
                        error = %err,
                        "add-on listing unavailable"
                    );
                    Vec::new()
                }
            }
        })
    }

    fn playlist_entries(&self, kind: PlaylistKind) -> Vec<ActionEntry> {
        self.playlists(kind)
            .iter()
            .map(|playlist| ActionEntry {
                label: Label::literal(playlist.name.clone()),
                path: playlist.file.display().to_string(),
                thumb: PLAYLIST_THUMB.to_string(),
            })
            .collect()
    }

    fn play_playlist(&self, kind: PlaylistKind, index: usize) -> String {
        self.playlists(kind)
            .get(index)
            .map(|playlist| format!("PlayMedia({})", playlist.file.display()))
            .unwrap_or_default()
    }
}
