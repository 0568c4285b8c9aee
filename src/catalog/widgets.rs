//! Widget catalog: categories, widget types and their display styles.
//!
//! A widget record only stores indexes (`category`, `type`, `style`); every
//! path, sort key, layout id and click command the projector needs is looked
//! up here.

use crate::config::{ConfigContext, PlaylistKind, StringTable};

const UNSET_LABEL: u32 = 30116;
const ADDON_PLACEHOLDER: &str = "{addon}";

/// Which conditional fields of a widget record are meaningful.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Library,
    /// Broadcasts running at a point in time on a set of channels.
    RunningAt,
    /// A user playlist of the given kind and content subtype.
    Playlist {
        kind: PlaylistKind,
        subtype: &'static str,
    },
    /// A hand-picked list of add-ons rendered as static content.
    Addons,
    /// A stored add-on directory path.
    AddonPath,
}

#[derive(Debug)]
pub struct WidgetStyle {
    pub name: u32,
    pub desc: u32,
    /// Value of the `type` param consumed by the skin.
    pub widget: &'static str,
    pub width: u32,
    pub height: u32,
    pub size: &'static str,
    pub layout: &'static str,
}

#[derive(Debug)]
pub struct WidgetType {
    pub name: u32,
    pub desc: u32,
    pub path: &'static str,
    pub source: SourceKind,
    pub limitable: bool,
    pub orderable: bool,
    pub sortby: &'static str,
    pub sortorder: &'static str,
    pub onclick: Option<&'static str>,
    pub target: Option<&'static str>,
    pub play_status: bool,
    /// Click command of the widget header when nothing more specific applies.
    pub header_action: &'static str,
    pub styles: &'static [WidgetStyle],
}

#[derive(Debug)]
pub struct WidgetCategory {
    pub name: u32,
    pub types: &'static [WidgetType],
}

const POSTER: WidgetStyle = WidgetStyle {
    name: 30530,
    desc: 30540,
    widget: "widget_poster",
    width: 200,
    height: 360,
    size: "200x300",
    layout: "poster",
};
const LANDSCAPE: WidgetStyle = WidgetStyle {
    name: 30531,
    desc: 30541,
    widget: "widget_landscape",
    width: 380,
    height: 260,
    size: "356x200",
    layout: "landscape",
};
const SQUARE: WidgetStyle = WidgetStyle {
    name: 30532,
    desc: 30542,
    widget: "widget_square",
    width: 260,
    height: 300,
    size: "240x240",
    layout: "square",
};
const CHANNEL: WidgetStyle = WidgetStyle {
    name: 30533,
    desc: 30543,
    widget: "widget_channel",
    width: 300,
    height: 220,
    size: "280x160",
    layout: "channel",
};
const ICON: WidgetStyle = WidgetStyle {
    name: 30534,
    desc: 30544,
    widget: "widget_icon",
    width: 180,
    height: 200,
    size: "160x160",
    layout: "icon",
};

const VIDEO_STYLES: &[WidgetStyle] = &[POSTER, LANDSCAPE];
const EPISODE_STYLES: &[WidgetStyle] = &[LANDSCAPE, POSTER];
const MUSIC_STYLES: &[WidgetStyle] = &[SQUARE];
const CHANNEL_STYLES: &[WidgetStyle] = &[CHANNEL, LANDSCAPE];
const ADDON_STYLES: &[WidgetStyle] = &[ICON, SQUARE];

const fn playlist(
    name: u32,
    kind: PlaylistKind,
    subtype: &'static str,
    header_action: &'static str,
    styles: &'static [WidgetStyle],
) -> WidgetType {
    let path = match kind {
        PlaylistKind::Video => "special://profile/playlists/video",
        PlaylistKind::Music => "special://profile/playlists/music",
    };
    WidgetType {
        name,
        desc: name + 70,
        path,
        source: SourceKind::Playlist { kind, subtype },
        limitable: true,
        orderable: false,
        sortby: "random",
        sortorder: "ascending",
        onclick: None,
        target: None,
        play_status: matches!(kind, PlaylistKind::Video),
        header_action,
        styles,
    }
}

const LIVE_TV: &[WidgetType] = &[
    WidgetType {
        name: 30410,
        desc: 30480,
        path: "pvr://channels/tv/*/",
        source: SourceKind::Library,
        limitable: true,
        orderable: true,
        sortby: "lastplayed",
        sortorder: "descending",
        onclick: None,
        target: None,
        play_status: false,
        header_action: "ActivateWindow(TVChannels)",
        styles: CHANNEL_STYLES,
    },
    WidgetType {
        name: 30411,
        desc: 30481,
        path: "pvr://recordings/tv/active/?view=flat",
        source: SourceKind::Library,
        limitable: true,
        orderable: false,
        sortby: "date",
        sortorder: "descending",
        onclick: None,
        target: None,
        play_status: true,
        header_action: "ActivateWindow(TVRecordings)",
        styles: EPISODE_STYLES,
    },
    WidgetType {
        name: 30412,
        desc: 30482,
        path: "plugin://{addon}/?info=timers",
        source: SourceKind::Library,
        limitable: false,
        orderable: false,
        sortby: "date",
        sortorder: "ascending",
        onclick: Some("ActivateWindow(TVTimers)"),
        target: None,
        play_status: false,
        header_action: "ActivateWindow(TVTimers)",
        styles: CHANNEL_STYLES,
    },
    WidgetType {
        name: 30413,
        desc: 30483,
        path: "plugin://{addon}/?info=runningat",
        source: SourceKind::RunningAt,
        limitable: false,
        orderable: false,
        sortby: "unsorted",
        sortorder: "ascending",
        onclick: Some("PlayMedia($ESCINFO[ListItem.FileNameAndPath])"),
        target: None,
        play_status: false,
        header_action: "ActivateWindow(TVGuide)",
        styles: CHANNEL_STYLES,
    },
];

const MOVIES: &[WidgetType] = &[
    WidgetType {
        name: 30420,
        desc: 30490,
        path: "videodb://recentlyaddedmovies/",
        source: SourceKind::Library,
        limitable: true,
        orderable: false,
        sortby: "dateadded",
        sortorder: "descending",
        onclick: None,
        target: None,
        play_status: true,
        header_action: "ActivateWindow(Videos,videodb://recentlyaddedmovies/,return)",
        styles: VIDEO_STYLES,
    },
    WidgetType {
        name: 30421,
        desc: 30491,
        path: "plugin://{addon}/?info=inprogressmovies",
        source: SourceKind::Library,
        limitable: true,
        orderable: false,
        sortby: "lastplayed",
        sortorder: "descending",
        onclick: None,
        target: None,
        play_status: true,
        header_action: "ActivateWindow(Videos,videodb://movies/titles/,return)",
        styles: VIDEO_STYLES,
    },
    playlist(
        30422,
        PlaylistKind::Video,
        "movies",
        "ActivateWindow(Videos,special://profile/playlists/video/,return)",
        VIDEO_STYLES,
    ),
];

const TV_SHOWS: &[WidgetType] = &[
    WidgetType {
        name: 30430,
        desc: 30500,
        path: "plugin://{addon}/?info=nextepisodes",
        source: SourceKind::Library,
        limitable: true,
        orderable: false,
        sortby: "lastplayed",
        sortorder: "descending",
        onclick: None,
        target: None,
        play_status: true,
        header_action: "ActivateWindow(Videos,videodb://inprogresstvshows/,return)",
        styles: EPISODE_STYLES,
    },
    WidgetType {
        name: 30431,
        desc: 30501,
        path: "videodb://recentlyaddedepisodes/",
        source: SourceKind::Library,
        limitable: true,
        orderable: false,
        sortby: "dateadded",
        sortorder: "descending",
        onclick: None,
        target: None,
        play_status: true,
        header_action: "ActivateWindow(Videos,videodb://recentlyaddedepisodes/,return)",
        styles: EPISODE_STYLES,
    },
    playlist(
        30432,
        PlaylistKind::Video,
        "tvshows",
        "ActivateWindow(Videos,special://profile/playlists/video/,return)",
        VIDEO_STYLES,
    ),
    playlist(
        30433,
        PlaylistKind::Video,
        "episodes",
        "ActivateWindow(Videos,special://profile/playlists/video/,return)",
        EPISODE_STYLES,
    ),
];

const MUSIC: &[WidgetType] = &[
    WidgetType {
        name: 30440,
        desc: 30510,
        path: "musicdb://recentlyaddedalbums/",
        source: SourceKind::Library,
        limitable: true,
        orderable: false,
        sortby: "dateadded",
        sortorder: "descending",
        onclick: None,
        target: Some("music"),
        play_status: false,
        header_action: "ActivateWindow(Music,musicdb://recentlyaddedalbums/,return)",
        styles: MUSIC_STYLES,
    },
    WidgetType {
        name: 30441,
        desc: 30511,
        path: "musicdb://recentlyplayedalbums/",
        source: SourceKind::Library,
        limitable: true,
        orderable: false,
        sortby: "lastplayed",
        sortorder: "descending",
        onclick: None,
        target: Some("music"),
        play_status: false,
        header_action: "ActivateWindow(Music,musicdb://recentlyplayedalbums/,return)",
        styles: MUSIC_STYLES,
    },
    WidgetType {
        name: 30442,
        desc: 30512,
        path: "musicdb://artists/",
        source: SourceKind::Library,
        limitable: true,
        orderable: false,
        sortby: "random",
        sortorder: "ascending",
        onclick: None,
        target: Some("music"),
        play_status: false,
        header_action: "ActivateWindow(Music,musicdb://artists/,return)",
        styles: MUSIC_STYLES,
    },
    playlist(
        30443,
        PlaylistKind::Music,
        "songs",
        "ActivateWindow(Music,special://profile/playlists/music/,return)",
        MUSIC_STYLES,
    ),
    playlist(
        30444,
        PlaylistKind::Music,
        "albums",
        "ActivateWindow(Music,special://profile/playlists/music/,return)",
        MUSIC_STYLES,
    ),
    playlist(
        30445,
        PlaylistKind::Music,
        "artists",
        "ActivateWindow(Music,special://profile/playlists/music/,return)",
        MUSIC_STYLES,
    ),
];

const MUSIC_VIDEOS: &[WidgetType] = &[
    WidgetType {
        name: 30450,
        desc: 30520,
        path: "videodb://recentlyaddedmusicvideos/",
        source: SourceKind::Library,
        limitable: true,
        orderable: false,
        sortby: "dateadded",
        sortorder: "descending",
        onclick: None,
        target: None,
        play_status: true,
        header_action: "ActivateWindow(Videos,videodb://recentlyaddedmusicvideos/,return)",
        styles: EPISODE_STYLES,
    },
    WidgetType {
        name: 30451,
        desc: 30521,
        path: "videodb://musicvideos/titles/",
        source: SourceKind::Library,
        limitable: true,
        orderable: false,
        sortby: "random",
        sortorder: "ascending",
        onclick: None,
        target: None,
        play_status: true,
        header_action: "ActivateWindow(Videos,videodb://musicvideos/titles/,return)",
        styles: EPISODE_STYLES,
    },
    playlist(
        30452,
        PlaylistKind::Video,
        "musicvideos",
        "ActivateWindow(Videos,special://profile/playlists/video/,return)",
        EPISODE_STYLES,
    ),
];

const ADDONS: &[WidgetType] = &[
    WidgetType {
        name: 30460,
        desc: 30524,
        path: "widget_addons",
        source: SourceKind::Addons,
        limitable: false,
        orderable: false,
        sortby: "unsorted",
        sortorder: "ascending",
        onclick: None,
        target: None,
        play_status: false,
        header_action: "ActivateWindow(AddonBrowser,addons://user/,return)",
        styles: ADDON_STYLES,
    },
    WidgetType {
        name: 30461,
        desc: 30525,
        path: "",
        source: SourceKind::AddonPath,
        limitable: true,
        orderable: false,
        sortby: "unsorted",
        sortorder: "ascending",
        onclick: None,
        target: Some("videos"),
        play_status: true,
        header_action: "ActivateWindow(AddonBrowser,addons://sources/video/,return)",
        styles: VIDEO_STYLES,
    },
];

const CATEGORIES: &[WidgetCategory] = &[
    WidgetCategory {
        name: 30200,
        types: LIVE_TV,
    },
    WidgetCategory {
        name: 30201,
        types: MOVIES,
    },
    WidgetCategory {
        name: 30202,
        types: TV_SHOWS,
    },
    WidgetCategory {
        name: 30203,
        types: MUSIC,
    },
    WidgetCategory {
        name: 30204,
        types: MUSIC_VIDEOS,
    },
    WidgetCategory {
        name: 30205,
        types: ADDONS,
    },
];

/// Sort keys offered by orderable widget types, with their label ids.
const DYNAMIC_SORT: &[(&str, u32)] = &[("lastplayed", 30286), ("channelnumber", 30287)];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetChoice {
    pub widget_type: i32,
    pub style: i32,
    pub label: String,
    pub desc: String,
}

#[derive(Clone, Debug)]
pub struct WidgetCatalog {
    strings: StringTable,
    addon_id: String,
}

impl WidgetCatalog {
    pub fn new(ctx: &ConfigContext) -> Self {
        Self {
            strings: ctx.strings.clone(),
            addon_id: ctx.settings.addon_id.clone(),
        }
    }

    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    pub fn category_count(&self) -> usize {
        CATEGORIES.len()
    }

    pub fn category(&self, category: i32) -> Option<&'static WidgetCategory> {
        usize::try_from(category)
            .ok()
            .and_then(|i| CATEGORIES.get(i))
    }

    pub fn lookup(&self, category: i32, widget_type: i32) -> Option<&'static WidgetType> {
        let index = usize::try_from(widget_type).ok()?;
        self.category(category)?.types.get(index)
    }

    pub fn style(&self, category: i32, widget_type: i32, style: i32) -> Option<&'static WidgetStyle> {
        let index = usize::try_from(style).ok()?;
        self.lookup(category, widget_type)?.styles.get(index)
    }

    pub fn category_name(&self, category: i32, with_index: bool) -> String {
        if category == -1 {
            return self.strings.get(UNSET_LABEL).to_string();
        }
        let Some(cat) = self.category(category) else {
            return String::new();
        };
        let name = self.strings.get(cat.name);
        if with_index {
            format!("{}. {name}", category + 1)
        } else {
            name.to_string()
        }
    }

    pub fn type_name(&self, category: i32, widget_type: i32) -> String {
        match self.lookup(category, widget_type) {
            Some(t) => self.strings.get(t.name).to_string(),
            None => self.strings.get(UNSET_LABEL).to_string(),
        }
    }

    pub fn type_desc(&self, category: i32, widget_type: i32) -> String {
        self.lookup(category, widget_type)
            .map(|t| self.strings.get(t.desc).to_string())
            .unwrap_or_default()
    }

    pub fn style_desc(&self, category: i32, widget_type: i32, style: i32) -> String {
        self.style(category, widget_type, style)
            .map(|s| self.strings.get(s.desc).to_string())
            .unwrap_or_default()
    }

    /// "Type (Style)" label shown in the editor.
    pub fn widget_label(&self, category: i32, widget_type: i32, style: i32) -> String {
        match (
            self.lookup(category, widget_type),
            self.style(category, widget_type, style),
        ) {
            (Some(t), Some(s)) => format!(
                "{} ({})",
                self.strings.get(t.name),
                self.strings.get(s.name)
            ),
            (Some(t), None) => self.strings.get(t.name).to_string(),
            _ => self.strings.get(UNSET_LABEL).to_string(),
        }
    }

    /// Flattened type × style picker entries of a category.
    pub fn choices(&self, category: i32) -> Vec<WidgetChoice> {
        let Some(cat) = self.category(category) else {
            return Vec::new();
        };
        let mut choices = Vec::new();
        for (t_index, t) in cat.types.iter().enumerate() {
            for (s_index, s) in t.styles.iter().enumerate() {
                choices.push(WidgetChoice {
                    widget_type: t_index as i32,
                    style: s_index as i32,
                    label: format!(
                        "{} ({})",
                        self.strings.get(t.name),
                        self.strings.get(s.name)
                    ),
                    desc: self.strings.get(t.desc).to_string(),
                });
            }
        }
        choices
    }

    pub fn choice_index(&self, category: i32, widget_type: i32, style: i32) -> Option<usize> {
        self.choices(category)
            .iter()
            .position(|c| c.widget_type == widget_type && c.style == style)
    }

    pub fn source(&self, category: i32, widget_type: i32) -> Option<SourceKind> {
        self.lookup(category, widget_type).map(|t| t.source)
    }

    pub fn is_limitable(&self, category: i32, widget_type: i32) -> bool {
        self.lookup(category, widget_type)
            .map(|t| t.limitable)
            .unwrap_or(false)
    }

    pub fn is_orderable(&self, category: i32, widget_type: i32) -> bool {
        self.lookup(category, widget_type)
            .map(|t| t.orderable)
            .unwrap_or(false)
    }

    /// Widgets whose items are a fixed list of add-ons.
    pub fn is_addon_widget(&self, category: i32, widget_type: i32) -> bool {
        self.source(category, widget_type) == Some(SourceKind::Addons)
    }

    pub fn has_static_content(&self, category: i32, widget_type: i32) -> bool {
        self.is_addon_widget(category, widget_type)
    }

    pub fn onclick(&self, category: i32, widget_type: i32) -> Option<&'static str> {
        self.lookup(category, widget_type).and_then(|t| t.onclick)
    }

    pub fn target(&self, category: i32, widget_type: i32) -> Option<&'static str> {
        self.lookup(category, widget_type).and_then(|t| t.target)
    }

    pub fn show_play_status(&self, category: i32, widget_type: i32) -> bool {
        self.lookup(category, widget_type)
            .map(|t| t.play_status)
            .unwrap_or(false)
    }

    pub fn header_action(&self, category: i32, widget_type: i32) -> String {
        self.lookup(category, widget_type)
            .map(|t| t.header_action.to_string())
            .unwrap_or_default()
    }

    /// Base content path, with the add-on id substituted for plugin paths.
    pub fn path(&self, category: i32, widget_type: i32) -> String {
        self.lookup(category, widget_type)
            .map(|t| t.path.replace(ADDON_PLACEHOLDER, &self.addon_id))
            .unwrap_or_default()
    }

    /// Fixed sort key of a non-orderable widget type.
    pub fn sortby(&self, category: i32, widget_type: i32) -> String {
        self.lookup(category, widget_type)
            .map(|t| t.sortby.to_string())
            .unwrap_or_default()
    }

    /// Sort key selected by the user on an orderable widget.
    pub fn sortby_dynamic(&self, index: i32) -> String {
        usize::try_from(index)
            .ok()
            .and_then(|i| DYNAMIC_SORT.get(i))
            .map(|(key, _)| key.to_string())
            .unwrap_or_else(|| DYNAMIC_SORT[0].0.to_string())
    }

    pub fn sort_options(&self) -> Vec<String> {
        DYNAMIC_SORT
            .iter()
            .map(|(_, label)| self.strings.get(*label).to_string())
            .collect()
    }

    pub fn sortorder(&self, category: i32, widget_type: i32) -> String {
        self.lookup(category, widget_type)
            .map(|t| t.sortorder.to_string())
            .unwrap_or_default()
    }

    pub fn style_widget(&self, category: i32, widget_type: i32, style: i32) -> String {
        self.style(category, widget_type, style)
            .map(|s| s.widget.to_string())
            .unwrap_or_default()
    }

    pub fn width(&self, category: i32, widget_type: i32, style: i32) -> u32 {
        self.style(category, widget_type, style)
            .map(|s| s.width)
            .unwrap_or(0)
    }

    pub fn height(&self, category: i32, widget_type: i32, style: i32) -> u32 {
        self.style(category, widget_type, style)
            .map(|s| s.height)
            .unwrap_or(0)
    }

    pub fn size(&self, category: i32, widget_type: i32, style: i32) -> String {
        self.style(category, widget_type, style)
            .map(|s| s.size.to_string())
            .unwrap_or_default()
    }

    pub fn layout(&self, category: i32, widget_type: i32, style: i32) -> String {
        self.style(category, widget_type, style)
            .map(|s| s.layout.to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> WidgetCatalog {
        let ctx = ConfigContext::new(".", ".", ".").with_strings(StringTable::from_pairs([
            (30116, "None"),
            (30200, "Live TV"),
            (30413, "Running at"),
            (30533, "Channel"),
        ]));
        WidgetCatalog::new(&ctx)
    }

    #[test]
    fn sources_select_conditional_field_groups() {
        let catalog = catalog();
        assert_eq!(catalog.source(0, 3), Some(SourceKind::RunningAt));
        assert_eq!(
            catalog.source(3, 4),
            Some(SourceKind::Playlist {
                kind: PlaylistKind::Music,
                subtype: "albums"
            })
        );
        assert_eq!(catalog.source(5, 0), Some(SourceKind::Addons));
        assert_eq!(catalog.source(5, 1), Some(SourceKind::AddonPath));
        assert_eq!(catalog.source(-1, -1), None);
        assert!(catalog.is_addon_widget(5, 0));
        assert!(!catalog.is_addon_widget(5, 1));
    }

    #[test]
    fn playlist_widgets_match_the_playlist_table() {
        let catalog = catalog();
        let playlist_pairs: Vec<(i32, i32)> = (0..catalog.category_count() as i32)
            .flat_map(|cat| {
                let count = catalog.category(cat).map(|c| c.types.len()).unwrap_or(0);
                (0..count as i32).map(move |t| (cat, t))
            })
            .filter(|(cat, t)| matches!(catalog.source(*cat, *t), Some(SourceKind::Playlist { .. })))
            .collect();
        assert_eq!(
            playlist_pairs,
            vec![(1, 2), (2, 2), (2, 3), (3, 3), (3, 4), (3, 5), (4, 2)]
        );
    }

    #[test]
    fn labels_and_lookups_degrade_for_unset_indexes() {
        let catalog = catalog();
        assert_eq!(catalog.category_name(-1, true), "None");
        assert_eq!(catalog.category_name(0, true), "1. Live TV");
        assert_eq!(catalog.widget_label(0, 3, 0), "Running at (Channel)");
        assert_eq!(catalog.widget_label(-1, -1, -1), "None");
        assert_eq!(catalog.style_widget(-1, -1, -1), "");
        assert_eq!(catalog.width(9, 0, 0), 0);
        assert!(!catalog.is_limitable(-1, -1));
        assert_eq!(
            catalog.path(0, 3),
            "plugin://script.homemenu.helper/?info=runningat"
        );
    }

    #[test]
    fn choices_flatten_types_and_styles() {
        let catalog = catalog();
        let choices = catalog.choices(0);
        assert_eq!(choices.len(), 8);
        assert_eq!(catalog.choice_index(0, 3, 1), Some(7));
        assert_eq!(catalog.choice_index(0, 9, 0), None);
        assert!(catalog.choices(-1).is_empty());
    }

    #[test]
    fn dynamic_sort_keys() {
        let catalog = catalog();
        assert!(catalog.is_orderable(0, 0));
        assert_eq!(catalog.sortby_dynamic(1), "channelnumber");
        assert_eq!(catalog.sortby_dynamic(7), "lastplayed");
        assert_eq!(catalog.sort_options().len(), 2);
    }
}
