//! Widget list elements.
//!
//! A widget record is flat. Which of its optional fields matter is decided by
//! the catalog's source kind for the record's (category, type) pair; see
//! [`WidgetItem::source`].

use serde::{Deserialize, Serialize};

use crate::catalog::{SourceKind, WidgetCatalog};
use crate::config::{ConfigContext, PlaylistKind};
use crate::label::Label;
use crate::markup::widget::FIRST_WIDGET_ID;
use crate::markup::WidgetProjector;
use crate::store::{AddonPathEntry, Element, FieldValue, OrderedStore, StorePaths};

pub const NEW_WIDGET_HEADER: u32 = 30033;
pub const DEFAULT_LIMIT: i32 = 20;
/// How many running-at widgets the skin can address by name.
pub const MAX_RUNNING_AT: usize = 3;

fn unset() -> i32 {
    -1
}

fn default_limit() -> i32 {
    DEFAULT_LIMIT
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub thumb: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetItem {
    #[serde(default)]
    pub header: Label,
    #[serde(default = "unset")]
    pub category: i32,
    #[serde(rename = "type", default = "unset")]
    pub widget_type: i32,
    #[serde(default = "unset")]
    pub style: i32,
    #[serde(default = "default_limit")]
    pub limit: i32,
    #[serde(default)]
    pub sortby: i32,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointintime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addons: Option<Vec<AddonRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addonpath: Option<AddonPathEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetField {
    Header,
    Category,
    Type,
    Style,
    Limit,
    SortBy,
    Visible,
    Channels,
    PointInTime,
    Addons,
    Playlist,
    AddonPath,
}

/// The conditional field group that is active for a widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WidgetSource<'a> {
    /// Category or type not chosen yet.
    Unset,
    Library,
    RunningAt {
        point_in_time: &'a str,
        channels: &'a [u32],
    },
    Playlist {
        kind: PlaylistKind,
        file: &'a str,
    },
    Addons(&'a [AddonRef]),
    AddonPath(Option<&'a AddonPathEntry>),
}

impl WidgetItem {
    pub fn source<'a>(&'a self, catalog: &WidgetCatalog) -> WidgetSource<'a> {
        match catalog.source(self.category, self.widget_type) {
            None => WidgetSource::Unset,
            Some(SourceKind::Library) => WidgetSource::Library,
            Some(SourceKind::RunningAt) => WidgetSource::RunningAt {
                point_in_time: self.pointintime.as_deref().unwrap_or(""),
                channels: self.channels.as_deref().unwrap_or(&[]),
            },
            Some(SourceKind::Playlist { kind, .. }) => WidgetSource::Playlist {
                kind,
                file: self.playlist.as_deref().unwrap_or(""),
            },
            Some(SourceKind::Addons) => WidgetSource::Addons(self.addons.as_deref().unwrap_or(&[])),
            Some(SourceKind::AddonPath) => WidgetSource::AddonPath(self.addonpath.as_ref()),
        }
    }

    /// Content path of the widget, without the per-widget suffix add-on
    /// widgets carry.
    pub fn content_path(&self, catalog: &WidgetCatalog) -> String {
        let base = catalog.path(self.category, self.widget_type);
        match self.source(catalog) {
            WidgetSource::Unset => String::new(),
            WidgetSource::Library | WidgetSource::Addons(_) => base,
            WidgetSource::RunningAt {
                point_in_time,
                channels,
            } => {
                let channels: Vec<String> = channels.iter().map(u32::to_string).collect();
                format!(
                    "{base}&pointintime={point_in_time}&channels={}",
                    channels.join("-")
                )
            }
            WidgetSource::Playlist { file, .. } if file.is_empty() => String::new(),
            WidgetSource::Playlist { file, .. } => format!("{base}/{file}"),
            WidgetSource::AddonPath(entry) => entry.map(|e| e.path.clone()).unwrap_or_default(),
        }
    }

    fn clear_conditional(&mut self) {
        self.channels = None;
        self.pointintime = None;
        self.addons = None;
        self.playlist = None;
        self.addonpath = None;
    }
}

impl Element for WidgetItem {
    type Field = WidgetField;

    fn template() -> Self {
        Self {
            header: Label::Localized(NEW_WIDGET_HEADER),
            category: -1,
            widget_type: -1,
            style: -1,
            limit: DEFAULT_LIMIT,
            sortby: 0,
            visible: true,
            channels: None,
            pointintime: None,
            addons: None,
            playlist: None,
            addonpath: None,
        }
    }

    fn children(&self) -> Option<&Vec<Self>> {
        None
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Self>> {
        None
    }

    fn get(&self, field: WidgetField) -> FieldValue {
        match field {
            WidgetField::Header => FieldValue::Label(self.header.clone()),
            WidgetField::Category => FieldValue::Int(self.category),
            WidgetField::Type => FieldValue::Int(self.widget_type),
            WidgetField::Style => FieldValue::Int(self.style),
            WidgetField::Limit => FieldValue::Int(self.limit),
            WidgetField::SortBy => FieldValue::Int(self.sortby),
            WidgetField::Visible => FieldValue::Bool(self.visible),
            WidgetField::Channels => FieldValue::Ids(self.channels.clone().unwrap_or_default()),
            WidgetField::PointInTime => {
                FieldValue::Text(self.pointintime.clone().unwrap_or_default())
            }
            WidgetField::Addons => FieldValue::Addons(self.addons.clone().unwrap_or_default()),
            WidgetField::Playlist => FieldValue::Text(self.playlist.clone().unwrap_or_default()),
            WidgetField::AddonPath => FieldValue::AddonPath(self.addonpath.clone()),
        }
    }

    fn set(&mut self, field: WidgetField, value: FieldValue) -> bool {
        match (field, value) {
            (WidgetField::Header, FieldValue::Label(label)) => self.header = label,
            (WidgetField::Header, FieldValue::Text(text)) => self.header = Label::Literal(text),
            (WidgetField::Category, FieldValue::Int(v)) => {
                if v != self.category {
                    self.widget_type = -1;
                    self.style = -1;
                    self.limit = DEFAULT_LIMIT;
                    self.clear_conditional();
                }
                self.category = v;
            }
            (WidgetField::Type, FieldValue::Int(v)) => self.widget_type = v,
            (WidgetField::Style, FieldValue::Int(v)) => self.style = v,
            (WidgetField::Limit, FieldValue::Int(v)) => self.limit = v,
            (WidgetField::SortBy, FieldValue::Int(v)) => self.sortby = v,
            (WidgetField::Visible, FieldValue::Bool(v)) => self.visible = v,
            (WidgetField::Channels, FieldValue::Ids(v)) => self.channels = Some(v),
            (WidgetField::PointInTime, FieldValue::Text(v)) => self.pointintime = Some(v),
            (WidgetField::Addons, FieldValue::Addons(v)) => self.addons = Some(v),
            (WidgetField::Playlist, FieldValue::Text(v)) => self.playlist = Some(v),
            (WidgetField::AddonPath, FieldValue::AddonPath(v)) => self.addonpath = v,
            _ => return false,
        }
        true
    }

    fn zero(field: WidgetField) -> FieldValue {
        match field {
            WidgetField::Header => FieldValue::Label(Label::default()),
            WidgetField::Category
            | WidgetField::Type
            | WidgetField::Style
            | WidgetField::Limit
            | WidgetField::SortBy => FieldValue::Int(0),
            WidgetField::Visible => FieldValue::Bool(false),
            WidgetField::Channels => FieldValue::Ids(Vec::new()),
            WidgetField::PointInTime | WidgetField::Playlist => FieldValue::Text(String::new()),
            WidgetField::Addons => FieldValue::Addons(Vec::new()),
            WidgetField::AddonPath => FieldValue::AddonPath(None),
        }
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

pub type WidgetStore = OrderedStore<WidgetItem, WidgetProjector>;

impl WidgetStore {
    pub fn for_context(ctx: &ConfigContext, projector: WidgetProjector) -> Self {
        Self::new(
            StorePaths {
                user: ctx.widgets_user_path(),
                default: ctx.widgets_default_path(),
                markup: ctx.widgets_markup_path(),
            },
            projector,
        )
    }

    pub fn catalog(&self) -> &WidgetCatalog {
        self.projector().catalog()
    }

    /// Id the projector assigns to the first visible widget of this kind.
    pub fn widget_id(&self, category: i32, widget_type: i32) -> Option<u32> {
        self.items()
            .iter()
            .filter(|w| w.visible)
            .position(|w| w.category == category && w.widget_type == widget_type)
            .map(|pos| FIRST_WIDGET_ID + pos as u32)
    }

    /// `(name, path)` of the visible running-at widgets the skin exposes.
    pub fn running_at_strings(&self) -> Vec<(String, String)> {
        let catalog = self.catalog();
        self.items()
            .iter()
            .filter(|w| w.visible)
            .filter(|w| matches!(w.source(catalog), WidgetSource::RunningAt { .. }))
            .take(MAX_RUNNING_AT)
            .map(|w| (w.header.resolve(catalog.strings()), w.content_path(catalog)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::StringTable;
    use crate::store::{Direction, ItemPath};

    const DEFAULT_WIDGETS: &str = r#"[
      {"header": "30033", "category": 1, "type": 0, "style": 0, "limit": 15, "sortby": 0, "visible": true},
      {"header": "Tonight", "category": 0, "type": 3, "style": 0, "limit": 20, "sortby": 0, "visible": true,
       "channels": [4, 9], "pointintime": "20:15"},
      {"header": "Kids", "category": 1, "type": 2, "style": 1, "limit": 10, "sortby": 0, "visible": false,
       "playlist": "kids.xsp"}
    ]"#;

    fn fixture() -> ([tempfile::TempDir; 3], ConfigContext) {
        let resources = tempfile::tempdir().expect("tempdir creation should succeed");
        let profile = tempfile::tempdir().expect("tempdir creation should succeed");
        let skin = tempfile::tempdir().expect("tempdir creation should succeed");
        fs::write(resources.path().join("widgets_default.json"), DEFAULT_WIDGETS)
            .expect("default widgets should be written");
        let ctx = ConfigContext::new(resources.path(), profile.path(), skin.path())
            .with_strings(StringTable::from_pairs([(30033, "New widget")]));
        ([resources, profile, skin], ctx)
    }

    fn store(ctx: &ConfigContext) -> WidgetStore {
        let mut store = WidgetStore::for_context(ctx, WidgetProjector::new(WidgetCatalog::new(ctx)));
        assert!(store.load(), "default widgets should load");
        store
    }

    #[test]
    fn widgets_never_accept_child_paths() {
        let (_dirs, ctx) = fixture();
        let mut store = store(&ctx);
        assert_eq!(store.add_child(0), None);
        assert_eq!(store.insert_after(ItemPath::child(0, 0)), None);
        assert_eq!(store.move_item(ItemPath::child(0, 0), Direction::Down), None);
        assert!(!store.delete(ItemPath::child(0, 0)));
        assert_eq!(store.value(ItemPath::child(0, 0), WidgetField::Limit), FieldValue::Int(0));
        assert!(!store.is_dirty());
    }

    #[test]
    fn new_widget_template() {
        let (_dirs, ctx) = fixture();
        let mut store = store(&ctx);
        assert_eq!(store.insert_after(ItemPath::top(2)), Some(ItemPath::top(3)));
        let widget = &store.items()[3];
        assert_eq!(widget.header, Label::Localized(30033));
        assert_eq!((widget.category, widget.widget_type, widget.style), (-1, -1, -1));
        assert_eq!(widget.limit, 20);
        assert!(widget.visible);
    }

    #[test]
    fn category_change_clears_conditional_fields() {
        let (_dirs, ctx) = fixture();
        let mut store = store(&ctx);
        let path = ItemPath::top(1);
        assert!(store.set_value(path, WidgetField::Category, FieldValue::Int(5)));
        let widget = &store.items()[1];
        assert_eq!((widget.widget_type, widget.style), (-1, -1));
        assert_eq!(widget.channels, None);
        assert_eq!(widget.pointintime, None);
        assert_eq!(store.value(path, WidgetField::Channels), FieldValue::Ids(Vec::new()));

        // Re-setting the same category keeps the record.
        store.set_value(path, WidgetField::Type, FieldValue::Int(0));
        store.set_value(path, WidgetField::Category, FieldValue::Int(5));
        assert_eq!(store.items()[1].widget_type, 0);
    }

    #[test]
    fn set_then_get_round_trips() {
        let (_dirs, ctx) = fixture();
        let mut store = store(&ctx);
        let path = ItemPath::top(0);
        let entry = AddonPathEntry {
            id: 3,
            name: "News".into(),
            path: "plugin://plugin.video.news/latest/".into(),
        };
        let cases = [
            (WidgetField::Header, FieldValue::Label(Label::literal("Films"))),
            (WidgetField::Limit, FieldValue::Int(5)),
            (WidgetField::SortBy, FieldValue::Int(1)),
            (WidgetField::Visible, FieldValue::Bool(false)),
            (WidgetField::Channels, FieldValue::Ids(vec![1, 2])),
            (WidgetField::PointInTime, FieldValue::Text("18:00".into())),
            (
                WidgetField::Addons,
                FieldValue::Addons(vec![AddonRef {
                    id: "plugin.video.a".into(),
                    name: "A".into(),
                    thumb: "a.png".into(),
                }]),
            ),
            (WidgetField::Playlist, FieldValue::Text("x.xsp".into())),
            (WidgetField::AddonPath, FieldValue::AddonPath(Some(entry))),
            (WidgetField::Type, FieldValue::Int(1)),
            (WidgetField::Style, FieldValue::Int(1)),
        ];
        for (field, value) in cases {
            assert!(store.set_value(path, field, value.clone()));
            assert_eq!(store.value(path, field), value, "{field:?}");
        }
    }

    #[test]
    fn paths_follow_the_active_source() {
        let (_dirs, ctx) = fixture();
        let store = store(&ctx);
        let catalog = store.catalog();
        assert_eq!(
            store.items()[0].content_path(catalog),
            "videodb://recentlyaddedmovies/"
        );
        assert_eq!(
            store.items()[1].content_path(catalog),
            "plugin://script.homemenu.helper/?info=runningat&pointintime=20:15&channels=4-9"
        );
        assert_eq!(
            store.items()[2].content_path(catalog),
            "special://profile/playlists/video/kids.xsp"
        );

        let mut unset_playlist = store.items()[2].clone();
        unset_playlist.playlist = None;
        assert_eq!(unset_playlist.content_path(catalog), "");
        assert_eq!(WidgetItem::template().content_path(catalog), "");
    }

    #[test]
    fn widget_ids_count_visible_widgets_only() {
        let (_dirs, ctx) = fixture();
        let mut store = store(&ctx);
        assert_eq!(store.widget_id(1, 0), Some(500));
        assert_eq!(store.widget_id(0, 3), Some(501));
        assert_eq!(store.widget_id(1, 2), None);
        store.set_value(ItemPath::top(0), WidgetField::Visible, FieldValue::Bool(false));
        assert_eq!(store.widget_id(0, 3), Some(500));
    }

    #[test]
    fn running_at_strings_cap_at_three() {
        let (_dirs, ctx) = fixture();
        let mut store = store(&ctx);
        for _ in 0..3 {
            store.insert_after(ItemPath::top(1));
            store.set_value(ItemPath::top(2), WidgetField::Category, FieldValue::Int(0));
            store.set_value(ItemPath::top(2), WidgetField::Type, FieldValue::Int(3));
        }
        let strings = store.running_at_strings();
        assert_eq!(strings.len(), 3);
        assert_eq!(
            strings[0],
            (
                "Tonight".to_string(),
                "plugin://script.homemenu.helper/?info=runningat&pointintime=20:15&channels=4-9"
                    .to_string()
            )
        );
        assert_eq!(strings[1].0, "New widget");
        assert!(strings[1].1.ends_with("&pointintime=&channels="));
    }
}
