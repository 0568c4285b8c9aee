//! Widget list editing session.
//!
//! Besides the store fields, a widget may need data only the host knows
//! (channels, installed add-ons) or files in the profile (playlists, the
//! add-on path table). Those pickers live here.

use std::collections::HashSet;
use std::rc::Rc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::catalog::{list_playlists, InstalledAddon, SourceKind, WidgetCatalog};
use crate::config::{ConfigContext, StringTable};
use crate::editor::{cycle, step_cursor, Row, CONFIRM_DELETE, CONFIRM_HEADING};
use crate::host::{Dialogs, NumericKind, QueryRequest, QueryService};
use crate::label::Label;
use crate::markup::WidgetProjector;
use crate::store::widget::{WidgetSource, DEFAULT_LIMIT, MAX_RUNNING_AT, NEW_WIDGET_HEADER};
use crate::store::{
    AddonPathStore, AddonRef, Direction, FieldValue, ItemPath, WidgetField, WidgetItem,
    WidgetStore,
};

const EDIT_LIMIT: u32 = 30019;
const EDIT_HEADER: u32 = 30030;
const CHOOSE_CHANNELS: u32 = 30035;
const CHOOSE_TIME: u32 = 30037;
const CONFIRM_RESET: u32 = 30117;
const CHOOSE_ADDONS: u32 = 30233;
const CHOOSE_PLAYLIST: u32 = 30250;
const NO_PLAYLISTS: u32 = 30252;
const ADD_PATH: u32 = 30274;
const ADD_PATH_NAME: u32 = 30275;
const NO_PATHS_HEADING: u32 = 30279;
const NO_PATHS: u32 = 30280;
const CHOOSE_PATH: u32 = 30281;
const DELETE_PATHS: u32 = 30284;
const NOTHING_TO_CHOOSE: u32 = 30118;

/// Add-on kinds offered by static add-on widgets.
const ADDON_KINDS: &[&str] = &[
    "xbmc.addon.video",
    "xbmc.addon.audio",
    "xbmc.addon.image",
    "xbmc.addon.executable",
];

#[derive(Debug, Deserialize)]
struct Channel {
    channelid: u32,
    #[serde(default)]
    label: String,
    #[serde(default)]
    channelnumber: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetDetail {
    pub header: String,
    pub category: String,
    pub widget: String,
    pub description: String,
    /// `None` when the widget type has no item limit.
    pub limit: Option<i32>,
    /// `None` unless the widget type offers a choice of sort key.
    pub sort: Option<String>,
    pub visible: bool,
    pub path: String,
    pub addons: Vec<String>,
}

pub struct WidgetEditor {
    store: WidgetStore,
    addon_paths: AddonPathStore,
    query: Rc<dyn QueryService>,
    ctx: ConfigContext,
    selected: usize,
    /// Position within the selected widget's add-on list.
    addon_cursor: usize,
}

/// Normalise `H:MM`/`HH:MM` to `HH:MM`. `None` when out of range.
pub fn parse_time(raw: &str) -> Option<String> {
    let (hours, minutes) = raw.trim().split_once(':')?;
    let hours: u8 = hours.parse().ok()?;
    let minutes: u8 = minutes.parse().ok()?;
    (hours < 24 && minutes < 60).then(|| format!("{hours:02}:{minutes:02}"))
}

impl WidgetEditor {
    pub fn new(store: WidgetStore, ctx: &ConfigContext, query: Rc<dyn QueryService>) -> Self {
        Self {
            store,
            addon_paths: AddonPathStore::for_context(ctx),
            query,
            ctx: ctx.clone(),
            selected: 0,
            addon_cursor: 0,
        }
    }

    pub fn open(ctx: &ConfigContext, query: Rc<dyn QueryService>) -> Option<Self> {
        let mut store = WidgetStore::for_context(ctx, WidgetProjector::new(WidgetCatalog::new(ctx)));
        if !store.load() {
            return None;
        }
        if let Err(err) = store.ensure_markup() {
            warn!(
                target: "home_menu_maker::editor",
                op = "open",
                error = %err,
                "could not regenerate widget markup"
            );
        }
        Some(Self::new(store, ctx, query))
    }

    pub fn store(&self) -> &WidgetStore {
        &self.store
    }

    fn catalog(&self) -> &WidgetCatalog {
        self.store.catalog()
    }

    fn strings(&self) -> &StringTable {
        &self.ctx.strings
    }

    fn text(&self, id: u32) -> &str {
        self.ctx.strings.get(id)
    }

    pub fn selection(&self) -> ItemPath {
        ItemPath::top(self.selected)
    }

    fn current(&self) -> Option<&WidgetItem> {
        self.store.item(self.selection())
    }

    pub fn select(&mut self, position: usize) {
        self.selected = position.min(self.store.len().saturating_sub(1));
        self.addon_cursor = 0;
    }

    pub fn select_next(&mut self) {
        self.select(step_cursor(self.selected, self.store.len(), true));
    }

    pub fn select_prev(&mut self) {
        self.select(step_cursor(self.selected, self.store.len(), false));
    }

    pub fn rows(&self) -> Vec<Row> {
        let catalog = self.catalog();
        self.store
            .items()
            .iter()
            .map(|w| Row {
                label: w.header.resolve(self.strings()),
                detail: catalog.widget_label(w.category, w.widget_type, w.style),
                visible: w.visible,
                has_children: false,
            })
            .collect()
    }

    pub fn move_item(&mut self, direction: Direction) -> bool {
        match self.store.move_item(self.selection(), direction) {
            Some(path) => {
                self.selected = path.position();
                true
            }
            None => false,
        }
    }

    pub fn new_element(&mut self) -> bool {
        let inserted = if self.store.is_empty() {
            Some(self.store.push())
        } else {
            self.store.insert_after(self.selection())
        };
        match inserted {
            Some(path) => {
                self.select(path.position());
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        let Some(widget) = self.current() else {
            return false;
        };
        let message = format!(
            "{}\n\"{}\"",
            self.text(CONFIRM_DELETE),
            widget.header.resolve(self.strings())
        );
        if !dialogs.yes_no(self.text(CONFIRM_HEADING), &message) {
            return false;
        }
        let path = self.selection();
        if !self.store.delete(path) {
            return false;
        }
        info!(
            target: "home_menu_maker::editor",
            op = "delete",
            index = path.index,
            "widget deleted"
        );
        self.select(self.selected);
        true
    }

    pub fn reset(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        if !dialogs.yes_no(self.text(CONFIRM_HEADING), self.text(CONFIRM_RESET)) {
            return false;
        }
        self.store.reset_to_default();
        self.select(0);
        true
    }

    pub fn edit_header(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        let Some(widget) = self.current() else {
            return false;
        };
        let current = widget.header.resolve(self.strings());
        match dialogs.input(self.text(EDIT_HEADER), &current) {
            Some(text) if !text.is_empty() => self.store.set_value(
                self.selection(),
                WidgetField::Header,
                FieldValue::Label(Label::literal(text)),
            ),
            _ => false,
        }
    }

    /// Ask for a new item limit. Only limitable widget types have one.
    pub fn edit_limit(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        let Some(widget) = self.current() else {
            return false;
        };
        if !self.catalog().is_limitable(widget.category, widget.widget_type) {
            return false;
        }
        let current = widget.limit.max(1).to_string();
        let Some(raw) = dialogs.numeric(self.text(EDIT_LIMIT), &current, NumericKind::Number)
        else {
            return false;
        };
        match raw.trim().parse::<i32>() {
            Ok(limit) if limit > 0 => {
                self.store
                    .set_value(self.selection(), WidgetField::Limit, FieldValue::Int(limit))
            }
            _ => false,
        }
    }

    pub fn toggle_visibility(&mut self) -> bool {
        let path = self.selection();
        let visible = self.store.value(path, WidgetField::Visible).as_bool();
        self.store
            .set_value(path, WidgetField::Visible, FieldValue::Bool(!visible))
    }

    /// Step to the next category. Type, style and every source field are
    /// cleared by the store.
    pub fn cycle_category(&mut self, forward: bool) -> bool {
        let Some(widget) = self.current() else {
            return false;
        };
        let next = cycle(widget.category, self.catalog().category_count(), forward);
        self.addon_cursor = 0;
        self.store
            .set_value(self.selection(), WidgetField::Category, FieldValue::Int(next))
    }

    /// Pick a type/style pair of the widget's category.
    pub fn choose_widget(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        let Some(widget) = self.current() else {
            return false;
        };
        let (category, old_type, old_style) = (widget.category, widget.widget_type, widget.style);
        let keep_header = widget.header != Label::Localized(NEW_WIDGET_HEADER);
        let catalog = self.catalog();
        let choices = catalog.choices(category);
        if choices.is_empty() {
            dialogs.ok(
                &catalog.category_name(category, false),
                self.text(NOTHING_TO_CHOOSE),
            );
            return false;
        }
        let options: Vec<String> = choices.iter().map(|c| c.label.clone()).collect();
        let preselect = catalog.choice_index(category, old_type, old_style);
        let heading = catalog.category_name(category, false);
        let Some(choice) = dialogs
            .select(&heading, &options, preselect)
            .and_then(|i| choices.into_iter().nth(i))
        else {
            return false;
        };

        let path = self.selection();
        let type_name = catalog.lookup(category, choice.widget_type).map(|t| t.name);
        let limitable = catalog.is_limitable(category, choice.widget_type);
        let type_changed = choice.widget_type != old_type;

        self.store
            .set_value(path, WidgetField::Type, FieldValue::Int(choice.widget_type));
        self.store
            .set_value(path, WidgetField::Style, FieldValue::Int(choice.style));
        if let Some(name) = type_name.filter(|_| type_changed || !keep_header) {
            self.store
                .set_value(path, WidgetField::Header, FieldValue::Label(Label::Localized(name)));
        }
        let limit = self.store.value(path, WidgetField::Limit).as_int();
        if !limitable {
            self.store.set_value(path, WidgetField::Limit, FieldValue::Int(-1));
        } else if limit < 1 {
            self.store
                .set_value(path, WidgetField::Limit, FieldValue::Int(DEFAULT_LIMIT));
        }
        info!(
            target: "home_menu_maker::editor",
            op = "choose_widget",
            category,
            widget_type = choice.widget_type,
            style = choice.style,
            "widget chosen"
        );
        true
    }

    fn source_kind(&self) -> Option<SourceKind> {
        let widget = self.current()?;
        self.catalog().source(widget.category, widget.widget_type)
    }

    /// Pick the channels of a running-at widget from the host's TV channels.
    pub fn edit_channels(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        if self.source_kind() != Some(SourceKind::RunningAt) {
            return false;
        }
        let heading = self.text(CHOOSE_CHANNELS).to_string();
        let result = QueryRequest::new("PVR.GetChannels")
            .properties(&["icon", "channelnumber"])
            .param("channelgroupid", "alltv")
            .send_list(self.query.as_ref(), "channels");
        let channels: Vec<Channel> = match result {
            Ok(values) => values
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect(),
            Err(err) => {
                warn!(
                    target: "home_menu_maker::editor",
                    op = "edit_channels",
                    error = %err,
                    "channel listing unavailable"
                );
                dialogs.ok(&heading, &err.to_string());
                return false;
            }
        };
        if channels.is_empty() {
            dialogs.ok(&heading, self.text(NOTHING_TO_CHOOSE));
            return false;
        }

        let path = self.selection();
        let current = match self.store.value(path, WidgetField::Channels) {
            FieldValue::Ids(ids) => ids,
            _ => Vec::new(),
        };
        let options: Vec<String> = channels
            .iter()
            .map(|c| format!("{}. {}", c.channelnumber, c.label))
            .collect();
        let preselect: Vec<usize> = channels
            .iter()
            .enumerate()
            .filter(|(_, c)| current.contains(&c.channelid))
            .map(|(i, _)| i)
            .collect();
        let Some(mut picked) = dialogs.multiselect(&heading, &options, &preselect) else {
            return false;
        };
        picked.sort_unstable();
        let ids: Vec<u32> = picked
            .into_iter()
            .filter_map(|i| channels.get(i).map(|c| c.channelid))
            .collect();
        self.store
            .set_value(path, WidgetField::Channels, FieldValue::Ids(ids))
    }

    pub fn edit_point_in_time(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        if self.source_kind() != Some(SourceKind::RunningAt) {
            return false;
        }
        let path = self.selection();
        let stored = self.store.value(path, WidgetField::PointInTime);
        let current = match stored.as_text() {
            "" => "00:00",
            time => time,
        };
        let Some(raw) = dialogs.numeric(self.text(CHOOSE_TIME), current, NumericKind::Time) else {
            return false;
        };
        match parse_time(&raw) {
            Some(time) => self
                .store
                .set_value(path, WidgetField::PointInTime, FieldValue::Text(time)),
            None => {
                warn!(
                    target: "home_menu_maker::editor",
                    op = "edit_point_in_time",
                    input = %raw,
                    "not a time of day"
                );
                false
            }
        }
    }

    /// Installed add-ons of every kind a static widget can launch, first
    /// occurrence wins.
    fn installed_addons(&self) -> Vec<InstalledAddon> {
        let mut seen = HashSet::new();
        let mut addons = Vec::new();
        for kind in ADDON_KINDS {
            let result = QueryRequest::new("Addons.GetAddons")
                .properties(&["name", "thumbnail"])
                .param("type", *kind)
                .send_list(self.query.as_ref(), "addons");
            match result {
                Ok(values) => {
                    for addon in values
                        .into_iter()
                        .filter_map(|v| serde_json::from_value::<InstalledAddon>(v).ok())
                    {
                        if seen.insert(addon.addonid.clone()) {
                            addons.push(addon);
                        }
                    }
                }
                Err(err) => warn!(
                    target: "home_menu_maker::editor",
                    op = "edit_addons",
                    kind = *kind,
                    error = %err,
                    "add-on listing unavailable"
                ),
            }
        }
        addons
    }

    /// Pick the add-ons of a static add-on widget. Add-ons already on the
    /// widget keep their order; new ones are appended.
    pub fn edit_addons(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        if self.source_kind() != Some(SourceKind::Addons) {
            return false;
        }
        let heading = self.text(CHOOSE_ADDONS).to_string();
        let installed = self.installed_addons();
        if installed.is_empty() {
            dialogs.ok(&heading, self.text(NOTHING_TO_CHOOSE));
            return false;
        }
        let path = self.selection();
        let current = match self.store.value(path, WidgetField::Addons) {
            FieldValue::Addons(addons) => addons,
            _ => Vec::new(),
        };
        let options: Vec<String> = installed.iter().map(|a| a.name.clone()).collect();
        let preselect: Vec<usize> = installed
            .iter()
            .enumerate()
            .filter(|(_, a)| current.iter().any(|c| c.id == a.addonid))
            .map(|(i, _)| i)
            .collect();
        let Some(mut picked) = dialogs.multiselect(&heading, &options, &preselect) else {
            return false;
        };
        picked.sort_unstable();
        let chosen: Vec<&InstalledAddon> =
            picked.iter().filter_map(|i| installed.get(*i)).collect();

        let mut addons: Vec<AddonRef> = current
            .into_iter()
            .filter(|c| chosen.iter().any(|a| a.addonid == c.id))
            .collect();
        for addon in chosen {
            if !addons.iter().any(|c| c.id == addon.addonid) {
                addons.push(AddonRef {
                    id: addon.addonid.clone(),
                    name: addon.name.clone(),
                    thumb: addon.thumbnail.clone(),
                });
            }
        }
        self.addon_cursor = 0;
        self.store
            .set_value(path, WidgetField::Addons, FieldValue::Addons(addons))
    }

    fn current_addons(&self) -> &[AddonRef] {
        self.current()
            .and_then(|w| w.addons.as_deref())
            .unwrap_or(&[])
    }

    pub fn addon_cursor(&self) -> usize {
        self.addon_cursor
    }

    pub fn select_addon(&mut self, forward: bool) {
        self.addon_cursor = step_cursor(self.addon_cursor, self.current_addons().len(), forward);
    }

    pub fn move_addon(&mut self, direction: Direction) -> bool {
        let mut addons = self.current_addons().to_vec();
        let from = self.addon_cursor;
        if from >= addons.len() {
            return false;
        }
        let to = match direction {
            Direction::Up if from > 0 => from - 1,
            Direction::Down if from + 1 < addons.len() => from + 1,
            _ => return false,
        };
        addons.swap(from, to);
        self.addon_cursor = to;
        self.store
            .set_value(self.selection(), WidgetField::Addons, FieldValue::Addons(addons))
    }

    pub fn edit_playlist(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        let Some(SourceKind::Playlist { kind, subtype }) = self.source_kind() else {
            return false;
        };
        let heading = self.text(CHOOSE_PLAYLIST).to_string();
        let playlists: Vec<_> = list_playlists(&self.ctx.playlists_dir(kind))
            .into_iter()
            .filter(|p| p.subtype().as_deref() == Some(subtype))
            .collect();
        if playlists.is_empty() {
            dialogs.ok(&heading, self.text(NO_PLAYLISTS));
            return false;
        }
        let path = self.selection();
        let current = self.store.value(path, WidgetField::Playlist);
        let options: Vec<String> = playlists.iter().map(|p| p.name.clone()).collect();
        let preselect = playlists
            .iter()
            .position(|p| p.file_name() == current.as_text());
        match dialogs
            .select(&heading, &options, preselect)
            .and_then(|i| playlists.get(i))
        {
            Some(playlist) => self.store.set_value(
                path,
                WidgetField::Playlist,
                FieldValue::Text(playlist.file_name()),
            ),
            None => false,
        }
    }

    /// Point an add-on path widget at one of the stored paths. The widget
    /// header follows the entry name.
    pub fn edit_addon_path(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        if self.source_kind() != Some(SourceKind::AddonPath) {
            return false;
        }
        let entries = self.addon_paths.read_existing();
        if entries.is_empty() {
            dialogs.ok(self.text(NO_PATHS_HEADING), self.text(NO_PATHS));
            return false;
        }
        let path = self.selection();
        let current_id = match self.store.value(path, WidgetField::AddonPath) {
            FieldValue::AddonPath(Some(entry)) => Some(entry.id),
            _ => None,
        };
        let options: Vec<String> = entries
            .iter()
            .map(|e| format!("{} ({})", e.name, e.path))
            .collect();
        let preselect = current_id.and_then(|id| entries.iter().position(|e| e.id == id));
        let Some(entry) = dialogs
            .select(self.text(CHOOSE_PATH), &options, preselect)
            .and_then(|i| entries.into_iter().nth(i))
        else {
            return false;
        };
        let header = Label::literal(entry.name.clone());
        self.store
            .set_value(path, WidgetField::AddonPath, FieldValue::AddonPath(Some(entry)))
            && self
                .store
                .set_value(path, WidgetField::Header, FieldValue::Label(header))
    }

    pub fn add_addon_path(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        let Some(raw_path) = dialogs.input(self.text(ADD_PATH), "plugin://") else {
            return false;
        };
        let raw_path = raw_path.trim().to_string();
        if raw_path.is_empty() || raw_path == "plugin://" {
            return false;
        }
        let suggested = raw_path
            .strip_prefix("plugin://")
            .and_then(|rest| rest.split('/').next())
            .unwrap_or_default()
            .to_string();
        let name = dialogs
            .input(self.text(ADD_PATH_NAME), &suggested)
            .filter(|n| !n.is_empty())
            .unwrap_or(suggested);
        match self.addon_paths.add(&name, &raw_path) {
            Ok(entry) => entry.is_some(),
            Err(err) => {
                warn!(
                    target: "home_menu_maker::editor",
                    op = "add_addon_path",
                    error = %err,
                    "add-on path not saved"
                );
                false
            }
        }
    }

    pub fn manage_addon_paths(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        let entries = self.addon_paths.read_existing();
        if entries.is_empty() {
            dialogs.ok(self.text(NO_PATHS_HEADING), self.text(NO_PATHS));
            return false;
        }
        let options: Vec<String> = entries
            .iter()
            .map(|e| format!("{} ({})", e.name, e.path))
            .collect();
        let picked = match dialogs.multiselect(self.text(DELETE_PATHS), &options, &[]) {
            Some(picked) if !picked.is_empty() => picked,
            _ => return false,
        };
        match self.addon_paths.delete(&picked) {
            Ok(left) => {
                info!(
                    target: "home_menu_maker::editor",
                    op = "manage_addon_paths",
                    removed = entries.len().saturating_sub(left.len()),
                    "add-on paths deleted"
                );
                true
            }
            Err(err) => {
                warn!(
                    target: "home_menu_maker::editor",
                    op = "manage_addon_paths",
                    error = %err,
                    "add-on path table not saved"
                );
                false
            }
        }
    }

    pub fn cycle_sort_order(&mut self, forward: bool) -> bool {
        let Some(widget) = self.current() else {
            return false;
        };
        let catalog = self.catalog();
        if !catalog.is_orderable(widget.category, widget.widget_type) {
            return false;
        }
        let next = cycle(widget.sortby, catalog.sort_options().len(), forward);
        self.store
            .set_value(self.selection(), WidgetField::SortBy, FieldValue::Int(next))
    }

    /// Skin commands exposing the running-at widgets by name. Every slot is
    /// reset first so stale names disappear.
    pub fn skin_commands(&self) -> Vec<String> {
        let mut commands = Vec::new();
        for slot in 0..MAX_RUNNING_AT {
            commands.push(format!("Skin.Reset(runningat_name_{slot})"));
            commands.push(format!("Skin.Reset(runningat_path_{slot})"));
        }
        for (slot, (name, path)) in self.store.running_at_strings().into_iter().enumerate() {
            commands.push(format!("Skin.SetString(runningat_name_{slot},{name})"));
            commands.push(format!("Skin.SetString(runningat_path_{slot},{path})"));
        }
        commands
    }

    pub fn commit(&mut self) -> bool {
        match self.store.commit() {
            Ok(written) => written,
            Err(err) => {
                warn!(
                    target: "home_menu_maker::editor",
                    op = "commit",
                    error = %err,
                    "widgets not saved"
                );
                false
            }
        }
    }

    /// Commit and hand back the skin commands the host should run.
    pub fn close(&mut self) -> Vec<String> {
        self.commit();
        self.skin_commands()
    }

    pub fn detail(&self) -> Option<WidgetDetail> {
        let widget = self.current()?;
        let catalog = self.catalog();
        let (c, t, s) = (widget.category, widget.widget_type, widget.style);
        let sort = catalog.is_orderable(c, t).then(|| {
            let options = catalog.sort_options();
            usize::try_from(widget.sortby)
                .ok()
                .and_then(|i| options.get(i).cloned())
                .or_else(|| options.first().cloned())
                .unwrap_or_default()
        });
        let addons = match widget.source(catalog) {
            WidgetSource::Addons(addons) => addons.iter().map(|a| a.name.clone()).collect(),
            _ => Vec::new(),
        };
        Some(WidgetDetail {
            header: widget.header.resolve(self.strings()),
            category: catalog.category_name(c, true),
            widget: catalog.widget_label(c, t, s),
            description: catalog.style_desc(c, t, s),
            limit: catalog.is_limitable(c, t).then_some(widget.limit),
            sort,
            visible: widget.visible,
            path: widget.content_path(catalog),
            addons,
        })
    }
}
