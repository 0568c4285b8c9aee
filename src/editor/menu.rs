//! Menu tree editing session.

use std::rc::Rc;

use tracing::{info, warn};

use crate::catalog::ActionCatalog;
use crate::config::{ConfigContext, StringTable};
use crate::editor::{cycle, step_cursor, Row, CONFIRM_DELETE, CONFIRM_HEADING};
use crate::host::{Dialogs, QueryService};
use crate::label::Label;
use crate::markup::MenuProjector;
use crate::store::{Direction, FieldValue, ItemPath, MenuField, MenuItem, MenuStore};

const EDIT_LABEL: u32 = 30028;
const EDIT_ICON: u32 = 30029;
const DELETE_SUBMENU_TOO: u32 = 30114;
const CONFIRM_RESET: u32 = 30115;
const NOTHING_TO_CHOOSE: u32 = 30118;

/// Resolved view of the selected element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuDetail {
    pub label: String,
    pub thumb: String,
    pub visible: bool,
    pub action_type: String,
    pub action: String,
    pub thumb_size: String,
    pub submenu_len: usize,
}

pub struct MenuEditor {
    store: MenuStore,
    strings: StringTable,
    selected: usize,
    /// Parent index while the submenu level is shown.
    submenu: Option<usize>,
}

impl MenuEditor {
    pub fn new(store: MenuStore, strings: StringTable) -> Self {
        Self {
            store,
            strings,
            selected: 0,
            submenu: None,
        }
    }

    /// Load the menu for `ctx`. `None` when neither the user nor the default
    /// store can be read.
    pub fn open(ctx: &ConfigContext, query: Rc<dyn QueryService>) -> Option<Self> {
        let catalog = ActionCatalog::new(ctx, query);
        let mut store = MenuStore::for_context(ctx, MenuProjector::new(catalog));
        if !store.load() {
            return None;
        }
        if let Err(err) = store.ensure_markup() {
            warn!(
                target: "home_menu_maker::editor",
                op = "open",
                error = %err,
                "could not regenerate menu markup"
            );
        }
        Some(Self::new(store, ctx.strings.clone()))
    }

    pub fn store(&self) -> &MenuStore {
        &self.store
    }

    fn catalog(&self) -> &ActionCatalog {
        self.store.projector().catalog()
    }

    /// Drop cached playlist and add-on listings.
    pub fn reload_catalog(&mut self) {
        self.store.projector_mut().catalog_mut().reload();
    }

    pub fn selection(&self) -> ItemPath {
        match self.submenu {
            Some(parent) => ItemPath::child(parent, self.selected),
            None => ItemPath::top(self.selected),
        }
    }

    pub fn submenu_parent(&self) -> Option<usize> {
        self.submenu
    }

    pub fn level_len(&self) -> usize {
        self.store.level_len(self.selection())
    }

    pub fn select(&mut self, position: usize) {
        self.selected = position.min(self.level_len().saturating_sub(1));
    }

    pub fn select_next(&mut self) {
        self.selected = step_cursor(self.selected, self.level_len(), true);
    }

    pub fn select_prev(&mut self) {
        self.selected = step_cursor(self.selected, self.level_len(), false);
    }

    /// Elements of the level being edited.
    pub fn rows(&self) -> Vec<Row> {
        let level: &[MenuItem] = match self.submenu {
            Some(parent) => self
                .store
                .items()
                .get(parent)
                .map(|p| p.submenu.as_slice())
                .unwrap_or(&[]),
            None => self.store.items(),
        };
        level
            .iter()
            .map(|item| Row {
                label: item.label.resolve(&self.strings),
                detail: self.catalog().type_name(item.actiontype, false),
                visible: item.visible,
                has_children: !item.submenu.is_empty(),
            })
            .collect()
    }

    /// Descend into the selected item's submenu.
    pub fn open_submenu(&mut self) -> bool {
        if self.submenu.is_some() || !self.store.has_children(self.selected) {
            return false;
        }
        self.submenu = Some(self.selected);
        self.selected = 0;
        true
    }

    /// Return to the main level, selecting the parent.
    pub fn close_submenu(&mut self) -> bool {
        match self.submenu.take() {
            Some(parent) => {
                self.selected = parent;
                true
            }
            None => false,
        }
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

    pub fn edit_label(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        let path = self.selection();
        let current = match self.store.value(path, MenuField::Label) {
            FieldValue::Label(label) => label.resolve(&self.strings),
            _ => String::new(),
        };
        let Some(text) = dialogs.input(self.strings.get(EDIT_LABEL), &current) else {
            return false;
        };
        if text.is_empty() {
            return false;
        }
        self.store
            .set_value(path, MenuField::Label, FieldValue::Label(Label::literal(text)))
    }

    pub fn edit_icon(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        let path = self.selection();
        let current = self.store.value(path, MenuField::Thumb);
        match dialogs.browse_image(self.strings.get(EDIT_ICON), current.as_text()) {
            Some(thumb) if !thumb.is_empty() => {
                self.store
                    .set_value(path, MenuField::Thumb, FieldValue::Text(thumb))
            }
            _ => false,
        }
    }

    pub fn toggle_visibility(&mut self) -> bool {
        let path = self.selection();
        let visible = self.store.value(path, MenuField::Visible).as_bool();
        self.store
            .set_value(path, MenuField::Visible, FieldValue::Bool(!visible))
    }

    /// Step to the next action type. The chosen action no longer applies and
    /// is cleared.
    pub fn cycle_action_type(&mut self, forward: bool) -> bool {
        let path = self.selection();
        if self.store.item(path).is_none() {
            return false;
        }
        let current = self.store.value(path, MenuField::ActionType).as_int();
        let next = cycle(current, self.catalog().type_count(), forward);
        self.store
            .set_value(path, MenuField::ActionType, FieldValue::Int(next))
            && self
                .store
                .set_value(path, MenuField::Action, FieldValue::Int(-1))
            && self
                .store
                .set_value(path, MenuField::Target, FieldValue::Text(String::new()))
    }

    /// Pick an action of the current type; label and thumb follow the action.
    pub fn choose_action(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        let path = self.selection();
        let Some(item) = self.store.item(path) else {
            return false;
        };
        let action_type = item.actiontype;
        let action = self
            .catalog()
            .locate(action_type, item.action, item.target.as_deref());
        let heading = self.catalog().type_name(action_type, false);
        let actions = self.catalog().actions(action_type);
        if actions.is_empty() {
            dialogs.ok(&heading, self.strings.get(NOTHING_TO_CHOOSE));
            return false;
        }
        let options: Vec<String> = actions
            .iter()
            .map(|entry| entry.label.resolve(&self.strings))
            .collect();
        let preselect = usize::try_from(action).ok().filter(|i| *i < actions.len());
        let Some(index) = dialogs.select(&heading, &options, preselect) else {
            return false;
        };
        let Some(entry) = actions.into_iter().nth(index) else {
            return false;
        };
        info!(
            target: "home_menu_maker::editor",
            op = "choose_action",
            action_type,
            action = index,
            "action chosen"
        );
        let target = if self.catalog().is_dynamic(action_type) {
            entry.path.clone()
        } else {
            String::new()
        };
        self.store
            .set_value(path, MenuField::Action, FieldValue::Int(index as i32));
        self.store
            .set_value(path, MenuField::Target, FieldValue::Text(target));
        self.store
            .set_value(path, MenuField::Label, FieldValue::Label(entry.label));
        self.store
            .set_value(path, MenuField::Thumb, FieldValue::Text(entry.thumb))
    }

    pub fn cycle_thumb_size(&mut self, forward: bool) -> bool {
        let path = self.selection();
        if self.store.item(path).is_none() {
            return false;
        }
        let current = self.store.value(path, MenuField::ThumbSize).as_int();
        let next = cycle(current, self.catalog().thumb_sizes().len(), forward);
        self.store
            .set_value(path, MenuField::ThumbSize, FieldValue::Int(next))
    }

    /// Insert a new element after the selection, or the first one of an
    /// empty menu.
    pub fn new_element(&mut self) -> bool {
        let inserted = if self.level_len() == 0 {
            match self.submenu {
                Some(parent) => self.store.add_child(parent),
                None => Some(self.store.push()),
            }
        } else {
            self.store.insert_after(self.selection())
        };
        match inserted {
            Some(path) => {
                self.selected = path.position();
                true
            }
            None => false,
        }
    }

    /// Give the selected main item its first submenu entry and open it.
    pub fn new_submenu(&mut self) -> bool {
        if self.submenu.is_some() {
            return false;
        }
        match self.store.add_child(self.selected) {
            Some(path) => {
                self.submenu = Some(path.index);
                self.selected = 0;
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        let path = self.selection();
        let Some(item) = self.store.item(path) else {
            return false;
        };
        let mut message = format!(
            "{}\n\"{}\"",
            self.strings.get(CONFIRM_DELETE),
            item.label.resolve(&self.strings)
        );
        if path.child.is_none() && !item.submenu.is_empty() {
            message.push('\n');
            message.push_str(self.strings.get(DELETE_SUBMENU_TOO));
        }
        if !dialogs.yes_no(self.strings.get(CONFIRM_HEADING), &message) {
            return false;
        }
        if !self.store.delete(path) {
            return false;
        }
        info!(
            target: "home_menu_maker::editor",
            op = "delete",
            ?path,
            "menu item deleted"
        );
        if self.submenu.is_some() && self.level_len() == 0 {
            self.close_submenu();
        } else {
            self.select(self.selected);
        }
        true
    }

    /// Replace the menu with the bundled default after confirmation.
    pub fn reset(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        if !dialogs.yes_no(
            self.strings.get(CONFIRM_HEADING),
            self.strings.get(CONFIRM_RESET),
        ) {
            return false;
        }
        self.store.reset_to_default();
        self.submenu = None;
        self.selected = 0;
        true
    }

    /// Persist pending changes. Failures are logged and leave the changes
    /// pending.
    pub fn commit(&mut self) -> bool {
        match self.store.commit() {
            Ok(written) => written,
            Err(err) => {
                warn!(
                    target: "home_menu_maker::editor",
                    op = "commit",
                    error = %err,
                    "menu not saved"
                );
                false
            }
        }
    }

    /// Step back one level, committing when leaving the editor.
    /// Returns `true` when the editor is done.
    pub fn back(&mut self) -> bool {
        if self.close_submenu() {
            return false;
        }
        self.commit();
        true
    }

    pub fn detail(&self) -> Option<MenuDetail> {
        let item = self.store.item(self.selection())?;
        let catalog = self.catalog();
        Some(MenuDetail {
            label: item.label.resolve(&self.strings),
            thumb: item.thumb.clone(),
            visible: item.visible,
            action_type: catalog.type_name(item.actiontype, true),
            action: catalog.action_label(
                item.actiontype,
                catalog.locate(item.actiontype, item.action, item.target.as_deref()),
            ),
            thumb_size: catalog
                .thumb_sizes()
                .get(usize::from(item.thumbsize))
                .cloned()
                .unwrap_or_default(),
            submenu_len: item.submenu.len(),
        })
    }
}
