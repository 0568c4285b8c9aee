//! Menu tree elements: main-menu items with at most one level of submenu.

use serde::{Deserialize, Serialize};

use crate::config::ConfigContext;
use crate::label::Label;
use crate::markup::MenuProjector;
use crate::store::{Element, FieldValue, OrderedStore, StorePaths};

pub const NEW_ITEM_LABEL: u32 = 30022;
pub const NEW_ITEM_THUMB: &str = "icons/buttons/new.png";

fn unset() -> i32 {
    -1
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(default)]
    pub label: Label,
    #[serde(default)]
    pub thumb: String,
    #[serde(default = "unset")]
    pub actiontype: i32,
    #[serde(default = "unset")]
    pub action: i32,
    /// Playlist file or add-on id for action types whose listing changes at
    /// runtime. Older files only carry `action`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Index into the catalog's thumb sizes.
    #[serde(default)]
    pub thumbsize: u8,
    #[serde(default)]
    pub submenu: Vec<MenuItem>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuField {
    Label,
    Thumb,
    ActionType,
    Action,
    Target,
    Visible,
    ThumbSize,
}

impl MenuItem {
    /// Children that will show up in the generated submenu.
    pub fn visible_children(&self) -> impl Iterator<Item = &MenuItem> {
        self.submenu.iter().filter(|c| c.visible)
    }
}

impl Element for MenuItem {
    type Field = MenuField;

    fn template() -> Self {
        Self {
            label: Label::Localized(NEW_ITEM_LABEL),
            thumb: NEW_ITEM_THUMB.to_string(),
            actiontype: -1,
            action: -1,
            target: None,
            visible: true,
            thumbsize: 0,
            submenu: Vec::new(),
        }
    }

    fn children(&self) -> Option<&Vec<Self>> {
        Some(&self.submenu)
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Self>> {
        Some(&mut self.submenu)
    }

    fn get(&self, field: MenuField) -> FieldValue {
        match field {
            MenuField::Label => FieldValue::Label(self.label.clone()),
            MenuField::Thumb => FieldValue::Text(self.thumb.clone()),
            MenuField::ActionType => FieldValue::Int(self.actiontype),
            MenuField::Action => FieldValue::Int(self.action),
            MenuField::Target => FieldValue::Text(self.target.clone().unwrap_or_default()),
            MenuField::Visible => FieldValue::Bool(self.visible),
            MenuField::ThumbSize => FieldValue::Int(i32::from(self.thumbsize)),
        }
    }

    fn set(&mut self, field: MenuField, value: FieldValue) -> bool {
        match (field, value) {
            (MenuField::Label, FieldValue::Label(label)) => self.label = label,
            (MenuField::Label, FieldValue::Text(text)) => self.label = Label::Literal(text),
            (MenuField::Thumb, FieldValue::Text(thumb)) => self.thumb = thumb,
            (MenuField::ActionType, FieldValue::Int(v)) => self.actiontype = v,
            (MenuField::Action, FieldValue::Int(v)) => self.action = v,
            (MenuField::Target, FieldValue::Text(text)) => {
                self.target = (!text.is_empty()).then_some(text)
            }
            (MenuField::Visible, FieldValue::Bool(v)) => self.visible = v,
            (MenuField::ThumbSize, FieldValue::Int(v)) => match u8::try_from(v) {
                Ok(size) => self.thumbsize = size,
                Err(_) => return false,
            },
            _ => return false,
        }
        true
    }

    fn zero(field: MenuField) -> FieldValue {
        match field {
            MenuField::Label => FieldValue::Label(Label::default()),
            MenuField::Thumb | MenuField::Target => FieldValue::Text(String::new()),
            MenuField::ActionType | MenuField::Action | MenuField::ThumbSize => FieldValue::Int(0),
            MenuField::Visible => FieldValue::Bool(false),
        }
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

pub type MenuStore = OrderedStore<MenuItem, MenuProjector>;

impl MenuStore {
    pub fn for_context(ctx: &ConfigContext, projector: MenuProjector) -> Self {
        Self::new(
            StorePaths {
                user: ctx.menu_user_path(),
                default: ctx.menu_default_path(),
                markup: ctx.menu_markup_path(),
            },
            projector,
        )
    }
}
