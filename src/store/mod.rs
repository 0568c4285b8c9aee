//! Ordered configuration stores: the canonical, user-editable collections.
//!
//! [`OrderedStore`] owns one collection (menu tree or widget list), tracks a
//! dirty flag and on commit writes both the JSON store and the derived skin
//! markup through its [`Projector`].

pub mod addon_paths;
pub mod menu;
pub mod widget;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::label::Label;
use crate::markup::Document;

pub use addon_paths::{AddonPathEntry, AddonPathStore};
pub use menu::{MenuField, MenuItem, MenuStore};
pub use widget::{AddonRef, WidgetField, WidgetItem, WidgetStore};

/// Address of an element: a top-level index, optionally narrowed to one of its
/// children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemPath {
    pub index: usize,
    pub child: Option<usize>,
}

impl ItemPath {
    pub fn top(index: usize) -> Self {
        Self { index, child: None }
    }

    pub fn child(index: usize, child: usize) -> Self {
        Self {
            index,
            child: Some(child),
        }
    }

    pub fn position(&self) -> usize {
        self.child.unwrap_or(self.index)
    }

    fn with_position(self, position: usize) -> Self {
        match self.child {
            Some(_) => Self::child(self.index, position),
            None => Self::top(position),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Value of one element field. Each field has a fixed variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Int(i32),
    Bool(bool),
    Text(String),
    Label(Label),
    Ids(Vec<u32>),
    Addons(Vec<AddonRef>),
    AddonPath(Option<AddonPathEntry>),
}

impl FieldValue {
    pub fn as_int(&self) -> i32 {
        match self {
            Self::Int(v) => *v,
            _ => 0,
        }
    }

    pub fn as_bool(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(v) => v,
            _ => "",
        }
    }
}

/// Capabilities an element needs to live in an [`OrderedStore`].
pub trait Element: Serialize + DeserializeOwned + Clone {
    type Field: Copy + std::fmt::Debug;

    /// Element inserted by `insert_after`/`push`.
    fn template() -> Self;

    /// `None` for elements that can never hold children.
    fn children(&self) -> Option<&Vec<Self>>;

    fn children_mut(&mut self) -> Option<&mut Vec<Self>>;

    fn get(&self, field: Self::Field) -> FieldValue;

    /// Returns `false` when `value` has the wrong shape for `field`.
    fn set(&mut self, field: Self::Field, value: FieldValue) -> bool;

    /// Value reported for an invalid path.
    fn zero(field: Self::Field) -> FieldValue;

    fn is_visible(&self) -> bool;
}

/// Pure transform from store items to a skin include document.
pub trait Projector<E> {
    fn project(&self, items: &[E]) -> Document;
}

#[derive(Clone, Debug)]
pub struct StorePaths {
    pub user: PathBuf,
    pub default: PathBuf,
    pub markup: PathBuf,
}

pub struct OrderedStore<E: Element, P: Projector<E>> {
    paths: StorePaths,
    projector: P,
    items: Vec<E>,
    dirty: bool,
}

pub fn read_items<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let data = fs::read_to_string(path).map_err(|err| StoreError::io(path, err))?;
    serde_json::from_str(&data).map_err(|err| StoreError::parse(path, err))
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
    }
    let data = serde_json::to_string_pretty(value).map_err(StoreError::Serialize)?;
    fs::write(path, data).map_err(|err| StoreError::io(path, err))
}

impl<E: Element, P: Projector<E>> OrderedStore<E, P> {
    /// Create an empty store. Call [`load`](Self::load) before editing.
    pub fn new(paths: StorePaths, projector: P) -> Self {
        Self {
            paths,
            projector,
            items: Vec::new(),
            dirty: false,
        }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    pub fn projector(&self) -> &P {
        &self.projector
    }

    pub fn projector_mut(&mut self) -> &mut P {
        &mut self.projector
    }

    /// Load the user store, falling back to the bundled default. Returns
    /// `false` and leaves the store empty when neither can be read.
    pub fn load(&mut self) -> bool {
        match self.try_load() {
            Ok(items) => {
                self.items = items;
                true
            }
            Err(err) => {
                warn!(
                    target: "home_menu_maker::store",
                    op = "load",
                    error = %err,
                    "no usable store, starting empty"
                );
                self.items.clear();
                false
            }
        }
    }

    pub fn try_load(&self) -> Result<Vec<E>, StoreError> {
        match read_items::<E>(&self.paths.user) {
            Ok(items) => {
                debug!(
                    target: "home_menu_maker::store",
                    op = "load",
                    path = %self.paths.user.display(),
                    count = items.len(),
                    "user store loaded"
                );
                return Ok(items);
            }
            Err(StoreError::NotFound(_)) => {}
            Err(err) => {
                warn!(
                    target: "home_menu_maker::store",
                    op = "load",
                    error = %err,
                    "user store unusable, falling back to default"
                );
            }
        }
        let items = read_items::<E>(&self.paths.default)?;
        debug!(
            target: "home_menu_maker::store",
            op = "load",
            path = %self.paths.default.display(),
            count = items.len(),
            "default store loaded"
        );
        Ok(items)
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, path: ItemPath) -> Option<&E> {
        let top = self.items.get(path.index)?;
        match path.child {
            None => Some(top),
            Some(child) => top.children()?.get(child),
        }
    }

    fn item_mut(&mut self, path: ItemPath) -> Option<&mut E> {
        let top = self.items.get_mut(path.index)?;
        match path.child {
            None => Some(top),
            Some(child) => top.children_mut()?.get_mut(child),
        }
    }

    fn level_mut(&mut self, path: ItemPath) -> Option<&mut Vec<E>> {
        match path.child {
            None => Some(&mut self.items),
            Some(_) => self.items.get_mut(path.index)?.children_mut(),
        }
    }

    pub fn level_len(&self, path: ItemPath) -> usize {
        match path.child {
            None => self.items.len(),
            Some(_) => self
                .items
                .get(path.index)
                .and_then(Element::children)
                .map(Vec::len)
                .unwrap_or(0),
        }
    }

    pub fn has_children(&self, parent: usize) -> bool {
        self.items
            .get(parent)
            .and_then(Element::children)
            .map(|c| !c.is_empty())
            .unwrap_or(false)
    }

    pub fn value(&self, path: ItemPath, field: E::Field) -> FieldValue {
        match self.item(path) {
            Some(item) => item.get(field),
            None => E::zero(field),
        }
    }

    /// Write one field. Invalid paths and mismatched values are ignored.
    pub fn set_value(&mut self, path: ItemPath, field: E::Field, value: FieldValue) -> bool {
        let Some(item) = self.item_mut(path) else {
            warn!(
                target: "home_menu_maker::store",
                op = "set_value",
                ?path,
                ?field,
                "invalid path"
            );
            return false;
        };
        if !item.set(field, value) {
            warn!(
                target: "home_menu_maker::store",
                op = "set_value",
                ?path,
                ?field,
                "value does not fit field"
            );
            return false;
        }
        self.dirty = true;
        true
    }

    /// Insert a template element right after `path`, in the same level.
    pub fn insert_after(&mut self, path: ItemPath) -> Option<ItemPath> {
        let level = self.level_mut(path)?;
        let position = path.position();
        if position >= level.len() {
            return None;
        }
        level.insert(position + 1, E::template());
        self.dirty = true;
        Some(path.with_position(position + 1))
    }

    pub fn push(&mut self) -> ItemPath {
        self.items.push(E::template());
        self.dirty = true;
        ItemPath::top(self.items.len() - 1)
    }

    /// Give a childless element its first child.
    pub fn add_child(&mut self, parent: usize) -> Option<ItemPath> {
        let children = self.items.get_mut(parent)?.children_mut()?;
        if !children.is_empty() {
            return None;
        }
        children.push(E::template());
        self.dirty = true;
        Some(ItemPath::child(parent, 0))
    }

    pub fn delete(&mut self, path: ItemPath) -> bool {
        let Some(level) = self.level_mut(path) else {
            return false;
        };
        let position = path.position();
        if position >= level.len() {
            return false;
        }
        level.remove(position);
        self.dirty = true;
        true
    }

    /// Swap with the neighbour in `direction`. `None` at either boundary.
    pub fn move_item(&mut self, path: ItemPath, direction: Direction) -> Option<ItemPath> {
        let level = self.level_mut(path)?;
        let position = path.position();
        if position >= level.len() {
            return None;
        }
        let target = match direction {
            Direction::Up => position.checked_sub(1)?,
            Direction::Down if position + 1 < level.len() => position + 1,
            Direction::Down => return None,
        };
        level.swap(position, target);
        self.dirty = true;
        Some(path.with_position(target))
    }

    /// Drop the user store and reload the default. Always leaves the store
    /// dirty so the next commit rewrites both files.
    pub fn reset_to_default(&mut self) -> bool {
        if let Err(err) = fs::remove_file(&self.paths.user) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    target: "home_menu_maker::store",
                    op = "reset",
                    path = %self.paths.user.display(),
                    error = %err,
                    "could not remove user store"
                );
            }
        }
        let loaded = match read_items::<E>(&self.paths.default) {
            Ok(items) => {
                self.items = items;
                true
            }
            Err(err) => {
                warn!(
                    target: "home_menu_maker::store",
                    op = "reset",
                    error = %err,
                    "default store unusable"
                );
                self.items.clear();
                false
            }
        };
        self.dirty = true;
        loaded
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn project(&self) -> Document {
        self.projector.project(&self.items)
    }

    /// Persist the items and regenerate the markup when dirty. Returns whether
    /// anything was written; the dirty flag survives a failed write.
    pub fn commit(&mut self) -> Result<bool, StoreError> {
        if !self.dirty {
            return Ok(false);
        }
        let result = write_json(&self.paths.user, &self.items).and_then(|()| {
            self.project()
                .write_atomic(&self.paths.markup)
                .map_err(StoreError::from)
        });
        match result {
            Ok(()) => {
                self.dirty = false;
                info!(
                    target: "home_menu_maker::store",
                    op = "commit",
                    path = %self.paths.user.display(),
                    count = self.items.len(),
                    "store committed"
                );
                Ok(true)
            }
            Err(err) => {
                warn!(
                    target: "home_menu_maker::store",
                    op = "commit",
                    error = %err,
                    "commit failed, keeping changes pending"
                );
                Err(err)
            }
        }
    }

    /// Regenerate the markup file when it is missing.
    pub fn ensure_markup(&mut self) -> Result<bool, StoreError> {
        if self.paths.markup.exists() {
            return Ok(false);
        }
        if self.items.is_empty() && !self.load() {
            return Ok(false);
        }
        self.dirty = true;
        self.commit()
    }
}
