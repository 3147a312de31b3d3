use ahash::AHashMap;
use stagehand_engine::layout::Orientation;
use stagehand_engine::utils::Rectangle;
use stagehand_engine::{Error, Result};
use stagehand_scene_assets::{EventProperties, LayerId, MenuType, WidgetType};
use stagehand_scene_input::{ButtonController, ButtonStatus, RadioButtonController};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetKey(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonTextures {
    pub idle: String,
    pub hovered: String,
    pub pressed: String,
}

impl ButtonTextures {
    pub fn for_status(&self, status: ButtonStatus) -> &str {
        match status {
            ButtonStatus::Idle => &self.idle,
            ButtonStatus::Hovered => &self.hovered,
            ButtonStatus::Pressed => &self.pressed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioTextures {
    pub unselected: String,
    pub selected: String,
}

impl RadioTextures {
    pub fn for_selection(&self, selected: bool) -> &str {
        if selected {
            &self.selected
        } else {
            &self.unselected
        }
    }
}

/// Kind specific state of a widget.
#[derive(Debug, Clone)]
pub enum WidgetData {
    Container,
    Menu {
        menu_type: MenuType,
        orientation: Orientation,
    },
    Decoration {
        texture_id: String,
    },
    Text {
        font_id: String,
        contents: String,
    },
    Button {
        controller: Rc<RefCell<ButtonController>>,
        event: Option<EventProperties>,
        textures: ButtonTextures,
    },
    RadioButton {
        controller: Rc<RefCell<RadioButtonController>>,
        event: Option<EventProperties>,
        textures: RadioTextures,
        group: String,
    },
}

#[derive(Debug, Clone)]
pub struct Widget {
    pub id: String,
    pub widget_type: WidgetType,
    pub layer: LayerId,
    pub bounds: Rectangle,
    pub data: WidgetData,
    parent: Option<WidgetKey>,
    children: Vec<WidgetKey>,
}

impl Widget {
    pub fn new(
        id: &str,
        widget_type: WidgetType,
        layer: LayerId,
        bounds: Rectangle,
        data: WidgetData,
    ) -> Self {
        Self {
            id: id.to_string(),
            widget_type,
            layer,
            bounds,
            data,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn is_container(&self) -> bool {
        self.widget_type.is_container()
    }
}

/// Arena owning every widget of one scene. Ids are unique per tree; nodes
/// refer to each other by key, and removing a node drops its whole subtree.
#[derive(Debug, Default)]
pub struct WidgetTree {
    slots: Vec<Option<Widget>>,
    free: Vec<usize>,
    ids: AHashMap<String, WidgetKey>,
    root: Option<WidgetKey>,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, widget: Widget) -> WidgetKey {
        let key = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(widget);
                WidgetKey(slot)
            }
            None => {
                self.slots.push(Some(widget));
                WidgetKey(self.slots.len() - 1)
            }
        };
        if let Some(w) = self.slots[key.0].as_ref() {
            self.ids.insert(w.id.clone(), key);
        }
        key
    }

    /// Installs the root node. Fails if a root already exists.
    pub fn set_root(&mut self, widget: Widget) -> Result<WidgetKey> {
        if self.root.is_some() {
            return Err(Error::InvalidConfiguration(format!(
                "widget tree already has a root; cannot add '{}'",
                widget.id
            )));
        }
        let key = self.alloc(widget);
        self.root = Some(key);
        Ok(key)
    }

    pub fn root(&self) -> Option<&Widget> {
        self.root.and_then(|k| self.node(k))
    }

    fn node(&self, key: WidgetKey) -> Option<&Widget> {
        self.slots.get(key.0).and_then(|s| s.as_ref())
    }

    fn node_mut(&mut self, key: WidgetKey) -> Option<&mut Widget> {
        self.slots.get_mut(key.0).and_then(|s| s.as_mut())
    }

    /// Adds `widget` as the last child of `parent_id`.
    pub fn insert(&mut self, parent_id: &str, mut widget: Widget) -> Result<WidgetKey> {
        let parent_key = *self.ids.get(parent_id).ok_or_else(|| {
            Error::InvalidConfiguration(format!(
                "parent '{parent_id}' of widget '{}' does not exist",
                widget.id
            ))
        })?;
        if self.ids.contains_key(&widget.id) {
            return Err(Error::InvalidConfiguration(format!(
                "widget '{}' already exists",
                widget.id
            )));
        }
        if !self.node(parent_key).is_some_and(|p| p.is_container()) {
            return Err(Error::InvalidConfiguration(format!(
                "widget '{parent_id}' cannot hold children (adding '{}')",
                widget.id
            )));
        }
        widget.parent = Some(parent_key);
        let key = self.alloc(widget);
        if let Some(parent) = self.node_mut(parent_key) {
            parent.children.push(key);
        }
        Ok(key)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Widget> {
        self.ids.get(id).and_then(|k| self.node(*k))
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Widget> {
        let key = *self.ids.get(id)?;
        self.node_mut(key)
    }

    pub fn parent_id(&self, id: &str) -> Option<&str> {
        let parent = self.get(id)?.parent?;
        self.node(parent).map(|p| p.id.as_str())
    }

    /// Child ids in insertion order; empty for unknown ids.
    pub fn child_ids(&self, id: &str) -> Vec<String> {
        self.get(id)
            .map(|w| {
                w.children
                    .iter()
                    .filter_map(|k| self.node(*k))
                    .map(|c| c.id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Removes `id` and its descendants, returning how many widgets were
    /// dropped. Unknown ids remove nothing.
    pub fn remove(&mut self, id: &str) -> usize {
        let Some(key) = self.ids.get(id).copied() else {
            return 0;
        };
        if let Some(parent) = self.node(key).and_then(|w| w.parent) {
            if let Some(p) = self.node_mut(parent) {
                p.children.retain(|c| *c != key);
            }
        }
        if self.root == Some(key) {
            self.root = None;
        }
        let mut stack = vec![key];
        let mut removed = 0;
        while let Some(k) = stack.pop() {
            if let Some(widget) = self.slots.get_mut(k.0).and_then(|s| s.take()) {
                self.ids.remove(&widget.id);
                stack.extend(widget.children);
                self.free.push(k.0);
                removed += 1;
            }
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Widget> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }
}
