#![forbid(unsafe_code)]

use ahash::AHashMap;
use log::debug;
use serde::{Deserialize, Serialize};
use stagehand_engine::utils::{Position, Rectangle};
use stagehand_engine::{Error, Result};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

pub const KEY_ACTIVATE: &str = "Enter";
pub const KEY_SELECT: &str = "Space";

#[derive(Default, Debug, Clone)]
pub struct InputState {
    // Keys are identified by string names (e.g., "KeyA", "Space")
    pub pressed: HashSet<String>,
    pub just_pressed: HashSet<String>,
    pub just_released: HashSet<String>,
    prev_pressed: HashSet<String>,
    // Mouse
    pub mouse_x: f32,
    pub mouse_y: f32,
    pub lmb_down: bool,
    pub lmb_just_pressed: bool,
    pub lmb_just_released: bool,
    prev_lmb_down: bool,
}

impl InputState {
    pub fn update_from_keys<I: IntoIterator<Item = String>>(&mut self, keys: I) {
        let current: HashSet<String> = keys.into_iter().collect();
        self.just_pressed = current.difference(&self.prev_pressed).cloned().collect();
        self.just_released = self.prev_pressed.difference(&current).cloned().collect();
        self.pressed = current.clone();
        self.prev_pressed = current;
    }

    pub fn update_mouse(&mut self, x: f32, y: f32, lmb_down_now: bool) {
        self.mouse_x = x;
        self.mouse_y = y;
        self.lmb_just_pressed = lmb_down_now && !self.prev_lmb_down;
        self.lmb_just_released = !lmb_down_now && self.prev_lmb_down;
        self.lmb_down = lmb_down_now;
        self.prev_lmb_down = lmb_down_now;
    }

    pub fn mouse(&self) -> Position {
        Position::new(self.mouse_x, self.mouse_y)
    }

    pub fn is_pressed(&self, key: &str) -> bool {
        self.pressed.contains(key)
    }
    pub fn is_just_pressed(&self, key: &str) -> bool {
        self.just_pressed.contains(key)
    }
}

/// One frame of raw input as delivered by the window layer, or replayed.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct InputFrame {
    #[serde(default)]
    pub pressed_keys: Vec<String>,
    #[serde(default)]
    pub mouse_x: f32,
    #[serde(default)]
    pub mouse_y: f32,
    #[serde(default)]
    pub lmb_down: bool,
    #[serde(default)]
    pub delta_seconds: f32,
}

impl InputFrame {
    pub fn from_state(input: &InputState, delta_seconds: f32) -> Self {
        let mut pressed_keys: Vec<String> = input.pressed.iter().cloned().collect();
        pressed_keys.sort();
        Self {
            pressed_keys,
            mouse_x: input.mouse_x,
            mouse_y: input.mouse_y,
            lmb_down: input.lmb_down,
            delta_seconds,
        }
    }

    pub fn mouse(x: f32, y: f32, lmb_down: bool) -> Self {
        Self {
            mouse_x: x,
            mouse_y: y,
            lmb_down,
            ..Default::default()
        }
    }

    pub fn keys<I: IntoIterator<Item = S>, S: Into<String>>(keys: I) -> Self {
        Self {
            pressed_keys: keys.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn apply_to(&self, input: &mut InputState) {
        input.update_from_keys(self.pressed_keys.clone());
        input.update_mouse(self.mouse_x, self.mouse_y, self.lmb_down);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ReplayScript {
    pub frames: Vec<InputFrame>,
}

impl ReplayScript {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::UnexpectedValue(format!("replay script: {e}")))
    }
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s)
            .map_err(|e| Error::InvalidConfiguration(format!("replay script: {e}")))
    }
}

/// What a widget controller reports after looking at a frame of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Hovered,
    Unhovered,
    Pressed,
    Activated,
}

pub trait MouseListener {
    fn on_mouse(&mut self, input: &InputState) -> Option<Action>;
}

pub trait KeyListener {
    fn on_keys(&mut self, input: &InputState) -> Option<Action>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonStatus {
    #[default]
    Idle,
    Hovered,
    Pressed,
}

/// Press/hover state of a push button. Activates on release inside the
/// bounds, or on Enter while hovered.
#[derive(Debug, Clone)]
pub struct ButtonController {
    bounds: Rectangle,
    status: ButtonStatus,
}

impl ButtonController {
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            bounds,
            status: ButtonStatus::Idle,
        }
    }

    pub fn shared(bounds: Rectangle) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(bounds)))
    }

    pub fn status(&self) -> ButtonStatus {
        self.status
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }
}

impl MouseListener for ButtonController {
    fn on_mouse(&mut self, input: &InputState) -> Option<Action> {
        if !self.bounds.contains(input.mouse()) {
            if self.status == ButtonStatus::Idle {
                return None;
            }
            self.status = ButtonStatus::Idle;
            return Some(Action::Unhovered);
        }
        if input.lmb_just_pressed {
            self.status = ButtonStatus::Pressed;
            return Some(Action::Pressed);
        }
        if input.lmb_just_released && self.status == ButtonStatus::Pressed {
            self.status = ButtonStatus::Hovered;
            return Some(Action::Activated);
        }
        if self.status == ButtonStatus::Idle {
            self.status = ButtonStatus::Hovered;
            return Some(Action::Hovered);
        }
        None
    }
}

impl KeyListener for ButtonController {
    fn on_keys(&mut self, input: &InputState) -> Option<Action> {
        if self.status == ButtonStatus::Hovered && input.is_just_pressed(KEY_ACTIVATE) {
            return Some(Action::Activated);
        }
        None
    }
}

/// Selection state of one radio button. Clicking or pressing Space/Enter
/// while hovered selects it; deselection is up to the owning group.
#[derive(Debug, Clone)]
pub struct RadioButtonController {
    bounds: Rectangle,
    hovered: bool,
    selected: bool,
}

impl RadioButtonController {
    pub fn new(bounds: Rectangle, selected: bool) -> Self {
        Self {
            bounds,
            hovered: false,
            selected,
        }
    }

    pub fn shared(bounds: Rectangle, selected: bool) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(bounds, selected)))
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }
}

impl MouseListener for RadioButtonController {
    fn on_mouse(&mut self, input: &InputState) -> Option<Action> {
        let inside = self.bounds.contains(input.mouse());
        if inside && input.lmb_just_pressed {
            self.hovered = true;
            self.selected = true;
            return Some(Action::Activated);
        }
        match (inside, self.hovered) {
            (true, false) => {
                self.hovered = true;
                Some(Action::Hovered)
            }
            (false, true) => {
                self.hovered = false;
                Some(Action::Unhovered)
            }
            _ => None,
        }
    }
}

impl KeyListener for RadioButtonController {
    fn on_keys(&mut self, input: &InputState) -> Option<Action> {
        if self.hovered
            && (input.is_just_pressed(KEY_SELECT) || input.is_just_pressed(KEY_ACTIVATE))
        {
            self.selected = true;
            return Some(Action::Activated);
        }
        None
    }
}

pub type SharedMouseListener = Rc<RefCell<dyn MouseListener>>;
pub type SharedKeyListener = Rc<RefCell<dyn KeyListener>>;
pub type RawListener = Box<dyn FnMut(&InputState)>;

struct InputComponent {
    widget_id: String,
    mouse: SharedMouseListener,
    keys: SharedKeyListener,
}

#[derive(Default)]
pub struct InputSystem {
    state: InputState,
    components: Vec<InputComponent>,
    index: AHashMap<String, usize>,
    raw: Vec<(String, RawListener)>,
}

impl InputSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn create_input_component(
        &mut self,
        mouse: SharedMouseListener,
        keys: SharedKeyListener,
        widget_id: &str,
    ) -> Result<()> {
        if self.index.contains_key(widget_id) {
            return Err(Error::InvalidConfiguration(format!(
                "input component for '{widget_id}' already exists"
            )));
        }
        self.index
            .insert(widget_id.to_string(), self.components.len());
        self.components.push(InputComponent {
            widget_id: widget_id.to_string(),
            mouse,
            keys,
        });
        debug!("created input component '{widget_id}'");
        Ok(())
    }

    /// Unknown ids are ignored.
    pub fn destroy_input_component(&mut self, widget_id: &str) {
        let Some(pos) = self.index.remove(widget_id) else {
            return;
        };
        self.components.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        debug!("destroyed input component '{widget_id}'");
    }

    pub fn has_component(&self, widget_id: &str) -> bool {
        self.index.contains_key(widget_id)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Registers a listener that sees every frame of raw input.
    pub fn add_raw_listener(&mut self, name: &str, listener: RawListener) {
        self.raw.push((name.to_string(), listener));
    }

    pub fn remove_raw_listener(&mut self, name: &str) {
        self.raw.retain(|(n, _)| n != name);
    }

    /// Samples `frame`, broadcasts it to raw listeners, then asks every
    /// component's mouse and key listener in registration order.
    pub fn update(&mut self, frame: &InputFrame) -> Vec<(String, Action)> {
        frame.apply_to(&mut self.state);
        for (_, listener) in self.raw.iter_mut() {
            listener(&self.state);
        }
        let mut actions = Vec::new();
        for component in &self.components {
            if let Some(action) = component.mouse.borrow_mut().on_mouse(&self.state) {
                actions.push((component.widget_id.clone(), action));
            }
            if let Some(action) = component.keys.borrow_mut().on_keys(&self.state) {
                actions.push((component.widget_id.clone(), action));
            }
        }
        actions
    }
}
