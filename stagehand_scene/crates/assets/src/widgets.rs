use stagehand_engine::layout::{Orientation, RelativePosition};
use stagehand_scene_core::{EventArg, EventType};
use std::fmt;

pub const NUM_LAYERS: usize = 3;

/// Paint-order bucket. Lower layers are drawn first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerId {
    Background,
    Foreground,
    Overlay,
}

impl LayerId {
    pub const ALL: [LayerId; NUM_LAYERS] = [
        LayerId::Background,
        LayerId::Foreground,
        LayerId::Overlay,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Key of this layer in scene documents.
    pub fn key(self) -> &'static str {
        match self {
            LayerId::Background => "background",
            LayerId::Foreground => "foreground",
            LayerId::Overlay => "overlay",
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetType {
    Border,
    Menu,
    MenuItem,
    Button,
    Label,
    Text,
    Decoration,
    RadioButton,
    RootContainer,
    Scene,
}

impl WidgetType {
    pub fn is_container(self) -> bool {
        matches!(
            self,
            WidgetType::Scene | WidgetType::RootContainer | WidgetType::Menu
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetProperties {
    pub id: String,
    pub widget_type: WidgetType,
    // None means the root container of `layer`.
    pub parent_id: Option<String>,
    pub layer: LayerId,
    pub relative_position: RelativePosition,
}

impl WidgetProperties {
    pub fn new(id: &str, widget_type: WidgetType, layer: LayerId) -> Self {
        Self {
            id: id.to_string(),
            widget_type,
            parent_id: None,
            layer,
            relative_position: RelativePosition::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventProperties {
    pub event_type: EventType,
    pub args: Vec<EventArg>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecorationProperties {
    pub widget: WidgetProperties,
    pub texture_id: String,
}

/// Titles, headings and item labels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextProperties {
    pub widget: WidgetProperties,
    pub font_id: String,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonProperties {
    pub widget: WidgetProperties,
    pub text: String,
    pub event: Option<EventProperties>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadioButtonProperties {
    pub widget: WidgetProperties,
    pub text: String,
    pub selected: bool,
    pub event: Option<EventProperties>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuType {
    Button,
    RadioButton,
    SubMenu,
}

/// Texture id per control status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuTextures {
    None,
    Button {
        idle: String,
        hovered: String,
        pressed: String,
    },
    RadioButton {
        unselected: String,
        selected: String,
    },
}

impl MenuTextures {
    pub fn ids(&self) -> Vec<&str> {
        match self {
            MenuTextures::None => Vec::new(),
            MenuTextures::Button {
                idle,
                hovered,
                pressed,
            } => vec![idle.as_str(), hovered.as_str(), pressed.as_str()],
            MenuTextures::RadioButton {
                unselected,
                selected,
            } => vec![unselected.as_str(), selected.as_str()],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuProperties {
    pub widget: WidgetProperties,
    pub menu_type: MenuType,
    pub orientation: Orientation,
    // Percent of the item extent along the flow axis.
    pub relative_spacing: f32,
    pub font_id: Option<String>,
    pub textures: MenuTextures,
    pub buttons: Vec<ButtonProperties>,
    pub radio_buttons: Vec<RadioButtonProperties>,
    pub menus: Vec<MenuProperties>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutLayerProperties {
    pub decorations: Vec<DecorationProperties>,
    pub title: Option<TextProperties>,
    pub headings: Vec<TextProperties>,
    pub menu: Option<MenuProperties>,
}

impl LayoutLayerProperties {
    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
            && self.title.is_none()
            && self.headings.is_empty()
            && self.menu.is_none()
    }
}
