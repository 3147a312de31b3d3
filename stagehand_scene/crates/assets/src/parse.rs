//! Turns scene documents into property records. Every required field that is
//! missing or malformed fails with `InvalidConfiguration` naming the field and
//! the id of the entity that contains it; nothing is parsed best-effort.

use crate::handle::ResourceType;
use crate::properties::{
    BorderTextureProperties, FontProperties, LayoutProperties, MusicProperties, PercentSize,
    PixelSize, RepeatingTextureProperties, ResourceProperties, SceneProperties,
    SegmentedTextureProperties, TextureProperties,
};
use crate::widgets::{
    ButtonProperties, DecorationProperties, EventProperties, LayerId, LayoutLayerProperties,
    MenuProperties, MenuTextures, MenuType, RadioButtonProperties, TextProperties, WidgetProperties,
    WidgetType,
};
use serde_json::{Map, Value};
use stagehand_engine::layout::{Orientation, RelativePosition};
use stagehand_engine::utils::{Color, IntRect};
use stagehand_engine::{Error, Result};
use stagehand_scene_core::{EventArg, EventType};
use std::path::PathBuf;

type Object = Map<String, Value>;

fn invalid(msg: String) -> Error {
    Error::InvalidConfiguration(msg)
}

fn as_object<'a>(value: &'a Value, owner: &str) -> Result<&'a Object> {
    value
        .as_object()
        .ok_or_else(|| invalid(format!("{owner} must be an object")))
}

fn required<'a>(obj: &'a Object, field: &str, owner: &str) -> Result<&'a Value> {
    obj.get(field)
        .ok_or_else(|| invalid(format!("'{owner}' is missing required field '{field}'")))
}

fn get_str(obj: &Object, field: &str, owner: &str) -> Result<String> {
    required(obj, field, owner)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(format!("field '{field}' of '{owner}' must be a string")))
}

fn opt_str(obj: &Object, field: &str, owner: &str) -> Result<Option<String>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| invalid(format!("field '{field}' of '{owner}' must be a string"))),
    }
}

fn opt_f32(obj: &Object, field: &str, owner: &str, default: f32) -> Result<f32> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => v
            .as_f64()
            .map(|n| n as f32)
            .ok_or_else(|| invalid(format!("field '{field}' of '{owner}' must be a number"))),
    }
}

fn opt_bool(obj: &Object, field: &str, owner: &str, default: bool) -> Result<bool> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => v
            .as_bool()
            .ok_or_else(|| invalid(format!("field '{field}' of '{owner}' must be a boolean"))),
    }
}

fn opt_array<'a>(obj: &'a Object, field: &str, owner: &str) -> Result<&'a [Value]> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(invalid(format!(
            "field '{field}' of '{owner}' must be an array"
        ))),
    }
}

fn percent(v: &Value, field: &str, owner: &str) -> Result<u8> {
    v.as_u64()
        .filter(|n| *n <= 100)
        .map(|n| n as u8)
        .ok_or_else(|| {
            invalid(format!(
                "field '{field}' of '{owner}' must be an integer percentage in 0..=100"
            ))
        })
}

pub fn extract_widget_id(obj: &Object, owner: &str) -> Result<String> {
    get_str(obj, "id", owner)
}

/// `"position": {"x": 0..=100, "y": 0..=100}`, required.
pub fn extract_relative_position(obj: &Object, owner: &str) -> Result<RelativePosition> {
    let pos = as_object(required(obj, "position", owner)?, &format!("position of '{owner}'"))?;
    let x = percent(required(pos, "x", owner)?, "position.x", owner)?;
    let y = percent(required(pos, "y", owner)?, "position.y", owner)?;
    Ok(RelativePosition::new(x, y))
}

pub fn extract_texture_id(obj: &Object, owner: &str) -> Result<String> {
    get_str(obj, "textureID", owner)
}

pub fn extract_font_id(obj: &Object, owner: &str) -> Result<String> {
    get_str(obj, "fontID", owner)
}

pub fn extract_orientation(obj: &Object, owner: &str) -> Result<Orientation> {
    let raw = required(obj, "orientation", owner)?;
    serde_json::from_value(raw.clone()).map_err(|_| {
        invalid(format!(
            "field 'orientation' of '{owner}' must be \"Horizontal\" or \"Vertical\""
        ))
    })
}

pub fn extract_menu_type(obj: &Object, owner: &str) -> Result<MenuType> {
    match get_str(obj, "type", owner)?.as_str() {
        "Button" => Ok(MenuType::Button),
        "RadioButton" => Ok(MenuType::RadioButton),
        "SubMenu" => Ok(MenuType::SubMenu),
        other => Err(invalid(format!(
            "menu '{owner}' has unknown type '{other}'"
        ))),
    }
}

/// `[r, g, b]` or `[r, g, b, a]` with 0..=255 channels. Absent or null means `None`.
pub fn extract_color(obj: &Object, field: &str, owner: &str) -> Result<Option<Color>> {
    let raw = match obj.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(raw) => raw,
    };
    let bad = || {
        invalid(format!(
            "field '{field}' of '{owner}' must be an array of 3 or 4 integers in 0..=255"
        ))
    };
    let items = raw.as_array().ok_or_else(bad)?;
    if items.len() != 3 && items.len() != 4 {
        return Err(bad());
    }
    let mut channels = [255u8; 4];
    for (slot, item) in channels.iter_mut().zip(items) {
        *slot = item
            .as_u64()
            .filter(|c| *c <= 255)
            .map(|c| c as u8)
            .ok_or_else(bad)?;
    }
    Ok(Some(Color::from(channels)))
}

/// Optional `{x, y, width, height}` pixel rectangle, zero when absent.
pub fn extract_rect(obj: &Object, field: &str, owner: &str) -> Result<IntRect> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(IntRect::default()),
        Some(v) => {
            let rect: IntRect = serde_json::from_value(v.clone()).map_err(|e| {
                invalid(format!(
                    "field '{field}' of '{owner}' must be {{x, y, width, height}}: {e}"
                ))
            })?;
            if !rect.fits() {
                return Err(invalid(format!(
                    "field '{field}' of '{owner}' extends past the pixel range"
                )));
            }
            Ok(rect)
        }
    }
}

/// Required `{width, height}` in pixels, both non-zero.
pub fn extract_size(obj: &Object, field: &str, owner: &str) -> Result<PixelSize> {
    let raw = required(obj, field, owner)?;
    let size: PixelSize = serde_json::from_value(raw.clone()).map_err(|e| {
        invalid(format!(
            "field '{field}' of '{owner}' must be {{width, height}}: {e}"
        ))
    })?;
    if size.width == 0 || size.height == 0 {
        return Err(invalid(format!("field '{field}' of '{owner}' must be non-zero")));
    }
    Ok(size)
}

pub fn extract_percent_size(obj: &Object, owner: &str) -> Result<PercentSize> {
    let raw = as_object(
        required(obj, "percentSize", owner)?,
        &format!("percentSize of '{owner}'"),
    )?;
    let width = percent(required(raw, "width", owner)?, "percentSize.width", owner)?;
    let height = percent(required(raw, "height", owner)?, "percentSize.height", owner)?;
    if width == 0 || height == 0 {
        return Err(invalid(format!(
            "field 'percentSize' of '{owner}' must be in 1..=100"
        )));
    }
    Ok(PercentSize { width, height })
}

fn extract_arg(v: &Value, owner: &str) -> Result<EventArg> {
    match v {
        Value::String(s) => Ok(EventArg::String(s.clone())),
        Value::Bool(b) => Ok(EventArg::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(EventArg::Int(i)),
            None => n
                .as_f64()
                .map(EventArg::Float)
                .ok_or_else(|| invalid(format!("event argument of '{owner}' is out of range"))),
        },
        other => Err(invalid(format!(
            "event argument of '{owner}' must be a string, number or boolean, found {other}"
        ))),
    }
}

/// Optional `"event": {"type": name, "args": [...]}`.
pub fn extract_event(obj: &Object, owner: &str) -> Result<Option<EventProperties>> {
    let Some(raw) = obj.get("event") else {
        return Ok(None);
    };
    let event = as_object(raw, &format!("event of '{owner}'"))?;
    let event_type = EventType::from_name(&get_str(event, "type", owner)?);
    let args = opt_array(event, "args", owner)?
        .iter()
        .map(|a| extract_arg(a, owner))
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(EventProperties { event_type, args }))
}

fn extract_base(obj: &Object, ty: ResourceType, owner: &str) -> Result<ResourceProperties> {
    let id = get_str(obj, "id", owner)?;
    let path = PathBuf::from(get_str(obj, "path", &id)?);
    let persist = opt_bool(obj, "persist", &id, false)?;
    Ok(ResourceProperties {
        id,
        resource_type: ty,
        path,
        persist,
    })
}

pub fn load_font(value: &Value, scene_id: &str) -> Result<FontProperties> {
    let owner = format!("font in scene '{scene_id}'");
    let obj = as_object(value, &owner)?;
    let base = extract_base(obj, ResourceType::Font, &owner)?;
    let id = base.id.clone();
    let character_size = match obj.get("characterSize").and_then(Value::as_f64) {
        Some(size) if size > 0.0 => size as f32,
        _ => {
            return Err(invalid(format!(
                "'{id}' is missing required field 'characterSize' (positive number)"
            )))
        }
    };
    Ok(FontProperties {
        base,
        scale: opt_f32(obj, "scale", &id, 1.0)?,
        character_size,
        fill_color: extract_color(obj, "fillColor", &id)?.unwrap_or(Color::WHITE),
        outline_color: extract_color(obj, "outlineColor", &id)?.unwrap_or(Color::BLACK),
        outline_thickness: opt_f32(obj, "outlineThickness", &id, 0.0)?,
    })
}

fn texture_fields(obj: &Object, base: ResourceProperties) -> Result<TextureProperties> {
    let id = base.id.clone();
    Ok(TextureProperties {
        base,
        scale: opt_f32(obj, "scale", &id, 1.0)?,
        color: extract_color(obj, "color", &id)?,
        input_rect: extract_rect(obj, "position", &id)?,
    })
}

pub fn load_texture(value: &Value, owner: &str) -> Result<TextureProperties> {
    let obj = as_object(value, owner)?;
    let base = extract_base(obj, ResourceType::Texture, owner)?;
    texture_fields(obj, base)
}

pub fn load_repeating_texture(value: &Value, scene_id: &str) -> Result<RepeatingTextureProperties> {
    let owner = format!("repeating texture in scene '{scene_id}'");
    let obj = as_object(value, &owner)?;
    let input_id = get_str(obj, "inputID", &owner)?;
    let output_id = get_str(obj, "outputID", &input_id)?;
    if output_id == input_id {
        return Err(invalid(format!(
            "repeating texture '{input_id}' must use a distinct outputID"
        )));
    }
    let base = ResourceProperties {
        path: PathBuf::from(get_str(obj, "path", &output_id)?),
        persist: opt_bool(obj, "persist", &output_id, false)?,
        ..ResourceProperties::new(&input_id, ResourceType::Texture, PathBuf::new())
    };
    Ok(RepeatingTextureProperties {
        input: texture_fields(obj, base)?,
        output_size: extract_size(obj, "outputSize", &output_id)?,
        output_id,
    })
}

pub fn load_segmented_texture(value: &Value, scene_id: &str) -> Result<SegmentedTextureProperties> {
    let owner = format!("segmented texture in scene '{scene_id}'");
    let obj = as_object(value, &owner)?;
    let id = get_str(obj, "id", &owner)?;
    let segments = opt_array(obj, "segments", &id)?
        .iter()
        .map(|s| load_texture(s, &format!("segment of '{id}'")))
        .collect::<Result<Vec<_>>>()?;
    if segments.is_empty() {
        return Err(invalid(format!(
            "segmented texture '{id}' needs at least one entry in 'segments'"
        )));
    }
    Ok(SegmentedTextureProperties {
        persist: opt_bool(obj, "persist", &id, false)?,
        scale: opt_f32(obj, "scale", &id, 1.0)?,
        segments,
        id,
    })
}

pub fn load_border_texture(value: &Value, scene_id: &str) -> Result<BorderTextureProperties> {
    let owner = format!("border texture in scene '{scene_id}'");
    let obj = as_object(value, &owner)?;
    let id = get_str(obj, "id", &owner)?;
    let part = |field: &str| -> Result<TextureProperties> {
        load_texture(required(obj, field, &id)?, &format!("{field} of '{id}'"))
    };
    Ok(BorderTextureProperties {
        persist: opt_bool(obj, "persist", &id, false)?,
        scale: opt_f32(obj, "scale", &id, 1.0)?,
        percent_size: extract_percent_size(obj, &id)?,
        top_left: part("topLeft")?,
        top_right: part("topRight")?,
        bottom_left: part("bottomLeft")?,
        bottom_right: part("bottomRight")?,
        left: part("left")?,
        right: part("right")?,
        top: part("top")?,
        bottom: part("bottom")?,
        center: part("center")?,
        id,
    })
}

pub fn load_music(value: &Value, scene_id: &str) -> Result<MusicProperties> {
    let owner = format!("music in scene '{scene_id}'");
    let obj = as_object(value, &owner)?;
    let base = extract_base(obj, ResourceType::Music, &owner)?;
    let id = base.id.clone();
    Ok(MusicProperties {
        base,
        volume: opt_f32(obj, "volume", &id, 100.0)?.clamp(0.0, 100.0),
        looping: opt_bool(obj, "loop", &id, true)?,
    })
}

fn widget(
    obj: &Object,
    widget_type: WidgetType,
    layer: LayerId,
    parent_id: Option<&str>,
    owner: &str,
    positioned: bool,
) -> Result<WidgetProperties> {
    let id = extract_widget_id(obj, owner)?;
    let relative_position = if positioned {
        extract_relative_position(obj, &id)?
    } else {
        RelativePosition::default()
    };
    Ok(WidgetProperties {
        parent_id: parent_id.map(str::to_string),
        layer,
        relative_position,
        widget_type,
        id,
    })
}

pub fn load_decoration(value: &Value, layer: LayerId) -> Result<DecorationProperties> {
    let owner = format!("decoration in layer {layer}");
    let obj = as_object(value, &owner)?;
    let widget = widget(obj, WidgetType::Decoration, layer, None, &owner, true)?;
    Ok(DecorationProperties {
        texture_id: extract_texture_id(obj, &widget.id)?,
        widget,
    })
}

/// Titles and headings.
pub fn load_text(value: &Value, layer: LayerId) -> Result<TextProperties> {
    let owner = format!("text in layer {layer}");
    let obj = as_object(value, &owner)?;
    let widget = widget(obj, WidgetType::Text, layer, None, &owner, true)?;
    Ok(TextProperties {
        font_id: extract_font_id(obj, &widget.id)?,
        contents: get_str(obj, "text", &widget.id)?,
        widget,
    })
}

pub fn load_button(value: &Value, layer: LayerId, menu_id: &str) -> Result<ButtonProperties> {
    let owner = format!("button of menu '{menu_id}'");
    let obj = as_object(value, &owner)?;
    let widget = widget(obj, WidgetType::Button, layer, Some(menu_id), &owner, false)?;
    Ok(ButtonProperties {
        text: get_str(obj, "text", &widget.id)?,
        event: extract_event(obj, &widget.id)?,
        widget,
    })
}

pub fn load_radio_button(
    value: &Value,
    layer: LayerId,
    menu_id: &str,
) -> Result<RadioButtonProperties> {
    let owner = format!("radio button of menu '{menu_id}'");
    let obj = as_object(value, &owner)?;
    let widget = widget(obj, WidgetType::RadioButton, layer, Some(menu_id), &owner, false)?;
    Ok(RadioButtonProperties {
        text: get_str(obj, "text", &widget.id)?,
        selected: opt_bool(obj, "selected", &widget.id, false)?,
        event: extract_event(obj, &widget.id)?,
        widget,
    })
}

fn extract_menu_textures(obj: &Object, menu_type: MenuType, id: &str) -> Result<MenuTextures> {
    if menu_type == MenuType::SubMenu {
        return Ok(MenuTextures::None);
    }
    let raw = as_object(required(obj, "textures", id)?, &format!("textures of '{id}'"))?;
    let owner = format!("textures of '{id}'");
    Ok(match menu_type {
        MenuType::Button => MenuTextures::Button {
            idle: get_str(raw, "idle", &owner)?,
            hovered: get_str(raw, "hovered", &owner)?,
            pressed: get_str(raw, "pressed", &owner)?,
        },
        _ => MenuTextures::RadioButton {
            unselected: get_str(raw, "unselected", &owner)?,
            selected: get_str(raw, "selected", &owner)?,
        },
    })
}

/// Loads a menu and, for `SubMenu` menus, every nested menu beneath it.
/// Nested menus inherit `layer` and are parented to the enclosing menu.
pub fn load_menu(value: &Value, layer: LayerId, parent_id: Option<&str>) -> Result<MenuProperties> {
    let owner = format!("menu in layer {layer}");
    let obj = as_object(value, &owner)?;
    let widget = widget(obj, WidgetType::Menu, layer, parent_id, &owner, true)?;
    let id = widget.id.clone();
    let menu_type = extract_menu_type(obj, &id)?;
    let font_id = match menu_type {
        MenuType::SubMenu => opt_str(obj, "fontID", &id)?,
        _ => Some(extract_font_id(obj, &id)?),
    };

    let mut menu = MenuProperties {
        orientation: extract_orientation(obj, &id)?,
        relative_spacing: opt_f32(obj, "spacing", &id, 0.0)?,
        textures: extract_menu_textures(obj, menu_type, &id)?,
        font_id,
        menu_type,
        buttons: Vec::new(),
        radio_buttons: Vec::new(),
        menus: Vec::new(),
        widget,
    };
    match menu_type {
        MenuType::Button => {
            menu.buttons = opt_array(obj, "buttons", &id)?
                .iter()
                .map(|b| load_button(b, layer, &id))
                .collect::<Result<_>>()?;
        }
        MenuType::RadioButton => {
            menu.radio_buttons = opt_array(obj, "radioButtons", &id)?
                .iter()
                .map(|r| load_radio_button(r, layer, &id))
                .collect::<Result<_>>()?;
        }
        MenuType::SubMenu => {
            menu.menus = opt_array(obj, "menus", &id)?
                .iter()
                .map(|m| load_menu(m, layer, Some(&id)))
                .collect::<Result<_>>()?;
        }
    }
    Ok(menu)
}

pub fn load_layout_layer(value: &Value, layer: LayerId) -> Result<LayoutLayerProperties> {
    let owner = format!("layer {layer}");
    let obj = as_object(value, &owner)?;
    let decorations = opt_array(obj, "decorations", &owner)?
        .iter()
        .map(|d| load_decoration(d, layer))
        .collect::<Result<Vec<_>>>()?;
    let title = match obj.get("title") {
        None | Some(Value::Null) => None,
        Some(t) => Some(load_text(t, layer)?),
    };
    let headings = opt_array(obj, "headings", &owner)?
        .iter()
        .map(|h| load_text(h, layer))
        .collect::<Result<Vec<_>>>()?;
    let menu = match obj.get("menu") {
        None | Some(Value::Null) => None,
        Some(m) => Some(load_menu(m, layer, None)?),
    };
    Ok(LayoutLayerProperties {
        decorations,
        title,
        headings,
        menu,
    })
}

/// `"layout"` is required; absent layer keys are empty layers.
pub fn load_layout(obj: &Object, scene_id: &str) -> Result<LayoutProperties> {
    let layout = as_object(
        required(obj, "layout", &format!("scene {scene_id}"))?,
        &format!("layout of scene '{scene_id}'"),
    )?;
    let mut props = LayoutProperties::default();
    for layer in LayerId::ALL {
        if let Some(v) = layout.get(layer.key()) {
            props.layers[layer.index()] = load_layout_layer(v, layer)?;
        }
    }
    Ok(props)
}

pub fn load_scene(doc: &Value) -> Result<SceneProperties> {
    let obj = as_object(doc, "scene document")?;
    let id = get_str(obj, "id", "scene document")?;
    let music = match obj.get("music") {
        None | Some(Value::Null) => None,
        Some(m) => Some(load_music(m, &id)?),
    };
    let fonts = opt_array(obj, "fonts", &id)?
        .iter()
        .map(|f| load_font(f, &id))
        .collect::<Result<Vec<_>>>()?;
    let textures = opt_array(obj, "textures", &id)?
        .iter()
        .map(|t| load_texture(t, &format!("texture in scene '{id}'")))
        .collect::<Result<Vec<_>>>()?;
    let repeating_textures = opt_array(obj, "repeatingTextures", &id)?
        .iter()
        .map(|r| load_repeating_texture(r, &id))
        .collect::<Result<Vec<_>>>()?;
    let segmented_textures = opt_array(obj, "segmentedTextures", &id)?
        .iter()
        .map(|s| load_segmented_texture(s, &id))
        .collect::<Result<Vec<_>>>()?;
    let border_texture = match obj.get("borderTexture") {
        None | Some(Value::Null) => None,
        Some(b) => Some(load_border_texture(b, &id)?),
    };
    let layout = load_layout(obj, &id)?;
    Ok(SceneProperties {
        id,
        music,
        fonts,
        textures,
        repeating_textures,
        segmented_textures,
        border_texture,
        layout,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneIndexEntry {
    pub id: String,
    pub resource_id: String,
    pub path: PathBuf,
}

/// Scene id to the document that declares it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneIndex {
    pub entries: Vec<SceneIndexEntry>,
}

impl SceneIndex {
    pub fn entry(&self, scene_id: &str) -> Option<&SceneIndexEntry> {
        self.entries.iter().find(|e| e.id == scene_id)
    }
}

pub fn load_scene_index(doc: &Value) -> Result<SceneIndex> {
    let obj = as_object(doc, "scene index")?;
    let scenes = required(obj, "scenes", "scene index")?
        .as_array()
        .ok_or_else(|| invalid("field 'scenes' of 'scene index' must be an array".into()))?;
    let mut index = SceneIndex::default();
    for raw in scenes {
        let entry = as_object(raw, "scene index entry")?;
        let id = get_str(entry, "id", "scene index entry")?;
        if index.entry(&id).is_some() {
            return Err(invalid(format!("scene '{id}' is listed twice in the index")));
        }
        index.entries.push(SceneIndexEntry {
            resource_id: get_str(entry, "resourceID", &id)?,
            path: PathBuf::from(get_str(entry, "path", &id)?),
            id,
        });
    }
    Ok(index)
}

#[cfg(test)]
mod tests;
