use crate::render::{DrawParams, Drawable, RenderSystem};
use crate::scene::Scene;
use crate::widget::{ButtonTextures, RadioTextures, Widget, WidgetData};
use log::{debug, info};
use stagehand_engine::layout::{
    anchor_centered, center_in, menu_item_bounds, right_of, RelativePosition,
};
use stagehand_engine::utils::{Rectangle, Size};
use stagehand_engine::{Error, Result};
use stagehand_scene_assets::{
    BorderTextureProperties, DecorationProperties, LayerId, MenuProperties, MenuTextures,
    MenuType, SceneProperties, TextProperties, WidgetProperties, WidgetType,
};
use stagehand_scene_core::{Event, EventArg, EventQueue, EventSystem, EventType};
use stagehand_scene_input::{Action, ButtonController, InputSystem, RadioButtonController};
use std::cell::RefCell;
use std::rc::Rc;

/// The component systems widgets register with.
#[derive(Default)]
pub struct Systems {
    pub render: RenderSystem,
    pub input: InputSystem,
    pub events: EventSystem,
}

impl Systems {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn label_id(owner_id: &str) -> String {
    format!("{owner_id}.Label")
}

// Explicit parent, or the root container of `layer`.
fn resolve_parent(scene: &Scene, widget: &WidgetProperties, layer: LayerId) -> Result<String> {
    let parent = widget
        .parent_id
        .clone()
        .unwrap_or_else(|| scene.root_container(layer));
    match scene.widgets.get(&parent) {
        Some(p) if p.is_container() => Ok(parent),
        Some(_) => Err(Error::InvalidConfiguration(format!(
            "widget '{parent}' cannot hold '{}'",
            widget.id
        ))),
        None => Err(Error::InvalidConfiguration(format!(
            "parent '{parent}' of '{}' does not exist",
            widget.id
        ))),
    }
}

fn place_texture(
    scene: &mut Scene,
    systems: &mut Systems,
    widget: &WidgetProperties,
    texture_id: &str,
) -> Result<()> {
    let parent = resolve_parent(scene, widget, widget.layer)?;
    let entry = scene.texture(texture_id)?;
    let texture = entry.resource.clone();
    let scale = entry.properties.scale();
    let bounds = anchor_centered(scene.window, widget.relative_position, texture.size() * scale);
    scene.widgets.insert(
        &parent,
        Widget::new(
            &widget.id,
            widget.widget_type,
            widget.layer,
            bounds,
            WidgetData::Decoration {
                texture_id: texture_id.to_string(),
            },
        ),
    )?;
    systems.render.create_render_component(
        widget.layer,
        &scene.id,
        &widget.id,
        Drawable::Texture(texture),
        bounds.pos(),
        DrawParams::scaled(scale),
    )
}

pub fn create_decoration(
    scene: &mut Scene,
    systems: &mut Systems,
    props: &DecorationProperties,
) -> Result<()> {
    place_texture(scene, systems, &props.widget, &props.texture_id)
}

/// The composed border fills its share of the window, centered in the
/// background layer.
pub fn create_border(
    scene: &mut Scene,
    systems: &mut Systems,
    props: &BorderTextureProperties,
) -> Result<()> {
    let mut widget = WidgetProperties::new(&props.id, WidgetType::Border, LayerId::Background);
    widget.relative_position = RelativePosition::new(50, 50);
    place_texture(scene, systems, &widget, &props.id)
}

fn insert_text(scene: &mut Scene, systems: &mut Systems, parent: &str, widget: Widget) -> Result<()> {
    let WidgetData::Text { font_id, contents } = &widget.data else {
        return Err(Error::UnexpectedValue(format!(
            "widget '{}' does not carry text",
            widget.id
        )));
    };
    let entry = scene.font(font_id)?;
    let drawable = Drawable::Text {
        font: entry.resource.clone(),
        style: entry.properties.clone(),
        contents: contents.clone(),
    };
    let (id, layer, pos) = (widget.id.clone(), widget.layer, widget.bounds.pos());
    scene.widgets.insert(parent, widget)?;
    systems.render.create_render_component(
        layer,
        &scene.id,
        &id,
        drawable,
        pos,
        DrawParams::default(),
    )
}

fn text_size(scene: &Scene, font_id: &str, contents: &str) -> Result<Size> {
    let entry = scene.font(font_id)?;
    Ok(entry
        .resource
        .measure(contents, entry.properties.pixel_size()))
}

/// Titles and headings, centered on their anchor.
pub fn create_text(scene: &mut Scene, systems: &mut Systems, props: &TextProperties) -> Result<()> {
    let parent = resolve_parent(scene, &props.widget, props.widget.layer)?;
    let size = text_size(scene, &props.font_id, &props.contents)?;
    let bounds = anchor_centered(scene.window, props.widget.relative_position, size);
    let widget = Widget::new(
        &props.widget.id,
        props.widget.widget_type,
        props.widget.layer,
        bounds,
        WidgetData::Text {
            font_id: props.font_id.clone(),
            contents: props.contents.clone(),
        },
    );
    insert_text(scene, systems, &parent, widget)
}

fn add_label(
    scene: &mut Scene,
    systems: &mut Systems,
    menu: &MenuProperties,
    owner_id: &str,
    text: &str,
    place: impl FnOnce(Size) -> Rectangle,
) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    let font_id = menu.font_id.as_deref().ok_or_else(|| {
        Error::InvalidConfiguration(format!("menu '{}' has no font for its labels", menu.widget.id))
    })?;
    let layer = menu_layer(scene, &menu.widget.id)?;
    let bounds = place(text_size(scene, font_id, text)?);
    let widget = Widget::new(
        &label_id(owner_id),
        WidgetType::Label,
        layer,
        bounds,
        WidgetData::Text {
            font_id: font_id.to_string(),
            contents: text.to_string(),
        },
    );
    insert_text(scene, systems, &menu.widget.id, widget)
}

fn menu_layer(scene: &Scene, menu_id: &str) -> Result<LayerId> {
    match scene.widgets.get(menu_id) {
        Some(w) if w.widget_type == WidgetType::Menu => Ok(w.layer),
        _ => Err(Error::InvalidConfiguration(format!(
            "menu '{menu_id}' does not exist in scene '{}'",
            scene.id
        ))),
    }
}

fn item_bounds(scene: &Scene, menu: &MenuProperties, texture_id: &str, index: usize) -> Result<Rectangle> {
    let origin = menu.widget.relative_position.resolve(scene.window);
    let size = scene.texture_size(texture_id)?;
    Ok(menu_item_bounds(
        origin,
        size,
        index,
        menu.orientation,
        menu.relative_spacing,
    ))
}

/// Creates button `index` of `menu`, which must already exist. The button
/// draws its idle texture, takes mouse and key input, and gets a centered
/// label.
pub fn create_button(
    scene: &mut Scene,
    systems: &mut Systems,
    menu: &MenuProperties,
    index: usize,
) -> Result<()> {
    let button = menu.buttons.get(index).ok_or_else(|| {
        Error::UnexpectedValue(format!("menu '{}' has no button {index}", menu.widget.id))
    })?;
    let MenuTextures::Button {
        idle,
        hovered,
        pressed,
    } = &menu.textures
    else {
        return Err(Error::InvalidConfiguration(format!(
            "menu '{}' has no button textures",
            menu.widget.id
        )));
    };
    let layer = menu_layer(scene, &menu.widget.id)?;
    let bounds = item_bounds(scene, menu, idle, index)?;
    let entry = scene.texture(idle)?;
    let (texture, scale) = (entry.resource.clone(), entry.properties.scale());

    let id = button.widget.id.as_str();
    let controller = ButtonController::shared(bounds);
    scene.widgets.insert(
        &menu.widget.id,
        Widget::new(
            id,
            WidgetType::Button,
            layer,
            bounds,
            WidgetData::Button {
                controller: controller.clone(),
                event: button.event.clone(),
                textures: ButtonTextures {
                    idle: idle.clone(),
                    hovered: hovered.clone(),
                    pressed: pressed.clone(),
                },
            },
        ),
    )?;
    systems.render.create_render_component(
        layer,
        &scene.id,
        id,
        Drawable::Texture(texture),
        bounds.pos(),
        DrawParams::scaled(scale),
    )?;
    systems
        .input
        .create_input_component(controller.clone(), controller, id)?;
    add_label(scene, systems, menu, id, &button.text, |size| {
        center_in(bounds, size)
    })
}

/// Creates radio button `index` of `menu`. The label sits to the right of
/// the control, half a control width away.
pub fn create_radio_button(
    scene: &mut Scene,
    systems: &mut Systems,
    menu: &MenuProperties,
    index: usize,
) -> Result<()> {
    let radio = menu.radio_buttons.get(index).ok_or_else(|| {
        Error::UnexpectedValue(format!(
            "menu '{}' has no radio button {index}",
            menu.widget.id
        ))
    })?;
    let MenuTextures::RadioButton {
        unselected,
        selected,
    } = &menu.textures
    else {
        return Err(Error::InvalidConfiguration(format!(
            "menu '{}' has no radio button textures",
            menu.widget.id
        )));
    };
    let textures = RadioTextures {
        unselected: unselected.clone(),
        selected: selected.clone(),
    };
    let layer = menu_layer(scene, &menu.widget.id)?;
    let bounds = item_bounds(scene, menu, unselected, index)?;
    let entry = scene.texture(textures.for_selection(radio.selected))?;
    let (texture, scale) = (entry.resource.clone(), entry.properties.scale());

    let id = radio.widget.id.as_str();
    let controller = RadioButtonController::shared(bounds, radio.selected);
    scene.widgets.insert(
        &menu.widget.id,
        Widget::new(
            id,
            WidgetType::RadioButton,
            layer,
            bounds,
            WidgetData::RadioButton {
                controller: controller.clone(),
                event: radio.event.clone(),
                textures,
                group: menu.widget.id.clone(),
            },
        ),
    )?;
    systems.render.create_render_component(
        layer,
        &scene.id,
        id,
        Drawable::Texture(texture),
        bounds.pos(),
        DrawParams::scaled(scale),
    )?;
    systems
        .input
        .create_input_component(controller.clone(), controller, id)?;
    add_label(scene, systems, menu, id, &radio.text, |size| {
        right_of(bounds, size, bounds.width * 0.5)
    })
}

// Keeps at most one radio button of the menu selected.
fn register_radio_group(scene: &Scene, systems: &mut Systems, menu: &MenuProperties) -> Result<()> {
    let members: Vec<(String, Rc<RefCell<RadioButtonController>>)> = menu
        .radio_buttons
        .iter()
        .filter_map(|r| match scene.widgets.get(&r.widget.id).map(|w| &w.data) {
            Some(WidgetData::RadioButton { controller, .. }) => {
                Some((r.widget.id.clone(), controller.clone()))
            }
            _ => None,
        })
        .collect();
    let group = menu.widget.id.clone();
    systems.events.create_event_component(
        [EventType::RadioToggled],
        Box::new(move |event: &Event, _queue: &mut EventQueue| {
            if event.arg_str(0)? != group {
                return Ok(());
            }
            let chosen = event.arg_str(1)?;
            for (id, controller) in &members {
                controller.borrow_mut().set_selected(id == chosen);
            }
            Ok(())
        }),
        &menu.widget.id,
    )
}

fn build_menu(
    scene: &mut Scene,
    systems: &mut Systems,
    props: &MenuProperties,
    layer: LayerId,
) -> Result<()> {
    let parent = resolve_parent(scene, &props.widget, layer)?;
    let origin = props.widget.relative_position.resolve(scene.window);
    scene.widgets.insert(
        &parent,
        Widget::new(
            &props.widget.id,
            WidgetType::Menu,
            layer,
            Rectangle::from_parts(origin, Size::default()),
            WidgetData::Menu {
                menu_type: props.menu_type,
                orientation: props.orientation,
            },
        ),
    )?;
    match props.menu_type {
        MenuType::SubMenu => {
            for sub in &props.menus {
                build_menu(scene, systems, sub, layer)?;
            }
        }
        MenuType::Button => {
            for index in 0..props.buttons.len() {
                create_button(scene, systems, props, index)?;
            }
        }
        MenuType::RadioButton => {
            for index in 0..props.radio_buttons.len() {
                create_radio_button(scene, systems, props, index)?;
            }
            register_radio_group(scene, systems, props)?;
        }
    }

    let bounds = scene
        .widgets
        .child_ids(&props.widget.id)
        .iter()
        .filter_map(|id| scene.widgets.get(id).map(|w| w.bounds))
        .reduce(union);
    if let (Some(bounds), Some(menu)) = (bounds, scene.widgets.get_mut(&props.widget.id)) {
        menu.bounds = bounds;
    }
    debug!("built menu '{}' on {layer}", props.widget.id);
    Ok(())
}

fn union(a: Rectangle, b: Rectangle) -> Rectangle {
    let x = a.x.min(b.x);
    let y = a.y.min(b.y);
    let right = (a.x + a.width).max(b.x + b.width);
    let bottom = (a.y + a.height).max(b.y + b.height);
    Rectangle::new(x, y, right - x, bottom - y)
}

/// Builds a menu and all of its items. Nested menus are placed on the layer
/// of the outermost menu.
pub fn create_menu(scene: &mut Scene, systems: &mut Systems, props: &MenuProperties) -> Result<()> {
    build_menu(scene, systems, props, props.widget.layer)
}

/// Unregisters a widget and its descendants from every system, then drops
/// them from the tree. Unknown ids are ignored.
pub fn destroy_widget(scene: &mut Scene, systems: &mut Systems, widget_id: &str) {
    for child in scene.widgets.child_ids(widget_id) {
        destroy_widget(scene, systems, &child);
    }
    systems.render.destroy_render_component(&scene.id, widget_id);
    systems.input.destroy_input_component(widget_id);
    systems.events.destroy_event_component(widget_id);
    scene.widgets.remove(widget_id);

    let label = label_id(widget_id);
    if scene.widgets.contains(&label) {
        destroy_widget(scene, systems, &label);
    }
}

/// Tears down a menu depth first. Unknown ids are ignored; ids naming
/// something other than a menu are rejected.
pub fn destroy_menu(scene: &mut Scene, systems: &mut Systems, menu_id: &str) -> Result<()> {
    match scene.widgets.get(menu_id) {
        None => return Ok(()),
        Some(w) if w.widget_type != WidgetType::Menu => {
            return Err(Error::InvalidConfiguration(format!(
                "'{menu_id}' is a {:?}, not a menu",
                w.widget_type
            )));
        }
        Some(_) => {}
    }
    destroy_widget(scene, systems, menu_id);
    debug!("destroyed menu '{menu_id}'");
    Ok(())
}

/// Instantiates the layout layer by layer: the border first, then
/// decorations, title, headings and menu.
pub fn create_scene_widgets(
    scene: &mut Scene,
    systems: &mut Systems,
    props: &SceneProperties,
) -> Result<()> {
    if let Some(border) = &props.border_texture {
        create_border(scene, systems, border)?;
    }
    for layer in LayerId::ALL {
        let layout = props.layout.layer(layer);
        for decoration in &layout.decorations {
            create_decoration(scene, systems, decoration)?;
        }
        if let Some(title) = &layout.title {
            create_text(scene, systems, title)?;
        }
        for heading in &layout.headings {
            create_text(scene, systems, heading)?;
        }
        if let Some(menu) = &layout.menu {
            create_menu(scene, systems, menu)?;
        }
    }
    info!(
        "scene '{}' built {} widgets",
        scene.id,
        scene.widgets.len()
    );
    Ok(())
}

pub fn destroy_scene_widgets(scene: &mut Scene, systems: &mut Systems) -> Result<()> {
    for layer in LayerId::ALL {
        let root = scene.root_container(layer);
        for child in scene.widgets.child_ids(&root) {
            let is_menu = scene
                .widgets
                .get(&child)
                .is_some_and(|w| w.widget_type == WidgetType::Menu);
            if is_menu {
                destroy_menu(scene, systems, &child)?;
            } else {
                destroy_widget(scene, systems, &child);
            }
        }
    }
    Ok(())
}

/// Turns a widget activation into the events it fires. Radio buttons also
/// announce themselves to their group.
pub fn apply_action(scene: &Scene, systems: &mut Systems, widget_id: &str, action: Action) {
    if action != Action::Activated {
        return;
    }
    let Some(widget) = scene.widgets.get(widget_id) else {
        return;
    };
    let event = match &widget.data {
        WidgetData::Button { event, .. } => event,
        WidgetData::RadioButton { event, group, .. } => {
            systems.events.enqueue(Event::new(
                EventType::RadioToggled,
                vec![
                    EventArg::String(group.clone()),
                    EventArg::String(widget_id.to_string()),
                ],
            ));
            event
        }
        _ => return,
    };
    info!("'{widget_id}' activated");
    if let Some(event) = event {
        systems
            .events
            .enqueue(Event::new(event.event_type.clone(), event.args.clone()));
    }
}

/// Points every button and radio button at the texture of its current state.
pub fn refresh_textures(scene: &Scene, systems: &mut Systems) -> Result<()> {
    for widget in scene.widgets.iter() {
        let texture_id = match &widget.data {
            WidgetData::Button {
                controller,
                textures,
                ..
            } => textures.for_status(controller.borrow().status()),
            WidgetData::RadioButton {
                controller,
                textures,
                ..
            } => textures.for_selection(controller.borrow().is_selected()),
            _ => continue,
        };
        let texture = scene.texture(texture_id)?.resource.clone();
        systems.render.set_texture(&scene.id, &widget.id, texture)?;
    }
    Ok(())
}
