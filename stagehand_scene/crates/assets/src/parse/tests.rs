use super::*;
use serde_json::json;

fn main_menu() -> Value {
    json!({
        "id": "MainMenu",
        "music": { "id": "Theme", "path": "music/theme.ogg", "persist": true, "volume": 80 },
        "fonts": [
            { "id": "Title", "path": "fonts/title.ttf", "characterSize": 48,
              "fillColor": [250, 240, 230], "outlineThickness": 2 }
        ],
        "textures": [
            { "id": "Logo", "path": "textures/atlas.png", "scale": 0.5,
              "color": [255, 200, 200, 128],
              "position": { "x": 16, "y": 0, "width": 64, "height": 32 } }
        ],
        "repeatingTextures": [
            { "inputID": "Grass", "outputID": "Field", "path": "textures/grass.png",
              "persist": true, "outputSize": { "width": 800, "height": 200 } }
        ],
        "segmentedTextures": [
            { "id": "Bar", "segments": [
                { "id": "BarLeft", "path": "textures/bar_l.png" },
                { "id": "BarMid", "path": "textures/bar_m.png" },
                { "id": "BarRight", "path": "textures/bar_r.png" }
            ] }
        ],
        "layout": {
            "background": {
                "decorations": [
                    { "id": "Sky", "textureID": "Field", "position": { "x": 50, "y": 50 } }
                ]
            },
            "foreground": {
                "title": { "id": "Heading", "fontID": "Title", "text": "Stagehand",
                           "position": { "x": 50, "y": 15 } },
                "menu": {
                    "id": "Root", "type": "SubMenu", "orientation": "Vertical",
                    "position": { "x": 50, "y": 40 },
                    "menus": [
                        { "id": "Main", "type": "Button", "orientation": "Horizontal",
                          "spacing": 10, "fontID": "Title", "position": { "x": 50, "y": 40 },
                          "textures": { "idle": "Bar", "hovered": "Bar", "pressed": "Bar" },
                          "buttons": [
                            { "id": "Play", "text": "Play",
                              "event": { "type": "SetScene", "args": ["Game", 2, 0.5, true] } },
                            { "id": "Quit", "text": "Quit", "event": { "type": "Quit" } }
                          ] },
                        { "id": "Difficulty", "type": "RadioButton", "orientation": "Vertical",
                          "fontID": "Title", "position": { "x": 80, "y": 40 },
                          "textures": { "unselected": "Logo", "selected": "Logo" },
                          "radioButtons": [
                            { "id": "Easy", "text": "Easy", "selected": true },
                            { "id": "Hard", "text": "Hard" }
                          ] }
                    ]
                }
            }
        }
    })
}

#[test]
fn scene_document_parses_into_typed_properties() {
    let scene = load_scene(&main_menu()).unwrap();
    assert_eq!(scene.id, "MainMenu");

    let music = scene.music.as_ref().unwrap();
    assert!(music.base.persist);
    assert_eq!(music.volume, 80.0);
    assert!(music.looping);

    let font = scene.font("Title").unwrap();
    assert_eq!(font.character_size, 48.0);
    assert_eq!(font.fill_color, Color::rgba(250, 240, 230, 255));
    assert_eq!(font.outline_color, Color::BLACK);
    assert_eq!(font.outline_thickness, 2.0);

    let logo = scene.texture("Logo").unwrap();
    assert_eq!(logo.input_rect, IntRect::new(16, 0, 64, 32));
    assert_eq!(logo.color, Some(Color::rgba(255, 200, 200, 128)));

    let field = scene.repeating_texture("Field").unwrap();
    assert_eq!(field.input_id(), "Grass");
    assert!(field.input.base.persist);
    assert_eq!(field.output_size, PixelSize { width: 800, height: 200 });

    assert_eq!(scene.segmented_texture("Bar").unwrap().segments.len(), 3);
    assert!(scene.border_texture.is_none());
}

#[test]
fn layout_layers_and_nested_menus() {
    let scene = load_scene(&main_menu()).unwrap();
    let background = scene.layout.layer(LayerId::Background);
    assert_eq!(background.decorations[0].texture_id, "Field");
    assert_eq!(
        background.decorations[0].widget.relative_position,
        RelativePosition::new(50, 50)
    );
    assert!(scene.layout.layer(LayerId::Overlay).is_empty());

    let fg = scene.layout.layer(LayerId::Foreground);
    assert_eq!(fg.title.as_ref().unwrap().contents, "Stagehand");
    let root = fg.menu.as_ref().unwrap();
    assert_eq!(root.menu_type, MenuType::SubMenu);
    assert_eq!(root.menus.len(), 2);

    let main = &root.menus[0];
    assert_eq!(main.widget.parent_id.as_deref(), Some("Root"));
    assert_eq!(main.widget.layer, LayerId::Foreground);
    assert_eq!(main.orientation, Orientation::Horizontal);
    assert_eq!(main.relative_spacing, 10.0);
    assert_eq!(main.buttons[1].widget.parent_id.as_deref(), Some("Main"));
    let play = main.buttons[0].event.as_ref().unwrap();
    assert_eq!(play.event_type, EventType::SetScene);
    assert_eq!(
        play.args,
        vec![
            EventArg::String("Game".into()),
            EventArg::Int(2),
            EventArg::Float(0.5),
            EventArg::Bool(true)
        ]
    );
    assert!(main.buttons[1].event.as_ref().unwrap().args.is_empty());

    let radios = &root.menus[1];
    assert!(radios.radio_buttons[0].selected);
    assert!(!radios.radio_buttons[1].selected);
    assert_eq!(radios.textures.ids(), vec!["Logo", "Logo"]);
}

#[test]
fn missing_layout_is_rejected_with_scene_id() {
    let mut doc = main_menu();
    doc.as_object_mut().unwrap().remove("layout");
    let err = load_scene(&doc).unwrap_err();
    match err {
        Error::InvalidConfiguration(msg) => {
            assert!(msg.contains("MainMenu"), "{msg}");
            assert!(msg.contains("layout"), "{msg}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn missing_required_field_names_field_and_owner() {
    let mut doc = main_menu();
    doc["layout"]["background"]["decorations"][0]
        .as_object_mut()
        .unwrap()
        .remove("textureID");
    let msg = load_scene(&doc).unwrap_err().to_string();
    assert!(msg.contains("Sky") && msg.contains("textureID"), "{msg}");
}

#[test]
fn malformed_values_fail_fast() {
    let mut doc = main_menu();
    doc["layout"]["foreground"]["title"]["position"]["x"] = json!(140);
    assert!(matches!(
        load_scene(&doc),
        Err(Error::InvalidConfiguration(_))
    ));

    let mut doc = main_menu();
    doc["layout"]["foreground"]["menu"]["menus"][0]["orientation"] = json!("Diagonal");
    let msg = load_scene(&doc).unwrap_err().to_string();
    assert!(msg.contains("Main") && msg.contains("orientation"), "{msg}");

    let mut doc = main_menu();
    doc["textures"][0]["color"] = json!([1, 2]);
    assert!(load_scene(&doc).unwrap_err().to_string().contains("Logo"));

    let mut doc = main_menu();
    doc["fonts"][0]
        .as_object_mut()
        .unwrap()
        .remove("characterSize");
    assert!(load_scene(&doc)
        .unwrap_err()
        .to_string()
        .contains("characterSize"));
}

#[test]
fn atlas_rect_past_pixel_range_is_rejected() {
    let mut doc = main_menu();
    doc["textures"][0]["position"] = json!({ "x": 4294967295u64, "y": 0, "width": 10, "height": 10 });
    match load_scene(&doc) {
        Err(Error::InvalidConfiguration(msg)) => {
            assert!(msg.contains("Logo") && msg.contains("position"), "{msg}")
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn null_color_reads_as_absent() {
    let mut doc = main_menu();
    doc["textures"][0]["color"] = Value::Null;
    let props = load_scene(&doc).unwrap();
    assert_eq!(props.texture("Logo").unwrap().color, None);
}

#[test]
fn button_menu_requires_status_textures() {
    let menu = json!({
        "id": "Main", "type": "Button", "orientation": "Horizontal", "fontID": "Title",
        "position": { "x": 0, "y": 0 }, "buttons": []
    });
    let msg = load_menu(&menu, LayerId::Overlay, None)
        .unwrap_err()
        .to_string();
    assert!(msg.contains("Main") && msg.contains("textures"), "{msg}");
}

#[test]
fn repeating_texture_needs_distinct_output() {
    let raw = json!({
        "inputID": "Grass", "outputID": "Grass", "path": "g.png",
        "outputSize": { "width": 10, "height": 10 }
    });
    assert!(matches!(
        load_repeating_texture(&raw, "S"),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn border_texture_parses_all_nine_parts() {
    let part = |id: &str| json!({ "id": id, "path": format!("border/{id}.png") });
    let raw = json!({
        "id": "Frame", "persist": true, "percentSize": { "width": 50, "height": 40 },
        "topLeft": part("TL"), "topRight": part("TR"),
        "bottomLeft": part("BL"), "bottomRight": part("BR"),
        "left": part("L"), "right": part("R"), "top": part("T"), "bottom": part("B"),
        "center": part("C")
    });
    let border = load_border_texture(&raw, "S").unwrap();
    assert!(border.persist);
    assert_eq!(border.percent_size, PercentSize { width: 50, height: 40 });
    let ids: Vec<&str> = border.parts().iter().map(|p| p.id()).collect();
    assert_eq!(ids, vec!["TL", "TR", "BL", "BR", "L", "R", "T", "B", "C"]);

    let mut missing = raw.clone();
    missing.as_object_mut().unwrap().remove("center");
    let msg = load_border_texture(&missing, "S").unwrap_err().to_string();
    assert!(msg.contains("Frame") && msg.contains("center"), "{msg}");
}

#[test]
fn scene_index_lists_documents() {
    let doc = json!({ "scenes": [
        { "id": "MainMenu", "resourceID": "MainMenuDoc", "path": "scenes/main.json" },
        { "id": "Options", "resourceID": "OptionsDoc", "path": "scenes/options.json" }
    ] });
    let index = load_scene_index(&doc).unwrap();
    assert_eq!(index.entries.len(), 2);
    assert_eq!(
        index.entry("Options").unwrap().path,
        PathBuf::from("scenes/options.json")
    );

    let dup = json!({ "scenes": [
        { "id": "A", "resourceID": "a", "path": "a.json" },
        { "id": "A", "resourceID": "b", "path": "b.json" }
    ] });
    assert!(matches!(
        load_scene_index(&dup),
        Err(Error::InvalidConfiguration(_))
    ));
}
