use image::{Rgba, RgbaImage};
use serde_json::json;
use stagehand_engine::utils::Color;
use stagehand_scene_assets::{load_config, ResourceType};
use stagehand_scene_ui::SceneManager;
use std::fs;
use std::path::PathBuf;

fn workspace(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stagehand_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(dir.join("scenes")).unwrap();
    fs::create_dir_all(dir.join("textures")).unwrap();
    dir
}

fn write_png(path: PathBuf, w: u32, h: u32, color: [u8; 4]) {
    RgbaImage::from_pixel(w, h, Rgba(color)).save(path).unwrap();
}

#[test]
fn config_index_and_scene_load_from_disk() {
    let root = workspace("disk");
    write_png(root.join("textures/sky.png"), 8, 8, [0, 0, 255, 255]);
    write_png(root.join("textures/tile.png"), 4, 4, [0, 255, 0, 255]);
    fs::write(
        root.join("scenes/index.json"),
        json!({ "scenes": [
            { "id": "Title", "resourceID": "TitleDocument", "path": "scenes/title.json" }
        ] })
        .to_string(),
    )
    .unwrap();
    fs::write(
        root.join("scenes/title.json"),
        json!({
            "id": "Title",
            "textures": [ { "id": "Sky", "path": "textures/sky.png", "scale": 2.0 } ],
            "repeatingTextures": [
                { "inputID": "Tile", "outputID": "Floor", "path": "textures/tile.png",
                  "outputSize": { "width": 100, "height": 10 } }
            ],
            "layout": {
                "background": { "decorations": [
                    { "id": "Floor", "textureID": "Floor", "position": { "x": 50, "y": 95 } }
                ] },
                "foreground": { "decorations": [
                    { "id": "Sky", "textureID": "Sky", "position": { "x": 50, "y": 50 } }
                ] }
            }
        })
        .to_string(),
    )
    .unwrap();
    let config_path = root.join("stagehand.toml");
    fs::write(
        &config_path,
        format!(
            "[window]\nwidth = 100\nheight = 100\n\n[resources]\nroot = {:?}\nindex = \"scenes/index.json\"\ninitial_scene = \"Title\"\n",
            root.display().to_string()
        ),
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    let mut manager = SceneManager::from_config(config).unwrap();
    manager.start().unwrap();
    assert_eq!(manager.current_scene_id(), Some("Title"));
    assert!(manager
        .registry()
        .has_handle("TitleDocument", ResourceType::Document));

    let frame = manager.rasterize().unwrap();
    assert_eq!(frame.dimensions(), (100, 100));
    // sky is 8x8 drawn at scale 2, centered
    assert_eq!(frame.pixel(50, 50), Some(Color::rgba(0, 0, 255, 255)));
    assert_eq!(frame.pixel(41, 41), Some(Color::TRANSPARENT));
    // tiled floor spans the bottom tenth
    assert_eq!(frame.pixel(3, 95), Some(Color::rgba(0, 255, 0, 255)));
    assert_eq!(frame.pixel(97, 99), Some(Color::rgba(0, 255, 0, 255)));

    manager.destroy_current_scene().unwrap();
    assert!(!manager.registry().has_handle("Floor", ResourceType::Texture));
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn missing_texture_file_fails_the_scene() {
    let root = workspace("missing");
    fs::write(
        root.join("index.json"),
        json!({ "scenes": [ { "id": "A", "resourceID": "ADoc", "path": "a.json" } ] }).to_string(),
    )
    .unwrap();
    fs::write(
        root.join("a.json"),
        json!({
            "id": "A",
            "textures": [ { "id": "Ghost", "path": "textures/ghost.png" } ],
            "layout": {}
        })
        .to_string(),
    )
    .unwrap();
    let config = stagehand_scene_assets::EngineConfig::from_toml_str(&format!(
        "[resources]\nroot = {:?}\n",
        root.display().to_string()
    ))
    .unwrap();
    let mut manager = SceneManager::from_config(config).unwrap();
    manager.load_index().unwrap();
    let err = manager.set_current_scene("A").unwrap_err();
    assert!(matches!(err, stagehand_engine::Error::InvalidPath(_)), "{err:?}");
    let handle = manager.registry().handle("Ghost").unwrap();
    assert_eq!(handle.status, stagehand_scene_assets::ResourceStatus::Error);
    let _ = fs::remove_dir_all(&root);
}
