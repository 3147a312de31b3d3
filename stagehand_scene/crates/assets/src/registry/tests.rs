use super::*;
use crate::properties::TextureProperties;
use crate::source::{MemoryLoader, SharedBuffer};

fn registry() -> ResourceRegistry {
    let loader = MemoryLoader::new()
        .with_texture("tile.png", Texture::solid(32, 48, Color::WHITE))
        .with_texture("red.png", Texture::solid(4, 4, Color::rgba(255, 0, 0, 255)))
        .with_font("title.ttf", Font::fixed(0.5, 1.2))
        .with_document("scene.json", r#"{"id": "A"}"#)
        .with_audio("click.wav", AudioClip { bytes: vec![7; 3] })
        .with_log("engine.log", SharedBuffer::default());
    ResourceRegistry::new(Box::new(loader))
}

#[test]
fn create_handle_twice_fails_until_destroyed() {
    let mut reg = registry();
    reg.create_handle("Title", ResourceType::Font, "title.ttf")
        .unwrap();
    let err = reg
        .create_handle("Title", ResourceType::Font, "title.ttf")
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration(_)));

    // same id under another type is a different handle
    reg.create_handle("Title", ResourceType::Texture, "tile.png")
        .unwrap();

    reg.destroy_handle("Title", ResourceType::Font);
    reg.create_handle("Title", ResourceType::Font, "title.ttf")
        .unwrap();
}

#[test]
fn destroy_unknown_handle_is_a_no_op() {
    let mut reg = registry();
    reg.destroy_handle("Nothing", ResourceType::Texture);
    assert_eq!(reg.handle_count(), 0);
}

#[test]
fn handle_lookup_is_not_an_error() {
    let mut reg = registry();
    assert!(reg.handle("Tile").is_none());
    reg.create_handle("Tile", ResourceType::Texture, "tile.png")
        .unwrap();
    let handle = reg.handle("Tile").unwrap();
    assert_eq!(handle.status, ResourceStatus::Uninitialized);
    assert_eq!(handle.resource_type, ResourceType::Texture);
}

#[test]
fn materialisation_is_lazy_and_cached() {
    let mut reg = registry();
    reg.create_handle("Tile", ResourceType::Texture, "tile.png")
        .unwrap();
    let a = reg.get_texture("Tile").unwrap();
    assert_eq!(reg.handle("Tile").unwrap().status, ResourceStatus::Ready);
    let b = reg.get_texture("Tile").unwrap();
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(a.dimensions(), (32, 48));
}

#[test]
fn failed_load_is_sticky() {
    let mut reg = registry();
    reg.create_handle("Ghost", ResourceType::Texture, "ghost.png")
        .unwrap();
    assert!(matches!(
        reg.get_texture("Ghost"),
        Err(Error::InvalidPath(_))
    ));
    assert_eq!(reg.handle("Ghost").unwrap().status, ResourceStatus::Error);
    assert!(matches!(
        reg.get_texture("Ghost"),
        Err(Error::ResourceNotFound(_))
    ));
}

#[test]
fn absent_handle_is_resource_not_found() {
    let mut reg = registry();
    assert!(matches!(reg.get_font("Nope"), Err(Error::ResourceNotFound(_))));
    assert!(matches!(reg.get_document("Nope"), Err(Error::ResourceNotFound(_))));
}

#[test]
fn texture_options_cut_and_tint_on_first_load() {
    let mut reg = registry();
    reg.create_handle("Corner", ResourceType::Texture, "tile.png")
        .unwrap();
    let options = TextureOptions {
        region: IntRect::new(0, 0, 8, 8),
        color: Some(Color::rgba(0, 255, 0, 255)),
    };
    let tex = reg.get_texture_with("Corner", options).unwrap();
    assert_eq!(tex.dimensions(), (8, 8));
    assert_eq!(tex.pixel(0, 0), Some(Color::rgba(0, 255, 0, 255)));
}

#[test]
fn documents_and_logs_materialise() {
    let mut reg = registry();
    reg.create_handle("Scene", ResourceType::Document, "scene.json")
        .unwrap();
    assert_eq!(reg.get_document("Scene").unwrap()["id"], "A");

    reg.create_handle("Engine", ResourceType::Log, "engine.log")
        .unwrap();
    reg.get_log("Engine").unwrap().write_line("hello").unwrap();
    reg.destroy_handle("Engine", ResourceType::Log);
    assert!(reg.handle_of("Engine", ResourceType::Log).is_none());
}

#[test]
fn sounds_and_music_are_separate_stores() {
    let mut reg = registry();
    reg.create_handle("Click", ResourceType::Sound, "click.wav")
        .unwrap();
    assert_eq!(reg.get_sound("Click").unwrap().bytes, vec![7; 3]);
    assert!(matches!(
        reg.get_music("Click"),
        Err(Error::ResourceNotFound(_))
    ));
    reg.destroy_handle("Click", ResourceType::Sound);
    assert!(matches!(
        reg.get_sound("Click"),
        Err(Error::ResourceNotFound(_))
    ));
}

#[test]
fn splice_requires_ready_inputs() {
    let mut reg = registry();
    reg.create_handle("Tile", ResourceType::Texture, "tile.png")
        .unwrap();
    let err = reg.splice_textures("Bar", &["Tile", "Tile"]).unwrap_err();
    assert!(matches!(err, Error::ResourceNotFound(_)));
    assert!(reg.handle_of("Bar", ResourceType::Texture).is_none());

    reg.get_texture("Tile").unwrap();
    let bar = reg.splice_textures("Bar", &["Tile", "Tile", "Tile"]).unwrap();
    assert_eq!(bar.dimensions(), (96, 48));
    assert!(reg.handle_of("Bar", ResourceType::Texture).unwrap().is_ready());
}

#[test]
fn repeat_stores_output_under_new_id() {
    let mut reg = registry();
    reg.create_handle("Red", ResourceType::Texture, "red.png")
        .unwrap();
    reg.get_texture("Red").unwrap();
    let field = reg.repeat_texture("Red", "Field", 10, 6).unwrap();
    assert_eq!(field.dimensions(), (10, 6));
    assert!(Rc::ptr_eq(&field, &reg.get_texture("Field").unwrap()));
    assert!(matches!(
        reg.repeat_texture("Red", "Field", 10, 6),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn border_aborts_on_missing_part() {
    let mut reg = registry();
    reg.create_handle("Red", ResourceType::Texture, "red.png")
        .unwrap();
    reg.get_texture("Red").unwrap();
    let part = TextureProperties::new("Red", "red.png");
    let mut props = BorderTextureProperties {
        id: "Frame".into(),
        persist: false,
        scale: 1.0,
        percent_size: Default::default(),
        top_left: part.clone(),
        top_right: part.clone(),
        bottom_left: part.clone(),
        bottom_right: part.clone(),
        left: part.clone(),
        right: part.clone(),
        top: part.clone(),
        bottom: part.clone(),
        center: part.clone(),
    };
    let frame = reg.compose_border(&props, 20, 12).unwrap();
    assert_eq!(frame.dimensions(), (20, 12));

    props.id = "Frame2".into();
    props.center = TextureProperties::new("Missing", "missing.png");
    assert!(matches!(
        reg.compose_border(&props, 20, 12),
        Err(Error::ResourceNotFound(_))
    ));
    assert!(reg.handle_of("Frame2", ResourceType::Texture).is_none());
}
