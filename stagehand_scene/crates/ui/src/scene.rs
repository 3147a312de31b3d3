use crate::widget::{Widget, WidgetData, WidgetTree};
use ahash::{AHashMap, AHashSet};
use log::{debug, info};
use stagehand_engine::utils::{Rectangle, Size};
use stagehand_engine::{Error, Font, Result, Texture};
use stagehand_scene_assets::{
    AudioClip, BorderTextureProperties, FontProperties, LayerId, MusicProperties, PixelSize,
    RepeatingTextureProperties, ResourceRegistry, ResourceType, SceneProperties,
    SegmentedTextureProperties, TextureOptions, TextureProperties, WidgetType,
};
use std::path::Path;
use std::rc::Rc;

/// Which declaration a cached texture came from.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    Plain(TextureProperties),
    Repeating(RepeatingTextureProperties),
    Segmented(SegmentedTextureProperties),
    Border(BorderTextureProperties),
}

impl TextureSource {
    pub fn scale(&self) -> f32 {
        match self {
            TextureSource::Plain(t) => t.scale,
            TextureSource::Repeating(r) => r.input.scale,
            TextureSource::Segmented(s) => s.scale,
            TextureSource::Border(b) => b.scale,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry<R, P> {
    pub resource: Rc<R>,
    pub properties: P,
}

/// Per-scene view of registry resources, keyed by declared id.
#[derive(Debug, Clone)]
pub struct ResourceCache<R, P> {
    entries: AHashMap<String, CacheEntry<R, P>>,
}

impl<R, P> Default for ResourceCache<R, P> {
    fn default() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }
}

impl<R, P> ResourceCache<R, P> {
    pub fn insert(&mut self, id: &str, resource: Rc<R>, properties: P) {
        self.entries.insert(
            id.to_string(),
            CacheEntry {
                resource,
                properties,
            },
        );
    }

    pub fn get(&self, id: &str) -> Option<&CacheEntry<R, P>> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A live scene: its widget tree and the resources its widgets draw from.
#[derive(Debug)]
pub struct Scene {
    pub id: String,
    pub window: Size,
    pub widgets: WidgetTree,
    pub fonts: ResourceCache<Font, FontProperties>,
    pub textures: ResourceCache<Texture, TextureSource>,
    pub music: ResourceCache<AudioClip, MusicProperties>,
}

impl Scene {
    /// Creates the scene root and one root container per layer.
    pub fn new(id: &str, window: PixelSize) -> Result<Self> {
        let window = Size::new(window.width as f32, window.height as f32);
        let full = Rectangle::new(0.0, 0.0, window.width, window.height);
        let mut widgets = WidgetTree::new();
        widgets.set_root(Widget::new(
            id,
            WidgetType::Scene,
            LayerId::Background,
            full,
            WidgetData::Container,
        ))?;
        for layer in LayerId::ALL {
            widgets.insert(
                id,
                Widget::new(
                    &root_container_id(id, layer),
                    WidgetType::RootContainer,
                    layer,
                    full,
                    WidgetData::Container,
                ),
            )?;
        }
        Ok(Self {
            id: id.to_string(),
            window,
            widgets,
            fonts: ResourceCache::default(),
            textures: ResourceCache::default(),
            music: ResourceCache::default(),
        })
    }

    pub fn root_container(&self, layer: LayerId) -> String {
        root_container_id(&self.id, layer)
    }

    pub fn font(&self, id: &str) -> Result<&CacheEntry<Font, FontProperties>> {
        self.fonts.get(id).ok_or_else(|| {
            Error::ResourceNotFound(format!("font '{id}' is not cached by scene '{}'", self.id))
        })
    }

    pub fn texture(&self, id: &str) -> Result<&CacheEntry<Texture, TextureSource>> {
        self.textures.get(id).ok_or_else(|| {
            Error::ResourceNotFound(format!(
                "texture '{id}' is not cached by scene '{}'",
                self.id
            ))
        })
    }

    /// Unscaled texture size times its declared scale.
    pub fn texture_size(&self, id: &str) -> Result<Size> {
        let entry = self.texture(id)?;
        Ok(entry.resource.size() * entry.properties.scale())
    }

    pub fn cached_resource_count(&self) -> usize {
        self.fonts.len() + self.textures.len() + self.music.len()
    }
}

pub fn root_container_id(scene_id: &str, layer: LayerId) -> String {
    format!("{scene_id}.{layer}")
}

fn ensure_handle(
    registry: &mut ResourceRegistry,
    id: &str,
    resource_type: ResourceType,
    path: &Path,
) -> Result<()> {
    if !registry.has_handle(id, resource_type) {
        registry.create_handle(id, resource_type, path)?;
    }
    Ok(())
}

fn cache_texture(
    scene: &mut Scene,
    registry: &mut ResourceRegistry,
    props: &TextureProperties,
) -> Result<Rc<Texture>> {
    ensure_handle(registry, props.id(), ResourceType::Texture, &props.base.path)?;
    let texture = registry.get_texture_with(
        props.id(),
        TextureOptions {
            region: props.input_rect,
            color: props.color,
        },
    )?;
    scene.textures.insert(
        props.id(),
        texture.clone(),
        TextureSource::Plain(props.clone()),
    );
    Ok(texture)
}

// A generated texture kept alive by an earlier scene is reused as is.
fn reusable(registry: &ResourceRegistry, id: &str) -> Option<Rc<Texture>> {
    registry
        .handle_of(id, ResourceType::Texture)
        .filter(|h| h.is_ready())
        .and_then(|_| registry.ready_texture(id).ok())
}

/// Materialises everything `props` declares and caches it on `scene`, in
/// order: music, fonts, textures, repeating, segmented, border. Stops at the
/// first failure; whatever was created up to that point stays.
pub fn build_resource_cache(
    scene: &mut Scene,
    props: &SceneProperties,
    registry: &mut ResourceRegistry,
) -> Result<()> {
    if let Some(music) = &props.music {
        let id = music.base.id.as_str();
        ensure_handle(registry, id, ResourceType::Music, &music.base.path)?;
        let clip = registry.get_music(id)?;
        scene.music.insert(id, clip, music.clone());
    }

    for font in &props.fonts {
        let id = font.base.id.as_str();
        ensure_handle(registry, id, ResourceType::Font, &font.base.path)?;
        let loaded = registry.get_font(id)?;
        scene.fonts.insert(id, loaded, font.clone());
    }

    for texture in &props.textures {
        cache_texture(scene, registry, texture)?;
    }

    for repeating in &props.repeating_textures {
        cache_texture(scene, registry, &repeating.input)?;
        let out = repeating.output_id.as_str();
        let texture = match reusable(registry, out) {
            Some(t) => t,
            None => registry.repeat_texture(
                repeating.input_id(),
                out,
                repeating.output_size.width,
                repeating.output_size.height,
            )?,
        };
        scene
            .textures
            .insert(out, texture, TextureSource::Repeating(repeating.clone()));
    }

    for segmented in &props.segmented_textures {
        for segment in &segmented.segments {
            cache_texture(scene, registry, segment)?;
        }
        let texture = match reusable(registry, &segmented.id) {
            Some(t) => t,
            None => {
                let ids: Vec<&str> = segmented.segments.iter().map(|s| s.id()).collect();
                registry.splice_textures(&segmented.id, &ids)?
            }
        };
        scene.textures.insert(
            &segmented.id,
            texture,
            TextureSource::Segmented(segmented.clone()),
        );
    }

    if let Some(border) = &props.border_texture {
        for part in border.parts() {
            cache_texture(scene, registry, part)?;
        }
        let texture = match reusable(registry, &border.id) {
            Some(t) => t,
            None => {
                let window = PixelSize {
                    width: scene.window.width as u32,
                    height: scene.window.height as u32,
                };
                let size = border.percent_size.resolve(window);
                registry.compose_border(border, size.width, size.height)?
            }
        };
        scene
            .textures
            .insert(&border.id, texture, TextureSource::Border(border.clone()));
    }

    info!(
        "scene '{}' cached {} fonts, {} textures",
        scene.id,
        scene.fonts.len(),
        scene.textures.len()
    );
    Ok(())
}

// Every handle a scene declares, in build order, with its own persist flag.
fn declared_handles(props: &SceneProperties) -> Vec<(&str, ResourceType, bool)> {
    let mut handles = Vec::new();
    if let Some(music) = &props.music {
        handles.push((music.base.id.as_str(), ResourceType::Music, music.base.persist));
    }
    for font in &props.fonts {
        handles.push((font.base.id.as_str(), ResourceType::Font, font.base.persist));
    }
    for texture in &props.textures {
        handles.push((texture.id(), ResourceType::Texture, texture.base.persist));
    }
    for repeating in &props.repeating_textures {
        let persist = repeating.input.base.persist;
        handles.push((repeating.input_id(), ResourceType::Texture, persist));
        handles.push((repeating.output_id.as_str(), ResourceType::Texture, persist));
    }
    for segmented in &props.segmented_textures {
        for segment in &segmented.segments {
            let persist = segmented.persist || segment.base.persist;
            handles.push((segment.id(), ResourceType::Texture, persist));
        }
        handles.push((segmented.id.as_str(), ResourceType::Texture, segmented.persist));
    }
    if let Some(border) = &props.border_texture {
        for part in border.parts() {
            let persist = border.persist || part.base.persist;
            handles.push((part.id(), ResourceType::Texture, persist));
        }
        handles.push((border.id.as_str(), ResourceType::Texture, border.persist));
    }
    handles
}

/// Releases the handles `props` declared, in the same order they were
/// built. A handle any declaration marks persistent is kept. Always
/// empties the scene's caches.
pub fn destroy_resource_cache(
    scene: &mut Scene,
    props: &SceneProperties,
    registry: &mut ResourceRegistry,
) {
    let handles = declared_handles(props);
    let persistent: AHashSet<(&str, ResourceType)> = handles
        .iter()
        .filter(|(_, _, persist)| *persist)
        .map(|(id, resource_type, _)| (*id, *resource_type))
        .collect();
    for (id, resource_type, _) in handles {
        if persistent.contains(&(id, resource_type)) {
            debug!("keeping persistent {resource_type} '{id}'");
        } else {
            registry.destroy_handle(id, resource_type);
        }
    }

    scene.music.clear();
    scene.fonts.clear();
    scene.textures.clear();
    debug!("cleared resource cache of scene '{}'", scene.id);
}
