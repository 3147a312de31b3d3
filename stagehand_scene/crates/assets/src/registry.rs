use crate::handle::{ResourceHandle, ResourceStatus, ResourceType};
use crate::properties::BorderTextureProperties;
use crate::source::{AudioClip, LogFile, ResourceLoader};
use ahash::AHashMap;
use log::{debug, info, warn};
use serde_json::Value;
use stagehand_engine::compose::{self, BorderParts};
use stagehand_engine::utils::{Color, IntRect};
use stagehand_engine::{Error, Font, Result, Texture};
use std::path::PathBuf;
use std::rc::Rc;

/// How a texture is cut and tinted when it is first materialised.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextureOptions {
    pub region: IntRect,
    pub color: Option<Color>,
}

/// Process-lifetime resource store. Handles are keyed by (type, id); the
/// materialised objects live in one store per type and are shared out as `Rc`.
pub struct ResourceRegistry {
    loader: Box<dyn ResourceLoader>,
    handles: AHashMap<ResourceType, AHashMap<String, ResourceHandle>>,
    fonts: AHashMap<String, Rc<Font>>,
    textures: AHashMap<String, Rc<Texture>>,
    documents: AHashMap<String, Rc<Value>>,
    music: AHashMap<String, Rc<AudioClip>>,
    sounds: AHashMap<String, Rc<AudioClip>>,
    logs: AHashMap<String, LogFile>,
}

impl ResourceRegistry {
    pub fn new(loader: Box<dyn ResourceLoader>) -> Self {
        Self {
            loader,
            handles: AHashMap::new(),
            fonts: AHashMap::new(),
            textures: AHashMap::new(),
            documents: AHashMap::new(),
            music: AHashMap::new(),
            sounds: AHashMap::new(),
            logs: AHashMap::new(),
        }
    }

    pub fn create_handle(
        &mut self,
        id: &str,
        resource_type: ResourceType,
        path: impl Into<PathBuf>,
    ) -> Result<&ResourceHandle> {
        let handles = self.handles.entry(resource_type).or_default();
        if handles.contains_key(id) {
            return Err(Error::InvalidConfiguration(format!(
                "{resource_type} handle '{id}' already exists"
            )));
        }
        let handle = ResourceHandle::new(id, resource_type, path.into());
        debug!("created {resource_type} handle '{id}' ({})", handle.path.display());
        Ok(handles.entry(id.to_string()).or_insert(handle))
    }

    /// First handle with this id, whatever its type.
    pub fn handle(&self, id: &str) -> Option<&ResourceHandle> {
        ResourceType::ALL
            .iter()
            .find_map(|ty| self.handle_of(id, *ty))
    }

    pub fn handle_of(&self, id: &str, resource_type: ResourceType) -> Option<&ResourceHandle> {
        self.handles.get(&resource_type).and_then(|h| h.get(id))
    }

    pub fn has_handle(&self, id: &str, resource_type: ResourceType) -> bool {
        self.handle_of(id, resource_type).is_some()
    }

    pub fn handle_count(&self) -> usize {
        self.handles.values().map(|h| h.len()).sum()
    }

    /// Drops the materialised object and the handle. Unknown ids are ignored.
    pub fn destroy_handle(&mut self, id: &str, resource_type: ResourceType) {
        match resource_type {
            ResourceType::Log => {
                self.logs.remove(id);
            }
            ResourceType::Document => {
                self.documents.remove(id);
            }
            ResourceType::Font => {
                self.fonts.remove(id);
            }
            ResourceType::Texture => {
                self.textures.remove(id);
            }
            ResourceType::Sound => {
                self.sounds.remove(id);
            }
            ResourceType::Music => {
                self.music.remove(id);
            }
        }
        let removed = self
            .handles
            .get_mut(&resource_type)
            .and_then(|h| h.remove(id));
        match removed {
            Some(_) => debug!("destroyed {resource_type} handle '{id}'"),
            None => debug!("destroy of unknown {resource_type} handle '{id}' ignored"),
        }
    }

    // Some(path) when the resource still has to be loaded, None when it is
    // already materialised.
    fn pending_load(&self, id: &str, resource_type: ResourceType) -> Result<Option<PathBuf>> {
        let handle = self.handle_of(id, resource_type).ok_or_else(|| {
            Error::ResourceNotFound(format!("no {resource_type} handle '{id}'"))
        })?;
        match handle.status {
            ResourceStatus::Uninitialized => Ok(Some(handle.path.clone())),
            ResourceStatus::Ready => Ok(None),
            ResourceStatus::Error => Err(Error::ResourceNotFound(format!(
                "{resource_type} '{id}' failed to load earlier"
            ))),
        }
    }

    fn finish_load<T>(&mut self, id: &str, resource_type: ResourceType, loaded: Result<T>) -> Result<T> {
        let status = if loaded.is_ok() {
            ResourceStatus::Ready
        } else {
            ResourceStatus::Error
        };
        if let Some(handle) = self
            .handles
            .get_mut(&resource_type)
            .and_then(|h| h.get_mut(id))
        {
            handle.status = status;
        }
        match &loaded {
            Ok(_) => info!("loaded {resource_type} '{id}'"),
            Err(e) => warn!("failed to load {resource_type} '{id}': {e}"),
        }
        loaded
    }

    fn stored<T: Clone>(store: &AHashMap<String, T>, id: &str, ty: ResourceType) -> Result<T> {
        store
            .get(id)
            .cloned()
            .ok_or_else(|| Error::ResourceNotFound(format!("{ty} '{id}' is not materialised")))
    }

    pub fn get_font(&mut self, id: &str) -> Result<Rc<Font>> {
        if let Some(path) = self.pending_load(id, ResourceType::Font)? {
            let loaded = self.loader.load_font(&path).map(Rc::new);
            let font = self.finish_load(id, ResourceType::Font, loaded)?;
            self.fonts.insert(id.to_string(), font);
        }
        Self::stored(&self.fonts, id, ResourceType::Font)
    }

    pub fn get_texture(&mut self, id: &str) -> Result<Rc<Texture>> {
        self.get_texture_with(id, TextureOptions::default())
    }

    /// `options` only apply to the first materialisation.
    pub fn get_texture_with(&mut self, id: &str, options: TextureOptions) -> Result<Rc<Texture>> {
        if let Some(path) = self.pending_load(id, ResourceType::Texture)? {
            let loaded = self
                .loader
                .load_texture(&path)
                .and_then(|t| t.region(options.region))
                .map(|mut t| {
                    if let Some(color) = options.color {
                        t.colorize(color);
                    }
                    Rc::new(t)
                });
            let texture = self.finish_load(id, ResourceType::Texture, loaded)?;
            self.textures.insert(id.to_string(), texture);
        }
        Self::stored(&self.textures, id, ResourceType::Texture)
    }

    pub fn get_document(&mut self, id: &str) -> Result<Rc<Value>> {
        if let Some(path) = self.pending_load(id, ResourceType::Document)? {
            let loaded = self.loader.load_document(&path).map(Rc::new);
            let doc = self.finish_load(id, ResourceType::Document, loaded)?;
            self.documents.insert(id.to_string(), doc);
        }
        Self::stored(&self.documents, id, ResourceType::Document)
    }

    pub fn get_music(&mut self, id: &str) -> Result<Rc<AudioClip>> {
        if let Some(path) = self.pending_load(id, ResourceType::Music)? {
            let loaded = self.loader.load_audio(&path).map(Rc::new);
            let clip = self.finish_load(id, ResourceType::Music, loaded)?;
            self.music.insert(id.to_string(), clip);
        }
        Self::stored(&self.music, id, ResourceType::Music)
    }

    pub fn get_sound(&mut self, id: &str) -> Result<Rc<AudioClip>> {
        if let Some(path) = self.pending_load(id, ResourceType::Sound)? {
            let loaded = self.loader.load_audio(&path).map(Rc::new);
            let clip = self.finish_load(id, ResourceType::Sound, loaded)?;
            self.sounds.insert(id.to_string(), clip);
        }
        Self::stored(&self.sounds, id, ResourceType::Sound)
    }

    pub fn get_log(&mut self, id: &str) -> Result<&mut LogFile> {
        if let Some(path) = self.pending_load(id, ResourceType::Log)? {
            let loaded = self.loader.open_log(&path);
            let log = self.finish_load(id, ResourceType::Log, loaded)?;
            self.logs.insert(id.to_string(), log);
        }
        self.logs
            .get_mut(id)
            .ok_or_else(|| Error::ResourceNotFound(format!("log '{id}' is not materialised")))
    }

    /// Registers a generated texture under a new, already `Ready` handle.
    pub fn insert_texture(&mut self, id: &str, texture: Texture) -> Result<Rc<Texture>> {
        self.create_handle(id, ResourceType::Texture, PathBuf::new())?;
        let texture = Rc::new(texture);
        self.textures.insert(id.to_string(), texture.clone());
        let _ = self.finish_load(id, ResourceType::Texture, Ok(()));
        Ok(texture)
    }

    /// A texture that must already be `Ready`; never triggers a load.
    pub fn ready_texture(&self, id: &str) -> Result<Rc<Texture>> {
        match self.handle_of(id, ResourceType::Texture) {
            Some(h) if h.is_ready() => Self::stored(&self.textures, id, ResourceType::Texture),
            Some(_) => Err(Error::ResourceNotFound(format!("texture '{id}' is not ready"))),
            None => Err(Error::ResourceNotFound(format!("no texture handle '{id}'"))),
        }
    }

    pub fn splice_textures(&mut self, output_id: &str, input_ids: &[&str]) -> Result<Rc<Texture>> {
        let inputs = input_ids
            .iter()
            .map(|id| self.ready_texture(id))
            .collect::<Result<Vec<_>>>()?;
        let refs: Vec<&Texture> = inputs.iter().map(|t| t.as_ref()).collect();
        let spliced = compose::splice(&refs)?;
        self.insert_texture(output_id, spliced)
    }

    pub fn repeat_texture(
        &mut self,
        input_id: &str,
        output_id: &str,
        width: u32,
        height: u32,
    ) -> Result<Rc<Texture>> {
        let tile = self.ready_texture(input_id)?;
        let repeated = compose::repeat_to_size(&tile, width, height)?;
        self.insert_texture(output_id, repeated)
    }

    /// Composes the border described by `props` and stores it as `props.id`.
    pub fn compose_border(
        &mut self,
        props: &BorderTextureProperties,
        width: u32,
        height: u32,
    ) -> Result<Rc<Texture>> {
        let [tl, tr, bl, br, l, r, t, b, c] = props.parts().map(|p| self.ready_texture(p.id()));
        let (tl, tr, bl, br, l, r, t, b, c) = (tl?, tr?, bl?, br?, l?, r?, t?, b?, c?);
        let parts = BorderParts {
            top_left: &tl,
            top_right: &tr,
            bottom_left: &bl,
            bottom_right: &br,
            left: &l,
            right: &r,
            top: &t,
            bottom: &b,
            center: &c,
        };
        let border = compose::compose_border(&parts, width, height)?;
        self.insert_texture(&props.id, border)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    pub fn loader(&self) -> &dyn ResourceLoader {
        self.loader.as_ref()
    }
}

#[cfg(test)]
mod tests;
