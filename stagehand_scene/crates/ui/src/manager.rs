use crate::factory::{self, Systems};
use crate::scene::{build_resource_cache, destroy_resource_cache, Scene};
use ahash::AHashMap;
use log::{debug, info, warn};
use stagehand_engine::{Error, Result, Texture};
use stagehand_scene_assets::{
    load_scene, load_scene_index, EngineConfig, FsLoader, MusicProperties, ResourceRegistry,
    ResourceType, SceneIndex, SceneProperties,
};
use stagehand_scene_core::{Event, EventArg, EventQueue, EventType, FrameClock};
use stagehand_scene_input::InputFrame;
use std::cell::RefCell;
use std::rc::Rc;

/// Document handle id of the scene index.
pub const SCENE_INDEX_ID: &str = "SceneIndex";
const MANAGER_COMPONENT: &str = "SceneManager";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped,
}

// Requests raised by event handlers, applied after dispatch.
#[derive(Debug, Default)]
struct Directives {
    next_scene: Option<String>,
    quit: bool,
}

/// Owns the registry, the component systems and at most one live scene.
pub struct SceneManager {
    config: EngineConfig,
    registry: ResourceRegistry,
    index: SceneIndex,
    properties: AHashMap<String, Rc<SceneProperties>>,
    current: Option<Scene>,
    systems: Systems,
    directives: Rc<RefCell<Directives>>,
    clock: FrameClock,
}

impl SceneManager {
    pub fn new(config: EngineConfig, registry: ResourceRegistry) -> Result<Self> {
        let directives = Rc::new(RefCell::new(Directives::default()));
        let mut systems = Systems::new();
        let requests = directives.clone();
        systems.events.create_event_component(
            [EventType::SetScene, EventType::Quit],
            Box::new(move |event: &Event, _queue: &mut EventQueue| {
                match event.event_type {
                    EventType::SetScene => {
                        requests.borrow_mut().next_scene = Some(event.arg_str(0)?.to_string());
                    }
                    EventType::Quit => requests.borrow_mut().quit = true,
                    _ => {}
                }
                Ok(())
            }),
            MANAGER_COMPONENT,
        )?;
        Ok(Self {
            config,
            registry,
            index: SceneIndex::default(),
            properties: AHashMap::new(),
            current: None,
            systems,
            directives,
            clock: FrameClock::default(),
        })
    }

    /// Manager reading resources from disk under `config.resources.root`.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        let loader = FsLoader::new(config.resources.root.clone());
        let registry = ResourceRegistry::new(Box::new(loader));
        Self::new(config, registry)
    }

    pub fn load_index(&mut self) -> Result<()> {
        if !self
            .registry
            .has_handle(SCENE_INDEX_ID, ResourceType::Document)
        {
            self.registry.create_handle(
                SCENE_INDEX_ID,
                ResourceType::Document,
                self.config.resources.index.clone(),
            )?;
        }
        let doc = self.registry.get_document(SCENE_INDEX_ID)?;
        self.index = load_scene_index(&doc)?;
        info!("scene index lists {} scenes", self.index.entries.len());
        Ok(())
    }

    /// Loads the index and enters the configured initial scene, if any.
    pub fn start(&mut self) -> Result<()> {
        self.load_index()?;
        match self.config.resources.initial_scene.clone() {
            Some(id) => self.set_current_scene(&id),
            None => {
                warn!("no initial scene configured");
                Ok(())
            }
        }
    }

    /// Makes `props` available without going through the index.
    pub fn register_scene(&mut self, props: SceneProperties) -> Result<()> {
        if self.properties.contains_key(&props.id) {
            return Err(Error::InvalidConfiguration(format!(
                "scene '{}' is already registered",
                props.id
            )));
        }
        self.properties.insert(props.id.clone(), Rc::new(props));
        Ok(())
    }

    /// Parsed properties of a scene; documents are read and parsed once.
    pub fn load_scene_properties(&mut self, scene_id: &str) -> Result<Rc<SceneProperties>> {
        if let Some(props) = self.properties.get(scene_id) {
            return Ok(props.clone());
        }
        let entry = self
            .index
            .entry(scene_id)
            .ok_or_else(|| Error::ResourceNotFound(format!("scene '{scene_id}' is not indexed")))?
            .clone();
        if !self
            .registry
            .has_handle(&entry.resource_id, ResourceType::Document)
        {
            self.registry
                .create_handle(&entry.resource_id, ResourceType::Document, entry.path)?;
        }
        let doc = self.registry.get_document(&entry.resource_id)?;
        let props = load_scene(&doc)?;
        if props.id != scene_id {
            return Err(Error::InvalidConfiguration(format!(
                "document '{}' declares scene '{}', expected '{scene_id}'",
                entry.resource_id, props.id
            )));
        }
        let props = Rc::new(props);
        self.properties.insert(scene_id.to_string(), props.clone());
        Ok(props)
    }

    /// Replaces the current scene. The old scene is torn down first; a
    /// failure while building the new one leaves whatever was created so far.
    pub fn set_current_scene(&mut self, scene_id: &str) -> Result<()> {
        self.destroy_current_scene()?;
        let props = self.load_scene_properties(scene_id)?;
        info!("entering scene '{scene_id}'");

        let mut scene = Scene::new(&props.id, self.config.window_size())?;
        build_resource_cache(&mut scene, &props, &mut self.registry)?;
        self.systems.render.create_render_context(&scene.id)?;
        factory::create_scene_widgets(&mut scene, &mut self.systems, &props)?;
        if let Some(music) = &props.music {
            self.systems.events.enqueue(play_music(music));
        }
        self.current = Some(scene);
        Ok(())
    }

    /// Tears the current scene down: widgets, render context, then the
    /// non-persistent resources. No-op without a current scene.
    pub fn destroy_current_scene(&mut self) -> Result<()> {
        let Some(mut scene) = self.current.take() else {
            return Ok(());
        };
        info!("leaving scene '{}'", scene.id);
        factory::destroy_scene_widgets(&mut scene, &mut self.systems)?;
        self.systems.render.destroy_render_context(&scene.id);
        let props = self.properties.get(&scene.id).cloned().ok_or_else(|| {
            Error::NullPtr(format!("scene '{}' has no properties", scene.id))
        })?;
        destroy_resource_cache(&mut scene, &props, &mut self.registry);
        if let Some(music) = &props.music {
            self.systems.events.enqueue(Event::new(
                EventType::StopMusic,
                vec![EventArg::String(music.base.id.clone())],
            ));
        }
        Ok(())
    }

    /// One frame: input, widget reactions, event dispatch, then any scene
    /// change or quit request raised along the way.
    pub fn update(&mut self, frame: &InputFrame) -> Result<RunState> {
        let actions = self.systems.input.update(frame);
        if let Some(scene) = &self.current {
            for (widget_id, action) in &actions {
                factory::apply_action(scene, &mut self.systems, widget_id, *action);
            }
        }
        let dispatched = self.systems.events.update()?;
        if dispatched > 0 {
            debug!("dispatched {dispatched} events");
        }
        if let Some(scene) = &self.current {
            factory::refresh_textures(scene, &mut self.systems)?;
        }
        self.clock.tick(frame.delta_seconds);

        let (next_scene, quit) = {
            let mut requests = self.directives.borrow_mut();
            (requests.next_scene.take(), std::mem::take(&mut requests.quit))
        };
        if quit {
            info!("quit requested");
            return Ok(RunState::Stopped);
        }
        if let Some(id) = next_scene {
            self.set_current_scene(&id)?;
        }
        Ok(RunState::Running)
    }

    /// Software render of the current scene at the configured window size.
    pub fn rasterize(&self) -> Result<Texture> {
        let scene = self.current_scene()?;
        let size = self.config.window_size();
        self.systems
            .render
            .rasterize(&scene.id, size.width, size.height)
    }

    pub fn enqueue(&mut self, event: Event) {
        self.systems.events.enqueue(event);
    }

    pub fn current_scene(&self) -> Result<&Scene> {
        self.current
            .as_ref()
            .ok_or_else(|| Error::NullPtr("no current scene".to_string()))
    }

    pub fn current_scene_id(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.id.as_str())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn index(&self) -> &SceneIndex {
        &self.index
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.registry
    }

    pub fn systems(&self) -> &Systems {
        &self.systems
    }

    pub fn systems_mut(&mut self) -> &mut Systems {
        &mut self.systems
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }
}

fn play_music(music: &MusicProperties) -> Event {
    Event::new(
        EventType::PlayMusic,
        vec![
            EventArg::String(music.base.id.clone()),
            EventArg::Float(music.volume as f64),
            EventArg::Bool(music.looping),
        ],
    )
}
