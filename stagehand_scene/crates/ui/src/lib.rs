#![forbid(unsafe_code)]

pub mod factory;
pub mod manager;
pub mod render;
pub mod scene;
pub mod widget;

pub use factory::Systems;
pub use manager::{RunState, SceneManager, SCENE_INDEX_ID};
pub use render::{DrawParams, Drawable, RenderComponent, RenderSystem};
pub use scene::{build_resource_cache, destroy_resource_cache, Scene, TextureSource};
pub use widget::{Widget, WidgetData, WidgetTree};
