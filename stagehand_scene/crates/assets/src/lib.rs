#![forbid(unsafe_code)]

pub mod config;
pub mod handle;
pub mod parse;
pub mod properties;
pub mod registry;
pub mod source;
pub mod widgets;

pub use config::{load_config, EngineConfig};
pub use handle::{ResourceHandle, ResourceStatus, ResourceType};
pub use parse::{load_scene, load_scene_index, SceneIndex, SceneIndexEntry};
pub use properties::*;
pub use registry::{ResourceRegistry, TextureOptions};
pub use source::{AudioClip, FsLoader, LogFile, MemoryLoader, ResourceLoader, SharedBuffer};
pub use widgets::*;
