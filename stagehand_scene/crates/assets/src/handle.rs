use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Log,
    Document,
    Font,
    Texture,
    Sound,
    Music,
}

impl ResourceType {
    pub const ALL: [ResourceType; 6] = [
        ResourceType::Log,
        ResourceType::Document,
        ResourceType::Font,
        ResourceType::Texture,
        ResourceType::Sound,
        ResourceType::Music,
    ];
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceType::Log => "log",
            ResourceType::Document => "document",
            ResourceType::Font => "font",
            ResourceType::Texture => "texture",
            ResourceType::Sound => "sound",
            ResourceType::Music => "music",
        };
        f.write_str(name)
    }
}

/// Load state of a handle. `Uninitialized` moves to `Ready` or `Error` on the
/// first materialisation and never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourceStatus {
    #[default]
    Uninitialized,
    Ready,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    pub id: String,
    pub resource_type: ResourceType,
    pub status: ResourceStatus,
    // Relative to the registry root; empty for generated textures.
    pub path: PathBuf,
}

impl ResourceHandle {
    pub fn new(id: &str, resource_type: ResourceType, path: PathBuf) -> Self {
        Self {
            id: id.to_string(),
            resource_type,
            status: ResourceStatus::Uninitialized,
            path,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == ResourceStatus::Ready
    }
}
