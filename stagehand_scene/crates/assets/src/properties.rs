use crate::handle::ResourceType;
use crate::widgets::{LayerId, LayoutLayerProperties, NUM_LAYERS};
use serde::{Deserialize, Serialize};
use stagehand_engine::utils::{Color, IntRect};
use std::path::PathBuf;

/// Fields shared by every declared resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceProperties {
    pub id: String,
    pub resource_type: ResourceType,
    pub path: PathBuf,
    pub persist: bool,
}

impl ResourceProperties {
    pub fn new(id: &str, resource_type: ResourceType, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.to_string(),
            resource_type,
            path: path.into(),
            persist: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FontProperties {
    pub base: ResourceProperties,
    pub scale: f32,
    pub character_size: f32,
    pub fill_color: Color,
    pub outline_color: Color,
    pub outline_thickness: f32,
}

impl FontProperties {
    pub fn new(id: &str, path: impl Into<PathBuf>, character_size: f32) -> Self {
        Self {
            base: ResourceProperties::new(id, ResourceType::Font, path),
            scale: 1.0,
            character_size,
            fill_color: Color::WHITE,
            outline_color: Color::BLACK,
            outline_thickness: 0.0,
        }
    }

    /// Pixel size glyphs are rendered at.
    pub fn pixel_size(&self) -> f32 {
        self.character_size * self.scale
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureProperties {
    pub base: ResourceProperties,
    pub scale: f32,
    // Some(..) when the texture is colorised.
    pub color: Option<Color>,
    // Atlas sub-rectangle; empty means the whole image.
    pub input_rect: IntRect,
}

impl TextureProperties {
    pub fn new(id: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            base: ResourceProperties::new(id, ResourceType::Texture, path),
            scale: 1.0,
            color: None,
            input_rect: IntRect::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.base.id
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

/// `input` is the source tile; the tiled result is stored as `output_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatingTextureProperties {
    pub input: TextureProperties,
    pub output_id: String,
    pub output_size: PixelSize,
}

impl RepeatingTextureProperties {
    pub fn input_id(&self) -> &str {
        self.input.id()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedTextureProperties {
    pub id: String,
    pub persist: bool,
    pub scale: f32,
    pub segments: Vec<TextureProperties>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PercentSize {
    pub width: u8,
    pub height: u8,
}

impl PercentSize {
    pub fn resolve(&self, window: PixelSize) -> PixelSize {
        PixelSize {
            width: window.width * self.width as u32 / 100,
            height: window.height * self.height as u32 / 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BorderTextureProperties {
    pub id: String,
    pub persist: bool,
    pub scale: f32,
    pub percent_size: PercentSize,
    pub top_left: TextureProperties,
    pub top_right: TextureProperties,
    pub bottom_left: TextureProperties,
    pub bottom_right: TextureProperties,
    pub left: TextureProperties,
    pub right: TextureProperties,
    pub top: TextureProperties,
    pub bottom: TextureProperties,
    pub center: TextureProperties,
}

impl BorderTextureProperties {
    /// All nine parts, corners first.
    pub fn parts(&self) -> [&TextureProperties; 9] {
        [
            &self.top_left,
            &self.top_right,
            &self.bottom_left,
            &self.bottom_right,
            &self.left,
            &self.right,
            &self.top,
            &self.bottom,
            &self.center,
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MusicProperties {
    pub base: ResourceProperties,
    // 0..=100
    pub volume: f32,
    pub looping: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutProperties {
    pub layers: [LayoutLayerProperties; NUM_LAYERS],
}

impl LayoutProperties {
    pub fn layer(&self, id: LayerId) -> &LayoutLayerProperties {
        &self.layers[id.index()]
    }
}

/// Everything one scene document declares. Parsed once and kept for the
/// lifetime of the scene manager.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneProperties {
    pub id: String,
    pub music: Option<MusicProperties>,
    pub fonts: Vec<FontProperties>,
    pub textures: Vec<TextureProperties>,
    pub repeating_textures: Vec<RepeatingTextureProperties>,
    pub segmented_textures: Vec<SegmentedTextureProperties>,
    pub border_texture: Option<BorderTextureProperties>,
    pub layout: LayoutProperties,
}

impl SceneProperties {
    pub fn font(&self, id: &str) -> Option<&FontProperties> {
        self.fonts.iter().find(|f| f.base.id == id)
    }

    pub fn texture(&self, id: &str) -> Option<&TextureProperties> {
        self.textures.iter().find(|t| t.base.id == id)
    }

    /// Matches on the generated output id.
    pub fn repeating_texture(&self, output_id: &str) -> Option<&RepeatingTextureProperties> {
        self.repeating_textures
            .iter()
            .find(|r| r.output_id == output_id)
    }

    pub fn segmented_texture(&self, id: &str) -> Option<&SegmentedTextureProperties> {
        self.segmented_textures.iter().find(|s| s.id == id)
    }

    pub fn music(&self, id: &str) -> Option<&MusicProperties> {
        self.music.as_ref().filter(|m| m.base.id == id)
    }

    /// Declared scale of any texture kind with this id, 1.0 if unknown.
    pub fn texture_scale(&self, id: &str) -> f32 {
        if let Some(t) = self.texture(id) {
            return t.scale;
        }
        if let Some(r) = self.repeating_texture(id) {
            return r.input.scale;
        }
        if let Some(s) = self.segmented_texture(id) {
            return s.scale;
        }
        match &self.border_texture {
            Some(b) if b.id == id => b.scale,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_scan_by_id_and_output_id() {
        let mut scene = SceneProperties {
            id: "Menu".into(),
            ..Default::default()
        };
        let mut logo = TextureProperties::new("Logo", "logo.png");
        logo.scale = 0.5;
        scene.textures.push(logo);
        scene.repeating_textures.push(RepeatingTextureProperties {
            input: TextureProperties::new("Grass", "grass.png"),
            output_id: "Field".into(),
            output_size: PixelSize {
                width: 100,
                height: 20,
            },
        });
        scene.segmented_textures.push(SegmentedTextureProperties {
            id: "Bar".into(),
            persist: false,
            scale: 2.0,
            segments: vec![],
        });

        assert!(scene.texture("Logo").is_some());
        assert!(scene.repeating_texture("Field").is_some());
        assert!(scene.repeating_texture("Grass").is_none());
        assert_eq!(scene.texture_scale("Logo"), 0.5);
        assert_eq!(scene.texture_scale("Bar"), 2.0);
        assert_eq!(scene.texture_scale("Unknown"), 1.0);
        assert!(scene.font("Logo").is_none());
    }

    #[test]
    fn percent_size_resolves_against_window() {
        let p = PercentSize {
            width: 50,
            height: 25,
        };
        let out = p.resolve(PixelSize {
            width: 800,
            height: 600,
        });
        assert_eq!(out, PixelSize {
            width: 400,
            height: 150
        });
    }
}
