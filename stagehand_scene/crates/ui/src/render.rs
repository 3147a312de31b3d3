use ahash::AHashMap;
use image::imageops::{self, FilterType};
use log::debug;
use stagehand_engine::utils::{Color, Position, Size};
use stagehand_engine::{Error, Font, Result, Texture};
use stagehand_scene_assets::{FontProperties, LayerId, NUM_LAYERS};
use std::rc::Rc;

/// What a render component paints.
#[derive(Debug, Clone)]
pub enum Drawable {
    Texture(Rc<Texture>),
    Text {
        font: Rc<Font>,
        style: FontProperties,
        contents: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawParams {
    pub scale: f32,
    pub tint: Option<Color>,
    pub visible: bool,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            scale: 1.0,
            tint: None,
            visible: true,
        }
    }
}

impl DrawParams {
    pub fn scaled(scale: f32) -> Self {
        Self {
            scale,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderComponent {
    pub widget_id: String,
    pub layer: LayerId,
    pub drawable: Drawable,
    pub position: Position,
    pub params: DrawParams,
}

impl RenderComponent {
    /// On-screen size after scaling.
    pub fn size(&self) -> Size {
        match &self.drawable {
            Drawable::Texture(t) => t.size() * self.params.scale,
            Drawable::Text {
                font,
                style,
                contents,
            } => font.measure(contents, style.pixel_size()),
        }
    }
}

#[derive(Debug, Default)]
struct RenderContext {
    // insertion order within a layer is paint order
    layers: [Vec<RenderComponent>; NUM_LAYERS],
}

impl RenderContext {
    fn find(&self, widget_id: &str) -> Option<&RenderComponent> {
        self.layers
            .iter()
            .flat_map(|l| l.iter())
            .find(|c| c.widget_id == widget_id)
    }

    fn find_mut(&mut self, widget_id: &str) -> Option<&mut RenderComponent> {
        self.layers
            .iter_mut()
            .flat_map(|l| l.iter_mut())
            .find(|c| c.widget_id == widget_id)
    }

    fn len(&self) -> usize {
        self.layers.iter().map(|l| l.len()).sum()
    }
}

/// Retained draw list per scene, bucketed by layer.
#[derive(Debug, Default)]
pub struct RenderSystem {
    contexts: AHashMap<String, RenderContext>,
}

impl RenderSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_render_context(&mut self, scene_id: &str) -> Result<()> {
        if self.contexts.contains_key(scene_id) {
            return Err(Error::InvalidConfiguration(format!(
                "render context for scene '{scene_id}' already exists"
            )));
        }
        self.contexts
            .insert(scene_id.to_string(), RenderContext::default());
        debug!("created render context '{scene_id}'");
        Ok(())
    }

    /// Drops the context with every component left in it. Unknown ids are
    /// ignored.
    pub fn destroy_render_context(&mut self, scene_id: &str) {
        if let Some(ctx) = self.contexts.remove(scene_id) {
            debug!(
                "destroyed render context '{scene_id}' ({} components)",
                ctx.len()
            );
        }
    }

    pub fn has_context(&self, scene_id: &str) -> bool {
        self.contexts.contains_key(scene_id)
    }

    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    pub fn create_render_component(
        &mut self,
        layer: LayerId,
        scene_id: &str,
        widget_id: &str,
        drawable: Drawable,
        position: Position,
        params: DrawParams,
    ) -> Result<()> {
        let ctx = self.contexts.get_mut(scene_id).ok_or_else(|| {
            Error::ResourceNotFound(format!("no render context for scene '{scene_id}'"))
        })?;
        if ctx.find(widget_id).is_some() {
            return Err(Error::InvalidConfiguration(format!(
                "render component '{widget_id}' already exists in '{scene_id}'"
            )));
        }
        ctx.layers[layer.index()].push(RenderComponent {
            widget_id: widget_id.to_string(),
            layer,
            drawable,
            position,
            params,
        });
        Ok(())
    }

    /// Unknown scenes or widgets are ignored.
    pub fn destroy_render_component(&mut self, scene_id: &str, widget_id: &str) {
        if let Some(ctx) = self.contexts.get_mut(scene_id) {
            for layer in ctx.layers.iter_mut() {
                layer.retain(|c| c.widget_id != widget_id);
            }
        }
    }

    pub fn component(&self, scene_id: &str, widget_id: &str) -> Option<&RenderComponent> {
        self.contexts.get(scene_id)?.find(widget_id)
    }

    fn component_mut(&mut self, scene_id: &str, widget_id: &str) -> Result<&mut RenderComponent> {
        self.contexts
            .get_mut(scene_id)
            .and_then(|ctx| ctx.find_mut(widget_id))
            .ok_or_else(|| {
                Error::ResourceNotFound(format!(
                    "no render component '{widget_id}' in '{scene_id}'"
                ))
            })
    }

    /// Swaps the texture of a texture component. Returns whether anything
    /// changed.
    pub fn set_texture(
        &mut self,
        scene_id: &str,
        widget_id: &str,
        texture: Rc<Texture>,
    ) -> Result<bool> {
        let component = self.component_mut(scene_id, widget_id)?;
        match &component.drawable {
            Drawable::Texture(current) if Rc::ptr_eq(current, &texture) => return Ok(false),
            Drawable::Texture(_) => {}
            Drawable::Text { .. } => {
                return Err(Error::UnexpectedValue(format!(
                    "render component '{widget_id}' draws text, not a texture"
                )))
            }
        }
        component.drawable = Drawable::Texture(texture);
        Ok(true)
    }

    pub fn set_visible(&mut self, scene_id: &str, widget_id: &str, visible: bool) -> Result<()> {
        self.component_mut(scene_id, widget_id)?.params.visible = visible;
        Ok(())
    }

    pub fn component_count(&self, scene_id: &str) -> usize {
        self.contexts.get(scene_id).map_or(0, |ctx| ctx.len())
    }

    pub fn total_component_count(&self) -> usize {
        self.contexts.values().map(|ctx| ctx.len()).sum()
    }

    /// Components of a scene in paint order: layer by layer, then insertion
    /// order.
    pub fn draw_list(&self, scene_id: &str) -> Vec<&RenderComponent> {
        self.contexts
            .get(scene_id)
            .map(|ctx| ctx.layers.iter().flat_map(|l| l.iter()).collect())
            .unwrap_or_default()
    }

    /// Paints the visible components of a scene onto a transparent canvas.
    pub fn rasterize(&self, scene_id: &str, width: u32, height: u32) -> Result<Texture> {
        if !self.has_context(scene_id) {
            return Err(Error::ResourceNotFound(format!(
                "no render context for scene '{scene_id}'"
            )));
        }
        let mut canvas = Texture::new(width, height);
        for component in self.draw_list(scene_id) {
            if !component.params.visible {
                continue;
            }
            let mut inset = 0i64;
            let image = match &component.drawable {
                Drawable::Texture(texture) => {
                    let size = component.size();
                    let w = size.width.round().max(1.0) as u32;
                    let h = size.height.round().max(1.0) as u32;
                    let mut scaled = if (w, h) == texture.dimensions() {
                        (**texture).clone()
                    } else {
                        Texture::from_image(imageops::resize(
                            texture.image(),
                            w,
                            h,
                            FilterType::Nearest,
                        ))
                    };
                    if let Some(tint) = component.params.tint {
                        scaled.colorize(tint);
                    }
                    scaled
                }
                Drawable::Text {
                    font,
                    style,
                    contents,
                } => {
                    let thickness = style.outline_thickness.round().max(0.0) as u32;
                    inset = thickness as i64;
                    font.rasterize_outlined(
                        contents,
                        style.pixel_size(),
                        style.fill_color,
                        style.outline_color,
                        thickness,
                    )
                }
            };
            canvas.draw_over(
                image.image(),
                component.position.x.round() as i64 - inset,
                component.position.y.round() as i64 - inset,
            );
        }
        Ok(canvas)
    }
}
