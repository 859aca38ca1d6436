//! Session controller.
//!
//! Holds the current configuration and the generation history for the
//! lifetime of the process. All mutation goes through the action methods
//! below; nothing is persisted.

use crate::error::{Error, Result};
use crate::gemini::ImageBackend;
use crate::generate::generate_batch;
use crate::types::{
    ACCENT_PRESETS, GeneratedImage, GenerationConfig, GlassStyle, MetalTexture, ReferenceImage,
    SecondaryMaterial,
};

/// Shown when neither a prompt nor a reference image is set
pub const MSG_MISSING_INPUT: &str = "请输入插画主题或上传参考图。";
/// Shown when every request in a batch came back without an image
pub const MSG_NO_DATA: &str = "生成失败，模型未返回数据。请检查网络或减少数量。";

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub config: GenerationConfig,
    /// Newest first
    pub history: Vec<GeneratedImage>,
    /// User-visible message from the last action, if it failed
    pub error: Option<String>,
}

impl Session {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Run one generation batch with the current config.
    ///
    /// Returns the number of images added to the history. Failures are
    /// reported through `self.error`, never by losing history.
    pub async fn generate(&mut self, backend: &dyn ImageBackend) -> usize {
        if self.config.prompt.trim().is_empty() && self.config.reference_image.is_none() {
            self.error = Some(MSG_MISSING_INPUT.to_string());
            return 0;
        }

        self.error = None;

        let snapshot = self.config.clone();
        let added = match generate_batch(backend, &snapshot).await {
            Ok(images) if images.is_empty() => {
                self.error = Some(MSG_NO_DATA.to_string());
                0
            }
            Ok(images) => {
                let new: Vec<GeneratedImage> = images
                    .into_iter()
                    .map(|image| GeneratedImage::new(image, &snapshot))
                    .collect();
                let count = new.len();
                self.history.splice(0..0, new);
                count
            }
            Err(e) => {
                tracing::error!("generation batch failed: {}", e);
                self.error = Some(e.to_string());
                0
            }
        };

        added
    }

    /// Drop all history and the current prompt
    pub fn clear(&mut self) {
        self.history.clear();
        self.config.prompt.clear();
    }

    /// Reuse a generated image as the reference for the next request
    pub fn remix(&mut self, image: &GeneratedImage) {
        self.config = image.config.clone();
        self.config.reference_image = Some(ReferenceImage::from(&image.image));
        self.config.prompt = image.prompt.clone();
    }

    /// Case-insensitive prompt search
    pub fn search(&self, term: &str) -> Vec<&GeneratedImage> {
        let term = term.to_lowercase();
        self.history
            .iter()
            .filter(|img| img.prompt.to_lowercase().contains(&term))
            .collect()
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.config.prompt = prompt.into();
    }

    pub fn set_reference_image(&mut self, reference: ReferenceImage) {
        self.config.reference_image = Some(reference);
    }

    pub fn clear_reference_image(&mut self) {
        self.config.reference_image = None;
    }

    pub fn set_secondary_material(&mut self, material: SecondaryMaterial) {
        self.config.secondary_material = material;
        self.config.materials[1].name = match material {
            SecondaryMaterial::Silver => silver_name(self.config.metal_texture),
            SecondaryMaterial::Plaster => "白色石膏 (White Plaster)".to_string(),
        };
    }

    pub fn set_metal_texture(&mut self, texture: MetalTexture) {
        self.config.metal_texture = texture;
        if self.config.secondary_material == SecondaryMaterial::Silver {
            self.config.materials[1].name = silver_name(texture);
        }
    }

    /// Preset hex (exact match) or any custom hex
    pub fn set_accent_color(&mut self, color: impl Into<String>) {
        let color = color.into();
        self.config.materials[2].name = ACCENT_PRESETS
            .iter()
            .find(|(value, _)| *value == color)
            .map(|(_, label)| format!("{}金属", label))
            .unwrap_or_else(|| format!("自定义金属 ({})", color));
        self.config.accent_color = color;
    }

    pub fn set_glass_style(&mut self, style: GlassStyle) {
        self.config.glass_style = style;
        self.config.materials[0].name = style.layer_name().to_string();
    }

    /// Set one layer's share; layers are 0 glass, 1 solid, 2 accent
    pub fn set_material_ratio(&mut self, index: usize, ratio: u8) -> Result<()> {
        if ratio > 100 {
            return Err(Error::InvalidConfig(format!("ratio {} exceeds 100%", ratio)));
        }
        let layer = self
            .config
            .materials
            .get_mut(index)
            .ok_or_else(|| Error::InvalidConfig(format!("no material layer {}", index)))?;
        layer.ratio = ratio;
        Ok(())
    }
}

fn silver_name(texture: MetalTexture) -> String {
    format!("银色金属 ({})", texture.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::tests::{Outcome, ScriptedBackend};
    use crate::types::{BackgroundColor, ImageData};
    use std::sync::atomic::Ordering;

    fn session(prompt: &str, count: u8) -> Session {
        let mut session = Session::new(GenerationConfig::new(prompt).with_image_count(count));
        session.config.background = BackgroundColor::Transparent;
        session
    }

    #[tokio::test]
    async fn test_partial_batch_grows_history() {
        let backend = ScriptedBackend::new(vec![
            Outcome::Image(1, 0),
            Outcome::Fail,
            Outcome::Image(2, 0),
        ]);
        let mut session = session("glass orb", 3);

        assert_eq!(session.generate(&backend).await, 2);
        assert_eq!(session.history.len(), 2);
        assert!(session.error.is_none());
        assert!(session.history.iter().all(|img| img.prompt == "glass orb"));
        assert!(session
            .history
            .iter()
            .all(|img| img.config.background == BackgroundColor::Transparent));
    }

    #[tokio::test]
    async fn test_failed_batch_keeps_history() {
        let mut session = session("glass orb", 1);
        session.generate(&ScriptedBackend::new(vec![Outcome::Image(7, 0)])).await;
        let before = session.history.clone();

        session.config.image_count = 2;
        let backend = ScriptedBackend::new(vec![Outcome::Fail, Outcome::Fail]);
        assert_eq!(session.generate(&backend).await, 0);
        assert_eq!(session.history, before);
        assert_eq!(session.error.as_deref(), Some(MSG_NO_DATA));
    }

    #[tokio::test]
    async fn test_new_images_are_prepended() {
        let mut session = session("first", 1);
        session.generate(&ScriptedBackend::new(vec![Outcome::Image(1, 0)])).await;
        session.set_prompt("second");
        session.generate(&ScriptedBackend::new(vec![Outcome::Image(2, 0)])).await;

        let prompts: Vec<&str> = session.history.iter().map(|i| i.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_missing_input_does_not_call_backend() {
        let backend = ScriptedBackend::new(vec![]);
        let mut session = session("  ", 1);

        assert_eq!(session.generate(&backend).await, 0);
        assert_eq!(session.error.as_deref(), Some(MSG_MISSING_INPUT));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_config_surfaces_message() {
        let backend = ScriptedBackend::new(vec![]);
        let mut session = session("orb", 12);

        assert_eq!(session.generate(&backend).await, 0);
        assert!(session.error.as_deref().unwrap().contains("image count"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remix_uses_image_as_reference() {
        let mut config = GenerationConfig::new("crystal tower");
        config.simplicity_level = 5;
        let image = GeneratedImage::new(ImageData::new("image/png", vec![1, 2, 3]), &config);

        let mut session = Session::default();
        session.set_prompt("something else");
        session.remix(&image);

        assert_eq!(session.config.prompt, "crystal tower");
        assert_eq!(session.config.simplicity_level, 5);
        let reference = session.config.reference_image.as_ref().unwrap();
        assert_eq!(reference.decode_bytes().unwrap(), vec![1, 2, 3]);
        assert!(session.config.is_remix());
    }

    #[tokio::test]
    async fn test_clear_and_search() {
        let mut session = session("Glass Orb", 2);
        session
            .generate(&ScriptedBackend::new(vec![Outcome::Image(1, 0), Outcome::Image(2, 0)]))
            .await;

        assert_eq!(session.search("orb").len(), 2);
        assert!(session.search("cube").is_empty());

        session.clear();
        assert!(session.history.is_empty());
        assert!(session.config.prompt.is_empty());
    }

    #[test]
    fn test_layer_names_follow_controls() {
        let mut session = Session::default();

        session.set_metal_texture(MetalTexture::Brushed);
        assert_eq!(session.config.materials[1].name, "银色金属 (拉丝)");

        session.set_secondary_material(SecondaryMaterial::Plaster);
        assert_eq!(session.config.materials[1].name, "白色石膏 (White Plaster)");
        session.set_metal_texture(MetalTexture::Patterned);
        assert_eq!(session.config.materials[1].name, "白色石膏 (White Plaster)");

        session.set_secondary_material(SecondaryMaterial::Silver);
        assert_eq!(session.config.materials[1].name, "银色金属 (纹理)");

        session.set_accent_color("#00b7d0");
        assert_eq!(session.config.materials[2].name, "极光青金属");
        session.set_accent_color("#123456");
        assert_eq!(session.config.materials[2].name, "自定义金属 (#123456)");
        assert_eq!(session.config.accent_color, "#123456");
        session.set_accent_color("#00B7D0");
        assert_eq!(session.config.materials[2].name, "自定义金属 (#00B7D0)");

        session.set_glass_style(GlassStyle::Frosted);
        assert_eq!(session.config.materials[0].name, "磨砂玻璃 (Frosted Glass)");
    }

    #[test]
    fn test_material_ratio_bounds() {
        let mut session = Session::default();
        session.set_material_ratio(2, 25).unwrap();
        assert_eq!(session.config.materials[2].ratio, 25);
        assert!(session.set_material_ratio(3, 10).is_err());
        assert!(session.set_material_ratio(0, 101).is_err());
    }
}
