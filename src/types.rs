// Core types for generation configuration and results

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Smallest number of images a single batch may request
pub const MIN_IMAGE_COUNT: u8 = 1;
/// Largest number of images a single batch may request
pub const MAX_IMAGE_COUNT: u8 = 10;

/// Background the object is rendered against
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundColor {
    #[default]
    Black,
    White,
    /// Rendered on pure black, alpha recovered on export
    Transparent,
}

impl BackgroundColor {
    pub fn as_str(&self) -> &str {
        match self {
            BackgroundColor::Black => "black",
            BackgroundColor::White => "white",
            BackgroundColor::Transparent => "transparent",
        }
    }
}

impl FromStr for BackgroundColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "black" => Ok(BackgroundColor::Black),
            "white" => Ok(BackgroundColor::White),
            "transparent" | "alpha" => Ok(BackgroundColor::Transparent),
            other => Err(Error::InvalidConfig(format!("unknown background: {}", other))),
        }
    }
}

/// Model tier selector
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    #[default]
    Standard,
    Pro,
}

impl ModelTier {
    /// Model id sent to the generation endpoint
    pub fn model_id(&self) -> &str {
        match self {
            ModelTier::Standard => "gemini-2.5-flash-image",
            ModelTier::Pro => "gemini-3-pro-image-preview",
        }
    }
}

impl FromStr for ModelTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "flash" => Ok(ModelTier::Standard),
            "pro" => Ok(ModelTier::Pro),
            other => Err(Error::InvalidConfig(format!("unknown model tier: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "3:4")]
    PortraitStandard,
}

impl AspectRatio {
    pub fn as_str(&self) -> &str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Wide => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Landscape => "4:3",
            AspectRatio::PortraitStandard => "3:4",
        }
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1:1" => Ok(AspectRatio::Square),
            "16:9" => Ok(AspectRatio::Wide),
            "9:16" => Ok(AspectRatio::Portrait),
            "4:3" => Ok(AspectRatio::Landscape),
            "3:4" => Ok(AspectRatio::PortraitStandard),
            other => Err(Error::InvalidConfig(format!("unsupported aspect ratio: {}", other))),
        }
    }
}

/// Camera angle requested in the prompt
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Viewpoint {
    #[default]
    #[serde(rename = "Isometric View")]
    Isometric,
    #[serde(rename = "Front View")]
    Front,
    #[serde(rename = "Top Down View")]
    Top,
    #[serde(rename = "Low Angle / Macro")]
    LowAngle,
    #[serde(rename = "Dynamic Cinematic Angle")]
    Dynamic,
}

impl Viewpoint {
    pub fn as_str(&self) -> &str {
        match self {
            Viewpoint::Isometric => "Isometric View",
            Viewpoint::Front => "Front View",
            Viewpoint::Top => "Top Down View",
            Viewpoint::LowAngle => "Low Angle / Macro",
            Viewpoint::Dynamic => "Dynamic Cinematic Angle",
        }
    }
}

impl FromStr for Viewpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "isometric" | "isometric view" => Ok(Viewpoint::Isometric),
            "front" | "front view" => Ok(Viewpoint::Front),
            "top" | "top down view" => Ok(Viewpoint::Top),
            "low-angle" | "macro" | "low angle / macro" => Ok(Viewpoint::LowAngle),
            "dynamic" | "dynamic cinematic angle" => Ok(Viewpoint::Dynamic),
            other => Err(Error::InvalidConfig(format!("unknown viewpoint: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GlassStyle {
    #[default]
    Clear,
    Frosted,
    Smoked,
}

impl GlassStyle {
    /// Display name of the glass layer for this style
    pub fn layer_name(&self) -> &str {
        match self {
            GlassStyle::Clear => "极致通透 (Invisible Glass)",
            GlassStyle::Frosted => "磨砂玻璃 (Frosted Glass)",
            GlassStyle::Smoked => "烟熏玻璃 (Smoked Glass)",
        }
    }
}

impl FromStr for GlassStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "clear" => Ok(GlassStyle::Clear),
            "frosted" => Ok(GlassStyle::Frosted),
            "smoked" => Ok(GlassStyle::Smoked),
            other => Err(Error::InvalidConfig(format!("unknown glass style: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetalTexture {
    #[default]
    Matte,
    Brushed,
    Patterned,
}

impl MetalTexture {
    pub fn label(&self) -> &str {
        match self {
            MetalTexture::Matte => "磨砂",
            MetalTexture::Brushed => "拉丝",
            MetalTexture::Patterned => "纹理",
        }
    }
}

impl FromStr for MetalTexture {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "matte" => Ok(MetalTexture::Matte),
            "brushed" => Ok(MetalTexture::Brushed),
            "patterned" => Ok(MetalTexture::Patterned),
            other => Err(Error::InvalidConfig(format!("unknown metal texture: {}", other))),
        }
    }
}

/// The solid anchor material
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SecondaryMaterial {
    #[default]
    Silver,
    Plaster,
}

impl FromStr for SecondaryMaterial {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "silver" => Ok(SecondaryMaterial::Silver),
            "plaster" => Ok(SecondaryMaterial::Plaster),
            other => Err(Error::InvalidConfig(format!("unknown material: {}", other))),
        }
    }
}

/// One of the three material layers (glass, solid anchor, accent)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialLayer {
    pub id: String,
    pub name: String,
    /// Share of the composition in percent (0-100)
    pub ratio: u8,
}

impl MaterialLayer {
    pub fn new(id: impl Into<String>, name: impl Into<String>, ratio: u8) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ratio,
        }
    }
}

/// Accent presets offered by the controls: (hex value, label)
pub const ACCENT_PRESETS: [(&str, &str); 7] = [
    ("#070808", "暗夜黑金"),
    ("#00b7d0", "极光青"),
    ("#FF5500", "熔岩橙"),
    ("#9900FF", "电光紫"),
    ("#FF00CC", "霓虹粉"),
    ("#CCFF00", "酸性绿"),
    ("#FFD700", "流光金"),
];

/// Default accent: dark metal
pub const DEFAULT_ACCENT: &str = "#070808";

/// An inline raster image with its MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageData {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Reference image held fully in memory as base64
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceImage {
    pub mime_type: String,
    /// Base64 payload without the data URL header
    pub data: String,
}

impl ReferenceImage {
    /// Read an image file into memory
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let mime = mime_for_path(path).unwrap_or("image/png");
        Ok(Self::from_bytes(mime, &bytes))
    }

    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    /// Parse a `data:<mime>;base64,<payload>` URL
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidReference("missing data: scheme".into()))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidReference("missing payload separator".into()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::InvalidReference("only base64 data URLs are supported".into()))?;
        if data.is_empty() {
            return Err(Error::InvalidReference("empty payload".into()));
        }

        let reference = Self {
            mime_type: if mime_type.is_empty() {
                "image/png".to_string()
            } else {
                mime_type.to_string()
            },
            data: data.to_string(),
        };
        reference.decode_bytes()?;
        Ok(reference)
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(self.data.as_bytes())
            .map_err(|e| Error::InvalidReference(e.to_string()))
    }
}

impl From<&ImageData> for ReferenceImage {
    fn from(image: &ImageData) -> Self {
        Self::from_bytes(image.mime_type.clone(), &image.bytes)
    }
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Everything the user can configure before a generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<ReferenceImage>,
    pub background: BackgroundColor,
    pub model: ModelTier,
    pub aspect_ratio: AspectRatio,
    pub viewpoint: Viewpoint,
    pub image_count: u8,
    pub secondary_material: SecondaryMaterial,
    pub metal_texture: MetalTexture,
    pub glass_style: GlassStyle,
    /// Preset key or hex color
    pub accent_color: String,
    pub materials: [MaterialLayer; 3],
    /// 1 (detailed / concrete) to 5 (abstract / minimal)
    pub simplicity_level: u8,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            reference_image: None,
            background: BackgroundColor::Black,
            model: ModelTier::Standard,
            aspect_ratio: AspectRatio::Square,
            viewpoint: Viewpoint::Isometric,
            image_count: 1,
            secondary_material: SecondaryMaterial::Silver,
            metal_texture: MetalTexture::Matte,
            glass_style: GlassStyle::Clear,
            accent_color: DEFAULT_ACCENT.to_string(),
            materials: [
                MaterialLayer::new("1", "色散玻璃 (Colorless Glass)", 60),
                MaterialLayer::new("2", "哑光银 (Matte Silver)", 30),
                MaterialLayer::new("3", "暗夜黑金 (Black Metal)", 10),
            ],
            simplicity_level: 3,
        }
    }
}

impl GenerationConfig {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_background(mut self, background: BackgroundColor) -> Self {
        self.background = background;
        self
    }

    pub fn with_image_count(mut self, count: u8) -> Self {
        self.image_count = count;
        self
    }

    pub fn with_reference_image(mut self, reference: ReferenceImage) -> Self {
        self.reference_image = Some(reference);
        self
    }

    /// True when a reference image biases the request (remix mode)
    pub fn is_remix(&self) -> bool {
        self.reference_image.is_some()
    }

    /// Check the configuration before any request is issued
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() && self.reference_image.is_none() {
            return Err(Error::Validation(
                "a prompt or a reference image is required".into(),
            ));
        }

        self.validate_ranges()
    }

    /// Range checks that hold with or without a prompt
    pub fn validate_ranges(&self) -> Result<()> {
        if !(MIN_IMAGE_COUNT..=MAX_IMAGE_COUNT).contains(&self.image_count) {
            return Err(Error::InvalidConfig(format!(
                "image count must be between {} and {}, got {}",
                MIN_IMAGE_COUNT, MAX_IMAGE_COUNT, self.image_count
            )));
        }

        if !(1..=5).contains(&self.simplicity_level) {
            return Err(Error::InvalidConfig(format!(
                "simplicity level must be between 1 and 5, got {}",
                self.simplicity_level
            )));
        }

        if let Some(layer) = self.materials.iter().find(|m| m.ratio > 100) {
            return Err(Error::InvalidConfig(format!(
                "ratio of {} exceeds 100%",
                layer.name
            )));
        }

        Ok(())
    }
}

/// A generated image together with the configuration that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub id: String,
    pub image: ImageData,
    pub prompt: String,
    /// Unix timestamp in milliseconds
    pub created_at: i64,
    pub config: GenerationConfig,
}

impl GeneratedImage {
    /// Wrap generation output with a snapshot of the config
    pub fn new(image: ImageData, config: &GenerationConfig) -> Self {
        Self {
            id: random_id(),
            image,
            prompt: config.prompt.clone(),
            created_at: chrono::Utc::now().timestamp_millis(),
            config: config.clone(),
        }
    }
}

impl fmt::Display for GeneratedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} ({} bytes)",
            self.id,
            self.config.background.as_str(),
            self.prompt,
            self.image.bytes.len()
        )
    }
}

/// Random 9 character base36 id
fn random_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..9)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
