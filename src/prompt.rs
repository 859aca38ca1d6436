// Prompt assembly - turns a GenerationConfig into the natural-language request

use crate::types::{
    BackgroundColor, GenerationConfig, GlassStyle, MetalTexture, SecondaryMaterial,
};

/// Build the full prompt sent to the generation endpoint
pub fn build_prompt(config: &GenerationConfig) -> String {
    format!(
        r#"Create a 3D illustration of: {subject}

{style}

VIEWPOINT: {viewpoint}

{materials}

COMPOSITION:
- Central composition. The object is floating.
- Ratio: {glass}% Glass, {solid}% Solid Material, {accent}% Accent Color.

BACKGROUND:
{background}

{lighting}

RENDER QUALITY:
- Octane Render / Redshift style.
- Raytracing enabled. Caustics enabled.
- 8k resolution, ultra-sharp.
- Semi-transparent glass materials.
"#,
        subject = config.prompt,
        style = style_instruction(config.simplicity_level),
        viewpoint = config.viewpoint.as_str(),
        materials = material_system(config),
        glass = config.materials[0].ratio,
        solid = config.materials[1].ratio,
        accent = config.materials[2].ratio,
        background = background_instruction(config.background),
        lighting = lighting_instruction(config.background),
    )
}

/// Style guidelines, from 1 (concrete) to 5 (abstract)
pub fn style_instruction(level: u8) -> &'static str {
    match level {
        1 => {
            "STYLE GUIDELINES (CONCRETE & REALISTIC):
- High-fidelity industrial design product render.
- Realistic functional details, screws, seams, and bevels.
- Clear mechanical logic.
- Professional studio product photography.
- The object must look manufacturable."
        }
        2 => {
            "STYLE GUIDELINES (CLEAN GEOMETRY):
- Modern tech design, reduced visual noise.
- Focus on the interplay of basic geometric forms (Sphere, Cube, Cylinder).
- Sleek, polished, recognizable silhouette.
- Distinct material separation between Glass and Metal/Plaster."
        }
        3 => {
            "STYLE GUIDELINES (FUTURE AESTHETICS):
- Balanced minimalist design. Pure geometric foundations.
- Smooth surfaces, sophisticated lighting.
- Artistic 3D icon style.
- High-end conceptual design (Apple/Braun aesthetic but futuristic)."
        }
        4 => {
            "STYLE GUIDELINES (EXTREME MINIMALISM):
- Reductionist approach. Use the fewest lines possible.
- Focus purely on silhouette, light, and material refraction.
- Very little surface detail, large negative spaces.
- Iconic and symbolic representation."
        }
        5 => {
            "STYLE GUIDELINES (ABSTRACT ART):
- DECONSTRUCTED FORMS.
- Abstract composition, museum quality art installation.
- Non-representational, focus on the refractive properties of light.
- Ethereal, avant-garde."
        }
        _ => "STYLE GUIDELINES: Clean, modern, minimalist 3D render.",
    }
}

fn glass_description(style: GlassStyle) -> &'static str {
    match style {
        GlassStyle::Frosted => {
            "   - **PHYSICS**: High transmission, High Roughness (Blur).
   - **VISUAL**: Matte, Translucent, Soft Blur. Looks like frosted acrylic or ice.
   - **LIGHT**: Diffuses light softly. No sharp internal reflections."
        }
        GlassStyle::Smoked => {
            "   - **PHYSICS**: Tinted Dark Grey Glass.
   - **VISUAL**: Semi-transparent, sunglasses aesthetic, privacy glass.
   - **LIGHT**: Absorbs light. High reflectivity on the surface."
        }
        GlassStyle::Clear => {
            "   - **PHYSICS**: 100% Transmission, 0% Diffuse. The body is INVISIBLE.
   - **VISUAL**: It should look like \"Solid Air\" or \"Crystal Clear Water\". NO grey film, NO milky opacity.
   - **EDGES**: Defined ONLY by high-contrast RIM LIGHTING (Cool White) and REFRACTION.
   - **DISPERSION**: Strong CHROMATIC ABERRATION (Prismatic Rainbow split) at the edges."
        }
    }
}

fn metal_description(texture: MetalTexture) -> &'static str {
    match texture {
        MetalTexture::Brushed => {
            "   - **MATERIAL**: Brushed Aluminum / Stainless Steel.
   - **TEXTURE**: Visible hairline scratches, anisotropic roughness.
   - **VISUAL**: Industrial, sleek, directional reflections."
        }
        MetalTexture::Patterned => {
            "   - **MATERIAL**: Knurled Metal / Geometric Patterned Steel.
   - **TEXTURE**: CNC Milled texture, diamond cut, knurled, or hexagonal grid pattern on the metal.
   - **VISUAL**: Tactile, complex, high-tech industrial detail. High friction surface."
        }
        MetalTexture::Matte => {
            "   - **MATERIAL**: Sandblasted Silver / Satin Aluminum.
   - **TEXTURE**: Fine grain noise, soft touch.
   - **VISUAL**: Diffused metallic glow. No sharp reflections. Apple Macbook finish."
        }
    }
}

fn anchor_description(config: &GenerationConfig) -> String {
    match config.secondary_material {
        SecondaryMaterial::Plaster => "   - **MATERIAL**: Pure White Plaster / Gypsum.
   - **TEXTURE**: Matte, slightly porous, chalky, dry. ZERO gloss.
   - **VISUAL**: High contrast against the glass. Like an architectural model.
   - **COLOR**: #FFFFFF (White)."
            .to_string(),
        SecondaryMaterial::Silver => format!(
            "   - **COLOR**: Silver / Light Grey.\n{}",
            metal_description(config.metal_texture)
        ),
    }
}

/// Hex sent to the model for an accent key; unknown values pass through
fn accent_hex(color: &str) -> &str {
    match color {
        "cyan" => "#00FFFF",
        "orange" => "#FF5500",
        "purple" => "#9900FF",
        "pink" => "#FF00CC",
        "lime" => "#CCFF00",
        "gold" => "#FFD700",
        "#070808" => "#111111",
        other => other,
    }
}

fn accent_description(color: &str) -> String {
    let hex = accent_hex(color);
    let mut out = format!(
        "   - **MATERIAL**: Anodized Metallic Finish.
   - **VISUAL**: Metallic reflection. Satin or Polished Metal finish.
   - **COLOR**: {}. Vivid and saturated.",
        hex
    );
    if hex == "#111111" || color == "#070808" {
        out.push_str("\n   - **SPECULARITY**: High gloss black metal, like liquid obsidian.");
    }
    out
}

fn material_system(config: &GenerationConfig) -> String {
    format!(
        "MATERIAL SYSTEM:

1. **THE GLASS (THE HERO)**:
{}
   - **OPACITY**: The glass MUST be semi-transparent.
   - **TRANSPARENCY**: The glass parts MUST look transparent.

2. **THE SOLID ANCHOR**:
{}

3. **THE ACCENT**:
{}",
        glass_description(config.glass_style),
        anchor_description(config),
        accent_description(&config.accent_color),
    )
}

pub fn background_instruction(background: BackgroundColor) -> &'static str {
    match background {
        BackgroundColor::Transparent => {
            "PURE #000000 BLACK BACKGROUND. The object must be isolated in darkness. High contrast for alpha separation. Do not render any floor or environment. The glass must refract the black background."
        }
        BackgroundColor::Black => {
            "Pure solid #000000 VOID BLACK background. The object floats in deep space darkness."
        }
        BackgroundColor::White => {
            "Pure solid #FFFFFF WHITE background. High key studio photography."
        }
    }
}

fn lighting_instruction(background: BackgroundColor) -> &'static str {
    match background {
        BackgroundColor::Transparent => {
            "LIGHTING: Bright, contrasty studio lighting. Sharp rim lights. No environment reflections. High contrast for easy background removal."
        }
        BackgroundColor::Black => {
            "LIGHTING:
- dramatic chiaroscuro lighting.
- Rim lights highlighting the edges of the glass.
- Subsurface scattering in the frosted parts.
- Reflections of a minimal studio environment (Softboxes)."
        }
        BackgroundColor::White => {
            "LIGHTING:
- Global Illumination. Soft shadows.
- Clean reflections.
- Bright and airy."
        }
    }
}
