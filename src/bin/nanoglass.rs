// nanoglass - CLI for generating glass/metal illustrations

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use nanoglass::{
    AppConfig, AspectRatio, BackgroundColor, GeminiClient, GlassStyle, MetalTexture, ModelTier,
    ReferenceImage, SecondaryMaterial, Session, Viewpoint, export,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate minimalist glass & metal illustrations", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/nanoglass/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate images and export them
    Generate(GenerateArgs),

    /// Recover transparency from a render on a pure black background
    Extract {
        /// Input image
        input: PathBuf,

        /// Output PNG (default: <input>-transparent.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Subject of the illustration
    prompt: Option<String>,

    /// Reference image to remix, a file path or a base64 data URL
    #[arg(short, long)]
    reference: Option<String>,

    /// black, white or transparent
    #[arg(short, long)]
    background: Option<BackgroundColor>,

    /// Use the pro model tier
    #[arg(long)]
    pro: bool,

    /// 1:1, 16:9, 9:16, 4:3 or 3:4
    #[arg(short, long)]
    aspect_ratio: Option<AspectRatio>,

    /// isometric, front, top, low-angle or dynamic
    #[arg(long)]
    viewpoint: Option<Viewpoint>,

    /// Number of images to request (1-10)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u8).range(1..=10))]
    count: Option<u8>,

    /// 1 (concrete) to 5 (abstract)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
    simplicity: Option<u8>,

    /// clear, frosted or smoked
    #[arg(long)]
    glass: Option<GlassStyle>,

    /// silver or plaster
    #[arg(long)]
    material: Option<SecondaryMaterial>,

    /// matte, brushed or patterned
    #[arg(long)]
    metal: Option<MetalTexture>,

    /// Accent preset hex or custom hex color
    #[arg(long)]
    accent: Option<String>,

    /// Glass, solid and accent shares, e.g. 60,30,10
    #[arg(long, value_delimiter = ',')]
    ratios: Option<Vec<u8>>,

    /// Output directory
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Feed the first result back as reference for N more rounds
    #[arg(long, default_value = "0")]
    remix: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("nanoglass={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("loaded .env from {}", path.display()),
        Err(e) => tracing::debug!(".env not loaded: {}", e),
    }

    match cli.command {
        Command::Generate(args) => run_generate(cli.config.as_deref(), args).await,
        Command::Extract { input, output } => run_extract(&input, output),
        Command::Init { force } => run_init(cli.config, force),
    }
}

async fn run_generate(config_path: Option<&Path>, args: GenerateArgs) -> anyhow::Result<()> {
    let config = AppConfig::load_or_default(config_path)?;
    let mut session = Session::new(config.defaults.clone());
    apply_overrides(&mut session, &args)?;

    let client = GeminiClient::from_config(&config.api)?;
    let out_dir = args.out.clone().unwrap_or_else(|| config.output.dir.clone());

    println!(
        "🔮 Generating {} image(s) with {}{}",
        session.config.image_count,
        session.config.model.model_id(),
        if session.config.is_remix() { " (remix)" } else { "" }
    );

    for round in 0..=args.remix {
        if round > 0 {
            let Some(latest) = session.history.first().cloned() else {
                break;
            };
            println!("\n🔁 Remix round {} from {}", round, latest.id);
            session.remix(&latest);
        }

        let added = session.generate(&client).await;
        if let Some(error) = &session.error {
            if session.history.is_empty() {
                bail!("{}", error);
            }
            eprintln!("❌ {}", error);
            break;
        }

        println!("✓ Received {} of {} image(s)", added, session.config.image_count);
        for image in &session.history[..added] {
            let outcome = export::export_image(image, &out_dir, &config.output.prefix)?;
            match &outcome {
                export::ExportOutcome::Fallback(path) => println!(
                    "  - {} -> {} (transparency failed, saved original)",
                    image,
                    path.display()
                ),
                _ => println!("  - {} -> {}", image, outcome.path().display()),
            }
        }
    }

    Ok(())
}

fn apply_overrides(session: &mut Session, args: &GenerateArgs) -> anyhow::Result<()> {
    if let Some(prompt) = &args.prompt {
        session.set_prompt(prompt.clone());
    }
    if let Some(source) = &args.reference {
        let reference = if source.starts_with("data:") {
            ReferenceImage::from_data_url(source)
        } else {
            ReferenceImage::from_path(Path::new(source))
        }
        .with_context(|| format!("failed to read reference image {}", source))?;
        session.set_reference_image(reference);
    }
    if let Some(background) = args.background {
        session.config.background = background;
    }
    if args.pro {
        session.config.model = ModelTier::Pro;
    }
    if let Some(ratio) = args.aspect_ratio {
        session.config.aspect_ratio = ratio;
    }
    if let Some(viewpoint) = args.viewpoint {
        session.config.viewpoint = viewpoint;
    }
    if let Some(count) = args.count {
        session.config.image_count = count;
    }
    if let Some(level) = args.simplicity {
        session.config.simplicity_level = level;
    }
    if let Some(style) = args.glass {
        session.set_glass_style(style);
    }
    if let Some(texture) = args.metal {
        session.set_metal_texture(texture);
    }
    if let Some(material) = args.material {
        session.set_secondary_material(material);
    }
    if let Some(accent) = &args.accent {
        session.set_accent_color(accent.clone());
    }
    if let Some(ratios) = &args.ratios {
        if ratios.len() != 3 {
            bail!("--ratios takes three values (glass,solid,accent), got {}", ratios.len());
        }
        for (index, ratio) in ratios.iter().enumerate() {
            session.set_material_ratio(index, *ratio)?;
        }
    }
    Ok(())
}

fn run_extract(input: &Path, output: Option<PathBuf>) -> anyhow::Result<()> {
    let output = output.unwrap_or_else(|| {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        input.with_file_name(format!("{}-transparent.png", stem))
    });

    match export::extract_file(input, &output)? {
        export::ExportOutcome::Fallback(path) => {
            eprintln!("⚠ Could not process {}, copied original to {}", input.display(), path.display())
        }
        outcome => println!("Image saved to: {}", outcome.path().display()),
    }
    Ok(())
}

fn run_init(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = match path.or_else(AppConfig::default_path) {
        Some(p) => p,
        None => bail!("no config directory available, pass --config"),
    };

    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    AppConfig::default().to_file(&path)?;
    println!("Config written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_args(argv: &[&str]) -> GenerateArgs {
        let mut full = vec!["nanoglass", "generate"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Generate(args) => args,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_ratios_from_comma_list() {
        let args = generate_args(&["orb", "--ratios", "60,30,10"]);
        assert_eq!(args.ratios, Some(vec![60, 30, 10]));

        let mut session = Session::new(Default::default());
        apply_overrides(&mut session, &args).unwrap();
        let ratios: Vec<u8> = session.config.materials.iter().map(|m| m.ratio).collect();
        assert_eq!(ratios, vec![60, 30, 10]);
        assert_eq!(session.config.prompt, "orb");
    }

    #[test]
    fn test_ratios_need_three_values() {
        let args = generate_args(&["orb", "--ratios", "60,30"]);
        let mut session = Session::new(Default::default());
        assert!(apply_overrides(&mut session, &args).is_err());
    }

    #[test]
    fn test_reference_from_data_url() {
        let args = generate_args(&["--reference", "data:image/jpeg;base64,AAEC"]);
        let mut session = Session::new(Default::default());
        apply_overrides(&mut session, &args).unwrap();

        let reference = session.config.reference_image.as_ref().unwrap();
        assert_eq!(reference.mime_type, "image/jpeg");
        assert!(session.config.is_remix());
    }

    #[test]
    fn test_count_out_of_range_rejected() {
        let argv = ["nanoglass", "generate", "orb", "-n", "11"];
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
