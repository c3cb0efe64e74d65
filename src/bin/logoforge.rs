use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use logoforge::{
    Command as Adjustment, EffectStyle, Engine, EngineConfig, ExportFormat, FontId, Rgba8,
    SessionKey,
};

#[derive(Parser, Debug)]
#[command(name = "logoforge", version)]
struct Cli {
    /// Log at debug level (`RUST_LOG` overrides).
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one session: upload, place text, apply adjustments, finalize.
    Compose(ComposeArgs),
    /// List the registered fonts.
    Fonts(EngineArgs),
    /// Print the effective configuration as JSON.
    Config(EngineArgs),
}

#[derive(Parser, Debug)]
struct EngineArgs {
    /// JSON config file; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of .ttf/.otf/.ttc files (overrides the config file).
    #[arg(long)]
    fonts_dir: Option<PathBuf>,

    /// Render worker threads (overrides the config file).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Background image.
    #[arg(long)]
    image: PathBuf,

    /// Logo text.
    #[arg(long)]
    text: String,

    /// Adjustment, repeatable, e.g. `--cmd "move 10 0" --cmd "effect glow"`.
    #[arg(long = "cmd")]
    cmds: Vec<String>,

    /// Starting font.
    #[arg(long)]
    font: Option<String>,

    /// Starting text color (`#rrggbb[aa]` or a name).
    #[arg(long)]
    color: Option<Rgba8>,

    /// Starting effect.
    #[arg(long)]
    effect: Option<EffectStyle>,

    /// Frame the text with a symbol; pass `random` for a seeded pick.
    #[arg(long)]
    decorate: Option<String>,

    /// Refuse text with anything but letters, digits and spaces.
    #[arg(long, default_value_t = false)]
    alphanumeric: bool,

    /// Output path; `.jpg`/`.jpeg` selects JPEG unless `--format` is given.
    #[arg(long)]
    out: PathBuf,

    /// Output format (`png` or `jpeg`).
    #[arg(long)]
    format: Option<String>,

    /// Also write a PNG preview after every step into this directory.
    #[arg(long)]
    preview_dir: Option<PathBuf>,

    /// Before finalizing, write one PNG per effect style into this directory.
    #[arg(long)]
    variants_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    runtime.block_on(async move {
        match cli.cmd {
            Command::Compose(args) => cmd_compose(args).await,
            Command::Fonts(args) => cmd_fonts(args),
            Command::Config(args) => cmd_config(args),
        }
    })
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(args: &EngineArgs) -> anyhow::Result<EngineConfig> {
    let mut cfg = match &args.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = &args.fonts_dir {
        cfg.fonts_dir = Some(dir.clone());
    }
    if let Some(n) = args.threads {
        cfg.render_threads = Some(n);
    }
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_fonts(args: EngineArgs) -> anyhow::Result<()> {
    let engine = Engine::new(load_config(&args)?)?;
    for id in engine.font_ids() {
        println!("{id}");
    }
    Ok(())
}

fn cmd_config(args: EngineArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&cfg).context("serialize config")?
    );
    Ok(())
}

async fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(&args.engine)?;
    cfg.export.format = output_format(args.format.as_deref(), &args.out)?;
    cfg.alphanumeric_text |= args.alphanumeric;
    let engine = Engine::new(cfg)?;

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("read image '{}'", args.image.display()))?;
    let key = SessionKey::new(format!("cli-{}", args.image.display()));

    let created = engine.submit_image(&key, &bytes).await?;
    tracing::info!(width = created.width, height = created.height, "background loaded");

    let mut adjustments = Vec::new();
    if let Some(font) = &args.font {
        adjustments.push(Adjustment::SetFont {
            font: FontId::new(font.as_str()),
        });
    }
    if let Some(rgba) = args.color {
        adjustments.push(Adjustment::SetColor { rgba });
    }
    if let Some(style) = args.effect {
        adjustments.push(Adjustment::SetEffect { style });
    }
    if let Some(symbol) = &args.decorate {
        let raw = format!("decorate {symbol}");
        adjustments.push(
            raw.parse()
                .with_context(|| format!("parse decoration '{symbol}'"))?,
        );
    }
    for raw in &args.cmds {
        adjustments.push(
            raw.parse()
                .with_context(|| format!("parse adjustment '{raw}'"))?,
        );
    }

    if let Some(dir) = &args.preview_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create preview dir '{}'", dir.display()))?;
    }

    let first = engine.submit_text(&key, &args.text).await?;
    tracing::info!(
        font_size = first.layout.font_size,
        fitted = first.layout.fitted,
        "text placed"
    );
    write_preview(args.preview_dir.as_deref(), 0, &first.image)?;

    for (i, cmd) in adjustments.into_iter().enumerate() {
        let kind = cmd.kind();
        let frame = engine.submit_adjustment(&key, cmd).await?;
        tracing::info!(step = i + 1, op = kind, "applied");
        write_preview(args.preview_dir.as_deref(), i + 1, &frame.image)?;
    }

    if let Some(dir) = &args.variants_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create variants dir '{}'", dir.display()))?;
        for variant in engine.preview_styles(&key).await? {
            let path = dir.join(format!("variant_{}.png", variant.effect));
            variant
                .frame
                .image
                .save_with_format(&path, image::ImageFormat::Png)
                .with_context(|| format!("write variant '{}'", path.display()))?;
        }
        tracing::info!(dir = %dir.display(), "style variants written");
    }

    let exported = engine.finalize(&key).await?;
    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &exported.bytes)
        .with_context(|| format!("write output '{}'", args.out.display()))?;
    engine.end_session(&key).await;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn output_format(explicit: Option<&str>, out: &Path) -> anyhow::Result<ExportFormat> {
    let name = match explicit {
        Some(f) => f.to_ascii_lowercase(),
        None => out
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "png".to_string()),
    };
    match name.as_str() {
        "png" => Ok(ExportFormat::Png),
        "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
        other => anyhow::bail!("unsupported output format '{other}'"),
    }
}

fn write_preview(dir: Option<&Path>, step: usize, image: &image::RgbaImage) -> anyhow::Result<()> {
    let Some(dir) = dir else {
        return Ok(());
    };
    let path = dir.join(format!("step_{step:03}.png"));
    image
        .save_with_format(&path, image::ImageFormat::Png)
        .with_context(|| format!("write preview '{}'", path.display()))
}
