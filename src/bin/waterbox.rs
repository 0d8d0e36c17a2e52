use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "waterbox", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Render(RenderArgs),
    /// Validate an options file and print the normalized options.
    Check(CheckArgs),
    /// Print the default options.
    Defaults,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Options JSON (camelCase keys, applied over the defaults).
    #[arg(long)]
    options: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Fill level in percent; overrides the options file.
    #[arg(long)]
    value: Option<u8>,

    /// Seed for `noise`/`blocky` textures.
    #[arg(long)]
    seed: Option<u64>,

    /// Write premultiplied RGBA instead of straight alpha.
    #[arg(long)]
    premultiplied: bool,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Options JSON to validate.
    #[arg(long)]
    options: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Check(args) => cmd_check(args),
        Command::Defaults => print_json(&waterbox::Options::default()),
    }
}

fn read_options_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let f = File::open(path).with_context(|| format!("open options '{}'", path.display()))?;
    let r = BufReader::new(f);
    let json = serde_json::from_reader(r).with_context(|| "parse options JSON")?;
    Ok(json)
}

fn make_waterbox(seed: Option<u64>) -> anyhow::Result<waterbox::Waterbox> {
    let factory = match seed {
        Some(seed) => waterbox::PatternFactory::seeded(seed),
        None => waterbox::PatternFactory::new(),
    };
    Ok(waterbox::Waterbox::with_factory(
        waterbox::Options::default(),
        factory,
    )?)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut wb = make_waterbox(args.seed)?;

    if let Some(path) = &args.options {
        let json = read_options_json(path)?;
        wb.update_json(&json)
            .with_context(|| format!("apply options '{}'", path.display()))?;
    }
    if let Some(value) = args.value {
        wb.set_value(value).with_context(|| "apply --value")?;
    }

    wb.render()?;
    let frame = wb.frame(args.premultiplied);

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let json = read_options_json(&args.options)?;
    // Validation only: no canvases or pattern tiles are allocated.
    let mut store =
        waterbox::ConfigStore::new(waterbox::Options::default(), waterbox::NoopListener)?;
    waterbox::validate::parse_patch(&json)
        .and_then(|patch| store.update(patch))
        .with_context(|| format!("validate options '{}'", args.options.display()))?;
    print_json(store.get())
}

fn print_json(options: &waterbox::Options) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(options).with_context(|| "serialize options")?;
    println!("{s}");
    Ok(())
}
