use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "keepsake", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the journal PDF into a directory.
    Build(BuildArgs),
    /// Print the page plan as JSON.
    Plan(PlanArgs),
    /// Render a single page (0 = cover) as a PNG.
    Page(PageArgs),
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Input request JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory; the file name is derived from the event name.
    #[arg(long)]
    out: PathBuf,

    /// Optional config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input request JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct PageArgs {
    /// Input request JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Page index (0 = cover).
    #[arg(long)]
    page: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Optional config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Build(args) => cmd_build(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Page(args) => cmd_page(args),
    }
}

/// Read a request and rebase relative photo paths onto the request file's directory.
fn read_request_json(path: &Path) -> anyhow::Result<keepsake::JournalRequest> {
    let f = File::open(path).with_context(|| format!("open request '{}'", path.display()))?;
    let r = BufReader::new(f);
    let mut req: keepsake::JournalRequest =
        serde_json::from_reader(r).with_context(|| "parse request JSON")?;

    let root = path.parent().unwrap_or_else(|| Path::new("."));
    for photo in &mut req.photos {
        if let Ok(keepsake::SourceLocator::File(p)) =
            keepsake::SourceLocator::parse(&photo.image_url)
            && p.is_relative()
        {
            photo.image_url = root.join(p).to_string_lossy().into_owned();
        }
    }
    Ok(req)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<keepsake::JournalConfig> {
    let mut cfg = match path {
        Some(p) => keepsake::JournalConfig::from_json_path(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => keepsake::JournalConfig::default(),
    };
    cfg.apply_env_overrides()?;
    Ok(cfg)
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<()> {
    let req = read_request_json(&args.in_path)?;
    let cfg = load_config(args.config.as_deref())?;

    let doc = keepsake::generate_journal(&req, &cfg, &keepsake::CancelToken::new())?;
    let path = doc
        .write_to_dir(&args.out)
        .with_context(|| format!("write journal into '{}'", args.out.display()))?;
    println!("{}", path.display());
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let req = read_request_json(&args.in_path)?;
    req.validate()?;
    let plans = keepsake::plan(&req.photos);
    let json = serde_json::to_string_pretty(&plans).context("serialize page plan")?;
    println!("{json}");
    Ok(())
}

fn cmd_page(args: PageArgs) -> anyhow::Result<()> {
    let req = read_request_json(&args.in_path)?;
    let cfg = load_config(args.config.as_deref())?;

    let frame = keepsake::render_page_preview(&req, &cfg, args.page)?;
    let png = keepsake::encode_png(&frame)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png).with_context(|| format!("write '{}'", args.out.display()))?;
    Ok(())
}
