use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use clarksonbot_lib::board::{ScrollLock, TributeBoard};
use clarksonbot_lib::client::TributeClient;
use clarksonbot_lib::config::Config;
use clarksonbot_lib::svg::overlay::mime_for_path;
use clarksonbot_lib::svg::{Customizer, Point, Size, SvgDocument, ViewBox, DEFAULT_PREFIXES};
use clarksonbot_lib::templates::{export_file_name, MASCOT_SVG};
use clarksonbot_lib::tribute::TributeKind;
use clarksonbot_lib::util::expand_tilde;

const DEFAULT_ORIGIN: &str = "http://localhost:8888/";

#[derive(Parser)]
#[command(name = "clarksonbot", version, about = "ClarksonBot tributes and mascot customizer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the tribute functions server
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Read or leave tributes through the functions
    Tributes {
        #[command(subcommand)]
        action: TributesAction,
    },
    /// Inspect or customize the mascot SVG
    Svg {
        #[command(subcommand)]
        action: SvgAction,
    },
}

#[derive(Subcommand)]
enum TributesAction {
    /// Print every tribute, oldest first
    List {
        /// Origin of the page the request is made from
        #[arg(long, default_value = DEFAULT_ORIGIN)]
        origin: String,
    },
    /// Leave a tribute
    Add {
        #[arg(long, value_parser = parse_kind, default_value = "candle")]
        kind: TributeKind,
        #[arg(long)]
        author: String,
        #[arg(long, default_value = DEFAULT_ORIGIN)]
        origin: String,
    },
}

#[derive(Subcommand)]
enum SvgAction {
    /// List the editable parts of an SVG (the stock mascot when no file is given)
    Targets {
        file: Option<String>,
        #[arg(long = "prefix")]
        prefixes: Vec<String>,
    },
    /// Recolor a part and/or add overlay images, then export
    Edit {
        file: Option<String>,
        #[arg(long = "prefix")]
        prefixes: Vec<String>,
        /// Id of the part to recolor
        #[arg(long)]
        select: Option<String>,
        #[arg(long)]
        fill: Option<String>,
        #[arg(long)]
        stroke: Option<String>,
        /// Image file to overlay; repeatable
        #[arg(long = "overlay")]
        overlays: Vec<String>,
        /// Overlay position in rendered pixels as X,Y, matched to --overlay by order
        #[arg(long = "at", value_parser = parse_pair)]
        positions: Vec<(f64, f64)>,
        /// Overlay size in rendered pixels as W,H, matched to --overlay by order
        #[arg(long = "size", value_parser = parse_pair)]
        sizes: Vec<(f64, f64)>,
        /// Rendered canvas width in pixels (defaults to the document's own size)
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
        #[arg(long)]
        out: Option<String>,
    },
}

fn parse_kind(s: &str) -> Result<TributeKind, String> {
    s.parse().map_err(|e: clarksonbot_lib::error::AppError| e.to_string())
}

fn parse_pair(s: &str) -> Result<(f64, f64), String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("expected two numbers separated by a comma, got '{s}'"))?;
    let parse = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("'{v}': {e}"));
    Ok((parse(a)?, parse(b)?))
}

fn read_svg(file: Option<&str>) -> anyhow::Result<String> {
    match file {
        Some(file) => {
            let path = expand_tilde(file);
            std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
        }
        None => Ok(MASCOT_SVG.to_string()),
    }
}

fn prefixes_or_default(prefixes: Vec<String>) -> Vec<String> {
    if prefixes.is_empty() {
        DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect()
    } else {
        prefixes
    }
}

async fn tributes(action: TributesAction) -> anyhow::Result<()> {
    match action {
        TributesAction::List { origin } => {
            let mut board = TributeBoard::new(TributeClient::new(&origin)?, ScrollLock::default());
            board.load().await;
            print!("{}", board.render());
        }
        TributesAction::Add {
            kind,
            author,
            origin,
        } => {
            let mut board = TributeBoard::new(TributeClient::new(&origin)?, ScrollLock::default());
            board.select_kind(kind);
            board.set_author(&author);
            let added = board.submit().await;
            if let Some(message) = board.alert().message() {
                println!("{message}");
            }
            board.dismiss_alert();
            if !added {
                bail!("tribute was not added");
            }
            print!("{}", board.render());
        }
    }
    Ok(())
}

fn svg(action: SvgAction) -> anyhow::Result<()> {
    match action {
        SvgAction::Targets { file, prefixes } => {
            let markup = read_svg(file.as_deref())?;
            let mut customizer = Customizer::new();
            customizer.mount_markup(&markup, prefixes_or_default(prefixes).as_slice(), Size::default())?;
            for target in customizer.targets().iter() {
                println!(
                    "{:<24} {:<18} fill={:<10} stroke={}",
                    target.id,
                    target.label,
                    target.original.fill.as_deref().unwrap_or("-"),
                    target.original.stroke.as_deref().unwrap_or("-"),
                );
            }
        }
        SvgAction::Edit {
            file,
            prefixes,
            select,
            fill,
            stroke,
            overlays,
            positions,
            sizes,
            width,
            height,
            out,
        } => {
            let document = SvgDocument::parse(&read_svg(file.as_deref())?)?;
            let natural = ViewBox::of(document.root(), Size::default());
            let rendered = Size {
                width: width.unwrap_or(natural.width),
                height: height.unwrap_or(natural.height),
            };

            let mut customizer = Customizer::new();
            customizer.mount(document, prefixes_or_default(prefixes).as_slice(), rendered);

            if let Some(id) = select {
                customizer.click(&id)?;
                if let Some(color) = fill {
                    customizer.set_fill(&color)?;
                }
                if let Some(color) = stroke {
                    customizer.set_stroke(&color)?;
                }
            } else if fill.is_some() || stroke.is_some() {
                bail!("--fill/--stroke need --select");
            }

            for (i, overlay) in overlays.iter().enumerate() {
                let path = expand_tilde(overlay);
                let mime = mime_for_path(&path)
                    .with_context(|| format!("unknown image type for {}", path.display()))?;
                let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
                let layer = customizer.overlays_mut();
                let id = layer.add_upload(&bytes, mime)?;
                let image = layer.get(id).context("overlay vanished")?;
                let (x, y) = positions
                    .get(i)
                    .copied()
                    .unwrap_or((image.position.x, image.position.y));
                let (w, h) = sizes
                    .get(i)
                    .copied()
                    .unwrap_or((image.size.width, image.size.height));
                layer.place(id, Point { x, y }, Size { width: w, height: h });
            }

            let out: PathBuf = match out {
                Some(out) => expand_tilde(&out),
                None => PathBuf::from(export_file_name("clarksonbot-custom")),
            };
            customizer.export_to_file(&out)?;
            println!("Exported {}", out.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { port } => {
            let mut config = Config::load()?;
            if let Some(port) = port {
                config.port = port;
            }
            clarksonbot_lib::run(config).await?;
        }
        Command::Tributes { action } => tributes(action).await?,
        Command::Svg { action } => svg(action)?,
    }
    Ok(())
}
