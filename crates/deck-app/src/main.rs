// ABOUTME: chartdeck command line entry point.
// ABOUTME: Renders charts to SVG after replaying interactions, dumps treemap layouts, manages config.

mod actions;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use deck_core::Config;
use deck_layout::{compute_layout, LayoutOptions, Rect, TreemapTree, WeightedNode};
use deck_render::treemap::TreemapChart;
use deck_render::{Chart, ChartKind, RenderContext};

#[derive(Debug, Parser)]
#[command(name = "chartdeck")]
#[command(about = "Interactive SVG charts and dashboards")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the available charts
    List,
    /// Render a chart to SVG, optionally after replaying interactions
    Render {
        /// Chart name, see `list`
        chart: String,
        /// Write the SVG here instead of stdout
        #[arg(long, short)]
        out: Option<PathBuf>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// Config file to use instead of the default location
        #[arg(long)]
        config: Option<PathBuf>,
        /// Treemap hierarchy as JSON ({"name", "value"?, "children"?})
        #[arg(long)]
        data: Option<PathBuf>,
        /// Interaction to apply before rendering, in order (e.g. click:Engineering)
        #[arg(long = "action", short = 'a')]
        actions: Vec<String>,
        /// Print the interactive element keys instead of the SVG
        #[arg(long)]
        keys: bool,
    },
    /// Print the treemap layout as JSON
    Layout {
        /// Treemap hierarchy as JSON; defaults to the built-in sample
        #[arg(long)]
        data: Option<PathBuf>,
        /// Path of the node to lay out (e.g. Engineering/Data)
        #[arg(long)]
        focus: Option<String>,
        #[arg(long, default_value = "800")]
        width: u32,
        #[arg(long, default_value = "480")]
        height: u32,
        /// Levels below the focus to include; 0 for all
        #[arg(long, default_value = "0")]
        depth: usize,
    },
    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print where the configuration file lives
    Path,
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::load_or_default()),
    }
}

fn load_tree(path: &Path) -> Result<TreemapTree> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let input: WeightedNode = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid treemap hierarchy", path.display()))?;
    let tree = TreemapTree::from_weighted(&input)
        .with_context(|| format!("Rejected treemap data in {}", path.display()))?;
    Ok(tree)
}

fn run_list() -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    for kind in ChartKind::all() {
        let chart = kind.sample();
        writeln!(stdout, "{:<10} {}", kind.name(), chart.title())?;
    }
    Ok(())
}

struct RenderArgs {
    chart: String,
    out: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    config: Option<PathBuf>,
    data: Option<PathBuf>,
    actions: Vec<String>,
    keys: bool,
}

fn run_render(args: RenderArgs) -> Result<()> {
    let Some(kind) = ChartKind::from_name(&args.chart) else {
        let names: Vec<_> = ChartKind::all().iter().map(|k| k.name()).collect();
        bail!("Unknown chart '{}'; choose one of: {}", args.chart, names.join(", "));
    };

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }

    let mut chart: Box<dyn Chart> = match (&args.data, kind) {
        (Some(path), ChartKind::Treemap) => {
            let tree = load_tree(path)?;
            let title = tree.name(tree.root()).to_string();
            Box::new(TreemapChart::new(&title, tree))
        }
        (Some(_), _) => bail!("--data is only supported for the treemap chart"),
        (None, _) => kind.sample(),
    };

    let interactions = actions::parse_all(&args.actions)?;
    for interaction in &interactions {
        let changed = chart
            .handle(interaction)
            .with_context(|| format!("Action '{}' failed", interaction))?;
        tracing::info!("{} -> {}", interaction, if changed { "changed" } else { "no change" });
    }

    let ctx = RenderContext::from_config(&config);
    let doc = chart.render(&ctx);

    if args.keys {
        let mut stdout = std::io::stdout().lock();
        for key in doc.keys() {
            writeln!(stdout, "{}", key)?;
        }
        return Ok(());
    }

    let svg = doc.to_string();
    match args.out {
        Some(path) => {
            fs::write(&path, svg)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {} to {}", kind.name(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", svg)?;
        }
    }
    Ok(())
}

fn run_layout(
    data: Option<PathBuf>,
    focus: Option<String>,
    width: u32,
    height: u32,
    depth: usize,
) -> Result<()> {
    let tree = match data {
        Some(path) => load_tree(&path)?,
        None => TreemapChart::sample().tree().clone(),
    };
    let root = match focus.as_deref() {
        Some(path) => tree
            .find_path(path)
            .with_context(|| format!("No node '{}' in the hierarchy", path))?,
        None => tree.root(),
    };
    let options = LayoutOptions {
        max_depth: if depth == 0 { None } else { Some(depth) },
        ..LayoutOptions::default()
    };
    let bounds = Rect::new(0.0, 0.0, width as f32, height as f32);
    let layout = compute_layout(&tree, root, bounds, &options);

    let rects: Vec<serde_json::Value> = layout
        .rects
        .iter()
        .map(|r| {
            serde_json::json!({
                "path": tree.path_string(r.node),
                "name": tree.name(r.node),
                "value": tree.value(r.node),
                "depth": r.depth,
                "leaf": r.leaf,
                "direction": r.direction,
                "x": r.rect.x,
                "y": r.rect.y,
                "width": r.rect.width,
                "height": r.rect.height,
            })
        })
        .collect();
    let json = serde_json::to_string_pretty(&rects)?;
    writeln!(std::io::stdout().lock(), "{}", json)?;
    Ok(())
}

fn run_config(action: ConfigCommand) -> Result<()> {
    match action {
        ConfigCommand::Show => {
            let config = Config::load_or_default();
            print!("{}", config.to_toml()?);
        }
        ConfigCommand::Path => match Config::default_path() {
            Some(path) => println!("{}", path.display()),
            None => bail!("No config directory on this platform"),
        },
        ConfigCommand::Init { force } => {
            let path = Config::default_path().context("No config directory on this platform")?;
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            let written = Config::default().save_to_default()?;
            println!("Wrote {}", written.display());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logs go to stderr so SVG on stdout stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let app = App::parse();
    match app.command {
        Commands::List => run_list(),
        Commands::Render {
            chart,
            out,
            width,
            height,
            config,
            data,
            actions,
            keys,
        } => run_render(RenderArgs {
            chart,
            out,
            width,
            height,
            config,
            data,
            actions,
            keys,
        }),
        Commands::Layout {
            data,
            focus,
            width,
            height,
            depth,
        } => run_layout(data, focus, width, height, depth),
        Commands::Config { action } => run_config(action),
    }
}
