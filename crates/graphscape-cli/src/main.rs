//! Graphscape - Main entry point
//!
//! Launches one of the bundled demo graphs in the 3D viewer.

use anyhow::{ensure, Result};
use clap::{Parser, ValueEnum};
use graphscape_core::config::{load_config, save_default_config};
use graphscape_core::demos::{Brightness, Diffusion, GameOfLife};
use graphscape_core::generators::{erdos_renyi, frucht, multi};
use graphscape_core::{AttrGraph, LayoutOptions, PlotOptions};
use graphscape_scene::Viewer;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Demo {
    /// The Frucht graph, nothing moving
    Plot,
    /// Node colors diffusing along edges
    Diffusion,
    /// Conway's Game of Life on a 16 x 16 board
    Life,
    /// Random graph whose colors follow the u and y keys
    Keyboard,
}

#[derive(Parser, Debug)]
#[command(name = "graphscape")]
#[command(about = "Interactive 3D graph viewer demos")]
#[command(version)]
struct Args {
    /// Demo to run
    #[arg(value_enum, default_value = "plot")]
    demo: Demo,

    /// Path to configuration file
    #[arg(short, long, default_value = "graphscape.toml")]
    config: PathBuf,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    write_config: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Replace every edge with a pair of opposite arcs
    #[arg(long)]
    directed: bool,

    /// Draw N parallel copies of every edge
    #[arg(long, value_name = "N")]
    multi: Option<usize>,

    /// Alternate the orientation of parallel copies
    #[arg(long, requires = "multi")]
    alter: bool,

    /// Label nodes with their keys and edges with their endpoints
    #[arg(long)]
    autolabel: bool,

    /// Draw the world axes
    #[arg(long)]
    axes: bool,

    /// Orbit the camera with the mouse instead of the keyboard
    #[arg(long)]
    mouse: bool,

    /// Show graph statistics in the overlay
    #[arg(long)]
    verbose: bool,

    /// Flip verbose, axes, autolabel and mouse
    #[arg(long)]
    debug: bool,

    /// Hide the diffusion demo's color sum labels
    #[arg(long)]
    nolabel: bool,

    /// Seed for layouts and demo randomness
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    /// Reject switches the selected demo has no use for
    fn validate(&self) -> Result<()> {
        ensure!(
            self.demo != Demo::Life || (!self.directed && self.multi.is_none()),
            "the life demo runs on its own board; --directed and --multi do not apply"
        );
        ensure!(
            self.demo == Demo::Diffusion || !self.nolabel,
            "--nolabel only applies to the diffusion demo"
        );
        Ok(())
    }

    fn plot_options(&self) -> PlotOptions {
        let mut options = PlotOptions {
            autolabel: self.autolabel,
            plot_axes: self.axes,
            mouse: self.mouse,
            verbose: self.verbose,
            ..Default::default()
        };
        if self.debug {
            options.toggle_debug();
        }
        options
    }

    /// Apply the multigraph and direction switches to a demo graph
    fn shape(&self, graph: AttrGraph) -> AttrGraph {
        let graph = match self.multi {
            Some(n) => multi(&graph, n.max(1), self.alter),
            None => graph,
        };
        if self.directed {
            graph.to_directed()
        } else {
            graph
        }
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let level = if args.verbose && args.log_level == "info" {
        "debug"
    } else {
        args.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Graph and callbacks for the selected demo
fn build_viewer(args: &Args, seed: u64) -> Viewer {
    match args.demo {
        Demo::Plot => Viewer::new(args.shape(frucht())),
        Demo::Diffusion => {
            let mut graph = args.shape(frucht());
            let mut diffusion = Diffusion::new(seed, !args.nolabel);
            diffusion.seed_graph(&mut graph);
            Viewer::new(graph).transition(diffusion)
        }
        Demo::Life => {
            let mut life = GameOfLife::new(seed);
            let mut board = GameOfLife::board();
            life.reset(&mut board, None);
            Viewer::new(board.relabel_to_integers()).transition(life)
        }
        Demo::Keyboard => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let graph = args.shape(erdos_renyi(45, 0.05, &mut rng));
            Viewer::new(graph).key_handler(Brightness::default())
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    args.validate()?;
    init_logging(&args)?;

    info!("graphscape v{}", env!("CARGO_PKG_VERSION"));

    if args.write_config {
        save_default_config(&args.config)?;
        info!(path = %args.config.display(), "Wrote default configuration");
        return Ok(());
    }

    let mut config = load_config(&args.config)?;
    if args.seed.is_some() {
        config.layout.seed = args.seed;
    }
    let seed = config
        .layout
        .seed
        .unwrap_or_else(|| LayoutOptions::default().seed);

    info!(demo = ?args.demo, seed, "Starting demo");

    build_viewer(&args, seed)
        .options(args.plot_options())
        .config(config)
        .run()?;

    info!("Viewer closed");
    Ok(())
}
