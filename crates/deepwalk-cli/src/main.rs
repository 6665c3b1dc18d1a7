//! DeepWalk CLI - node embeddings from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Show graph statistics
//! deepwalk stats edges.txt
//!
//! # Train embeddings and write an [N, D] .npy matrix plus row ids
//! deepwalk train edges.txt -o emb.npy --ids emb.ids --n-dims 64 --seed 7
//!
//! # Settings from a TOML file, flags override it
//! deepwalk train edges.csv -o emb.npy --config deepwalk.toml --epochs 5
//!
//! # Dump the walk corpus (one walk per line)
//! deepwalk walks edges.txt -o walks.txt --walks-per-node 10 --steps-per-walk 40
//! ```

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use deepwalk_core::algo::random_walk::generate_walks;
use deepwalk_core::Graph;
use deepwalk_nn::{DeepWalk, DeepWalkConfig, LrSchedule, NodeEmbeddings, TreeShapeKind};
use indicatif::ProgressBar;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "deepwalk")]
#[command(version, about = "DeepWalk node embeddings", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress logging and progress spinners
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train node embeddings and write them as .npy
    Train(TrainArgs),

    /// Generate the random walk corpus
    Walks(WalksArgs),

    /// Show statistics about a graph
    Stats {
        /// Input edge list (whitespace separated or .csv)
        input: PathBuf,

        #[command(flatten)]
        direction: Direction,
    },
}

#[derive(Args)]
struct Direction {
    /// Follow edges from source to target only
    #[arg(long, conflicts_with = "undirected")]
    directed: bool,

    /// Treat every edge as bidirectional (default)
    #[arg(long)]
    undirected: bool,
}

impl Direction {
    fn resolve(&self) -> Option<bool> {
        if self.directed {
            Some(true)
        } else if self.undirected {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(Args)]
struct WalkArgs {
    /// Walks started from every node
    #[arg(long, alias = "walks_per_node")]
    walks_per_node: Option<usize>,

    /// Maximum nodes per walk
    #[arg(long, alias = "steps_per_walk")]
    steps_per_walk: Option<usize>,

    /// Random seed (omit for a random run)
    #[arg(long)]
    seed: Option<u64>,

    /// Generate walks in parallel
    #[arg(long)]
    parallel_walks: bool,
}

#[derive(Args)]
struct TrainArgs {
    /// Input edge list (whitespace separated or .csv)
    input: PathBuf,

    /// Output .npy file
    #[arg(short, long, alias = "output_path")]
    output: PathBuf,

    /// Also write node ids, one per line, in row order
    #[arg(long)]
    ids: Option<PathBuf>,

    /// TOML config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    walk: WalkArgs,

    #[command(flatten)]
    direction: Direction,

    /// Embedding dimension
    #[arg(long, alias = "n_dims")]
    n_dims: Option<usize>,

    /// Skip-gram window size (each side)
    #[arg(long, alias = "skipgram_window_size")]
    window_size: Option<usize>,

    /// Learning rate
    #[arg(long)]
    lr: Option<f32>,

    /// Passes over the walk corpus
    #[arg(long)]
    epochs: Option<usize>,

    /// Decay the learning rate linearly to --min-lr
    #[arg(long)]
    linear_decay: bool,

    /// Learning-rate floor for --linear-decay
    #[arg(long)]
    min_lr: Option<f32>,

    /// Huffman tree weighted by walk visit counts
    #[arg(long)]
    huffman: bool,

    /// Lock-free parallel training (not reproducible)
    #[arg(long)]
    hogwild: bool,

    /// Worker threads for --hogwild
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Args)]
struct WalksArgs {
    /// Input edge list (whitespace separated or .csv)
    input: PathBuf,

    /// Output file (one walk per line)
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    walk: WalkArgs,

    #[command(flatten)]
    direction: Direction,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match &cli.command {
        Commands::Train(args) => cmd_train(args, cli.quiet),
        Commands::Walks(args) => cmd_walks(args, cli.quiet),
        Commands::Stats { input, direction } => {
            cmd_stats(input, direction.resolve().unwrap_or(false), cli.quiet)
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn spinner(quiet: bool, message: String) -> ProgressBar {
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    pb.set_message(message);
    pb
}

/// Config file (or defaults) with command-line overrides applied.
fn build_config(args: &TrainArgs) -> Result<DeepWalkConfig> {
    let mut config = match &args.config {
        Some(path) => DeepWalkConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DeepWalkConfig::default(),
    };

    apply_walk_args(&mut config, &args.walk);
    if let Some(directed) = args.direction.resolve() {
        config.directed = directed;
    }
    if let Some(v) = args.n_dims {
        config.n_dims = v;
    }
    if let Some(v) = args.window_size {
        config.skipgram_window_size = v;
    }
    if let Some(v) = args.lr {
        config.lr = v;
    }
    if let Some(v) = args.epochs {
        config.epochs = v;
    }
    if let Some(v) = args.min_lr {
        config.min_lr = v;
    }
    if args.linear_decay {
        config.lr_schedule = LrSchedule::Linear;
    }
    if args.huffman {
        config.tree_shape = TreeShapeKind::Huffman;
    }
    if args.hogwild {
        config.hogwild = true;
    }
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    Ok(config)
}

fn apply_walk_args(config: &mut DeepWalkConfig, walk: &WalkArgs) {
    if let Some(v) = walk.walks_per_node {
        config.walks_per_node = v;
    }
    if let Some(v) = walk.steps_per_walk {
        config.steps_per_walk = v;
    }
    if walk.seed.is_some() {
        config.seed = walk.seed;
    }
    if walk.parallel_walks {
        config.parallel_walks = true;
    }
}

fn load_graph(path: &Path, directed: bool, quiet: bool) -> Result<Graph> {
    let start = Instant::now();
    let pb = spinner(quiet, format!("Loading {}...", path.display()));

    let graph = Graph::from_path(path, directed)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    pb.finish_with_message(format!("Loaded in {:.2?}", start.elapsed()));
    Ok(graph)
}

fn cmd_train(args: &TrainArgs, quiet: bool) -> Result<()> {
    let config = build_config(args)?;
    let dw = DeepWalk::new(config).context("Invalid configuration")?;
    let config = dw.config();
    tracing::info!(
        seed = dw.seed(),
        walks_per_node = config.walks_per_node,
        steps_per_walk = config.steps_per_walk,
        n_dims = config.n_dims,
        window = config.skipgram_window_size,
        lr = config.lr,
        epochs = config.epochs,
        schedule = ?config.lr_schedule,
        tree = ?config.tree_shape,
        hogwild = config.hogwild,
        "resolved training configuration"
    );

    let graph = load_graph(&args.input, config.directed, quiet)?;
    println!(
        "Graph: {} nodes, {} edges ({})",
        graph.stats().node_count,
        graph.edge_count(),
        if config.directed { "directed" } else { "undirected" }
    );

    let start = Instant::now();
    let pb = spinner(
        quiet,
        format!(
            "Generating walks (n={}, l={})...",
            config.walks_per_node, config.steps_per_walk
        ),
    );
    let walks = dw.walks(&graph).context("Walk generation failed")?;
    pb.finish_with_message(format!("{} walks in {:.2?}", walks.len(), start.elapsed()));

    let start = Instant::now();
    let pb = spinner(
        quiet,
        format!(
            "Training (d={}, window={}, lr={}, epochs={})...",
            config.n_dims, config.skipgram_window_size, config.lr, config.epochs
        ),
    );
    let node_count = graph.stats().node_count;
    let mut tree = dw.build_tree(node_count, &walks)?;
    let stats = dw.train(&mut tree, &walks).context("Training failed")?;
    pb.finish_with_message(format!("Trained in {:.2?}", start.elapsed()));

    println!(
        "Trained on {} examples, mean loss {:.4}, seed {}",
        stats.examples,
        stats.mean_loss(),
        dw.seed()
    );
    if stats.instability_warnings > 0 {
        eprintln!(
            "warning: {} epoch(s) clipped {:.1}% of sigmoid inputs; consider a lower --lr",
            stats.instability_warnings,
            stats.clip_ratio() * 100.0
        );
    }

    let embeddings = NodeEmbeddings::new(graph.nodes().cloned().collect(), tree.get_node_embeddings())?;
    embeddings
        .write_npy(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!(
        "Wrote {}x{} embeddings to {}",
        embeddings.len(),
        embeddings.dim(),
        args.output.display()
    );

    if let Some(ids) = &args.ids {
        embeddings
            .write_ids(ids)
            .with_context(|| format!("Failed to write {}", ids.display()))?;
        println!("Wrote node ids to {}", ids.display());
    }

    Ok(())
}

fn cmd_walks(args: &WalksArgs, quiet: bool) -> Result<()> {
    let mut config = DeepWalkConfig::default();
    apply_walk_args(&mut config, &args.walk);
    let directed = args.direction.resolve().unwrap_or(false);
    let walk_config = config.walk_config();
    walk_config.validate().context("Invalid configuration")?;

    let graph = load_graph(&args.input, directed, quiet)?;
    tracing::debug!(nodes = graph.stats().node_count, directed, "walk input loaded");

    println!(
        "Generating random walks (l={}, n={})...",
        walk_config.steps_per_walk, walk_config.walks_per_node
    );
    let start = Instant::now();
    let walks = generate_walks(&graph, &walk_config)?;
    println!("Generated {} walks in {:.2?}", walks.len(), start.elapsed());

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let mut writer = BufWriter::new(file);
    for walk in &walks {
        let line: Vec<&str> = walk
            .iter()
            .filter_map(|&n| graph.node_id(n))
            .map(|id| id.as_str())
            .collect();
        writeln!(writer, "{}", line.join(" "))?;
    }
    writer.flush()?;

    println!("Saved walks to {}", args.output.display());
    Ok(())
}

fn cmd_stats(input: &Path, directed: bool, quiet: bool) -> Result<()> {
    let graph = load_graph(input, directed, quiet)?;
    let stats = graph.stats();

    println!("Graph Statistics");
    println!("================");
    println!("Nodes:          {}", stats.node_count);
    println!("Edges:          {}", stats.edge_count);
    println!("Isolated nodes: {}", stats.isolated_count);
    println!("Max degree:     {}", stats.max_degree);
    println!(
        "Directed:       {}",
        if stats.directed { "yes" } else { "no" }
    );

    Ok(())
}
