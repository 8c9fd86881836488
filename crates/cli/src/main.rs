use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "worldlink")]
#[command(
    about = "Reference inference, reverse links and mention linking for world snapshots",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every field of an element, or a single field/value pair
    Classify(ClassifyArgs),

    /// List elements referencing an element, grouped by relationship
    #[command(name = "reverse-links")]
    ReverseLinks(ElementArgs),

    /// List an element's outgoing references, dangling ones included
    #[command(name = "forward-links")]
    ForwardLinks(ElementArgs),

    /// Export the reference graph (or a neighbourhood) as nodes and edges
    Graph(GraphArgs),

    /// Detect mentions of known elements in text
    Detect(DetectArgs),

    /// Link every detected mention in an element's text field
    #[command(name = "link-all")]
    LinkAll(LinkAllArgs),

    /// Fuzzy search elements by name
    Search(SearchArgs),
}

#[derive(Args)]
struct SnapshotArgs {
    /// Snapshot file: JSON array of elements or {"elements": [...]}
    #[arg(long, short = 's')]
    snapshot: PathBuf,
}

#[derive(Args)]
struct ClassifyArgs {
    /// Snapshot file (ids it contains count as reference values)
    #[arg(long, short = 's')]
    snapshot: Option<PathBuf>,

    /// Element whose fields to classify (needs --snapshot)
    #[arg(long, conflicts_with = "field")]
    element: Option<String>,

    /// Field name to classify
    #[arg(long)]
    field: Option<String>,

    /// Field value as JSON (plain text is taken as a string)
    #[arg(long, requires = "field")]
    value: Option<String>,

    /// Category of the element owning the field
    #[arg(long)]
    owner: Option<String>,
}

#[derive(Args)]
struct ElementArgs {
    #[command(flatten)]
    source: SnapshotArgs,

    /// Element id
    id: String,
}

#[derive(Args)]
struct GraphArgs {
    #[command(flatten)]
    source: SnapshotArgs,

    /// Only export elements around this id
    #[arg(long)]
    around: Option<String>,

    /// Hops from --around to include
    #[arg(long, short = 'd', default_value_t = 1)]
    depth: usize,
}

#[derive(Args)]
struct DetectArgs {
    #[command(flatten)]
    source: SnapshotArgs,

    /// Scan this element's text field (links and self mentions honoured)
    #[arg(long, conflicts_with = "text")]
    element: Option<String>,

    /// Text field of --element
    #[arg(long, default_value = "description")]
    field: String,

    /// Scan literal text instead of an element
    #[arg(long)]
    text: Option<String>,

    /// Detector config (JSON or TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct LinkAllArgs {
    #[command(flatten)]
    source: SnapshotArgs,

    /// Element whose text is linked
    element: String,

    /// Text field to scan and rewrite
    #[arg(long, default_value = "description")]
    field: String,

    /// Detector config (JSON or TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only update reference fields, leave the text untouched
    #[arg(long)]
    no_rewrite: bool,

    /// Commit and write the updated snapshot back to --snapshot
    #[arg(long)]
    write: bool,
}

#[derive(Args)]
struct SearchArgs {
    #[command(flatten)]
    source: SnapshotArgs,

    /// Search query
    query: String,

    /// Restrict to one category
    #[arg(long)]
    category: Option<String>,

    /// Maximum number of results
    #[arg(long, short = 'n', default_value_t = 10)]
    limit: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let output = match cli.command {
        Commands::Classify(args) => commands::classify(args)?,
        Commands::ReverseLinks(args) => commands::reverse_links(args)?,
        Commands::ForwardLinks(args) => commands::forward_links(args)?,
        Commands::Graph(args) => commands::graph(args)?,
        Commands::Detect(args) => commands::detect(args)?,
        Commands::LinkAll(args) => commands::link_all(args)?,
        Commands::Search(args) => commands::search(args)?,
    };

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");
    Ok(())
}
