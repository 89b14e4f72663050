use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use minus::Pager;
use std::path::PathBuf;
use trellis::areas::history::History;
use trellis::areas::listing::Listing;
use trellis::areas::viewer::Viewer;
use trellis::artifacts::core::{PagerWriter, should_page, show_pager};
use trellis::commands::log::LogOptions;

#[derive(Parser)]
#[command(
    name = "trellis",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Multi-branch history viewer",
    long_about = "Reads a listing of commits, branches and tags, finds the joint \
    common ancestry of several branch tips and prints their histories merged \
    into one sequence, one lane per tip.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(
        short,
        long,
        global = true,
        env = "TRELLIS_INPUT",
        help = "History listing to read"
    )]
    input: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "TRELLIS_PAGER",
        value_enum,
        default_value_t = Paging::Auto,
        help = "Page output when stdout is a terminal"
    )]
    pager: Paging,
    #[arg(short, long, global = true, action = ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Paging {
    Auto,
    Never,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "log",
        about = "Show the merged history of several tips",
        long_about = "This command searches the joint common ancestry of the given branches \
        and commits (the current branch by default) and prints every commit once, \
        with one lane per tip."
    )]
    Log {
        #[arg(short, long = "branch", help = "Branch whose tip to include")]
        branches: Vec<String>,
        #[arg(short, long = "commit", help = "Commit, branch or tag to include")]
        commits: Vec<String>,
        #[arg(long, help = "Omit the lanes")]
        oneline: bool,
    },
    #[command(
        name = "merge-base",
        about = "Print the lowest common ancestor of several tips",
        long_about = "This command prints a commit reachable from all the given branches, \
        tags or commits that none of their other common ancestors descend from, and fails \
        when their histories are disjoint."
    )]
    MergeBase {
        #[arg(index = 1, required = true, num_args = 1.., help = "Branches, tags or commits")]
        tips: Vec<String>,
    },
    #[command(
        name = "roots",
        about = "List root commits",
        long_about = "This command prints the commits without parents in listing order \
        and whether the listing was in topological order."
    )]
    Roots,
}

fn setup_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 if cfg!(feature = "debug_search") => "debug",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("TRELLIS_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let input = cli
        .input
        .ok_or_else(|| anyhow::anyhow!("no history listing given; pass --input or set TRELLIS_INPUT"))?;
    let history = History::load(&Listing::read(&input)?)?;

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let pager = Pager::new();
    let paging = should_page(cli.pager == Paging::Never);
    let writer: Box<dyn std::io::Write> = if paging {
        Box::new(PagerWriter::new(pager.clone()))
    } else {
        Box::new(std::io::stdout())
    };
    let viewer = Viewer::new(history, writer);

    match &cli.command {
        Commands::Log {
            branches,
            commits,
            oneline,
        } => viewer.log(&LogOptions {
            branches: branches.clone(),
            commits: commits.clone(),
            oneline: *oneline,
        })?,
        Commands::MergeBase { tips } => viewer.merge_base(tips)?,
        Commands::Roots => viewer.roots()?,
    }

    if paging {
        drop(viewer);
        show_pager(pager)?;
    }

    Ok(())
}
