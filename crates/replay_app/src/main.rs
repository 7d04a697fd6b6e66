mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use replay_logging::{replay_error, LogDestination};

#[derive(Parser)]
#[command(name = "replay", version)]
#[command(about = "Replay - great blogs, delivered over time")]
struct Cli {
    /// Log per-URL progress
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract every post from a blog
    Scrape {
        url: String,
        #[arg(short, long, default_value = "posts.json")]
        output: PathBuf,
    },

    /// Extract articles from a JSON list of {title, url, author?}
    ScrapeCurated {
        links_file: PathBuf,
        #[arg(short, long, default_value = "curated_raw.json")]
        output: PathBuf,
    },

    /// Extract posts linked from a themed index page, tagged by theme
    ScrapeIndex {
        index_url: String,
        #[arg(short, long, default_value = "index_raw.json")]
        output: PathBuf,
    },

    /// Clean extracted posts for email delivery
    Clean {
        input: PathBuf,
        /// Blog base URL for resolving relative links
        #[arg(short, long)]
        base_url: String,
        /// CDN URL for images
        #[arg(short, long)]
        cdn_url: Option<String>,
        /// Output file (default: <input>_cleaned.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// CSS to inline into the cleaned markup
        #[arg(long)]
        stylesheet: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    replay_logging::initialize(LogDestination::Terminal, cli.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("error: failed to start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(commands::run(cli.command)) {
        Ok(code) => code,
        Err(err) => {
            replay_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
