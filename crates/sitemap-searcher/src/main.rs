//! `sitemap-searcher` binary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sitemap_searcher::cli::{self, output, ResolveArgs};
use sitemap_searcher::SearcherConfig;

#[derive(Parser)]
#[command(
    name = "sitemap-searcher",
    version,
    about = "Measure how many of a site's sitemap URLs mention each keyword"
)]
struct Cli {
    /// Print machine-readable JSON to stdout.
    #[arg(long, global = true)]
    json: bool,

    /// Only print results.
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Debug logging and extra detail.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit log lines as JSON on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fraction of sitemap URLs whose path contains each keyword.
    Search {
        /// Site to search, e.g. https://www.example.com
        base_url: String,

        /// Keywords to look for in URL paths.
        #[arg(required = true)]
        keywords: Vec<String>,

        /// Match keywords with their exact case.
        #[arg(long)]
        case_sensitive: bool,

        #[command(flatten)]
        resolve: ResolveArgs,
    },
    /// List every canonical URL resolved from the site's sitemaps.
    Urls {
        base_url: String,

        #[command(flatten)]
        resolve: ResolveArgs,
    },
    /// Show the seed sitemaps (robots.txt or default locations).
    Seeds {
        base_url: String,

        #[command(flatten)]
        resolve: ResolveArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Published before any runtime threads exist.
    for (enabled, key) in [
        (cli.json, output::JSON_ENV),
        (cli.quiet, output::QUIET_ENV),
        (cli.verbose, output::VERBOSE_ENV),
        (cli.no_color, output::NO_COLOR_ENV),
    ] {
        if enabled {
            std::env::set_var(key, "1");
        }
    }

    init_tracing(cli.verbose, cli.log_json)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let config = SearcherConfig::from_env();
    runtime.block_on(async move {
        match cli.command {
            Command::Search {
                base_url,
                keywords,
                case_sensitive,
                resolve,
            } => {
                cli::search_cmd::run(&base_url, &keywords, case_sensitive, resolve.apply(config))
                    .await
            }
            Command::Urls { base_url, resolve } => {
                cli::urls_cmd::run(&base_url, resolve.apply(config)).await
            }
            Command::Seeds { base_url, resolve } => {
                cli::seeds_cmd::run(&base_url, resolve.apply(config)).await
            }
        }
    })
}

fn init_tracing(verbose: bool, json: bool) -> Result<()> {
    let default_level = if verbose {
        "sitemap_searcher=debug"
    } else {
        "sitemap_searcher=warn"
    };
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(default_level.parse().context("invalid log directive")?);
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}
