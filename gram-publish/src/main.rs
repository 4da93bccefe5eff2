//! gram-publish - publish due scheduled posts in one batch

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use libgramcast::api::GraphClient;
use libgramcast::logging;
use libgramcast::{BatchRunner, Config, GramcastError, PostStore, Publisher, Result};

#[derive(Parser, Debug)]
#[command(name = "gram-publish")]
#[command(version)]
#[command(about = "Publish due scheduled posts in one batch")]
#[command(long_about = "\
gram-publish - publish due scheduled posts in one batch

DESCRIPTION:
    gram-publish loads the posts file, selects the posts whose scheduled
    time has arrived and that have not been published yet, and publishes
    each one through the Graph API: media containers are created, polled
    until processing finishes, then published. Publication state is
    written back to the posts file so no post is ever published twice.

    One batch per invocation; run it from cron or any scheduler.

USAGE:
    gram-publish
    gram-publish --posts-file ./data/posts.json --verbose

CONFIGURATION (environment):
    GRAMCAST_ACCESS_TOKEN   API bearer token (required)
    GRAMCAST_ACCOUNT_ID     target account id (required)
    GRAMCAST_POSTS_FILE     posts JSON document (required)
    GRAMCAST_TIMEZONE       IANA zone anchoring schedules (required)
    GRAMCAST_GRAPH_URL      API base override (optional)
    GRAMCAST_POLL_INTERVAL  readiness poll interval, e.g. 10s (optional)
    GRAMCAST_POLL_ATTEMPTS  readiness poll budget (optional)
    GRAMCAST_LOG_FORMAT     text | json (optional)
    GRAMCAST_LOG_LEVEL      log filter when RUST_LOG is unset (optional)

EXIT CODES:
    0 - batch completed (individual post failures are logged, not fatal)
    1 - runtime error (missing or unreadable posts file)
    2 - configuration error
    3 - invalid input
")]
struct Cli {
    /// Posts file (overrides GRAMCAST_POSTS_FILE)
    #[arg(long, value_name = "PATH")]
    posts_file: Option<PathBuf>,

    /// Summary output format (text or json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init(logging::format_from_env(), cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let json_summary = match cli.format.as_str() {
        "text" => false,
        "json" => true,
        other => {
            return Err(GramcastError::InvalidInput(format!(
                "invalid format '{}', expected text or json",
                other
            )))
        }
    };

    let mut config = Config::from_env()?;
    if let Some(path) = cli.posts_file {
        config.posts_file = path;
    }

    info!(
        store = %config.posts_file.display(),
        account = %config.account_id,
        zone = %config.timezone,
        "gram-publish starting"
    );

    let api = GraphClient::from_config(&config)?;
    let publisher = Publisher::new(Box::new(api), config.account_id.clone(), config.polling);
    let store = PostStore::new(config.posts_file.clone());
    let runner = BatchRunner::new(store, publisher, config.timezone);

    let summary = runner.run().await?;

    if json_summary {
        println!(
            "{}",
            serde_json::json!({
                "published": summary.published,
                "failed": summary.failed,
                "skipped": summary.skipped,
            })
        );
    } else {
        println!(
            "Published {} post(s) ({} failed, {} skipped)",
            summary.published, summary.failed, summary.skipped
        );
    }

    Ok(())
}
