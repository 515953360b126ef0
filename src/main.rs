//! shaarli-client main entry point
//!
//! This is the command-line interface for a Shaarli bookmark instance.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use shaarli_client::config::{load_config, Config};
use shaarli_client::{Link, LinkPager, Search, ShaarliClient};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// shaarli-client: manage the links of a Shaarli instance
///
/// Every command reads the instance and credentials from a TOML
/// configuration file. When credentials are present the client logs in
/// first, so private links are listed and links can be changed.
#[derive(Parser, Debug)]
#[command(name = "shaarli-client")]
#[command(version)]
#[command(about = "Command-line client for Shaarli", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the number of links
    Count,

    /// Print the tag cloud
    Tags,

    /// List links, newest first
    List {
        /// Only print this page
        #[arg(long)]
        page: Option<u32>,

        /// Full-text search
        #[arg(long, conflicts_with = "tag")]
        term: Option<String>,

        /// Only links carrying this tag (repeatable)
        #[arg(long)]
        tag: Vec<String>,

        /// Oldest first
        #[arg(long, conflicts_with = "page")]
        reverse: bool,
    },

    /// Create or update a link
    Add {
        url: String,

        #[arg(long, default_value = "")]
        title: String,

        #[arg(long)]
        description: Option<String>,

        /// Tag (repeatable)
        #[arg(long)]
        tag: Vec<String>,

        /// Replace the link with this id instead of creating one
        #[arg(long)]
        id: Option<String>,

        /// Only visible when logged in
        #[arg(long)]
        private: bool,
    },

    /// Delete a link by id
    Delete { id: String },

    /// Delete every link
    Purge,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;

    let client = connect(&config).await?;

    match cli.command {
        Command::Count => {
            println!("{}", client.links_count().await);
        }
        Command::Tags => {
            for (tag, count) in client.get_tags().await? {
                println!("{:>5} {}", count, tag);
            }
        }
        Command::List {
            page,
            term,
            tag,
            reverse,
        } => {
            let search = match (term, tag.is_empty()) {
                (Some(term), _) => Search::Term(term),
                (None, false) => Search::Tags(tag),
                (None, true) => Search::All,
            };
            handle_list(&client, search, page, reverse).await;
        }
        Command::Add {
            url,
            title,
            description,
            tag,
            id,
            private,
        } => {
            let Some(id) = client
                .create_or_update_link(id.as_deref(), &url, &title, description.as_deref(), &tag, private)
                .await
            else {
                bail!("Link {} was not saved", url);
            };
            println!("{}", id);
        }
        Command::Delete { id } => {
            if !client.delete(&id).await {
                bail!("Link {} was not deleted", id);
            }
        }
        Command::Purge => {
            let deleted = client.delete_all().await;
            println!("Deleted {} links", deleted);
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shaarli_client=info,warn"),
            1 => EnvFilter::new("shaarli_client=debug,info"),
            2 => EnvFilter::new("shaarli_client=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the client and logs in when credentials are configured
async fn connect(config: &Config) -> anyhow::Result<ShaarliClient> {
    let client = ShaarliClient::from_config(config).context("Failed to create client")?;

    if let Some((login, password)) = config.credentials() {
        if !client.login(login, password).await {
            bail!("Login as {} failed", login);
        }
        tracing::info!("Logged in as {}", login);
    }

    Ok(client)
}

/// Handles the list command: one page, or every page in either order
async fn handle_list(client: &ShaarliClient, search: Search, page: Option<u32>, reverse: bool) {
    if let Some(page) = page {
        for link in client.search(page.max(1), &search).await {
            print_link(&link);
        }
        return;
    }

    let mut pager: LinkPager<'_> = if reverse {
        client.iter_reverse(search).await
    } else {
        client.iter(search)
    };

    let mut count = 0;
    while let Some(link) = pager.next().await {
        print_link(&link);
        count += 1;
    }
    tracing::info!("Listed {} links", count);
}

fn print_link(link: &Link) {
    println!("{}", link);
}
