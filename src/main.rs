use anyhow::{Context, Result};
use chain_blog_reader::{
    BlogId, BlogListItem, BlogServicePort, Config, ConfigOverrides, ContractBlogAdapter, Preset,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "chain-blog-reader", version, about = "Read blog posts stored in an on-chain contract")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Deployed contract version to start from
    #[arg(long, value_enum, default_value_t = Preset::Galileo, global = true)]
    preset: Preset,

    /// JSON-RPC endpoint, overriding the configuration
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List posts, newest first
    List {
        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the body of one post
    Show {
        /// Identifier from `list`, as 0x-prefixed hex
        id: String,
        /// Print id and body as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config,
}

fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("invalid log filter")?;

    // Logs go to stderr so stdout stays clean for records.
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}

fn print_item(item: &BlogListItem) {
    println!("{}  {}", item.publish_time, item.title);
    println!("    id:     {}", item.id);
    println!("    author: {}", item.user);
    if !item.description.is_empty() {
        println!("    {}", item.description);
    }
    if let Some(cover) = &item.cover {
        println!("    cover:  {cover}");
    }
    if let Some(url) = &item.blog_url {
        println!("    url:    {url}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.preset, cli.config.as_deref())
        .context("failed to load configuration")?;
    config.apply_overrides(&ConfigOverrides {
        endpoint_url: cli.endpoint,
        log_level: cli.log_level,
        json_logs: cli.json_logs.then_some(true),
    });
    config.validate().context("invalid configuration")?;

    init_tracing(&config)?;
    debug!("Effective configuration: {:?}", config);

    match cli.command {
        Command::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Command::List { json } => {
            let blogs = ContractBlogAdapter::new(&config)?;
            let items = blogs.fetch_list().await?;
            info!("Fetched {} posts from {}", items.len(), config.contract.address);

            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for item in &items {
                    print_item(item);
                }
            }
        }
        Command::Show { id, json } => {
            let id: BlogId = id.parse()?;
            let blogs = ContractBlogAdapter::new(&config)?;
            let content = blogs.fetch_by_id(&id).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&content)?);
            } else {
                println!("{}", content.body);
            }
        }
    }

    Ok(())
}
